//! Helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Temporary data file with a chosen extension, removed on drop.
pub struct TestDataFile {
    tempfile: NamedTempFile,
}

impl TestDataFile {
    pub fn new(extension: &str, contents: &str) -> Self {
        let mut tempfile = tempfile::Builder::new()
            .prefix("products")
            .suffix(&format!(".{extension}"))
            .tempfile()
            .expect("Failed to create temp file");
        tempfile
            .write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        tempfile.flush().expect("Failed to flush temp file");
        TestDataFile { tempfile }
    }

    pub fn path(&self) -> &Path {
        self.tempfile.path()
    }
}

pub const CSV_HEADER: &str = "product_id,title,brand,description,current_price,original_price,availability,image_urls,colors,sizes,category_path,url";

/// The two-row table used throughout the API examples.
pub const TWO_PRODUCTS_JSON: &str = r#"[
    {
        "product_id": "1",
        "title": "Air Runner",
        "brand": "PUMA",
        "description": "Lightweight running shoe",
        "current_price": 80,
        "original_price": 100,
        "availability": true,
        "image_urls": ["https://images.puma.com/1.png"],
        "colors": "red",
        "sizes": "42, 42_5",
        "category_path": "Shoes > Running",
        "url": "https://eu.puma.com/p/1"
    },
    {
        "product_id": "2",
        "title": "Sneak City",
        "brand": "PUMA",
        "description": "Everyday sneaker",
        "current_price": "60",
        "original_price": null,
        "availability": false,
        "image_urls": [],
        "colors": ["blue"],
        "sizes": [43],
        "category_path": ["Shoes", "Sneakers"],
        "url": "https://eu.puma.com/p/2"
    }
]"#;
