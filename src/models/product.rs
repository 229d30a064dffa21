//! Flat-file representations of a product.
//!
//! Collectors write, and the loader reads, either a CSV file whose sequence
//! fields are delimited strings or a JSON array of objects. Both records
//! convert into the domain [`Product`](DomainProduct) and back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::{Product as DomainProduct, normalize_size};
use crate::domain::types::{ProductId, ProductPrice, TypeConstraintError};

/// Column order shared by every CSV and spreadsheet writer.
pub const PRODUCT_HEADERS: [&str; 12] = [
    "product_id",
    "title",
    "brand",
    "description",
    "current_price",
    "original_price",
    "availability",
    "image_urls",
    "colors",
    "sizes",
    "category_path",
    "url",
];

pub const IMAGE_URL_DELIMITER: char = ';';
pub const COLOR_DELIMITER: char = ',';
pub const SIZE_DELIMITER: char = ',';
pub const CATEGORY_DELIMITER: char = '>';

/// Errors raised while converting a flat-file record into a product.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductRecordError {
    #[error("invalid field value: {0}")]
    TypeConstraint(#[from] TypeConstraintError),
    #[error("unsupported value for {0}")]
    UnsupportedValue(&'static str),
}

/// Splits a delimited cell into trimmed, non-empty items.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_list(items: &[String], delimiter: char) -> String {
    items.join(&format!("{delimiter} "))
}

fn join_category(items: &[String]) -> String {
    items.join(&format!(" {CATEGORY_DELIMITER} "))
}

fn format_price(price: Option<ProductPrice>) -> String {
    price.map(|p| p.to_string()).unwrap_or_default()
}

/// One row of a product CSV file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CsvProduct {
    pub product_id: String,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub current_price: String,
    pub original_price: String,
    pub availability: String,
    pub image_urls: String,
    pub colors: String,
    pub sizes: String,
    pub category_path: String,
    pub url: String,
}

impl CsvProduct {
    /// Cells in [`PRODUCT_HEADERS`] order.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.product_id,
            self.title,
            self.brand,
            self.description,
            self.current_price,
            self.original_price,
            self.availability,
            self.image_urls,
            self.colors,
            self.sizes,
            self.category_path,
            self.url,
        ]
    }
}

impl TryFrom<CsvProduct> for DomainProduct {
    type Error = ProductRecordError;

    fn try_from(record: CsvProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: ProductId::new(record.product_id)?,
            title: record.title.trim().to_string(),
            brand: record.brand.trim().to_string(),
            description: record.description.trim().to_string(),
            current_price: ProductPrice::parse(&record.current_price, "current_price")?,
            original_price: ProductPrice::parse(&record.original_price, "original_price")?,
            availability: record.availability.trim().to_string(),
            image_urls: split_list(&record.image_urls, IMAGE_URL_DELIMITER),
            colors: split_list(&record.colors, COLOR_DELIMITER),
            sizes: split_list(&record.sizes, SIZE_DELIMITER)
                .iter()
                .map(|s| normalize_size(s))
                .collect(),
            category_path: split_list(&record.category_path, CATEGORY_DELIMITER),
            url: record.url.trim().to_string(),
        })
    }
}

impl From<&DomainProduct> for CsvProduct {
    fn from(product: &DomainProduct) -> Self {
        Self {
            product_id: product.product_id.to_string(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            current_price: format_price(product.current_price),
            original_price: format_price(product.original_price),
            availability: product.availability.clone(),
            image_urls: join_list(&product.image_urls, IMAGE_URL_DELIMITER),
            colors: join_list(&product.colors, COLOR_DELIMITER),
            sizes: join_list(&product.sizes, SIZE_DELIMITER),
            category_path: join_category(&product.category_path),
            url: product.url.clone(),
        }
    }
}

/// A scalar JSON value as written by the collectors.
///
/// Sites disagree on types: ids and prices arrive as strings or numbers,
/// Puma's availability is a boolean.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonScalar {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl JsonScalar {
    /// Text rendering of the value; `null` becomes an empty string.
    pub fn into_text(self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }

    fn into_availability(self) -> String {
        match self {
            Self::Bool(true) => "In stock".to_string(),
            Self::Bool(false) => "Out of stock".to_string(),
            other => other.into_text(),
        }
    }

    fn into_price(self, field: &'static str) -> Result<Option<ProductPrice>, ProductRecordError> {
        match self {
            Self::Null => Ok(None),
            Self::Bool(_) => Err(ProductRecordError::UnsupportedValue(field)),
            Self::Number(value) => match value.as_f64() {
                Some(number) => Ok(Some(
                    ProductPrice::new(number)
                        .map_err(|_| TypeConstraintError::NegativeNumber(field))?,
                )),
                None => Err(ProductRecordError::UnsupportedValue(field)),
            },
            Self::Text(value) => Ok(ProductPrice::parse(&value, field)?),
        }
    }
}

/// A sequence field that is either a native array or a delimited string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonList {
    Items(Vec<JsonScalar>),
    Joined(JsonScalar),
}

impl Default for JsonList {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

impl JsonList {
    pub fn into_items(self, delimiter: char) -> Vec<String> {
        match self {
            Self::Items(items) => items
                .into_iter()
                .map(JsonScalar::into_text)
                .filter(|item| !item.is_empty())
                .collect(),
            Self::Joined(value) => split_list(&value.into_text(), delimiter),
        }
    }
}

/// One object of a product JSON file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct JsonProduct {
    pub product_id: JsonScalar,
    pub title: JsonScalar,
    pub brand: JsonScalar,
    pub description: JsonScalar,
    pub current_price: JsonScalar,
    pub original_price: JsonScalar,
    pub availability: JsonScalar,
    pub image_urls: JsonList,
    pub colors: JsonList,
    pub sizes: JsonList,
    pub category_path: JsonList,
    pub url: JsonScalar,
}

impl TryFrom<JsonProduct> for DomainProduct {
    type Error = ProductRecordError;

    fn try_from(record: JsonProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: ProductId::new(record.product_id.into_text())?,
            title: record.title.into_text(),
            brand: record.brand.into_text(),
            description: record.description.into_text(),
            current_price: record.current_price.into_price("current_price")?,
            original_price: record.original_price.into_price("original_price")?,
            availability: record.availability.into_availability(),
            image_urls: record.image_urls.into_items(IMAGE_URL_DELIMITER),
            colors: record.colors.into_items(COLOR_DELIMITER),
            sizes: record
                .sizes
                .into_items(SIZE_DELIMITER)
                .iter()
                .map(|s| normalize_size(s))
                .collect(),
            category_path: record.category_path.into_items(CATEGORY_DELIMITER),
            url: record.url.into_text(),
        })
    }
}
