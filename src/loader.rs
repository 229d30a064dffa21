//! Loads a collector's flat file into a [`Table`].
//!
//! The format is chosen from the file extension. File-level problems abort
//! the load; a malformed row is recorded in the [`LoadReport`] and skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::domain::product::Product;
use crate::domain::table::Table;
use crate::models::product::{CsvProduct, JsonProduct};

/// Flat-file formats understood by the loader and the writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Infers the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::try_from(extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl TryFrom<&str> for FileFormat {
    type Error = LoadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Fatal errors that prevent a file from being loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported data file format: {0:?}")]
    UnsupportedFormat(String),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON data file must contain an array of products")]
    NotAnArray,
}

/// A skipped row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RowParseError {
    /// One-based row number. For CSV files this is the line the record starts
    /// on, the header being line 1.
    pub row_number: usize,
    pub product_id: Option<String>,
    pub message: String,
}

/// Outcome of a load.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub errors: Vec<RowParseError>,
}

impl LoadReport {
    pub fn push_error(
        &mut self,
        row_number: usize,
        product_id: Option<String>,
        message: impl Into<String>,
    ) {
        let error = RowParseError {
            row_number,
            product_id,
            message: message.into(),
        };
        log::warn!(
            "Skipping row {} ({}): {}",
            error.row_number,
            error.product_id.as_deref().unwrap_or("no id"),
            error.message
        );
        self.skipped += 1;
        self.errors.push(error);
    }
}

/// Loads the file at `path` into a new table.
pub fn load_table(path: &Path) -> Result<(Table, LoadReport), LoadError> {
    let format = FileFormat::from_path(path)?;
    let file = File::open(path)?;
    let (table, report) = match format {
        FileFormat::Csv => read_csv(file)?,
        FileFormat::Json => read_json(file)?,
    };
    log::info!(
        "Loaded {} of {} products from {} ({} skipped)",
        report.loaded,
        report.total_rows,
        path.display(),
        report.skipped
    );
    Ok((table, report))
}

/// Reads a CSV document with a header row.
pub fn read_csv<R: Read>(reader: R) -> Result<(Table, LoadReport), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    // Surface an unreadable header as a file-level error.
    let headers = reader.headers()?.clone();

    let mut table = Table::new();
    let mut report = LoadReport::default();
    let mut raw = csv::StringRecord::new();

    loop {
        // Quoted fields may span lines, so rows are numbered by the line they start on.
        let row_number = match reader.read_record(&mut raw) {
            Ok(false) => break,
            Ok(true) => record_line(raw.position()),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                report.total_rows += 1;
                report.push_error(record_line(e.position()), None, e.to_string());
                continue;
            }
        };
        report.total_rows += 1;
        let record = match raw.deserialize::<CsvProduct>(Some(&headers)) {
            Ok(record) => record,
            Err(e) => {
                report.push_error(row_number, None, e.to_string());
                continue;
            }
        };
        let raw_id = non_empty(record.product_id.trim());
        match Product::try_from(record) {
            Ok(product) => insert_row(&mut table, &mut report, row_number, product),
            Err(e) => report.push_error(row_number, raw_id, e.to_string()),
        }
    }

    Ok((table, report))
}

/// Reads a JSON document holding an array of product objects.
pub fn read_json<R: Read>(reader: R) -> Result<(Table, LoadReport), LoadError> {
    let document: serde_json::Value = serde_json::from_reader(reader)?;
    let serde_json::Value::Array(items) = document else {
        return Err(LoadError::NotAnArray);
    };

    let mut table = Table::new();
    let mut report = LoadReport::default();

    for (idx, item) in items.into_iter().enumerate() {
        let row_number = idx + 1;
        report.total_rows += 1;
        let raw_id = item
            .get("product_id")
            .map(|id| match id {
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .and_then(|id| non_empty(&id));
        let product = serde_json::from_value::<JsonProduct>(item)
            .map_err(|e| e.to_string())
            .and_then(|record| Product::try_from(record).map_err(|e| e.to_string()));
        match product {
            Ok(product) => insert_row(&mut table, &mut report, row_number, product),
            Err(message) => report.push_error(row_number, raw_id, message),
        }
    }

    Ok((table, report))
}

fn insert_row(table: &mut Table, report: &mut LoadReport, row_number: usize, product: Product) {
    match table.push(product) {
        Ok(_) => report.loaded += 1,
        Err(duplicate) => report.push_error(
            row_number,
            Some(duplicate.product_id.to_string()),
            "duplicate product_id",
        ),
    }
}

fn record_line(position: Option<&csv::Position>) -> usize {
    position.map_or(0, |position| position.line() as usize)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "product_id,title,brand,description,current_price,original_price,availability,image_urls,colors,sizes,category_path,url\n";

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("data/products.CSV")).unwrap(),
            FileFormat::Csv
        );
        assert_eq!(
            FileFormat::from_path(Path::new("products.json")).unwrap(),
            FileFormat::Json
        );
        assert!(matches!(
            FileFormat::from_path(Path::new("products.xlsx")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn csv_rows_with_errors_are_skipped() {
        let data = format!(
            "{HEADER}\
             1,Air Runner,PUMA,,80,100,In stock,,Red,\"42, 43\",Shoes > Running,https://x/1\n\
             ,No Id,PUMA,,80,100,,,,,,\n\
             2,Bad Price,PUMA,,abc,100,,,,,,\n\
             1,Duplicate,PUMA,,80,100,,,,,,\n\
             3,Short row\n"
        );

        let (table, report) = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 4);
        let rows: Vec<usize> = report.errors.iter().map(|e| e.row_number).collect();
        assert_eq!(rows, vec![3, 4, 5, 6]);
        assert_eq!(report.errors[1].product_id.as_deref(), Some("2"));
    }

    #[test]
    fn csv_row_numbers_follow_multiline_fields() {
        let data = format!(
            "{HEADER}\
             1,Court Classic,Saint Laurent,\"Calf leather.\nMade in Italy.\n\",595,,,,,,,\n\
             2,Bad Price,PUMA,,abc,100,,,,,,\n"
        );

        let (table, report) = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.get("1").unwrap().description, "Calf leather.\nMade in Italy.");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row_number, 5);
        assert_eq!(report.errors[0].product_id.as_deref(), Some("2"));
    }

    #[test]
    fn csv_missing_columns_map_to_defaults() {
        let data = "product_id,title\n7,Loafer\n";
        let (table, report) = read_csv(data.as_bytes()).unwrap();
        assert!(report.errors.is_empty());
        let product = table.get("7").unwrap();
        assert_eq!(product.title, "Loafer");
        assert!(product.colors.is_empty());
        assert_eq!(product.current_price, None);
    }

    #[test]
    fn json_must_be_an_array() {
        let result = read_json(r#"{"product_id": "1"}"#.as_bytes());
        assert!(matches!(result, Err(LoadError::NotAnArray)));
    }

    #[test]
    fn json_malformed_document_is_fatal() {
        let result = read_json("[{".as_bytes());
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn json_bad_objects_are_skipped() {
        let data = r#"[
            {"product_id": 1, "title": "Suede", "colors": ["Black"]},
            {"title": "missing id"},
            "not an object",
            {"product_id": "2", "current_price": -5}
        ]"#;
        let (table, report) = read_json(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.errors[2].product_id.as_deref(), Some("2"));
    }
}
