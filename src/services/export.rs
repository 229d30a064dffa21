use std::path::Path;

use thiserror::Error;

use crate::domain::product::Product;
use crate::models::product::{CsvProduct, PRODUCT_HEADERS};
use crate::repository::ProductReader;

use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Json,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DownloadError::InvalidFormat(other.to_string())),
        }
    }
}

/// A rendered file ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render json")]
    JsonRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

impl From<DownloadError> for ServiceError {
    fn from(value: DownloadError) -> Self {
        match value {
            DownloadError::InvalidFormat(format) => Self::Validation(format!(
                "Unsupported export format '{format}', expected csv, json or xlsx"
            )),
            err => {
                log::error!("Failed to render export: {err}");
                Self::Internal
            }
        }
    }
}

/// File name stem of the loaded data file, used to name generated files.
pub fn data_file_stem(data_file: &str) -> String {
    Path::new(data_file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("products")
        .to_string()
}

/// Renders `products` in the same field contract the loader reads.
pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    products: &[Product],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(PRODUCT_HEADERS)
                .map_err(|_| DownloadError::CsvRender)?;
            for product in products {
                writer
                    .write_record(CsvProduct::from(product).into_cells())
                    .map_err(|_| DownloadError::CsvRender)?;
            }
            let bytes = writer.into_inner().map_err(|_| DownloadError::CsvRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.csv"),
                content_type: "text/csv; charset=utf-8",
                bytes,
            })
        }
        DownloadFormat::Json => {
            let bytes =
                serde_json::to_vec_pretty(products).map_err(|_| DownloadError::JsonRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.json"),
                content_type: "application/json",
                bytes,
            })
        }
        DownloadFormat::Xlsx => {
            let mut workbook = rust_xlsxwriter::Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in PRODUCT_HEADERS.iter().enumerate() {
                worksheet
                    .write_string(0, col_idx as u16, *header)
                    .map_err(|_| DownloadError::XlsxRender)?;
            }

            for (row_idx, product) in products.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                let cells = CsvProduct::from(product).into_cells();
                for (col_idx, value) in cells.iter().enumerate() {
                    worksheet
                        .write_string(sheet_row, col_idx as u16, value)
                        .map_err(|_| DownloadError::XlsxRender)?;
                }
            }

            let bytes = workbook
                .save_to_buffer()
                .map_err(|_| DownloadError::XlsxRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

/// Core business logic for `GET /products/export`.
pub fn export_products<R>(format: &str, data_file: &str, repo: &R) -> ServiceResult<DownloadFile>
where
    R: ProductReader,
{
    let format = DownloadFormat::try_from(format)?;
    let products = repo.list_products()?;
    let base_name = format!("products_{}", data_file_stem(data_file));
    Ok(render_download_file(&base_name, format, &products)?)
}
