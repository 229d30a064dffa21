use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::collector::CollectorError;
use crate::domain::product::Product;
use crate::loader::FileFormat;
use crate::models::product::{CsvProduct, PRODUCT_HEADERS};

/// Writes `products` as CSV in the loader's column contract.
pub fn write_csv<W: Write>(writer: W, products: &[Product]) -> Result<(), CollectorError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(PRODUCT_HEADERS)?;
    for product in products {
        writer.write_record(CsvProduct::from(product).into_cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `products` as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, products: &[Product]) -> Result<(), CollectorError> {
    serde_json::to_writer_pretty(&mut writer, products)?;
    writer.flush()?;
    Ok(())
}

/// Writes `<output_dir>/<site>_products.<ext>` and returns its path.
pub fn write_products(
    output_dir: &Path,
    site: &str,
    format: FileFormat,
    products: &[Product],
) -> Result<PathBuf, CollectorError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{site}_products.{}", format.extension()));
    let file = BufWriter::new(File::create(&path)?);
    match format {
        FileFormat::Csv => write_csv(file, products)?,
        FileFormat::Json => write_json(file, products)?,
    }
    log::info!("Wrote {} products to {}", products.len(), path.display());
    Ok(path)
}
