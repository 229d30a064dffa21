use std::collections::BTreeMap;

use crate::domain::product::Product;
use crate::domain::summary::{CategoryDetails, CategorySummary};
use crate::domain::types::ProductPrice;
use crate::repository::ProductReader;

use super::ServiceResult;

const UNKNOWN_AVAILABILITY: &str = "Unknown";

/// Counts products per full category path.
pub fn summarize(products: &[Product]) -> CategorySummary {
    let mut summary = CategorySummary::new();
    for product in products {
        *summary.entry(product.category_label()).or_default() += 1;
    }
    summary
}

/// Per-category count, average current price and availability breakdown.
///
/// Ordered by descending product count, then by category name.
pub fn summarize_details(products: &[Product]) -> Vec<CategoryDetails> {
    let mut groups: BTreeMap<String, Vec<&Product>> = BTreeMap::new();
    for product in products {
        groups
            .entry(product.category_label())
            .or_default()
            .push(product);
    }

    let mut details: Vec<CategoryDetails> = groups
        .into_iter()
        .map(|(category_path, products)| {
            let prices: Vec<f64> = products
                .iter()
                .filter_map(|p| p.current_price.map(ProductPrice::get))
                .collect();
            let average_price = (!prices.is_empty()).then(|| {
                let mean = prices.iter().sum::<f64>() / prices.len() as f64;
                (mean * 100.0).round() / 100.0
            });

            let mut availability = BTreeMap::new();
            for product in &products {
                let key = match product.availability.trim() {
                    "" => UNKNOWN_AVAILABILITY.to_string(),
                    value => value.to_string(),
                };
                *availability.entry(key).or_default() += 1;
            }

            CategoryDetails {
                category_path,
                product_count: products.len(),
                average_price,
                availability,
            }
        })
        .collect();

    // Groups come out of the map sorted by name, so a stable sort on count
    // leaves equal counts in name order.
    details.sort_by(|a, b| b.product_count.cmp(&a.product_count));
    details
}

pub fn show_summary<R>(repo: &R) -> ServiceResult<CategorySummary>
where
    R: ProductReader,
{
    Ok(summarize(&repo.list_products()?))
}

pub fn show_summary_details<R>(repo: &R) -> ServiceResult<Vec<CategoryDetails>>
where
    R: ProductReader,
{
    Ok(summarize_details(&repo.list_products()?))
}
