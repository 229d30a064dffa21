use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping of full category path to the number of products in it.
pub type CategorySummary = BTreeMap<String, usize>;

/// Per-category aggregate returned by the detailed summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryDetails {
    pub category_path: String,
    pub product_count: usize,
    /// Mean `current_price` rounded to cents, `None` when no product has a price.
    pub average_price: Option<f64>,
    /// Availability value to number of products.
    pub availability: BTreeMap<String, usize>,
}
