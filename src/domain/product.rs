use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::types::{ProductId, ProductPrice};
use crate::{CATEGORY_SEPARATOR, UNCATEGORIZED};

/// A footwear product scraped from one of the source sites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: ProductId,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub current_price: Option<ProductPrice>,
    pub original_price: Option<ProductPrice>,
    pub availability: String,
    pub image_urls: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub category_path: Vec<String>,
    pub url: String,
}

impl Product {
    /// Category path rendered as a single label, e.g. `Shoes > Sneakers`.
    pub fn category_label(&self) -> String {
        if self.category_path.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            self.category_path.join(CATEGORY_SEPARATOR)
        }
    }
}

/// Information required to create a new [`Product`].
///
/// The identifier is optional; the repository assigns the next free ordinal
/// when it is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub product_id: Option<ProductId>,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub current_price: Option<ProductPrice>,
    pub original_price: Option<ProductPrice>,
    pub availability: String,
    pub image_urls: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub category_path: Vec<String>,
    pub url: String,
}

impl NewProduct {
    /// Builds the stored product once an identifier is known.
    pub fn into_product(self, product_id: ProductId) -> Product {
        Product {
            product_id,
            title: self.title,
            brand: self.brand,
            description: self.description,
            current_price: self.current_price,
            original_price: self.original_price,
            availability: self.availability,
            image_urls: self.image_urls,
            colors: self.colors,
            sizes: normalize_sizes(self.sizes),
            category_path: self.category_path,
            url: self.url,
        }
    }
}

/// Partial update of a [`Product`]. `None` leaves the field unchanged.
///
/// Prices use a nested option: `Some(None)` clears the price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub current_price: Option<Option<ProductPrice>>,
    pub original_price: Option<Option<ProductPrice>>,
    pub availability: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub category_path: Option<Vec<String>>,
    pub url: Option<String>,
}

impl ProductPatch {
    /// Returns `true` when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the supplied fields to `product`, leaving the others as they are.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(brand) = self.brand {
            product.brand = brand;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.current_price {
            product.current_price = price;
        }
        if let Some(price) = self.original_price {
            product.original_price = price;
        }
        if let Some(availability) = self.availability {
            product.availability = availability;
        }
        if let Some(image_urls) = self.image_urls {
            product.image_urls = image_urls;
        }
        if let Some(colors) = self.colors {
            product.colors = colors;
        }
        if let Some(sizes) = self.sizes {
            product.sizes = normalize_sizes(sizes);
        }
        if let Some(category_path) = self.category_path {
            product.category_path = category_path;
        }
        if let Some(url) = self.url {
            product.url = url;
        }
    }
}

/// Canonical color and size sets of a product used by intersect filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchKeys {
    pub colors: HashSet<String>,
    pub sizes: HashSet<String>,
}

impl From<&Product> for MatchKeys {
    fn from(product: &Product) -> Self {
        Self {
            colors: product.colors.iter().filter_map(|c| canonical_token(c)).collect(),
            sizes: product.sizes.iter().filter_map(|s| canonical_token(s)).collect(),
        }
    }
}

/// Sizes are scraped with `_` as the decimal mark on some sites (`10_5`).
pub fn normalize_size(size: &str) -> String {
    size.trim().replace('_', ".")
}

fn normalize_sizes(sizes: Vec<String>) -> Vec<String> {
    sizes.iter().map(|s| normalize_size(s)).collect()
}

/// Canonical comparison key for colors and sizes.
///
/// Tokens are trimmed and lower-cased; numeric tokens are re-rendered so that
/// `42`, `42.0` and `"42"` compare equal. Blank tokens yield `None`.
pub fn canonical_token(raw: &str) -> Option<String> {
    let token = normalize_size(raw).to_lowercase();
    if token.is_empty() {
        return None;
    }
    match token.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number.to_string()),
        _ => Some(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            product_id: ProductId::new("1").unwrap(),
            title: "Air Runner".into(),
            brand: "PUMA".into(),
            description: "Light running shoe".into(),
            current_price: Some(ProductPrice::new(80.0).unwrap()),
            original_price: Some(ProductPrice::new(100.0).unwrap()),
            availability: "In stock".into(),
            image_urls: vec!["https://img.example.com/1.jpg".into()],
            colors: vec!["Red".into(), " Black ".into()],
            sizes: vec!["42".into(), "10.5".into(), "M".into()],
            category_path: vec!["Shoes".into(), "Running".into()],
            url: "https://example.com/p/1".into(),
        }
    }

    #[test]
    fn canonical_token_unifies_numeric_spellings() {
        assert_eq!(canonical_token("42.0"), Some("42".into()));
        assert_eq!(canonical_token(" 42 "), Some("42".into()));
        assert_eq!(canonical_token("10_5"), Some("10.5".into()));
        assert_eq!(canonical_token("XL"), Some("xl".into()));
        assert_eq!(canonical_token("  "), None);
    }

    #[test]
    fn match_keys_are_lowercased_sets() {
        let keys = MatchKeys::from(&sample_product());
        assert!(keys.colors.contains("red"));
        assert!(keys.colors.contains("black"));
        assert!(keys.sizes.contains("42"));
        assert!(keys.sizes.contains("m"));
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let mut product = sample_product();
        let before = product.clone();
        ProductPatch {
            title: Some("Air Runner 2".into()),
            current_price: Some(None),
            ..ProductPatch::default()
        }
        .apply(&mut product);

        assert_eq!(product.title, "Air Runner 2");
        assert_eq!(product.current_price, None);
        assert_eq!(product.original_price, before.original_price);
        assert_eq!(product.colors, before.colors);
        assert_eq!(product.category_path, before.category_path);
    }

    #[test]
    fn empty_category_path_is_uncategorized() {
        let mut product = sample_product();
        assert_eq!(product.category_label(), "Shoes > Running");
        product.category_path.clear();
        assert_eq!(product.category_label(), UNCATEGORIZED);
    }
}
