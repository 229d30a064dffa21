use std::collections::HashSet;

use thiserror::Error;

use crate::domain::product::{NewProduct, Product, ProductPatch, canonical_token};

pub mod filter;
pub mod memory;

pub use filter::{ProductSort, SortField, SortOrder};
pub use memory::InMemoryRepository;

/// Errors returned by repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No product with the given identifier exists.
    #[error("product {0} not found")]
    NotFound(String),
    /// A product with the given identifier already exists.
    #[error("product {0} already exists")]
    DuplicateId(String),
    /// No ordinal identifier is left to assign to a product created without one.
    #[error("no ordinal product id left to assign")]
    OrdinalIdsExhausted,
    /// A writer panicked while holding the table lock.
    #[error("product table lock is poisoned")]
    LockPoisoned,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Filter and sort parameters used when searching products.
///
/// Every filter is optional and all supplied filters must hold. Text values
/// are stored trimmed and lower-cased; color and size sets are stored as
/// canonical tokens (see [`canonical_token`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListQuery {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Case-insensitive exact identifier.
    pub product_id: Option<String>,
    /// Matches when the product has at least one of these colors.
    pub colors: Option<HashSet<String>>,
    /// Matches when the product has at least one of these sizes.
    pub sizes: Option<HashSet<String>>,
    /// Case-insensitive exact brand.
    pub brand: Option<String>,
    /// Case-insensitive exact availability.
    pub availability: Option<String>,
    /// Inclusive lower bound on the current price.
    pub min_price: Option<f64>,
    /// Inclusive upper bound on the current price.
    pub max_price: Option<f64>,
    /// Ordering of the result; `None` keeps table order.
    pub sort: Option<ProductSort>,
}

fn normalized_text(value: impl AsRef<str>) -> Option<String> {
    let value = value.as_ref().trim().to_lowercase();
    (!value.is_empty()).then_some(value)
}

fn canonical_set<I, S>(values: I) -> Option<HashSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: HashSet<String> = values
        .into_iter()
        .filter_map(|value| canonical_token(value.as_ref()))
        .collect();
    (!set.is_empty()).then_some(set)
}

impl ProductListQuery {
    pub fn title(mut self, title: impl AsRef<str>) -> Self {
        self.title = normalized_text(title);
        self
    }
    pub fn description(mut self, description: impl AsRef<str>) -> Self {
        self.description = normalized_text(description);
        self
    }
    pub fn product_id(mut self, product_id: impl AsRef<str>) -> Self {
        self.product_id = normalized_text(product_id);
        self
    }
    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.colors = canonical_set(colors);
        self
    }
    pub fn sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sizes = canonical_set(sizes);
        self
    }
    pub fn brand(mut self, brand: impl AsRef<str>) -> Self {
        self.brand = normalized_text(brand);
        self
    }
    pub fn availability(mut self, availability: impl AsRef<str>) -> Self {
        self.availability = normalized_text(availability);
        self
    }
    pub fn min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }
    pub fn max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }
    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some(ProductSort { field, order });
        self
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List every product in table order.
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    /// List the products matching the supplied query, in the requested order.
    fn search_products(&self, query: &ProductListQuery) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product by its identifier, ignoring case.
    fn get_product_by_id(&self, id: &str) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Append a new product, assigning an identifier when none is given.
    fn create_product(&self, product: NewProduct) -> RepositoryResult<Product>;
    /// Replace the supplied fields of an existing product.
    fn update_product(&self, id: &str, patch: ProductPatch) -> RepositoryResult<Product>;
    /// Remove a product and return it.
    fn delete_product(&self, id: &str) -> RepositoryResult<Product>;
}
