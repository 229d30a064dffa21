//! The in-memory product table.
//!
//! A table is an ordered sequence of products loaded once per process. Each
//! row carries the canonical [`MatchKeys`] of its product, recomputed whenever
//! the row changes.

use crate::domain::product::{MatchKeys, Product, ProductPatch};
use crate::domain::types::ProductId;

/// A product together with its precomputed match keys.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    product: Product,
    keys: MatchKeys,
}

impl TableRow {
    pub fn new(product: Product) -> Self {
        let keys = MatchKeys::from(&product);
        Self { product, keys }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn keys(&self) -> &MatchKeys {
        &self.keys
    }

    pub fn into_product(self) -> Product {
        self.product
    }
}

/// Ordered product table with unique identifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.rows.iter().map(TableRow::product)
    }

    /// Index of the row whose identifier matches `id`, ignoring case.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.product.product_id.matches(id))
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.position(id).map(|idx| &self.rows[idx].product)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Appends a product. Returns the product back if its id is taken.
    pub fn push(&mut self, product: Product) -> Result<&Product, Box<Product>> {
        if self.contains(product.product_id.as_str()) {
            return Err(Box::new(product));
        }
        self.rows.push(TableRow::new(product));
        let idx = self.rows.len() - 1;
        Ok(&self.rows[idx].product)
    }

    /// Applies `patch` to the product with `id` and refreshes its match keys.
    pub fn update(&mut self, id: &str, patch: ProductPatch) -> Option<&Product> {
        let idx = self.position(id)?;
        let row = &mut self.rows[idx];
        patch.apply(&mut row.product);
        row.keys = MatchKeys::from(&row.product);
        Some(&row.product)
    }

    /// Removes the product with `id`, keeping the order of the remaining rows.
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let idx = self.position(id)?;
        Some(self.rows.remove(idx).into_product())
    }

    /// Next unused ordinal identifier.
    ///
    /// Collectors without a native id number their products, so new ids
    /// continue after the largest numeric id in the table. Returns `None`
    /// when that id is already `u64::MAX`.
    pub fn next_ordinal_id(&self) -> Option<ProductId> {
        let mut next = match self.products().filter_map(|p| p.product_id.ordinal()).max() {
            Some(max) => max.checked_add(1)?,
            None => self.rows.len() as u64 + 1,
        };
        while self.contains(&next.to_string()) {
            next = next.checked_add(1)?;
        }
        Some(ProductId::from_ordinal(next))
    }
}

impl FromIterator<Product> for Table {
    /// Builds a table keeping the first product of every duplicated id.
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut table = Self::new();
        for product in iter {
            if let Err(duplicate) = table.push(product) {
                log::warn!("Dropping duplicate product id {}", duplicate.product_id);
            }
        }
        table
    }
}
