use serde::Serialize;

use crate::domain::product::Product;

/// Listing returned by `GET /products` and `GET /products/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsDto {
    pub total_products: usize,
    pub products: Vec<Product>,
}

impl From<Vec<Product>> for ProductsDto {
    fn from(products: Vec<Product>) -> Self {
        Self {
            total_products: products.len(),
            products,
        }
    }
}
