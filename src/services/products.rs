use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::dto::products::ProductsDto;
use crate::repository::{ProductListQuery, ProductReader, ProductWriter};

use super::ServiceResult;

/// Returns every product in table order.
pub fn list_products<R>(repo: &R) -> ServiceResult<ProductsDto>
where
    R: ProductReader,
{
    Ok(repo.list_products()?.into())
}

/// Core business logic for `GET /products/search`.
///
/// An empty result is not an error: the listing simply has no products.
pub fn search_products<R>(query: &ProductListQuery, repo: &R) -> ServiceResult<ProductsDto>
where
    R: ProductReader,
{
    let products = repo.search_products(query)?;
    log::debug!("Search matched {} products", products.len());
    Ok(products.into())
}

pub fn create_product<R>(payload: NewProduct, repo: &R) -> ServiceResult<Product>
where
    R: ProductWriter,
{
    let product = repo.create_product(payload)?;
    log::info!("Created product {}", product.product_id);
    Ok(product)
}

/// Applies `patch` to the product with the given identifier.
///
/// Only the fields present in the patch change; the identifier is matched
/// ignoring case and surrounding whitespace.
pub fn update_product<R>(product_id: &str, patch: ProductPatch, repo: &R) -> ServiceResult<Product>
where
    R: ProductWriter,
{
    let product = repo.update_product(product_id.trim(), patch)?;
    log::info!("Updated product {}", product.product_id);
    Ok(product)
}

pub fn delete_product<R>(product_id: &str, repo: &R) -> ServiceResult<Product>
where
    R: ProductWriter,
{
    let product = repo.delete_product(product_id.trim())?;
    log::info!("Deleted product {}", product.product_id);
    Ok(product)
}
