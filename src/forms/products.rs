use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::{Validate, ValidateUrl, ValidationError, ValidationErrors};

use crate::domain::product::{NewProduct, ProductPatch};
use crate::domain::types::{ProductId, ProductPrice, TypeConstraintError};
use crate::models::product::{
    CATEGORY_DELIMITER, COLOR_DELIMITER, IMAGE_URL_DELIMITER, JsonList, SIZE_DELIMITER,
};
use crate::repository::{ProductListQuery, SortField, SortOrder};

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn optional_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query-string number where an empty value means "not supplied".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number '{value}'"))),
    }
}

fn split_param(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

fn optional_price(
    value: Option<f64>,
    field: &'static str,
) -> Result<Option<ProductPrice>, TypeConstraintError> {
    value
        .map(|price| ProductPrice::new(price).map_err(|_| TypeConstraintError::NegativeNumber(field)))
        .transpose()
}

/// Query string of `GET /products/search`.
///
/// Only the keys below are recognized; any other key is rejected.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SearchProductsForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub product_id: Option<String>,
    /// Comma-separated list of colors.
    pub colors: Option<String>,
    /// Comma-separated list of sizes.
    pub sizes: Option<String>,
    pub brand: Option<String>,
    pub availability: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Error)]
pub enum SearchProductsFormError {
    #[error("Search parameters validation failed: {0}")]
    Validation(String),
    #[error("min_price must not be greater than max_price")]
    PriceRange,
    #[error("sort_order must be 'asc' or 'desc', got '{0}'")]
    SortOrder(String),
}

impl From<ValidationErrors> for SearchProductsFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl TryFrom<SearchProductsForm> for ProductListQuery {
    type Error = SearchProductsFormError;

    fn try_from(value: SearchProductsForm) -> Result<Self, Self::Error> {
        value.validate()?;
        if let (Some(min), Some(max)) = (value.min_price, value.max_price)
            && min > max
        {
            return Err(SearchProductsFormError::PriceRange);
        }

        let order = match value.sort_order.as_deref().map(str::trim) {
            None | Some("") => SortOrder::default(),
            Some(order) => order
                .parse::<SortOrder>()
                .map_err(SearchProductsFormError::SortOrder)?,
        };

        let mut query = ProductListQuery::default();
        if let Some(title) = &value.title {
            query = query.title(title);
        }
        if let Some(description) = &value.description {
            query = query.description(description);
        }
        if let Some(product_id) = &value.product_id {
            query = query.product_id(product_id);
        }
        if let Some(colors) = &value.colors {
            query = query.colors(split_param(colors));
        }
        if let Some(sizes) = &value.sizes {
            query = query.sizes(split_param(sizes));
        }
        if let Some(brand) = &value.brand {
            query = query.brand(brand);
        }
        if let Some(availability) = &value.availability {
            query = query.availability(availability);
        }
        if let Some(min_price) = value.min_price {
            query = query.min_price(min_price);
        }
        if let Some(max_price) = value.max_price {
            query = query.max_price(max_price);
        }
        match value.sort_by.as_deref().map(str::trim) {
            None | Some("") => {}
            Some(sort_by) => match sort_by.parse::<SortField>() {
                Ok(field) => query = query.sort(field, order),
                Err(unknown) => {
                    log::warn!("Ignoring unknown sort_by field '{unknown}', keeping table order")
                }
            },
        }
        Ok(query)
    }
}

/// Body of `POST /products/create`.
///
/// Sequence fields accept JSON arrays or delimited strings.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateProductForm {
    #[serde(default)]
    pub product_id: Option<String>,
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub current_price: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub image_urls: JsonList,
    #[serde(default)]
    pub colors: JsonList,
    #[serde(default)]
    pub sizes: JsonList,
    #[serde(default)]
    pub category_path: JsonList,
    #[serde(default)]
    #[validate(custom(function = "optional_url"))]
    pub url: String,
}

#[derive(Debug, Error)]
pub enum CreateProductFormError {
    #[error("Create product form validation failed: {0}")]
    Validation(String),
    #[error("Create product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CreateProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CreateProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<CreateProductForm> for NewProduct {
    type Error = CreateProductFormError;

    fn try_from(value: CreateProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            product_id: value.product_id.map(ProductId::new).transpose()?,
            title: value.title.trim().to_string(),
            brand: value.brand.trim().to_string(),
            description: value.description.trim().to_string(),
            current_price: optional_price(value.current_price, "current_price")?,
            original_price: optional_price(value.original_price, "original_price")?,
            availability: value.availability.trim().to_string(),
            image_urls: value.image_urls.into_items(IMAGE_URL_DELIMITER),
            colors: value.colors.into_items(COLOR_DELIMITER),
            sizes: value.sizes.into_items(SIZE_DELIMITER),
            category_path: value.category_path.into_items(CATEGORY_DELIMITER),
            url: value.url.trim().to_string(),
        })
    }
}

/// Body of `PUT /products/{product_id}`.
///
/// Only supplied fields are changed; a price set to `null` is cleared. The
/// identifier itself cannot be changed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductForm {
    #[validate(custom(function = "non_blank"))]
    pub title: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub current_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub original_price: Option<Option<f64>>,
    pub availability: Option<String>,
    pub image_urls: Option<JsonList>,
    pub colors: Option<JsonList>,
    pub sizes: Option<JsonList>,
    pub category_path: Option<JsonList>,
    #[validate(custom(function = "optional_url"))]
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum UpdateProductFormError {
    #[error("Update product form validation failed: {0}")]
    Validation(String),
    #[error("Update product form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Update product form has no fields to update")]
    Empty,
}

impl From<ValidationErrors> for UpdateProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdateProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdateProductForm> for ProductPatch {
    type Error = UpdateProductFormError;

    fn try_from(value: UpdateProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let trimmed = |s: String| s.trim().to_string();
        let patch = Self {
            title: value.title.map(trimmed),
            brand: value.brand.map(trimmed),
            description: value.description.map(trimmed),
            current_price: value
                .current_price
                .map(|price| optional_price(price, "current_price"))
                .transpose()?,
            original_price: value
                .original_price
                .map(|price| optional_price(price, "original_price"))
                .transpose()?,
            availability: value.availability.map(trimmed),
            image_urls: value
                .image_urls
                .map(|list| list.into_items(IMAGE_URL_DELIMITER)),
            colors: value.colors.map(|list| list.into_items(COLOR_DELIMITER)),
            sizes: value.sizes.map(|list| list.into_items(SIZE_DELIMITER)),
            category_path: value
                .category_path
                .map(|list| list.into_items(CATEGORY_DELIMITER)),
            url: value.url.map(trimmed),
        };
        if patch.is_empty() {
            return Err(UpdateProductFormError::Empty);
        }
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_form_builds_query() {
        let form = SearchProductsForm {
            colors: Some(" Red, BLUE ,".into()),
            title: Some("  Air ".into()),
            sort_by: Some("current_price".into()),
            sort_order: Some("DESC".into()),
            ..SearchProductsForm::default()
        };

        let query: ProductListQuery = form.try_into().unwrap();

        assert_eq!(query.title.as_deref(), Some("air"));
        let colors = query.colors.unwrap();
        assert_eq!(colors.len(), 2);
        assert!(colors.contains("red") && colors.contains("blue"));
        let sort = query.sort.unwrap();
        assert_eq!(sort.field, SortField::CurrentPrice);
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn search_form_ignores_unknown_sort_field() {
        let form = SearchProductsForm {
            sort_by: Some("popularity".into()),
            ..SearchProductsForm::default()
        };
        let query: ProductListQuery = form.try_into().unwrap();
        assert!(query.sort.is_none());
    }

    #[test]
    fn search_form_rejects_bad_sort_order_and_price_range() {
        let form = SearchProductsForm {
            sort_by: Some("title".into()),
            sort_order: Some("sideways".into()),
            ..SearchProductsForm::default()
        };
        let result: Result<ProductListQuery, _> = form.try_into();
        assert!(matches!(result, Err(SearchProductsFormError::SortOrder(o)) if o == "sideways"));

        let form = SearchProductsForm {
            min_price: Some(100.0),
            max_price: Some(10.0),
            ..SearchProductsForm::default()
        };
        let result: Result<ProductListQuery, _> = form.try_into();
        assert!(matches!(result, Err(SearchProductsFormError::PriceRange)));
    }

    #[test]
    fn search_form_treats_blank_prices_as_absent() {
        let value = serde_json::json!({ "min_price": " ", "max_price": "120.5" });
        let form: SearchProductsForm = serde_json::from_value(value).unwrap();
        assert_eq!(form.min_price, None);
        assert_eq!(form.max_price, Some(120.5));

        let value = serde_json::json!({ "min_price": "cheap" });
        assert!(serde_json::from_value::<SearchProductsForm>(value).is_err());
    }

    #[test]
    fn search_form_rejects_unknown_keys() {
        let value = serde_json::json!({ "title": "air", "color": "red" });
        assert!(serde_json::from_value::<SearchProductsForm>(value).is_err());
    }

    #[test]
    fn create_form_trims_and_accepts_mixed_lists() {
        let value = serde_json::json!({
            "title": "  Speedcat ",
            "current_price": 99.5,
            "colors": "Red, Black",
            "sizes": [42, "42_5"],
            "category_path": ["Shoes", "Motorsport"],
            "url": "https://eu.puma.com/p/1"
        });
        let form: CreateProductForm = serde_json::from_value(value).unwrap();
        let product: NewProduct = form.try_into().unwrap();

        assert_eq!(product.product_id, None);
        assert_eq!(product.title, "Speedcat");
        assert_eq!(product.colors, vec!["Red", "Black"]);
        assert_eq!(product.sizes, vec!["42", "42_5"]);
        assert_eq!(product.current_price.unwrap(), 99.5);
    }

    #[test]
    fn create_form_rejects_invalid_values() {
        for value in [
            serde_json::json!({ "title": "   " }),
            serde_json::json!({ "title": "Shoe", "current_price": -1.0 }),
            serde_json::json!({ "title": "Shoe", "url": "not a url" }),
            serde_json::json!({ "title": "Shoe", "product_id": " " }),
        ] {
            let form: CreateProductForm = serde_json::from_value(value).unwrap();
            let result: Result<NewProduct, _> = form.try_into();
            assert!(result.is_err());
        }
    }

    #[test]
    fn update_form_distinguishes_null_from_absent() {
        let value = serde_json::json!({ "current_price": null, "brand": " PUMA " });
        let form: UpdateProductForm = serde_json::from_value(value).unwrap();
        let patch: ProductPatch = form.try_into().unwrap();

        assert_eq!(patch.current_price, Some(None));
        assert_eq!(patch.original_price, None);
        assert_eq!(patch.brand.as_deref(), Some("PUMA"));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn update_form_rejects_id_changes_and_empty_bodies() {
        let value = serde_json::json!({ "product_id": "2" });
        assert!(serde_json::from_value::<UpdateProductForm>(value).is_err());

        let form: UpdateProductForm = serde_json::from_value(serde_json::json!({})).unwrap();
        let result: Result<ProductPatch, _> = form.try_into();
        assert!(matches!(result, Err(UpdateProductFormError::Empty)));
    }
}
