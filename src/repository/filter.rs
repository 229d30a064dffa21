//! Predicate filters and ordering over the product table.
//!
//! Filtering is a linear scan; each supplied predicate must hold. Sorting is
//! stable, so products with equal keys keep their table order.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::product::Product;
use crate::domain::table::TableRow;
use crate::domain::types::ProductPrice;
use crate::repository::ProductListQuery;

/// Field a search result can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ProductId,
    Title,
    Brand,
    Description,
    CurrentPrice,
    OriginalPrice,
    Availability,
    CategoryPath,
    Url,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductId => "product_id",
            Self::Title => "title",
            Self::Brand => "brand",
            Self::Description => "description",
            Self::CurrentPrice => "current_price",
            Self::OriginalPrice => "original_price",
            Self::Availability => "availability",
            Self::CategoryPath => "category_path",
            Self::Url => "url",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "product_id" => Ok(Self::ProductId),
            "title" => Ok(Self::Title),
            "brand" => Ok(Self::Brand),
            "description" => Ok(Self::Description),
            "current_price" => Ok(Self::CurrentPrice),
            "original_price" => Ok(Self::OriginalPrice),
            "availability" => Ok(Self::Availability),
            "category_path" => Ok(Self::CategoryPath),
            "url" => Ok(Self::Url),
            other => Err(other.to_string()),
        }
    }
}

/// Direction of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(other.to_string()),
        }
    }
}

/// Requested ordering of a search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl ProductSort {
    /// Compares two products. Missing prices sort last in either direction.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self.field {
            SortField::CurrentPrice => compare_prices(a.current_price, b.current_price, self.order),
            SortField::OriginalPrice => {
                compare_prices(a.original_price, b.original_price, self.order)
            }
            SortField::CategoryPath => self
                .order
                .apply(compare_text(&a.category_label(), &b.category_label())),
            field => self
                .order
                .apply(compare_text(text_key(a, field), text_key(b, field))),
        }
    }
}

fn text_key(product: &Product, field: SortField) -> &str {
    match field {
        SortField::ProductId => product.product_id.as_str(),
        SortField::Title => &product.title,
        SortField::Brand => &product.brand,
        SortField::Description => &product.description,
        SortField::Availability => &product.availability,
        SortField::Url => &product.url,
        SortField::CurrentPrice | SortField::OriginalPrice | SortField::CategoryPath => "",
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_prices(a: Option<ProductPrice>, b: Option<ProductPrice>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => order.apply(a.total_cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn contains_text(haystack: &str, needle: &Option<String>) -> bool {
    needle
        .as_ref()
        .is_none_or(|needle| haystack.to_lowercase().contains(needle))
}

fn equals_text(value: &str, expected: &Option<String>) -> bool {
    expected
        .as_ref()
        .is_none_or(|expected| value.trim().to_lowercase() == *expected)
}

impl ProductListQuery {
    /// Returns `true` when `row` satisfies every supplied filter.
    pub fn matches(&self, row: &TableRow) -> bool {
        let product = row.product();
        let keys = row.keys();

        contains_text(&product.title, &self.title)
            && contains_text(&product.description, &self.description)
            && self
                .product_id
                .as_ref()
                .is_none_or(|id| product.product_id.matches(id))
            && equals_text(&product.brand, &self.brand)
            && equals_text(&product.availability, &self.availability)
            && self
                .colors
                .as_ref()
                .is_none_or(|wanted| !wanted.is_disjoint(&keys.colors))
            && self
                .sizes
                .as_ref()
                .is_none_or(|wanted| !wanted.is_disjoint(&keys.sizes))
            && self.price_in_range(product.current_price)
    }

    fn price_in_range(&self, price: Option<ProductPrice>) -> bool {
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        let Some(price) = price.map(ProductPrice::get) else {
            return false;
        };
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }

    /// Filters `rows` and orders the matches.
    pub fn apply(&self, rows: &[TableRow]) -> Vec<Product> {
        let mut products: Vec<Product> = rows
            .iter()
            .filter(|row| self.matches(row))
            .map(|row| row.product().clone())
            .collect();
        if let Some(sort) = &self.sort {
            // `sort_by` is stable: equal keys keep table order.
            products.sort_by(|a, b| sort.compare(a, b));
        }
        products
    }
}
