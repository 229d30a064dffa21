//! Core library exports for the footwear catalog.
//!
//! The `data` feature exposes the product table: domain types, flat-file
//! models, the loader and the in-memory repository with its filter/sort core.
//! The `server` feature adds the HTTP services and routes, and `collector`
//! adds the offline site collectors that produce the flat files.

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod loader;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;

#[cfg(feature = "collector")]
pub mod collector;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Category label used for products without a category path.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Separator used when a category path is rendered as a single string.
pub const CATEGORY_SEPARATOR: &str = " > ";
