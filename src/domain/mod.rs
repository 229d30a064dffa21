pub mod product;
pub mod summary;
pub mod table;
pub mod types;
