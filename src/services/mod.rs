pub mod errors;
pub mod export;
pub mod products;
pub mod summary;
pub mod visualization;

pub use errors::{ServiceError, ServiceResult};
