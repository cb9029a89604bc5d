//! Shared server utilities: error mapping, result aliases, logging setup.

pub mod error;
pub mod logger;
pub mod result;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
