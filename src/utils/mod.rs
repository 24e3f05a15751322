//! Utility modules

pub mod error;
pub mod pagination;

pub use error::{AppError, AppResult};
pub use pagination::{Page, PageParams, ResolvedQuery, SortOrder};
