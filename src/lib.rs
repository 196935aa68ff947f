//! Query, classify and manage student grade records served by a grades REST backend.

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ApiError, FormError, QueryError};
pub use models::{GradeRecord, Verdict};
pub use utils::query::{classify, filter_by_name, format_display_date};
