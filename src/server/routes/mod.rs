mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use super::errors::ApiError;

pub type ApiResponse<T> = Result<T, ApiError>;

/// Placeholder sent as `current_category` where no single category applies.
pub const DEFAULT_CURRENT_CATEGORY: &str = "History";
