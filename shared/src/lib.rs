//! EduNova Shared Library
//!
//! Wire types, validation rules and error types shared by the backend
//! and its clients.

pub mod errors;
pub mod password_validation;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
pub use validation::FieldErrors;
