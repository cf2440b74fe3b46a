//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod profile;
pub mod user;

pub use profile::{ProfileRecord, ProfileRepository};
pub use user::{
    violated_unique_constraint, NewUser, UserRecord, UserRepository, EMAIL_UNIQUE_CONSTRAINT,
    USERNAME_UNIQUE_CONSTRAINT,
};
