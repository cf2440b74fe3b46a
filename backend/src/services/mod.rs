//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the token issuer.

pub mod user;

pub use user::UserService;
