//! Auth domain - token identity for hospital accounts
//!
//! Authentication happens upstream (the hospital identity service issues the
//! tokens); this domain only creates and verifies them. Authorization for
//! dispatch operations is ownership based and lives with the domain logic.

pub mod jwt;

pub use jwt::{Claims, JwtService, UserRole};
