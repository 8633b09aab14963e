/// Authentication module for Lifeline
///
/// Token verification happens in the JWT middleware; this module only carries
/// the error surfaced when a route requires an authenticated caller and none
/// is present. Domain-level ownership checks live next to the domain logic
/// they protect (see `domains::ambulances::access`).
mod errors;

pub use errors::AuthError;
