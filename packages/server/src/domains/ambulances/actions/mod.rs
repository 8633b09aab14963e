//! Ambulance domain actions - business logic functions

mod queries;
mod register_ambulance;

pub use queries::my_ambulance;
pub use register_ambulance::register_ambulance;
