pub mod ambulance;

pub use ambulance::Ambulance;
