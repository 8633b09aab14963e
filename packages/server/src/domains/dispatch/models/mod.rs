pub mod request;

pub use request::{DispatchRequest, RequestStatus};
