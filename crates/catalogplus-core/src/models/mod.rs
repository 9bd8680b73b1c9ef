//! Shared data models for the gateway and its providers

mod negotiation;
mod query;
mod request_error;
mod service;
mod tier;

pub use negotiation::*;
pub use query::*;
pub use request_error::*;
pub use service::*;
pub use tier::*;
