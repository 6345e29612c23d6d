//! Handlers for inbound receiver calls.

pub mod fill;

pub use fill::FillHandler;
