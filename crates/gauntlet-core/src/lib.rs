//! Core receiver engine for the Gauntlet fill receiver.
//!
//! Ties the message codec, the authorization gate and the custody ledger
//! together behind a single [`Gauntlet`] entry point, and provides a builder
//! that assembles the receiver from configuration and implementation
//! factories.

pub mod builder;
pub mod engine;
pub mod handlers;

pub use builder::{BuilderError, GauntletBuilder, GauntletFactories};
pub use engine::{event_bus::EventBus, Gauntlet, ReceiverError};
