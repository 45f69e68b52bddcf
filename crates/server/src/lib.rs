//! The darkroom bot: configuration, wiring and the update dispatcher.

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod state_factory;
pub mod telemetry;
pub mod texts;
