//! The single active photo session.
//!
//! At most one session runs at a time. Starting one records the client's
//! destination folder, begins watching the shared capture folder, and arms
//! an idle timer that ends the session once no photo has been accepted for
//! the configured timeout.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
mod monitor;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use controller::{ActiveSession, SessionController};
pub use error::SessionError;
pub use registry::SessionRegistry;
