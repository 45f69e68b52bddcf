//! Getting a session's photos to the client.
//!
//! [`DeliveryPipeline`] drains a client's destination folder while the
//! session is still producing photos, handing each file to a
//! [`DeliveryStrategy`]:
//!
//! - [`ChatDelivery`] sends every photo as a chat attachment with a
//!   "black and white" button.
//! - [`CloudDelivery`] uploads into a published cloud folder and sends the
//!   link at the end.
//!
//! [`GrayscaleConversion`] serves the button presses later on.

pub mod chat;
pub mod cloud;
pub mod config;
pub mod convert;
pub mod error;
pub mod notice;
pub mod pipeline;
pub mod strategy;

pub use chat::ChatDelivery;
pub use cloud::{CloudDelivery, remote_folder};
pub use config::{DeliveryConfig, FailedItemPolicy};
pub use convert::GrayscaleConversion;
pub use error::DeliveryError;
pub use pipeline::{DeliveryOutcome, DeliveryPipeline, DeliveryReport};
pub use strategy::{DeliveryContext, DeliveryStrategy};
