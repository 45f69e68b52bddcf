//! Interfaces to the collaborators darkroom depends on but does not own.
//!
//! - [`ChatChannel`]: the messaging front-end clients talk to.
//! - [`CloudStorage`]: the object store used for cloud delivery.
//! - [`ClientDirectory`]: the registry that authorizes phone numbers.
//!
//! Concrete adapters live in the `darkroom-telegram`, `darkroom-yadisk` and
//! `darkroom-yclients` crates.

pub mod channel;
pub mod directory;
pub mod error;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use channel::{ChatChannel, SentDocument};
pub use directory::ClientDirectory;
pub use error::ProviderError;
pub use storage::{CloudStorage, FolderStatus};
