//! Domain types shared by every darkroom crate.
//!
//! A *session* is one client's bounded photo-capture window. Photos land in a
//! shared watch folder, get moved into a per-phone destination folder, and
//! are later delivered through the chat channel or uploaded to cloud storage.

pub mod action;
pub mod asset;
pub mod callback;
pub mod delivered;
pub mod error;
pub mod phone;
pub mod record;
pub mod session;
pub mod types;

pub use action::InlineAction;
pub use asset::{ImageAsset, ImageExtension};
pub use callback::{CallbackCommand, MAX_CALLBACK_BYTES};
pub use delivered::{ContentHash, DeliveredFile};
pub use error::CoreError;
pub use phone::PhoneNumber;
pub use record::ClientFolderRecord;
pub use session::{Session, destination_for};
pub use types::{ChatId, FileToken, MessageId, OwnerId};
