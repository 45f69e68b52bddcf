use std::path::{Path, PathBuf};

use async_trait::async_trait;
use darkroom_core::{ChatId, PhoneNumber};

use crate::error::DeliveryError;

/// Everything a strategy needs to know about one delivery run.
#[derive(Debug, Clone)]
pub struct DeliveryContext {
    /// Conversation the client is waiting in.
    pub chat: ChatId,
    pub phone: PhoneNumber,
    /// Folder being drained.
    pub folder: PathBuf,
    /// Filled in by strategies that publish a shareable link.
    pub public_link: Option<String>,
}

impl DeliveryContext {
    pub fn new(chat: ChatId, phone: PhoneNumber, folder: impl Into<PathBuf>) -> Self {
        Self {
            chat,
            phone,
            folder: folder.into(),
            public_link: None,
        }
    }
}

/// One way of getting files to the client.
///
/// The pipeline calls [`prepare`](Self::prepare) once, then
/// [`deliver`](Self::deliver) for every file and finally
/// [`finish`](Self::finish) once the folder has stayed empty long enough.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn prepare(&self, _ctx: &mut DeliveryContext) -> Result<(), DeliveryError> {
        Ok(())
    }

    /// Deliver a single file. The pipeline removes it afterwards.
    async fn deliver(&self, ctx: &DeliveryContext, file: &Path) -> Result<(), DeliveryError>;

    /// Send the final notification.
    async fn finish(&self, ctx: &DeliveryContext) -> Result<(), DeliveryError>;
}
