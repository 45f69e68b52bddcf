//! In-memory doubles for the collaborator traits.
//!
//! Enabled with the `testing` feature. Each double records the calls it
//! receives and can be told to fail upcoming calls, which is how the
//! delivery and retry paths are exercised without a network.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use darkroom_core::{ChatId, FileToken, InlineAction, MessageId, PhoneNumber};

use crate::channel::{ChatChannel, SentDocument};
use crate::directory::ClientDirectory;
use crate::error::ProviderError;
use crate::storage::{CloudStorage, FolderStatus};

/// A call observed by [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    SendMessage {
        chat: ChatId,
        text: String,
        actions: Vec<InlineAction>,
    },
    EditMessage {
        chat: ChatId,
        message: MessageId,
        text: String,
        actions: Vec<InlineAction>,
    },
    EditActions {
        chat: ChatId,
        message: MessageId,
        actions: Vec<InlineAction>,
    },
    SendDocument {
        chat: ChatId,
        path: PathBuf,
        file_name: String,
        caption: Option<String>,
        file_token: FileToken,
    },
    SendDocumentByToken {
        chat: ChatId,
        token: FileToken,
    },
    SendPhotoByToken {
        chat: ChatId,
        token: FileToken,
    },
    AnswerCallback {
        callback_id: String,
        text: Option<String>,
    },
    FetchFile {
        token: FileToken,
    },
}

#[derive(Default)]
struct ChannelState {
    calls: Vec<ChannelCall>,
    files: HashMap<FileToken, Bytes>,
    next_id: i64,
    send_failures: VecDeque<ProviderError>,
    document_paths: Vec<PathBuf>,
    fetch_failures: VecDeque<ProviderError>,
}

/// [`ChatChannel`] that records every call and stores uploaded files.
///
/// Uploaded documents get tokens `file-1`, `file-2`, ... and can be fetched
/// back through [`ChatChannel::fetch_file_bytes`].
#[derive(Default)]
pub struct RecordingChannel {
    state: Mutex<ChannelState>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `send_document` calls fail with the given errors, in order.
    pub fn fail_sends(&self, errors: impl IntoIterator<Item = ProviderError>) {
        self.state.lock().send_failures.extend(errors);
    }

    /// Make the next `fetch_file_bytes` calls fail with the given errors, in order.
    pub fn fail_fetches(&self, errors: impl IntoIterator<Item = ProviderError>) {
        self.state.lock().fetch_failures.extend(errors);
    }

    /// Register a stored file so it can be fetched by token.
    pub fn store_file(&self, token: FileToken, bytes: impl Into<Bytes>) {
        self.state.lock().files.insert(token, bytes.into());
    }

    /// Paths passed to `send_document`, including attempts that failed.
    pub fn document_paths(&self) -> Vec<PathBuf> {
        self.state.lock().document_paths.clone()
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<ChannelCall> {
        self.state.lock().calls.clone()
    }

    /// Texts of all plain messages sent so far.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChannelCall::SendMessage { text, .. } | ChannelCall::EditMessage { text, .. } => {
                    Some(text)
                }
                _ => None,
            })
            .collect()
    }

    /// Tokens of all documents uploaded so far.
    pub fn sent_documents(&self) -> Vec<(String, FileToken)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChannelCall::SendDocument {
                    file_name,
                    file_token,
                    ..
                } => Some((file_name, file_token)),
                _ => None,
            })
            .collect()
    }

    fn next_message_id(state: &mut ChannelState) -> MessageId {
        state.next_id += 1;
        MessageId::new(state.next_id)
    }
}

#[async_trait]
impl ChatChannel for RecordingChannel {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<MessageId, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ChannelCall::SendMessage {
            chat,
            text: text.to_owned(),
            actions: actions.to_vec(),
        });
        Ok(Self::next_message_id(&mut state))
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<(), ProviderError> {
        self.state.lock().calls.push(ChannelCall::EditMessage {
            chat,
            message,
            text: text.to_owned(),
            actions: actions.to_vec(),
        });
        Ok(())
    }

    async fn edit_actions(
        &self,
        chat: ChatId,
        message: MessageId,
        actions: &[InlineAction],
    ) -> Result<(), ProviderError> {
        self.state.lock().calls.push(ChannelCall::EditActions {
            chat,
            message,
            actions: actions.to_vec(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<SentDocument, ProviderError> {
        {
            let mut state = self.state.lock();
            state.document_paths.push(path.to_path_buf());
            if let Some(err) = state.send_failures.pop_front() {
                return Err(err);
            }
        }
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut state = self.state.lock();
        let message_id = Self::next_message_id(&mut state);
        let file_token = FileToken::new(format!("file-{}", message_id.get()));
        state.files.insert(file_token.clone(), Bytes::from(bytes));
        state.calls.push(ChannelCall::SendDocument {
            chat,
            path: path.to_path_buf(),
            file_name,
            caption: caption.map(str::to_owned),
            file_token: file_token.clone(),
        });
        Ok(SentDocument {
            file_token,
            message_id,
        })
    }

    async fn send_document_by_token(
        &self,
        chat: ChatId,
        token: &FileToken,
        _caption: Option<&str>,
    ) -> Result<MessageId, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ChannelCall::SendDocumentByToken {
            chat,
            token: token.clone(),
        });
        Ok(Self::next_message_id(&mut state))
    }

    async fn send_photo_by_token(
        &self,
        chat: ChatId,
        token: &FileToken,
        _caption: Option<&str>,
    ) -> Result<MessageId, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ChannelCall::SendPhotoByToken {
            chat,
            token: token.clone(),
        });
        Ok(Self::next_message_id(&mut state))
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ProviderError> {
        self.state.lock().calls.push(ChannelCall::AnswerCallback {
            callback_id: callback_id.to_owned(),
            text: text.map(str::to_owned),
        });
        Ok(())
    }

    async fn fetch_file_bytes(&self, token: &FileToken) -> Result<Bytes, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(ChannelCall::FetchFile {
            token: token.clone(),
        });
        if let Some(err) = state.fetch_failures.pop_front() {
            return Err(err);
        }
        state
            .files
            .get(token)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(token.to_string()))
    }
}

#[derive(Default)]
struct StorageState {
    folders: HashSet<String>,
    published: HashSet<String>,
    uploads: Vec<(PathBuf, String)>,
    upload_failures: VecDeque<ProviderError>,
}

/// [`CloudStorage`] that keeps folders and uploads in memory.
///
/// Published folders get the link `https://disk.test/d/<path>`.
#[derive(Default)]
pub struct MemoryCloudStorage {
    state: Mutex<StorageState>,
}

impl MemoryCloudStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `upload` calls fail with the given errors, in order.
    pub fn fail_uploads(&self, errors: impl IntoIterator<Item = ProviderError>) {
        self.state.lock().upload_failures.extend(errors);
    }

    /// Remote paths of all successful uploads, in order.
    pub fn uploaded_paths(&self) -> Vec<String> {
        self.state
            .lock()
            .uploads
            .iter()
            .map(|(_, remote)| remote.clone())
            .collect()
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.state.lock().folders.contains(path)
    }

    pub fn is_published(&self, path: &str) -> bool {
        self.state.lock().published.contains(path)
    }
}

#[async_trait]
impl CloudStorage for MemoryCloudStorage {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, ProviderError> {
        if self.state.lock().folders.insert(path.to_owned()) {
            Ok(FolderStatus::Created)
        } else {
            Ok(FolderStatus::AlreadyExists)
        }
    }

    async fn publish(&self, path: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        if !state.folders.contains(path) {
            return Err(ProviderError::NotFound(path.to_owned()));
        }
        state.published.insert(path.to_owned());
        Ok(())
    }

    async fn public_link(&self, path: &str) -> Result<Option<String>, ProviderError> {
        let state = self.state.lock();
        Ok(state
            .published
            .contains(path)
            .then(|| format!("https://disk.test/d/{path}")))
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<(), ProviderError> {
        if let Some(err) = self.state.lock().upload_failures.pop_front() {
            return Err(err);
        }
        if !local_path.is_file() {
            return Err(ProviderError::NotFound(local_path.display().to_string()));
        }
        self.state
            .lock()
            .uploads
            .push((local_path.to_path_buf(), remote_path.to_owned()));
        Ok(())
    }
}

/// [`ClientDirectory`] backed by a fixed set of phone numbers.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    phones: HashSet<PhoneNumber>,
}

impl StaticDirectory {
    pub fn new(phones: impl IntoIterator<Item = PhoneNumber>) -> Self {
        Self {
            phones: phones.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ClientDirectory for StaticDirectory {
    async fn list_known_phone_numbers(&self) -> Result<HashSet<PhoneNumber>, ProviderError> {
        Ok(self.phones.clone())
    }
}
