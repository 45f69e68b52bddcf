use serde::{Deserialize, Serialize};

use crate::callback::CallbackCommand;

/// An interactive button attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAction {
    /// Label shown to the user.
    pub label: String,
    /// Payload returned by the channel when the button is pressed.
    pub callback_data: String,
}

impl InlineAction {
    #[must_use]
    pub fn new(label: impl Into<String>, command: &CallbackCommand) -> Self {
        Self {
            label: label.into(),
            callback_data: command.to_string(),
        }
    }
}
