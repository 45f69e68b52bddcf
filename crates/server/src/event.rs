//! Incoming chat events in the shape the dispatcher works with.

use darkroom_core::{ChatId, FileToken, MessageId, OwnerId};
use darkroom_telegram::types::{Message, User};
use darkroom_telegram::Update;

/// Who sent an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: OwnerId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl From<User> for Sender {
    fn from(user: User) -> Self {
        Self {
            id: OwnerId::new(user.id),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            language_code: user.language_code,
        }
    }
}

/// Slash commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Info,
}

impl BotCommand {
    /// Recognize `/start`, `/info` and their `@botname` forms.
    fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(n, _)| n);
        match name {
            "start" => Some(Self::Start),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Document,
    Photo,
}

/// One event for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Command {
        chat: ChatId,
        sender: Sender,
        command: BotCommand,
    },
    /// Free text; expected to be a phone number.
    Text {
        chat: ChatId,
        sender: Sender,
        text: String,
    },
    /// A file the client sent to the bot.
    Media {
        chat: ChatId,
        sender: Sender,
        kind: MediaKind,
        token: FileToken,
        caption: Option<String>,
    },
    /// A button press on one of the bot's messages.
    Callback {
        id: String,
        sender: Sender,
        chat: ChatId,
        message: MessageId,
        data: String,
        /// File name of the document the pressed message carries, if any.
        document_name: Option<String>,
    },
}

impl Incoming {
    /// Convert a Bot API update. Updates the bot does not act on yield `None`.
    pub fn from_update(update: Update) -> Option<Self> {
        if let Some(query) = update.callback_query {
            let message = query.message?;
            return Some(Self::Callback {
                id: query.id,
                sender: query.from.into(),
                chat: ChatId::new(message.chat.id),
                message: MessageId::new(message.message_id),
                data: query.data?,
                document_name: message.document.and_then(|d| d.file_name),
            });
        }
        update.message.and_then(Self::from_message)
    }

    fn from_message(message: Message) -> Option<Self> {
        let chat = ChatId::new(message.chat.id);
        let sender: Sender = message.from?.into();

        if let Some(document) = message.document {
            return Some(Self::Media {
                chat,
                sender,
                kind: MediaKind::Document,
                token: FileToken::new(document.file_id),
                caption: message.caption,
            });
        }
        // Sizes are listed smallest first.
        if let Some(largest) = message.photo.and_then(|sizes| sizes.into_iter().last()) {
            return Some(Self::Media {
                chat,
                sender,
                kind: MediaKind::Photo,
                token: FileToken::new(largest.file_id),
                caption: message.caption,
            });
        }

        let text = message.text?;
        match BotCommand::parse(&text) {
            Some(command) => Some(Self::Command {
                chat,
                sender,
                command,
            }),
            None => Some(Self::Text { chat, sender, text }),
        }
    }
}
