use std::fmt;
use std::str::FromStr;

use crate::delivered::ContentHash;
use crate::error::CoreError;
use crate::phone::PhoneNumber;

const START_SESSION: &str = "start_session";
const DELIVER_TO_CHAT: &str = "deliver_to_chat";
const UPLOAD_TO_CLOUD: &str = "upload_to_cloud";
const TO_GRAYSCALE: &str = "to_grayscale";
const END_SESSION: &str = "end_session";

/// Largest callback payload the messaging channel accepts, in bytes.
pub const MAX_CALLBACK_BYTES: usize = 64;

/// Button-press commands understood by the bot.
///
/// Rendered as `<name>:<argument>` (or just `<name>` for commands without an
/// argument) so the payload stays within the 64-byte callback limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackCommand {
    StartSession(PhoneNumber),
    DeliverToChat(PhoneNumber),
    UploadToCloud(PhoneNumber),
    ConvertToGrayscale(ContentHash),
    EndSession,
}

impl CallbackCommand {
    /// Whether every button carrying `phone` renders within
    /// [`MAX_CALLBACK_BYTES`].
    #[must_use]
    pub fn phone_fits(phone: &PhoneNumber) -> bool {
        [START_SESSION, DELIVER_TO_CHAT, UPLOAD_TO_CLOUD]
            .iter()
            .all(|name| name.len() + 1 + phone.as_str().len() <= MAX_CALLBACK_BYTES)
    }
}

impl fmt::Display for CallbackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartSession(p) => write!(f, "{START_SESSION}:{p}"),
            Self::DeliverToChat(p) => write!(f, "{DELIVER_TO_CHAT}:{p}"),
            Self::UploadToCloud(p) => write!(f, "{UPLOAD_TO_CLOUD}:{p}"),
            Self::ConvertToGrayscale(h) => write!(f, "{TO_GRAYSCALE}:{h}"),
            Self::EndSession => f.write_str(END_SESSION),
        }
    }
}

impl FromStr for CallbackCommand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidCallback(s.to_owned());
        if s.len() > MAX_CALLBACK_BYTES {
            return Err(invalid());
        }
        let (name, arg) = s.split_once(':').unwrap_or((s, ""));

        match name {
            START_SESSION => Ok(Self::StartSession(
                PhoneNumber::normalize(arg).map_err(|_| invalid())?,
            )),
            DELIVER_TO_CHAT => Ok(Self::DeliverToChat(
                PhoneNumber::normalize(arg).map_err(|_| invalid())?,
            )),
            UPLOAD_TO_CLOUD => Ok(Self::UploadToCloud(
                PhoneNumber::normalize(arg).map_err(|_| invalid())?,
            )),
            TO_GRAYSCALE => Ok(Self::ConvertToGrayscale(
                arg.parse().map_err(|_| invalid())?,
            )),
            END_SESSION if arg.is_empty() => Ok(Self::EndSession),
            _ => Err(invalid()),
        }
    }
}
