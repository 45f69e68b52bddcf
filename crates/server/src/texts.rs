//! Texts the bot sends in reply to clients.

use crate::event::Sender;

pub const START_PROMPT: &str =
    "Authorization required. Please enter the phone number you used to book the session.";
pub const INVALID_PHONE: &str = "Invalid phone number format. Please try again.";
pub const AUTHORIZED: &str = "Authorization passed, you can start the photo session.";
pub const DIRECTORY_UNAVAILABLE: &str =
    "We could not check your number right now. Please try again later.";
pub const TAKE_PHOTOS: &str = "Please take your photos.";
pub const BUSY: &str = "The bot is busy, please try again later.";
pub const START_FAILED: &str = "The session could not be started. Please try again later.";
pub const AWAIT_MESSAGE: &str = "You will get a message once all photos are uploaded.";
pub const AWAIT_LINK: &str = "You will get a link once the photos are uploaded.";
pub const PHOTO_UNAVAILABLE: &str = "This photo is no longer available.";
pub const CONVERSION_FAILED: &str = "Could not convert the photo. Please try again later.";
pub const SESSION_ENDED: &str = "The photo session has ended.";
pub const NOT_SESSION_OWNER: &str = "Only the person who started the session can end it.";
pub const NO_ACTIVE_SESSION: &str = "There is no active session.";
pub const UNKNOWN_ACTION: &str = "This button is no longer valid.";

pub const START_SESSION_BUTTON: &str = "Start photo session";
pub const DELIVER_TO_CHAT_BUTTON: &str = "Get photos in chat";
pub const UPLOAD_TO_CLOUD_BUTTON: &str = "Upload photos to the cloud";
pub const END_SESSION_BUTTON: &str = "End session";

/// Reply to an unknown phone number, with the sign-up link if one is set.
pub fn not_authorized(register_url: Option<&str>) -> String {
    match register_url {
        Some(url) => {
            format!("Authorization failed, please try again. Or sign up here: {url}")
        }
        None => "Authorization failed, please try again.".to_owned(),
    }
}

/// Reply to `/info`.
pub fn user_info(sender: &Sender, chat: i64) -> String {
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_owned();
    format!(
        "First name: {}\nLast name: {}\nUsername: @{}\nID: {}\nChat ID: {}\nLanguage: {}",
        sender.first_name,
        or_dash(sender.last_name.as_deref()),
        or_dash(sender.username.as_deref()),
        sender.id,
        chat,
        or_dash(sender.language_code.as_deref()),
    )
}
