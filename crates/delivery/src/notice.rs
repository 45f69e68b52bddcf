//! Texts sent to the client during delivery.

pub const NO_PHOTOS: &str = "You have no photos at the moment.";
pub const ALL_SENT: &str = "All photos have been sent.";
pub const DELIVERY_FAILED: &str =
    "Sorry, we could not deliver your photos right now. Please try again later.";
pub const SHARE_INVITATION: &str = "We would be glad if you shared your photos with us for \
    publishing in our group. Just send them to this chat.";
pub const GRAYSCALE_BUTTON: &str = "Get black and white photo";

pub fn cloud_link(link: &str) -> String {
    format!("Your photos are uploaded to the cloud. Download link: {link}")
}

pub const CLOUD_DONE_NO_LINK: &str = "Your photos are uploaded to the cloud.";
