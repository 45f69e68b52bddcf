use thiserror::Error;

/// Errors raised while parsing or validating domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The input cannot be normalized into a `+7XXXXXXXXXX` phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// A callback payload did not match any known command.
    #[error("unrecognized callback payload: {0}")]
    InvalidCallback(String),

    /// A content hash was not 32 lowercase hex characters.
    #[error("invalid content hash: {0}")]
    InvalidContentHash(String),
}
