use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of digits that follow the `8` trunk prefix.
const SUBSCRIBER_DIGITS: usize = 10;

/// A phone number starting with `+7`.
///
/// Construct one with [`PhoneNumber::normalize`]. Numbers typed with the
/// domestic `8` prefix become `+7XXXXXXXXXX`; numbers already starting with
/// `+7` are kept exactly as written, so `+7 916 123-45-67` stays that way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize user input.
    ///
    /// `8` followed by ten more digits is rewritten to `+7` plus those
    /// digits. Input already starting with `+7` is returned unchanged.
    /// Anything else is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use darkroom_core::PhoneNumber;
    ///
    /// let phone = PhoneNumber::normalize("89161234567").unwrap();
    /// assert_eq!(phone.as_str(), "+79161234567");
    /// assert_eq!(PhoneNumber::normalize("+7 916 1234567").unwrap().as_str(), "+7 916 1234567");
    /// assert!(PhoneNumber::normalize("12345").is_err());
    /// ```
    pub fn normalize(input: &str) -> Result<Self, CoreError> {
        if input.starts_with("+7") {
            return Ok(Self(input.to_owned()));
        }
        match input.strip_prefix('8') {
            Some(rest)
                if rest.len() == SUBSCRIBER_DIGITS && rest.bytes().all(|b| b.is_ascii_digit()) =>
            {
                Ok(Self(format!("+7{rest}")))
            }
            _ => Err(CoreError::InvalidPhoneNumber(input.to_owned())),
        }
    }

    /// Return the normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number as a single path component: path separators and NUL are
    /// replaced with `_`.
    #[must_use]
    pub fn folder_name(&self) -> String {
        self.0
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_prefix_is_rewritten() {
        for raw in ["89161234567", "80000000000", "89999999999"] {
            let phone = PhoneNumber::normalize(raw).unwrap();
            assert_eq!(phone.as_str(), format!("+7{}", &raw[1..]));
        }
    }

    #[test]
    fn plus_seven_input_is_kept_as_written() {
        for raw in [
            "+79161234567",
            "+7 916 123 45 67",
            "+7(916)1234567",
            "+7916123456",
            "+7",
        ] {
            let phone = PhoneNumber::normalize(raw).unwrap();
            assert_eq!(phone.as_str(), raw);
        }
    }

    #[test]
    fn other_inputs_are_invalid() {
        for raw in [
            "",
            "9161234567",
            "+19161234567",
            "8916123456",
            "891612345678",
            "8916123456a",
            "8 916 123 45 67",
            "  89161234567",
            " +79161234567",
            "hello",
        ] {
            assert_eq!(
                PhoneNumber::normalize(raw),
                Err(CoreError::InvalidPhoneNumber(raw.to_owned())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn folder_name_is_one_path_component() {
        let plain = PhoneNumber::normalize("89161234567").unwrap();
        assert_eq!(plain.folder_name(), "+79161234567");

        let spaced = PhoneNumber::normalize("+7 (916) 123").unwrap();
        assert_eq!(spaced.folder_name(), "+7 (916) 123");

        let sneaky = PhoneNumber::normalize("+7/../../etc").unwrap();
        assert_eq!(sneaky.folder_name(), "+7_.._.._etc");
        assert_eq!(std::path::Path::new(&sneaky.folder_name()).components().count(), 1);
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let phone: PhoneNumber = serde_json::from_str("\"89161234567\"").unwrap();
        assert_eq!(phone.as_str(), "+79161234567");
        assert!(serde_json::from_str::<PhoneNumber>("\"123\"").is_err());
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+79161234567\"");
    }
}
