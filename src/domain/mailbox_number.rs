use std::fmt;
use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

const MAX_LEN: usize = 32;

/// A rented mailbox identifier, e.g. `B123` or `A-12`
#[derive(Debug, Clone, PartialEq)]
pub struct MailboxNumber(String);

impl FromStr for MailboxNumber {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err("Mailbox number is required".into());
        }
        if value.graphemes(true).count() > MAX_LEN {
            return Err("Mailbox number too long".into());
        }
        if !value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '#')
        {
            return Err("Mailbox number may only contain letters, digits, '-' and '#'".into());
        }
        Ok(Self(value.to_uppercase()))
    }
}

impl AsRef<str> for MailboxNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MailboxNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
