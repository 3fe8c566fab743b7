use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a logged mail item
///
/// `Received -> Notified -> Picked Up`, with `Forward`, `Scanned Document`,
/// `Abandoned Package` and `Resolved` as terminal side branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MailStatus {
    #[default]
    Received,
    Notified,
    #[serde(rename = "Picked Up")]
    PickedUp,
    Forward,
    #[serde(rename = "Scanned Document")]
    Scanned,
    #[serde(rename = "Abandoned Package")]
    Abandoned,
    Resolved,
}

impl MailStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Received => 0,
            Self::Notified => 1,
            _ => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Still sitting on the shelf, waiting for the customer
    pub fn awaits_pickup(self) -> bool {
        !self.is_terminal()
    }

    /// Statuses only move forward; re-notifying a notified item is allowed
    pub fn can_transition_to(self, next: MailStatus) -> bool {
        if self == Self::Notified && next == Self::Notified {
            return true;
        }
        next.rank() > self.rank()
    }
}

impl AsRef<str> for MailStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Received => "Received",
            Self::Notified => "Notified",
            Self::PickedUp => "Picked Up",
            Self::Forward => "Forward",
            Self::Scanned => "Scanned Document",
            Self::Abandoned => "Abandoned Package",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for MailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for MailStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "received" => Ok(Self::Received),
            "notified" => Ok(Self::Notified),
            "picked up" => Ok(Self::PickedUp),
            "forward" => Ok(Self::Forward),
            "scanned document" | "scanned" => Ok(Self::Scanned),
            "abandoned package" | "abandoned" => Ok(Self::Abandoned),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("{} is not a valid mail status", other)),
        }
    }
}

impl_text_column!(MailStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Letter,
    Package,
}

impl AsRef<str> for ItemType {
    fn as_ref(&self) -> &str {
        match self {
            Self::Letter => "Letter",
            Self::Package => "Package",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "letter" => Ok(Self::Letter),
            "package" => Ok(Self::Package),
            other => Err(format!("{} is not a valid item type", other)),
        }
    }
}

impl_text_column!(ItemType);
