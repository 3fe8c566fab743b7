use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a contact prefers to be addressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayNamePreference {
    Company,
    Person,
    Both,
    #[default]
    Auto,
}

impl AsRef<str> for DisplayNamePreference {
    fn as_ref(&self) -> &str {
        match self {
            Self::Company => "company",
            Self::Person => "person",
            Self::Both => "both",
            Self::Auto => "auto",
        }
    }
}

impl FromStr for DisplayNamePreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "company" => Ok(Self::Company),
            "person" => Ok(Self::Person),
            "both" => Ok(Self::Both),
            "auto" => Ok(Self::Auto),
            other => Err(format!("{} is not a valid display name preference", other)),
        }
    }
}

impl_text_column!(DisplayNamePreference);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Active,
    Pending,
    Archived,
}

impl AsRef<str> for ContactStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "archived" => Ok(Self::Archived),
            other => Err(format!("{} is not a valid contact status", other)),
        }
    }
}

impl_text_column!(ContactStatus);

/// Language(s) used when writing to a contact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredLanguage {
    #[default]
    En,
    Zh,
    Both,
}

impl AsRef<str> for PreferredLanguage {
    fn as_ref(&self) -> &str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
            Self::Both => "both",
        }
    }
}

impl FromStr for PreferredLanguage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            "both" => Ok(Self::Both),
            other => Err(format!("{} is not a valid language", other)),
        }
    }
}

impl_text_column!(PreferredLanguage);

/// Derive the name a contact is shown and addressed by.
///
/// An explicit preference wins when the name it asks for is present;
/// otherwise both names are joined when available, then whichever exists.
/// Returns `None` for a contact without any name.
pub fn display_name(
    preference: DisplayNamePreference,
    company_name: Option<&str>,
    contact_person: Option<&str>,
) -> Option<String> {
    let company = company_name.map(str::trim).filter(|s| !s.is_empty());
    let person = contact_person.map(str::trim).filter(|s| !s.is_empty());

    match (preference, company, person) {
        (DisplayNamePreference::Company, Some(company), _) => Some(company.to_string()),
        (DisplayNamePreference::Person, _, Some(person)) => Some(person.to_string()),
        (_, Some(company), Some(person)) => Some(format!("{} - {}", company, person)),
        (_, Some(company), None) => Some(company.to_string()),
        (_, None, Some(person)) => Some(person.to_string()),
        (_, None, None) => None,
    }
}
