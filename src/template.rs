use std::collections::HashMap;
use std::fmt;

use regex::{Captures, Regex};

use serde::{Deserialize, Serialize};

/// A value that can be substituted into a message template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => number.fmt(f),
        }
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Named values available to a template, keyed case-sensitively
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateVariables(HashMap<String, TemplateValue>);

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TemplateValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another set of variables into this one; `other` wins on collision
    pub fn merge(&mut self, other: TemplateVariables) {
        self.0.extend(other.0);
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateVariables
where
    K: Into<String>,
    V: Into<TemplateValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Replace every `{Name}` and `{{Name}}` placeholder in `template`.
///
/// Tokens are matched in a single left-to-right pass, trying the double-brace
/// form first, so the two syntaxes never nest into each other. A placeholder
/// without a value becomes the empty string. Substituted values are not
/// scanned again.
pub fn resolve(template: &str, variables: &TemplateVariables) -> String {
    lazy_static::lazy_static! {
        static ref TOKEN_REGEX: Regex =
            Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}|\{([A-Za-z0-9_]+)\}").unwrap();
    }

    TOKEN_REGEX
        .replace_all(template, |caps: &Captures| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|name| variables.get(name.as_str()))
                .map(ToString::to_string)
                .unwrap_or_default()
        })
        .into_owned()
}
