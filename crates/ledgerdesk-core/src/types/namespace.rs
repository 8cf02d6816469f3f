//! Storage namespace type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated storage namespace.
///
/// Each session kind persists its tokens under its own namespace so that
/// admin and user sessions never collide. Namespaces double as directory
/// names for the file store, so they are restricted to a safe alphabet.
///
/// # Example
///
/// ```
/// use ledgerdesk_core::StorageNamespace;
///
/// let ns = StorageNamespace::new("admin").unwrap();
/// assert_eq!(ns.as_str(), "admin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageNamespace(String);

impl StorageNamespace {
    /// Create a new namespace from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, longer than 64 characters,
    /// or contains anything but ASCII letters, digits, `-` and `_`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Namespace for a built-in session kind; the literals are known valid.
    pub(crate) fn preset(s: &'static str) -> Self {
        Self(s.to_string())
    }

    /// Returns the namespace string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(InvalidInputError::Namespace {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if s.len() > 64 {
            return Err(InvalidInputError::Namespace {
                value: s.to_string(),
                reason: "exceeds maximum length of 64 characters".to_string(),
            }
            .into());
        }

        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(InvalidInputError::Namespace {
                value: s.to_string(),
                reason: format!("contains invalid character '{}'", c),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for StorageNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StorageNamespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StorageNamespace {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<StorageNamespace> for String {
    fn from(ns: StorageNamespace) -> Self {
        ns.0
    }
}
