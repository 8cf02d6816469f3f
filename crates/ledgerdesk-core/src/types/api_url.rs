//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the remote REST API.
///
/// The URL may carry a path prefix (e.g. `https://api.example.com/v1`);
/// request paths are appended to it.
///
/// # Example
///
/// ```
/// use ledgerdesk_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.example.com/v1/").unwrap();
/// assert_eq!(api.endpoint("/auth/refresh").unwrap(),
///            "https://api.example.com/v1/auth/refresh");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, has no host, or uses
    /// plain HTTP for a non-local host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the full URL for a request path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not start with `/` or contains
    /// whitespace or a scheme.
    pub fn endpoint(&self, path: &str) -> Result<String, Error> {
        validate_path(path)?;
        let base = self.0.as_str().trim_end_matches('/');
        Ok(format!("{}{}", base, path))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Validate a request path relative to the API base URL.
pub(crate) fn validate_path(path: &str) -> Result<(), Error> {
    let reason = if !path.starts_with('/') {
        Some("must start with '/'")
    } else if path.contains("://") {
        Some("must be relative to the API URL")
    } else if path.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InvalidInputError::Path {
            value: path.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert_eq!(api.host(), Some("api.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            api.endpoint("/products").unwrap(),
            "http://127.0.0.1:8080/products"
        );
    }

    #[test]
    fn keeps_path_prefix() {
        let api = ApiUrl::new("https://api.example.com/v1").unwrap();
        assert_eq!(
            api.endpoint("/invoices/42").unwrap(),
            "https://api.example.com/v1/invoices/42"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://api.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/auth/refresh").is_err());
    }

    #[test]
    fn rejects_query_in_base() {
        assert!(ApiUrl::new("https://api.example.com/?x=1").is_err());
    }

    #[test]
    fn endpoint_rejects_bad_paths() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert!(api.endpoint("products").is_err());
        assert!(api.endpoint("/https://evil.example.com").is_err());
        assert!(api.endpoint("/a b").is_err());
    }

    #[test]
    fn serde_round_trip_validates() {
        let api: ApiUrl = serde_json::from_str("\"https://api.example.com\"").unwrap();
        assert_eq!(api.host(), Some("api.example.com"));
        assert!(serde_json::from_str::<ApiUrl>("\"ftp://x\"").is_err());
    }
}
