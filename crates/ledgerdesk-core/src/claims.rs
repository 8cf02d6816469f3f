//! Unverified JWT claim inspection.
//!
//! The client reads a few claims out of its own access token (scope
//! context, expiry) without a server round-trip. Signatures are **not**
//! verified here; the API remains the authority on token validity.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::tokens::AccessToken;

/// Claims decoded from an access token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Decode the payload segment of a JWT.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not have at least two segments,
    /// or the payload is not base64url-encoded JSON object.
    pub fn decode(token: &AccessToken) -> Result<Self, Error> {
        let mut parts = token.as_str().splitn(3, '.');
        let payload = match (parts.next(), parts.next()) {
            (Some(_), Some(payload)) if !payload.is_empty() => payload,
            _ => return Err(malformed("expected header.payload.signature")),
        };

        // Some issuers pad the segment even though RFC 7515 forbids it.
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| malformed(&format!("payload is not base64url: {}", e)))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(malformed("payload is not a JSON object")),
            Err(e) => Err(malformed(&format!("payload is not JSON: {}", e))),
        }
    }

    /// Returns a claim as a string. Numeric claims are rendered in decimal.
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns the raw claim value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the `sub` claim.
    pub fn subject(&self) -> Option<String> {
        self.get_string("sub")
    }

    /// Returns the `exp` claim as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.0.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }
}

fn malformed(reason: &str) -> Error {
    InvalidInputError::Token {
        reason: reason.to_string(),
    }
    .into()
}
