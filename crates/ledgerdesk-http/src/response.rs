//! Response values returned to callers.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use ledgerdesk_core::Result;
use ledgerdesk_core::error::{Error, InvalidInputError, ProtocolError};

/// A buffered API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Vec<u8>,
}

/// Error body shape used by the API (`{"error": ..., "message": ...}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body as a JSON value, if it is JSON.
    pub fn json_value(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// Deserialize the body.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("unexpected response body: {}", e),
            })
        })
    }

    /// Build the protocol error for a non-success response.
    pub(crate) fn to_protocol_error(&self) -> ProtocolError {
        match serde_json::from_slice::<ErrorBody>(&self.body) {
            Ok(body) => ProtocolError::new(self.status, body.error, body.message),
            Err(_) => ProtocolError::new(self.status, None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn protocol_error_reads_json_body() {
        let body = json!({ "error": "Forbidden", "message": "wrong company" }).to_string();
        let response = ApiResponse::new(403, body.into_bytes());
        let err = response.to_protocol_error();
        assert_eq!(err.status, 403);
        assert_eq!(err.error.as_deref(), Some("Forbidden"));
        assert_eq!(err.message.as_deref(), Some("wrong company"));
    }

    #[test]
    fn protocol_error_tolerates_plain_text() {
        let response = ApiResponse::new(500, b"Internal Server Error".to_vec());
        let err = response.to_protocol_error();
        assert_eq!(err.status, 500);
        assert!(err.message.is_none());
    }

    #[test]
    fn empty_body_has_no_json() {
        let response = ApiResponse::new(204, Vec::new());
        assert!(response.is_success());
        assert!(response.json_value().is_none());
    }
}
