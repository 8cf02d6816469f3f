//! HTTP transport.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::{debug, instrument, trace};

use ledgerdesk_core::error::{Error, TransportError};
use ledgerdesk_core::{AccessToken, ApiUrl, RefreshToken, Result};

use crate::request::ApiRequest;
use crate::response::ApiResponse;

/// Convert a reqwest failure into the transport taxonomy.
fn transport_error(err: reqwest::Error, timeout: Duration) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

/// Low-level HTTP client bound to one API base URL.
///
/// Knows nothing about sessions: callers pass the credential to attach.
/// The cookie store lets cookie-carried refresh credentials ride along.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: ApiUrl,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new client for the given API.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(base_url: ApiUrl, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ledgerdesk/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| transport_error(e, timeout))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Returns the API URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    /// Dispatch a request, attaching `token` as the bearer credential.
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// are errors.
    #[instrument(skip(self, request, token), fields(method = %request.method(), path = request.path()))]
    pub async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let url = self.base_url.endpoint(request.path())?;
        debug!(authed = token.is_some(), "HTTP request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .header(ACCEPT, "application/json");

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        self.buffer(response).await
    }

    /// POST to the refresh endpoint with no body, carrying only the
    /// refresh credential.
    ///
    /// With `refresh_token == None` nothing is attached and the cookie
    /// store supplies the credential.
    #[instrument(skip(self, refresh_token))]
    pub async fn post_refresh(
        &self,
        path: &str,
        refresh_token: Option<&RefreshToken>,
    ) -> Result<ApiResponse> {
        let url = self.base_url.endpoint(path)?;
        debug!(bearer = refresh_token.is_some(), "HTTP refresh request");

        let mut builder = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json");
        if let Some(token) = refresh_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        self.buffer(response).await
    }

    async fn buffer(&self, response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        trace!(status, "HTTP response");

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        let client = HttpClient::new(api.clone(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), &api);
    }
}
