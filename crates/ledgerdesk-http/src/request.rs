//! Request descriptors.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use ledgerdesk_core::Result;
use ledgerdesk_core::error::{Error, InvalidInputError};

/// A description of one API call, independent of credentials.
///
/// The client attaches the bearer token at dispatch time, so the same
/// descriptor can be replayed after a refresh with new credentials.
///
/// # Example
///
/// ```
/// use ledgerdesk_http::ApiRequest;
///
/// let request = ApiRequest::get("/products")
///     .query("page", "2")
///     .header("x-request-id", "abc");
/// assert_eq!(request.path(), "/products");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body.
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON body.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("request body is not serializable: {}", e),
            })
        })?;
        Ok(self.json_value(value))
    }

    /// Send without credentials and never attempt a refresh (login calls).
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }
}

/// One dispatch of a request. The attempt number is fixed per value; a
/// replay is a new `Attempt` rather than a flag flipped on the request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attempt<'a> {
    request: &'a ApiRequest,
    number: u8,
}

impl<'a> Attempt<'a> {
    pub(crate) fn first(request: &'a ApiRequest) -> Self {
        Self { request, number: 0 }
    }

    /// The replay of this attempt after a refresh.
    pub(crate) fn replay(self) -> Self {
        Self {
            request: self.request,
            number: self.number + 1,
        }
    }

    pub(crate) fn request(&self) -> &'a ApiRequest {
        self.request
    }

    pub(crate) fn number(&self) -> u8 {
        self.number
    }

    /// Only a first, credentialed attempt may trigger a refresh.
    pub(crate) fn may_refresh(&self) -> bool {
        self.number == 0 && !self.request.anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_parts() {
        let request = ApiRequest::post("/invoices")
            .query("draft", "true")
            .header("x-trace", "1")
            .json(&json!({ "customerId": 7 }))
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.query_pairs(), &[("draft".into(), "true".into())]);
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.body().unwrap()["customerId"], 7);
        assert!(!request.is_anonymous());
    }

    #[test]
    fn only_first_credentialed_attempt_may_refresh() {
        let request = ApiRequest::get("/products");
        let first = Attempt::first(&request);
        assert!(first.may_refresh());
        let replay = first.replay();
        assert_eq!(replay.number(), 1);
        assert!(!replay.may_refresh());
        assert!(first.may_refresh());

        let login = ApiRequest::post("/auth/login").anonymous();
        assert!(!Attempt::first(&login).may_refresh());
    }
}
