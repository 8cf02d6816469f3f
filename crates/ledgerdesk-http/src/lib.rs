//! ledgerdesk-http - Authenticated REST client.
//!
//! [`AuthClient`] attaches the stored session to every request, captures
//! token pairs returned by login and refresh endpoints, refreshes the
//! session once when the API answers 401, and replays the request with the
//! new credentials. When the refresh itself fails the session is cleared and
//! the host's [`AuthFailureHandler`](ledgerdesk_core::AuthFailureHandler) is
//! told where to send the user.

mod client;
mod refresh;
mod request;
mod response;
mod transport;

pub use client::{AuthClient, AuthClientBuilder};
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use transport::HttpClient;

pub use reqwest::Method;
