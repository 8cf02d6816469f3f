//! The authenticated API client.

use std::sync::{Arc, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use ledgerdesk_core::error::{AuthError, Error};
use ledgerdesk_core::{
    AccessToken, AuthFailureHandler, ClientConfig, Result, Session, SessionStore,
};

use crate::refresh::RefreshState;
use crate::request::{ApiRequest, Attempt};
use crate::response::ApiResponse;
use crate::transport::HttpClient;

/// An HTTP client that attaches the stored session to every request,
/// refreshes it once when the API answers 401, and replays the request.
///
/// One instance manages one session namespace (e.g. admin or user).
/// Clones are cheap and share the store, the connection pool and the
/// refresh lock.
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, MutexGuard};
/// use ledgerdesk_core::{ApiUrl, ClientConfig, MemorySessionStore, SessionKind};
/// use ledgerdesk_http::AuthClient;
///
/// # async fn example() -> Result<(), ledgerdesk_core::Error> {
/// let config = ClientConfig::for_kind(SessionKind::User, ApiUrl::new("https://api.example.com")?);
/// let client = AuthClient::builder(config, Arc::new(MemorySessionStore::new()))
///     .on_auth_failure(|failure: &ledgerdesk_core::AuthFailure| {
///         eprintln!("session ended, go to {}", failure.redirect_to);
///     })
///     .build()?;
///
/// client
///     .login("/auth/login", &serde_json::json!({ "email": "a@b.c", "password": "pw" }))
///     .await?;
/// let products: serde_json::Value = client.get_json("/products").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) config: ClientConfig,
    pub(crate) http: HttpClient,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) on_failure: Option<Arc<dyn AuthFailureHandler>>,
    /// Serializes refreshes so concurrent 401s share one refresh call.
    pub(crate) refresh_lock: Mutex<()>,
    pub(crate) overlay: std::sync::Mutex<Overlay>,
}

/// Session state the store failed to record.
///
/// The store stays authoritative; the overlay only covers for a failed
/// `save` or `clear` until the next successful write.
#[derive(Default)]
pub(crate) struct Overlay {
    /// A refreshed session whose `save` failed. The server has already
    /// rotated the old pair, so this one is used instead of the store.
    pub(crate) unsaved: Option<Session>,
    /// Access token of an escalated session whose `clear` failed. Never
    /// attached again.
    pub(crate) revoked: Option<AccessToken>,
}

/// Builder for [`AuthClient`].
pub struct AuthClientBuilder {
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
    on_failure: Option<Arc<dyn AuthFailureHandler>>,
}

impl AuthClientBuilder {
    /// Register the handler notified when a session cannot be refreshed.
    pub fn on_auth_failure(mut self, handler: impl AuthFailureHandler + 'static) -> Self {
        self.on_failure = Some(Arc::new(handler));
        self
    }

    /// Register a shared handler.
    pub fn on_auth_failure_shared(mut self, handler: Arc<dyn AuthFailureHandler>) -> Self {
        self.on_failure = Some(handler);
        self
    }

    pub fn build(self) -> Result<AuthClient> {
        let http = HttpClient::new(self.config.base_url().clone(), self.config.timeout())?;
        Ok(AuthClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                http,
                store: self.store,
                on_failure: self.on_failure,
                refresh_lock: Mutex::new(()),
                overlay: std::sync::Mutex::new(Overlay::default()),
            }),
        })
    }
}

impl AuthClient {
    /// Start building a client over `store`.
    pub fn builder(config: ClientConfig, store: Arc<dyn SessionStore>) -> AuthClientBuilder {
        AuthClientBuilder {
            config,
            store,
            on_failure: None,
        }
    }

    /// Create a client with no auth failure handler.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        Self::builder(config, store).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The session requests are currently sent with.
    pub async fn session(&self) -> Result<Option<Session>> {
        self.load_session().await
    }

    /// The scope context (e.g. active company id) of the stored session.
    pub async fn scope_context(&self) -> Result<Option<String>> {
        Ok(self
            .session()
            .await?
            .and_then(|s| s.scope_context().map(str::to_string)))
    }

    /// Send a request through the pipeline.
    ///
    /// Returns the response for 2xx statuses. Non-2xx statuses become
    /// [`Error::Protocol`]. A first 401 on a credentialed request triggers
    /// one refresh and one replay; the replay's outcome is returned.
    #[instrument(
        skip(self, request),
        fields(namespace = %self.inner.config.storage_namespace(), method = %request.method(), path = request.path())
    )]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let attempt = Attempt::first(request);

        let token = if request.is_anonymous() {
            None
        } else {
            self.load_session()
                .await?
                .map(|s| s.access_token().clone())
        };

        match self.dispatch(attempt, token.as_ref()).await {
            Err(err) if err.is_auth_expired() && attempt.may_refresh() => match token {
                Some(seen) => self.recover(attempt.replay(), seen, err).await,
                None => {
                    debug!("401 without a stored session, nothing to refresh");
                    Err(err)
                }
            },
            other => other,
        }
    }

    /// GET `path` and deserialize the body.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send(&ApiRequest::get(path)).await?.json()
    }

    /// POST `body` to `path` and deserialize the response body.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(&ApiRequest::post(path).json(body)?).await?.json()
    }

    /// PUT `body` to `path` and deserialize the response body.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(&ApiRequest::put(path).json(body)?).await?.json()
    }

    /// DELETE `path`, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(&ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Log in by posting `credentials` to `path`.
    ///
    /// The request carries no access token and is never refreshed. The
    /// session is established by the pipeline capturing the token pair
    /// from the response body.
    #[instrument(skip(self, credentials), fields(namespace = %self.inner.config.storage_namespace()))]
    pub async fn login<B: Serialize + ?Sized>(&self, path: &str, credentials: &B) -> Result<Session> {
        info!("Logging in");

        let request = ApiRequest::post(path).json(credentials)?.anonymous();
        let response = self.send(&request).await?;

        let fields = self.inner.config.token_fields();
        let session = response
            .json_value()
            .and_then(|body| {
                Session::from_response_body(&body, fields, self.inner.config.scope_claim())
            })
            .ok_or_else(|| AuthError::MissingTokens {
                access: fields.access().to_string(),
                refresh: fields.refresh().to_string(),
            })?;

        debug!(scope = ?session.scope_context(), "Session established");
        Ok(session)
    }

    /// Drop the stored session. No auth failure event is emitted.
    #[instrument(skip(self), fields(namespace = %self.inner.config.storage_namespace()))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.inner.store.clear().await?;
        *self.overlay() = Overlay::default();
        Ok(())
    }

    /// Refresh the stored session now.
    ///
    /// Shares the single-flight path with automatic refreshes. On failure
    /// the session is cleared and the auth failure handler is notified.
    #[instrument(skip(self), fields(namespace = %self.inner.config.storage_namespace()))]
    pub async fn refresh(&self) -> Result<Session> {
        self.refresh_single_flight(None).await
    }

    /// Send one attempt and classify the response.
    ///
    /// Any response body carrying both token fields is persisted as the
    /// new session before classification.
    pub(crate) async fn dispatch(
        &self,
        attempt: Attempt<'_>,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let response = self.inner.http.send(attempt.request(), token).await?;

        self.capture_tokens(&response).await;

        if response.is_success() {
            if attempt.number() > 0 {
                debug!(state = %RefreshState::Replayed, status = response.status(), "Replay succeeded");
            }
            Ok(response)
        } else {
            let err = response.to_protocol_error();
            debug!(status = err.status, attempt = attempt.number(), "Request failed");
            Err(Error::Protocol(err))
        }
    }

    /// Persist a token pair found in a response body.
    async fn capture_tokens(&self, response: &ApiResponse) {
        let Some(body) = response.json_value() else {
            return;
        };

        let config = &self.inner.config;
        if let Some(session) =
            Session::from_response_body(&body, config.token_fields(), config.scope_claim())
        {
            match self.persist(&session).await {
                Ok(()) => info!(status = response.status(), "Captured session from response"),
                Err(e) => warn!(error = %e, "Failed to persist session from response"),
            }
        }
    }
}

impl AuthClient {
    pub(crate) fn overlay(&self) -> MutexGuard<'_, Overlay> {
        self.inner.overlay.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load the session to send with, applying the overlay.
    pub(crate) async fn load_session(&self) -> Result<Option<Session>> {
        let unsaved = self.overlay().unsaved.clone();
        if unsaved.is_some() {
            return Ok(unsaved);
        }

        let stored = self.inner.store.load().await?;
        let revoked = self.overlay().revoked.clone();
        Ok(stored.filter(|s| revoked.as_ref() != Some(s.access_token())))
    }

    /// Save `session` and drop any overlay it supersedes.
    pub(crate) async fn persist(&self, session: &Session) -> Result<()> {
        self.inner.store.save(session).await?;
        *self.overlay() = Overlay::default();
        Ok(())
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", self.inner.config.base_url())
            .field("namespace", self.inner.config.storage_namespace())
            .finish()
    }
}
