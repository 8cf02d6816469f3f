//! Auth failure notification.

use crate::types::StorageNamespace;

/// Raised when a session could not be refreshed and has been cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// Namespace of the session that was cleared.
    pub namespace: StorageNamespace,
    /// Unauthenticated entry path the host should route to.
    pub redirect_to: String,
}

/// Receives auth failure events from the client.
///
/// The host application decides what "go to the entry point" means
/// (navigate, print a notice, exit).
pub trait AuthFailureHandler: Send + Sync {
    fn on_auth_failure(&self, failure: &AuthFailure);
}

impl<F> AuthFailureHandler for F
where
    F: Fn(&AuthFailure) + Send + Sync,
{
    fn on_auth_failure(&self, failure: &AuthFailure) {
        self(failure)
    }
}
