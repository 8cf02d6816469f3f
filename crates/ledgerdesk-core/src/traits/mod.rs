//! Core traits at the seams between the client and its host.

mod events;
mod store;

pub use events::{AuthFailure, AuthFailureHandler};
pub use store::SessionStore;
