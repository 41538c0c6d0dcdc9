//! The dispatch context an action creator runs in.
//!
//! [`Dispatcher`] is the narrow view of a store the API layer needs: read the
//! API-relevant state, dispatch a plain action, and hand a call envelope to the
//! middleware. The runtime's `Store` implements it; tests use a recording mock.
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` so it stays object safe.

use crate::action::{ApiAction, ApiCall, DispatchResult};
use std::future::Future;
use std::pin::Pin;

/// The parts of store state the API layer reads at call time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiStateSnapshot {
    /// Base URL, used with `BaseUrl::FromState`
    pub base_url: Option<String>,
    /// Bearer token for the `Authorization` header
    pub auth_token: Option<String>,
}

impl ApiStateSnapshot {
    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the auth token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Implemented by store state that backs an API layer.
///
/// # Example
///
/// ```
/// use composable_api_core::dispatch::ApiState;
///
/// struct AppState {
///     token: Option<String>,
/// }
///
/// impl ApiState for AppState {
///     fn auth_token(&self) -> Option<&str> {
///         self.token.as_deref()
///     }
/// }
/// ```
pub trait ApiState {
    /// Current bearer token, if the user is signed in.
    fn auth_token(&self) -> Option<&str>;

    /// Base URL held in state. Only read with `BaseUrl::FromState`.
    fn base_url(&self) -> Option<&str> {
        None
    }

    /// Owned copy of the API-relevant fields.
    fn snapshot(&self) -> ApiStateSnapshot {
        ApiStateSnapshot {
            base_url: self.base_url().map(str::to_string),
            auth_token: self.auth_token().map(str::to_string),
        }
    }
}

/// A store the API layer can dispatch through.
pub trait Dispatcher: Send + Sync {
    /// Read the API-relevant state.
    fn api_state(&self) -> Pin<Box<dyn Future<Output = ApiStateSnapshot> + Send + '_>>;

    /// Dispatch a plain action.
    fn dispatch(&self, action: ApiAction) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Perform `call`: dispatch `request`, run the network round trip, dispatch
    /// exactly one of `success` or `failure`, and return the settled result.
    fn call(&self, call: ApiCall) -> Pin<Box<dyn Future<Output = DispatchResult> + Send + '_>>;
}
