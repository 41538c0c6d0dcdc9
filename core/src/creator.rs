//! The API action factory.
//!
//! [`create_api_action`] turns a method and an endpoint template into an
//! [`ApiActionCreator`]. Invoking the creator inside a dispatch context runs
//! the whole lifecycle:
//!
//! 1. Resolve the request (base URL, path parameters, query, headers, body)
//! 2. Hand the call envelope to the middleware, which dispatches `request`,
//!    performs the round trip and dispatches `success` or `failure`
//! 3. Run `on_success` or `on_error`
//! 4. Dispatch `INVALID_TOKEN` when the payload status is 401
//! 5. Return the settled [`DispatchResult`]
//!
//! # Example
//!
//! ```ignore
//! let config = ApiConfig::new("https://api.example.com");
//! let get_accuracy = create_api_action(&config, HttpMethod::Post, "/api/prediction/accuracy");
//!
//! let result = get_accuracy
//!     .call(&store, RequestOptions::new().query("years", 3))
//!     .await?;
//!
//! // In a reducer:
//! // ApiAction::Success { action_type, .. } if action_type == get_accuracy.types().success
//! ```

use crate::action::{ApiAction, ApiCall, DispatchResult};
use crate::action_type::ActionTypes;
use crate::config::ApiConfig;
use crate::dispatch::{ApiStateSnapshot, Dispatcher};
use crate::error::ApiError;
use crate::method::HttpMethod;
use crate::options::RequestOptions;
use crate::request::ResolvedRequest;
use std::sync::Arc;

/// Create an action creator for `method` and `endpoint`.
#[must_use]
pub fn create_api_action(
    config: &ApiConfig,
    method: HttpMethod,
    endpoint: impl Into<Arc<str>>,
) -> ApiActionCreator {
    ApiActionCreator::new(config.clone(), method, endpoint)
}

/// Action creator for one endpoint.
#[derive(Clone, Debug)]
pub struct ApiActionCreator {
    config: ApiConfig,
    types: ActionTypes,
}

impl ApiActionCreator {
    /// Create an action creator for `method` and `endpoint`.
    #[must_use]
    pub fn new(config: ApiConfig, method: HttpMethod, endpoint: impl Into<Arc<str>>) -> Self {
        Self {
            config,
            types: ActionTypes::new(method, endpoint),
        }
    }

    /// Create an action creator from a verb string such as `"POST"`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidMethod`] if `method` is not an HTTP verb.
    pub fn parse(
        config: ApiConfig,
        method: &str,
        endpoint: impl Into<Arc<str>>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(config, method.parse()?, endpoint))
    }

    /// Lifecycle types, for reducers to match on.
    #[must_use]
    pub const fn types(&self) -> &ActionTypes {
        &self.types
    }

    /// Resolve `options` without dispatching anything.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the body cannot be encoded.
    pub fn resolve(
        &self,
        options: &RequestOptions,
        state: &ApiStateSnapshot,
    ) -> Result<ResolvedRequest, ApiError> {
        ResolvedRequest::resolve(&self.config, &self.types, options, state)
    }

    /// Run the call lifecycle through `dispatcher`.
    ///
    /// Network and HTTP errors are not `Err`: they settle as the `failure`
    /// phase and come back as an error [`DispatchResult`].
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the body cannot be encoded. Nothing has
    /// been dispatched in that case.
    #[tracing::instrument(skip_all, fields(endpoint = %self.types.endpoint()))]
    pub async fn call<D>(
        &self,
        dispatcher: &D,
        options: RequestOptions,
    ) -> Result<DispatchResult, ApiError>
    where
        D: Dispatcher + ?Sized,
    {
        let state = dispatcher.api_state().await;
        let request = self.resolve(&options, &state)?;
        tracing::debug!(url = %request.url, "Dispatching API call");

        let result = dispatcher
            .call(ApiCall {
                request,
                meta: Arc::new(options),
            })
            .await;

        if result.is_error() {
            tracing::debug!(status = ?result.payload_status(), "API call failed");
            if let Some(on_error) = result.meta.error_callback() {
                on_error(&result);
            }
        } else if let Some(on_success) = result.meta.success_callback() {
            on_success(&result);
        }

        if result.is_unauthorized() {
            tracing::warn!("API call returned 401, dispatching INVALID_TOKEN");
            dispatcher.dispatch(ApiAction::InvalidToken).await;
        }

        Ok(result)
    }
}

/// Action creators sharing one [`ApiConfig`].
///
/// # Example
///
/// ```
/// use composable_api_core::config::ApiConfig;
/// use composable_api_core::creator::Api;
///
/// let api = Api::new(ApiConfig::new("https://api.example.com"));
/// let get_user = api.get("/api/users/:id");
/// assert_eq!(get_user.types().success.as_str(), "[GET]/api/users/:id_SUCCESS");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Api {
    config: ApiConfig,
}

impl Api {
    /// Group action creators under `config`.
    #[must_use]
    pub const fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Shared configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Action creator for `method` and `endpoint`.
    #[must_use]
    pub fn action(&self, method: HttpMethod, endpoint: impl Into<Arc<str>>) -> ApiActionCreator {
        create_api_action(&self.config, method, endpoint)
    }

    /// `GET` action creator.
    #[must_use]
    pub fn get(&self, endpoint: impl Into<Arc<str>>) -> ApiActionCreator {
        self.action(HttpMethod::Get, endpoint)
    }

    /// `POST` action creator.
    #[must_use]
    pub fn post(&self, endpoint: impl Into<Arc<str>>) -> ApiActionCreator {
        self.action(HttpMethod::Post, endpoint)
    }

    /// `PUT` action creator.
    #[must_use]
    pub fn put(&self, endpoint: impl Into<Arc<str>>) -> ApiActionCreator {
        self.action(HttpMethod::Put, endpoint)
    }

    /// `PATCH` action creator.
    #[must_use]
    pub fn patch(&self, endpoint: impl Into<Arc<str>>) -> ApiActionCreator {
        self.action(HttpMethod::Patch, endpoint)
    }

    /// `DELETE` action creator.
    #[must_use]
    pub fn delete(&self, endpoint: impl Into<Arc<str>>) -> ApiActionCreator {
        self.action(HttpMethod::Delete, endpoint)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::action::ApiResponse;
    use crate::error::TransportError;
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Minimal dispatcher: answers every call with a fixed transport outcome.
    struct FixedDispatcher {
        state: ApiStateSnapshot,
        outcome: Result<ApiResponse, TransportError>,
        dispatched: Mutex<Vec<String>>,
        calls: Mutex<Vec<ApiCall>>,
    }

    impl FixedDispatcher {
        fn new(outcome: Result<ApiResponse, TransportError>) -> Self {
            Self {
                state: ApiStateSnapshot::default(),
                outcome,
                dispatched: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Dispatcher for FixedDispatcher {
        fn api_state(&self) -> Pin<Box<dyn Future<Output = ApiStateSnapshot> + Send + '_>> {
            Box::pin(async move { self.state.clone() })
        }

        fn dispatch(&self, action: ApiAction) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.dispatched
                .lock()
                .unwrap()
                .push(action.type_name().to_string());
            Box::pin(async {})
        }

        fn call(&self, call: ApiCall) -> Pin<Box<dyn Future<Output = DispatchResult> + Send + '_>> {
            let result = call.settle(self.outcome.clone());
            self.calls.lock().unwrap().push(call);
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn test_success_runs_success_callback_only() {
        let dispatcher = FixedDispatcher::new(Ok(ApiResponse::new(200, json!({ "ok": true }))));
        let hits = Arc::new(Mutex::new(Vec::new()));
        let (ok_hits, err_hits) = (Arc::clone(&hits), Arc::clone(&hits));

        let creator = Api::default().get("/api/ping");
        let result = creator
            .call(
                &dispatcher,
                RequestOptions::new()
                    .on_success(move |_| ok_hits.lock().unwrap().push("success"))
                    .on_error(move |_| err_hits.lock().unwrap().push("error")),
            )
            .await
            .unwrap();

        assert!(!result.is_error());
        assert_eq!(*hits.lock().unwrap(), vec!["success"]);
        assert!(dispatcher.dispatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_runs_error_callback_only() {
        let dispatcher = FixedDispatcher::new(Ok(ApiResponse::new(500, json!({}))));
        let hits = Arc::new(Mutex::new(Vec::new()));
        let (ok_hits, err_hits) = (Arc::clone(&hits), Arc::clone(&hits));

        let result = Api::default()
            .post("/api/jobs")
            .call(
                &dispatcher,
                RequestOptions::new()
                    .on_success(move |_| ok_hits.lock().unwrap().push("success"))
                    .on_error(move |r| {
                        assert!(r.is_error());
                        err_hits.lock().unwrap().push("error");
                    }),
            )
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(*hits.lock().unwrap(), vec!["error"]);
    }

    #[tokio::test]
    async fn test_unauthorized_dispatches_invalid_token_once() {
        let dispatcher = FixedDispatcher::new(Ok(ApiResponse::new(401, json!({}))));

        Api::default()
            .get("/api/me")
            .call(&dispatcher, RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(*dispatcher.dispatched.lock().unwrap(), vec!["INVALID_TOKEN"]);
    }

    #[tokio::test]
    async fn test_encode_error_dispatches_nothing() {
        struct Broken;
        impl serde::Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("broken"))
            }
        }

        let dispatcher = FixedDispatcher::new(Ok(ApiResponse::new(200, json!({}))));
        let result = Api::default()
            .post("/api/x")
            .call(&dispatcher, RequestOptions::new().body(Broken))
            .await;

        assert!(matches!(result, Err(ApiError::Encode(_))));
        assert!(dispatcher.calls.lock().unwrap().is_empty());
        assert!(dispatcher.dispatched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        let result = ApiActionCreator::parse(ApiConfig::default(), "FETCH", "/x");
        assert!(matches!(result, Err(ApiError::InvalidMethod(_))));
    }
}
