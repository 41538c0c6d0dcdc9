//! Mock implementations of the API seams.
//!
//! - [`MockTransport`]: an [`HttpTransport`] answering from a scripted queue
//! - [`RecordingDispatcher`]: a [`Dispatcher`] that settles calls from a
//!   scripted queue and records every action it would have dispatched
//!
//! Both record what they were asked to do so tests can assert on URLs,
//! headers and lifecycle order without a network or a store.

use composable_api_core::action::{ApiAction, ApiCall, ApiResponse, DispatchResult};
use composable_api_core::dispatch::{ApiStateSnapshot, Dispatcher};
use composable_api_core::environment::HttpTransport;
use composable_api_core::error::TransportError;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Outcome = Result<ApiResponse, TransportError>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unscripted(call: &ApiCall) -> Outcome {
    Err(TransportError::RequestFailed(format!(
        "no scripted response for {}",
        call.request.url
    )))
}

/// Scripted HTTP transport.
///
/// Responses are consumed in order. Once the script runs out, every call
/// fails with [`TransportError::RequestFailed`].
///
/// # Example
///
/// ```
/// use composable_api_core::action::ApiResponse;
/// use composable_api_testing::mocks::MockTransport;
/// use serde_json::json;
///
/// let transport = MockTransport::new()
///     .respond(ApiResponse::new(200, json!({ "id": 1 })))
///     .respond(ApiResponse::new(401, json!({ "error": "expired" })));
///
/// assert_eq!(transport.remaining(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
}

impl MockTransport {
    /// Create a transport with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    #[must_use]
    pub fn respond(self, response: ApiResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a transport error
    #[must_use]
    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue an outcome on a shared transport
    pub fn push(&self, outcome: Outcome) {
        lock(&self.script).push_back(outcome);
    }

    /// Calls executed so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    /// Number of scripted outcomes not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

impl HttpTransport for MockTransport {
    fn execute<'a>(
        &'a self,
        call: &'a ApiCall,
    ) -> Pin<Box<dyn Future<Output = Outcome> + Send + 'a>> {
        lock(&self.calls).push(call.clone());
        let outcome = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| unscripted(call));
        Box::pin(async move { outcome })
    }
}

/// Dispatcher that records actions instead of reducing them.
///
/// `call` records the `request` action, settles the call from the scripted
/// transport and records the settled action, exactly as the store middleware
/// would dispatch them.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    state: Mutex<ApiStateSnapshot>,
    transport: MockTransport,
    actions: Mutex<Vec<ApiAction>>,
}

impl RecordingDispatcher {
    /// Dispatcher with empty state and an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher settling calls from `transport`
    #[must_use]
    pub fn with_transport(transport: MockTransport) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    /// Set the state the action creator reads
    #[must_use]
    pub fn with_state(self, state: ApiStateSnapshot) -> Self {
        *lock(&self.state) = state;
        self
    }

    /// The scripted transport
    #[must_use]
    pub const fn transport(&self) -> &MockTransport {
        &self.transport
    }

    /// Recorded actions, in dispatch order
    #[must_use]
    pub fn actions(&self) -> Vec<ApiAction> {
        lock(&self.actions).clone()
    }

    /// Rendered type names of the recorded actions
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        lock(&self.actions)
            .iter()
            .map(|action| action.type_name().to_string())
            .collect()
    }

    fn record(&self, action: ApiAction) {
        lock(&self.actions).push(action);
    }
}

impl Dispatcher for RecordingDispatcher {
    fn api_state(&self) -> Pin<Box<dyn Future<Output = ApiStateSnapshot> + Send + '_>> {
        let state = lock(&self.state).clone();
        Box::pin(async move { state })
    }

    fn dispatch(&self, action: ApiAction) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.record(action);
        Box::pin(async {})
    }

    fn call(&self, call: ApiCall) -> Pin<Box<dyn Future<Output = DispatchResult> + Send + '_>> {
        Box::pin(async move {
            self.record(call.request_action());
            let outcome = self.transport.execute(&call).await;
            let result = call.settle(outcome);
            self.record(result.clone().into_action());
            result
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use composable_api_core::config::ApiConfig;
    use composable_api_core::creator::Api;
    use composable_api_core::options::RequestOptions;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_consumes_script_in_order() {
        let transport = MockTransport::new()
            .respond(ApiResponse::new(200, json!(1)))
            .respond(ApiResponse::new(500, json!(2)));
        let dispatcher = RecordingDispatcher::with_transport(transport);
        let api = Api::default();

        let first = api.get("/a").call(&dispatcher, RequestOptions::new()).await.unwrap();
        let second = api.get("/b").call(&dispatcher, RequestOptions::new()).await.unwrap();
        let third = api.get("/c").call(&dispatcher, RequestOptions::new()).await.unwrap();

        assert!(!first.is_error());
        assert_eq!(second.payload_status(), Some(500));
        assert!(third.is_error());
        assert_eq!(third.payload_status(), None);
        assert_eq!(dispatcher.transport().calls().len(), 3);
        assert_eq!(dispatcher.transport().remaining(), 0);
    }

    #[tokio::test]
    async fn test_recording_dispatcher_lifecycle() {
        let dispatcher = RecordingDispatcher::with_transport(
            MockTransport::new().respond(ApiResponse::new(401, json!({}))),
        )
        .with_state(ApiStateSnapshot::default().with_auth_token("abc"));

        let api = Api::new(ApiConfig::new("https://api.test"));
        api.get("/api/me")
            .call(&dispatcher, RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(
            dispatcher.type_names(),
            vec!["[GET]/api/me_REQUEST", "[GET]/api/me_FAILURE", "INVALID_TOKEN"]
        );
        let call = &dispatcher.transport().calls()[0];
        assert_eq!(call.request.header("Authorization"), Some("Bearer abc"));
    }
}
