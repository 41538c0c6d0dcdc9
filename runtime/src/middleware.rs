//! API middleware: the [`Dispatcher`] implementation for [`Store`].
//!
//! An action creator hands the store an [`ApiCall`]; the middleware turns it
//! into the call lifecycle:
//!
//! 1. Send the `request` phase action through the reducer
//! 2. Execute the round trip with the environment's [`HttpTransport`]
//! 3. Settle: 2xx responses succeed, everything else fails
//! 4. Send the settled phase action and return the [`DispatchResult`]
//!
//! Every lifecycle action the reducer accepts is then broadcast, so observers
//! subscribed with [`Store::subscribe_actions`] see `request` before
//! `success` / `failure`. Once the store is shutting down the `request` phase
//! is rejected, the transport is not called and the call settles as a
//! transport failure.
//!
//! The store's action type only needs `From<ApiAction>`:
//!
//! ```ignore
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Api(ApiAction),
//!     Logout,
//! }
//!
//! impl From<ApiAction> for AppAction {
//!     fn from(action: ApiAction) -> Self {
//!         Self::Api(action)
//!     }
//! }
//! ```

use crate::metrics::ApiMetrics;
use crate::store::Store;
use composable_api_core::action::{ApiAction, ApiCall, DispatchResult};
use composable_api_core::dispatch::{ApiState, ApiStateSnapshot, Dispatcher};
use composable_api_core::environment::{ApiEnvironment, HttpTransport};
use composable_api_core::error::TransportError;
use composable_api_core::reducer::Reducer;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::Instrument;

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: From<ApiAction> + Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Send an API action through the reducer, then broadcast it.
    ///
    /// Returns `false` when the store rejected the action (shutting down).
    /// Rejected actions are logged and never broadcast.
    async fn send_api_action(&self, action: ApiAction) -> bool {
        let type_name = action.type_name().to_string();
        let action = A::from(action);

        match self.send(action.clone()).await {
            Ok(_) => {
                self.publish(action);
                true
            },
            Err(error) => {
                tracing::warn!(action = %type_name, error = %error, "API action not reduced");
                false
            },
        }
    }
}

impl<S, A, E, R> Dispatcher for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: From<ApiAction> + Clone + Send + 'static,
    S: ApiState + Send + Sync + 'static,
    E: ApiEnvironment + Clone + Send + Sync + 'static,
{
    fn api_state(&self) -> Pin<Box<dyn Future<Output = ApiStateSnapshot> + Send + '_>> {
        Box::pin(self.state(|state| state.snapshot()))
    }

    fn dispatch(&self, action: ApiAction) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            tracing::debug!(action = %action.type_name(), "Dispatching API action");
            self.send_api_action(action).await;
        })
    }

    fn call(&self, call: ApiCall) -> Pin<Box<dyn Future<Output = DispatchResult> + Send + '_>> {
        let endpoint = call.types().endpoint().to_string();
        let span = tracing::debug_span!("api_call", endpoint = %endpoint);

        Box::pin(
            async move {
                ApiMetrics::record_request();
                tracing::debug!(endpoint = %endpoint, "API request");
                if !self.send_api_action(call.request_action()).await {
                    // The request phase never reached the reducer: skip the round trip
                    return call.settle(Err(TransportError::RequestFailed(
                        "store is shutting down".to_string(),
                    )));
                }

                let start = Instant::now();
                let outcome = self.environment().transport().execute(&call).await;
                let elapsed = start.elapsed();

                let result = call.settle(outcome);
                let phase = result.action_type.phase();
                ApiMetrics::record_response(phase, elapsed);

                match (&result.outcome, result.payload_status()) {
                    (Ok(_), status) => {
                        tracing::debug!(endpoint = %endpoint, status = ?status, "API success");
                    },
                    (Err(failure), _) => {
                        tracing::debug!(endpoint = %endpoint, failure = %failure, "API failure");
                    },
                }

                self.send_api_action(result.clone().into_action()).await;
                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use composable_api_core::action::ApiResponse;
    use composable_api_core::action_type::Phase;
    use composable_api_core::config::ApiConfig;
    use composable_api_core::creator::Api;
    use composable_api_core::effect::Effect;
    use composable_api_core::action::ApiFailure;
    use composable_api_core::options::RequestOptions;
    use composable_api_core::{smallvec, SmallVec};
    use composable_api_testing::mocks::MockTransport;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Default, Clone)]
    struct TestState {
        token: Option<String>,
        log: Vec<String>,
    }

    impl ApiState for TestState {
        fn auth_token(&self) -> Option<&str> {
            self.token.as_deref()
        }
    }

    #[derive(Debug, Clone)]
    struct TestAction(ApiAction);

    impl From<ApiAction> for TestAction {
        fn from(action: ApiAction) -> Self {
            Self(action)
        }
    }

    #[derive(Clone)]
    struct TestEnv {
        transport: Arc<MockTransport>,
    }

    impl ApiEnvironment for TestEnv {
        type Transport = Arc<MockTransport>;

        fn transport(&self) -> &Self::Transport {
            &self.transport
        }
    }

    #[derive(Clone)]
    struct LogReducer;

    impl Reducer for LogReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut TestState,
            action: TestAction,
            _env: &TestEnv,
        ) -> SmallVec<[Effect<TestAction>; 4]> {
            if matches!(action.0, ApiAction::InvalidToken) {
                state.token = None;
            }
            state.log.push(action.0.type_name().to_string());
            smallvec![Effect::None]
        }
    }

    fn store(
        transport: MockTransport,
        token: Option<&str>,
    ) -> (Store<TestState, TestAction, TestEnv, LogReducer>, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let state = TestState {
            token: token.map(str::to_string),
            log: Vec::new(),
        };
        let env = TestEnv {
            transport: Arc::clone(&transport),
        };
        (Store::new(state, LogReducer, env), transport)
    }

    #[tokio::test]
    async fn test_success_lifecycle_order() {
        let (store, transport) =
            store(MockTransport::new().respond(ApiResponse::new(200, json!({ "id": 1 }))), None);

        let result = Api::new(ApiConfig::new("https://api.test"))
            .get("/api/users/:id")
            .call(&store, RequestOptions::new().param("id", 1))
            .await
            .unwrap();

        assert!(!result.is_error());
        assert_eq!(
            store.state(|s| s.log.clone()).await,
            vec!["[GET]/api/users/:id_REQUEST", "[GET]/api/users/:id_SUCCESS"]
        );
        assert_eq!(transport.calls()[0].request.url, "https://api.test/api/users/1");
    }

    #[tokio::test]
    async fn test_transport_error_settles_as_failure() {
        let (store, _) = store(
            MockTransport::new().fail(TransportError::RequestFailed("connection refused".into())),
            None,
        );

        let result = Api::default()
            .post("/api/jobs")
            .call(&store, RequestOptions::new())
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(result.action_type.phase(), Phase::Failure);
        assert_eq!(
            store.state(|s| s.log.clone()).await,
            vec!["[POST]/api/jobs_REQUEST", "[POST]/api/jobs_FAILURE"]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_after_failure() {
        let (store, transport) =
            store(MockTransport::new().respond(ApiResponse::new(401, json!({}))), Some("abc"));

        let result = Api::default()
            .get("/api/me")
            .call(&store, RequestOptions::new())
            .await
            .unwrap();

        assert!(result.is_unauthorized());
        assert_eq!(
            transport.calls()[0].request.header("authorization"),
            Some("Bearer abc")
        );
        assert_eq!(store.state(|s| s.token.clone()).await, None);
        assert_eq!(
            store.state(|s| s.log.clone()).await,
            vec!["[GET]/api/me_REQUEST", "[GET]/api/me_FAILURE", "INVALID_TOKEN"]
        );
    }

    #[tokio::test]
    async fn test_lifecycle_actions_are_broadcast() {
        let (store, _) = store(MockTransport::new().respond(ApiResponse::new(204, json!(null))), None);
        let mut rx = store.subscribe_actions();

        Api::default()
            .delete("/api/items/:id")
            .call(&store, RequestOptions::new().param("id", "x"))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.0.phase(), Some(Phase::Request));
        assert_eq!(second.0.phase(), Some(Phase::Success));
    }

    #[tokio::test]
    async fn test_call_after_shutdown_skips_transport() {
        let (store, transport) =
            store(MockTransport::new().respond(ApiResponse::new(200, json!({}))), None);
        let mut rx = store.subscribe_actions();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = Api::default()
            .get("/api/me")
            .call(&store, RequestOptions::new())
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(matches!(result.failure(), Some(ApiFailure::Transport(_))));
        assert!(transport.calls().is_empty());
        assert_eq!(transport.remaining(), 1);
        assert!(store.state(|s| s.log.clone()).await.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_is_not_broadcast() {
        let (store, _) = store(MockTransport::new(), None);
        let mut rx = store.subscribe_actions();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        store.dispatch(ApiAction::InvalidToken).await;

        assert!(rx.try_recv().is_err());
    }
}
