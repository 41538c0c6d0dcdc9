//! # Composable API Testing
//!
//! Testing utilities and helpers for composable API actions.
//!
//! This crate provides:
//! - Mock implementations of the transport and dispatch seams
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - Property-based testing strategies
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use composable_api_testing::mocks::RecordingDispatcher;
//!
//! #[tokio::test]
//! async fn test_get_accuracy() {
//!     let dispatcher = RecordingDispatcher::with_transport(
//!         MockTransport::new().respond(ApiResponse::new(200, json!({ "accuracy": 0.9 }))),
//!     );
//!
//!     api.post("/api/prediction/accuracy")
//!         .call(&dispatcher, RequestOptions::new().query("years", 3))
//!         .await?;
//!
//!     assert_eq!(dispatcher.type_names().len(), 2);
//! }
//! ```

/// Mock implementations of the API seams
pub mod mocks;

/// Property-based testing strategies using proptest
pub mod properties;


pub use mocks::{MockTransport, RecordingDispatcher};
pub use reducer_test::{ReducerTest, assertions};

/// Install a `fmt` subscriber for tests, filtered by `RUST_LOG`.
///
/// Safe to call from every test: only the first call installs the subscriber.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,composable_api=debug".into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
