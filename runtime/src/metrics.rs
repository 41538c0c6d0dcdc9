//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for the runtime:
//! - Store commands and reducer execution
//! - Effect handling
//! - API calls through the middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use composable_api_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Scrape output
//! let text = server.render();
//! # Ok(())
//! # }
//! ```

use composable_api_core::action_type::Phase;
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Installs the global recorder and renders metrics for scraping.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server for `addr` (e.g., `0.0.0.0:9090`).
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// that is already installed (e.g., by another test) is not an error.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Address the metrics are meant to be served on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!("store.commands.total", "Total number of actions sent to the store");
    describe_counter!(
        "store.effects.executed",
        "Total number of effects executed, labeled by effect type"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time taken to execute reducers"
    );
    describe_counter!("store.shutdown.initiated", "Graceful shutdowns initiated");
    describe_counter!(
        "store.shutdown.timeout",
        "Graceful shutdowns that timed out with effects still running"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );

    // API middleware
    describe_counter!("api.requests.total", "Total number of API calls started");
    describe_counter!(
        "api.responses.total",
        "Total number of settled API calls, labeled by phase"
    );
    describe_histogram!(
        "api.request.duration_seconds",
        "Time taken by the transport round trip"
    );
}

/// API middleware metrics recorder.
pub struct ApiMetrics;

impl ApiMetrics {
    /// Record a call entering the `request` phase.
    pub fn record_request() {
        counter!("api.requests.total").increment(1);
    }

    /// Record a settled call and its round-trip time.
    pub fn record_response(phase: Phase, duration: Duration) {
        let phase = match phase {
            Phase::Request => "request",
            Phase::Success => "success",
            Phase::Failure => "failure",
        };
        counter!("api.responses.total", "phase" => phase).increment(1);
        histogram!("api.request.duration_seconds").record(duration.as_secs_f64());
    }
}
