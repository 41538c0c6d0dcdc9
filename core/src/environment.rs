//! Dependency injection traits for the API middleware.
//!
//! The network is abstracted behind [`HttpTransport`] and reaches the
//! middleware through the store's environment ([`ApiEnvironment`]), so the
//! same reducers run against `reqwest` in production and a scripted mock in
//! tests.

use crate::action::{ApiCall, ApiResponse};
use crate::error::TransportError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Performs the network round trip of a call.
///
/// A non-2xx response is still `Ok`: classification into success or failure
/// happens in the middleware. `Err` means no response was received.
pub trait HttpTransport: Send + Sync {
    /// Execute the request carried by `call`.
    fn execute<'a>(
        &'a self,
        call: &'a ApiCall,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn execute<'a>(
        &'a self,
        call: &'a ApiCall,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>> {
        (**self).execute(call)
    }
}

/// Store environment that carries an HTTP transport.
pub trait ApiEnvironment {
    /// Transport implementation
    type Transport: HttpTransport;

    /// The transport used for API calls.
    fn transport(&self) -> &Self::Transport;
}
