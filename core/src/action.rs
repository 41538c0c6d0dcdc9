//! Store-level actions and call outcomes.
//!
//! - [`ApiCall`]: the tagged envelope an action creator hands to the
//!   middleware ("perform this call and dispatch its lifecycle")
//! - [`ApiAction`]: what the middleware dispatches into the store
//! - [`DispatchResult`]: what the caller gets back once the call settled

use crate::action_type::{ActionType, ActionTypes, Phase};
use crate::error::TransportError;
use crate::options::RequestOptions;
use crate::request::ResolvedRequest;
use serde_json::Value;
use std::sync::Arc;

/// Type name of the session-expiry action.
pub const INVALID_TOKEN: &str = "INVALID_TOKEN";

/// Status that marks an expired or rejected session.
pub const UNAUTHORIZED: u16 = 401;

/// Options of a call, attached to every lifecycle action so reducers can correlate.
pub type RequestMeta = Arc<RequestOptions>;

/// HTTP response as seen by reducers.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Parsed body: JSON when possible, a string otherwise, `null` when empty
    pub body: Value,
}

impl ApiResponse {
    /// Response with `status` and `body` and no headers.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Why a call settled in the failure phase.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiFailure {
    /// The server answered with a non-2xx status
    Http {
        /// Status code
        status: u16,
        /// Parsed error body
        body: Value,
    },
    /// No response was received
    Transport(TransportError),
}

impl ApiFailure {
    /// Status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http { status, .. } => write!(f, "HTTP {status}"),
            Self::Transport(error) => write!(f, "{error}"),
        }
    }
}

/// The envelope handed to the middleware.
#[derive(Clone, Debug)]
pub struct ApiCall {
    /// Resolved request
    pub request: ResolvedRequest,
    /// Options of the invocation
    pub meta: RequestMeta,
}

impl ApiCall {
    /// Lifecycle types to dispatch.
    #[must_use]
    pub const fn types(&self) -> &ActionTypes {
        &self.request.types
    }

    /// The `request` phase action for this call.
    #[must_use]
    pub fn request_action(&self) -> ApiAction {
        ApiAction::Request {
            action_type: self.types().request.clone(),
            meta: Arc::clone(&self.meta),
        }
    }

    /// Settle the call from the transport's outcome.
    ///
    /// 2xx responses succeed; anything else, including transport errors, fails.
    #[must_use]
    pub fn settle(&self, outcome: Result<ApiResponse, TransportError>) -> DispatchResult {
        let types = self.types();
        let (action_type, outcome) = match outcome {
            Ok(response) if response.is_success() => (types.success.clone(), Ok(response)),
            Ok(response) => (
                types.failure.clone(),
                Err(ApiFailure::Http {
                    status: response.status,
                    body: response.body,
                }),
            ),
            Err(error) => (types.failure.clone(), Err(ApiFailure::Transport(error))),
        };

        DispatchResult {
            action_type,
            outcome,
            meta: Arc::clone(&self.meta),
        }
    }
}

/// Settled outcome of a call, owned by the caller.
#[derive(Clone, Debug)]
pub struct DispatchResult {
    /// Type of the settled phase (`success` or `failure`)
    pub action_type: ActionType,
    /// Response or failure
    pub outcome: Result<ApiResponse, ApiFailure>,
    /// Options of the invocation
    pub meta: RequestMeta,
}

impl DispatchResult {
    /// Whether the call failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// HTTP status of the payload, on either branch.
    #[must_use]
    pub const fn payload_status(&self) -> Option<u16> {
        match &self.outcome {
            Ok(response) => Some(response.status),
            Err(failure) => failure.status(),
        }
    }

    /// Whether the payload reports an expired session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.payload_status(), Some(UNAUTHORIZED))
    }

    /// Successful response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&ApiResponse> {
        self.outcome.as_ref().ok()
    }

    /// Failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&ApiFailure> {
        self.outcome.as_ref().err()
    }

    /// The settled phase as a store action, e.g. to re-dispatch a modified copy.
    #[must_use]
    pub fn into_action(self) -> ApiAction {
        match self.outcome {
            Ok(response) => ApiAction::Success {
                action_type: self.action_type,
                meta: self.meta,
                response,
            },
            Err(failure) => ApiAction::Failure {
                action_type: self.action_type,
                meta: self.meta,
                failure,
            },
        }
    }
}

/// Actions dispatched into the store by the API layer.
///
/// # Example
///
/// ```ignore
/// match action {
///     ApiAction::Success { action_type, response, .. }
///         if action_type == api_get_accuracy.types().success =>
///     {
///         state.accuracy = response.body["accuracy"].as_f64();
///     },
///     ApiAction::InvalidToken => state.token = None,
///     _ => {},
/// }
/// ```
#[derive(Clone, Debug)]
pub enum ApiAction {
    /// The call is about to start
    Request {
        /// Request phase type
        action_type: ActionType,
        /// Options of the invocation
        meta: RequestMeta,
    },
    /// The call settled with a 2xx response
    Success {
        /// Success phase type
        action_type: ActionType,
        /// Options of the invocation
        meta: RequestMeta,
        /// Response
        response: ApiResponse,
    },
    /// The call settled with an error
    Failure {
        /// Failure phase type
        action_type: ActionType,
        /// Options of the invocation
        meta: RequestMeta,
        /// Failure
        failure: ApiFailure,
    },
    /// A call reported status 401
    InvalidToken,
}

impl ApiAction {
    /// Lifecycle type, `None` for [`ApiAction::InvalidToken`].
    #[must_use]
    pub const fn action_type(&self) -> Option<&ActionType> {
        match self {
            Self::Request { action_type, .. }
            | Self::Success { action_type, .. }
            | Self::Failure { action_type, .. } => Some(action_type),
            Self::InvalidToken => None,
        }
    }

    /// Lifecycle phase, `None` for [`ApiAction::InvalidToken`].
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.action_type().map(ActionType::phase)
    }

    /// Rendered type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.action_type().map_or(INVALID_TOKEN, ActionType::as_str)
    }

    /// Options of the invocation, `None` for [`ApiAction::InvalidToken`].
    #[must_use]
    pub const fn meta(&self) -> Option<&RequestMeta> {
        match self {
            Self::Request { meta, .. } | Self::Success { meta, .. } | Self::Failure { meta, .. } => {
                Some(meta)
            },
            Self::InvalidToken => None,
        }
    }

    /// Whether this action has type `action_type`.
    #[must_use]
    pub fn is(&self, action_type: &ActionType) -> bool {
        self.action_type() == Some(action_type)
    }
}
