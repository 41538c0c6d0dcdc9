//! # Composable API Core
//!
//! Core traits and types for declarative API actions on a composable store.
//!
//! An API action creator describes one HTTP endpoint. Invoked with
//! [`RequestOptions`](options::RequestOptions) inside a dispatch context, it
//! runs a three-phase lifecycle through the store (`request`, then exactly one
//! of `success` or `failure`), resolves the caller's callbacks and reports
//! expired sessions with an `INVALID_TOKEN` action.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state of the application, including the auth token
//! - **Action**: All inputs to a reducer; API lifecycle actions are [`ApiAction`](action::ApiAction)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies, including the HTTP transport
//!
//! ## Example
//!
//! ```ignore
//! use composable_api_core::prelude::*;
//!
//! let api = Api::new(ApiConfig::new("https://api.example.com"));
//! let get_accuracy = api.post("/api/prediction/accuracy");
//!
//! // Dispatch through a store and wait for the settled result
//! let result = get_accuracy
//!     .call(&store, RequestOptions::new().query("years", 3))
//!     .await?;
//!
//! // Match the lifecycle in a reducer
//! match action {
//!     ApiAction::Success { action_type, response, .. }
//!         if action_type == get_accuracy.types().success => { /* ... */ },
//!     _ => {},
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Store-level actions and call outcomes
pub mod action;

/// Lifecycle action types derived from an endpoint
pub mod action_type;

/// Configuration for API action creators
pub mod config;

/// The API action factory
pub mod creator;

/// The dispatch context an action creator runs in
pub mod dispatch;

/// Dependency injection traits for the API middleware
pub mod environment;

/// Error types
pub mod error;

/// HTTP verbs
pub mod method;

/// Per-invocation request options
pub mod options;

/// Request resolution
pub mod request;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for SessionReducer {
    ///     type State = SessionState;
    ///     type Action = AppAction;
    ///     type Environment = AppEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut SessionState,
    ///         action: AppAction,
    ///         env: &AppEnvironment,
    ///     ) -> SmallVec<[Effect<AppAction>; 4]> {
    ///         match action {
    ///             AppAction::Api(ApiAction::InvalidToken) => {
    ///                 state.token = None;
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }
    }
}

/// Commonly used items
pub mod prelude {
    pub use crate::action::{ApiAction, ApiCall, ApiFailure, ApiResponse, DispatchResult};
    pub use crate::action_type::{ActionType, ActionTypes, Phase};
    pub use crate::config::{ApiConfig, BaseUrl};
    pub use crate::creator::{create_api_action, Api, ApiActionCreator};
    pub use crate::dispatch::{ApiState, ApiStateSnapshot, Dispatcher};
    pub use crate::effect::Effect;
    pub use crate::environment::{ApiEnvironment, HttpTransport};
    pub use crate::error::{ApiError, TransportError};
    pub use crate::method::HttpMethod;
    pub use crate::options::{FilePart, RequestOptions};
    pub use crate::reducer::Reducer;
    pub use crate::{smallvec, SmallVec};
}
