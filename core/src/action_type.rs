//! Lifecycle action types derived from an endpoint.
//!
//! Every API action creator owns one [`ActionTypes`] triple. Each member is a
//! tagged [`ActionType`]: the endpoint it belongs to plus the lifecycle
//! [`Phase`]. Reducers match on the typed value; the rendered name
//! (`"[POST]/api/x_REQUEST"`) exists for logging and interop with code that
//! still switches on strings.

use crate::method::HttpMethod;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of an endpoint: method plus endpoint template.
///
/// Renders as `[METHOD]template`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    method: HttpMethod,
    template: Arc<str>,
}

impl EndpointKey {
    /// Create a key for `method` and `template`.
    #[must_use]
    pub fn new(method: HttpMethod, template: impl Into<Arc<str>>) -> Self {
        Self {
            method,
            template: template.into(),
        }
    }

    /// HTTP method of the endpoint.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Endpoint template, placeholders included.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.method, self.template)
    }
}

/// Lifecycle phase of an API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fired before the network call starts
    Request,
    /// Fired when the call settled with a 2xx response
    Success,
    /// Fired when the call settled with an error
    Failure,
}

impl Phase {
    /// Suffix appended to the endpoint key in rendered names.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Request => "_REQUEST",
            Self::Success => "_SUCCESS",
            Self::Failure => "_FAILURE",
        }
    }
}

/// One member of an [`ActionTypes`] triple.
///
/// Equality and hashing use the endpoint and phase; the rendered name is
/// computed once at construction.
#[derive(Clone, Debug)]
pub struct ActionType {
    endpoint: EndpointKey,
    phase: Phase,
    name: Arc<str>,
}

impl ActionType {
    /// Create the action type for `endpoint` in `phase`.
    #[must_use]
    pub fn new(endpoint: EndpointKey, phase: Phase) -> Self {
        let name: Arc<str> = format!("{endpoint}{}", phase.suffix()).into();
        Self {
            endpoint,
            phase,
            name,
        }
    }

    /// Endpoint this type belongs to.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointKey {
        &self.endpoint
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Rendered name, e.g. `[GET]/api/users/:id_SUCCESS`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ActionType {
    fn eq(&self, other: &Self) -> bool {
        self.phase == other.phase && self.endpoint == other.endpoint
    }
}

impl Eq for ActionType {}

impl std::hash::Hash for ActionType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.endpoint.hash(state);
        self.phase.hash(state);
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The request/success/failure triple of one endpoint.
///
/// # Examples
///
/// ```
/// use composable_api_core::action_type::{ActionTypes, Phase};
/// use composable_api_core::method::HttpMethod;
///
/// let types = ActionTypes::new(HttpMethod::Post, "/api/x");
/// assert_eq!(types.request.as_str(), "[POST]/api/x_REQUEST");
/// assert_eq!(types.get(Phase::Failure).as_str(), "[POST]/api/x_FAILURE");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionTypes {
    /// Request phase
    pub request: ActionType,
    /// Success phase
    pub success: ActionType,
    /// Failure phase
    pub failure: ActionType,
}

impl ActionTypes {
    /// Derive the triple for `method` and `template`.
    #[must_use]
    pub fn new(method: HttpMethod, template: impl Into<Arc<str>>) -> Self {
        let endpoint = EndpointKey::new(method, template);
        Self {
            request: ActionType::new(endpoint.clone(), Phase::Request),
            success: ActionType::new(endpoint.clone(), Phase::Success),
            failure: ActionType::new(endpoint, Phase::Failure),
        }
    }

    /// Endpoint shared by all three members.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointKey {
        self.request.endpoint()
    }

    /// Member for `phase`.
    #[must_use]
    pub const fn get(&self, phase: Phase) -> &ActionType {
        match phase {
            Phase::Request => &self.request,
            Phase::Success => &self.success,
            Phase::Failure => &self.failure,
        }
    }

    /// Whether `action_type` belongs to this triple.
    #[must_use]
    pub fn contains(&self, action_type: &ActionType) -> bool {
        action_type.endpoint() == self.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_follow_method_and_template() {
        let types = ActionTypes::new(HttpMethod::Get, "/api/users/:id");

        assert_eq!(types.request.as_str(), "[GET]/api/users/:id_REQUEST");
        assert_eq!(types.success.as_str(), "[GET]/api/users/:id_SUCCESS");
        assert_eq!(types.failure.as_str(), "[GET]/api/users/:id_FAILURE");
        assert_eq!(types.endpoint().to_string(), "[GET]/api/users/:id");
    }

    #[test]
    fn test_types_are_stable_per_endpoint() {
        let a = ActionTypes::new(HttpMethod::Post, "/api/prediction/accuracy");
        let b = ActionTypes::new(HttpMethod::Post, "/api/prediction/accuracy");
        assert_eq!(a, b);

        let other = ActionTypes::new(HttpMethod::Get, "/api/prediction/accuracy");
        assert_ne!(a.success, other.success);
        assert!(!a.contains(&other.request));
        assert!(a.contains(&b.failure));
    }

    proptest! {
        #[test]
        fn prop_triple_is_distinct_and_prefixed(template in "/[a-z:/_]{0,24}") {
            for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete] {
                let types = ActionTypes::new(method, template.as_str());
                let prefix = format!("[{method}]{template}");

                let names: HashSet<&str> = [
                    types.request.as_str(),
                    types.success.as_str(),
                    types.failure.as_str(),
                ]
                .into_iter()
                .collect();
                prop_assert_eq!(names.len(), 3);

                prop_assert!(types.request.as_str().starts_with(&prefix));
                prop_assert!(types.request.as_str().ends_with("_REQUEST"));
                prop_assert!(types.success.as_str().starts_with(&prefix));
                prop_assert!(types.success.as_str().ends_with("_SUCCESS"));
                prop_assert!(types.failure.as_str().starts_with(&prefix));
                prop_assert!(types.failure.as_str().ends_with("_FAILURE"));
            }
        }
    }
}
