//! Configuration for API action creators.

/// Environment variable read by [`ApiConfig::from_env`].
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Where the base URL of an API comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrl {
    /// Bound when the action creator is built
    Fixed(String),
    /// Read from the store state on every call
    FromState,
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self::Fixed(String::new())
    }
}

/// Configuration shared by the action creators of one API.
///
/// # Example
///
/// ```
/// use composable_api_core::config::{ApiConfig, BaseUrl};
///
/// let config = ApiConfig::new("https://api.example.com")
///     .with_query_escaping(false);
///
/// assert_eq!(config.base_url, BaseUrl::Fixed("https://api.example.com".to_string()));
/// assert!(!config.escape_query);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL strategy
    pub base_url: BaseUrl,
    /// Percent-encode query keys and values
    pub escape_query: bool,
}

impl ApiConfig {
    /// Configuration with a fixed base URL and query escaping enabled.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: BaseUrl::Fixed(base_url.into()),
            escape_query: true,
        }
    }

    /// Configuration that reads the base URL from the store state at call time.
    #[must_use]
    pub const fn from_state() -> Self {
        Self {
            base_url: BaseUrl::FromState,
            escape_query: true,
        }
    }

    /// Configuration with the base URL taken from `API_BASE_URL`.
    ///
    /// Falls back to an empty base URL (relative endpoints) when unset.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_default();
        Self::new(base_url)
    }

    /// Toggle percent-encoding of query keys and values.
    ///
    /// Disabling it concatenates keys and values verbatim.
    #[must_use]
    pub const fn with_query_escaping(mut self, escape: bool) -> Self {
        self.escape_query = escape;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::default(),
            escape_query: true,
        }
    }
}
