//! Per-invocation request options.
//!
//! [`RequestOptions`] is what callers hand to an action creator: path
//! parameters, query entries, an optional body and files, and the
//! success/error callbacks. Every field is optional; an absent field omits
//! that aspect of the request.
//!
//! The body/files combination is captured by [`RequestPayload`] so that a
//! request is either empty, plain JSON, or multipart, never an ambiguous mix.

use crate::action::DispatchResult;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the settled result of a call.
pub type Callback = Arc<dyn Fn(&DispatchResult) + Send + Sync>;

type Encoder = Arc<dyn Fn() -> serde_json::Result<Value> + Send + Sync>;

/// A body whose JSON serialization is deferred until the request is encoded.
///
/// Serialization errors therefore surface from the encoding step of the call,
/// before anything is dispatched.
#[derive(Clone)]
pub struct JsonBody {
    encoder: Encoder,
}

impl JsonBody {
    /// Wrap any serializable value.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            encoder: Arc::new(move || serde_json::to_value(&value)),
        }
    }

    /// Serialize the wrapped value.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the value cannot be represented as JSON.
    pub fn encode(&self) -> serde_json::Result<Value> {
        (self.encoder)()
    }
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonBody(<deferred>)")
    }
}

/// Binary content of one multipart file field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    /// File name reported to the server
    pub file_name: Option<String>,
    /// MIME type of the content
    pub mime: Option<String>,
    /// Raw bytes
    pub bytes: Arc<[u8]>,
}

impl FilePart {
    /// File part with raw bytes and no name or MIME type.
    #[must_use]
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: None,
            mime: None,
            bytes: bytes.into(),
        }
    }

    /// Set the reported file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// The body of a request.
#[derive(Clone, Debug, Default)]
pub enum RequestPayload {
    /// No body
    #[default]
    Empty,
    /// JSON body
    Json(JsonBody),
    /// Multipart form: optional body fields plus at least one file
    Multipart {
        /// Body whose top-level object entries become form fields
        fields: Option<JsonBody>,
        /// File fields, in insertion order
        files: Vec<(String, FilePart)>,
    },
}

impl RequestPayload {
    /// Whether the request will be multipart encoded.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart { .. })
    }
}

/// Options for one invocation of an API action creator.
///
/// # Example
///
/// ```
/// use composable_api_core::options::RequestOptions;
///
/// let options = RequestOptions::new()
///     .param("id", 5)
///     .query("years", 3)
///     .query("active", true)
///     .body(serde_json::json!({ "a": 1 }));
///
/// assert_eq!(options.params().len(), 1);
/// assert_eq!(options.query_entries().len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    payload: RequestPayload,
    on_success: Option<Callback>,
    on_error: Option<Callback>,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value substituted for the `:name` placeholder.
    ///
    /// Setting the same name twice keeps the last value.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        upsert(&mut self.params, name.into(), value.to_string());
        self
    }

    /// Append a query entry. Entries are rendered in insertion order.
    ///
    /// Setting the same key twice keeps its first position and the last value.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        upsert(&mut self.query, key.into(), value.to_string());
        self
    }

    /// Set the request body.
    ///
    /// When files are attached the body's top-level fields are sent as
    /// multipart form fields instead of a JSON document.
    #[must_use]
    pub fn body<T>(mut self, body: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        let body = JsonBody::new(body);
        self.payload = match self.payload {
            RequestPayload::Multipart { files, .. } => RequestPayload::Multipart {
                fields: Some(body),
                files,
            },
            RequestPayload::Empty | RequestPayload::Json(_) => RequestPayload::Json(body),
        };
        self
    }

    /// Attach a file field, switching the request to multipart encoding.
    #[must_use]
    pub fn file(mut self, field: impl Into<String>, part: FilePart) -> Self {
        let field = field.into();
        self.payload = match self.payload {
            RequestPayload::Empty => RequestPayload::Multipart {
                fields: None,
                files: vec![(field, part)],
            },
            RequestPayload::Json(body) => RequestPayload::Multipart {
                fields: Some(body),
                files: vec![(field, part)],
            },
            RequestPayload::Multipart { fields, mut files } => {
                files.push((field, part));
                RequestPayload::Multipart { fields, files }
            },
        };
        self
    }

    /// Callback run after a successful call.
    #[must_use]
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DispatchResult) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Callback run after a failed call.
    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DispatchResult) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Path parameters, in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Query entries, in insertion order.
    #[must_use]
    pub fn query_entries(&self) -> &[(String, String)] {
        &self.query
    }

    /// Request payload.
    #[must_use]
    pub const fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Success callback, if any.
    #[must_use]
    pub const fn success_callback(&self) -> Option<&Callback> {
        self.on_success.as_ref()
    }

    /// Error callback, if any.
    #[must_use]
    pub const fn error_callback(&self) -> Option<&Callback> {
        self.on_error.as_ref()
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("params", &self.params)
            .field("query", &self.query)
            .field("payload", &self.payload)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
        entry.1 = value;
    } else {
        entries.push((key, value));
    }
}
