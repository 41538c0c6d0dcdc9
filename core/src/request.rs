//! Request resolution: URL building, header assembly and body encoding.
//!
//! A [`ResolvedRequest`] is built fresh for every invocation of an action
//! creator and handed to the middleware inside an [`ApiCall`](crate::action::ApiCall).

use crate::action_type::ActionTypes;
use crate::config::{ApiConfig, BaseUrl};
use crate::dispatch::ApiStateSnapshot;
use crate::error::ApiError;
use crate::method::HttpMethod;
use crate::options::{FilePart, RequestOptions, RequestPayload};
use serde_json::Value;

/// `Accept` header name
pub const ACCEPT: &str = "Accept";
/// `Content-Type` header name
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Authorization` header name
pub const AUTHORIZATION: &str = "Authorization";
/// JSON media type
pub const APPLICATION_JSON: &str = "application/json";

/// Value of one multipart form part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormValue {
    /// Text field
    Text(String),
    /// File field
    File(FilePart),
}

/// One multipart form part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPart {
    /// Field name
    pub name: String,
    /// Field value
    pub value: FormValue,
}

/// Encoded request body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EncodedBody {
    /// No body
    #[default]
    Empty,
    /// JSON text
    Json(String),
    /// Multipart form parts; the transport sets the boundary
    Multipart(Vec<FormPart>),
}

/// Everything the middleware needs to perform one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Final URL: base URL, interpolated path and query string
    pub url: String,
    /// Request headers, in insertion order
    pub headers: Vec<(String, String)>,
    /// Encoded body
    pub body: EncodedBody,
    /// Lifecycle types the middleware dispatches
    pub types: ActionTypes,
}

impl ResolvedRequest {
    /// Resolve `options` against the endpoint described by `types`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if the body cannot be serialized, or
    /// [`ApiError::MultipartBody`] if files are attached to a non-object body.
    pub fn resolve(
        config: &ApiConfig,
        types: &ActionTypes,
        options: &RequestOptions,
        state: &ApiStateSnapshot,
    ) -> Result<Self, ApiError> {
        let endpoint = types.endpoint();
        let body = encode_body(options.payload())?;

        let base_url = match &config.base_url {
            BaseUrl::Fixed(url) => url.as_str(),
            BaseUrl::FromState => state.base_url.as_deref().unwrap_or_default(),
        };
        let mut url = format!(
            "{base_url}{}",
            interpolate(endpoint.template(), options.params())
        );
        append_query(&mut url, options.query_entries(), config.escape_query);

        let mut headers = vec![(ACCEPT.to_string(), APPLICATION_JSON.to_string())];
        if !matches!(body, EncodedBody::Multipart(_)) {
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }
        if let Some(token) = state.auth_token.as_deref().filter(|t| !t.is_empty()) {
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
        }

        Ok(Self {
            method: endpoint.method(),
            url,
            headers,
            body,
            types: types.clone(),
        })
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Substitute `:name` placeholders in a single pass over `template`.
///
/// At each `:` the supplied names are matched as literal prefixes of the
/// following text and the longest match wins. A match must not be followed by
/// `[A-Za-z0-9_]`, so `:id` never matches inside `:idx`. Names may contain any
/// other character (`:book-id`, `:v.1`). Substituted values are never
/// re-scanned and unknown placeholders are kept verbatim.
///
/// ```
/// use composable_api_core::request::interpolate;
///
/// let params = vec![("id".to_string(), "5".to_string())];
/// assert_eq!(interpolate("/users/:id/:idx", &params), "/users/5/:idx");
/// ```
#[must_use]
pub fn interpolate(template: &str, params: &[(String, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let matched = params
            .iter()
            .filter(|(name, _)| !name.is_empty() && after.starts_with(name.as_str()))
            .filter(|(name, _)| !after[name.len()..].starts_with(is_name_char))
            .max_by_key(|(name, _)| name.len());

        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len()..];
            },
            None => {
                out.push(':');
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Append `query` to `url` as `?k1=v1&k2=v2`, in order.
///
/// Uses `&` as the first separator when `url` already carries a query string.
pub fn append_query(url: &mut String, query: &[(String, String)], escape: bool) {
    let mut separator = if url.contains('?') { '&' } else { '?' };

    for (key, value) in query {
        url.push(separator);
        if escape {
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        } else {
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        separator = '&';
    }
}

fn encode_body(payload: &RequestPayload) -> Result<EncodedBody, ApiError> {
    match payload {
        RequestPayload::Empty => Ok(EncodedBody::Empty),
        RequestPayload::Json(body) => match body.encode()? {
            Value::Null => Ok(EncodedBody::Empty),
            value => Ok(EncodedBody::Json(serde_json::to_string(&value)?)),
        },
        RequestPayload::Multipart { fields, files } => {
            let mut parts = Vec::with_capacity(files.len());

            if let Some(fields) = fields {
                match fields.encode()? {
                    Value::Object(map) => {
                        for (name, value) in map {
                            let text = match value {
                                Value::String(s) => s,
                                other => other.to_string(),
                            };
                            parts.push(FormPart {
                                name,
                                value: FormValue::Text(text),
                            });
                        }
                    },
                    Value::Null => {},
                    other => return Err(ApiError::MultipartBody(json_kind(&other))),
                }
            }

            for (name, file) in files {
                parts.push(FormPart {
                    name: name.clone(),
                    value: FormValue::File(file.clone()),
                });
            }

            Ok(EncodedBody::Multipart(parts))
        },
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
