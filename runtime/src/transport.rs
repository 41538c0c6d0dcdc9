//! HTTP transport built on `reqwest`.

use composable_api_core::action::{ApiCall, ApiResponse};
use composable_api_core::environment::HttpTransport;
use composable_api_core::error::TransportError;
use composable_api_core::method::HttpMethod;
use composable_api_core::request::{EncodedBody, FormPart, FormValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Production [`HttpTransport`].
///
/// Non-2xx responses are returned as `Ok`; only failures to get a response
/// at all become [`TransportError`]s.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Transport with a default `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport sharing an existing client (connection pool, timeouts, proxies).
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, call: &ApiCall) -> Result<ApiResponse, TransportError> {
        let request = &call.request;
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            EncodedBody::Empty => builder,
            EncodedBody::Json(text) => builder.body(text.clone()),
            EncodedBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::ResponseRead(e.to_string()))?;

        Ok(ApiResponse {
            status,
            headers,
            body: parse_body(&text),
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        call: &'a ApiCall,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>> {
        Box::pin(self.send(call))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();

    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File(file) => {
                let mut file_part = Part::bytes(file.bytes.to_vec());
                if let Some(file_name) = &file.file_name {
                    file_part = file_part.file_name(file_name.clone());
                }
                if let Some(mime) = &file.mime {
                    file_part = file_part.mime_str(mime).map_err(|e| {
                        TransportError::InvalidRequest(format!("Invalid MIME type: {e}"))
                    })?;
                }
                form.part(part.name.clone(), file_part)
            },
        };
    }

    Ok(form)
}

/// JSON when the body parses, `null` when empty, the raw text otherwise.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  \n"), Value::Null);
        assert_eq!(parse_body(r#"{"ok":true}"#), json!({ "ok": true }));
        assert_eq!(parse_body("Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Options), Method::OPTIONS);
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        use composable_api_core::options::FilePart;

        let parts = vec![FormPart {
            name: "file".to_string(),
            value: FormValue::File(FilePart::new(vec![1u8, 2, 3]).with_mime("not a mime")),
        }];

        assert!(matches!(
            build_form(&parts),
            Err(TransportError::InvalidRequest(_))
        ));
    }
}
