//! `ReqwestTransport` against a local mock server.

#![allow(clippy::unwrap_used)]

use composable_api_core::action::{ApiCall, ApiFailure};
use composable_api_core::config::ApiConfig;
use composable_api_core::creator::Api;
use composable_api_core::dispatch::ApiStateSnapshot;
use composable_api_core::environment::HttpTransport;
use composable_api_core::error::TransportError;
use composable_api_core::options::{FilePart, RequestOptions};
use composable_api_runtime::ReqwestTransport;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn call(
    api: &Api,
    verb: &str,
    endpoint: &str,
    options: RequestOptions,
    token: Option<&str>,
) -> ApiCall {
    let creator = match verb {
        "GET" => api.get(endpoint.to_string()),
        "POST" => api.post(endpoint.to_string()),
        _ => api.delete(endpoint.to_string()),
    };
    let mut state = ApiStateSnapshot::default();
    if let Some(token) = token {
        state = state.with_auth_token(token);
    }
    let request = creator.resolve(&options, &state).unwrap();
    ApiCall {
        request,
        meta: Arc::new(options),
    }
}

#[tokio::test]
async fn test_get_with_params_query_and_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/42"))
        .and(query_param("include", "teams"))
        .and(header("authorization", "Bearer abc"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let api = Api::new(ApiConfig::new(server.uri()));
    let call = call(
        &api,
        "GET",
        "/api/users/:id",
        RequestOptions::new().param("id", 42).query("include", "teams"),
        Some("abc"),
    );

    let response = ReqwestTransport::new().execute(&call).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "id": 42 }));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/prediction/accuracy"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "years": 3, "model": "arima" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "accuracy": 0.87 })))
        .expect(1)
        .mount(&server)
        .await;

    let api = Api::new(ApiConfig::new(server.uri()));
    let call = call(
        &api,
        "POST",
        "/api/prediction/accuracy",
        RequestOptions::new().body(json!({ "years": 3, "model": "arima" })),
        None,
    );

    let response = ReqwestTransport::new().execute(&call).await.unwrap();
    let result = call.settle(Ok(response));

    assert!(!result.is_error());
    assert_eq!(result.response().unwrap().body["accuracy"], json!(0.87));
}

#[tokio::test]
async fn test_multipart_upload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/avatar"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"avatar\""))
        .and(body_string_contains("name=\"caption\""))
        .and(body_string_contains("holiday"))
        .and(body_string_contains("filename=\"me.png\""))
        .and(body_string_contains("PNGDATA"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = Api::new(ApiConfig::new(server.uri()));
    let call = call(
        &api,
        "POST",
        "/api/avatar",
        RequestOptions::new()
            .body(json!({ "caption": "holiday" }))
            .file(
                "avatar",
                FilePart::new(b"PNGDATA".to_vec())
                    .with_file_name("me.png")
                    .with_mime("image/png"),
            ),
        None,
    );

    let response = ReqwestTransport::new().execute(&call).await.unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/items/7"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let api = Api::new(ApiConfig::new(server.uri()));
    let call = call(
        &api,
        "DELETE",
        "/api/items/:id",
        RequestOptions::new().param("id", 7),
        None,
    );

    let response = ReqwestTransport::new().execute(&call).await.unwrap();
    let result = call.settle(Ok(response));

    assert_eq!(
        result.failure(),
        Some(&ApiFailure::Http {
            status: 502,
            body: json!("Bad Gateway"),
        })
    );
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind and release a port so nothing is listening on it
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let api = Api::new(ApiConfig::new(format!("http://{addr}")));
    let call = call(&api, "GET", "/api/ping", RequestOptions::new(), None);

    let outcome = ReqwestTransport::new().execute(&call).await;

    assert!(matches!(outcome, Err(TransportError::RequestFailed(_))));
}
