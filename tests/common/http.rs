use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

/// Send one request through the router. A JSON `body` sets the content type.
pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, String)],
) -> Response {
    let mut req = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        req = req.header(*name, value);
    }

    let body = match body {
        Some(payload) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&payload).unwrap())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
}

/// Split a response into status, headers and parsed JSON. An empty body
/// reads as `{}`.
pub async fn response_json(resp: Response) -> (StatusCode, HeaderMap, Value) {
    let (parts, body) = resp.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let json = match bytes.as_ref() {
        [] => json!({}),
        raw => serde_json::from_slice(raw)
            .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(raw))),
    };
    (parts.status, parts.headers, json)
}

pub fn assert_json_error(body: &Value, code: &str) {
    assert_eq!(body["success"], json!(false), "{body}");
    assert_eq!(body["code"], json!(code), "{body}");
    assert!(body["message"].is_string(), "{body}");
}

pub fn assert_status_ok_json(status: StatusCode, body: &Value) {
    assert!(status.is_success(), "unexpected status {status}: {body}");
    assert_eq!(body["success"], json!(true), "{body}");
    assert!(!body["data"].is_null(), "{body}");
}
