//! HTTP response building module
//!
//! Provides builders for the JSON responses served by the stats endpoint,
//! decoupled from snapshot lookup logic.

use crate::config::HttpConfig;
use crate::snapshot::SnapshotError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Content type of every stats response, success or error
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Build a JSON response from already-encoded bytes
pub fn build_json_response(
    status: StatusCode,
    body: Bytes,
    http: &HttpConfig,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", body.len())
        .header("Server", http.server_name.as_str());

    if http.enable_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Serialize `value` compactly and wrap it in a JSON response
pub fn build_serialized_response<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
    http: &HttpConfig,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(json) => build_json_response(status, Bytes::from(json), http),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"internal_error","message":"serialization failed"}"#),
                http,
            )
        }
    }
}

/// Build the `{error, message}` body for a snapshot error
pub fn build_error_response(err: &SnapshotError, http: &HttpConfig) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": err.code(),
        "message": err.message(),
    });
    build_serialized_response(err.status(), &body, http)
}

/// Build 404 response for paths outside the stats endpoint
pub fn build_404_response(http: &HttpConfig) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": SnapshotError::NotFound.code(),
        "message": "接口不存在",
    });
    build_serialized_response(StatusCode::NOT_FOUND, &body, http)
}

/// Build health check response: `{"status": <status_text>}`, never cached
pub fn build_health_response(status: StatusCode, status_text: &str) -> Response<Full<Bytes>> {
    let body = Bytes::from(serde_json::json!({ "status": status_text }).to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", body.len())
        .header("Cache-Control", "no-cache")
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(body))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn http_config(enable_cors: bool) -> HttpConfig {
        HttpConfig {
            server_name: "test/1.0".to_string(),
            enable_cors,
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let resp = build_error_response(&SnapshotError::InvalidAction, &http_config(false));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["Content-Type"], JSON_CONTENT_TYPE);
        assert_eq!(resp.headers()["Server"], "test/1.0");
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());

        let value: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(value["error"], "invalid_action");
        assert!(value["message"].is_string());
    }

    #[tokio::test]
    async fn test_serialized_list_is_compact() {
        let resp = build_serialized_response(
            StatusCode::OK,
            &[1_700_000_100_u64, 1_700_000_000],
            &http_config(true),
        );
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(&body_bytes(resp).await[..], b"[1700000100,1700000000]");
    }

    #[tokio::test]
    async fn test_health_response_is_json() {
        let resp = build_health_response(StatusCode::SERVICE_UNAVAILABLE, "not ready");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers()["Content-Type"], JSON_CONTENT_TYPE);
        assert_eq!(resp.headers()["Cache-Control"], "no-cache");
        assert_eq!(&body_bytes(resp).await[..], br#"{"status":"not ready"}"#);
    }
}
