//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health checks, the stats
//! endpoint, and a JSON 404 for everything else. Any method is accepted.

use crate::config::AppState;
use crate::handler::stats;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = route_request(&req, &state).await;

    if state.config.logging.access_log {
        let entry = build_access_entry(&req, &response, remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
async fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let path = req.uri().path();
    let health = &state.config.health;

    // Health check endpoints (highest priority, always fast)
    if health.enabled {
        if path == health.liveness_path {
            return http::build_health_response(StatusCode::OK, "ok");
        }
        if path == health.readiness_path {
            return match state.reader.ensure_base_dir().await {
                Ok(()) => http::build_health_response(StatusCode::OK, "ok"),
                Err(_) => {
                    http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "not ready")
                }
            };
        }
    }

    if path == state.config.stats.endpoint {
        let params = http::QueryParams::parse(req.uri().query());
        return stats::serve_stats(&params, state).await;
    }

    logger::log_debug(&format!("No route for path: {path}"));
    http::build_404_response(&state.config.http)
}

fn build_access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::Method;
    use tempfile::TempDir;

    fn state_for(dir: &std::path::Path) -> Arc<AppState> {
        let missing = dir.join("no-config-file");
        let mut cfg = Config::load_from(&missing.to_string_lossy()).unwrap();
        cfg.stats.dir = dir.join("stats");
        cfg.logging.access_log = false;
        Arc::new(AppState::new(&cfg))
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> (StatusCode, Bytes) {
        let resp = handle_request(request(method, uri), Arc::clone(state), peer())
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.into_body().collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn test_stats_endpoint_lists() {
        let tmp = TempDir::new().unwrap();
        let state = state_for(tmp.path());
        std::fs::create_dir(tmp.path().join("stats")).unwrap();
        std::fs::write(tmp.path().join("stats/1700000000.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("stats/1700000100.json"), "{}").unwrap();

        let (status, body) = send(&state, Method::GET, "/jjc_ranking_stats?action=list").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"[1700000100,1700000000]");
    }

    #[tokio::test]
    async fn test_method_agnostic() {
        let tmp = TempDir::new().unwrap();
        let state = state_for(tmp.path());
        std::fs::create_dir(tmp.path().join("stats")).unwrap();
        std::fs::write(tmp.path().join("stats/9.json"), "[9]").unwrap();

        let uri = "/jjc_ranking_stats?action=read&timestamp=9";
        let (get_status, get_body) = send(&state, Method::GET, uri).await;
        let (post_status, post_body) = send(&state, Method::POST, uri).await;
        assert_eq!(get_status, StatusCode::OK);
        assert_eq!(post_status, StatusCode::OK);
        assert_eq!(get_body, post_body);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let tmp = TempDir::new().unwrap();
        let state = state_for(tmp.path());
        let (status, body) = send(&state, Method::GET, "/elsewhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "not_found");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let tmp = TempDir::new().unwrap();
        let state = state_for(tmp.path());

        let resp = handle_request(request(Method::GET, "/healthz"), Arc::clone(&state), peer())
            .await
            .unwrap();
        assert_eq!(resp.headers()["Content-Type"], http::response::JSON_CONTENT_TYPE);

        let (status, body) = send(&state, Method::GET, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
        let (status, body) = send(&state, Method::GET, "/readyz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(&body[..], br#"{"status":"not ready"}"#);

        std::fs::create_dir(tmp.path().join("stats")).unwrap();
        let (status, body) = send(&state, Method::GET, "/readyz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .uri("/jjc_ranking_stats?action=list")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let resp = Response::builder()
            .status(200)
            .header("Content-Length", 12)
            .body(Full::new(Bytes::new()))
            .unwrap();

        let entry = build_access_entry(&req, &resp, peer(), Instant::now());
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.query.as_deref(), Some("action=list"));
        assert_eq!(entry.body_bytes, 12);
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert!(entry.referer.is_none());
    }
}
