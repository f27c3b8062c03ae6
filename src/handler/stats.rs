//! Stats endpoint module
//!
//! Turns decoded query parameters into a snapshot request and the outcome
//! into a JSON response.

use crate::config::AppState;
use crate::http::{self, QueryParams};
use crate::logger;
use crate::snapshot::{self, Snapshot, SnapshotError};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Serve one stats request (`action=list` or `action=read&timestamp=N`)
pub async fn serve_stats(params: &QueryParams, state: &AppState) -> Response<Full<Bytes>> {
    let http_config = &state.config.http;
    let outcome =
        snapshot::dispatch(&state.reader, params.get("action"), params.get("timestamp")).await;

    match outcome {
        Ok(Snapshot::Ids(ids)) => {
            logger::log_debug(&format!("[Stats] Listed {} snapshots", ids.len()));
            http::build_serialized_response(StatusCode::OK, &ids, http_config)
        }
        Ok(Snapshot::Raw(data)) => {
            logger::log_debug(&format!("[Stats] Serving snapshot ({} bytes)", data.len()));
            http::build_json_response(StatusCode::OK, Bytes::from(data), http_config)
        }
        Err(err) => {
            log_stats_error(&err, state);
            http::build_error_response(&err, http_config)
        }
    }
}

fn log_stats_error(err: &SnapshotError, state: &AppState) {
    let dir = state.reader.base_dir().display();
    if err.status().is_server_error() {
        logger::log_error(&format!("[Stats] {err} (dir: {dir})"));
    } else {
        logger::log_warning(&format!("[Stats] {} (dir: {dir})", err.code()));
    }
}
