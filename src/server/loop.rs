// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop on `listener` until `shutdown` is notified.
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// After shutdown the listener is closed at once and in-flight connections
/// get up to `performance.write_timeout` seconds to complete.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.write_timeout);
    drain_connections(&active_connections, grace).await;
    Ok(())
}

/// Wait until no connection is active or `grace` has elapsed
async fn drain_connections(active: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {} connection(s) still open",
                active.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    logger::log_info("[Shutdown] All connections closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};
    use crate::server::create_reusable_listener;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_state(tmp: &TempDir) -> Arc<AppState> {
        let mut cfg = Config::load_from(&tmp.path().join("none").to_string_lossy()).unwrap();
        cfg.stats.dir = tmp.path().to_path_buf();
        cfg.logging.access_log = false;
        Arc::new(AppState::new(&cfg))
    }

    async fn raw_request(addr: std::net::SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request =
            format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_serves_requests_until_shutdown() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("1.json"), "{\"a\":1}").unwrap();
        std::fs::write(tmp.path().join("2.json"), "{}").unwrap();
        let state = test_state(&tmp);

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let shutdown = Arc::new(Notify::new());
                let server =
                    tokio::task::spawn_local(run_server(listener, state, Arc::clone(&shutdown)));

                let listing = raw_request(addr, "/jjc_ranking_stats").await;
                assert!(listing.starts_with("HTTP/1.1 200 OK"), "{listing}");
                assert!(listing.contains("application/json; charset=utf-8"));
                assert!(listing.ends_with("[2,1]"), "{listing}");

                let read = raw_request(addr, "/jjc_ranking_stats?action=read&timestamp=1").await;
                assert!(read.ends_with("{\"a\":1}"), "{read}");

                let bad = raw_request(addr, "/jjc_ranking_stats?action=bogus").await;
                assert!(bad.starts_with("HTTP/1.1 400"), "{bad}");

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let active = AtomicUsize::new(0);
        tokio::time::timeout(Duration::from_secs(1), drain_connections(&active, Duration::ZERO))
            .await
            .unwrap();
    }
}
