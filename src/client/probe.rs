//! Liveness probe
//!
//! Opens a throwaway connection to the stream service, with no channel
//! handshake, to answer "is the service reachable". The connection is
//! closed as soon as the answer is known.

use std::time::Duration;

use tokio_tungstenite::connect_async;

use super::config::StreamConfig;

/// Check whether a WebSocket connection to `url` opens within `timeout`.
///
/// Resolves `false` on connection errors and on timeout; neither is
/// treated as a fault.
pub async fn probe(url: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, connect_async(url)).await {
        Ok(Ok((mut ws, _))) => {
            if let Err(e) = ws.close(None).await {
                tracing::trace!(url = url, error = %e, "Failed to close probe connection");
            }
            tracing::debug!(url = url, "Stream service reachable");
            true
        }
        Ok(Err(e)) => {
            tracing::debug!(url = url, error = %e, "Stream service unreachable");
            false
        }
        Err(_) => {
            // Dropping the connect future closes the socket
            tracing::debug!(
                url = url,
                timeout_ms = timeout.as_millis() as u64,
                "Stream service probe timed out"
            );
            false
        }
    }
}

/// Probe the service described by `config`
pub async fn probe_service(config: &StreamConfig) -> bool {
    probe(&config.url(), config.probe_timeout).await
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::net::TcpListener;

    use super::*;
    use crate::protocol::DEFAULT_PROBE_TIMEOUT;

    #[tokio::test]
    async fn test_probe_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let _ws = tokio_tungstenite::accept_async(socket).await.unwrap();
        });

        let url = format!("ws://{}", addr);
        assert!(probe(&url, DEFAULT_PROBE_TIMEOUT).await);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_silent_server_times_out() {
        // Accepts TCP but never answers the WebSocket upgrade
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let start = Instant::now();
        let reachable = probe(&format!("ws://{}", addr), DEFAULT_PROBE_TIMEOUT).await;
        let elapsed = start.elapsed();

        assert!(!reachable);
        assert!(elapsed >= Duration::from_millis(2900), "resolved early: {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(4000), "resolved late: {:?}", elapsed);
    }

    #[test]
    fn test_probe_refused() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let config = StreamConfig::with_port(port).host("127.0.0.1");
        assert!(!tokio_test::block_on(probe_service(&config)));
    }
}
