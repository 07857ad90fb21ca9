use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use docintel_core::Session;
use docintel_llm::AnyEmbedder;
use tokio::sync::{Mutex, watch};

use crate::error::GatewayError;
use crate::router::build_router;

/// Shared handler state. Requests take turns on the session.
///
/// `document_loaded` mirrors the session's readiness so `/health` never waits
/// on the session lock.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session<AnyEmbedder>>>,
    pub document_loaded: Arc<AtomicBool>,
    pub started_at: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(session: Session<AnyEmbedder>) -> Self {
        Self {
            document_loaded: Arc::new(AtomicBool::new(session.is_ready())),
            session: Arc::new(Mutex::new(session)),
            started_at: Instant::now(),
        }
    }
}

pub struct GatewayServer {
    addr: SocketAddr,
    max_body_size: usize,
    session: Session<AnyEmbedder>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        session: Session<AnyEmbedder>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway listening on all interfaces without authentication");
        }

        Self {
            addr,
            max_body_size: 52_428_800,
            session,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the shutdown channel flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let router = build_router(AppState::new(self.session), self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|source| GatewayError::Bind {
                addr: self.addr.to_string(),
                source,
            })?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use docintel_core::config::Config;
    use docintel_llm::mock::MockEmbedder;

    use super::*;

    fn session() -> Session<AnyEmbedder> {
        Session::new(AnyEmbedder::Mock(MockEmbedder::default()), &Config::default()).unwrap()
    }

    #[test]
    fn server_builder_chain() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 8090, session(), srx).with_max_body_size(512);
        assert_eq!(server.max_body_size, 512);
        assert_eq!(server.addr().port(), 8090);
    }

    #[test]
    fn server_invalid_bind_fallback() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("not_an_ip", 9999, session(), srx);
        assert_eq!(server.addr(), SocketAddr::from(([127, 0, 0, 1], 9999)));
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown_signal() {
        let (stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 0, session(), srx);
        let handle = tokio::spawn(server.serve());
        stx.send(true).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
