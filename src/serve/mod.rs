//! Connection acceptor.
//!
//! Listens on `serve.interface:serve.port`, upgrades requests for the
//! configured path and hands each client to `serve_client`. Requests for any
//! other path are answered with 404.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;

use crate::actor::ws::{Registry, serve_client};
use crate::config::ServeConfig;
use crate::core::is_shutdown;

/// Pause after a failed `accept` (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound listener, ready to accept clients.
pub struct Acceptor {
    listener: TcpListener,
    path: Arc<str>,
    registry: Arc<Registry>,
}

impl Acceptor {
    /// Bind the listener. Failure here is fatal for the process.
    pub async fn bind(config: &ServeConfig, registry: Arc<Registry>) -> Result<Self> {
        let addr = config.addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        Ok(Self {
            listener,
            path: Arc::from(config.path.as_str()),
            registry,
        })
    }

    /// Actual bound address (resolves port `0`).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the task is aborted.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if is_shutdown() {
                        crate::debug!("serve"; "refusing {} during shutdown", addr);
                        continue;
                    }
                    tokio::spawn(handle_connection(
                        stream,
                        addr,
                        Arc::clone(&self.path),
                        Arc::clone(&self.registry),
                    ));
                }
                Err(e) => {
                    crate::log!("serve"; "accept error: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, path: Arc<str>, registry: Arc<Registry>) {
    let check_path = |req: &Request, resp: Response| {
        if req.uri().path() == &*path {
            return Ok(resp);
        }
        crate::debug!("serve"; "rejecting {}: unknown path {}", addr, req.uri().path());
        let mut reject = ErrorResponse::new(Some("not found".to_string()));
        *reject.status_mut() = StatusCode::NOT_FOUND;
        Err(reject)
    };

    match tokio_tungstenite::accept_hdr_async(stream, check_path).await {
        Ok(ws) => serve_client(ws, addr, registry).await,
        Err(e) => crate::debug!("serve"; "handshake with {} failed: {}", addr, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overflow;

    fn ephemeral() -> ServeConfig {
        ServeConfig {
            port: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let registry = Arc::new(Registry::new(4, Overflow::DropOldest));
        let acceptor = Acceptor::bind(&ephemeral(), registry).await.unwrap();
        assert_ne!(acceptor.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_error() {
        let registry = Arc::new(Registry::new(4, Overflow::DropOldest));
        let first = Acceptor::bind(&ephemeral(), Arc::clone(&registry)).await.unwrap();
        let taken = ServeConfig {
            port: first.local_addr().unwrap().port(),
            ..Default::default()
        };

        let err = Acceptor::bind(&taken, registry).await.err().unwrap();
        assert!(err.to_string().contains("failed to bind"));
    }
}
