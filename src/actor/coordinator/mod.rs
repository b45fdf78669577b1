//! Actor Coordinator - Wires up the tail pipeline
//!
//! # Responsibility
//!
//! The Coordinator is a **thin orchestrator** that:
//! - Opens the watched file and binds the listener (fatal on failure)
//! - Creates the channel between TailActor and WsActor
//! - Runs the actors until Ctrl+C or a fatal watcher error
//!
//! # Architecture
//!
//! ```text
//! TailActor --[Chunk]--> WsActor --> Registry <-- Acceptor
//!  (poll|notify)         (fan-out)                (serve)
//! ```
//!
//! Setup is split in two so callers can learn the bound address before the
//! pipeline starts: `Coordinator::bind` then `BoundCoordinator::run`.

mod runtime;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::messages::WsMsg;
use super::tail::{NotifySource, PollSource, TailActor, TailReader};
use super::ws::{Registry, WsActor};
use crate::config::{Config, WatchBackend};
use crate::serve::Acceptor;

/// Coordinator - wires up and runs the actor system
pub struct Coordinator {
    config: Arc<Config>,
    /// Optional shutdown signal receiver
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Open the watched file and bind the listener.
    ///
    /// Everything that may fail at startup happens here, before any task is
    /// spawned.
    pub async fn bind(self) -> Result<BoundCoordinator> {
        let watch = &self.config.watch;
        let reader = TailReader::open(&watch.path)
            .with_context(|| format!("cannot watch {}", watch.path.display()))?;

        let broadcast = &self.config.broadcast;
        let registry = Arc::new(Registry::new(broadcast.client_queue, broadcast.overflow));

        let acceptor = Acceptor::bind(&self.config.serve, Arc::clone(&registry)).await?;
        let addr = acceptor.local_addr()?;

        crate::log!("serve"; "ws://{}{}", addr, self.config.serve.path);
        crate::log!("tail"; "watching {} from byte {}", watch.path.display(), reader.offset());

        Ok(BoundCoordinator {
            config: self.config,
            shutdown_rx: self.shutdown_rx,
            reader,
            registry,
            acceptor,
            addr,
        })
    }
}

/// A coordinator whose file is open and whose listener is bound.
pub struct BoundCoordinator {
    config: Arc<Config>,
    shutdown_rx: Option<Receiver<()>>,
    reader: TailReader,
    registry: Arc<Registry>,
    acceptor: Acceptor,
    addr: SocketAddr,
}

impl BoundCoordinator {
    #[cfg(test)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[cfg(test)]
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Run the actor system until shutdown.
    ///
    /// Returns `Err` only when the watcher gives up.
    pub async fn run(self) -> Result<()> {
        let config = self.config;
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(config.broadcast.channel_capacity);
        let ws = WsActor::new(ws_rx, self.registry, &config.broadcast);
        let retry = config.watch.retry_policy();
        let interval = config.watch.interval();

        crate::debug!("actor"; "start ({:?} backend, listening on {})", config.watch.backend, self.addr);
        let result = match config.watch.backend {
            WatchBackend::Poll => {
                let source = PollSource::new(self.reader, interval);
                let tail = TailActor::new(source, ws_tx.clone(), retry);
                runtime::run_actors(tail, ws, self.acceptor, ws_tx, self.shutdown_rx).await
            }
            WatchBackend::Notify => {
                let source = NotifySource::new(self.reader, interval)
                    .context("failed to start filesystem watcher")?;
                let tail = TailActor::new(source, ws_tx.clone(), retry);
                runtime::run_actors(tail, ws, self.acceptor, ws_tx, self.shutdown_rx).await
            }
        };

        crate::debug!("actor"; "stopped");
        result
    }
}
