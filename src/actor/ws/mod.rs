//! WebSocket Actor - Fan-out of chunks to clients
//!
//! This actor is responsible for:
//! - Converting each chunk into one outbound frame
//! - Queueing that frame for every client registered at that moment
//! - Closing every client on shutdown
//!
//! # Architecture
//!
//! ```text
//! TailActor --[Chunk]--> WsActor --[frame]--> Registry --> ClientQueue --> writer task
//!                                                ^
//! Acceptor --[serve_client]----------------------+
//! ```
//!
//! The actor never writes to a socket itself; a stalled client only fills its
//! own bounded queue.

mod client_io;
mod delivery;
mod queue;
mod registry;

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::config::BroadcastConfig;

use delivery::FrameEncoder;

pub use client_io::serve_client;
pub use registry::Registry;

/// WebSocket Actor - broadcasts chunks in arrival order
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared with the acceptor)
    registry: Arc<Registry>,
    encoder: FrameEncoder,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, registry: Arc<Registry>, config: &BroadcastConfig) -> Self {
        Self {
            rx,
            registry,
            encoder: FrameEncoder::new(config.frame),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Chunk(chunk) => {
                    let Some(frame) = self.encoder.encode(&chunk) else {
                        crate::debug!("ws"; "chunk {} held back ({} bytes pending)", chunk, self.encoder.pending());
                        continue;
                    };

                    let delivery = self.registry.broadcast(&frame);
                    if delivery.pruned > 0 || delivery.overflowed > 0 {
                        crate::debug!(
                            "ws";
                            "chunk {}: {} queued, {} overflowed, {} pruned",
                            chunk, delivery.queued, delivery.overflowed, delivery.pruned
                        );
                    } else {
                        crate::debug!("ws"; "chunk {} to {} clients", chunk, delivery.queued);
                    }
                }

                WsMsg::Shutdown => {
                    let closed = self.registry.close_all();
                    crate::debug!("ws"; "shutting down, closed {} clients", closed);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use tungstenite::protocol::Message;

    use super::queue::ClientQueue;
    use super::*;
    use crate::config::{FrameKind, Overflow};
    use crate::core::Chunk;

    fn spawn_actor(frame: FrameKind) -> (mpsc::Sender<WsMsg>, Arc<Registry>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(8);
        let registry = Arc::new(Registry::new(16, Overflow::DropOldest));
        let config = BroadcastConfig {
            frame,
            ..Default::default()
        };
        let actor = WsActor::new(rx, Arc::clone(&registry), &config);
        (tx, registry, tokio::spawn(actor.run()))
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:40001".parse().unwrap()
    }

    async fn recv(queue: &ClientQueue) -> Option<Message> {
        tokio::time::timeout(Duration::from_secs(5), queue.next())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_chunks_delivered_in_order() {
        let (tx, registry, _handle) = spawn_actor(FrameKind::Binary);
        let (_, queue) = registry.register(addr());

        tx.send(WsMsg::Chunk(Chunk::new(1, b"a".to_vec()))).await.unwrap();
        tx.send(WsMsg::Chunk(Chunk::new(2, b"b".to_vec()))).await.unwrap();

        assert_eq!(recv(&queue).await, Some(Message::binary(b"a".to_vec())));
        assert_eq!(recv(&queue).await, Some(Message::binary(b"b".to_vec())));
    }

    #[tokio::test]
    async fn test_shutdown_closes_clients() {
        let (tx, registry, handle) = spawn_actor(FrameKind::Text);
        let (_, queue) = registry.register(addr());

        tx.send(WsMsg::Chunk(Chunk::new(1, b"last\n".to_vec()))).await.unwrap();
        tx.send(WsMsg::Shutdown).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(registry.is_empty());
        // Frames queued before shutdown are still drained by the writer
        assert_eq!(recv(&queue).await, Some(Message::text("last\n")));
        assert_eq!(recv(&queue).await, None);
    }
}
