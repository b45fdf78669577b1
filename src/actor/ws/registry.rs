//! Connection registry: the live set of clients eligible for broadcast.
//!
//! One mutex guards the whole set; every add, remove and broadcast pass is a
//! single critical section. A handle is closed (its queue shut) by whoever
//! removes it, and `remove` reports whether this call did the removal, so
//! racing reader/writer/broadcaster paths close a client exactly once.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tungstenite::protocol::Message;

use super::queue::{ClientQueue, Push};
use crate::config::Overflow;

/// Unique id of a connected client (identity, never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered client: its peer address and outbound queue.
pub struct ClientHandle {
    id: ClientId,
    addr: SocketAddr,
    queue: Arc<ClientQueue>,
}

/// Result of one broadcast pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Clients the frame was queued for
    pub queued: usize,
    /// Clients that lost a frame to the overflow policy
    pub overflowed: usize,
    /// Dead clients removed during this pass
    pub pruned: usize,
}

pub struct Registry {
    clients: Mutex<FxHashMap<ClientId, ClientHandle>>,
    next_id: AtomicU64,
    queue_capacity: usize,
    overflow: Overflow,
}

impl Registry {
    pub fn new(queue_capacity: usize, overflow: Overflow) -> Self {
        Self {
            clients: Mutex::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
            queue_capacity,
            overflow,
        }
    }

    /// Create a handle for a newly upgraded connection and add it.
    pub fn register(&self, addr: SocketAddr) -> (ClientId, Arc<ClientQueue>) {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let queue = Arc::new(ClientQueue::new(self.queue_capacity, self.overflow));
        self.add(ClientHandle {
            id,
            addr,
            queue: Arc::clone(&queue),
        });
        (id, queue)
    }

    /// Add a handle. Returns `false` (and leaves the set unchanged) if a
    /// handle with the same id is already present.
    pub fn add(&self, handle: ClientHandle) -> bool {
        let mut clients = self.clients.lock();
        if clients.contains_key(&handle.id) {
            return false;
        }
        clients.insert(handle.id, handle);
        true
    }

    /// Remove and close a handle. Idempotent: only the call that actually
    /// removed it returns `true`.
    pub fn remove(&self, id: ClientId) -> bool {
        match self.clients.lock().remove(&id) {
            Some(handle) => {
                handle.queue.close();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }

    /// Queue `frame` for every registered client.
    ///
    /// Clients whose writer already failed are removed in the same pass.
    pub fn broadcast(&self, frame: &Message) -> Delivery {
        let mut delivery = Delivery::default();
        let mut clients = self.clients.lock();

        clients.retain(|id, client| match client.queue.push(frame.clone()) {
            Push::Queued => {
                delivery.queued += 1;
                true
            }
            outcome @ (Push::Evicted | Push::Rejected) => {
                crate::debug!("ws"; "client {} is slow ({} frames dropped)", id, client.queue.dropped());
                delivery.overflowed += 1;
                if outcome == Push::Evicted {
                    delivery.queued += 1;
                }
                true
            }
            Push::Closed => {
                crate::debug!("ws"; "pruning client {} ({})", id, client.addr);
                delivery.pruned += 1;
                false
            }
        });

        delivery
    }

    /// Close and remove every client. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let mut clients = self.clients.lock();
        let count = clients.len();
        for (_, client) in clients.drain() {
            client.queue.close();
        }
        count
    }
}
