//! Bounded per-client outbound queue.
//!
//! The broadcaster pushes without ever blocking; the client's writer task
//! awaits frames. When full, the configured overflow policy decides which
//! frame is lost.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam::queue::ArrayQueue;
use tokio::sync::Notify;
use tungstenite::protocol::Message;

use crate::config::Overflow;

/// Outcome of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Queued,
    /// Queued after evicting the oldest frame
    Evicted,
    /// Queue full, the new frame was discarded
    Rejected,
    /// Writer is gone
    Closed,
}

pub struct ClientQueue {
    frames: ArrayQueue<Message>,
    overflow: Overflow,
    notify: Notify,
    closed: AtomicBool,
    dropped: AtomicU64,
}

impl ClientQueue {
    /// `capacity` must be non-zero (enforced by config validation).
    pub fn new(capacity: usize, overflow: Overflow) -> Self {
        Self {
            frames: ArrayQueue::new(capacity),
            overflow,
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn push(&self, frame: Message) -> Push {
        if self.is_closed() {
            return Push::Closed;
        }

        let outcome = match self.overflow {
            Overflow::DropOldest => match self.frames.force_push(frame) {
                None => Push::Queued,
                Some(_) => Push::Evicted,
            },
            Overflow::DropNewest => match self.frames.push(frame) {
                Ok(()) => Push::Queued,
                Err(_) => Push::Rejected,
            },
        };

        if outcome != Push::Queued {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        if outcome != Push::Rejected {
            self.notify.notify_one();
        }
        outcome
    }

    /// Wait for the next frame. Queued frames are still handed out after
    /// `close`; `None` once closed and drained.
    pub async fn next(&self) -> Option<Message> {
        loop {
            if let Some(frame) = self.frames.pop() {
                return Some(frame);
            }
            if self.is_closed() {
                return None;
            }
            // A permit is stored if push/close happened since the pop above
            self.notify.notified().await;
        }
    }

    /// Stop accepting frames and wake the writer. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Frames lost to the overflow policy so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn text(s: &str) -> Message {
        Message::text(s.to_string())
    }

    #[test]
    fn test_drop_oldest_keeps_latest() {
        let queue = ClientQueue::new(2, Overflow::DropOldest);
        assert_eq!(queue.push(text("a")), Push::Queued);
        assert_eq!(queue.push(text("b")), Push::Queued);
        assert_eq!(queue.push(text("c")), Push::Evicted);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.frames.pop(), Some(text("b")));
        assert_eq!(queue.frames.pop(), Some(text("c")));
    }

    #[test]
    fn test_drop_newest_keeps_earliest() {
        let queue = ClientQueue::new(2, Overflow::DropNewest);
        queue.push(text("a"));
        queue.push(text("b"));
        assert_eq!(queue.push(text("c")), Push::Rejected);

        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.frames.pop(), Some(text("a")));
        assert_eq!(queue.frames.pop(), Some(text("b")));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_closed_queue_rejects() {
        let queue = ClientQueue::new(2, Overflow::DropOldest);
        queue.close();
        queue.close();
        assert_eq!(queue.push(text("a")), Push::Closed);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_next_preserves_order_then_drains_after_close() {
        let queue = ClientQueue::new(8, Overflow::DropOldest);
        queue.push(text("1"));
        queue.push(text("2"));
        queue.close();

        assert_eq!(queue.next().await, Some(text("1")));
        assert_eq!(queue.next().await, Some(text("2")));
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_next_wakes_on_push() {
        let queue = Arc::new(ClientQueue::new(8, Overflow::DropOldest));
        let waiter = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.next().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(text("late"));

        let frame = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame, Some(text("late")));
    }

    #[tokio::test]
    async fn test_next_wakes_on_close() {
        let queue = Arc::new(ClientQueue::new(8, Overflow::DropOldest));
        let waiter = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.next().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let frame = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame, None);
    }
}
