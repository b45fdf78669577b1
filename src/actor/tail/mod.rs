//! Tail Actor
//!
//! Turns growth of the watched file into `Chunk`s for the WsActor.
//!
//! Architecture:
//! ```text
//! GrowthSource (poll | notify) → TailReader (offset) → Chunk → WsActor
//! ```
//!
//! Failures after startup go through the retry policy: the actor reopens
//! the file with backoff and only returns the error once the budget is
//! spent, leaving the final decision to the coordinator. Any successful
//! check, with or without growth, restores the full budget.

use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::config::RetryPolicy;
use crate::core::Chunk;

// Typed watcher failures.
mod error;
// Native filesystem event backend.
mod events;
// Offset bookkeeping and reads.
mod reader;
// Growth source trait and polling backend.
mod source;


pub use error::TailError;
pub use events::NotifySource;
pub use reader::TailReader;
pub use source::{GrowthSource, PollSource};

/// Tail Actor - emits one chunk per detected growth
pub struct TailActor<S> {
    source: S,
    /// Channel to send chunks to WsActor
    ws_tx: mpsc::Sender<WsMsg>,
    retry: RetryPolicy,
    /// Sequence number of the last emitted chunk
    seq: u64,
}

impl<S: GrowthSource> TailActor<S> {
    pub fn new(source: S, ws_tx: mpsc::Sender<WsMsg>, retry: RetryPolicy) -> Self {
        Self {
            source,
            ws_tx,
            retry,
            seq: 0,
        }
    }

    /// Run the actor event loop.
    ///
    /// Returns `Ok(())` when the WsActor went away, `Err` once the retry
    /// budget is exhausted.
    pub async fn run(mut self) -> Result<(), TailError> {
        let mut failures = 0u32;

        loop {
            match self.source.next_check().await {
                Ok(None) => failures = 0,
                Ok(Some(bytes)) => {
                    failures = 0;
                    self.seq += 1;
                    let chunk = Chunk::new(self.seq, bytes);
                    crate::debug!("tail"; "chunk {}", chunk);

                    if self.ws_tx.send(WsMsg::Chunk(chunk)).await.is_err() {
                        crate::debug!("tail"; "broadcaster closed, stopping");
                        return Ok(());
                    }
                }
                Err(err) => {
                    failures += 1;
                    let Some(delay) = self.retry.delay(failures) else {
                        return Err(err);
                    };
                    crate::log!(
                        "tail";
                        "{} ({}), retry {}/{} in {}ms",
                        err,
                        source_message(&err),
                        failures,
                        self.retry.attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;

                    if let Err(e) = self.source.recover() {
                        crate::debug!("tail"; "reopen {} failed: {}", self.source.path().display(), e);
                    }
                }
            }
        }
    }
}

fn source_message(err: &TailError) -> String {
    std::error::Error::source(err)
        .map(ToString::to_string)
        .unwrap_or_default()
}
