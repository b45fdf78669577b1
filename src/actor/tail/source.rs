//! Growth detection backends.
//!
//! Both backends share `TailReader` for the byte bookkeeping and differ only
//! in what wakes them up.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

use super::error::TailError;
use super::reader::TailReader;

/// Something that checks a file for appended bytes.
pub trait GrowthSource: Send + 'static {
    /// Wait for the next check and run it.
    ///
    /// `Ok(None)` is a successful check that found no growth; `Some` bytes
    /// are never empty.
    fn next_check(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, TailError>> + Send;

    /// Reopen the file after `next_check` failed.
    fn recover(&mut self) -> Result<(), TailError>;

    fn path(&self) -> &Path;
}

/// Checks the file on a fixed interval.
pub struct PollSource {
    reader: TailReader,
    ticker: Interval,
}

impl PollSource {
    pub fn new(reader: TailReader, interval: Duration) -> Self {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { reader, ticker }
    }
}

impl GrowthSource for PollSource {
    async fn next_check(&mut self) -> Result<Option<Vec<u8>>, TailError> {
        self.ticker.tick().await;
        self.reader.read_growth()
    }

    fn recover(&mut self) -> Result<(), TailError> {
        self.reader.reopen()
    }

    fn path(&self) -> &Path {
        self.reader.path()
    }
}
