//! `[broadcast]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [broadcast]
//! frame = "text"              # text | binary
//! channel_capacity = 32       # watcher -> broadcaster buffer
//! client_queue = 256          # per-client outbound frames
//! overflow = "drop-oldest"    # drop-oldest | drop-newest
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// WebSocket frame type used for each chunk.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// UTF-8 text frames; split multi-byte sequences are carried over.
    #[default]
    Text,
    /// Raw bytes, unchanged.
    Binary,
}

/// What to drop when a client's outbound queue is full.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    DropOldest,
    DropNewest,
}

/// Fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub frame: FrameKind,

    /// Buffered chunks between watcher and broadcaster.
    pub channel_capacity: usize,

    /// Buffered frames per client before the overflow policy applies.
    pub client_queue: usize,

    pub overflow: Overflow,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            frame: FrameKind::Text,
            channel_capacity: 32,
            client_queue: 256,
            overflow: Overflow::DropOldest,
        }
    }
}

impl BroadcastConfig {
    const CHANNEL_CAPACITY: FieldPath = FieldPath::new("broadcast.channel_capacity");
    const CLIENT_QUEUE: FieldPath = FieldPath::new("broadcast.client_queue");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.channel_capacity == 0 {
            diag.error(Self::CHANNEL_CAPACITY, "capacity must be greater than 0");
        }
        if self.client_queue == 0 {
            diag.error(Self::CLIENT_QUEUE, "queue size must be greater than 0");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_broadcast_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.broadcast.frame, FrameKind::Text);
        assert_eq!(config.broadcast.channel_capacity, 32);
        assert_eq!(config.broadcast.client_queue, 256);
        assert_eq!(config.broadcast.overflow, Overflow::DropOldest);
    }

    #[test]
    fn test_broadcast_custom() {
        let config = test_parse_config(
            "[broadcast]\nframe = \"binary\"\nclient_queue = 4\noverflow = \"drop-newest\"",
        );
        assert_eq!(config.broadcast.frame, FrameKind::Binary);
        assert_eq!(config.broadcast.client_queue, 4);
        assert_eq!(config.broadcast.overflow, Overflow::DropNewest);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = test_parse_config("[broadcast]\nchannel_capacity = 0\nclient_queue = 0");
        let mut diag = ConfigDiagnostics::new();
        config.broadcast.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
