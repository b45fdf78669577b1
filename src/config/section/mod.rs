//! Configuration section definitions.
//!
//! Each module corresponds to a section in `tailcast.toml`:
//!
//! | Module      | TOML Section    | Purpose                              |
//! |-------------|-----------------|--------------------------------------|
//! | `watch`     | `[watch]`       | Tailed file, backend, error policy   |
//! | `serve`     | `[serve]`       | WebSocket listener                   |
//! | `broadcast` | `[broadcast]`   | Framing and per-client queues        |

mod broadcast;
mod serve;
mod watch;

pub use broadcast::{BroadcastConfig, FrameKind, Overflow};
pub use serve::ServeConfig;
pub use watch::{OnError, RetryPolicy, WatchBackend, WatchConfig};
