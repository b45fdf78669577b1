//! Actor System for Tailing
//!
//! Message-passing concurrency between the watched file and the clients:
//!
//! ```text
//! TailActor --> WsActor --> clients
//!  (watch)     (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `tail` - File watcher with offset tracking and retry
//! - `ws` - Client registry and WebSocket fan-out
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod messages;
pub mod tail;
pub mod ws;

pub use coordinator::Coordinator;
