//! Messages exchanged between actors.

use crate::core::Chunk;

/// Messages to the WsActor (broadcaster)
#[derive(Debug)]
pub enum WsMsg {
    /// Newly appended bytes, delivered to every registered client
    Chunk(Chunk),
    /// Close every client and stop
    Shutdown,
}
