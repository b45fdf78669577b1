//! Chunk type: one block of newly appended file content.

use std::fmt;

use bytes::Bytes;

/// Bytes appended to the tailed file since the previous chunk.
///
/// Invariants:
/// - Never empty (zero-length growth emits nothing)
/// - `seq` strictly increases in emission order
///
/// The payload is opaque: it is not aligned to line boundaries and may end
/// inside a multi-byte character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    seq: u64,
    data: Bytes,
}

impl Chunk {
    pub fn new(seq: u64, data: impl Into<Bytes>) -> Self {
        Self {
            seq,
            data: data.into(),
        }
    }

    /// Position in emission order (logging only, never sent to clients).
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[inline]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({} bytes)", self.seq(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_accessors() {
        let chunk = Chunk::new(3, b"hello\n".to_vec());
        assert_eq!(chunk.seq(), 3);
        assert_eq!(chunk.len(), 6);
        assert_eq!(&chunk.data()[..], b"hello\n");
        assert_eq!(chunk.to_string(), "#3 (6 bytes)");
    }
}
