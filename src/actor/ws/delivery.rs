//! Chunk to WebSocket frame conversion.

use tungstenite::protocol::Message;

use crate::config::FrameKind;
use crate::core::Chunk;

/// Turns chunks into outbound frames, once per chunk for all clients.
pub struct FrameEncoder {
    kind: FrameKind,
    /// Incomplete UTF-8 sequence held back from the previous chunk
    carry: Vec<u8>,
}

impl FrameEncoder {
    pub fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            carry: Vec::new(),
        }
    }

    /// Encode a chunk. `None` when the chunk only extended a held-back
    /// multi-byte character and there is nothing to send yet.
    pub fn encode(&mut self, chunk: &Chunk) -> Option<Message> {
        match self.kind {
            FrameKind::Binary => Some(Message::binary(chunk.data().clone())),
            FrameKind::Text => self.encode_text(chunk.data()),
        }
    }

    fn encode_text(&mut self, data: &[u8]) -> Option<Message> {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(data);

        let keep = bytes.len() - incomplete_suffix_len(&bytes);
        self.carry = bytes.split_off(keep);

        if bytes.is_empty() {
            return None;
        }
        Some(Message::text(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Bytes currently held back.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }
}

/// Length of a trailing UTF-8 sequence that was started but not finished.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(seq: u64, data: &[u8]) -> Chunk {
        Chunk::new(seq, data.to_vec())
    }

    #[test]
    fn test_binary_frames_are_verbatim() {
        let mut encoder = FrameEncoder::new(FrameKind::Binary);
        let frame = encoder.encode(&chunk(1, &[0xFF, 0x00, 0xE2])).unwrap();
        assert_eq!(frame, Message::binary(vec![0xFF, 0x00, 0xE2]));
    }

    #[test]
    fn test_text_frame_plain_ascii() {
        let mut encoder = FrameEncoder::new(FrameKind::Text);
        let frame = encoder.encode(&chunk(1, b"hello\n")).unwrap();
        assert_eq!(frame, Message::text("hello\n"));
        assert_eq!(encoder.pending(), 0);
    }

    #[test]
    fn test_split_character_is_carried() {
        // "€" is E2 82 AC
        let mut encoder = FrameEncoder::new(FrameKind::Text);

        let first = encoder.encode(&chunk(1, b"price: \xE2\x82")).unwrap();
        assert_eq!(first, Message::text("price: "));
        assert_eq!(encoder.pending(), 2);

        let second = encoder.encode(&chunk(2, b"\xAC5\n")).unwrap();
        assert_eq!(second, Message::text("€5\n"));
        assert_eq!(encoder.pending(), 0);
    }

    #[test]
    fn test_chunk_of_only_partial_character() {
        let mut encoder = FrameEncoder::new(FrameKind::Text);
        assert_eq!(encoder.encode(&chunk(1, b"\xF0\x9F")), None);
        assert_eq!(encoder.encode(&chunk(2, b"\x98")), None);

        let frame = encoder.encode(&chunk(3, b"\x80!")).unwrap();
        assert_eq!(frame, Message::text("😀!"));
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let mut encoder = FrameEncoder::new(FrameKind::Text);
        let frame = encoder.encode(&chunk(1, b"a\xFFb")).unwrap();
        assert_eq!(frame, Message::text("a\u{FFFD}b"));
    }

    #[test]
    fn test_incomplete_suffix_len() {
        assert_eq!(incomplete_suffix_len(b""), 0);
        assert_eq!(incomplete_suffix_len(b"abc"), 0);
        assert_eq!(incomplete_suffix_len("é".as_bytes()), 0);
        assert_eq!(incomplete_suffix_len(b"a\xC3"), 1);
        assert_eq!(incomplete_suffix_len(b"a\xE2\x82"), 2);
        assert_eq!(incomplete_suffix_len(b"\xF0\x9F\x98"), 3);
        // Stray continuation bytes are left for lossy decoding
        assert_eq!(incomplete_suffix_len(b"\x80\x80\x80\x80"), 0);
    }
}
