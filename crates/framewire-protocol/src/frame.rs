//! Frame header and the writer side of the framed wire format.
//!
//! Every frame starts with a fixed 12-byte prefix:
//! `[4B total length][4B command id][4B sequence id]`, all integers in the
//! configured byte order.

use std::sync::Arc;

use framewire_core::constants::{FRAME_HEADER_SIZE, LENGTH_FIELD_SIZE};
use framewire_core::{CodecError, Endian, LengthPolicy, Result};

use crate::codec::ObjectCodec;
use crate::value::{Shape, Value};

/// The fixed 12-byte frame prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Declared length; what it counts depends on the length policy.
    pub total_length: u32,
    /// Command identifier selecting the body's reader.
    pub command: u32,
    /// Sequence identifier correlating requests and responses.
    pub sequence: u32,
}

impl FrameHeader {
    /// Parses a header from the first [`FRAME_HEADER_SIZE`] bytes.
    pub fn parse(bytes: &[u8], endian: Endian) -> Result<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(CodecError::Underflow {
                needed: FRAME_HEADER_SIZE,
                available: bytes.len(),
                offset: 0,
            });
        }
        Ok(Self {
            total_length: endian.read_u32(&bytes[0..4]),
            command: endian.read_u32(&bytes[4..8]),
            sequence: endian.read_u32(&bytes[8..12]),
        })
    }

    /// Appends the header to `out` in the given byte order.
    pub fn write_to(&self, out: &mut Vec<u8>, endian: Endian) {
        let mut tmp = [0u8; FRAME_HEADER_SIZE];
        endian.write_u32(&mut tmp[0..4], self.total_length);
        endian.write_u32(&mut tmp[4..8], self.command);
        endian.write_u32(&mut tmp[8..12], self.sequence);
        out.extend_from_slice(&tmp);
    }

    /// Resolves the full on-wire frame size for the given counting policy.
    ///
    /// `BodyOnly` excludes the length field itself from the declared count;
    /// `None` and `Auto` carry no meaningful in-band length and fall back to
    /// counting header and body, which is what the frame layer always writes.
    pub fn frame_len(&self, policy: LengthPolicy) -> usize {
        match policy {
            LengthPolicy::BodyOnly => self.total_length as usize + LENGTH_FIELD_SIZE,
            _ => self.total_length as usize,
        }
    }
}

/// Writer side of the framed protocol: serializes a value through the codec
/// and prepends the 12-byte header with the policy-correct total length.
pub struct FrameEncoder {
    codec: Arc<ObjectCodec>,
}

impl FrameEncoder {
    /// Creates a frame encoder over a shared codec.
    pub fn new(codec: Arc<ObjectCodec>) -> Self {
        Self { codec }
    }

    /// Encodes one frame.
    pub fn encode(
        &self,
        command: u32,
        sequence: u32,
        value: &Value,
        shape: &Shape,
    ) -> Result<Vec<u8>> {
        let body = self.codec.encode(value, shape)?;
        let frame_len = FRAME_HEADER_SIZE + body.len();
        let total_length = match self.codec.config().length_policy {
            LengthPolicy::BodyOnly => (frame_len - LENGTH_FIELD_SIZE) as u32,
            _ => frame_len as u32,
        };
        let header = FrameHeader { total_length, command, sequence };
        let mut out = Vec::with_capacity(frame_len);
        header.write_to(&mut out, self.codec.config().endian);
        out.extend_from_slice(&body);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = FrameHeader { total_length: 64, command: 0x10, sequence: 9 };
        for endian in [Endian::Big, Endian::Little] {
            let mut out = Vec::new();
            header.write_to(&mut out, endian);
            assert_eq!(out.len(), FRAME_HEADER_SIZE);
            assert_eq!(FrameHeader::parse(&out, endian).unwrap(), header);
        }
    }

    #[test]
    fn test_frame_len_per_policy() {
        let header = FrameHeader { total_length: 100, command: 1, sequence: 1 };
        assert_eq!(header.frame_len(LengthPolicy::HeaderAndBody), 100);
        assert_eq!(header.frame_len(LengthPolicy::BodyOnly), 104);
        assert_eq!(header.frame_len(LengthPolicy::Auto), 100);
    }

    #[test]
    fn test_short_header_is_underflow() {
        assert!(matches!(
            FrameHeader::parse(&[0u8; 5], Endian::Big),
            Err(CodecError::Underflow { .. })
        ));
    }
}
