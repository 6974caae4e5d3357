//! Checksum append and validation stage.

use crc::{Crc, CRC_16_IBM_SDLC};

use framewire_core::{ByteCursorBuffer, CodecContext, CodecError, Endian, Result};

use super::Wrapper;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Checksum flavor carried at the end of the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumKind {
    /// CRC-32 (IEEE), 4 bytes on the wire.
    Crc32,
    /// CRC-16 (IBM-SDLC / X.25), 2 bytes on the wire.
    Crc16,
    /// Adler-32, 4 bytes on the wire.
    Adler32,
}

impl ChecksumKind {
    /// On-wire width of the checksum in bytes.
    pub fn width(self) -> usize {
        match self {
            ChecksumKind::Crc32 | ChecksumKind::Adler32 => 4,
            ChecksumKind::Crc16 => 2,
        }
    }

    /// Computes the checksum over the given bytes.
    pub fn compute(self, data: &[u8]) -> u64 {
        match self {
            ChecksumKind::Crc32 => {
                let mut hasher = crc32fast::Hasher::new();
                hasher.update(data);
                u64::from(hasher.finalize())
            }
            ChecksumKind::Crc16 => u64::from(CRC16.checksum(data)),
            ChecksumKind::Adler32 => u64::from(adler::adler32_slice(data)),
        }
    }

    fn encode(self, sum: u64, endian: Endian) -> Vec<u8> {
        match self.width() {
            2 => {
                let mut out = vec![0u8; 2];
                endian.write_u16(&mut out, sum as u16);
                out
            }
            _ => {
                let mut out = vec![0u8; 4];
                endian.write_u32(&mut out, sum as u32);
                out
            }
        }
    }

    fn decode(self, bytes: &[u8], endian: Endian) -> u64 {
        match self.width() {
            2 => u64::from(endian.read_u16(bytes)),
            _ => u64::from(endian.read_u32(bytes)),
        }
    }
}

/// Computes a checksum over the body after encoding and appends it to the
/// end of the body, so stages that run later in the encode walk (encryption,
/// compression) cover the checksum too and the chain nests cleanly in any
/// registration order. Before decoding it splits the trailing checksum off,
/// recomputes over what remains, and fails on mismatch.
pub struct Verify {
    kind: ChecksumKind,
}

impl Verify {
    /// Creates the stage for the given checksum kind.
    pub fn new(kind: ChecksumKind) -> Self {
        Self { kind }
    }
}

impl Wrapper for Verify {
    fn name(&self) -> &'static str {
        "verify"
    }

    fn after_encode(&self, buf: &mut ByteCursorBuffer, ctx: &mut CodecContext) -> Result<()> {
        let sum = self.kind.compute(buf.window());
        let encoded = self.kind.encode(sum, ctx.endian);
        buf.seek_end();
        buf.write_bytes(&encoded);
        Ok(())
    }

    fn before_decode(&self, buf: &mut ByteCursorBuffer, ctx: &mut CodecContext) -> Result<()> {
        let carried = buf.split_off_end(self.kind.width())?;
        let actual = self.kind.decode(&carried, ctx.endian);
        let expected = self.kind.compute(buf.window());
        if expected != actual {
            return Err(CodecError::Integrity { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewire_core::CodecConfig;

    fn ctx() -> CodecContext {
        CodecContext::new(&CodecConfig::default())
    }

    #[test]
    fn test_checksum_round_trip_all_kinds() {
        for kind in [ChecksumKind::Crc32, ChecksumKind::Crc16, ChecksumKind::Adler32] {
            let stage = Verify::new(kind);
            let mut buf = ByteCursorBuffer::new(Endian::Big);
            buf.write_bytes(b"checked payload");
            stage.after_encode(&mut buf, &mut ctx()).unwrap();

            let bytes = buf.into_bytes();
            assert_eq!(bytes.len(), 15 + kind.width());

            let mut rd = ByteCursorBuffer::from_bytes(bytes, Endian::Big);
            stage.before_decode(&mut rd, &mut ctx()).unwrap();
            assert_eq!(rd.window(), b"checked payload");
        }
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let stage = Verify::new(ChecksumKind::Crc32);
        let mut buf = ByteCursorBuffer::new(Endian::Big);
        buf.write_bytes(b"payload");
        stage.after_encode(&mut buf, &mut ctx()).unwrap();
        let good = buf.into_bytes();

        for bit in 0..good.len() * 8 {
            let mut tampered = good.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            let mut rd = ByteCursorBuffer::from_bytes(tampered, Endian::Big);
            match stage.before_decode(&mut rd, &mut ctx()) {
                Err(CodecError::Integrity { expected, actual }) => assert_ne!(expected, actual),
                other => panic!("bit {bit}: expected integrity failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_too_short_for_checksum_is_underflow() {
        let stage = Verify::new(ChecksumKind::Crc32);
        let mut rd = ByteCursorBuffer::from_bytes(vec![1, 2], Endian::Big);
        assert!(matches!(
            stage.before_decode(&mut rd, &mut ctx()),
            Err(CodecError::Underflow { .. })
        ));
    }
}
