//! Compression stage.
//!
//! The compressed body carries a 1-byte algorithm marker so the decode side
//! never depends on configuration to pick the right backend:
//! `[0][raw]` stored, `[1][zlib]`, `[2][u32 original size][lz4]`.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use framewire_core::{ByteCursorBuffer, CodecContext, CodecError, Result};

use super::Wrapper;

/// Marker for a stored (uncompressed) body.
const MARKER_STORED: u8 = 0;
/// Marker for a zlib-compressed body.
const MARKER_ZLIB: u8 = 1;
/// Marker for an LZ4 block-compressed body.
const MARKER_LZ4: u8 = 2;

/// Compression backend used for the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    /// Pass bodies through uncompressed (still marker-framed).
    None,
    /// Zlib (balanced speed/ratio).
    Zlib,
    /// LZ4 block mode (fast, lower ratio).
    Lz4,
}

/// Replaces the already-written body with its compressed form after
/// encoding, and restores it before decoding.
///
/// Bodies below the threshold, or whose compressed form is not actually
/// smaller, are stored as-is under the stored marker.
pub struct Zip {
    algorithm: CompressionAlgorithm,
    threshold: usize,
}

impl Zip {
    /// Creates the stage with a 128-byte compression threshold.
    pub fn new(algorithm: CompressionAlgorithm) -> Self {
        Self { algorithm, threshold: 128 }
    }

    /// Creates the stage with a custom minimum body size for compression.
    pub fn with_threshold(algorithm: CompressionAlgorithm, threshold: usize) -> Self {
        Self { algorithm, threshold }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() + 1);

        // Don't bother compressing small bodies.
        if data.len() < self.threshold || self.algorithm == CompressionAlgorithm::None {
            output.push(MARKER_STORED);
            output.extend_from_slice(data);
            return Ok(output);
        }

        match self.algorithm {
            CompressionAlgorithm::None => unreachable!("handled above"),
            CompressionAlgorithm::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                let compressed = encoder.finish()?;
                if compressed.len() < data.len() {
                    output.push(MARKER_ZLIB);
                    output.extend_from_slice(&compressed);
                } else {
                    output.push(MARKER_STORED);
                    output.extend_from_slice(data);
                }
            }
            CompressionAlgorithm::Lz4 => {
                let compressed = lz4::block::compress(data, None, false)?;
                // The 4-byte original size rides along for decompression.
                if compressed.len() + 4 < data.len() {
                    output.push(MARKER_LZ4);
                    output.extend_from_slice(&(data.len() as u32).to_be_bytes());
                    output.extend_from_slice(&compressed);
                } else {
                    output.push(MARKER_STORED);
                    output.extend_from_slice(data);
                }
            }
        }
        Ok(output)
    }

    fn decompress(data: &[u8]) -> Result<Vec<u8>> {
        let Some((&marker, payload)) = data.split_first() else {
            return Err(CodecError::Framing("empty body for decompression".into()));
        };
        match marker {
            MARKER_STORED => Ok(payload.to_vec()),
            MARKER_ZLIB => {
                let mut decoder = ZlibDecoder::new(payload);
                let mut decompressed = Vec::new();
                decoder.read_to_end(&mut decompressed)?;
                Ok(decompressed)
            }
            MARKER_LZ4 => {
                if payload.len() < 4 {
                    return Err(CodecError::Framing("LZ4 body too short".into()));
                }
                let original_size =
                    u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
                let decompressed =
                    lz4::block::decompress(&payload[4..], Some(original_size as i32))?;
                Ok(decompressed)
            }
            other => Err(CodecError::Framing(format!(
                "unknown compression marker: {other}"
            ))),
        }
    }
}

impl Wrapper for Zip {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn after_encode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        let raw = buf.take_window();
        let packed = self.compress(&raw)?;
        buf.replace_window(packed);
        Ok(())
    }

    fn before_decode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        let packed = buf.take_window();
        buf.replace_window(Self::decompress(&packed)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewire_core::{CodecConfig, Endian};

    fn ctx() -> CodecContext {
        CodecContext::new(&CodecConfig::default())
    }

    fn round_trip(stage: &Zip, body: &[u8]) -> Vec<u8> {
        let mut buf = ByteCursorBuffer::new(Endian::Big);
        buf.write_bytes(body);
        stage.after_encode(&mut buf, &mut ctx()).unwrap();

        let mut rd = ByteCursorBuffer::from_bytes(buf.into_bytes(), Endian::Big);
        stage.before_decode(&mut rd, &mut ctx()).unwrap();
        rd.take_window()
    }

    #[test]
    fn test_small_body_is_stored() {
        let stage = Zip::new(CompressionAlgorithm::Zlib);
        let body = b"tiny";
        let mut buf = ByteCursorBuffer::new(Endian::Big);
        buf.write_bytes(body);
        stage.after_encode(&mut buf, &mut ctx()).unwrap();
        let bytes = buf.into_bytes();
        assert_eq!(bytes[0], MARKER_STORED);
        assert_eq!(&bytes[1..], body);
    }

    #[test]
    fn test_zlib_round_trip() {
        let stage = Zip::with_threshold(CompressionAlgorithm::Zlib, 16);
        let body: Vec<u8> = b"repetition repetition repetition repetition".repeat(8);
        assert_eq!(round_trip(&stage, &body), body);
    }

    #[test]
    fn test_lz4_round_trip() {
        let stage = Zip::with_threshold(CompressionAlgorithm::Lz4, 16);
        let body: Vec<u8> = b"wire wire wire wire wire wire wire wire ".repeat(8);
        assert_eq!(round_trip(&stage, &body), body);
    }

    #[test]
    fn test_zlib_marker_present_for_compressible_body() {
        let stage = Zip::with_threshold(CompressionAlgorithm::Zlib, 16);
        let body = vec![0u8; 512];
        let mut buf = ByteCursorBuffer::new(Endian::Big);
        buf.write_bytes(&body);
        stage.after_encode(&mut buf, &mut ctx()).unwrap();
        let bytes = buf.into_bytes();
        assert_eq!(bytes[0], MARKER_ZLIB);
        assert!(bytes.len() < body.len());
    }

    #[test]
    fn test_unknown_marker_is_framing_error() {
        let mut rd = ByteCursorBuffer::from_bytes(vec![9, 1, 2, 3], Endian::Big);
        let stage = Zip::new(CompressionAlgorithm::Zlib);
        assert!(matches!(
            stage.before_decode(&mut rd, &mut ctx()),
            Err(CodecError::Framing(_))
        ));
    }
}
