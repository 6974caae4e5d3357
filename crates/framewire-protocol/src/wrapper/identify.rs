//! Identification marker stage.

use framewire_core::{ByteCursorBuffer, CodecContext, CodecError, Result};

use super::Wrapper;

/// Default magic marker.
pub const DEFAULT_MAGIC: [u8; 2] = [0xFA, 0xCE];

/// Writes a fixed magic marker and a version byte ahead of the payload at
/// encode time; verifies and consumes them at decode time. A mismatch is a
/// framing error and marks the connection suspect.
pub struct Identify {
    magic: Vec<u8>,
    version: u8,
}

impl Identify {
    /// Creates the stage with the default marker and version 1.
    pub fn new() -> Self {
        Self { magic: DEFAULT_MAGIC.to_vec(), version: 1 }
    }

    /// Creates the stage with a custom marker and version.
    pub fn with_marker(magic: Vec<u8>, version: u8) -> Self {
        Self { magic, version }
    }

    fn marker_len(&self) -> usize {
        self.magic.len() + 1
    }
}

impl Default for Identify {
    fn default() -> Self {
        Self::new()
    }
}

impl Wrapper for Identify {
    fn name(&self) -> &'static str {
        "identify"
    }

    fn before_encode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        let mut marker = Vec::with_capacity(self.marker_len());
        marker.extend_from_slice(&self.magic);
        marker.push(self.version);
        buf.prepend_head(&marker);
        Ok(())
    }

    fn before_decode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        let got = buf.read_bytes(self.marker_len()).map_err(|_| {
            CodecError::Framing(format!(
                "payload too short for {}-byte identification marker",
                self.marker_len()
            ))
        })?;
        let (marker, version) = got.split_at(self.magic.len());
        if marker != self.magic.as_slice() {
            return Err(CodecError::Framing(format!(
                "magic marker mismatch: expected {:02x?}, got {:02x?}",
                self.magic, marker
            )));
        }
        if version[0] != self.version {
            return Err(CodecError::Framing(format!(
                "version mismatch: expected {}, got {}",
                self.version, version[0]
            )));
        }
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

    #[test]
    fn test_marker_round_trip() {
        let stage = Identify::new();
        let mut buf = ByteCursorBuffer::new(Endian::Big);
        buf.write_bytes(b"payload");
        stage.before_encode(&mut buf, &mut ctx()).unwrap();

        let mut rd = ByteCursorBuffer::from_bytes(buf.into_bytes(), Endian::Big);
        stage.before_decode(&mut rd, &mut ctx()).unwrap();
        assert_eq!(rd.window(), b"payload");
    }

    #[test]
    fn test_marker_mismatch_is_framing_error() {
        let stage = Identify::new();
        let mut rd = ByteCursorBuffer::from_bytes(vec![0x00, 0x00, 0x01, 0xAA], Endian::Big);
        match stage.before_decode(&mut rd, &mut ctx()) {
            Err(CodecError::Framing(_)) => {}
            other => panic!("expected framing error, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_marker_is_framing_error() {
        let stage = Identify::new();
        let mut rd = ByteCursorBuffer::from_bytes(vec![0xFA], Endian::Big);
        assert!(matches!(
            stage.before_decode(&mut rd, &mut ctx()),
            Err(CodecError::Framing(_))
        ));
    }
}
