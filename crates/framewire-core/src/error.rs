use thiserror::Error;

/// Errors produced by the codec and the frame layer.
///
/// The taxonomy distinguishes recoverable conditions (an `Underflow` while
/// streaming simply means "wait for more bytes") from conditions that mark
/// the transport as suspect (`Framing`, `Integrity`), which the connection
/// owner should treat as a reason to close the channel.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not enough bytes to satisfy a read.
    ///
    /// Recoverable in streaming contexts by awaiting more data; fatal in a
    /// one-shot decode.
    #[error("underflow at offset {offset}: needed {needed} bytes, {available} available")]
    Underflow {
        /// Bytes the read required.
        needed: usize,
        /// Bytes actually available at the read cursor.
        available: usize,
        /// Read cursor position when the read was attempted.
        offset: usize,
    },

    /// No registered strategy for a value's shape, or a value/shape mismatch.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Magic-marker mismatch, malformed header, or an out-of-range frame
    /// length. The connection should be considered suspect.
    #[error("framing error: {0}")]
    Framing(String),

    /// Missing or invalid key, cipher initialization failure, or a failed
    /// decryption. Never silently passed through.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// Checksum mismatch. Strongly suggests configuration mismatch or
    /// tampering; the connection should be considered suspect.
    #[error("integrity check failed: expected {expected:#010x}, got {actual:#010x}")]
    Integrity {
        /// Checksum recomputed over the received bytes.
        expected: u64,
        /// Checksum carried by the payload.
        actual: u64,
    },

    /// I/O failure from a compression or decompression backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns true for errors that indicate the transport state may be
    /// corrupt (the caller should consider closing the connection), as
    /// opposed to per-frame failures that are safe to drop and move past.
    pub fn is_connection_suspect(&self) -> bool {
        matches!(self, CodecError::Framing(_) | CodecError::Integrity { .. })
    }
}

/// Result type alias using [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_suspect_classification() {
        assert!(CodecError::Framing("bad magic".into()).is_connection_suspect());
        assert!(CodecError::Integrity { expected: 1, actual: 2 }.is_connection_suspect());
        assert!(!CodecError::Underflow { needed: 4, available: 0, offset: 0 }
            .is_connection_suspect());
        assert!(!CodecError::UnsupportedType("Foo".into()).is_connection_suspect());
        assert!(!CodecError::Cipher("no key".into()).is_connection_suspect());
    }
}
