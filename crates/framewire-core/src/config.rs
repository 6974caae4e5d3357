use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{CodecError, Result};

/// Byte order applied to every multi-byte primitive read and write.
///
/// Resolved once per encode/decode call and applied uniformly; the default
/// follows the wire convention of network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Endian {
    /// Big-endian (network byte order). The default.
    #[default]
    Big,
    /// Little-endian.
    Little,
}

macro_rules! endian_rw {
    ($read:ident, $write:ident, $ty:ty) => {
        /// Reads a value from the start of `src` in this byte order.
        #[inline]
        pub fn $read(self, src: &[u8]) -> $ty {
            match self {
                Endian::Big => BigEndian::$read(src),
                Endian::Little => LittleEndian::$read(src),
            }
        }

        /// Writes a value at the start of `dst` in this byte order.
        #[inline]
        pub fn $write(self, dst: &mut [u8], value: $ty) {
            match self {
                Endian::Big => BigEndian::$write(dst, value),
                Endian::Little => LittleEndian::$write(dst, value),
            }
        }
    };
}

impl Endian {
    endian_rw!(read_u16, write_u16, u16);
    endian_rw!(read_u32, write_u32, u32);
    endian_rw!(read_u64, write_u64, u64);
    endian_rw!(read_i16, write_i16, i16);
    endian_rw!(read_i32, write_i32, i32);
    endian_rw!(read_i64, write_i64, i64);
    endian_rw!(read_f32, write_f32, f32);
    endian_rw!(read_f64, write_f64, f64);
}

/// Policy for the total-length field written ahead of an encoded payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    /// No total-length field is written.
    None,
    /// The length field counts everything except the 4-byte field itself.
    BodyOnly,
    /// The length field counts the header and the body, itself included.
    #[default]
    HeaderAndBody,
    /// No explicit length field; transport framing delimits the payload.
    Auto,
}

/// Text encoding used for string payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8. The default.
    #[default]
    Utf8,
    /// 7-bit ASCII; encoding a string with non-ASCII characters fails.
    Ascii,
}

impl TextEncoding {
    /// Encodes a string into bytes under this encoding.
    pub fn encode_str(self, s: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(s.as_bytes().to_vec()),
            TextEncoding::Ascii => {
                if s.is_ascii() {
                    Ok(s.as_bytes().to_vec())
                } else {
                    Err(CodecError::UnsupportedType(format!(
                        "non-ASCII string {s:?} under ASCII encoding"
                    )))
                }
            }
        }
    }

    /// Decodes bytes into a string under this encoding.
    ///
    /// Malformed sequences are replaced rather than rejected, mirroring the
    /// decoder's defensive stance on malformed length fields.
    pub fn decode_str(self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Immutable, process-wide codec configuration.
///
/// Built once at codec construction and shared read-only thereafter; the
/// per-call view of these settings lives in
/// [`CodecContext`](crate::context::CodecContext).
#[derive(Clone, Debug, Default)]
pub struct CodecConfig {
    /// Byte order for all multi-byte primitives.
    pub endian: Endian,
    /// Total-length field policy.
    pub length_policy: LengthPolicy,
    /// When true, record fields carry a 4-byte self-describing length prefix
    /// so a decoder can skip fields it does not understand.
    pub auto_length: bool,
    /// When true, record-typed fields skip the auto-length prefix even when
    /// `auto_length` is enabled (legacy fixed-layout interoperability).
    pub ignore_record_auto_length: bool,
    /// Encoding for string payloads.
    pub text_encoding: TextEncoding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_byte_order() {
        let mut buf = [0u8; 2];
        Endian::Big.write_u16(&mut buf, 0x0102);
        assert_eq!(buf, [0x01, 0x02]);
        Endian::Little.write_u16(&mut buf, 0x0102);
        assert_eq!(buf, [0x02, 0x01]);

        assert_eq!(Endian::Big.read_u16(&[0x01, 0x02]), 0x0102);
        assert_eq!(Endian::Little.read_u16(&[0x01, 0x02]), 0x0201);
    }

    #[test]
    fn test_ascii_rejects_non_ascii() {
        assert!(TextEncoding::Ascii.encode_str("héllo").is_err());
        assert_eq!(TextEncoding::Ascii.encode_str("hello").unwrap(), b"hello");
    }

    #[test]
    fn test_utf8_round_trip() {
        let bytes = TextEncoding::Utf8.encode_str("héllo wörld").unwrap();
        assert_eq!(TextEncoding::Utf8.decode_str(&bytes), "héllo wörld");
    }
}
