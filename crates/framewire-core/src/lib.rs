#![warn(missing_docs)]

//! framewire-core: foundational types for the framewire codec.
//!
//! This crate provides the minimal set of building blocks shared across the
//! workspace:
//! - Codec configuration (endianness, length policy, text encoding)
//! - Error taxonomy
//! - The cursor buffer that every encode/decode call writes into
//! - The per-call context carrying resolved settings and the finalization
//!   queue
//!
//! Protocol logic lives in `framewire-protocol`: the value/shape model, the
//! type-strategy registry, the wrapper chain, and the streaming frame
//! decoder.

/// Protocol constants shared across layers.
pub mod constants {
    /// Size of the fixed frame header: 4-byte total length, 4-byte command
    /// identifier, 4-byte sequence identifier.
    pub const FRAME_HEADER_SIZE: usize = 12;
    /// Size of a length-prefix field.
    pub const LENGTH_FIELD_SIZE: usize = 4;
    /// Auto-length sentinel meaning "this section extends to the end of the
    /// available bytes".
    pub const UNKNOWN_LENGTH: i32 = -1;
    /// Default upper bound on a single frame, guarding the stream decoder
    /// against absurd declared lengths.
    pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;
}

/// Read/write cursor buffer with a prependable head section.
pub mod buffer;
/// Immutable codec configuration.
pub mod config;
/// Per-call codec context and the finalization queue.
pub mod context;
/// Error types and results.
pub mod error;

pub use buffer::ByteCursorBuffer;
pub use config::{CodecConfig, Endian, LengthPolicy, TextEncoding};
pub use context::{CodecContext, Finalizer};
pub use error::{CodecError, Result};
