#![warn(missing_docs)]

//! Framewire: a small public API facade for the workspace.
//!
//! This crate provides a clean, stable surface that re-exports
//! the most commonly used types to encode, frame, and stream
//! binary objects:
//!
//! - Codec and shapes (`ObjectCodec`, `Shape`, `Value`, `RecordShape`)
//! - Transform stages (`Identify`, `TotalLength`, `Zip`, `Cipher`, `Verify`)
//! - Framed streaming (`FrameEncoder`, `FrameDecoder`, `CommandRegistry`)
//! - Core configuration (`CodecConfig`, `Endian`, `LengthPolicy`)
//!
//! Example
//! ```ignore
//! use std::sync::Arc;
//! use framewire::prelude::*;
//!
//! let shape = Shape::Record(
//!     RecordShape::builder("greeting")
//!         .field("id", Shape::U32)
//!         .field("text", Shape::Str)
//!         .build(),
//! );
//!
//! let codec = Arc::new(
//!     ObjectCodec::builder()
//!         .wrapper(Arc::new(Verify::new(ChecksumKind::Crc32)))
//!         .build(),
//! );
//!
//! // Frame a value, then feed the bytes back through a streaming decoder.
//! let encoder = FrameEncoder::new(codec.clone());
//! let wire = encoder
//!     .encode(1, 0, &Value::Record(vec![Value::U32(7), Value::Str("hi".into())]), &shape)
//!     .unwrap();
//!
//! let commands = CommandRegistry::new().register(1, shape);
//! let mut decoder = FrameDecoder::new(codec, commands);
//! let frames = decoder.push(&wire).unwrap();
//! assert_eq!(frames.len(), 1);
//! ```

// Core configuration and errors
pub use framewire_core::{
    CodecConfig, CodecError, Endian, LengthPolicy, Result, TextEncoding,
};
// Codec: values, shapes, and the encode/decode entry points
pub use framewire_protocol::{
    CodecRegistry, FieldLayout, FieldShape, ObjectCodec, ObjectCodecBuilder, RecordShape, Shape,
    TypeStrategy, Value,
};
// Transform chain stages
pub use framewire_protocol::{
    ChecksumKind, Cipher, CipherAlgorithm, CompressionAlgorithm, Identify, TotalLength,
    TransformChain, Verify, Wrapper, Zip,
};
// Framed streaming
pub use framewire_protocol::{CommandRegistry, Frame, FrameDecoder, FrameEncoder, FrameHeader};

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        ChecksumKind, Cipher, CipherAlgorithm, CodecConfig, CommandRegistry,
        CompressionAlgorithm, Endian, Frame, FrameDecoder, FrameEncoder, Identify, LengthPolicy,
        ObjectCodec, RecordShape, Shape, TotalLength, Value, Verify, Zip,
    };
}
