#![warn(missing_docs)]

//! framewire-protocol: the codec engine.
//!
//! Encodes arbitrary object graphs into a compact, length-prefixed byte
//! protocol and back, with a pluggable transform pipeline (compression,
//! encryption, checksums, framing markers) and a partial-frame-tolerant
//! stream decoder in front.

/// Object codec: strategy registry and the encode/decode entry points.
pub mod codec;
/// Frame header and frame writer.
pub mod frame;
/// Streaming frame decoder.
pub mod frame_decoder;
/// Dynamic values and the shapes that describe them.
pub mod value;
/// Transform chain and the standard stages.
pub mod wrapper;

pub use codec::{ObjectCodec, ObjectCodecBuilder};
pub use codec::registry::{CodecRegistry, TypeStrategy};
pub use frame::{FrameEncoder, FrameHeader};
pub use frame_decoder::{CommandRegistry, Frame, FrameDecoder};
pub use value::{FieldLayout, FieldShape, RecordShape, Shape, Value};
pub use wrapper::{
    ChecksumKind, Cipher, CipherAlgorithm, CompressionAlgorithm, Identify, TotalLength,
    TransformChain, Verify, Wrapper, Zip,
};
