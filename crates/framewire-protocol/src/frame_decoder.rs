//! Streaming frame decoder, tolerant of partial frames.
//!
//! A state machine with two states, fed raw bytes by the transport as they
//! arrive:
//! - `AwaitingHeader`: need at least the 12-byte header
//! - `AwaitingBody`: header parsed, need the full declared frame
//!
//! Partial data is never consumed: bytes stay buffered until a complete
//! frame is available, and "not enough bytes yet" is never an error. Unknown
//! command ids are logged and dropped; per-frame decode failures are logged
//! and dropped; framing and integrity failures propagate so the connection
//! owner can decide whether to close the channel.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, warn};

use framewire_core::constants::{DEFAULT_MAX_FRAME_LEN, FRAME_HEADER_SIZE};
use framewire_core::{CodecError, Result};

use crate::codec::ObjectCodec;
use crate::frame::FrameHeader;
use crate::value::{Shape, Value};

/// One fully decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The parsed 12-byte header.
    pub header: FrameHeader,
    /// The decoded body.
    pub value: Value,
}

/// Maps command identifiers to the target shape their bodies decode under.
///
/// Populated at construction and read-only afterwards.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<u32, Shape>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { commands: HashMap::new() }
    }

    /// Registers the body shape for a command id.
    pub fn register(mut self, command: u32, shape: Shape) -> Self {
        self.commands.insert(command, shape);
        self
    }

    /// Looks up the body shape for a command id.
    pub fn shape_for(&self, command: u32) -> Option<&Shape> {
        self.commands.get(&command)
    }
}

#[derive(Debug, Clone, Copy)]
enum DecodeState {
    AwaitingHeader,
    AwaitingBody { header: FrameHeader },
}

/// Accumulates incoming bytes and extracts complete frames.
///
/// One instance per connection, driven by the transport's event thread; all
/// buffered state is discarded on drop, so nothing survives a reconnect.
pub struct FrameDecoder {
    codec: Arc<ObjectCodec>,
    commands: CommandRegistry,
    buffer: Vec<u8>,
    state: DecodeState,
    max_frame_len: usize,
}

impl FrameDecoder {
    /// Creates a decoder over a shared codec and command registry.
    pub fn new(codec: Arc<ObjectCodec>, commands: CommandRegistry) -> Self {
        Self {
            codec,
            commands,
            buffer: Vec::with_capacity(4 * 1024),
            state: DecodeState::AwaitingHeader,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Overrides the per-frame size bound.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Bytes currently buffered awaiting a complete frame.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds newly arrived bytes and extracts every complete frame.
    ///
    /// Returns an empty vector while a frame is still incomplete. An error
    /// return means the stream itself is suspect (malformed header, failed
    /// integrity or framing check) and the caller should consider closing
    /// the connection; the decoder's buffer is cleared in that case.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        loop {
            match self.state {
                DecodeState::AwaitingHeader => {
                    if self.buffer.len() < FRAME_HEADER_SIZE {
                        break;
                    }
                    let header = FrameHeader::parse(&self.buffer, self.codec.config().endian)?;
                    let frame_len = header.frame_len(self.codec.config().length_policy);
                    if frame_len < FRAME_HEADER_SIZE || frame_len > self.max_frame_len {
                        self.buffer.clear();
                        return Err(CodecError::Framing(format!(
                            "declared frame length {frame_len} outside [{FRAME_HEADER_SIZE}, {}]",
                            self.max_frame_len
                        )));
                    }
                    self.state = DecodeState::AwaitingBody { header };
                }
                DecodeState::AwaitingBody { header } => {
                    let frame_len = header.frame_len(self.codec.config().length_policy);
                    if self.buffer.len() < frame_len {
                        // Leave everything buffered until the rest arrives.
                        break;
                    }
                    let frame: Vec<u8> = self.buffer.drain(..frame_len).collect();
                    self.state = DecodeState::AwaitingHeader;

                    if let Some(decoded) = self.decode_body(header, &frame[FRAME_HEADER_SIZE..])? {
                        frames.push(decoded);
                    }
                }
            }
        }
        Ok(frames)
    }

    /// Decodes one delimited body. `Ok(None)` means the frame was dropped
    /// (unknown command or a per-frame decode failure).
    fn decode_body(&mut self, header: FrameHeader, body: &[u8]) -> Result<Option<Frame>> {
        let Some(shape) = self.commands.shape_for(header.command) else {
            warn!(
                command = header.command,
                sequence = header.sequence,
                "dropping frame with unknown command id"
            );
            return Ok(None);
        };
        match self.codec.decode(body, shape) {
            Ok(value) => Ok(Some(Frame { header, value })),
            Err(e) if e.is_connection_suspect() => {
                error!(
                    command = header.command,
                    sequence = header.sequence,
                    error = %e,
                    "frame failed framing/integrity check; connection suspect"
                );
                self.buffer.clear();
                Err(e)
            }
            Err(e) => {
                error!(
                    command = header.command,
                    sequence = header.sequence,
                    error = %e,
                    "dropping undecodable frame"
                );
                Ok(None)
            }
        }
    }
}
