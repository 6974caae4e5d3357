//! Streams framed messages through the decoder in deliberately ragged
//! chunks, the way a TCP transport would deliver them.
//!
//! Run:
//! - cargo run -p framewire --example stream

use std::sync::Arc;

use framewire::prelude::*;

const CMD_CHAT: u32 = 0x20;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shape = Shape::Record(
        RecordShape::builder("chat")
            .field("from", Shape::Str)
            .field("text", Shape::Str)
            .build(),
    );

    let codec = Arc::new(
        ObjectCodec::builder()
            .wrapper(Arc::new(Verify::new(ChecksumKind::Crc32)))
            .build(),
    );
    let encoder = FrameEncoder::new(codec.clone());
    let commands = CommandRegistry::new().register(CMD_CHAT, shape.clone());
    let mut decoder = FrameDecoder::new(codec, commands);

    // Three messages concatenated into one byte stream.
    let mut stream = Vec::new();
    for (seq, text) in ["hello", "how are you", "bye"].iter().enumerate() {
        let value = Value::Record(vec![
            Value::Str("alice".into()),
            Value::Str((*text).into()),
        ]);
        stream.extend(encoder.encode(CMD_CHAT, seq as u32, &value, &shape)?);
    }

    // Feed it 7 bytes at a time; frames pop out whenever one completes.
    for chunk in stream.chunks(7) {
        for frame in decoder.push(chunk)? {
            println!(
                "seq={} value={:?} (buffered {} bytes)",
                frame.header.sequence,
                frame.value,
                decoder.pending_len()
            );
        }
    }
    Ok(())
}
