//! Encodes a value through a full transform stack and decodes it back.
//!
//! Run:
//! - cargo run -p framewire --example roundtrip

use std::sync::Arc;

use framewire::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shape = Shape::Record(
        RecordShape::builder("reading")
            .field("sensor", Shape::U32)
            .field("label", Shape::Str)
            .field("samples", Shape::Array(Box::new(Shape::F64)))
            .build(),
    );

    // Prefix stages first; the body stages (zip, cipher, verify) nest in
    // whatever order they are registered.
    let key = [0x42u8; 32];
    let codec = ObjectCodec::builder()
        .wrapper(Arc::new(TotalLength::new(LengthPolicy::HeaderAndBody)))
        .wrapper(Arc::new(Identify::new()))
        .wrapper(Arc::new(Zip::new(CompressionAlgorithm::Zlib)))
        .wrapper(Arc::new(Cipher::new(CipherAlgorithm::ChaCha20Poly1305, &key)?))
        .wrapper(Arc::new(Verify::new(ChecksumKind::Crc32)))
        .build();

    let value = Value::Record(vec![
        Value::U32(7),
        Value::Str("rack-3 intake temperature".into()),
        Value::Array((0..16).map(|i| Value::F64(20.0 + i as f64 * 0.25)).collect()),
    ]);

    let wire = codec.encode(&value, &shape)?;
    println!("encoded {} bytes (marker + length + zip + cipher + crc)", wire.len());

    let decoded = codec.decode(&wire, &shape)?;
    println!("decoded: {:?}", decoded);
    assert_eq!(decoded, value);
    println!("round trip ok");
    Ok(())
}
