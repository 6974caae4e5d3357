//! Unit tests for the object codec: dispatch, null semantics, endianness,
//! auto-length, and fixed-layout fields.

use std::sync::Arc;

use framewire_core::{
    ByteCursorBuffer, CodecConfig, CodecContext, CodecError, Endian, Result,
};

use super::registry::{CodecRegistry, TypeStrategy};
use super::ObjectCodec;
use crate::value::{FieldLayout, RecordShape, Shape, Value};

fn round_trip(codec: &ObjectCodec, value: &Value, shape: &Shape) -> Value {
    let bytes = codec.encode(value, shape).unwrap();
    codec.decode(&bytes, shape).unwrap()
}

#[test]
fn test_scalar_round_trips() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let cases = [
        (Value::I8(-3), Shape::I8),
        (Value::I16(-300), Shape::I16),
        (Value::I32(123_456), Shape::I32),
        (Value::I64(-9_000_000_000), Shape::I64),
        (Value::U8(200), Shape::U8),
        (Value::U16(60_000), Shape::U16),
        (Value::U32(4_000_000_000), Shape::U32),
        (Value::U64(u64::MAX), Shape::U64),
        (Value::F32(2.5), Shape::F32),
        (Value::F64(-0.125), Shape::F64),
        (Value::Bool(true), Shape::Bool),
    ];
    for (value, shape) in cases {
        assert_eq!(round_trip(&codec, &value, &shape), value);
    }
}

#[test]
fn test_endianness_on_the_wire() {
    let big = ObjectCodec::new(CodecConfig { endian: Endian::Big, ..CodecConfig::default() });
    let little =
        ObjectCodec::new(CodecConfig { endian: Endian::Little, ..CodecConfig::default() });

    assert_eq!(big.encode(&Value::I16(0x0102), &Shape::I16).unwrap(), vec![0x01, 0x02]);
    assert_eq!(little.encode(&Value::I16(0x0102), &Shape::I16).unwrap(), vec![0x02, 0x01]);
}

#[test]
fn test_null_scalars_encode_as_zero() {
    let codec = ObjectCodec::new(CodecConfig::default());
    assert_eq!(codec.encode(&Value::Null, &Shape::I32).unwrap(), vec![0, 0, 0, 0]);
    assert_eq!(
        round_trip(&codec, &Value::Null, &Shape::F64),
        Value::F64(0.0)
    );
    assert_eq!(round_trip(&codec, &Value::Null, &Shape::I16), Value::I16(0));
}

#[test]
fn test_null_string_and_array_decode_to_empty() {
    let codec = ObjectCodec::new(CodecConfig::default());
    assert_eq!(round_trip(&codec, &Value::Null, &Shape::Str), Value::Str(String::new()));
    assert_eq!(
        round_trip(&codec, &Value::Null, &Shape::Array(Box::new(Shape::I32))),
        Value::Array(vec![])
    );
    assert_eq!(round_trip(&codec, &Value::Null, &Shape::Bytes), Value::Bytes(vec![]));
}

#[test]
fn test_negative_declared_string_length_decodes_to_empty() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(-5i32).to_be_bytes());
    assert_eq!(
        codec.decode(&bytes, &Shape::Str).unwrap(),
        Value::Str(String::new())
    );
}

#[test]
fn test_overlong_declared_string_length_clamps_to_available() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1000i32.to_be_bytes());
    bytes.extend_from_slice(b"hi");
    assert_eq!(codec.decode(&bytes, &Shape::Str).unwrap(), Value::Str("hi".into()));
}

#[test]
fn test_string_round_trips() {
    let codec = ObjectCodec::new(CodecConfig::default());
    for s in ["", "hello", "héllo wörld", "長い テキスト"] {
        assert_eq!(round_trip(&codec, &Value::Str(s.into()), &Shape::Str), Value::Str(s.into()));
    }
}

#[test]
fn test_array_round_trips() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let arr = Value::Array(vec![Value::I32(1), Value::I32(-2), Value::I32(3)]);
    let shape = Shape::Array(Box::new(Shape::I32));
    assert_eq!(round_trip(&codec, &arr, &shape), arr);
    assert_eq!(
        round_trip(&codec, &Value::Array(vec![]), &shape),
        Value::Array(vec![])
    );
}

#[test]
fn test_null_element_in_numeric_array_decodes_as_zero() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let arr = Value::Array(vec![Value::F64(1.5), Value::Null, Value::F64(3.0)]);
    let shape = Shape::Array(Box::new(Shape::F64));
    assert_eq!(
        round_trip(&codec, &arr, &shape),
        Value::Array(vec![Value::F64(1.5), Value::F64(0.0), Value::F64(3.0)])
    );
}

fn session_shape() -> Arc<RecordShape> {
    RecordShape::builder("session")
        .field("id", Shape::U32)
        .field("peer", Shape::Str)
        .field("latencies", Shape::Array(Box::new(Shape::U16)))
        .build()
}

#[test]
fn test_nested_record_round_trip() {
    let inner = session_shape();
    let outer = RecordShape::builder("report")
        .field("session", Shape::Record(inner))
        .field("score", Shape::F64)
        .build();
    let shape = Shape::Record(outer);

    let value = Value::Record(vec![
        Value::Record(vec![
            Value::U32(17),
            Value::Str("peer-a".into()),
            Value::Array(vec![Value::U16(12), Value::U16(48)]),
        ]),
        Value::F64(0.75),
    ]);
    let codec = ObjectCodec::new(CodecConfig::default());
    assert_eq!(round_trip(&codec, &value, &shape), value);
}

#[test]
fn test_record_array_writes_element_count() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let shape = Shape::Array(Box::new(Shape::Record(session_shape())));
    let value = Value::Array(vec![Value::Record(vec![
        Value::U32(1),
        Value::Str("p".into()),
        Value::Array(vec![]),
    ])]);
    let bytes = codec.encode(&value, &shape).unwrap();
    assert_eq!(Endian::Big.read_u32(&bytes[..4]), 1);
    assert_eq!(round_trip(&codec, &value, &shape), value);
}

#[test]
fn test_field_count_mismatch_is_unsupported_type() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let shape = Shape::Record(session_shape());
    let wrong = Value::Record(vec![Value::U32(1)]);
    assert!(matches!(
        codec.encode(&wrong, &shape),
        Err(CodecError::UnsupportedType(_))
    ));
}

#[test]
fn test_shape_value_mismatch_names_field() {
    let codec = ObjectCodec::new(CodecConfig::default());
    let shape = Shape::Record(session_shape());
    let wrong = Value::Record(vec![
        Value::Str("not a u32".into()),
        Value::Str("peer".into()),
        Value::Array(vec![]),
    ]);
    match codec.encode(&wrong, &shape) {
        Err(CodecError::UnsupportedType(msg)) => assert!(msg.contains("id"), "message: {msg}"),
        other => panic!("expected unsupported type, got {other:?}"),
    }
}

#[test]
fn test_truncated_input_is_underflow() {
    let codec = ObjectCodec::new(CodecConfig::default());
    assert!(matches!(
        codec.decode(&[0x01], &Shape::I32),
        Err(CodecError::Underflow { .. })
    ));
}

#[test]
fn test_auto_length_round_trip() {
    let config = CodecConfig { auto_length: true, ..CodecConfig::default() };
    let codec = ObjectCodec::new(config);
    let shape = Shape::Record(session_shape());
    let value = Value::Record(vec![
        Value::U32(5),
        Value::Str("peer-b".into()),
        Value::Array(vec![Value::U16(1)]),
    ]);
    assert_eq!(round_trip(&codec, &value, &shape), value);
}

#[test]
fn test_auto_length_skips_unknown_trailing_field_content() {
    // A newer writer appends extra bytes inside a field's delimited window;
    // an older reader must skip them.
    let config = CodecConfig { auto_length: true, ..CodecConfig::default() };
    let codec = ObjectCodec::new(config);

    let v1 = RecordShape::builder("msg").field("tag", Shape::Str).build();
    let bytes = codec
        .encode(
            &Value::Record(vec![Value::Str("ok".into())]),
            &Shape::Record(v1.clone()),
        )
        .unwrap();

    // Widen the first field's window by 3 bytes of content v1 cannot parse.
    let mut widened = bytes.clone();
    let declared = Endian::Big.read_u32(&widened[..4]);
    Endian::Big.write_u32(&mut widened[..4], declared + 3);
    widened.extend_from_slice(&[0xEE, 0xEE, 0xEE]);

    assert_eq!(
        codec.decode(&widened, &Shape::Record(v1)).unwrap(),
        Value::Record(vec![Value::Str("ok".into())])
    );
}

#[test]
fn test_auto_length_unknown_sentinel_reads_remainder() {
    let config = CodecConfig { auto_length: true, ..CodecConfig::default() };
    let codec = ObjectCodec::new(config);
    let rec = RecordShape::builder("msg").field("tag", Shape::Str).build();

    // Field window declared as the unknown-length sentinel.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(-1i32).to_be_bytes());
    bytes.extend_from_slice(&2i32.to_be_bytes());
    bytes.extend_from_slice(b"ok");

    assert_eq!(
        codec.decode(&bytes, &Shape::Record(rec)).unwrap(),
        Value::Record(vec![Value::Str("ok".into())])
    );
}

#[test]
fn test_ignore_record_auto_length_omits_nested_record_prefix() {
    let inner = RecordShape::builder("session").field("id", Shape::U32).build();
    let outer = RecordShape::builder("report")
        .field("tag", Shape::Str)
        .field("session", Shape::Record(inner))
        .build();
    let shape = Shape::Record(outer);
    let value = Value::Record(vec![
        Value::Str("ok".into()),
        Value::Record(vec![Value::U32(7)]),
    ]);

    let plain = ObjectCodec::new(CodecConfig { auto_length: true, ..CodecConfig::default() });
    let ignoring = ObjectCodec::new(CodecConfig {
        auto_length: true,
        ignore_record_auto_length: true,
        ..CodecConfig::default()
    });

    let bytes = ignoring.encode(&value, &shape).unwrap();
    // tag keeps its window: [len=6][strlen=2]"ok" = 10 bytes. The record
    // field follows immediately with no window of its own; its inner scalar
    // field still carries one: [len=4][id] = 8 bytes.
    assert_eq!(bytes.len(), 18);
    assert_eq!(Endian::Big.read_i32(&bytes[..4]), 6);
    assert_eq!(Endian::Big.read_i32(&bytes[10..14]), 4);
    assert_eq!(Endian::Big.read_u32(&bytes[14..18]), 7);
    // With the flag off the same record field gains a 4-byte window.
    assert_eq!(plain.encode(&value, &shape).unwrap().len(), 22);

    assert_eq!(ignoring.decode(&bytes, &shape).unwrap(), value);
}

#[test]
fn test_fixed_layout_left_padded_string() {
    let rec = RecordShape::builder("legacy")
        .field_with_layout(
            "code",
            Shape::Str,
            FieldLayout { position: 0, length: Some(8), left_padding: true, padding_byte: b' ' },
        )
        .build();
    let shape = Shape::Record(rec);
    let codec = ObjectCodec::new(CodecConfig::default());

    let value = Value::Record(vec![Value::Str("AB12".into())]);
    let bytes = codec.encode(&value, &shape).unwrap();
    assert_eq!(bytes, b"    AB12");
    assert_eq!(codec.decode(&bytes, &shape).unwrap(), value);
}

#[test]
fn test_fixed_layout_truncates_overlong_value() {
    let rec = RecordShape::builder("legacy")
        .field_with_layout(
            "code",
            Shape::Str,
            FieldLayout { position: 0, length: Some(4), left_padding: false, padding_byte: 0 },
        )
        .build();
    let shape = Shape::Record(rec);
    let codec = ObjectCodec::new(CodecConfig::default());

    let bytes = codec
        .encode(&Value::Record(vec![Value::Str("overflowing".into())]), &shape)
        .unwrap();
    assert_eq!(bytes, b"over");
}

#[test]
fn test_fixed_layout_positions_reorder_fields() {
    let rec = RecordShape::builder("legacy")
        .field_with_layout(
            "second",
            Shape::Str,
            FieldLayout { position: 2, length: Some(2), left_padding: false, padding_byte: b'.' },
        )
        .field_with_layout(
            "first",
            Shape::Str,
            FieldLayout { position: 1, length: Some(2), left_padding: false, padding_byte: b'.' },
        )
        .build();
    let shape = Shape::Record(rec);
    let codec = ObjectCodec::new(CodecConfig::default());

    let value = Value::Record(vec![Value::Str("BB".into()), Value::Str("AA".into())]);
    let bytes = codec.encode(&value, &shape).unwrap();
    assert_eq!(bytes, b"AABB");
    assert_eq!(codec.decode(&bytes, &shape).unwrap(), value);
}

struct VersionTag;

impl TypeStrategy for VersionTag {
    fn encode(
        &self,
        _registry: &CodecRegistry,
        value: &Value,
        _shape: &Shape,
        buf: &mut ByteCursorBuffer,
        _ctx: &mut CodecContext,
    ) -> Result<()> {
        match value {
            Value::U16(v) => {
                buf.write_u8(b'v');
                buf.write_u16(*v);
                Ok(())
            }
            other => Err(CodecError::UnsupportedType(format!(
                "version tag expects u16, got {}",
                other.kind_name()
            ))),
        }
    }

    fn decode(
        &self,
        _registry: &CodecRegistry,
        _shape: &Shape,
        buf: &mut ByteCursorBuffer,
        _ctx: &mut CodecContext,
    ) -> Result<Value> {
        let lead = buf.read_u8()?;
        if lead != b'v' {
            return Err(CodecError::Framing(format!("bad version tag lead byte {lead:#04x}")));
        }
        Ok(Value::U16(buf.read_u16()?))
    }
}

#[test]
fn test_custom_strategy_dispatch() {
    let codec = ObjectCodec::builder()
        .custom_strategy("version-tag", Box::new(VersionTag))
        .build();
    let shape = Shape::Custom("version-tag");
    let value = Value::U16(0x0203);

    let bytes = codec.encode(&value, &shape).unwrap();
    assert_eq!(bytes, vec![b'v', 0x02, 0x03]);
    assert_eq!(codec.decode(&bytes, &shape).unwrap(), value);
}

#[test]
fn test_unregistered_custom_strategy_is_unsupported_type() {
    let codec = ObjectCodec::new(CodecConfig::default());
    assert!(matches!(
        codec.encode(&Value::U16(1), &Shape::Custom("nope")),
        Err(CodecError::UnsupportedType(_))
    ));
}
