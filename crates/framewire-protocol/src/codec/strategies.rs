//! Built-in encode/decode strategies: scalars, strings, bytes, arrays, and
//! composite records.

use framewire_core::constants::UNKNOWN_LENGTH;
use framewire_core::{ByteCursorBuffer, CodecContext, CodecError, Result};

use super::registry::{CodecRegistry, TypeStrategy};
use crate::value::{FieldLayout, FieldShape, Shape, Value};

fn mismatch(shape: &Shape, value: &Value, ctx: &CodecContext) -> CodecError {
    let path = ctx.field_path();
    if path.is_empty() {
        CodecError::UnsupportedType(format!(
            "cannot encode {} value as {}",
            value.kind_name(),
            shape.kind_name()
        ))
    } else {
        CodecError::UnsupportedType(format!(
            "cannot encode {} value as {} at field {path:?}",
            value.kind_name(),
            shape.kind_name()
        ))
    }
}

/// Fixed-width numerics and bool.
///
/// Absent (`Null`) values encode as the shape's zero value; the wire format
/// carries no present/absent flag for scalars.
pub struct ScalarStrategy;

impl TypeStrategy for ScalarStrategy {
    fn encode(
        &self,
        _registry: &CodecRegistry,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        match (shape, value) {
            (Shape::I8, Value::I8(v)) => buf.write_i8(*v),
            (Shape::I8, Value::Null) => buf.write_i8(0),
            (Shape::I16, Value::I16(v)) => buf.write_i16(*v),
            (Shape::I16, Value::Null) => buf.write_i16(0),
            (Shape::I32, Value::I32(v)) => buf.write_i32(*v),
            (Shape::I32, Value::Null) => buf.write_i32(0),
            (Shape::I64, Value::I64(v)) => buf.write_i64(*v),
            (Shape::I64, Value::Null) => buf.write_i64(0),
            (Shape::U8, Value::U8(v)) => buf.write_u8(*v),
            (Shape::U8, Value::Null) => buf.write_u8(0),
            (Shape::U16, Value::U16(v)) => buf.write_u16(*v),
            (Shape::U16, Value::Null) => buf.write_u16(0),
            (Shape::U32, Value::U32(v)) => buf.write_u32(*v),
            (Shape::U32, Value::Null) => buf.write_u32(0),
            (Shape::U64, Value::U64(v)) => buf.write_u64(*v),
            (Shape::U64, Value::Null) => buf.write_u64(0),
            (Shape::F32, Value::F32(v)) => buf.write_f32(*v),
            (Shape::F32, Value::Null) => buf.write_f32(0.0),
            (Shape::F64, Value::F64(v)) => buf.write_f64(*v),
            (Shape::F64, Value::Null) => buf.write_f64(0.0),
            (Shape::Bool, Value::Bool(v)) => buf.write_bool(*v),
            (Shape::Bool, Value::Null) => buf.write_bool(false),
            _ => return Err(mismatch(shape, value, ctx)),
        }
        Ok(())
    }

    fn decode(
        &self,
        _registry: &CodecRegistry,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        _ctx: &mut CodecContext,
    ) -> Result<Value> {
        Ok(match shape {
            Shape::I8 => Value::I8(buf.read_i8()?),
            Shape::I16 => Value::I16(buf.read_i16()?),
            Shape::I32 => Value::I32(buf.read_i32()?),
            Shape::I64 => Value::I64(buf.read_i64()?),
            Shape::U8 => Value::U8(buf.read_u8()?),
            Shape::U16 => Value::U16(buf.read_u16()?),
            Shape::U32 => Value::U32(buf.read_u32()?),
            Shape::U64 => Value::U64(buf.read_u64()?),
            Shape::F32 => Value::F32(buf.read_f32()?),
            Shape::F64 => Value::F64(buf.read_f64()?),
            Shape::Bool => Value::Bool(buf.read_bool()?),
            other => {
                return Err(CodecError::UnsupportedType(format!(
                    "scalar strategy invoked for {} shape",
                    other.kind_name()
                )))
            }
        })
    }
}

/// Length-prefixed text: 4-byte count followed by the encoded bytes.
///
/// `Null` encodes as count 0; a count ≤ 0 decodes to the empty string.
pub struct StringStrategy;

impl TypeStrategy for StringStrategy {
    fn encode(
        &self,
        _registry: &CodecRegistry,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        match value {
            Value::Null => buf.write_i32(0),
            Value::Str(s) => {
                let bytes = ctx.text_encoding.encode_str(s)?;
                buf.write_i32(bytes.len() as i32);
                buf.write_bytes(&bytes);
            }
            _ => return Err(mismatch(shape, value, ctx)),
        }
        Ok(())
    }

    fn decode(
        &self,
        _registry: &CodecRegistry,
        _shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<Value> {
        let declared = buf.read_i32()?;
        let n = buf.clamp_len(declared as i64);
        let encoding = ctx.text_encoding;
        let bytes = buf.read_bytes(n)?;
        Ok(Value::Str(encoding.decode_str(bytes)))
    }
}

/// Length-prefixed raw bytes.
pub struct BytesStrategy;

impl TypeStrategy for BytesStrategy {
    fn encode(
        &self,
        _registry: &CodecRegistry,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        match value {
            Value::Null => buf.write_i32(0),
            Value::Bytes(b) => {
                buf.write_i32(b.len() as i32);
                buf.write_bytes(b);
            }
            _ => return Err(mismatch(shape, value, ctx)),
        }
        Ok(())
    }

    fn decode(
        &self,
        _registry: &CodecRegistry,
        _shape: &Shape,
        buf: &mut ByteCursorBuffer,
        _ctx: &mut CodecContext,
    ) -> Result<Value> {
        let declared = buf.read_i32()?;
        let n = buf.clamp_len(declared as i64);
        Ok(Value::Bytes(buf.read_bytes(n)?.to_vec()))
    }
}

/// Count-prefixed homogeneous arrays; elements encode recursively through the
/// registry.
pub struct ArrayStrategy;

impl TypeStrategy for ArrayStrategy {
    fn encode(
        &self,
        registry: &CodecRegistry,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        let elem_shape = match shape {
            Shape::Array(elem) => elem.as_ref(),
            other => {
                return Err(CodecError::UnsupportedType(format!(
                    "array strategy invoked for {} shape",
                    other.kind_name()
                )))
            }
        };
        match value {
            Value::Null => buf.write_i32(0),
            Value::Array(items) => {
                buf.write_i32(items.len() as i32);
                for item in items {
                    registry.encode_value(item, elem_shape, buf, ctx)?;
                }
            }
            _ => return Err(mismatch(shape, value, ctx)),
        }
        Ok(())
    }

    fn decode(
        &self,
        registry: &CodecRegistry,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<Value> {
        let elem_shape = match shape {
            Shape::Array(elem) => elem.as_ref(),
            other => {
                return Err(CodecError::UnsupportedType(format!(
                    "array strategy invoked for {} shape",
                    other.kind_name()
                )))
            }
        };
        let declared = buf.read_i32()?;
        // Negative counts decode as empty; a truncated element stream still
        // surfaces as an underflow from the element decode.
        let count = declared.max(0) as usize;
        let mut items = Vec::with_capacity(count.min(buf.remaining() + 1));
        for _ in 0..count {
            items.push(registry.decode_value(elem_shape, buf, ctx)?);
        }
        Ok(Value::Array(items))
    }
}

/// Composite objects, traversed field by field through the shape's
/// descriptor table.
///
/// Field order is the shape's resolved wire order; with auto-length enabled
/// each field carries a 4-byte length prefix so unknown trailing content can
/// be skipped. Fixed-layout fields are padded or truncated to their declared
/// length.
pub struct RecordStrategy;

impl RecordStrategy {
    fn encode_field(
        &self,
        registry: &CodecRegistry,
        field: &FieldShape,
        value: &Value,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        if let Some(layout) = &field.layout {
            if let Some(len) = layout.length {
                return self.encode_fixed(registry, field, layout, len, value, buf, ctx);
            }
        }
        let with_prefix = ctx.auto_length
            && !(matches!(field.shape, Shape::Record(_)) && ctx.ignore_record_auto_length);
        if with_prefix {
            let len_at = buf.position();
            buf.write_i32(0); // placeholder, patched below
            let start = buf.position();
            registry.encode_value(value, &field.shape, buf, ctx)?;
            let field_len = buf.position() - start;
            buf.seek(len_at);
            buf.write_i32(field_len as i32);
            buf.seek_end();
            Ok(())
        } else {
            registry.encode_value(value, &field.shape, buf, ctx)
        }
    }

    fn encode_fixed(
        &self,
        registry: &CodecRegistry,
        field: &FieldShape,
        layout: &FieldLayout,
        len: usize,
        value: &Value,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        // Legacy fixed-layout text and bytes go on the wire raw, without a
        // count prefix; other shapes keep their regular encoding.
        let mut bytes = match (&field.shape, value) {
            (Shape::Str, Value::Str(s)) => ctx.text_encoding.encode_str(s)?,
            (Shape::Str, Value::Null) | (Shape::Bytes, Value::Null) => Vec::new(),
            (Shape::Bytes, Value::Bytes(b)) => b.clone(),
            _ => {
                let mut scratch = ByteCursorBuffer::new(ctx.endian);
                registry.encode_value(value, &field.shape, &mut scratch, ctx)?;
                scratch.into_bytes()
            }
        };
        if bytes.len() > len {
            bytes.truncate(len);
        } else if bytes.len() < len {
            let pad = vec![layout.padding_byte; len - bytes.len()];
            if layout.left_padding {
                bytes.splice(0..0, pad);
            } else {
                bytes.extend_from_slice(&pad);
            }
        }
        buf.write_bytes(&bytes);
        Ok(())
    }

    fn decode_field(
        &self,
        registry: &CodecRegistry,
        field: &FieldShape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<Value> {
        if let Some(layout) = &field.layout {
            if let Some(len) = layout.length {
                let n = buf.clamp_len(len as i64);
                let bytes = buf.read_bytes(n)?.to_vec();
                return self.decode_fixed(registry, field, layout, bytes, ctx);
            }
        }
        let with_prefix = ctx.auto_length
            && !(matches!(field.shape, Shape::Record(_)) && ctx.ignore_record_auto_length);
        if with_prefix {
            let declared = buf.read_i32()?;
            let window = if declared == UNKNOWN_LENGTH {
                buf.take_window()
            } else {
                buf.read_bytes(buf.clamp_len(declared as i64))?.to_vec()
            };
            let mut sub = ByteCursorBuffer::from_bytes(window, ctx.endian);
            // Anything the field decode leaves unconsumed is unknown trailing
            // content and is skipped.
            registry.decode_value(&field.shape, &mut sub, ctx)
        } else {
            registry.decode_value(&field.shape, buf, ctx)
        }
    }

    fn decode_fixed(
        &self,
        registry: &CodecRegistry,
        field: &FieldShape,
        layout: &FieldLayout,
        bytes: Vec<u8>,
        ctx: &mut CodecContext,
    ) -> Result<Value> {
        fn strip_padding<'a>(bytes: &'a [u8], layout: &FieldLayout) -> &'a [u8] {
            if layout.left_padding {
                let start = bytes
                    .iter()
                    .position(|&b| b != layout.padding_byte)
                    .unwrap_or(bytes.len());
                &bytes[start..]
            } else {
                let end = bytes
                    .iter()
                    .rposition(|&b| b != layout.padding_byte)
                    .map(|p| p + 1)
                    .unwrap_or(0);
                &bytes[..end]
            }
        }

        match &field.shape {
            Shape::Str => {
                Ok(Value::Str(ctx.text_encoding.decode_str(strip_padding(&bytes, layout))))
            }
            Shape::Bytes => Ok(Value::Bytes(strip_padding(&bytes, layout).to_vec())),
            _ => {
                let mut sub = ByteCursorBuffer::from_bytes(bytes, ctx.endian);
                registry.decode_value(&field.shape, &mut sub, ctx)
            }
        }
    }
}

impl TypeStrategy for RecordStrategy {
    fn encode(
        &self,
        registry: &CodecRegistry,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        let rec = match shape {
            Shape::Record(rec) => rec.clone(),
            other => {
                return Err(CodecError::UnsupportedType(format!(
                    "record strategy invoked for {} shape",
                    other.kind_name()
                )))
            }
        };
        let null_fields;
        let fields: &[Value] = match value {
            Value::Record(fields) => {
                if fields.len() != rec.field_count() {
                    return Err(CodecError::UnsupportedType(format!(
                        "record {:?} expects {} fields, got {}",
                        rec.name(),
                        rec.field_count(),
                        fields.len()
                    )));
                }
                fields
            }
            Value::Null => {
                null_fields = vec![Value::Null; rec.field_count()];
                &null_fields
            }
            _ => return Err(mismatch(shape, value, ctx)),
        };
        for &i in rec.encode_order() {
            let field = &rec.fields()[i];
            ctx.push_field(&field.name);
            let result = self.encode_field(registry, field, &fields[i], buf, ctx);
            ctx.pop_field();
            result?;
        }
        Ok(())
    }

    fn decode(
        &self,
        registry: &CodecRegistry,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<Value> {
        let rec = match shape {
            Shape::Record(rec) => rec.clone(),
            other => {
                return Err(CodecError::UnsupportedType(format!(
                    "record strategy invoked for {} shape",
                    other.kind_name()
                )))
            }
        };
        let mut fields = vec![Value::Null; rec.field_count()];
        for &i in rec.encode_order() {
            let field = &rec.fields()[i];
            ctx.push_field(&field.name);
            let result = self.decode_field(registry, field, buf, ctx);
            ctx.pop_field();
            fields[i] = result?;
        }
        Ok(Value::Record(fields))
    }
}
