//! Dynamic object model: runtime values and the shapes that describe them.
//!
//! Composite objects are traversed through explicit descriptor tables
//! ([`RecordShape`]) built once at codec construction and shared read-only
//! thereafter, rather than through per-call reflection.

use std::sync::Arc;

/// A runtime value to encode, or the result of a decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. Encodes as the shape's zero value (numerics/bool) or as
    /// a zero count (strings, bytes, arrays, records).
    Null,
    /// Signed 8-bit integer.
    I8(i8),
    /// Signed 16-bit integer.
    I16(i16),
    /// Signed 32-bit integer.
    I32(i32),
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Boolean, one byte on the wire.
    Bool(bool),
    /// Text, length-prefixed in the configured encoding.
    Str(String),
    /// Raw bytes, length-prefixed.
    Bytes(Vec<u8>),
    /// Homogeneous array, count-prefixed.
    Array(Vec<Value>),
    /// Composite object: field values in the shape's declaration order.
    Record(Vec<Value>),
}

impl Value {
    /// Short name of the value's kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }
}

/// The wire shape a value encodes under.
///
/// Decoding is shape-directed: the caller supplies the target shape and the
/// registry dispatches to the strategy registered for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Boolean.
    Bool,
    /// Length-prefixed text.
    Str,
    /// Length-prefixed raw bytes.
    Bytes,
    /// Count-prefixed homogeneous array of the element shape.
    Array(Box<Shape>),
    /// Composite object described by a field table.
    Record(Arc<RecordShape>),
    /// Self-describing type handled by a strategy registered under this name
    /// at codec construction.
    Custom(&'static str),
}

impl Shape {
    /// Short name of the shape's kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::I8 => "i8",
            Shape::I16 => "i16",
            Shape::I32 => "i32",
            Shape::I64 => "i64",
            Shape::U8 => "u8",
            Shape::U16 => "u16",
            Shape::U32 => "u32",
            Shape::U64 => "u64",
            Shape::F32 => "f32",
            Shape::F64 => "f64",
            Shape::Bool => "bool",
            Shape::Str => "str",
            Shape::Bytes => "bytes",
            Shape::Array(_) => "array",
            Shape::Record(_) => "record",
            Shape::Custom(_) => "custom",
        }
    }

    /// True for fixed-width numeric and bool shapes.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Shape::Str | Shape::Bytes | Shape::Array(_) | Shape::Record(_) | Shape::Custom(_)
        )
    }
}

/// Explicit position/padding metadata for legacy fixed-layout fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Explicit position overriding declaration order.
    pub position: u16,
    /// Fixed on-wire length; the encoded field is padded or truncated to fit.
    pub length: Option<usize>,
    /// Pad on the left when true, on the right when false.
    pub left_padding: bool,
    /// Byte used for padding.
    pub padding_byte: u8,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self { position: 0, length: None, left_padding: false, padding_byte: 0 }
    }
}

/// One field of a composite object.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Field name, used in error breadcrumbs.
    pub name: String,
    /// The field's wire shape.
    pub shape: Shape,
    /// Optional fixed-layout metadata.
    pub layout: Option<FieldLayout>,
}

/// Descriptor table for a composite object: its fields in declaration order,
/// plus the resolved encode order when position metadata is present.
///
/// Built once via [`RecordShapeBuilder`] and shared via `Arc`; immutable
/// thereafter, so concurrent encode/decode calls can read it without locking.
#[derive(Debug, PartialEq)]
pub struct RecordShape {
    name: String,
    fields: Vec<FieldShape>,
    encode_order: Vec<usize>,
}

impl RecordShape {
    /// Starts building a record shape.
    pub fn builder(name: impl Into<String>) -> RecordShapeBuilder {
        RecordShapeBuilder { name: name.into(), fields: Vec::new() }
    }

    /// The record's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field indices in wire order: declaration order unless any field
    /// carries explicit position metadata, in which case positions win.
    pub fn encode_order(&self) -> &[usize] {
        &self.encode_order
    }
}

/// Builder for [`RecordShape`]; finishing yields a shared `Arc`.
#[derive(Debug)]
pub struct RecordShapeBuilder {
    name: String,
    fields: Vec<FieldShape>,
}

impl RecordShapeBuilder {
    /// Adds a field in declaration order.
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(FieldShape { name: name.into(), shape, layout: None });
        self
    }

    /// Adds a field with explicit fixed-layout metadata.
    pub fn field_with_layout(
        mut self,
        name: impl Into<String>,
        shape: Shape,
        layout: FieldLayout,
    ) -> Self {
        self.fields.push(FieldShape { name: name.into(), shape, layout: Some(layout) });
        self
    }

    /// Finishes the descriptor table, resolving the wire order.
    pub fn build(self) -> Arc<RecordShape> {
        let mut encode_order: Vec<usize> = (0..self.fields.len()).collect();
        if self.fields.iter().any(|f| f.layout.is_some()) {
            encode_order.sort_by_key(|&i| {
                self.fields[i].layout.as_ref().map(|l| l.position).unwrap_or(i as u16)
            });
        }
        Arc::new(RecordShape { name: self.name, fields: self.fields, encode_order })
    }
}
