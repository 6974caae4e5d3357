//! Strategy dispatch per runtime shape.
//!
//! The registry is built once at codec construction and is immutable
//! thereafter, so concurrent encode/decode calls can dispatch without
//! locking. Dispatch order: built-in scalar/string/bytes/array strategies by
//! shape kind, then named custom strategies (self-describing types), with
//! composite objects falling through to the field-table strategy.

use std::collections::HashMap;

use framewire_core::{ByteCursorBuffer, CodecContext, CodecError, Result};

use super::strategies::{
    ArrayStrategy, BytesStrategy, RecordStrategy, ScalarStrategy, StringStrategy,
};
use crate::value::{Shape, Value};

/// An encode/decode strategy for one class of shapes.
///
/// Strategies are stateless and shared across concurrent calls; recursion
/// into element and field shapes goes back through the registry.
pub trait TypeStrategy: Send + Sync {
    /// Appends the value's encoding to the buffer.
    fn encode(
        &self,
        registry: &CodecRegistry,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()>;

    /// Reads a value of the given shape from the buffer.
    fn decode(
        &self,
        registry: &CodecRegistry,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<Value>;
}

/// Maps runtime shapes to encode/decode strategies.
pub struct CodecRegistry {
    scalar: ScalarStrategy,
    string: StringStrategy,
    bytes: BytesStrategy,
    array: ArrayStrategy,
    record: RecordStrategy,
    custom: HashMap<&'static str, Box<dyn TypeStrategy>>,
}

impl CodecRegistry {
    /// Creates a registry with the built-in strategies and no custom entries.
    pub fn new() -> Self {
        Self {
            scalar: ScalarStrategy,
            string: StringStrategy,
            bytes: BytesStrategy,
            array: ArrayStrategy,
            record: RecordStrategy,
            custom: HashMap::new(),
        }
    }

    /// Registers a strategy for a named self-describing type.
    ///
    /// A one-time construction operation; the registry is read-only once the
    /// codec is built.
    pub fn register_custom(&mut self, name: &'static str, strategy: Box<dyn TypeStrategy>) {
        self.custom.insert(name, strategy);
    }

    fn strategy_for(&self, shape: &Shape) -> Result<&dyn TypeStrategy> {
        Ok(match shape {
            Shape::Str => &self.string,
            Shape::Bytes => &self.bytes,
            Shape::Array(_) => &self.array,
            Shape::Record(_) => &self.record,
            Shape::Custom(name) => self
                .custom
                .get(name)
                .map(|s| s.as_ref())
                .ok_or_else(|| {
                    CodecError::UnsupportedType(format!(
                        "no strategy registered for custom type {name:?}"
                    ))
                })?,
            _ => &self.scalar,
        })
    }

    /// Encodes a value under the given shape, dispatching to the registered
    /// strategy.
    pub fn encode_value(
        &self,
        value: &Value,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        self.strategy_for(shape)?.encode(self, value, shape, buf, ctx)
    }

    /// Decodes a value of the given shape, dispatching to the registered
    /// strategy.
    pub fn decode_value(
        &self,
        shape: &Shape,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<Value> {
        self.strategy_for(shape)?.decode(self, shape, buf, ctx)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
