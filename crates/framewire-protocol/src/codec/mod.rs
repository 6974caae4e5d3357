//! Object codec: the encode/decode entry points.
//!
//! # Module Organization
//!
//! - [`registry`] - shape-to-strategy dispatch
//! - [`strategies`] - built-in scalar/string/bytes/array/record strategies

pub mod registry;
pub mod strategies;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use framewire_core::{ByteCursorBuffer, CodecConfig, CodecContext, Result};

use crate::value::{Shape, Value};
use crate::wrapper::{TransformChain, Wrapper};
use registry::{CodecRegistry, TypeStrategy};

/// Encodes object graphs into the wire format and back.
///
/// Stateless per call: configuration, registry, and wrapper chain are
/// immutable after construction, and every call gets a fresh context and
/// buffer, so a single codec may be shared across threads freely.
pub struct ObjectCodec {
    config: Arc<CodecConfig>,
    chain: TransformChain,
    registry: CodecRegistry,
}

impl ObjectCodec {
    /// Creates a codec with the given configuration and no wrapper stages.
    pub fn new(config: CodecConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Starts building a codec.
    pub fn builder() -> ObjectCodecBuilder {
        ObjectCodecBuilder {
            config: CodecConfig::default(),
            chain: TransformChain::new(),
            custom: Vec::new(),
        }
    }

    /// The codec's shared configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes a value under the given shape into wire bytes.
    ///
    /// Runs the wrapper chain's before-encode hooks (head to tail),
    /// serializes the object graph through the strategy registry, runs the
    /// after-encode hooks (head to tail), then executes the queued
    /// finalizers and assembles `head ++ body`.
    pub fn encode(&self, value: &Value, shape: &Shape) -> Result<Vec<u8>> {
        let mut ctx = CodecContext::new(&self.config);
        let mut buf = ByteCursorBuffer::new(self.config.endian);

        self.chain.run_before_encode(&mut buf, &mut ctx)?;
        self.registry.encode_value(value, shape, &mut buf, &mut ctx)?;
        self.chain.run_after_encode(&mut buf, &mut ctx)?;
        ctx.run_finalizers(&mut buf)?;

        Ok(buf.into_bytes())
    }

    /// Decodes wire bytes into a value of the given target shape.
    ///
    /// Runs the wrapper chain's before-decode hooks (tail to head, undoing
    /// the encode-side transforms in nesting order), parses the object graph,
    /// then runs the after-decode hooks (tail to head).
    pub fn decode(&self, bytes: &[u8], shape: &Shape) -> Result<Value> {
        let mut ctx = CodecContext::new(&self.config);
        let mut buf = ByteCursorBuffer::from_bytes(bytes.to_vec(), self.config.endian);

        self.chain.run_before_decode(&mut buf, &mut ctx)?;
        let value = self.registry.decode_value(shape, &mut buf, &mut ctx)?;
        self.chain.run_after_decode(&mut buf, &mut ctx)?;

        Ok(value)
    }
}

/// Builder assembling configuration, wrapper stages, and custom strategies.
pub struct ObjectCodecBuilder {
    config: CodecConfig,
    chain: TransformChain,
    custom: Vec<(&'static str, Box<dyn TypeStrategy>)>,
}

impl ObjectCodecBuilder {
    /// Sets the codec configuration.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a wrapper stage. The newly registered stage becomes the new
    /// head of the chain (see [`TransformChain`]).
    pub fn wrapper(mut self, stage: Arc<dyn Wrapper>) -> Self {
        self.chain.register(stage);
        self
    }

    /// Registers a strategy for a named self-describing type.
    pub fn custom_strategy(
        mut self,
        name: &'static str,
        strategy: Box<dyn TypeStrategy>,
    ) -> Self {
        self.custom.push((name, strategy));
        self
    }

    /// Finishes the codec; configuration, chain, and registry are immutable
    /// from here on.
    pub fn build(self) -> ObjectCodec {
        let mut registry = CodecRegistry::new();
        for (name, strategy) in self.custom {
            registry.register_custom(name, strategy);
        }
        ObjectCodec { config: Arc::new(self.config), chain: self.chain, registry }
    }
}
