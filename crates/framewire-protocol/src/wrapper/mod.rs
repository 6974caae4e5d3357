//! The transform chain: pluggable pre/post-processing stages applied
//! symmetrically around object serialization.
//!
//! # Module Organization
//!
//! - [`identify`] - magic marker and version byte
//! - [`total_length`] - deferred total-length patch-back
//! - [`zip`] - compression (zlib, LZ4)
//! - [`cipher`] - authenticated encryption (AES-256-GCM, ChaCha20-Poly1305)
//! - [`verify`] - checksum append and validation (CRC-32, CRC-16, Adler-32)

pub mod cipher;
pub mod identify;
pub mod total_length;
pub mod verify;
pub mod zip;

use std::sync::Arc;

use framewire_core::{ByteCursorBuffer, CodecContext, Result};
use tracing::error;

pub use cipher::{Cipher, CipherAlgorithm};
pub use identify::Identify;
pub use total_length::TotalLength;
pub use verify::{ChecksumKind, Verify};
pub use zip::{CompressionAlgorithm, Zip};

/// A transform stage with four optional hooks.
///
/// Stage instances are stateless and shared across concurrent calls; any
/// state that must survive between hooks travels through the buffer or the
/// context's finalization queue, never through stage fields.
pub trait Wrapper: Send + Sync {
    /// Stage name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Runs before the object graph is serialized.
    fn before_encode(&self, _buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        Ok(())
    }

    /// Runs after the object graph is serialized, on the complete raw bytes.
    fn after_encode(&self, _buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        Ok(())
    }

    /// Runs before the object graph is parsed, undoing the encode-side
    /// transform.
    fn before_decode(&self, _buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        Ok(())
    }

    /// Runs after the object graph is parsed.
    fn after_decode(&self, _buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        Ok(())
    }
}

/// Ordered chain of transform stages.
///
/// Registration is LIFO with respect to head position: each newly registered
/// stage becomes the new head. Encode hooks walk head to tail; decode hooks
/// walk tail to head, so whatever was applied last on encode is undone first
/// on decode. Body-rewriting stages (compression, encryption, checksums)
/// therefore nest like envelopes in any registration order. Stages that
/// write framing prefixes ahead of the body (marker, total length) prepend
/// to the head section, which body rewrites never touch; register them
/// ahead of the body-rewriting stages so their decode hooks consume the
/// prefixes first.
pub struct TransformChain {
    // Registration order; the head is the last element.
    stages: Vec<Arc<dyn Wrapper>>,
}

impl TransformChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Registers a stage; it becomes the new head of the chain.
    pub fn register(&mut self, stage: Arc<dyn Wrapper>) {
        self.stages.push(stage);
    }

    /// Number of registered stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no stages are registered.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage's before-encode hook, head to tail.
    pub fn run_before_encode(
        &self,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        for stage in self.stages.iter().rev() {
            stage.before_encode(buf, ctx).map_err(|e| {
                error!(stage = stage.name(), error = %e, "before-encode hook failed");
                e
            })?;
        }
        Ok(())
    }

    /// Runs every stage's after-encode hook, head to tail.
    pub fn run_after_encode(
        &self,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        for stage in self.stages.iter().rev() {
            stage.after_encode(buf, ctx).map_err(|e| {
                error!(stage = stage.name(), error = %e, "after-encode hook failed");
                e
            })?;
        }
        Ok(())
    }

    /// Runs every stage's before-decode hook, tail to head.
    pub fn run_before_decode(
        &self,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        for stage in self.stages.iter() {
            stage.before_decode(buf, ctx).map_err(|e| {
                error!(stage = stage.name(), error = %e, "before-decode hook failed");
                e
            })?;
        }
        Ok(())
    }

    /// Runs every stage's after-decode hook, tail to head.
    pub fn run_after_decode(
        &self,
        buf: &mut ByteCursorBuffer,
        ctx: &mut CodecContext,
    ) -> Result<()> {
        for stage in self.stages.iter() {
            stage.after_decode(buf, ctx).map_err(|e| {
                error!(stage = stage.name(), error = %e, "after-decode hook failed");
                e
            })?;
        }
        Ok(())
    }
}

impl Default for TransformChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewire_core::CodecConfig;
    use std::sync::Mutex;

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Wrapper for Recording {
        fn name(&self) -> &'static str {
            self.label
        }

        fn before_encode(&self, _b: &mut ByteCursorBuffer, _c: &mut CodecContext) -> Result<()> {
            self.log.lock().unwrap().push(format!("be:{}", self.label));
            Ok(())
        }

        fn after_encode(&self, _b: &mut ByteCursorBuffer, _c: &mut CodecContext) -> Result<()> {
            self.log.lock().unwrap().push(format!("ae:{}", self.label));
            Ok(())
        }

        fn before_decode(&self, _b: &mut ByteCursorBuffer, _c: &mut CodecContext) -> Result<()> {
            self.log.lock().unwrap().push(format!("bd:{}", self.label));
            Ok(())
        }

        fn after_decode(&self, _b: &mut ByteCursorBuffer, _c: &mut CodecContext) -> Result<()> {
            self.log.lock().unwrap().push(format!("ad:{}", self.label));
            Ok(())
        }
    }

    struct Failing;

    impl Wrapper for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn before_decode(&self, _b: &mut ByteCursorBuffer, _c: &mut CodecContext) -> Result<()> {
            Err(framewire_core::CodecError::Framing("bad prefix".into()))
        }
    }

    #[test]
    fn test_failed_hook_stops_the_walk_and_propagates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = TransformChain::new();
        chain.register(Arc::new(Recording { label: "inner", log: log.clone() }));
        chain.register(Arc::new(Failing));
        chain.register(Arc::new(Recording { label: "outer", log: log.clone() }));

        let config = CodecConfig::default();
        let mut ctx = CodecContext::new(&config);
        let mut buf = ByteCursorBuffer::new(config.endian);

        let err = chain.run_before_decode(&mut buf, &mut ctx).unwrap_err();
        assert!(matches!(err, framewire_core::CodecError::Framing(_)));
        // The decode walk runs tail to head, so only the first stage ran
        // before the failure cut the walk short.
        assert_eq!(*log.lock().unwrap(), vec!["bd:inner"]);
    }

    #[test]
    fn test_hook_ordering_is_lifo_on_encode_fifo_on_decode() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = TransformChain::new();
        for label in ["a", "b", "c"] {
            chain.register(Arc::new(Recording { label, log: log.clone() }));
        }

        let config = CodecConfig::default();
        let mut ctx = CodecContext::new(&config);
        let mut buf = ByteCursorBuffer::new(config.endian);

        chain.run_before_encode(&mut buf, &mut ctx).unwrap();
        chain.run_after_encode(&mut buf, &mut ctx).unwrap();
        chain.run_before_decode(&mut buf, &mut ctx).unwrap();
        chain.run_after_decode(&mut buf, &mut ctx).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "be:c", "be:b", "be:a", // encode hooks run head (last-registered) to tail
                "ae:c", "ae:b", "ae:a",
                "bd:a", "bd:b", "bd:c", // decode hooks run tail to head
                "ad:a", "ad:b", "ad:c",
            ]
        );
    }
}
