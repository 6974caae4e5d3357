use crate::buffer::ByteCursorBuffer;
use crate::config::{CodecConfig, Endian, TextEncoding};
use crate::constants::LENGTH_FIELD_SIZE;
use crate::error::Result;

/// A deferred operation recorded during encoding and executed after the main
/// body is fully serialized and all after-encode hooks have run.
///
/// Wrapper stages never hold per-call state in their own fields (a single
/// stage instance is shared across concurrent calls); anything that must
/// survive between hooks travels through this queue instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalizer {
    /// Patch a reserved 4-byte length placeholder in the head section with
    /// the final total byte count.
    ///
    /// The placeholder is addressed backward from the end of the head so
    /// prefixes prepended by later stages cannot shift it.
    PatchHeadU32 {
        /// Distance from the end of the head section to the placeholder
        /// start.
        from_end: usize,
        /// When false, the 4-byte length field itself is excluded from the
        /// count (the `BodyOnly` policy).
        include_length_field: bool,
    },
}

/// Per-invocation codec state, derived from the immutable [`CodecConfig`].
///
/// Created fresh for every encode/decode call, owned exclusively by that
/// call, and discarded when it returns. Holds the resolved settings, the
/// finalization queue, and a breadcrumb of the field currently being
/// processed for error context.
#[derive(Debug)]
pub struct CodecContext {
    /// Resolved byte order for this call.
    pub endian: Endian,
    /// Whether record fields carry self-describing length prefixes.
    pub auto_length: bool,
    /// Whether record-typed fields skip the auto-length prefix.
    pub ignore_record_auto_length: bool,
    /// Resolved text encoding for string payloads.
    pub text_encoding: TextEncoding,
    finalizers: Vec<Finalizer>,
    field_path: Vec<String>,
}

impl CodecContext {
    /// Derives a fresh context from the shared configuration.
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            endian: config.endian,
            auto_length: config.auto_length,
            ignore_record_auto_length: config.ignore_record_auto_length,
            text_encoding: config.text_encoding,
            finalizers: Vec::new(),
            field_path: Vec::new(),
        }
    }

    /// Enqueues a deferred operation.
    pub fn enqueue(&mut self, finalizer: Finalizer) {
        self.finalizers.push(finalizer);
    }

    /// Runs all queued finalizers in FIFO order, draining the queue.
    pub fn run_finalizers(&mut self, buf: &mut ByteCursorBuffer) -> Result<()> {
        for finalizer in self.finalizers.drain(..) {
            match finalizer {
                Finalizer::PatchHeadU32 { from_end, include_length_field } => {
                    let mut total = buf.total_len();
                    if !include_length_field {
                        total -= LENGTH_FIELD_SIZE;
                    }
                    buf.patch_head_u32(from_end, total as u32)?;
                }
            }
        }
        Ok(())
    }

    /// Pushes a field name onto the processing breadcrumb.
    pub fn push_field(&mut self, name: &str) {
        self.field_path.push(name.to_owned());
    }

    /// Pops the innermost field name off the breadcrumb.
    pub fn pop_field(&mut self) {
        self.field_path.pop();
    }

    /// Dotted path of the field currently being processed, for error context.
    pub fn field_path(&self) -> String {
        self.field_path.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_finalizer_counts_all_sections() {
        let config = CodecConfig::default();
        let mut ctx = CodecContext::new(&config);
        let mut buf = ByteCursorBuffer::new(ctx.endian);

        buf.prepend_head(&[0u8; 4]);
        ctx.enqueue(Finalizer::PatchHeadU32 { from_end: 4, include_length_field: true });
        buf.write_bytes(b"12345678");
        buf.prepend_head(&[0xAA, 0xBB]);

        ctx.run_finalizers(&mut buf).unwrap();
        let bytes = buf.into_bytes();
        // 2 + 4 head + 8 body, length patched behind the later prefix
        assert_eq!(Endian::Big.read_u32(&bytes[2..6]), 14);
    }

    #[test]
    fn test_patch_finalizer_body_only_excludes_field() {
        let config = CodecConfig::default();
        let mut ctx = CodecContext::new(&config);
        let mut buf = ByteCursorBuffer::new(ctx.endian);

        buf.prepend_head(&[0u8; 4]);
        ctx.enqueue(Finalizer::PatchHeadU32 { from_end: 4, include_length_field: false });
        buf.write_bytes(b"1234");

        ctx.run_finalizers(&mut buf).unwrap();
        let bytes = buf.into_bytes();
        assert_eq!(Endian::Big.read_u32(&bytes[..4]), 4);
    }

    #[test]
    fn test_field_breadcrumb() {
        let mut ctx = CodecContext::new(&CodecConfig::default());
        ctx.push_field("outer");
        ctx.push_field("inner");
        assert_eq!(ctx.field_path(), "outer.inner");
        ctx.pop_field();
        assert_eq!(ctx.field_path(), "outer");
    }
}
