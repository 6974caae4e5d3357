//! Deferred total-length patch-back stage.

use framewire_core::constants::LENGTH_FIELD_SIZE;
use framewire_core::{
    ByteCursorBuffer, CodecContext, CodecError, Finalizer, LengthPolicy, Result,
};

use super::Wrapper;

/// Reserves a 4-byte length placeholder ahead of the payload at encode time
/// and enqueues a finalizer that patches in the real total once the body and
/// every transform stage's output are in place.
///
/// The placeholder offset travels through the finalization queue, not through
/// stage fields: a single stage instance serves concurrent calls.
pub struct TotalLength {
    policy: LengthPolicy,
}

impl TotalLength {
    /// Creates the stage for the given counting policy.
    pub fn new(policy: LengthPolicy) -> Self {
        Self { policy }
    }
}

impl Wrapper for TotalLength {
    fn name(&self) -> &'static str {
        "total-length"
    }

    fn before_encode(&self, buf: &mut ByteCursorBuffer, ctx: &mut CodecContext) -> Result<()> {
        match self.policy {
            LengthPolicy::None | LengthPolicy::Auto => Ok(()),
            LengthPolicy::BodyOnly | LengthPolicy::HeaderAndBody => {
                buf.prepend_head(&[0u8; LENGTH_FIELD_SIZE]);
                ctx.enqueue(Finalizer::PatchHeadU32 {
                    from_end: buf.head_len(),
                    include_length_field: self.policy == LengthPolicy::HeaderAndBody,
                });
                Ok(())
            }
        }
    }

    fn before_decode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        match self.policy {
            LengthPolicy::None | LengthPolicy::Auto => Ok(()),
            LengthPolicy::BodyOnly | LengthPolicy::HeaderAndBody => {
                // Read eagerly as part of header parsing; length validation
                // against a bound belongs to the stream frame decoder, which
                // delimits the payload before the codec ever sees it.
                buf.read_u32().map_err(|_| {
                    CodecError::Framing("payload too short for total-length field".into())
                })?;
                Ok(())
            }
        }
    }
}
