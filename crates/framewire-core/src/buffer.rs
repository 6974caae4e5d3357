use crate::config::Endian;
use crate::error::{CodecError, Result};

/// Growable byte buffer with an independently movable write cursor, a marked
/// read cursor, and a head side section.
///
/// The logical byte stream on finalization is `head ++ body`. Transform
/// stages prepend framing prefixes to the head and rewrite the body in
/// place; the object serializer only ever appends to the body. Growth is
/// amortized O(1) via `Vec`.
///
/// Writes issued after a [`seek`](ByteCursorBuffer::seek) overwrite already
/// written bytes without moving the append position backward, which is how
/// deferred length patch-back works.
#[derive(Debug)]
pub struct ByteCursorBuffer {
    body: Vec<u8>,
    write_pos: usize,
    read_pos: usize,
    read_mark: usize,
    head: Vec<u8>,
    endian: Endian,
}

impl ByteCursorBuffer {
    /// Creates an empty buffer for encoding.
    pub fn new(endian: Endian) -> Self {
        Self {
            body: Vec::new(),
            write_pos: 0,
            read_pos: 0,
            read_mark: 0,
            head: Vec::new(),
            endian,
        }
    }

    /// Creates a buffer over received bytes for decoding.
    pub fn from_bytes(bytes: Vec<u8>, endian: Endian) -> Self {
        let write_pos = bytes.len();
        Self {
            body: bytes,
            write_pos,
            read_pos: 0,
            read_mark: 0,
            head: Vec::new(),
            endian,
        }
    }

    /// Byte order applied to multi-byte reads and writes.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current write cursor position within the body.
    pub fn position(&self) -> usize {
        self.write_pos
    }

    /// Number of bytes in the body section.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Total finalized length: head + body.
    pub fn total_len(&self) -> usize {
        self.head.len() + self.body.len()
    }

    // ---- write side ----------------------------------------------------

    /// Repositions the write cursor without truncating written bytes.
    ///
    /// Positions past the end of the body clamp to the end.
    pub fn seek(&mut self, pos: usize) {
        self.write_pos = pos.min(self.body.len());
    }

    /// Moves the write cursor back to the append position.
    pub fn seek_end(&mut self) {
        self.write_pos = self.body.len();
    }

    /// Writes raw bytes at the write cursor.
    ///
    /// Overwrites in place when the cursor sits inside already-written bytes
    /// and appends once it reaches the end; the append position never moves
    /// backward.
    pub fn write_bytes(&mut self, src: &[u8]) {
        let in_place = (self.body.len() - self.write_pos).min(src.len());
        if in_place > 0 {
            self.body[self.write_pos..self.write_pos + in_place]
                .copy_from_slice(&src[..in_place]);
        }
        if in_place < src.len() {
            self.body.extend_from_slice(&src[in_place..]);
        }
        self.write_pos += src.len();
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    /// Writes a single signed byte.
    pub fn write_i8(&mut self, v: i8) {
        self.write_bytes(&[v as u8]);
    }

    /// Writes a bool as one byte (1 = true, 0 = false).
    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    /// Writes a u16 in the configured byte order.
    pub fn write_u16(&mut self, v: u16) {
        let mut tmp = [0u8; 2];
        self.endian.write_u16(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes a u32 in the configured byte order.
    pub fn write_u32(&mut self, v: u32) {
        let mut tmp = [0u8; 4];
        self.endian.write_u32(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes a u64 in the configured byte order.
    pub fn write_u64(&mut self, v: u64) {
        let mut tmp = [0u8; 8];
        self.endian.write_u64(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes an i16 in the configured byte order.
    pub fn write_i16(&mut self, v: i16) {
        let mut tmp = [0u8; 2];
        self.endian.write_i16(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes an i32 in the configured byte order.
    pub fn write_i32(&mut self, v: i32) {
        let mut tmp = [0u8; 4];
        self.endian.write_i32(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes an i64 in the configured byte order.
    pub fn write_i64(&mut self, v: i64) {
        let mut tmp = [0u8; 8];
        self.endian.write_i64(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes an f32 in the configured byte order.
    pub fn write_f32(&mut self, v: f32) {
        let mut tmp = [0u8; 4];
        self.endian.write_f32(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    /// Writes an f64 in the configured byte order.
    pub fn write_f64(&mut self, v: f64) {
        let mut tmp = [0u8; 8];
        self.endian.write_f64(&mut tmp, v);
        self.write_bytes(&tmp);
    }

    // ---- read side -----------------------------------------------------

    /// Bytes remaining between the read cursor and the end of the body.
    pub fn remaining(&self) -> usize {
        self.body.len() - self.read_pos
    }

    /// Marks the current read position so it can be restored with
    /// [`reset`](ByteCursorBuffer::reset).
    pub fn mark(&mut self) {
        self.read_mark = self.read_pos;
    }

    /// Restores the read position saved by [`mark`](ByteCursorBuffer::mark).
    pub fn reset(&mut self) {
        self.read_pos = self.read_mark;
    }

    /// Reads exactly `n` bytes, advancing the read cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(CodecError::Underflow {
                needed: n,
                available: self.remaining(),
                offset: self.read_pos,
            });
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.body[start..self.read_pos])
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a single signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads a bool encoded as one byte (non-zero = true).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads a u16 in the configured byte order.
    pub fn read_u16(&mut self) -> Result<u16> {
        let endian = self.endian;
        Ok(endian.read_u16(self.read_bytes(2)?))
    }

    /// Reads a u32 in the configured byte order.
    pub fn read_u32(&mut self) -> Result<u32> {
        let endian = self.endian;
        Ok(endian.read_u32(self.read_bytes(4)?))
    }

    /// Reads a u64 in the configured byte order.
    pub fn read_u64(&mut self) -> Result<u64> {
        let endian = self.endian;
        Ok(endian.read_u64(self.read_bytes(8)?))
    }

    /// Reads an i16 in the configured byte order.
    pub fn read_i16(&mut self) -> Result<i16> {
        let endian = self.endian;
        Ok(endian.read_i16(self.read_bytes(2)?))
    }

    /// Reads an i32 in the configured byte order.
    pub fn read_i32(&mut self) -> Result<i32> {
        let endian = self.endian;
        Ok(endian.read_i32(self.read_bytes(4)?))
    }

    /// Reads an i64 in the configured byte order.
    pub fn read_i64(&mut self) -> Result<i64> {
        let endian = self.endian;
        Ok(endian.read_i64(self.read_bytes(8)?))
    }

    /// Reads an f32 in the configured byte order.
    pub fn read_f32(&mut self) -> Result<f32> {
        let endian = self.endian;
        Ok(endian.read_f32(self.read_bytes(4)?))
    }

    /// Reads an f64 in the configured byte order.
    pub fn read_f64(&mut self) -> Result<f64> {
        let endian = self.endian;
        Ok(endian.read_f64(self.read_bytes(8)?))
    }

    /// Clamps a declared length to what is actually available.
    ///
    /// Negative lengths clamp to 0 and over-long lengths clamp to the
    /// remaining byte count: the decoder favors degraded-but-safe output over
    /// faulting on malformed length fields.
    pub fn clamp_len(&self, declared: i64) -> usize {
        if declared <= 0 {
            0
        } else {
            (declared as usize).min(self.remaining())
        }
    }

    // ---- head section --------------------------------------------------

    /// Prepends bytes to the head section.
    ///
    /// Prepend semantics matter: the wrapper chain walks head-to-tail on
    /// encode and tail-to-head on decode, so each stage's prefix must land in
    /// front of prefixes written by stages that ran before it.
    pub fn prepend_head(&mut self, bytes: &[u8]) {
        self.head.splice(0..0, bytes.iter().copied());
    }

    /// Number of bytes currently in the head section.
    pub fn head_len(&self) -> usize {
        self.head.len()
    }

    /// Overwrites a u32 inside the head section, addressed backward from the
    /// head's end so that later prepends cannot shift the target.
    pub fn patch_head_u32(&mut self, from_end: usize, value: u32) -> Result<()> {
        if from_end < 4 || from_end > self.head.len() {
            return Err(CodecError::Framing(format!(
                "head patch offset {from_end} out of range (head is {} bytes)",
                self.head.len()
            )));
        }
        let start = self.head.len() - from_end;
        let mut tmp = [0u8; 4];
        self.endian.write_u32(&mut tmp, value);
        self.head[start..start + 4].copy_from_slice(&tmp);
        Ok(())
    }

    // ---- body surgery for transform stages -----------------------------

    /// The unconsumed window of the body: everything past the read cursor.
    pub fn window(&self) -> &[u8] {
        &self.body[self.read_pos..]
    }

    /// Removes and returns the unconsumed window, leaving consumed bytes in
    /// place.
    pub fn take_window(&mut self) -> Vec<u8> {
        let taken = self.body.split_off(self.read_pos);
        self.write_pos = self.write_pos.min(self.body.len());
        taken
    }

    /// Replaces the unconsumed window with new bytes.
    pub fn replace_window(&mut self, bytes: Vec<u8>) {
        self.body.truncate(self.read_pos);
        self.body.extend_from_slice(&bytes);
        self.write_pos = self.body.len();
    }

    /// Splits the last `n` bytes off the end of the body and returns them.
    pub fn split_off_end(&mut self, n: usize) -> Result<Vec<u8>> {
        if self.remaining() < n {
            return Err(CodecError::Underflow {
                needed: n,
                available: self.remaining(),
                offset: self.read_pos,
            });
        }
        let split = self.body.split_off(self.body.len() - n);
        self.write_pos = self.write_pos.min(self.body.len());
        Ok(split)
    }

    /// Finalizes the buffer into the logical stream `head ++ body`.
    pub fn into_bytes(self) -> Vec<u8> {
        if self.head.is_empty() {
            return self.body;
        }
        let mut out = Vec::with_capacity(self.total_len());
        out.extend_from_slice(&self.head);
        out.extend_from_slice(&self.body);
        out
    }
}
