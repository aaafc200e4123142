//! Fixed-capacity line buffers for the emitters.
//!
//! A [`LineBuffer`] lives on the caller's stack, accepts formatted output
//! through [`std::fmt::Write`], and silently truncates instead of failing or
//! growing. Its reported length is always the number of bytes actually
//! stored, so `capacity - len` arithmetic stays truthful under truncation.
//! The last byte of the backing array is reserved so a terminating newline
//! can always be appended.

use std::{cmp, fmt};

/// Capacity of the standard record buffer. The emergency and hex-dump
/// emitters use 4x and 8x this size.
pub const LOG_MAX_LEN: usize = 256;

pub struct LineBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    pub fn new() -> LineBuffer<N> {
        LineBuffer {
            buf: [0u8; N],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writable space left, not counting the reserved newline slot.
    pub fn remaining(&self) -> usize {
        (N - 1).saturating_sub(self.len)
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Appends the terminating newline. The reserved slot guarantees this
    /// fits even when the buffer is full.
    pub fn push_newline(&mut self) {
        self.buf[self.len] = b'\n';
        self.len += 1;
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for LineBuffer<N> {
    /// Byte-wise truncating write. A payload crossing the capacity is cut at
    /// the buffer end; the result is reported as success so formatting of a
    /// record never aborts halfway.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let take = cmp::min(self.remaining(), s.len());
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}
