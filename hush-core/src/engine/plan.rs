//! Fixed-stride chunk partitioning.
//!
//! The plan splits `[0, len)` into spans of nominal length
//! `L = floor(len / chunk_count)`. The final span absorbs the division
//! remainder, so it may be up to `L - 1` samples longer than the others.
//! Spans are disjoint and cover every index exactly once.

use crate::error::{HushError, Result};

/// A contiguous span of a sample buffer: `(offset, length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

/// Iterator over the chunk spans of one buffer.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    buffer_len: usize,
    stride: usize,
    total: usize,
    next: usize,
}

impl ChunkPlan {
    /// Plan the partition of a `buffer_len`-sample buffer into roughly
    /// `chunk_count` chunks.
    ///
    /// An empty buffer yields an empty plan. A non-empty buffer shorter than
    /// `chunk_count` would floor the stride to zero, which is rejected as
    /// `InvalidParameters` rather than silently producing zero-length chunks.
    pub fn new(buffer_len: usize, chunk_count: usize) -> Result<Self> {
        if chunk_count == 0 {
            return Err(HushError::InvalidParameters(
                "chunk count must be at least 1".into(),
            ));
        }
        if buffer_len == 0 {
            return Ok(Self {
                buffer_len: 0,
                stride: 0,
                total: 0,
                next: 0,
            });
        }
        let stride = buffer_len / chunk_count;
        if stride == 0 {
            return Err(HushError::InvalidParameters(format!(
                "buffer of {buffer_len} samples cannot be split into {chunk_count} chunks"
            )));
        }
        Ok(Self {
            buffer_len,
            stride,
            total: buffer_len / stride,
            next: 0,
        })
    }

    /// Total number of chunks this plan will yield.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Nominal chunk length (the final chunk may be longer).
    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl Iterator for ChunkPlan {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.next >= self.total {
            return None;
        }
        let offset = self.next * self.stride;
        let len = if self.next + 1 == self.total {
            // Final chunk absorbs the remainder
            self.buffer_len - offset
        } else {
            self.stride
        };
        self.next += 1;
        Some(Span { offset, len })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkPlan {}
