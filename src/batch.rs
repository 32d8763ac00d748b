//! Fixed-size batch partitioning.

use std::num::NonZeroUsize;

/// Default number of rows sent per transaction.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(size) => size,
    None => unreachable!(),
};

/// A contiguous window of the input, `rows == input[start..end]`.
#[derive(Debug, PartialEq, Eq)]
pub struct Batch<'a, T> {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub rows: &'a [T],
}

// Manual impls: the derives would needlessly require `T: Copy`, but the
// struct only holds a shared slice.
impl<T> Clone for Batch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Batch<'_, T> {}

impl<'a, T> Batch<'a, T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; empty batches are never produced.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Number of batches `n` rows split into: `ceil(n / size)`.
pub fn batch_count(n: usize, size: NonZeroUsize) -> usize {
    n.div_ceil(size.get())
}

/// Split `rows` into consecutive batches of `size`; the last may be shorter.
///
/// Lazy and order-preserving. Zero rows give zero batches.
pub fn partition<T>(rows: &[T], size: NonZeroUsize) -> Batches<'_, T> {
    Batches {
        chunks: rows.chunks(size.get()),
        size: size.get(),
        index: 0,
        remaining: batch_count(rows.len(), size),
    }
}

/// Iterator returned by [`partition`].
#[derive(Debug, Clone)]
pub struct Batches<'a, T> {
    chunks: std::slice::Chunks<'a, T>,
    size: usize,
    index: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = Batch<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.chunks.next()?;
        let start = self.index * self.size;
        let batch = Batch {
            index: self.index,
            start,
            end: start + rows.len(),
            rows,
        };
        self.index += 1;
        self.remaining -= 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}
