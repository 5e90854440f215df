use crate::config::validate_batch_size;
use crate::iter::Iter;
use crate::Result;

/// Batch iterator over a borrowed slice.
///
/// Batches are sub-slices of the input; nothing is copied.
///
/// ```
/// use batch_iter::{Iter, SliceBatcher};
///
/// let data = [1, 2, 3, 4, 5];
/// let mut it = SliceBatcher::new(&data, 2).unwrap();
/// while let Some(batch) = it.next() {
///     assert!(batch.len() <= 2);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SliceBatcher<'a, T> {
    items: &'a [T],
    batch_size: usize,
    cursor: usize,
}

impl<'a, T> SliceBatcher<'a, T> {
    pub fn new(items: &'a [T], batch_size: usize) -> Result<Self> {
        validate_batch_size(batch_size)?;
        Ok(Self {
            items,
            batch_size,
            cursor: 0,
        })
    }

    /// Number of items not yet handed out
    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }
}

impl<'a, T> Iter for SliceBatcher<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        if self.cursor >= self.items.len() {
            return None;
        }
        let end = self.cursor.saturating_add(self.batch_size).min(self.items.len());
        let batch = &self.items[self.cursor..end];
        self.cursor = end;
        Some(batch)
    }
}
