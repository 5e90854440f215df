//! Push-style batch sources.
//!
//! A [`BatchSource`] owns its fetch loop: it produces batches one after
//! another and hands each to a caller-supplied continuation, which decides
//! whether the loop goes on.

use crate::Result;

/// Continuation invoked by a [`BatchSource`] once per produced batch.
pub type BatchFn<'a, T> = dyn FnMut(&[T]) -> Result<()> + 'a;

/// A producer that drives its own fetch loop and pushes batches out.
///
/// Implementations must:
/// - call `f` once per batch, in order, with at most `batch_size` items;
/// - stop calling `f` as soon as it returns an error, and return that
///   error (or one wrapping it) from `for_each_batch`;
/// - return `Ok(())` once the data is exhausted.
///
/// The slice passed to `f` only needs to stay valid for the duration of
/// the call; sources are free to reuse their buffer afterwards.
pub trait BatchSource<T> {
    fn for_each_batch(&mut self, batch_size: usize, f: &mut BatchFn<'_, T>) -> Result<()>;
}

impl<T, S: BatchSource<T> + ?Sized> BatchSource<T> for Box<S> {
    fn for_each_batch(&mut self, batch_size: usize, f: &mut BatchFn<'_, T>) -> Result<()> {
        (**self).for_each_batch(batch_size, f)
    }
}

/// Source over an owned, in-memory sequence.
///
/// Batches are staged in a single reusable buffer, so every call of the
/// continuation sees the same backing storage refilled with new items.
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    items: Vec<T>,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> From<Vec<T>> for VecSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone> BatchSource<T> for VecSource<T> {
    fn for_each_batch(&mut self, batch_size: usize, f: &mut BatchFn<'_, T>) -> Result<()> {
        crate::config::validate_batch_size(batch_size)?;

        let mut buffer = Vec::with_capacity(batch_size.min(self.items.len()));
        for chunk in self.items.chunks(batch_size) {
            buffer.clear();
            buffer.extend_from_slice(chunk);
            f(&buffer)?;
        }
        Ok(())
    }
}

/// Source backed by a closure, see [`from_fn`].
pub struct FnSource<F> {
    drive: F,
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

impl<T, F> BatchSource<T> for FnSource<F>
where
    F: FnMut(usize, &mut BatchFn<'_, T>) -> Result<()>,
{
    fn for_each_batch(&mut self, batch_size: usize, f: &mut BatchFn<'_, T>) -> Result<()> {
        (self.drive)(batch_size, f)
    }
}

/// Turns a closure with the shape of [`BatchSource::for_each_batch`] into
/// a source.
///
/// ```
/// use batch_iter::source::{from_fn, BatchSource};
///
/// let mut source = from_fn(|batch_size: usize, f: &mut batch_iter::source::BatchFn<'_, u8>| {
///     let data = [1u8, 2, 3];
///     for chunk in data.chunks(batch_size) {
///         f(chunk)?;
///     }
///     Ok(())
/// });
///
/// let mut seen = Vec::new();
/// source.for_each_batch(2, &mut |batch: &[u8]| {
///     seen.push(batch.len());
///     Ok(())
/// }).unwrap();
/// assert_eq!(seen, vec![2, 1]);
/// ```
pub fn from_fn<T, F>(drive: F) -> FnSource<F>
where
    F: FnMut(usize, &mut BatchFn<'_, T>) -> Result<()>,
{
    FnSource { drive }
}

/// Source that fails with `err` once it has produced `batches_before` batches.
#[cfg(test)]
pub(crate) fn failing_after<T: Clone>(
    items: Vec<T>,
    batches_before: usize,
    err: crate::BatchIterError,
) -> impl BatchSource<T> {
    from_fn(move |batch_size: usize, f: &mut BatchFn<'_, T>| {
        for (i, chunk) in items.chunks(batch_size).enumerate() {
            if i == batches_before {
                return Err(err.clone());
            }
            f(chunk)?;
        }
        Ok(())
    })
}
