//! Capability traits shared by every batch iterator in this crate.
//!
//! The three capabilities are independent: an iterator that can be
//! stopped early implements [`StopIter`] next to [`Iter`], and one that can
//! fail implements [`ErrIter`] as well. Callers ask for exactly what they
//! use, e.g. `I: Iter<Item = Vec<T>> + StopIter`.

use crate::Result;

/// Pull-style iteration over a sequence of values.
pub trait Iter {
    type Item;

    /// Returns the next value, or `None` once the iteration is over.
    /// Once `None` is returned, all subsequent calls return `None`.
    fn next(&mut self) -> Option<Self::Item>;
}

/// An iterator that may be abandoned before it is exhausted.
pub trait StopIter {
    /// Signals that the iterator will no longer be consumed.
    ///
    /// May be called any number of times, from any thread; only the first
    /// call has an effect. After it, `next` returns `None`.
    fn stop(&self);
}

/// An iterator whose underlying source can fail.
pub trait ErrIter {
    /// Reports the error that ended the iteration, if any.
    ///
    /// Meant to be called once `next` has returned `None`; implementations
    /// may block until the outcome is known. Early stops are not errors.
    fn err(&self) -> Result<()>;
}

impl<I: Iter + ?Sized> Iter for &mut I {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        (**self).next()
    }
}

/// Adapts any [`Iter`] into a [`std::iter::Iterator`].
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
}

impl<I: Iter> Batches<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Iter> std::iter::Iterator for Batches<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<I: Iter> std::iter::FusedIterator for Batches<I> {}

/// Drains an iterator of batches into a single flat `Vec`.
pub fn batch_to_vec<I, B, T>(mut it: I) -> Vec<T>
where
    I: Iter<Item = B>,
    B: IntoIterator<Item = T>,
{
    let mut items = Vec::new();
    while let Some(batch) = it.next() {
        items.extend(batch);
    }
    items
}

#[cfg(test)]
mod test {
    use super::*;

    struct Countdown(u32);

    impl Iter for Countdown {
        type Item = Vec<u32>;

        fn next(&mut self) -> Option<Vec<u32>> {
            if self.0 == 0 {
                return None;
            }
            self.0 -= 1;
            Some(vec![self.0])
        }
    }

    #[test]
    fn test_batch_to_vec() {
        assert_eq!(batch_to_vec(Countdown(3)), vec![2, 1, 0]);
        assert!(batch_to_vec(Countdown(0)).is_empty());
    }

    #[test]
    fn test_batches_as_std_iterator() {
        let lens: Vec<usize> = Batches::new(Countdown(4)).map(|b| b.len()).collect();
        assert_eq!(lens, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_batches_into_inner_keeps_position() {
        let mut batches = Batches::new(Countdown(3));
        assert_eq!(batches.next(), Some(vec![2]));

        let mut countdown = batches.into_inner();
        assert_eq!(countdown.next(), Some(vec![1]));
    }

    #[test]
    fn test_iter_through_mut_ref() {
        let mut countdown = Countdown(2);
        assert_eq!((&mut countdown).next(), Some(vec![1]));
        assert_eq!(batch_to_vec(&mut countdown), vec![0]);
    }
}
