//! # batch-iter
//!
//! `batch-iter` provides pull-style iteration over data that arrives in
//! batches, including sources that only offer a push-style API.
//!
//! ## Features
//!
//! - Small capability traits: [`Iter`] (`next`), [`StopIter`] (`stop`)
//!   and [`ErrIter`] (`err`).
//! - [`BatchAdapter`] turns a [`BatchSource`], which drives its own fetch
//!   loop and calls back once per batch, into a pull iterator. Batches are
//!   delivered in order, nothing is fetched ahead of the consumer, and the
//!   source's terminal error is reported exactly once through `err`.
//! - [`SliceBatcher`] chunks an in-memory slice without copying.
//! - Blocking and async consumption: `next`/`err` block the caller,
//!   `next_async`/`err_async`/`into_stream` integrate with async code.
//!
//! ## Usage
//!
//! 1. Implement [`BatchSource`] for your store, or use [`VecSource`] /
//!    [`source::from_fn`].
//! 2. Create a [`BatchAdapter`] with a batch size.
//! 3. Call `next` until it returns `None`, calling `stop` to bail out early.
//! 4. Call `err` to learn whether the source failed.
//!
//! ### Example
//!
//! ```
//! use batch_iter::{BatchAdapter, Iter, VecSource};
//!
//! let source = VecSource::new((0..10).collect::<Vec<u32>>());
//! let mut it = BatchAdapter::new(source, 4).unwrap();
//!
//! let mut total = 0;
//! while let Some(batch) = it.next() {
//!     total += batch.len();
//!     if total >= 8 {
//!         it.stop();
//!     }
//! }
//! assert_eq!(total, 8);
//! assert!(it.err().is_ok());
//! ```
//!
//! ## Modules
//!
//! - `iter`: capability traits and helpers shared by all iterators.
//! - `source`: the push-style `BatchSource` contract and ready-made sources.
//! - `adapter`: the concurrent push-to-pull adapter.
//! - `slice_batcher`: synchronous batching over a slice.

pub mod adapter;
pub mod config;
pub mod error;
pub mod iter;
pub mod slice_batcher;
pub mod source;

mod stop_signal;

pub use adapter::BatchAdapter;
pub use config::AdapterConfig;
pub use error::{BatchIterError, Result};
pub use iter::{batch_to_vec, Batches, ErrIter, Iter, StopIter};
pub use slice_batcher::SliceBatcher;
pub use source::{BatchSource, VecSource};
