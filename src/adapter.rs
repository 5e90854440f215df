//! Pull-style iteration over push-style batch sources.
//!
//! A [`BatchSource`] wants to run its own loop and call us back once per
//! batch. [`BatchAdapter`] runs that loop on a dedicated worker thread and
//! parks the worker inside each callback until a consumer asks for the
//! batch, so the source behaves like a generator: nothing is fetched ahead
//! of the consumer, and a stopped consumer unwinds the source at its next
//! callback.
//!
//! The consumer and the worker meet on three channels:
//! - a request channel carrying a fresh `oneshot` reply slot per `next`;
//! - a stop signal (atomic flag plus broadcast cancellation);
//! - a `watch` slot the worker writes its terminal outcome into, once.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use futures::executor::block_on;
use futures::Stream;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, debug_span, error, trace, warn};

use crate::config::AdapterConfig;
use crate::iter::{ErrIter, Iter, StopIter};
use crate::source::BatchSource;
use crate::stop_signal::StopSignal;
use crate::{BatchIterError, Result};

type Reply<T> = oneshot::Sender<Vec<T>>;

/// Terminal outcome of the worker; `None` until the source has finished.
type Outcome = Option<Result<()>>;

/// Concurrent adapter exposing a [`BatchSource`] as a pull iterator.
///
/// ```
/// use batch_iter::{BatchAdapter, Iter, VecSource};
///
/// let mut it = BatchAdapter::new(VecSource::new((0..2000).collect::<Vec<u32>>()), 1024).unwrap();
/// assert_eq!(it.next().map(|b| b.len()), Some(1024));
/// assert_eq!(it.next().map(|b| b.len()), Some(976));
/// assert_eq!(it.next(), None);
/// assert!(it.err().is_ok());
/// ```
///
/// The blocking methods ([`Iter::next`], [`BatchAdapter::err`]) park the
/// calling thread; from async code use [`BatchAdapter::next_async`],
/// [`BatchAdapter::err_async`] or [`BatchAdapter::into_stream`].
///
/// Dropping the adapter stops it.
#[derive(Debug)]
pub struct BatchAdapter<T> {
    batch_size: usize,
    requests: mpsc::Sender<Reply<T>>,
    signal: Arc<StopSignal>,
    outcome: watch::Receiver<Outcome>,
}

impl<T> BatchAdapter<T>
where
    T: Clone + Send + 'static,
{
    /// Start iterating `source` in batches of at most `batch_size` items.
    pub fn new<S>(source: S, batch_size: usize) -> Result<Self>
    where
        S: BatchSource<T> + Send + 'static,
    {
        Self::with_config(source, AdapterConfig::default().with_batch_size(batch_size))
    }

    pub fn with_config<S>(source: S, config: AdapterConfig) -> Result<Self>
    where
        S: BatchSource<T> + Send + 'static,
    {
        config.validate()?;

        let (requests, request_rx) = mpsc::channel(1);
        let (outcome_tx, outcome) = watch::channel(None);
        let signal = Arc::new(StopSignal::new());

        let worker = Worker {
            source,
            batch_size: config.batch_size,
            requests: request_rx,
            signal: signal.clone(),
            outcome: outcome_tx,
        };

        let span = debug_span!("batch_worker", name = %config.worker_name);
        thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || {
                let _entered = span.enter();
                worker.run();
            })
            .map_err(|e| {
                BatchIterError::Worker(format!(
                    "failed to spawn worker {}: {}",
                    config.worker_name, e
                ))
            })?;

        Ok(Self {
            batch_size: config.batch_size,
            requests,
            signal,
            outcome,
        })
    }
}

impl<T> BatchAdapter<T> {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Async form of [`Iter::next`].
    ///
    /// If this future is dropped while waiting, the batch it asked for is
    /// kept by the worker for the next request.
    pub async fn next_async(&self) -> Option<Vec<T>> {
        if self.signal.is_stopped() {
            return None;
        }

        let (reply, mut batch) = oneshot::channel();
        tokio::select! {
            biased;
            _ = self.signal.stopped() => return None,
            sent = self.requests.send(reply) => {
                if sent.is_err() {
                    return None;
                }
            }
        }

        // A batch the worker already committed wins over a concurrent stop.
        tokio::select! {
            biased;
            rows = &mut batch => rows.ok(),
            _ = self.signal.stopped() => None,
        }
    }

    /// Stop the iteration. Idempotent and safe to call from any thread.
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// The error that ended the iteration, blocking until it is known.
    ///
    /// `Ok(())` both for exhaustion and for a requested stop.
    pub fn err(&self) -> Result<()> {
        block_on(self.err_async())
    }

    /// Async form of [`BatchAdapter::err`].
    pub async fn err_async(&self) -> Result<()> {
        let mut outcome = self.outcome.clone();
        match outcome.wait_for(Option::is_some).await {
            Ok(settled) => settled.clone().unwrap_or(Ok(())),
            Err(_) => Err(BatchIterError::Worker(
                "worker exited without reporting an outcome".to_string(),
            )),
        }
    }

    /// Non-blocking [`BatchAdapter::err`]: `None` while the worker is still running.
    pub fn try_err(&self) -> Option<Result<()>> {
        self.outcome.borrow().clone()
    }

    /// Consume the adapter as a stream of batches. Dropping the stream stops
    /// the adapter.
    pub fn into_stream(self) -> impl Stream<Item = Vec<T>> {
        futures::stream::unfold(self, |adapter| async move {
            let batch = adapter.next_async().await?;
            Some((batch, adapter))
        })
    }
}

impl<T> Drop for BatchAdapter<T> {
    fn drop(&mut self) {
        self.signal.stop();
    }
}

impl<T> Iter for BatchAdapter<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        block_on(self.next_async())
    }
}

impl<T> Iter for &BatchAdapter<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        block_on(self.next_async())
    }
}

impl<T> StopIter for BatchAdapter<T> {
    fn stop(&self) {
        BatchAdapter::stop(self)
    }
}

impl<T> StopIter for &BatchAdapter<T> {
    fn stop(&self) {
        BatchAdapter::stop(*self)
    }
}

impl<T> ErrIter for BatchAdapter<T> {
    fn err(&self) -> Result<()> {
        BatchAdapter::err(self)
    }
}

impl<T> ErrIter for &BatchAdapter<T> {
    fn err(&self) -> Result<()> {
        BatchAdapter::err(*self)
    }
}

/// The producer side: owns the source and drives it to completion.
struct Worker<S, T> {
    source: S,
    batch_size: usize,
    requests: mpsc::Receiver<Reply<T>>,
    signal: Arc<StopSignal>,
    outcome: watch::Sender<Outcome>,
}

impl<S, T> Worker<S, T>
where
    S: BatchSource<T>,
    T: Clone,
{
    fn run(self) {
        let Worker {
            mut source,
            batch_size,
            mut requests,
            signal,
            outcome,
        } = self;

        debug!(batch_size, "batch worker started");

        let mut handed_off = 0usize;
        let drive = panic::catch_unwind(AssertUnwindSafe(|| {
            source.for_each_batch(batch_size, &mut |batch: &[T]| {
                // The source may reuse its buffer once we return.
                let rows = batch.to_vec();
                let len = rows.len();
                block_on(hand_off(&signal, &mut requests, rows))?;
                trace!(batch = handed_off, len, "batch handed off");
                handed_off += 1;
                Ok(())
            })
        }));

        let result = match drive {
            Ok(Ok(())) => {
                debug!(batches = handed_off, "batch source exhausted");
                Ok(())
            }
            Ok(Err(err)) if err.is_stop() => {
                debug!(batches = handed_off, "batch worker stopped");
                Ok(())
            }
            Ok(Err(err)) => {
                warn!(batches = handed_off, error = %err, "batch source failed");
                Err(err)
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(batches = handed_off, panic = %message, "batch source panicked");
                Err(BatchIterError::Worker(format!(
                    "batch source panicked: {message}"
                )))
            }
        };

        outcome.send_replace(Some(result));
        signal.stop();
        // Pending replies are dropped here, releasing any consumer still waiting.
        drop(requests);
    }
}

/// Park until a consumer asks for `rows` or the adapter is stopped.
async fn hand_off<T>(
    signal: &StopSignal,
    requests: &mut mpsc::Receiver<Reply<T>>,
    mut rows: Vec<T>,
) -> Result<()> {
    loop {
        tokio::select! {
            biased;
            _ = signal.stopped() => return Err(BatchIterError::Stopped),
            request = requests.recv() => {
                let Some(reply) = request else {
                    return Err(BatchIterError::Stopped);
                };
                match reply.send(rows) {
                    Ok(()) => return Ok(()),
                    Err(unclaimed) => {
                        trace!("batch request abandoned, holding batch for the next one");
                        rows = unclaimed;
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
