use std::sync::Arc;
use std::thread;

use anyhow::Result;
use batch_iter::source::{from_fn, BatchFn};
use batch_iter::{
    batch_to_vec, AdapterConfig, BatchAdapter, BatchIterError, Batches, ErrIter, Iter, SliceBatcher,
    StopIter, VecSource,
};
use futures::StreamExt;

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: i64,
}

fn users(n: i64) -> Vec<User> {
    (0..n)
        .map(|i| User {
            name: i.to_string(),
            age: i,
        })
        .collect()
}

/// Drains any stoppable, fallible batch iterator, giving up after `limit` items.
fn take_up_to<I, T>(mut it: I, limit: usize) -> batch_iter::Result<Vec<T>>
where
    I: Iter<Item = Vec<T>> + StopIter + ErrIter,
{
    let mut out = Vec::new();
    while let Some(batch) = it.next() {
        out.extend(batch);
        if out.len() >= limit {
            it.stop();
            break;
        }
    }
    it.err()?;
    Ok(out)
}

#[test]
fn test_adapter_round_trip() -> Result<()> {
    let want = users(2000);
    let it = BatchAdapter::new(VecSource::new(want.clone()), 1 << 10)?;

    let got = batch_to_vec(&it);
    it.err()?;

    assert_eq!(got.len(), want.len());
    assert_eq!(got, want);
    Ok(())
}

#[test]
fn test_generic_consumer_stops_early() -> Result<()> {
    let it = BatchAdapter::new(VecSource::new(users(500)), 64)?;
    let got = take_up_to(it, 100)?;

    // Two batches of 64 cross the limit.
    assert_eq!(got.len(), 128);
    assert_eq!(got[127].age, 127);
    Ok(())
}

#[test]
fn test_generic_consumer_sees_source_error() -> Result<()> {
    #[derive(thiserror::Error, Debug)]
    #[error("connection reset")]
    struct ConnectionReset;

    let source = from_fn(|batch_size: usize, f: &mut BatchFn<'_, User>| {
        f(&users(batch_size as i64))?;
        Err(BatchIterError::from_source(ConnectionReset))
    });
    let it = BatchAdapter::new(source, 8)?;

    let err = take_up_to(it, 1000).unwrap_err();
    assert!(err.downcast_source::<ConnectionReset>().is_some());
    assert_eq!(err.to_string(), "Source error: connection reset");
    Ok(())
}

#[test]
fn test_stop_from_another_thread() -> Result<()> {
    let config = AdapterConfig::default().with_batch_size(10);
    let it = Arc::new(BatchAdapter::with_config(
        VecSource::new(users(100_000)),
        config,
    )?);

    let consumer = thread::spawn({
        let it = it.clone();
        move || Batches::new(&*it).count()
    });

    while it.try_err().is_none() && !consumer.is_finished() {
        it.stop();
        thread::yield_now();
    }

    let batches = consumer.join().expect("consumer panicked");
    assert!(batches < 10_000);
    it.err()?;
    Ok(())
}

#[test]
fn test_slice_batcher_matches_adapter() -> Result<()> {
    let data = users(37);

    let from_slice: Vec<usize> = Batches::new(SliceBatcher::new(&data, 5)?).map(<[User]>::len).collect();
    let from_adapter: Vec<usize> = Batches::new(BatchAdapter::new(VecSource::new(data.clone()), 5)?)
        .map(|b| b.len())
        .collect();

    assert_eq!(from_slice, from_adapter);
    assert_eq!(from_slice.iter().sum::<usize>(), 37);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_adapter_as_stream() -> Result<()> {
    let it = BatchAdapter::new(VecSource::new(users(2000)), 1 << 10)?;

    let lens: Vec<usize> = it.into_stream().map(|batch| batch.len()).collect().await;

    assert_eq!(lens, vec![1024, 976]);
    Ok(())
}
