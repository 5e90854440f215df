use anyhow::Result;
use batch_iter::{AdapterConfig, BatchAdapter, Iter, VecSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing for logging, e.g. RUST_LOG=batch_iter=trace
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    info!("Starting drain example");

    let source = VecSource::new((0..2000).collect::<Vec<u64>>());
    let config = AdapterConfig::default()
        .with_batch_size(1 << 10)
        .with_worker_name("drain-demo");
    let mut it = BatchAdapter::with_config(source, config)?;

    let mut total = 0;
    while let Some(batch) = it.next() {
        total += batch.len();
        info!(
            len = batch.len(),
            first = batch.first().copied(),
            last = batch.last().copied(),
            "received batch"
        );
    }

    // Tells a clean end apart from a failed source.
    it.err()?;
    info!(total, "drained all items");

    Ok(())
}
