use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One-shot broadcast cancellation shared by an adapter and its worker.
///
/// `finished` gates the close: whichever caller flips it from `false` to
/// `true` cancels the token, every other caller returns untouched.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    finished: AtomicBool,
    token: CancellationToken,
}

impl StopSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for the single call that closed the signal.
    pub(crate) fn stop(&self) -> bool {
        loop {
            let finished = self.finished.load(Ordering::Acquire);
            if finished {
                return false;
            }

            if self
                .finished
                .compare_exchange_weak(finished, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                debug!("batch iterator stop requested");
                self.token.cancel();
                return true;
            }
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has been closed.
    pub(crate) async fn stopped(&self) {
        self.token.cancelled().await
    }
}
