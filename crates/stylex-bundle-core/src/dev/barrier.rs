use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{Result, StylexError};

/// Counts module transforms in flight so stylesheet requests can wait for
/// the registry to settle.
#[derive(Debug, Clone)]
pub struct TransformBarrier {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for TransformBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformBarrier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            in_flight: Arc::new(tx),
        }
    }

    /// Mark one transform as started; it ends when the guard drops.
    pub fn begin(&self) -> TransformGuard {
        self.in_flight.send_modify(|count| *count += 1);
        TransformGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Resolve once no transform is in flight.
    ///
    /// Returns immediately when nothing is pending. Fails with
    /// [`StylexError::Cancelled`] if `cancel` fires first.
    pub async fn wait_idle(&self, cancel: &CancellationToken) -> Result<()> {
        let mut rx = self.in_flight.subscribe();
        loop {
            if *rx.borrow_and_update() == 0 {
                return Ok(());
            }

            tokio::select! {
                changed = rx.changed() => {
                    // The sender lives as long as `self`; a closed channel means teardown.
                    if changed.is_err() {
                        return Err(StylexError::Cancelled);
                    }
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("stylesheet request cancelled while transforms were pending");
                    return Err(StylexError::Cancelled);
                }
            }
        }
    }
}

/// Held for the duration of one module transform.
#[derive(Debug)]
pub struct TransformGuard {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for TransformGuard {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_idle_barrier_passes_through() {
        let barrier = TransformBarrier::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Nothing pending: even an already-cancelled request is served.
        assert!(barrier.wait_idle(&cancel).await.is_ok());
    }

    #[tokio::test]
    async fn test_guard_tracks_in_flight() {
        let barrier = TransformBarrier::new();
        let first = barrier.begin();
        let second = barrier.begin();
        assert_eq!(barrier.in_flight(), 2);

        drop(first);
        drop(second);
        assert_eq!(barrier.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_wait_resolves_when_last_guard_drops() {
        let barrier = TransformBarrier::new();
        let guard = barrier.begin();

        let waiter = {
            let barrier = barrier.clone();
            tokio::spawn(async move { barrier.wait_idle(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_cancel_aborts_wait() {
        let barrier = TransformBarrier::new();
        let _guard = barrier.begin();
        let cancel = CancellationToken::new();

        let waiter = {
            let barrier = barrier.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { barrier.wait_idle(&cancel).await })
        };
        cancel.cancel();

        assert!(matches!(waiter.await.unwrap(), Err(StylexError::Cancelled)));
        assert_eq!(barrier.in_flight(), 1);
    }
}
