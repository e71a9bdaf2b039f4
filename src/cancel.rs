use crate::{LibraryError, Result};
use std::future::Future;
use tokio::sync::watch;

/// Cooperative cancellation support for long-running walks.
///
/// - `cancel()` flips a boolean and wakes anything waiting on it.
/// - `reset()` clears the flag so future operations can run again.
/// - In-flight work is raced against the flag with [`run_with_cancel`].
///
/// Clones share the same flag, so a clone can be handed to a signal handler
/// while another copy drives the run.
#[derive(Clone, Debug)]
pub struct CancellationState {
    tx: watch::Sender<bool>,
}

impl Default for CancellationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Resolves once the flag is set.
    pub async fn cancelled(&self) {
        let mut cancel_rx = self.subscribe();
        wait_for_cancel(&mut cancel_rx).await;
    }
}

async fn wait_for_cancel(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow_and_update() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            // Sender dropped; nothing can cancel us any more.
            std::future::pending::<()>().await;
        }
    }
}

/// Run `operation` unless or until `cancel` fires.
///
/// Returns [`LibraryError::Cancelled`] without polling the operation when the
/// flag is already set. If the flag is set while the operation is in flight,
/// the operation is dropped.
pub async fn run_with_cancel<F>(cancel: &CancellationState, operation: F) -> Result<F::Output>
where
    F: Future,
{
    let mut cancel_rx = cancel.subscribe();
    if *cancel_rx.borrow() {
        return Err(LibraryError::Cancelled);
    }

    tokio::pin!(operation);
    tokio::select! {
        biased;
        _ = wait_for_cancel(&mut cancel_rx) => Err(LibraryError::Cancelled),
        output = &mut operation => Ok(output),
    }
}
