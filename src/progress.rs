//! Terminal spinner for long aggregation runs.

use crate::cancel::CancellationState;
use crate::events::ProgressReporter;
use crate::types::SimplePlaylist;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

struct SpinnerTask {
    stop: CancellationState,
    handle: JoinHandle<()>,
}

/// Spinner shown on stderr while a run is in progress.
///
/// `started` spawns a ticker task; `stopped` signals it and waits for it to
/// exit, so the spinner never outlives the run.
pub struct ProgressSpinner {
    bar: ProgressBar,
    task: Mutex<Option<SpinnerTask>>,
}

impl ProgressSpinner {
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        Self {
            bar,
            task: Mutex::new(None),
        }
    }

    /// Spinner that draws nothing; for tests and non-interactive output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|task| task.is_some())
            .unwrap_or(false)
    }

    fn take_task(&self) -> Option<SpinnerTask> {
        match self.task.lock() {
            Ok(mut task) => task.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

#[async_trait(?Send)]
impl ProgressReporter for ProgressSpinner {
    async fn started(&self) {
        let stop = CancellationState::new();
        let bar = self.bar.clone();
        let signal = stop.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            loop {
                tokio::select! {
                    _ = signal.cancelled() => break,
                    _ = ticker.tick() => bar.tick(),
                }
            }
        });

        let previous = match self.task.lock() {
            Ok(mut task) => task.replace(SpinnerTask { stop, handle }),
            Err(poisoned) => poisoned.into_inner().replace(SpinnerTask { stop, handle }),
        };
        if let Some(previous) = previous {
            previous.stop.cancel();
        }
    }

    async fn stopped(&self) {
        if let Some(task) = self.take_task() {
            task.stop.cancel();
            if let Err(e) = task.handle.await {
                log::warn!("Spinner task did not shut down cleanly: {e}");
            }
        }
        self.bar.finish_and_clear();
    }

    fn playlists_listed(&self, count: usize) {
        self.bar.set_message(format!("Downloading {count} playlists"));
    }

    fn playlist_completed(&self, playlist: &SimplePlaylist, _entries: usize) {
        self.bar.set_message(format!("Downloaded {}", playlist.name));
    }
}
