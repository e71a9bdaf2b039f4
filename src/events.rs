//! # Aggregation Events
//!
//! Progress hooks for an aggregation run, plus a broadcast channel reporter so
//! consumers can follow a run from another task.

use crate::types::SimplePlaylist;
use crate::LibraryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Observer of an aggregation run.
///
/// `started` is awaited before the first fetch and `stopped` after the last
/// playlist has been folded, on every exit path. The per-playlist hooks default
/// to doing nothing.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait ProgressReporter {
    async fn started(&self);

    async fn stopped(&self);

    /// The playlist listing walk finished with `count` playlists.
    fn playlists_listed(&self, _count: usize) {}

    /// A playlist was folded into the index.
    fn playlist_completed(&self, _playlist: &SimplePlaylist, _entries: usize) {}

    /// A playlist's track walk failed; it contributes nothing to the index.
    fn playlist_failed(&self, _playlist: &SimplePlaylist, _error: &LibraryError) {}
}

/// Events emitted while aggregating a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationEvent {
    /// The run is about to issue its first fetch
    Started {
        timestamp: DateTime<Utc>,
    },
    /// The playlist listing is complete
    PlaylistsListed {
        timestamp: DateTime<Utc>,
        /// Number of playlists that will be walked
        count: usize,
    },
    /// A playlist's tracks were folded into the index
    PlaylistCompleted {
        timestamp: DateTime<Utc>,
        playlist_id: String,
        /// Track entries received for the playlist
        entries: usize,
    },
    /// A playlist's track walk failed
    PlaylistFailed {
        timestamp: DateTime<Utc>,
        playlist_id: String,
        /// Rendered error
        error: String,
    },
    /// The run has finished, successfully or not
    Stopped {
        timestamp: DateTime<Utc>,
    },
}

/// A handle for receiving aggregation events.
///
/// # Examples
///
/// ```rust,no_run
/// use baton_library::{AggregationEvent, EventBroadcaster, LibraryAggregator, SpotifyClient, StaticToken};
/// use tokio::sync::broadcast::error::RecvError;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SpotifyClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         Box::new(StaticToken::new("token")),
///     );
///     let broadcaster = EventBroadcaster::new();
///     let mut events = broadcaster.subscribe();
///
///     tokio::spawn(async move {
///         loop {
///             match events.recv().await {
///                 Ok(AggregationEvent::PlaylistFailed { playlist_id, error, .. }) => {
///                     println!("{playlist_id} failed: {error}");
///                 }
///                 Ok(_) => {}
///                 Err(RecvError::Closed) => break,
///                 Err(RecvError::Lagged(skipped)) => {
///                     println!("Event receiver lagged, {skipped} events skipped");
///                 }
///             }
///         }
///     });
///
///     let aggregation = LibraryAggregator::new(&client)
///         .with_reporter(&broadcaster)
///         .run()
///         .await?;
///     println!("{} tracks", aggregation.index.len());
///     Ok(())
/// }
/// ```
pub type AggregationEventReceiver = broadcast::Receiver<AggregationEvent>;

/// A handle for sending aggregation events.
pub type AggregationEventSender = broadcast::Sender<AggregationEvent>;

/// Creates a new broadcast channel for aggregation events.
///
/// The channel has a capacity of 100 events.
pub fn create_event_channel() -> (AggregationEventSender, AggregationEventReceiver) {
    broadcast::channel(100)
}

/// [`ProgressReporter`] that republishes every hook as an [`AggregationEvent`].
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: AggregationEventSender,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _receiver) = create_event_channel();
        Self { sender }
    }

    pub fn subscribe(&self) -> AggregationEventReceiver {
        self.sender.subscribe()
    }

    fn emit(&self, event: AggregationEvent) {
        let _ = self.sender.send(event); // Ignore send errors (no receivers)
    }
}

#[async_trait(?Send)]
impl ProgressReporter for EventBroadcaster {
    async fn started(&self) {
        self.emit(AggregationEvent::Started {
            timestamp: Utc::now(),
        });
    }

    async fn stopped(&self) {
        self.emit(AggregationEvent::Stopped {
            timestamp: Utc::now(),
        });
    }

    fn playlists_listed(&self, count: usize) {
        self.emit(AggregationEvent::PlaylistsListed {
            timestamp: Utc::now(),
            count,
        });
    }

    fn playlist_completed(&self, playlist: &SimplePlaylist, entries: usize) {
        self.emit(AggregationEvent::PlaylistCompleted {
            timestamp: Utc::now(),
            playlist_id: playlist.id.clone(),
            entries,
        });
    }

    fn playlist_failed(&self, playlist: &SimplePlaylist, error: &LibraryError) {
        self.emit(AggregationEvent::PlaylistFailed {
            timestamp: Utc::now(),
            playlist_id: playlist.id.clone(),
            error: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcaster_forwards_hooks() {
        let broadcaster = EventBroadcaster::new();
        let mut events = broadcaster.subscribe();

        broadcaster.started().await;
        broadcaster.playlists_listed(3);
        broadcaster.stopped().await;

        assert!(matches!(
            events.recv().await.unwrap(),
            AggregationEvent::Started { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            AggregationEvent::PlaylistsListed { count: 3, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            AggregationEvent::Stopped { .. }
        ));
    }

    #[tokio::test]
    async fn test_emitting_without_receivers_is_fine() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.started().await;
        broadcaster.stopped().await;
    }
}
