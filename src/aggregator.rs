//! Folding a user's playlists into one deduplicated [`TrackIndex`].

use crate::cancel::CancellationState;
use crate::config::AggregatorConfig;
use crate::error::PartialAggregationError;
use crate::events::ProgressReporter;
use crate::fetcher::PageFetcher;
use crate::index::TrackIndex;
use crate::iterator::Pager;
use crate::page::{Collection, PageQuery};
use crate::types::{PlaylistTrack, SimplePlaylist};
use crate::{LibraryError, Result};
use futures::stream::{self, StreamExt};

/// A playlist whose track walk failed.
#[derive(Debug)]
pub struct PlaylistFailure {
    pub playlist_id: String,
    pub playlist_name: String,
    pub error: LibraryError,
}

/// Result of an aggregation run.
///
/// A run with failures or a cancellation still carries every playlist that
/// was folded completely. Use [`Aggregation::into_result`] to treat anything
/// short of a full run as an error.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub index: TrackIndex,
    /// Failed playlists, in listing order
    pub failures: Vec<PlaylistFailure>,
    /// Whether the run was cut short by cancellation
    pub cancelled: bool,
}

impl Aggregation {
    pub fn failed_playlist_ids(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|failure| failure.playlist_id.as_str())
            .collect()
    }

    /// True when every playlist was folded and nothing was cancelled.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn into_result(self) -> std::result::Result<TrackIndex, PartialAggregationError> {
        if self.is_complete() {
            Ok(self.index)
        } else {
            Err(PartialAggregationError {
                index: self.index,
                failures: self.failures,
                cancelled: self.cancelled,
            })
        }
    }
}

/// Walks a user's playlists and folds their tracks into a [`TrackIndex`].
///
/// The source must be able to page both the playlist listing and playlist
/// track listings. Each playlist's tracks are walked with a fresh [`Pager`];
/// with `concurrency > 1` several walks run at once, but results are folded one
/// playlist at a time in listing order.
///
/// # Examples
///
/// ```rust,no_run
/// use baton_library::{AggregatorConfig, LibraryAggregator, SpotifyClient, StaticToken};
///
/// # tokio_test::block_on(async {
/// let client = SpotifyClient::new(
///     Box::new(http_client::native::NativeClient::new()),
///     Box::new(StaticToken::new("token")),
/// );
///
/// let aggregation = LibraryAggregator::new(&client)
///     .with_config(AggregatorConfig::new().with_concurrency(4))
///     .run()
///     .await?;
///
/// for failure in &aggregation.failures {
///     eprintln!("{} failed: {}", failure.playlist_name, failure.error);
/// }
/// println!("{} distinct tracks", aggregation.index.len());
/// # Ok::<(), baton_library::LibraryError>(())
/// # }).unwrap();
/// ```
pub struct LibraryAggregator<'a, S: ?Sized> {
    source: &'a S,
    config: AggregatorConfig,
    cancel: CancellationState,
    reporter: Option<&'a dyn ProgressReporter>,
}

impl<'a, S> LibraryAggregator<'a, S>
where
    S: PageFetcher<SimplePlaylist> + PageFetcher<PlaylistTrack> + ?Sized,
{
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            config: AggregatorConfig::default(),
            cancel: CancellationState::new(),
            reporter: None,
        }
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Stop the run once `cancel` fires; the index built so far is returned.
    pub fn with_cancellation(mut self, cancel: CancellationState) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_reporter(mut self, reporter: &'a dyn ProgressReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Aggregate every playlist of the current user.
    ///
    /// Fails only when the playlist listing itself cannot be walked. A
    /// cancellation during the listing yields an empty, cancelled
    /// [`Aggregation`].
    pub async fn run(&self) -> Result<Aggregation> {
        self.report_started().await;
        let result = self.run_all().await;
        self.report_stopped().await;
        result
    }

    /// Aggregate only the given playlists, in the given order.
    pub async fn run_playlists(&self, playlists: &[SimplePlaylist]) -> Aggregation {
        self.report_started().await;
        let aggregation = self.aggregate_playlists(playlists).await;
        self.report_stopped().await;
        aggregation
    }

    /// Walk the playlist listing to completion.
    pub async fn list_playlists(&self) -> Result<Collection<SimplePlaylist>> {
        Pager::<S, SimplePlaylist>::new(
            self.source,
            PageQuery::my_playlists(self.config.playlist_page_limit),
        )
        .with_cancellation(self.cancel.clone())
        .walk()
        .await
        .into_result()
    }

    /// Fold the tracks of `playlists` into a fresh index.
    ///
    /// Does not call the reporter's `started`/`stopped` hooks; see
    /// [`run_playlists`](Self::run_playlists).
    pub async fn aggregate_playlists(&self, playlists: &[SimplePlaylist]) -> Aggregation {
        let mut aggregation = Aggregation::default();
        if self.cancel.is_cancelled() {
            aggregation.cancelled = true;
            return aggregation;
        }

        let mut walks = stream::iter(playlists)
            .map(|playlist| async move { (playlist, self.playlist_tracks(playlist).await) })
            .buffered(self.config.concurrency.max(1));

        while let Some((playlist, outcome)) = walks.next().await {
            match outcome {
                Ok(entries) => {
                    let count = entries.len();
                    let stats = aggregation.index.fold_playlist(playlist, entries);
                    log::debug!(
                        "Folded playlist {} ({}): {} new, {} appended, {} skipped",
                        playlist.id,
                        playlist.name,
                        stats.inserted,
                        stats.appended,
                        stats.skipped
                    );
                    self.report(|reporter| reporter.playlist_completed(playlist, count));
                }
                Err(LibraryError::Cancelled) => {
                    aggregation.cancelled = true;
                    break;
                }
                Err(error) => {
                    log::warn!(
                        "Skipping playlist {} ({}): {}",
                        playlist.id,
                        playlist.name,
                        error
                    );
                    self.report(|reporter| reporter.playlist_failed(playlist, &error));
                    aggregation.failures.push(PlaylistFailure {
                        playlist_id: playlist.id.clone(),
                        playlist_name: playlist.name.clone(),
                        error,
                    });
                }
            }

            if self.cancel.is_cancelled() {
                aggregation.cancelled = true;
                break;
            }
        }

        log::info!(
            "Aggregated {} tracks from {} playlists ({} failed{})",
            aggregation.index.len(),
            playlists.len(),
            aggregation.failures.len(),
            if aggregation.cancelled {
                ", cancelled"
            } else {
                ""
            }
        );
        aggregation
    }

    async fn run_all(&self) -> Result<Aggregation> {
        let playlists = match self.list_playlists().await {
            Ok(playlists) => playlists,
            Err(LibraryError::Cancelled) => {
                log::info!("Cancelled while listing playlists");
                return Ok(Aggregation {
                    cancelled: true,
                    ..Aggregation::default()
                });
            }
            Err(error) => return Err(error),
        };
        log::info!("Found {} playlists", playlists.len());
        self.report(|reporter| reporter.playlists_listed(playlists.len()));

        Ok(self.aggregate_playlists(playlists.items()).await)
    }

    async fn playlist_tracks(&self, playlist: &SimplePlaylist) -> Result<Vec<PlaylistTrack>> {
        Pager::<S, PlaylistTrack>::new(
            self.source,
            PageQuery::playlist_tracks(&playlist.id, self.config.track_page_limit),
        )
        .with_cancellation(self.cancel.clone())
        .walk()
        .await
        .into_result()
        .map(Collection::into_items)
    }

    fn report(&self, hook: impl FnOnce(&dyn ProgressReporter)) {
        if let Some(reporter) = self.reporter {
            hook(reporter);
        }
    }

    async fn report_started(&self) {
        if let Some(reporter) = self.reporter {
            reporter.started().await;
        }
    }

    async fn report_stopped(&self) {
        if let Some(reporter) = self.reporter {
            reporter.stopped().await;
        }
    }
}
