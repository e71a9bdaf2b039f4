//! # baton-library
//!
//! Pulls a user's Spotify playlists and their tracks, and folds them into a
//! local index keyed by track, where every track lists the playlists it
//! belongs to.
//!
//! The pieces:
//! - [`PageFetcher`]: one network call returning one page
//! - [`Pager`]: walks a paginated resource to the end, keeping partial results on failure
//! - [`LibraryAggregator`]: walks every playlist and builds the [`TrackIndex`]
//! - [`SpotifyClient`]: the HTTP implementation of the above seams
//!
//! ```rust,no_run
//! use baton_library::{LibraryAggregator, LibraryStore, SpotifyClient, TokenFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotifyClient::new(
//!         Box::new(http_client::native::NativeClient::new()),
//!         Box::new(TokenFile::new("token.json")),
//!     );
//!
//!     let aggregation = LibraryAggregator::new(&client).run().await?;
//!     LibraryStore::default_location()?.save(&aggregation.index)?;
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod cancel;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod index;
pub mod iterator;
pub mod page;
pub mod persistence;
pub mod progress;
pub mod retry;
pub mod selection;
pub mod types;

pub use aggregator::{Aggregation, LibraryAggregator, PlaylistFailure};
pub use cancel::{run_with_cancel, CancellationState};
pub use client::SpotifyClient;
pub use config::{AggregatorConfig, ClientConfig, RetryConfig};
pub use credentials::{EnvToken, StaticToken, TokenFile};
pub use error::{FetchError, FetchErrorKind, LibraryError, PartialAggregationError};
pub use events::{AggregationEvent, AggregationEventReceiver, EventBroadcaster, ProgressReporter};
pub use fetcher::{CredentialProvider, PageFetcher, PlaybackControl};
pub use index::{FoldStats, TrackIndex, TrackRecord};
pub use iterator::{AsyncPaginatedIterator, PageWalk, Pager};
pub use page::{Collection, Page, PageQuery, PageRequest, Resource, ResourceKind};
pub use persistence::LibraryStore;
pub use progress::ProgressSpinner;
pub use selection::PlaylistSelection;
pub use types::{
    PlaybackRequest, PlaylistMembership, PlaylistTrack, SimpleAlbum, SimpleArtist, SimplePlaylist,
    Track, TrackId, User,
};

// Re-export mock types when mock feature is enabled
#[cfg(feature = "mock")]
pub use events::MockProgressReporter;
#[cfg(feature = "mock")]
pub use fetcher::{MockCredentialProvider, MockPageFetcher, MockPlaybackControl};
#[cfg(feature = "mock")]
pub use iterator::MockAsyncPaginatedIterator;

pub type Result<T> = std::result::Result<T, LibraryError>;
