use crate::aggregator::PlaylistFailure;
use crate::page::ResourceKind;
use crate::TrackIndex;
use thiserror::Error;

/// Error types for library operations.
///
/// This enum covers everything that can go wrong while walking the Spotify
/// catalog: failed page fetches, continuation cursors that point somewhere
/// unexpected, cancellation, and local storage problems.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use baton_library::{FetchError, LibraryError, LibraryStore};
///
/// match LibraryStore::default_location().and_then(|store| store.load()) {
///     Ok(index) => println!("{} tracks on disk", index.len()),
///     Err(LibraryError::Fetch { resource, source: FetchError::AuthFailure(msg) }) => {
///         eprintln!("Token rejected while fetching {resource}: {msg}");
///     }
///     Err(LibraryError::Cancelled) => eprintln!("Interrupted"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum LibraryError {
    /// A single page fetch failed for the named resource.
    ///
    /// `resource` is a human readable description such as
    /// `playlist 37i9dQZF1DXcBWIGoYBM5M tracks`.
    #[error("Failed to fetch {resource}: {source}")]
    Fetch {
        /// The resource being walked when the fetch failed
        resource: String,
        /// The underlying fetch failure
        #[source]
        source: FetchError,
    },

    /// A continuation cursor resolved to a different kind of resource than the
    /// walk started with.
    ///
    /// For example a playlist listing whose `next` URL points at `/v1/search`.
    #[error("Continuation for {expected} points at {found}: {cursor}")]
    ProtocolMismatch {
        /// Resource kind of the initial query
        expected: ResourceKind,
        /// Resource kind the cursor was classified as
        found: ResourceKind,
        /// The offending cursor, verbatim
        cursor: String,
    },

    /// The operation was cancelled before it could finish.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    ///
    /// Raised when persisting or loading the track index.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of the persisted index failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LibraryError {
    /// Wrap a fetch failure with the resource it happened on.
    pub fn fetch(resource: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            resource: resource.into(),
            source,
        }
    }

    /// The fetch subkind, if this error came from a page fetch.
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Fetch { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failure of one network round trip.
///
/// Every variant is fatal to the page being fetched but says nothing about the
/// walk as a whole; the pager hands these back to its caller untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection failures, timeouts, unexpected HTTP statuses and exhausted
    /// rate limit retries.
    #[error("Network error: {0}")]
    Network(String),

    /// The bearer token was missing, expired or rejected.
    ///
    /// The core never refreshes tokens; re-run the auth flow.
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// The response could not be decoded into a page.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Discriminant of [`FetchError`], handy for reporting and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Network,
    AuthFailure,
    Malformed,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network(_) => FetchErrorKind::Network,
            Self::AuthFailure(_) => FetchErrorKind::AuthFailure,
            Self::Malformed(_) => FetchErrorKind::Malformed,
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::AuthFailure => "auth",
            Self::Malformed => "malformed",
        };
        f.write_str(name)
    }
}

/// An aggregation run that finished without covering every playlist.
///
/// This is a reportable outcome, not a crash: `index` holds every playlist that
/// was folded successfully and can be persisted as-is.
#[derive(Error, Debug)]
#[error(
    "Library aggregation incomplete: {} playlist(s) failed{}",
    .failures.len(),
    cancelled_suffix(.cancelled)
)]
pub struct PartialAggregationError {
    /// Everything that was aggregated before or despite the failures
    pub index: TrackIndex,
    /// Playlists whose track walk failed
    pub failures: Vec<PlaylistFailure>,
    /// Whether the run was cut short by cancellation
    pub cancelled: bool,
}

fn cancelled_suffix(cancelled: &bool) -> &'static str {
    if *cancelled {
        ", run cancelled"
    } else {
        ""
    }
}

impl PartialAggregationError {
    pub fn failed_playlist_ids(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|failure| failure.playlist_id.as_str())
            .collect()
    }
}
