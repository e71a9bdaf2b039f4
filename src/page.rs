//! Paging primitives shared by every paginated walk.
//!
//! A [`Page`] is one response from the API, a [`Collection`] is what a walk
//! accumulates, and a [`PageRequest`] is what gets handed to a
//! [`PageFetcher`](crate::PageFetcher): either the initial query or the
//! continuation cursor of the previous page, passed along verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The kind of listing a walk is over.
///
/// Used to check that a continuation cursor still points at the same kind of
/// resource the walk started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Playlists owned by or visible to a user
    Playlists,
    /// Track entries of one playlist
    PlaylistTracks,
    /// Search results
    Search,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Playlists => "playlist listing",
            Self::PlaylistTracks => "playlist tracks",
            Self::Search => "search results",
        };
        f.write_str(name)
    }
}

fn search_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/v1/search(?:[/?#]|$)").expect("valid regex"))
}

fn playlist_tracks_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/v1/(?:users/[^/?#]+/)?playlists/[^/?#]+/tracks(?:[/?#]|$)")
            .expect("valid regex")
    })
}

fn playlists_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/v1/(?:me|users/[^/?#]+)/playlists(?:[?#]|/?$)").expect("valid regex")
    })
}

impl ResourceKind {
    /// Classify a continuation cursor by its URL shape.
    ///
    /// Returns `None` for cursors that match no known endpoint; those are
    /// treated as opaque tokens and followed as-is.
    pub fn classify_cursor(cursor: &str) -> Option<Self> {
        if search_pattern().is_match(cursor) {
            Some(Self::Search)
        } else if playlist_tracks_pattern().is_match(cursor) {
            Some(Self::PlaylistTracks)
        } else if playlists_pattern().is_match(cursor) {
            Some(Self::Playlists)
        } else {
            None
        }
    }
}

/// A paginated resource on the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The current user's playlists (`me/playlists`)
    MyPlaylists,
    /// Track entries of a playlist (`playlists/{id}/tracks`)
    PlaylistTracks { playlist_id: String },
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::MyPlaylists => ResourceKind::Playlists,
            Self::PlaylistTracks { .. } => ResourceKind::PlaylistTracks,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MyPlaylists => f.write_str("your playlists"),
            Self::PlaylistTracks { playlist_id } => write!(f, "playlist {playlist_id} tracks"),
        }
    }
}

/// The first request of a walk: which resource, and how many items per page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub resource: Resource,
    /// Page size hint; the server may return fewer items
    pub limit: u32,
}

impl PageQuery {
    pub fn my_playlists(limit: u32) -> Self {
        Self {
            resource: Resource::MyPlaylists,
            limit,
        }
    }

    pub fn playlist_tracks(playlist_id: impl Into<String>, limit: u32) -> Self {
        Self {
            resource: Resource::PlaylistTracks {
                playlist_id: playlist_id.into(),
            },
            limit,
        }
    }
}

/// What a [`PageFetcher`](crate::PageFetcher) is asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRequest {
    /// First page of a walk
    Initial(PageQuery),
    /// Opaque continuation from the previous page; must be used verbatim
    Continuation(String),
}

/// One page of a paginated result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Number of items that precede this page in the full result set
    pub offset: u32,
    /// Size of the full result set as reported by the server
    pub total: u32,
    /// Cursor for the next page; `None` or empty means this is the last page
    pub continuation: Option<String>,
}

impl<T> Page<T> {
    /// The continuation cursor, if there is a non-empty one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.continuation
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor().is_some()
    }
}

/// Spotify's wire paging object.
///
/// Only used for decoding; convert into a [`Page`] straight away.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default)]
    pub href: Option<String>,
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub previous: Option<String>,
    pub total: u32,
}

impl<T> From<Paging<T>> for Page<T> {
    fn from(paging: Paging<T>) -> Self {
        Page {
            items: paging.items,
            offset: paging.offset,
            total: paging.total,
            continuation: paging.next,
        }
    }
}

/// Items accumulated by a walk, in page-arrival order.
///
/// The item count never exceeds `total`; it equals `total` once the walk is
/// exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection<T> {
    items: Vec<T>,
    total: u32,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Collection<T> {
    pub(crate) fn new(items: Vec<T>, total: u32) -> Self {
        Self { items, total }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The last total reported by the server.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether every item the server reported has been collected.
    pub fn is_exhausted(&self) -> bool {
        self.items.len() >= self.total as usize
    }
}
