//! Data types for Spotify library metadata.
//!
//! These mirror the parts of the Spotify Web API objects this crate reads.
//! Unknown fields are ignored and optional fields default, so the records
//! survive the API growing new fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

// ================================================================================================
// USERS AND PLAYLISTS
// ================================================================================================

/// A Spotify user as embedded in playlist and track objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Not included in `added_by` objects
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

impl User {
    /// Display name, falling back to the user id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Link to a playlist's track listing plus its size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistTrackLinks {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub total: u32,
}

/// A "simple" playlist object as returned by `me/playlists`.
///
/// # Examples
///
/// ```rust
/// use baton_library::SimplePlaylist;
///
/// let playlist: SimplePlaylist = serde_json::from_str(r#"{
///     "id": "37i9dQZF1DXcBWIGoYBM5M",
///     "name": "Today's Top Hits",
///     "uri": "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M",
///     "owner": { "id": "spotify", "display_name": "Spotify" },
///     "tracks": { "href": "https://api.spotify.com/v1/playlists/37i9dQZF1DXcBWIGoYBM5M/tracks", "total": 50 }
/// }"#).unwrap();
///
/// assert_eq!(playlist.owner.label(), "Spotify");
/// assert_eq!(playlist.tracks.total, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplePlaylist {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub href: String,
    pub owner: User,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub external_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub tracks: PlaylistTrackLinks,
}

// ================================================================================================
// TRACKS
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleAlbum {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub album_type: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Catalog metadata of a track.
///
/// Local tracks (files the user added from disk) come back with no `id`; their
/// `uri` still identifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub album: Option<SimpleAlbum>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_ids: BTreeMap<String, String>,
    #[serde(default)]
    pub external_urls: BTreeMap<String, String>,
}

impl Track {
    /// The identity this track is indexed under.
    ///
    /// Catalog tracks use their id, local tracks their URI. Returns `None` when
    /// the API gave neither.
    pub fn identity(&self) -> Option<TrackId> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.uri.as_deref().filter(|uri| !uri.is_empty()))
            .map(TrackId::from)
    }

    /// Comma separated artist names.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Duration formatted as `m:ss`.
    pub fn formatted_duration(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// One entry of a playlist's track listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    /// Missing for playlists created before Spotify recorded it
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub added_by: Option<User>,
    #[serde(default)]
    pub is_local: bool,
    /// `null` when the track is no longer available
    #[serde(default)]
    pub track: Option<Track>,
}

// ================================================================================================
// INDEX RECORDS
// ================================================================================================

/// Stable identity of a track across playlists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TrackId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A track's presence in one playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMembership {
    pub playlist_id: String,
    pub name: String,
    pub uri: String,
    pub href: String,
    pub owner: User,
    pub added_at: Option<DateTime<Utc>>,
    pub added_by: Option<User>,
    pub is_local: bool,
}

impl PlaylistMembership {
    /// Build the membership of `entry` in `playlist`.
    pub fn new(playlist: &SimplePlaylist, entry: &PlaylistTrack) -> Self {
        Self {
            playlist_id: playlist.id.clone(),
            name: playlist.name.clone(),
            uri: playlist.uri.clone(),
            href: playlist.href.clone(),
            owner: playlist.owner.clone(),
            added_at: entry.added_at,
            added_by: entry.added_by.clone(),
            is_local: entry.is_local,
        }
    }
}

// ================================================================================================
// PLAYBACK
// ================================================================================================

/// Request to start playing a context (playlist, album) on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackRequest {
    pub context_uri: String,
    /// Target device; the currently active one when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl PlaybackRequest {
    pub fn for_playlist(playlist: &SimplePlaylist) -> Self {
        Self {
            context_uri: playlist.uri.clone(),
            device_id: None,
        }
    }

    pub fn on_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}
