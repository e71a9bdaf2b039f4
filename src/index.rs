//! The deduplicated track index an aggregation run builds.

use crate::types::{PlaylistMembership, PlaylistTrack, SimplePlaylist, Track, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

/// A track's catalog metadata plus every playlist it appears in.
///
/// Serialized flat: the track fields followed by a `playlists` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(flatten)]
    pub track: Track,
    /// One entry per occurrence, in fold order
    pub playlists: Vec<PlaylistMembership>,
}

impl TrackRecord {
    fn new(track: Track, membership: PlaylistMembership) -> Self {
        Self {
            track,
            playlists: vec![membership],
        }
    }

    /// Ids of the distinct playlists containing this track.
    pub fn playlist_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .playlists
            .iter()
            .map(|membership| membership.playlist_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Counts from folding one playlist into the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldStats {
    /// Tracks seen for the first time
    pub inserted: usize,
    /// Memberships appended to existing tracks
    pub appended: usize,
    /// Entries with no usable track
    pub skipped: usize,
}

impl FoldStats {
    pub fn memberships(&self) -> usize {
        self.inserted + self.appended
    }
}

/// Mapping from track identity to metadata and playlist memberships.
///
/// Keys are unique. Records are only ever inserted or appended to: a
/// membership, once folded in, is never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackIndex {
    tracks: BTreeMap<TrackId, TrackRecord>,
}

impl TrackIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TrackRecord> {
        self.tracks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    /// Records in identity order.
    pub fn iter(&self) -> btree_map::Iter<'_, TrackId, TrackRecord> {
        self.tracks.iter()
    }

    /// Total memberships across all tracks.
    pub fn membership_count(&self) -> usize {
        self.tracks.values().map(|record| record.playlists.len()).sum()
    }

    /// Compare two indexes ignoring membership order.
    ///
    /// Two runs over the same library agree under this comparison even when
    /// playlists were folded in a different order.
    pub fn same_memberships(&self, other: &TrackIndex) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.tracks.iter().all(|(id, record)| {
            other
                .tracks
                .get(id)
                .is_some_and(|theirs| membership_multiset(record) == membership_multiset(theirs))
        })
    }

    /// Fold one playlist's complete track listing into the index.
    ///
    /// Entries are applied in listing order, so repeated occurrences of a
    /// track within the playlist keep that order in its membership list.
    /// Entries with no track, or a track with neither id nor URI, are skipped.
    pub(crate) fn fold_playlist(
        &mut self,
        playlist: &SimplePlaylist,
        entries: Vec<PlaylistTrack>,
    ) -> FoldStats {
        let mut stats = FoldStats::default();

        for entry in entries {
            let membership = PlaylistMembership::new(playlist, &entry);
            let Some(track) = entry.track else {
                log::debug!("Skipping unavailable track in playlist {}", playlist.id);
                stats.skipped += 1;
                continue;
            };
            let Some(id) = track.identity() else {
                log::debug!(
                    "Skipping track '{}' without id or uri in playlist {}",
                    track.name,
                    playlist.id
                );
                stats.skipped += 1;
                continue;
            };

            match self.tracks.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(TrackRecord::new(track, membership));
                    stats.inserted += 1;
                }
                Entry::Occupied(mut slot) => {
                    slot.get_mut().playlists.push(membership);
                    stats.appended += 1;
                }
            }
        }

        stats
    }
}

fn membership_multiset(record: &TrackRecord) -> Vec<String> {
    let mut keys: Vec<String> = record
        .playlists
        .iter()
        .map(|membership| {
            serde_json::to_string(membership).unwrap_or_else(|_| membership.playlist_id.clone())
        })
        .collect();
    keys.sort_unstable();
    keys
}

impl<'a> IntoIterator for &'a TrackIndex {
    type Item = (&'a TrackId, &'a TrackRecord);
    type IntoIter = btree_map::Iter<'a, TrackId, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
