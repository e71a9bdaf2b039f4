#![allow(dead_code)]
use async_trait::async_trait;
use baton_library::{
    CancellationState, FetchError, Page, PageFetcher, PageRequest, PlaylistTrack, Resource,
    SimplePlaylist,
};
use http_types::Url;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;

pub const API: &str = "https://api.spotify.com/v1";

pub fn playlist(id: &str) -> SimplePlaylist {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Playlist {id}"),
        "uri": format!("spotify:playlist:{id}"),
        "href": format!("{API}/playlists/{id}"),
        "owner": { "id": format!("owner-{id}"), "display_name": format!("Owner {id}") },
        "collaborative": false,
        "public": true,
        "tracks": { "href": format!("{API}/playlists/{id}/tracks"), "total": 0 }
    }))
    .unwrap()
}

pub fn entry(track_id: &str, added_at: &str) -> PlaylistTrack {
    serde_json::from_value(json!({
        "added_at": added_at,
        "added_by": { "id": "curator" },
        "is_local": false,
        "track": {
            "id": track_id,
            "name": format!("Track {track_id}"),
            "uri": format!("spotify:track:{track_id}"),
            "duration_ms": 200000,
            "artists": [{ "name": "Artist" }]
        }
    }))
    .unwrap()
}

pub fn entries(track_ids: &[&str]) -> Vec<PlaylistTrack> {
    track_ids
        .iter()
        .map(|id| entry(id, "2023-05-01T12:00:00Z"))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Playlists,
    Tracks(String),
}

/// In-memory Spotify library served through URL-shaped continuation cursors.
///
/// Pages are cut from the stored lists at `page_size`, whatever limit the
/// request asked for, the way the real API caps page sizes.
pub struct FakeLibrary {
    playlists: Vec<SimplePlaylist>,
    tracks: HashMap<String, Vec<PlaylistTrack>>,
    page_size: usize,
    listing_failure: Option<FetchError>,
    /// playlist id -> number of pages served before failing
    failing: HashMap<String, usize>,
    cancel_on: Option<(String, CancellationState)>,
    requests: RefCell<Vec<String>>,
}

impl FakeLibrary {
    pub fn new(page_size: usize) -> Self {
        Self {
            playlists: Vec::new(),
            tracks: HashMap::new(),
            page_size: page_size.max(1),
            listing_failure: None,
            failing: HashMap::new(),
            cancel_on: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_playlist(mut self, id: &str, tracks: Vec<PlaylistTrack>) -> Self {
        let mut listed = playlist(id);
        listed.tracks.total = tracks.len() as u32;
        self.playlists.push(listed);
        self.tracks.insert(id.to_string(), tracks);
        self
    }

    /// Track walks for `id` fail once `pages_before_failure` pages were served.
    pub fn failing_playlist(mut self, id: &str, pages_before_failure: usize) -> Self {
        self.failing.insert(id.to_string(), pages_before_failure);
        self
    }

    pub fn failing_listing(mut self, error: FetchError) -> Self {
        self.listing_failure = Some(error);
        self
    }

    /// Fire `cancel` while serving the first track page of `id`.
    pub fn cancel_while_fetching(mut self, id: &str, cancel: CancellationState) -> Self {
        self.cancel_on = Some((id.to_string(), cancel));
        self
    }

    pub fn playlists(&self) -> &[SimplePlaylist] {
        &self.playlists
    }

    /// URLs of every page fetched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of track pages fetched for playlist `id`.
    pub fn track_fetches(&self, id: &str) -> usize {
        let marker = format!("/playlists/{id}/tracks");
        self.requests
            .borrow()
            .iter()
            .filter(|url| url.contains(&marker))
            .count()
    }

    fn locate(&self, request: &PageRequest) -> Result<(Target, usize), FetchError> {
        match request {
            PageRequest::Initial(query) => {
                let target = match &query.resource {
                    Resource::MyPlaylists => Target::Playlists,
                    Resource::PlaylistTracks { playlist_id } => {
                        Target::Tracks(playlist_id.clone())
                    }
                };
                Ok((target, 0))
            }
            PageRequest::Continuation(cursor) => {
                let url = Url::parse(cursor)
                    .map_err(|e| FetchError::Malformed(format!("bad cursor {cursor}: {e}")))?;
                let segments: Vec<&str> = url
                    .path_segments()
                    .map(|segments| segments.collect())
                    .unwrap_or_default();
                let target = match segments.as_slice() {
                    ["v1", "me", "playlists"] => Target::Playlists,
                    ["v1", "playlists", id, "tracks"] => Target::Tracks(id.to_string()),
                    _ => return Err(FetchError::Malformed(format!("unknown cursor {cursor}"))),
                };
                let offset = url
                    .query_pairs()
                    .find(|(key, _)| key == "offset")
                    .and_then(|(_, value)| value.parse().ok())
                    .unwrap_or(0);
                Ok((target, offset))
            }
        }
    }

    fn url_for(&self, target: &Target, offset: usize) -> String {
        match target {
            Target::Playlists => format!(
                "{API}/me/playlists?offset={offset}&limit={}",
                self.page_size
            ),
            Target::Tracks(id) => format!(
                "{API}/playlists/{id}/tracks?offset={offset}&limit={}",
                self.page_size
            ),
        }
    }

    fn slice<T: Clone>(&self, target: &Target, items: &[T], offset: usize) -> Page<T> {
        let start = offset.min(items.len());
        let end = (offset + self.page_size).min(items.len());
        Page {
            items: items[start..end].to_vec(),
            offset: offset as u32,
            total: items.len() as u32,
            continuation: (end < items.len()).then(|| self.url_for(target, end)),
        }
    }
}

#[async_trait(?Send)]
impl PageFetcher<SimplePlaylist> for FakeLibrary {
    async fn fetch(&self, request: &PageRequest) -> Result<Page<SimplePlaylist>, FetchError> {
        let (target, offset) = self.locate(request)?;
        self.requests.borrow_mut().push(self.url_for(&target, offset));
        if target != Target::Playlists {
            return Err(FetchError::Malformed(format!("{target:?} is not a playlist listing")));
        }
        if let Some(error) = &self.listing_failure {
            return Err(error.clone());
        }
        Ok(self.slice(&target, &self.playlists, offset))
    }
}

#[async_trait(?Send)]
impl PageFetcher<PlaylistTrack> for FakeLibrary {
    async fn fetch(&self, request: &PageRequest) -> Result<Page<PlaylistTrack>, FetchError> {
        let (target, offset) = self.locate(request)?;
        self.requests.borrow_mut().push(self.url_for(&target, offset));
        let Target::Tracks(id) = &target else {
            return Err(FetchError::Malformed("not a track listing".to_string()));
        };

        if let Some((cancel_id, cancel)) = &self.cancel_on {
            if cancel_id == id && offset == 0 {
                cancel.cancel();
            }
        }
        if let Some(pages_before_failure) = self.failing.get(id) {
            if offset / self.page_size >= *pages_before_failure {
                return Err(FetchError::Network(format!("connection reset on {id}")));
            }
        }

        let tracks = self
            .tracks
            .get(id)
            .ok_or_else(|| FetchError::Network(format!("404 playlist {id}")))?;
        Ok(self.slice(&target, tracks, offset))
    }
}
