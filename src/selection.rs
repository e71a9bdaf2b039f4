use crate::fetcher::{PageFetcher, PlaybackControl};
use crate::iterator::Pager;
use crate::page::PageQuery;
use crate::types::{PlaybackRequest, SimplePlaylist};
use crate::{LibraryError, Result};

/// Selection state behind an interactive playlist table.
///
/// Pages of playlists are loaded on demand ("give me the next page") and each
/// loaded playlist carries a selection flag. Rendering and key handling live
/// with the caller.
pub struct PlaylistSelection<'a, F: ?Sized> {
    pager: Pager<'a, F, SimplePlaylist>,
    playlists: Vec<SimplePlaylist>,
    selections: Vec<bool>,
}

impl<'a, F> PlaylistSelection<'a, F>
where
    F: PageFetcher<SimplePlaylist> + ?Sized,
{
    pub fn new(fetcher: &'a F, page_limit: u32) -> Self {
        Self::from_pager(Pager::new(fetcher, PageQuery::my_playlists(page_limit)))
    }

    pub fn from_pager(pager: Pager<'a, F, SimplePlaylist>) -> Self {
        Self {
            pager,
            playlists: Vec::new(),
            selections: Vec::new(),
        }
    }

    /// Load the next page of playlists, returning how many were added.
    ///
    /// Returns `Ok(0)` once everything is loaded. On error nothing is added and
    /// the same page is requested on the next call.
    pub async fn load_next_page(&mut self) -> Result<usize> {
        let Some(page) = self.pager.next_page().await? else {
            return Ok(0);
        };
        let added = page.items.len();
        self.playlists.extend(page.items);
        self.selections.resize(self.playlists.len(), false);
        Ok(added)
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    /// Playlists loaded so far, in listing order.
    pub fn playlists(&self) -> &[SimplePlaylist] {
        &self.playlists
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// The server's playlist count, once the first page is loaded.
    pub fn total(&self) -> Option<u32> {
        self.pager.total_items()
    }

    /// Flip the selection of the playlist at `index`; returns the new state.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let len = self.playlists.len();
        let flag = self
            .selections
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selections.get(index).copied().unwrap_or(false)
    }

    /// Selected playlists, in listing order.
    pub fn selected(&self) -> Vec<&SimplePlaylist> {
        self.playlists
            .iter()
            .zip(&self.selections)
            .filter(|(_, selected)| **selected)
            .map(|(playlist, _)| playlist)
            .collect()
    }

    pub fn clear_selection(&mut self) {
        self.selections.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn playback_request(&self, index: usize) -> Result<PlaybackRequest> {
        self.playlists
            .get(index)
            .map(PlaybackRequest::for_playlist)
            .ok_or_else(|| out_of_range(index, self.playlists.len()))
    }

    /// Start playing the playlist at `index`; returns a status line for display.
    pub async fn play(&self, index: usize, player: &dyn PlaybackControl) -> Result<String> {
        let request = self.playback_request(index)?;
        player.start_playback(&request).await?;

        let playlist = &self.playlists[index];
        Ok(format!(
            "Now playing the playlist: {} by {}",
            playlist.name,
            playlist.owner.label()
        ))
    }
}

fn out_of_range(index: usize, len: usize) -> LibraryError {
    LibraryError::Config(format!(
        "Playlist index {index} out of range ({len} loaded)"
    ))
}
