use crate::cancel::{run_with_cancel, CancellationState};
use crate::fetcher::PageFetcher;
use crate::page::{Collection, Page, PageQuery, PageRequest, ResourceKind};
use crate::{LibraryError, Result};

use async_trait::async_trait;

/// Async iterator trait for paginated Spotify data.
///
/// This trait provides a common interface for iterating over paginated data,
/// such as playlists and playlist tracks. Implementations fetch pages lazily,
/// as items are consumed.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// Fetch the next item from the iterator.
    ///
    /// This method automatically handles pagination, fetching new pages as needed.
    /// Returns `None` when there are no more items available.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` - Next item in the sequence
    /// - `Ok(None)` - No more items available
    /// - `Err(...)` - Network, protocol or cancellation error
    async fn next(&mut self) -> Result<Option<T>>;

    /// Collect all remaining items into a Vec.
    ///
    /// **Warning**: This discards whatever was collected when an error occurs.
    /// Use [`Pager::walk`] to keep partial results.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Take up to n items from the iterator.
    ///
    /// This is the recommended way to collect a bounded number of items
    /// from potentially large listings.
    ///
    /// # Arguments
    ///
    /// * `n` - Maximum number of items to collect
    async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for _ in 0..n {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Get the current page number (0-indexed).
    ///
    /// Returns the page number of the most recently fetched page.
    fn current_page(&self) -> u32;

    /// Get the total number of pages, if known.
    ///
    /// Returns `Some(n)` if the total page count is known, `None` otherwise.
    /// This information may not be available until at least one page has been fetched.
    fn total_pages(&self) -> Option<u32> {
        None // Default implementation returns None
    }
}

/// Outcome of walking a paginated resource to the end.
///
/// `collection` always holds every item received before the walk stopped. When
/// the walk stopped early, `failure` says why; callers decide whether the
/// partial collection is usable.
#[derive(Debug)]
pub struct PageWalk<T> {
    pub collection: Collection<T>,
    pub failure: Option<LibraryError>,
}

impl<T> PageWalk<T> {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Discard partial data on failure.
    pub fn into_result(self) -> Result<Collection<T>> {
        match self.failure {
            None => Ok(self.collection),
            Some(error) => Err(error),
        }
    }
}

/// Walks one paginated resource, page by page.
///
/// The pager starts from a [`PageQuery`] and keeps following continuation
/// cursors until the server stops handing them out, the item count reaches the
/// reported total, or a fetch fails. It works for any item type the fetcher
/// can produce, which is how playlist listings and playlist track listings
/// share one paging implementation.
///
/// Items come out in page-arrival order. The pager never reorders, dedupes or
/// retries.
///
/// # Examples
///
/// ```rust,no_run
/// use baton_library::{Pager, PageQuery, SimplePlaylist, SpotifyClient, StaticToken};
///
/// # tokio_test::block_on(async {
/// let client = SpotifyClient::new(
///     Box::new(http_client::native::NativeClient::new()),
///     Box::new(StaticToken::new("token")),
/// );
///
/// let walk = Pager::<_, SimplePlaylist>::new(&client, PageQuery::my_playlists(50))
///     .walk()
///     .await;
///
/// for playlist in walk.collection.items() {
///     println!("{} ({} tracks)", playlist.name, playlist.tracks.total);
/// }
/// if let Some(error) = walk.failure {
///     eprintln!("Listing stopped early: {error}");
/// }
/// # });
/// ```
pub struct Pager<'a, F: ?Sized, T> {
    fetcher: &'a F,
    query: PageQuery,
    next_request: Option<PageRequest>,
    cancel: Option<CancellationState>,
    total: Option<u32>,
    offset: u32,
    items_fetched: u32,
    pages_fetched: u32,
    buffer: Vec<T>,
}

impl<'a, F, T> Pager<'a, F, T>
where
    F: PageFetcher<T> + ?Sized,
{
    /// Create a pager that will start with `query`.
    pub fn new(fetcher: &'a F, query: PageQuery) -> Self {
        Self {
            fetcher,
            next_request: Some(PageRequest::Initial(query.clone())),
            query,
            cancel: None,
            total: None,
            offset: 0,
            items_fetched: 0,
            pages_fetched: 0,
            buffer: Vec::new(),
        }
    }

    /// Stop fetching once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationState) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// Whether another page may be fetched.
    pub fn has_more(&self) -> bool {
        self.next_request.is_some()
    }

    /// The latest total reported by the server, once a page has been fetched.
    pub fn total_items(&self) -> Option<u32> {
        self.total
    }

    /// Offset of the most recently fetched page.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Items received so far across all pages.
    pub fn items_fetched(&self) -> u32 {
        self.items_fetched
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the resource is exhausted. When a fetch fails the
    /// pending request is kept, so calling this again retries the same page;
    /// the pager itself never does.
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>> {
        let Some(request) = self.next_request.take() else {
            return Ok(None);
        };

        if let PageRequest::Continuation(cursor) = &request {
            self.check_cursor(cursor)?;
        }

        log::debug!(
            "Fetching page {} of {} ({} of {:?} items so far)",
            self.pages_fetched + 1,
            self.query.resource,
            self.items_fetched,
            self.total
        );

        let fetched = match &self.cancel {
            Some(cancel) => run_with_cancel(cancel, self.fetcher.fetch(&request)).await,
            None => Ok(self.fetcher.fetch(&request).await),
        };
        let mut page = match fetched {
            Ok(Ok(page)) => page,
            Ok(Err(source)) => {
                self.next_request = Some(request);
                return Err(LibraryError::fetch(self.query.resource.to_string(), source));
            }
            Err(error) => {
                self.next_request = Some(request);
                return Err(error);
            }
        };

        if let Some(previous_total) = self.total {
            if previous_total != page.total {
                log::info!(
                    "Total for {} changed mid-walk from {} to {}",
                    self.query.resource,
                    previous_total,
                    page.total
                );
            }
        }
        self.total = Some(page.total);
        self.offset = page.offset;
        self.pages_fetched += 1;

        let room = page.total.saturating_sub(self.items_fetched) as usize;
        if page.items.len() > room {
            log::warn!(
                "Dropping {} item(s) from {} beyond the reported total of {}",
                page.items.len() - room,
                self.query.resource,
                page.total
            );
            page.items.truncate(room);
        }
        self.items_fetched = (self.items_fetched + page.items.len() as u32).min(page.total);

        self.next_request = match page.next_cursor() {
            Some(_) if self.items_fetched >= page.total => None,
            Some(_) if page.items.is_empty() => {
                log::warn!(
                    "Empty page with a continuation for {}; stopping at {} of {} items",
                    self.query.resource,
                    self.items_fetched,
                    page.total
                );
                None
            }
            Some(cursor) => Some(PageRequest::Continuation(cursor.to_string())),
            None => None,
        };

        Ok(Some(page))
    }

    /// Walk the remaining pages into one collection.
    ///
    /// Items already consumed through [`next`](AsyncPaginatedIterator::next)
    /// are not included.
    pub async fn walk(mut self) -> PageWalk<T> {
        let mut items: Vec<T> = self.buffer.drain(..).rev().collect();
        let mut failure = None;

        loop {
            match self.next_page().await {
                Ok(Some(page)) => items.extend(page.items),
                Ok(None) => break,
                Err(error) => {
                    log::warn!(
                        "Walk over {} stopped after {} item(s): {}",
                        self.query.resource,
                        items.len(),
                        error
                    );
                    failure = Some(error);
                    break;
                }
            }
        }

        let total = self.total.unwrap_or(0);
        if items.len() > total as usize {
            log::warn!(
                "Dropping {} collected item(s) from {} after the total shrank to {}",
                items.len() - total as usize,
                self.query.resource,
                total
            );
            items.truncate(total as usize);
        }

        PageWalk {
            collection: Collection::new(items, total),
            failure,
        }
    }

    fn check_cursor(&self, cursor: &str) -> Result<()> {
        let expected = self.query.resource.kind();
        match ResourceKind::classify_cursor(cursor) {
            Some(found) if found != expected => Err(LibraryError::ProtocolMismatch {
                expected,
                found,
                cursor: cursor.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl<'a, F, T> AsyncPaginatedIterator<T> for Pager<'a, F, T>
where
    F: PageFetcher<T> + ?Sized,
{
    async fn next(&mut self) -> Result<Option<T>> {
        // If buffer is empty, try to load next page
        while self.buffer.is_empty() {
            match self.next_page().await? {
                Some(page) => {
                    self.buffer = page.items;
                    self.buffer.reverse(); // Reverse so we can pop from end efficiently
                }
                None => return Ok(None),
            }
        }

        Ok(self.buffer.pop())
    }

    fn current_page(&self) -> u32 {
        self.pages_fetched.saturating_sub(1)
    }

    fn total_pages(&self) -> Option<u32> {
        let limit = self.query.limit.max(1);
        self.total.map(|total| total.div_ceil(limit))
    }
}
