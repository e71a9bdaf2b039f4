use crate::error::FetchError;
use crate::page::{Page, PageRequest};
use crate::types::PlaybackRequest;
use crate::Result;
use async_trait::async_trait;

/// One bounded network call returning a page of items.
///
/// This is the I/O boundary of every paginated walk. Implementations fetch
/// exactly the page described by the request: the initial query, or the
/// continuation cursor of the previous page passed through untouched. They do
/// not retry on behalf of the pager; any retry policy lives in the transport.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockPageFetcher`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait PageFetcher<T> {
    /// Fetch one page.
    async fn fetch(&self, request: &PageRequest) -> std::result::Result<Page<T>, FetchError>;
}

/// Source of bearer tokens for API requests.
///
/// Consulted before every request. A stale token simply produces an
/// [`FetchError::AuthFailure`] on the next fetch; refreshing is the job of
/// whoever owns the credentials.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CredentialProvider {
    fn current_access_token(&self) -> std::result::Result<String, FetchError>;
}

/// Starting playback of a selected context.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait PlaybackControl {
    async fn start_playback(&self, request: &PlaybackRequest) -> Result<()>;
}
