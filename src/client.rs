use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::fetcher::{CredentialProvider, PageFetcher, PlaybackControl};
use crate::page::{Page, PageRequest, Paging, Resource};
use crate::retry::{retry_with_backoff, AttemptError};
use crate::types::{PlaybackRequest, PlaylistTrack, SimplePlaylist};
use crate::{LibraryError, Result};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;

/// Client for the Spotify Web API.
///
/// Fetches pages of playlists and playlist tracks, and starts playback. Every
/// request carries a bearer token obtained from the [`CredentialProvider`]
/// right before it is sent. Rate limited requests (HTTP 429) are retried here,
/// honoring `Retry-After`, according to the [`RetryConfig`](crate::RetryConfig);
/// nothing else is retried.
///
/// # Examples
///
/// ```rust,no_run
/// use baton_library::{EnvToken, PageFetcher, PageQuery, PageRequest, SimplePlaylist, SpotifyClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Create client with any HTTP implementation
///     let http_client = http_client::native::NativeClient::new();
///     let client = SpotifyClient::new(Box::new(http_client), Box::new(EnvToken::default()));
///
///     let request = PageRequest::Initial(PageQuery::my_playlists(20));
///     let page: baton_library::Page<SimplePlaylist> = client.fetch(&request).await?;
///     println!("{} of {} playlists", page.items.len(), page.total);
///
///     Ok(())
/// }
/// ```
pub struct SpotifyClient {
    client: Box<dyn HttpClient>,
    credentials: Box<dyn CredentialProvider>,
    config: ClientConfig,
}

impl SpotifyClient {
    /// Create a client with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `client` - Any HTTP client implementation that implements [`HttpClient`]
    /// * `credentials` - Source of bearer tokens
    pub fn new(client: Box<dyn HttpClient>, credentials: Box<dyn CredentialProvider>) -> Self {
        Self::with_config(client, credentials, ClientConfig::default())
    }

    pub fn with_config(
        client: Box<dyn HttpClient>,
        credentials: Box<dyn CredentialProvider>,
        config: ClientConfig,
    ) -> Self {
        Self {
            client,
            credentials,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of the first page for a request; continuation cursors are returned verbatim.
    pub fn request_url(&self, request: &PageRequest) -> String {
        match request {
            PageRequest::Initial(query) => match &query.resource {
                Resource::MyPlaylists => format!(
                    "{}/me/playlists?limit={}&offset=0",
                    self.config.base_url, query.limit
                ),
                Resource::PlaylistTracks { playlist_id } => format!(
                    "{}/playlists/{}/tracks?limit={}&offset=0",
                    self.config.base_url,
                    urlencoding::encode(playlist_id),
                    query.limit
                ),
            },
            PageRequest::Continuation(cursor) => cursor.clone(),
        }
    }

    async fn fetch_page<D: DeserializeOwned>(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<Page<D>, FetchError> {
        let url = self.request_url(request);
        let body = self.execute(Method::Get, &url, None).await?;

        let paging: Paging<D> = serde_json::from_str(&body)
            .map_err(|e| FetchError::Malformed(format!("page from {url}: {e}")))?;
        log::debug!(
            "Fetched {} items at offset {} of {} from {}",
            paging.items.len(),
            paging.offset,
            paging.total,
            url
        );
        Ok(paging.into())
    }

    /// Send a request, retrying while rate limited, and return the response body.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> std::result::Result<String, FetchError> {
        let client = self;
        let retry = retry_with_backoff(&self.config.retry, url, move || {
            client.send_once(method.clone(), url, body)
        })
        .await?;

        if retry.attempts_made > 0 {
            log::info!(
                "{} succeeded after {} retries ({}s waited)",
                url,
                retry.attempts_made,
                retry.total_retry_time
            );
        }
        Ok(retry.result)
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> std::result::Result<String, AttemptError> {
        let token = self.credentials.current_access_token()?;
        let parsed = Url::parse(url)
            .map_err(|e| FetchError::Malformed(format!("invalid URL '{url}': {e}")))?;

        let mut request = Request::new(method.clone(), parsed);
        if token.chars().any(|c| c.is_control()) {
            return Err(
                FetchError::AuthFailure("access token contains control characters".into()).into(),
            );
        }
        request
            .insert_header("Authorization", format!("Bearer {token}"))
            .map_err(|e| {
                FetchError::AuthFailure(format!("access token is not a valid header value: {e}"))
            })?;
        let _ = request.insert_header("Accept", "application/json");
        if let Some(body) = body {
            let _ = request.insert_header("Content-Type", "application/json");
            request.set_body(body);
        }

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        log::debug!("{method} {url} -> {status}");

        if status == 429 {
            let retry_after = response
                .header("Retry-After")
                .and_then(|h| h.get(0))
                .and_then(|v| v.as_str().trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(AttemptError::RateLimited { retry_after });
        }

        let text = response.body_string().await;
        if status == 401 || status == 403 {
            let detail = excerpt(text.as_deref().unwrap_or_default());
            return Err(FetchError::AuthFailure(format!("{status} from {url}: {detail}")).into());
        }
        let text =
            text.map_err(|e| FetchError::Network(format!("reading body from {url}: {e}")))?;

        if !status.is_success() {
            return Err(
                FetchError::Network(format!("{status} from {url}: {}", excerpt(&text))).into(),
            );
        }
        Ok(text)
    }
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(200) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

#[async_trait(?Send)]
impl PageFetcher<SimplePlaylist> for SpotifyClient {
    async fn fetch(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<Page<SimplePlaylist>, FetchError> {
        self.fetch_page(request).await
    }
}

#[async_trait(?Send)]
impl PageFetcher<PlaylistTrack> for SpotifyClient {
    async fn fetch(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<Page<PlaylistTrack>, FetchError> {
        self.fetch_page(request).await
    }
}

#[async_trait(?Send)]
impl PlaybackControl for SpotifyClient {
    async fn start_playback(&self, request: &PlaybackRequest) -> Result<()> {
        let mut url = format!("{}/me/player/play", self.config.base_url);
        if let Some(device_id) = &request.device_id {
            url.push_str(&format!("?device_id={}", urlencoding::encode(device_id)));
        }
        let body = serde_json::json!({ "context_uri": request.context_uri }).to_string();

        log::debug!("Starting playback of {}", request.context_uri);
        self.execute(Method::Put, &url, Some(&body))
            .await
            .map_err(|e| LibraryError::fetch(format!("playback of {}", request.context_uri), e))?;
        Ok(())
    }
}
