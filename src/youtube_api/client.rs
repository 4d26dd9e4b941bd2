//! Core YouTube API client functionality and authentication management.

use crate::oauth::OAuthManager;
use crate::sweep::{PlaylistPage, VideoLibrary};
use crate::youtube_api::{
    channels::{Channel, ChannelListResponse},
    playlist_items::PlaylistItemListResponse,
    types::PagedStream,
    videos::{PrivacyStatus, Video, VideoListResponse, VideoStatusPatch, VideoStatusUpdateRequest},
};
use async_trait::async_trait;
use eyre::Context;
use http::Method;
use oauth2::TokenResponse;
use oauth2::basic::BasicTokenResponse;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio_stream::Stream;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct TimeBoundAccessToken {
    /// The current OAuth2 token
    token: BasicTokenResponse,
    /// When the current access token expires (with safety buffer)
    expires_at: SystemTime,
}

impl TimeBoundAccessToken {
    /// Creates a token that is already considered expired, forcing a refresh
    /// before first use.
    ///
    /// This is how tokens loaded from storage enter the system, so that they
    /// are validated against the OAuth endpoint before any API call.
    pub fn expired(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: SystemTime::UNIX_EPOCH,
            token,
        }
    }

    /// Creates a token with its expiry computed from the OAuth response's
    /// `expires_in` field, minus a safety buffer.
    pub fn new(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Self::calculate_token_expiry(&token),
            token,
        }
    }

    pub fn raw_token(&self) -> &BasicTokenResponse {
        &self.token
    }

    /// Refreshes this token using the provided OAuth manager, preserving the
    /// refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token was successfully refreshed
    /// * `Ok(false)` - Refresh failed (invalid grant, no refresh token, etc.)
    /// * `Err(_)` - Network or other error occurred
    pub async fn refresh(&mut self, oauth_manager: &OAuthManager) -> eyre::Result<bool> {
        tracing::trace!("refreshing token");
        match oauth_manager
            .refresh_token(self.token.clone())
            .await
            .context("refresh OAuth token")?
        {
            Some(new_token) => {
                let old_token = std::mem::replace(&mut self.token, new_token);

                // Google frequently omits the refresh token from refresh
                // responses; keep the original one in that case.
                if self.token.refresh_token().is_none() {
                    tracing::trace!("new token lacks refresh token, preserving original");
                    self.token
                        .set_refresh_token(old_token.refresh_token().cloned());
                } else {
                    tracing::debug!("new token includes refresh token");
                }

                self.expires_at = Self::calculate_token_expiry(&self.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// When to consider the token expired: now + `expires_in` - 5 minutes,
    /// or a conservative 55 minutes when the response carried no lifetime.
    fn calculate_token_expiry(token: &BasicTokenResponse) -> SystemTime {
        let now = SystemTime::now();
        if let Some(expires_in) = token.expires_in() {
            now + expires_in - Duration::from_secs(300)
        } else {
            now + Duration::from_secs(3300)
        }
    }
}

/// Client for interacting with the YouTube Data API v3.
///
/// Wraps an OAuth2 token and exposes the handful of endpoints this tool
/// consumes: channel resolution, playlist enumeration, batched video status
/// lookups, and privacy updates. Expired access tokens are refreshed
/// transparently before each request using the stored refresh token.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    /// The current OAuth2 token, behind a mutex so refreshes are serialized.
    token: Arc<Mutex<TimeBoundAccessToken>>,
    /// OAuth manager for refreshing tokens
    oauth_manager: Arc<OAuthManager>,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Creates a new YouTube API client from an OAuth2 token, the OAuth
    /// manager that can refresh it, and a shared HTTP client.
    pub fn new(
        token: TimeBoundAccessToken,
        oauth_manager: Arc<OAuthManager>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            token: Arc::new(Mutex::new(token)),
            oauth_manager,
            client,
        }
    }

    /// Returns a clone of the underlying OAuth2 token, for persisting back
    /// to the token file.
    pub async fn token(&self) -> BasicTokenResponse {
        self.token.lock().await.token.clone()
    }

    /// Gets a guaranteed-fresh access token, refreshing if necessary.
    #[instrument(skip(self))]
    async fn fresh_access_token(&self) -> eyre::Result<String> {
        let mut token = self.token.lock().await;
        let now = SystemTime::now();

        if now >= token.expires_at {
            tracing::debug!("access token expired, attempting refresh");

            if token.refresh(&self.oauth_manager).await? {
                tracing::debug!("access token successfully refreshed");
            } else {
                tracing::error!("access token refresh failed, client is unusable");
                return Err(eyre::eyre!("Unable to refresh expired access token"));
            }
        }

        Ok(token.token.access_token().secret().to_string())
    }

    /// Makes an authenticated HTTP request to the YouTube API with common
    /// error handling: token freshness, the Authorization header, optional
    /// query parameters and JSON body, and status-code validation.
    ///
    /// Returns the raw [`reqwest::Response`] for method-specific JSON
    /// parsing.
    #[instrument(skip(self, json_body), level = tracing::Level::TRACE)]
    async fn make_authenticated_request(
        &self,
        method: Method,
        url: &str,
        query_params: Option<&[(&str, &str)]>,
        json_body: Option<&impl Serialize>,
    ) -> eyre::Result<reqwest::Response> {
        let access_token = self.fresh_access_token().await?;

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Authorization", format!("Bearer {}", access_token));

        if let Some(params) = query_params {
            request = request.query(params);
        }

        if let Some(body) = json_body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {} request to YouTube API: {}", method, url))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(eyre::eyre!(
                "YouTube API {} request failed with status {}: {}",
                method,
                status_code,
                error_text
            ));
        }

        Ok(response)
    }

    /// Validates the OAuth2 token by making a minimal `channels.list` call.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token is valid and can be used for API calls
    /// * `Ok(false)` - Token is invalid or lacks the required scopes
    /// * `Err(_)` - Network or other error occurred during validation
    #[instrument(skip(self), ret)]
    pub async fn validate_token(&self) -> eyre::Result<bool> {
        match self.list_channels_internal(1, None).await {
            Ok(_) => {
                tracing::debug!("YouTube API token validation successful");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("YouTube API token validation failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Returns a paginated stream of YouTube channels owned by the
    /// authenticated user.
    ///
    /// Uses the `channels.list` API with `mine=true` and requests the
    /// `contentDetails` part, which carries the uploads-playlist ID this
    /// tool scans. Personal accounts typically have exactly one channel;
    /// accounts without a channel yield an empty stream.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube.force-ssl`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub fn list_my_channels(&self) -> impl Stream<Item = eyre::Result<Channel>> + use<'_> {
        PagedStream::new(|page_token| async {
            let response = self.list_channels_internal(50, page_token).await?;
            Ok((response.items, response.next_page_token))
        })
    }

    /// Fetches the privacy status of up to 50 videos in one batched
    /// `videos.list` call with `part=id,status`.
    ///
    /// Videos that do not exist (or are not visible to the authenticated
    /// user) are simply absent from the result.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn video_statuses(&self, ids: &[String]) -> eyre::Result<Vec<Video>> {
        let url = "https://www.googleapis.com/youtube/v3/videos";
        let joined_ids = ids.join(",");
        let query_params = [("part", "id,status"), ("id", joined_ids.as_str())];

        let response = self
            .make_authenticated_request(Method::GET, url, Some(&query_params), None::<&()>)
            .await?;

        let videos: VideoListResponse = response
            .json()
            .await
            .context("parse YouTube videos API response as JSON")?;

        tracing::debug!(
            requested = ids.len(),
            returned_items = videos.items.len(),
            "fetched video statuses"
        );

        Ok(Vec::from(videos.items))
    }

    /// Sets a video's privacy status via `videos.update` with `part=status`.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube.force-ssl`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/update>
    #[instrument(skip(self), ret)]
    pub async fn update_privacy_status(
        &self,
        video_id: &str,
        privacy_status: PrivacyStatus,
    ) -> eyre::Result<Video> {
        let url = "https://www.googleapis.com/youtube/v3/videos";
        let query_params = [("part", "status")];
        let body = VideoStatusUpdateRequest {
            id: video_id.to_string(),
            status: VideoStatusPatch { privacy_status },
        };

        let response = self
            .make_authenticated_request(Method::PUT, url, Some(&query_params), Some(&body))
            .await?;

        let video: Video = response
            .json()
            .await
            .context("parse YouTube videos.update response as JSON")?;

        tracing::debug!(
            video_id = video.id,
            status = ?video.status.privacy_status,
            "updated video privacy status"
        );

        Ok(video)
    }

    /// Internal method to call the `playlistItems.list` API for one page of
    /// a playlist.
    ///
    /// Requests only the `contentDetails` part, which is where the item's
    /// video ID lives.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - The playlist to enumerate
    /// * `max_results` - Maximum number of items to return (1-50)
    /// * `page_token` - Optional continuation token for pagination
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    async fn list_playlist_items_internal(
        &self,
        playlist_id: &str,
        max_results: u32,
        page_token: Option<String>,
    ) -> eyre::Result<PlaylistItemListResponse> {
        let url = "https://www.googleapis.com/youtube/v3/playlistItems";
        let max_results_string = max_results.to_string();
        let mut query_params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results_string.as_str()),
        ];

        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let response = self
            .make_authenticated_request(Method::GET, url, Some(&query_params), None::<&()>)
            .await?;

        let items: PlaylistItemListResponse = response
            .json()
            .await
            .context("parse YouTube playlistItems API response as JSON")?;

        tracing::debug!(
            playlist_id,
            total_results = items.page_info.total_results,
            returned_items = items.items.len(),
            "fetched playlist items page"
        );

        Ok(items)
    }

    /// Internal method to call the `channels.list` API with `mine=true`.
    ///
    /// # Arguments
    ///
    /// * `max_results` - Maximum number of channels to return (1-50)
    /// * `page_token` - Optional page token for pagination
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    async fn list_channels_internal(
        &self,
        max_results: u32,
        page_token: Option<String>,
    ) -> eyre::Result<ChannelListResponse> {
        let url = "https://www.googleapis.com/youtube/v3/channels";
        let max_results_string = max_results.to_string();
        let mut query_params = vec![
            ("part", "id,snippet,contentDetails"),
            ("mine", "true"),
            ("maxResults", max_results_string.as_str()),
        ];

        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let response = self
            .make_authenticated_request(Method::GET, url, Some(&query_params), None::<&()>)
            .await?;

        let channels: ChannelListResponse = response
            .json()
            .await
            .context("parse YouTube channels API response as JSON")?;

        tracing::debug!(
            total_results = channels.page_info.total_results,
            returned_items = channels.items.len(),
            "fetched channels"
        );

        Ok(channels)
    }
}

#[async_trait]
impl VideoLibrary for YouTubeClient {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> eyre::Result<PlaylistPage> {
        let response = self
            .list_playlist_items_internal(playlist_id, page_size, page_token)
            .await?;

        Ok(PlaylistPage {
            video_ids: response
                .items
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    async fn privacy_statuses(
        &self,
        ids: &[String],
    ) -> eyre::Result<Vec<(String, PrivacyStatus)>> {
        let videos = self.video_statuses(ids).await?;
        Ok(videos
            .into_iter()
            .map(|video| (video.id, video.status.privacy_status))
            .collect())
    }

    async fn set_unlisted(&self, id: &str) -> eyre::Result<()> {
        self.update_privacy_status(id, PrivacyStatus::Unlisted)
            .await?;
        Ok(())
    }
}
