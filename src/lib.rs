//! Bulk-transition private videos on the authenticated YouTube channel to
//! unlisted, up to a daily cap per run.
//!
//! The workflow is strictly sequential: authenticate, resolve the channel's
//! uploads playlist, scan it page by page for private videos (bounded by the
//! daily cap), then flip each one to unlisted with a short pause between
//! updates. Re-running is always safe: videos that were unlisted on a
//! previous run simply no longer match the private filter.

use crate::youtube_api::client::{TimeBoundAccessToken, YouTubeClient};
use eyre::Context;
use oauth2::basic::BasicTokenResponse;
use std::path::Path;
use std::sync::Arc;
use tokio_stream::StreamExt;

pub mod config;
pub mod oauth;
pub mod sweep;
pub mod youtube_api;

pub use config::RunConfig;
pub use sweep::{UpdateSummary, VideoLibrary, scan_private, unlist_all};

/// Where the serialized OAuth token is persisted between runs.
///
/// The file holds a refreshable credential; it is rewritten on every run and
/// must never be logged or committed.
pub const TOKEN_FILE: &str = "tokens.json";

/// Google installed-app client-secret file, as downloaded from the cloud
/// console.
pub const CLIENT_SECRET_FILE: &str = "client_secret.json";

/// The authenticated account's uploads playlist, as resolved from its
/// channel.
#[derive(Debug)]
pub struct UploadsPlaylist {
    /// Channel title, for progress narration.
    pub channel_title: String,
    /// The playlist ID of the channel's uploads collection.
    pub playlist_id: String,
}

/// Produces an authenticated [`YouTubeClient`], interactively if necessary.
///
/// Loads the stored token from [`TOKEN_FILE`] and proactively refreshes it;
/// a missing file or a rejected refresh falls back to the full browser
/// authorization flow. The resulting token is validated with a cheap API
/// probe and persisted back to disk before any sweep work starts, so a
/// failed run does not cost a re-authorization.
pub async fn setup_youtube_client() -> eyre::Result<YouTubeClient> {
    let oauth_manager = Arc::new(
        oauth::OAuthManager::from_client_secret_file(Path::new(CLIENT_SECRET_FILE))
            .await
            .context("load OAuth client secret")?,
    );

    let stored: Option<BasicTokenResponse> = match tokio::fs::read_to_string(TOKEN_FILE).await {
        Ok(raw) => Some(serde_json::from_str(&raw).context("parse stored YouTube token")?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e).context("read stored YouTube token"),
    };

    let token = match stored {
        Some(raw) => {
            // Stored tokens enter as already-expired so they are refreshed
            // (and thereby revalidated) before first use.
            let mut token = TimeBoundAccessToken::expired(raw);
            if token
                .refresh(&oauth_manager)
                .await
                .context("refresh stored token")?
            {
                tracing::debug!("refreshed stored token");
                token
            } else {
                tracing::warn!("stored token could not be refreshed, re-authorizing");
                tracing::info!("check your browser to authorize access to your channel");
                TimeBoundAccessToken::new(
                    oauth_manager
                        .authenticate()
                        .await
                        .context("authorize account to YouTube")?,
                )
            }
        }
        None => {
            tracing::info!("no stored token, check your browser to authorize access");
            TimeBoundAccessToken::new(
                oauth_manager
                    .authenticate()
                    .await
                    .context("authorize account to YouTube")?,
            )
        }
    };

    let json = serde_json::to_string(token.raw_token()).context("serialize refreshed token")?;
    tokio::fs::write(TOKEN_FILE, json)
        .await
        .context("persist refreshed token")?;

    let client = YouTubeClient::new(token, oauth_manager, reqwest::Client::new());

    if !client
        .validate_token()
        .await
        .context("validate refreshed YouTube token")?
    {
        eyre::bail!("freshly refreshed YouTube token failed validation");
    }

    Ok(client)
}

/// Writes the client's current token back to [`TOKEN_FILE`].
///
/// Called again at the end of a run because the access token may have been
/// refreshed transparently while the sweep was running.
pub async fn persist_token(client: &YouTubeClient) -> eyre::Result<()> {
    let json = serde_json::to_string(&client.token().await).context("serialize current token")?;
    tokio::fs::write(TOKEN_FILE, json)
        .await
        .context("persist current token")?;
    Ok(())
}

/// Resolves the uploads playlist of the authenticated account's channel.
///
/// Streams the account's channels and takes the first one; personal accounts
/// have at most one. Fails if the account has no channel at all.
pub async fn resolve_uploads_playlist(client: &YouTubeClient) -> eyre::Result<UploadsPlaylist> {
    let channels = client.list_my_channels();
    let mut channels = std::pin::pin!(channels);

    let Some(channel) = channels.next().await else {
        eyre::bail!("authenticated account has no YouTube channel");
    };
    let channel = channel.context("fetch channel for authenticated account")?;

    let playlist = UploadsPlaylist {
        channel_title: channel.snippet.title,
        playlist_id: channel.content_details.related_playlists.uploads,
    };
    tracing::info!(
        channel = %playlist.channel_title,
        playlist_id = %playlist.playlist_id,
        "resolved uploads playlist"
    );

    Ok(playlist)
}
