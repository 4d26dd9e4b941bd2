use eyre::Context;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use yt_unlist::config::RunConfig;
use yt_unlist::{persist_token, resolve_uploads_playlist, setup_youtube_client, sweep};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let config = RunConfig::from_env().context("load run configuration")?;
    tracing::debug!(?config, "loaded run configuration");

    let client = setup_youtube_client()
        .await
        .context("authenticate to YouTube")?;
    tracing::info!("connected to the YouTube API");

    let uploads = resolve_uploads_playlist(&client)
        .await
        .context("resolve uploads playlist")?;

    let private = sweep::scan_private(&client, &uploads.playlist_id, &config)
        .await
        .context("scan uploads for private videos")?;
    tracing::info!(
        found = private.len(),
        limit = config.daily_limit,
        "finished scanning for private videos"
    );

    if private.is_empty() {
        tracing::info!("no private videos found, nothing to update");
        persist_token(&client).await.context("save token")?;
        return Ok(());
    }

    let summary = sweep::unlist_all(&client, &private, &config).await;
    for (video_id, error) in &summary.failed {
        tracing::warn!(video_id = %video_id, error = %error, "video was left private");
    }
    tracing::info!(
        updated = summary.count(),
        failed = summary.failed.len(),
        limit = config.daily_limit,
        "run complete; re-run tomorrow to pick up any remaining private videos"
    );

    persist_token(&client).await.context("save token")?;

    Ok(())
}
