//! The scan-then-update workflow: walk the uploads playlist, collect private
//! videos up to the daily cap, and flip them to unlisted one at a time.
//!
//! Everything here is written against the [`VideoLibrary`] trait rather than
//! the concrete API client so that the workflow can be exercised against an
//! in-memory library in tests. The real implementation lives on
//! [`crate::youtube_api::YouTubeClient`].

use crate::config::RunConfig;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::instrument;

use crate::youtube_api::videos::PrivacyStatus;

/// One page of video IDs from a playlist, plus the continuation token for
/// the page after it (absent on the last page).
#[derive(Debug)]
pub struct PlaylistPage {
    /// Video IDs referenced by this page's playlist items, in playlist order.
    pub video_ids: Vec<String>,
    /// Continuation token for the next page, if there is one.
    pub next_page_token: Option<String>,
}

/// The remote operations the sweep needs from the video platform.
///
/// All calls are issued sequentially; implementations do not need to be
/// re-entrant. Errors from [`VideoLibrary::playlist_page`] and
/// [`VideoLibrary::privacy_statuses`] are fatal to the scan, while errors
/// from [`VideoLibrary::set_unlisted`] are isolated to the one video.
#[async_trait]
pub trait VideoLibrary {
    /// Fetch one page of up to `page_size` items from the given playlist.
    ///
    /// `page_token` is `None` for the first page and the previous page's
    /// continuation token afterwards.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> eyre::Result<PlaylistPage>;

    /// Fetch the privacy status of up to 50 videos in one batched call.
    async fn privacy_statuses(
        &self,
        ids: &[String],
    ) -> eyre::Result<Vec<(String, PrivacyStatus)>>;

    /// Set one video's privacy status to unlisted.
    async fn set_unlisted(&self, id: &str) -> eyre::Result<()>;
}

/// Lazily walks a playlist page by page, yielding each page's video IDs.
///
/// The walk is driven on demand: no page is requested until
/// [`UploadsEnumerator::next_batch`] is called, and the walk stops once a
/// response arrives without a continuation token. Consuming the playlist
/// again requires a new enumerator (and re-issues all the network calls).
pub struct UploadsEnumerator<'a, S: VideoLibrary + ?Sized> {
    library: &'a S,
    playlist_id: &'a str,
    page_size: u32,
    next_page_token: Option<String>,
    /// Page counter, for progress narration only.
    page: usize,
    done: bool,
}

impl<'a, S: VideoLibrary + ?Sized> UploadsEnumerator<'a, S> {
    pub fn new(library: &'a S, playlist_id: &'a str, page_size: u32) -> Self {
        Self {
            library,
            playlist_id,
            page_size,
            next_page_token: None,
            page: 0,
            done: false,
        }
    }

    /// Fetch the next page of video IDs, or `None` once the playlist is
    /// exhausted.
    ///
    /// A fetch error is returned as-is and ends the walk; there is no
    /// partial-page retry.
    pub async fn next_batch(&mut self) -> eyre::Result<Option<Vec<String>>> {
        if self.done {
            return Ok(None);
        }

        self.page += 1;
        tracing::info!(page = self.page, "fetching uploads page");
        let page = self
            .library
            .playlist_page(self.playlist_id, self.page_size, self.next_page_token.take())
            .await?;
        tracing::info!(
            page = self.page,
            items = page.video_ids.len(),
            "fetched uploads page"
        );

        match page.next_page_token {
            Some(token) => self.next_page_token = Some(token),
            None => self.done = true,
        }

        Ok(Some(page.video_ids))
    }
}

/// Narrows a batch of video IDs down to the ones that are currently private.
///
/// Issues a single batched status lookup for the whole batch and keeps the
/// matches in input order. An empty batch short-circuits without a call.
async fn filter_private<S: VideoLibrary + ?Sized>(
    library: &S,
    batch: &[String],
) -> eyre::Result<Vec<String>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let statuses = library.privacy_statuses(batch).await?;
    let private: HashSet<&str> = statuses
        .iter()
        .filter(|(_, status)| *status == PrivacyStatus::Private)
        .map(|(id, _)| id.as_str())
        .collect();

    // Filter the input rather than the response so that the result order is
    // the playlist order even if the API reorders its answer.
    Ok(batch
        .iter()
        .filter(|id| private.contains(id.as_str()))
        .cloned()
        .collect())
}

/// Walks the uploads playlist and collects the IDs of private videos, in
/// playlist order, until the playlist runs out or `config.daily_limit` IDs
/// have been collected.
///
/// The cap is enforced the moment it is reached: remaining matches in the
/// same batch are discarded and no further pages are fetched. Any page-fetch
/// or status-lookup failure aborts the scan; partial results are not
/// returned.
#[instrument(skip(library, config), fields(limit = config.daily_limit))]
pub async fn scan_private<S: VideoLibrary + ?Sized>(
    library: &S,
    playlist_id: &str,
    config: &RunConfig,
) -> eyre::Result<Vec<String>> {
    let mut found = Vec::new();
    let mut pages = UploadsEnumerator::new(library, playlist_id, config.page_size);

    while let Some(batch) = pages.next_batch().await? {
        for id in filter_private(library, &batch).await? {
            tracing::info!(video_id = %id, "found private video");
            found.push(id);
            if found.len() >= config.daily_limit {
                tracing::info!(
                    limit = config.daily_limit,
                    "reached daily limit of private videos, stopping scan"
                );
                return Ok(found);
            }
        }
    }

    Ok(found)
}

/// The per-run outcome of the update phase.
///
/// Per-item failures are collected here rather than raised, so the caller
/// can report a structured summary at the end of the run.
#[derive(Debug, Default)]
pub struct UpdateSummary {
    /// Videos whose privacy status is now unlisted, in update order.
    pub succeeded: Vec<String>,
    /// Videos that could not be updated, with the error for each.
    pub failed: Vec<(String, eyre::Report)>,
}

impl UpdateSummary {
    /// Number of successful updates this run.
    pub fn count(&self) -> usize {
        self.succeeded.len()
    }
}

/// Sets each of `refs` to unlisted, in order, stopping once
/// `config.daily_limit` updates have succeeded.
///
/// A failed update is logged and recorded in the summary but never aborts
/// the rest of the batch; that video simply stays private and is picked up
/// by a future run. After each successful update the task sleeps for
/// `config.per_update_delay` as a self-throttle against remote rate limits.
///
/// The cap is enforced here independently of the scan, so callers passing
/// more than `daily_limit` refs get exactly `daily_limit` updates with the
/// remainder untouched.
#[instrument(skip(library, refs, config), fields(videos = refs.len(), limit = config.daily_limit))]
pub async fn unlist_all<S: VideoLibrary + ?Sized>(
    library: &S,
    refs: &[String],
    config: &RunConfig,
) -> UpdateSummary {
    let mut summary = UpdateSummary::default();

    for id in refs {
        if summary.count() >= config.daily_limit {
            tracing::info!(
                limit = config.daily_limit,
                "daily limit reached, leaving the remaining videos for a future run"
            );
            break;
        }

        match library.set_unlisted(id).await {
            Ok(()) => {
                summary.succeeded.push(id.clone());
                tracing::info!(
                    video_id = %id,
                    updated = summary.count(),
                    limit = config.daily_limit,
                    "video is now unlisted"
                );
                tokio::time::sleep(config.per_update_delay).await;
            }
            Err(e) => {
                tracing::warn!(video_id = %id, error = %e, "failed to unlist video");
                summary.failed.push((id.clone(), e));
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// An in-memory video library: a fixed sequence of playlist pages plus
    /// per-video privacy statuses, with injectable failures and a log of
    /// every call made against it.
    struct FakeLibrary {
        pages: Vec<Vec<String>>,
        statuses: HashMap<String, PrivacyStatus>,
        fail_page: Option<usize>,
        fail_updates: HashSet<String>,
        calls: Mutex<CallLog>,
    }

    #[derive(Default)]
    struct CallLog {
        pages_fetched: usize,
        status_batches: Vec<Vec<String>>,
        updated: Vec<String>,
    }

    impl FakeLibrary {
        fn new(pages: Vec<Vec<(&str, PrivacyStatus)>>) -> Self {
            let statuses = pages
                .iter()
                .flatten()
                .map(|(id, status)| (id.to_string(), *status))
                .collect();
            let pages = pages
                .into_iter()
                .map(|page| page.into_iter().map(|(id, _)| id.to_string()).collect())
                .collect();
            Self {
                pages,
                statuses,
                fail_page: None,
                fail_updates: HashSet::new(),
                calls: Mutex::new(CallLog::default()),
            }
        }

        fn fail_on_page(mut self, page_index: usize) -> Self {
            self.fail_page = Some(page_index);
            self
        }

        fn fail_update_of(mut self, id: &str) -> Self {
            self.fail_updates.insert(id.to_string());
            self
        }

        fn pages_fetched(&self) -> usize {
            self.calls.lock().unwrap().pages_fetched
        }

        fn status_batches(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().status_batches.clone()
        }

        fn updated(&self) -> Vec<String> {
            self.calls.lock().unwrap().updated.clone()
        }
    }

    #[async_trait]
    impl VideoLibrary for FakeLibrary {
        async fn playlist_page(
            &self,
            _playlist_id: &str,
            page_size: u32,
            page_token: Option<String>,
        ) -> eyre::Result<PlaylistPage> {
            let index = match page_token.as_deref() {
                None => 0,
                Some(token) => token
                    .strip_prefix("page-")
                    .expect("fake tokens are page-N")
                    .parse::<usize>()
                    .unwrap(),
            };

            if self.fail_page == Some(index) {
                eyre::bail!("simulated network error fetching page {index}");
            }

            self.calls.lock().unwrap().pages_fetched += 1;

            let video_ids = self.pages.get(index).cloned().unwrap_or_default();
            assert!(video_ids.len() <= page_size as usize);
            let next_page_token = if index + 1 < self.pages.len() {
                Some(format!("page-{}", index + 1))
            } else {
                None
            };

            Ok(PlaylistPage {
                video_ids,
                next_page_token,
            })
        }

        async fn privacy_statuses(
            &self,
            ids: &[String],
        ) -> eyre::Result<Vec<(String, PrivacyStatus)>> {
            assert!(!ids.is_empty(), "empty batches must not reach the API");
            assert!(ids.len() <= 50, "status lookups are capped at 50 ids");
            self.calls
                .lock()
                .unwrap()
                .status_batches
                .push(ids.to_vec());
            Ok(ids
                .iter()
                .map(|id| (id.clone(), self.statuses[id]))
                .collect())
        }

        async fn set_unlisted(&self, id: &str) -> eyre::Result<()> {
            if self.fail_updates.contains(id) {
                eyre::bail!("simulated remote error updating {id}");
            }
            self.calls.lock().unwrap().updated.push(id.to_string());
            Ok(())
        }
    }

    fn config(daily_limit: usize, page_size: u32) -> RunConfig {
        RunConfig {
            daily_limit,
            page_size,
            per_update_delay: Duration::ZERO,
        }
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("vid-{i:03}")).collect()
    }

    /// `count` private videos spread across pages of `per_page`.
    fn private_pages(count: usize, per_page: usize) -> Vec<Vec<(String, PrivacyStatus)>> {
        ids(0..count)
            .chunks(per_page)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|id| (id.clone(), PrivacyStatus::Private))
                    .collect()
            })
            .collect()
    }

    fn library_from(pages: Vec<Vec<(String, PrivacyStatus)>>) -> FakeLibrary {
        FakeLibrary::new(
            pages
                .iter()
                .map(|page| {
                    page.iter()
                        .map(|(id, status)| (id.as_str(), *status))
                        .collect()
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn empty_library_finds_nothing() {
        let library = FakeLibrary::new(vec![vec![]]);
        let found = scan_private(&library, "uploads", &config(200, 50))
            .await
            .unwrap();

        assert!(found.is_empty());
        // the empty page must not trigger a status lookup
        assert!(library.status_batches().is_empty());
    }

    #[tokio::test]
    async fn all_public_library_finds_nothing() {
        let library = FakeLibrary::new(vec![vec![
            ("a", PrivacyStatus::Public),
            ("b", PrivacyStatus::Public),
            ("c", PrivacyStatus::Public),
        ]]);
        let found = scan_private(&library, "uploads", &config(200, 50))
            .await
            .unwrap();

        assert!(found.is_empty());
        assert_eq!(library.status_batches().len(), 1);
        assert!(library.updated().is_empty());
    }

    #[tokio::test]
    async fn scan_preserves_playlist_order() {
        let library = FakeLibrary::new(vec![vec![
            ("a", PrivacyStatus::Public),
            ("b", PrivacyStatus::Private),
            ("c", PrivacyStatus::Unlisted),
            ("d", PrivacyStatus::Private),
            ("e", PrivacyStatus::Private),
        ]]);
        let found = scan_private(&library, "uploads", &config(200, 50))
            .await
            .unwrap();

        assert_eq!(found, ["b", "d", "e"]);
    }

    #[tokio::test]
    async fn scan_stops_at_limit_across_pages() {
        // 250 private videos in 5 pages of 50 with a cap of 200: the cap is
        // reached with the last item of page 4, so page 5 is never fetched.
        let library = library_from(private_pages(250, 50));
        let cfg = config(200, 50);

        let found = scan_private(&library, "uploads", &cfg).await.unwrap();

        assert_eq!(found.len(), 200);
        assert_eq!(found, ids(0..200));
        assert_eq!(library.pages_fetched(), 4);

        let summary = unlist_all(&library, &found, &cfg).await;
        assert_eq!(summary.count(), 200);
        assert!(summary.failed.is_empty());
        assert_eq!(library.updated(), ids(0..200));
    }

    #[tokio::test]
    async fn scan_truncates_immediately_mid_batch() {
        let library = library_from(private_pages(10, 5));
        let found = scan_private(&library, "uploads", &config(3, 5))
            .await
            .unwrap();

        assert_eq!(found, ids(0..3));
        // the cap hit inside page 1, so page 2 is never requested
        assert_eq!(library.pages_fetched(), 1);
        assert_eq!(library.status_batches().len(), 1);
    }

    #[tokio::test]
    async fn page_fetch_failure_aborts_the_scan() {
        let library = library_from(private_pages(100, 50)).fail_on_page(1);
        let err = scan_private(&library, "uploads", &config(200, 50))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("simulated network error"));
        assert!(library.updated().is_empty());
    }

    #[tokio::test]
    async fn update_failure_is_isolated_to_one_video() {
        let library = library_from(private_pages(5, 50)).fail_update_of("vid-002");
        let cfg = config(200, 50);

        let found = scan_private(&library, "uploads", &cfg).await.unwrap();
        assert_eq!(found.len(), 5);

        let summary = unlist_all(&library, &found, &cfg).await;
        assert_eq!(summary.count(), 4);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "vid-002");
        assert_eq!(
            library.updated(),
            ["vid-000", "vid-001", "vid-003", "vid-004"]
        );
    }

    #[tokio::test]
    async fn updater_enforces_the_cap_itself() {
        // more refs than the limit allows, as if the caller had not bounded
        // the scan
        let library = library_from(private_pages(5, 50));
        let refs = ids(0..5);

        let summary = unlist_all(&library, &refs, &config(3, 50)).await;

        assert_eq!(summary.count(), 3);
        assert!(summary.failed.is_empty());
        assert_eq!(library.updated(), ids(0..3));
    }

    #[tokio::test]
    async fn failures_do_not_count_against_the_cap() {
        let library = library_from(private_pages(4, 50)).fail_update_of("vid-000");
        let refs = ids(0..4);

        let summary = unlist_all(&library, &refs, &config(3, 50)).await;

        // the failed first video leaves room for all three later ones
        assert_eq!(summary.count(), 3);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(library.updated(), ids(1..4));
    }

    #[tokio::test(start_paused = true)]
    async fn updates_are_spaced_by_the_configured_delay() {
        let library = library_from(private_pages(3, 50));
        let refs = ids(0..3);
        let cfg = RunConfig {
            daily_limit: 200,
            page_size: 50,
            per_update_delay: Duration::from_millis(100),
        };

        let before = tokio::time::Instant::now();
        let summary = unlist_all(&library, &refs, &cfg).await;
        let elapsed = before.elapsed();

        assert_eq!(summary.count(), 3);
        assert_eq!(elapsed, Duration::from_millis(300));
    }
}
