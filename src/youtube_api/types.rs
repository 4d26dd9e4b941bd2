//! Shared types and pagination infrastructure for the YouTube API client.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = eyre::Result<(F, (VecDeque<T>, Option<String>))>> + 'a + Send>>;

/// A stream that walks a paginated YouTube list endpoint page by page.
///
/// Items are yielded one at a time; when the current page runs out, the next
/// page is fetched using the `nextPageToken` from the previous response. Only
/// forward pagination is supported, and a fetch error ends the stream after
/// yielding that error.
pub struct PagedStream<'a, T, F> {
    /// Items from the most recently fetched page that have not been yielded yet
    current_items: VecDeque<T>,
    /// In-flight page fetch, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// Set once a response arrives without a next-page token
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Create a stream that lazily fetches pages using `fetcher`.
    ///
    /// `fetcher` is called with `None` for the first page and with the
    /// previous response's continuation token for every page after that. It
    /// must return the page's items together with the next token, if any.
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<String>)>> + Send + 'a,
    {
        let first_page = async move {
            let results = fetcher(None).await?;
            Ok((fetcher, results))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<String>)>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            if let Some(pending) = self.pending_request.as_mut() {
                match pending.as_mut().poll(cx) {
                    Poll::Ready(Ok((fetcher, (items, next_token)))) => {
                        self.current_items.extend(items);

                        if let Some(next_token) = next_token {
                            // Queue up the fetch for the following page, but
                            // don't poll it until the current items run out.
                            self.pending_request = Some(Box::pin(async move {
                                let results = fetcher(Some(next_token)).await?;
                                Ok((fetcher, results))
                            }));
                        } else {
                            self.is_done = true;
                            self.pending_request = None;
                        }

                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        self.pending_request = None;
                        self.is_done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => {
                        return Poll::Pending;
                    }
                }
            } else {
                self.is_done = true;
                return Poll::Ready(None);
            }
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults")]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}
