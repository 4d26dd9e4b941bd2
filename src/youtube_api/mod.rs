//! YouTube Data API v3 client.
//!
//! Covers the small slice of the API this tool consumes:
//!
//! - [`channels`] — `channels.list`, used once per run to resolve the
//!   authenticated user's uploads playlist from
//!   `contentDetails.relatedPlaylists.uploads`.
//! - [`playlist_items`] — `playlistItems.list`, used to walk the uploads
//!   playlist page by page.
//! - [`videos`] — `videos.list` with `part=id,status` for batched privacy
//!   lookups, and `videos.update` for the private → unlisted transition.
//!
//! [`client::YouTubeClient`] holds the OAuth token and issues the requests;
//! [`types::PagedStream`] adapts the token-based pagination into a lazy
//! stream.

pub mod channels;
pub mod client;
pub mod playlist_items;
pub mod types;
pub mod videos;

// Re-export main types for convenience
pub use client::{TimeBoundAccessToken, YouTubeClient};
pub use types::{PageInfo, PagedStream};

pub use channels::{Channel, ChannelContentDetails, ChannelSnippet, RelatedPlaylists};

pub use playlist_items::{PlaylistItem, PlaylistItemContentDetails};

pub use videos::{PrivacyStatus, Video, VideoStatus};
