//! YouTube PlaylistItems API types.

use crate::youtube_api::types::PageInfo;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `playlistItems.list` API call.
///
/// One page of the items in a playlist, at most 50 per request, with a
/// continuation token when more pages follow.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#playlistItemListResponse`.
    pub kind: String,
    /// A list of playlist items that match the request criteria.
    #[serde(default)]
    pub items: VecDeque<PlaylistItem>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `playlistItem` resource identifies one video within a playlist.
///
/// For the uploads playlist this is one uploaded video; the video's own ID
/// lives in [`PlaylistItemContentDetails`].
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// The ID that YouTube uses to uniquely identify the playlist item.
    ///
    /// Note that this is not the video ID.
    pub id: String,
    /// Details about the video the playlist item refers to.
    #[serde(rename = "contentDetails")]
    pub content_details: PlaylistItemContentDetails,
}

/// The contentDetails object for a playlist item.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#contentDetails>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemContentDetails {
    /// The ID that YouTube uses to uniquely identify the referenced video.
    #[serde(rename = "videoId")]
    pub video_id: String,
    /// The date and time that the video was published to YouTube.
    ///
    /// Absent for videos that have not been published yet, which includes
    /// private uploads.
    #[serde(rename = "videoPublishedAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_published_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uploads_page_with_continuation() {
        let raw = r#"{
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "CAUQAA",
            "pageInfo": { "totalResults": 120, "resultsPerPage": 50 },
            "items": [
                {
                    "id": "UExfabc.123",
                    "contentDetails": {
                        "videoId": "dQw4w9WgXcQ",
                        "videoPublishedAt": "2019-11-01T08:00:00Z"
                    }
                },
                {
                    "id": "UExfabc.124",
                    "contentDetails": { "videoId": "aaaaaaaaaaa" }
                }
            ]
        }"#;

        let response: PlaylistItemListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].content_details.video_id, "dQw4w9WgXcQ");
        // private uploads have no publish timestamp
        assert!(response.items[1].content_details.video_published_at.is_none());
    }
}
