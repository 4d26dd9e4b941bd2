//! YouTube Channels API types.

use crate::youtube_api::types::PageInfo;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `channels.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#channelListResponse`.
    pub kind: String,
    /// A list of channels that match the request criteria.
    ///
    /// The API omits this field entirely when the authenticated account has
    /// no channel, hence the default.
    #[serde(default)]
    pub items: VecDeque<Channel>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `channel` resource contains information about a YouTube channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    /// Contains basic details about the channel.
    pub snippet: ChannelSnippet,
    /// Encapsulates information about the channel's content, including the
    /// channel-owned playlists such as uploads.
    #[serde(rename = "contentDetails")]
    pub content_details: ChannelContentDetails,
}

/// The snippet object contains basic details about the channel.
///
/// This is a subset of the full snippet data available from the YouTube API,
/// containing only the fields currently needed by this implementation.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#snippet>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelSnippet {
    /// The channel's title.
    pub title: String,
    /// The channel's description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The date and time that the channel was created.
    ///
    /// The value is specified in ISO 8601 format.
    #[serde(rename = "publishedAt")]
    pub published_at: Timestamp,
}

/// The contentDetails object for a channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#contentDetails>
#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelContentDetails {
    /// Playlists that YouTube associates with the channel.
    #[serde(rename = "relatedPlaylists")]
    pub related_playlists: RelatedPlaylists,
}

/// The playlists that YouTube maintains on the channel's behalf.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedPlaylists {
    /// The ID of the playlist that contains the channel's uploaded videos.
    pub uploads: String,
    /// The ID of the playlist that contains the channel's liked videos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_with_uploads_playlist() {
        let raw = r#"{
            "kind": "youtube#channelListResponse",
            "pageInfo": { "totalResults": 1, "resultsPerPage": 50 },
            "items": [{
                "id": "UCxyz",
                "snippet": {
                    "title": "My Channel",
                    "description": "stuff",
                    "publishedAt": "2014-05-01T12:00:00Z"
                },
                "contentDetails": {
                    "relatedPlaylists": { "uploads": "UUxyz", "likes": "" }
                }
            }]
        }"#;

        let response: ChannelListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(
            response.items[0].content_details.related_playlists.uploads,
            "UUxyz"
        );
        assert!(response.next_page_token.is_none());
    }

    #[test]
    fn parse_channelless_account_response() {
        // channels.list with mine=true omits `items` for accounts without a
        // channel
        let raw = r#"{
            "kind": "youtube#channelListResponse",
            "pageInfo": { "totalResults": 0, "resultsPerPage": 50 }
        }"#;

        let response: ChannelListResponse = serde_json::from_str(raw).unwrap();
        assert!(response.items.is_empty());
    }
}
