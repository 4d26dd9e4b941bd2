//! YouTube Videos API types: privacy status reads and updates.

use crate::youtube_api::types::PageInfo;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `videos.list` API call.
///
/// Contains a list of [`Video`] resources that match the request criteria,
/// along with pagination information in [`PageInfo`].
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#videoListResponse`.
    pub kind: String,
    /// A list of videos that match the request criteria.
    #[serde(default)]
    pub items: VecDeque<Video>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `video` resource represents a YouTube video.
///
/// This is the `part=id,status` projection; only the visibility-related
/// fields are carried.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    /// The video's uploading, processing, and privacy statuses.
    pub status: VideoStatus,
}

/// The status object for a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#status>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoStatus {
    /// The video's privacy status.
    #[serde(rename = "privacyStatus")]
    pub privacy_status: PrivacyStatus,
}

/// The privacy status of a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#status.privacyStatus>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    /// Only the owner (and explicitly granted accounts) can see the video.
    Private,
    /// Anyone with the direct link can see the video; it is not searchable.
    Unlisted,
    /// Anyone can see the video.
    Public,
    /// Any value this implementation does not know about.
    #[serde(other)]
    Unknown,
}

/// Request body for the `videos.update` API call with `part=status`.
///
/// Only the privacy status is patched; other status fields keep their
/// current values.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/update>
#[derive(Debug, Serialize)]
pub struct VideoStatusUpdateRequest {
    /// The ID of the video being updated.
    pub id: String,
    /// The replacement status object.
    pub status: VideoStatusPatch,
}

/// The status fields written by a [`VideoStatusUpdateRequest`].
#[derive(Debug, Serialize)]
pub struct VideoStatusPatch {
    /// The privacy status to set on the video.
    #[serde(rename = "privacyStatus")]
    pub privacy_status: PrivacyStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_projection() {
        let raw = r#"{
            "kind": "youtube#videoListResponse",
            "pageInfo": { "totalResults": 2, "resultsPerPage": 2 },
            "items": [
                { "id": "vid1", "status": { "privacyStatus": "private" } },
                { "id": "vid2", "status": { "privacyStatus": "public" } }
            ]
        }"#;

        let response: VideoListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.items[0].status.privacy_status, PrivacyStatus::Private);
        assert_eq!(response.items[1].status.privacy_status, PrivacyStatus::Public);
    }

    #[test]
    fn unrecognized_privacy_values_do_not_fail_the_scan() {
        let raw = r#"{ "privacyStatus": "privacyStatusUnspecified" }"#;
        let status: VideoStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status.privacy_status, PrivacyStatus::Unknown);
    }

    #[test]
    fn serialize_unlisted_update_body() {
        let body = VideoStatusUpdateRequest {
            id: "vid1".to_string(),
            status: VideoStatusPatch {
                privacy_status: PrivacyStatus::Unlisted,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "vid1",
                "status": { "privacyStatus": "unlisted" }
            })
        );
    }
}
