// Plumage - A multi-account microblogging client
// Copyright (C) 2025 Plumage Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Twitter wire DTOs
//!
//! Response shapes of the v1.1 REST API. These never leave the adapter;
//! `convert` maps them into the shared model.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterStatus {
    pub id_str: String,
    /// e.g. "Wed Oct 10 20:19:24 +0000 2018"
    pub created_at: String,
    pub text: Option<String>,
    /// Set instead of `text` when `tweet_mode=extended` is requested
    pub full_text: Option<String>,
    pub in_reply_to_status_id_str: Option<String>,
    pub lang: Option<String>,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    pub reply_count: Option<u64>,
    pub favorited: Option<bool>,
    pub retweeted: Option<bool>,
    pub user: TwitterUser,
    pub entities: Option<TwitterEntities>,
    pub extended_entities: Option<TwitterEntities>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterEntities {
    #[serde(default)]
    pub media: Vec<TwitterMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterMedia {
    pub id_str: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub media_url_https: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub id_str: String,
    pub screen_name: String,
    pub name: String,
    pub description: Option<String>,
    pub profile_image_url_https: Option<String>,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    /// Accounts followed; Twitter calls these "friends"
    #[serde(default)]
    pub friends_count: u64,
    pub created_at: Option<String>,
}

/// Envelope of `friendships/show.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FriendshipEnvelope {
    pub relationship: Friendship,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Friendship {
    pub source: FriendshipSource,
}

/// The `source` block describes the relationship from the caller's side;
/// the field names here are already semantic.
#[derive(Debug, Clone, Deserialize)]
pub struct FriendshipSource {
    pub following: Option<bool>,
    pub followed_by: Option<bool>,
}

/// Cursored user listing (`followers/list.json`, `friends/list.json`).
/// `next_cursor_str` of `"0"` means the listing is exhausted.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCursorPage {
    #[serde(default)]
    pub users: Vec<TwitterUser>,
    pub next_cursor_str: Option<String>,
}

/// Envelope of `search/tweets.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub statuses: Vec<TwitterStatus>,
    pub search_metadata: Option<SearchMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMetadata {
    /// Ready-made query string for the next page, forwarded verbatim
    pub next_results: Option<String>,
}

/// Structured error payload: `{"errors": [{"code": ..., "message": ...}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorItem {
    pub code: i64,
    pub message: String,
}
