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

//! Mastodon wire DTOs
//!
//! Response shapes as the Mastodon REST API sends them. These never leave
//! the adapter; `convert` maps them into the shared model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonStatus {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub in_reply_to_id: Option<String>,
    pub url: Option<String>,
    /// HTML content
    #[serde(default)]
    pub content: String,
    pub language: Option<String>,
    #[serde(default)]
    pub favourites_count: u64,
    #[serde(default)]
    pub reblogs_count: u64,
    #[serde(default)]
    pub replies_count: u64,
    pub favourited: Option<bool>,
    pub reblogged: Option<bool>,
    pub account: MastodonAccount,
    #[serde(default)]
    pub media_attachments: Vec<MastodonAttachment>,
    /// Present when this status is a boost wrapper
    pub reblog: Option<Box<MastodonStatus>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonAccount {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    /// Profile bio, HTML
    #[serde(default)]
    pub note: String,
    pub url: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub preview_url: Option<String>,
    pub description: Option<String>,
}

/// Relationship entry from `/api/v1/accounts/relationships`.
///
/// On this endpoint the wire names are inverted relative to their
/// meaning: `following` carries "this account follows me" and
/// `followed_by` carries "I follow this account". The converter swaps
/// them exactly once.
#[derive(Debug, Clone, Deserialize)]
pub struct MastodonRelationship {
    pub id: String,
    pub following: Option<bool>,
    pub followed_by: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonNotification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub account: MastodonAccount,
    pub status: Option<MastodonStatus>,
}

/// Envelope returned by `/api/v2/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub statuses: Vec<MastodonStatus>,
    #[serde(default)]
    pub accounts: Vec<MastodonAccount>,
}

/// Structured error payload: `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
