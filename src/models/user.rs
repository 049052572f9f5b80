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

//! User model shared across backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user/account on any supported backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier on the owning backend
    pub id: String,

    /// Handle (username without host)
    pub handle: String,

    /// Display name
    pub display_name: String,

    /// Profile bio, as plain text
    pub bio: Option<String>,

    /// URL to the user's profile page
    pub profile_url: Option<String>,

    /// URL to the user's avatar image
    pub avatar_url: Option<String>,

    /// Number of posts
    pub statuses_count: u64,

    /// Number of followers
    pub followers_count: u64,

    /// Number of accounts followed
    pub following_count: u64,

    /// When the account was created, when the backend reports it
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Minimal user with only identity fields set. Used when a backend
    /// payload embeds a bare reference instead of a full user object.
    pub fn placeholder(id: &str, handle: &str) -> Self {
        Self {
            id: id.to_string(),
            handle: handle.to_string(),
            display_name: handle.to_string(),
            bio: None,
            profile_url: None,
            avatar_url: None,
            statuses_count: 0,
            followers_count: 0,
            following_count: 0,
            created_at: None,
        }
    }
}

/// Relationship between the caller and a target user.
///
/// The field names are semantic: `followed_by` means "the target follows
/// me", `following` means "I follow the target". Backends whose wire
/// field names are inverted relative to these semantics are corrected in
/// their adapter's converter, never here and never by callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    /// The target follows the caller
    pub followed_by: bool,
    /// The caller follows the target
    pub following: bool,
}
