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

//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Status, User};

/// Kind of notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone mentioned you
    Mention,
    /// Someone reshared your status
    Reshare,
    /// Someone favorited your status
    Favorite,
    /// Someone followed you
    Follow,
    /// Notification kind the backend knows but the model does not
    #[serde(other)]
    Unknown,
}

/// A notification from a backend's notification feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: String,

    /// Kind of notification
    pub kind: NotificationKind,

    /// When this notification was created
    pub created_at: DateTime<Utc>,

    /// The account that triggered the notification
    pub account: User,

    /// The status associated with the notification (if any)
    pub status: Option<Status>,
}
