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

//! Unified status model
//!
//! One post/message shape for every backend. Adapters produce these from
//! their wire payloads; a `Status` is immutable once returned. Mutation
//! operations (like/unlike/reshare/...) return a *new* `Status` reflecting
//! the server's post-mutation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaAttachment, User};

/// A post on any supported backend, normalized to one shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    /// Unique identifier on the owning backend
    pub id: String,

    /// The account that authored this status
    pub author: User,

    /// Plain text content
    pub text: String,

    /// URL to the status' HTML representation
    pub url: Option<String>,

    /// When this status was created
    pub created_at: DateTime<Utc>,

    /// ID of the status this is replying to
    pub in_reply_to_id: Option<String>,

    /// Language of the status (ISO 639-1), when the backend reports one
    pub language: Option<String>,

    /// Number of favorites/likes
    pub favorite_count: u64,

    /// Number of reshares/boosts
    pub reshare_count: u64,

    /// Number of replies
    pub reply_count: u64,

    /// Whether the current user has favorited this
    pub favorited: Option<bool>,

    /// Whether the current user has reshared this
    pub reshared: Option<bool>,

    /// Media attachments
    pub attachments: Vec<MediaAttachment>,
}

impl Status {
    /// Fold a local un-favorite into a server echo that still carries the
    /// pre-mutation count. Clamps at zero.
    pub fn apply_unfavorite(mut self) -> Self {
        self.favorite_count = self.favorite_count.saturating_sub(1);
        self.favorited = Some(false);
        self
    }

    /// Fold a local un-reshare into a server echo that still carries the
    /// pre-mutation count. Clamps at zero.
    pub fn apply_unreshare(mut self) -> Self {
        self.reshare_count = self.reshare_count.saturating_sub(1);
        self.reshared = Some(false);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn status(favorite_count: u64, reshare_count: u64) -> Status {
        Status {
            id: "1".to_string(),
            author: User::placeholder("7", "someone"),
            text: "hello".to_string(),
            url: None,
            created_at: Utc::now(),
            in_reply_to_id: None,
            language: None,
            favorite_count,
            reshare_count,
            reply_count: 0,
            favorited: Some(true),
            reshared: Some(true),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn unfavorite_decrements_and_clears_flag() {
        let result = status(3, 0).apply_unfavorite();
        assert_eq!(result.favorite_count, 2);
        assert_eq!(result.favorited, Some(false));
    }

    #[test]
    fn unfavorite_clamps_at_zero() {
        let result = status(0, 0).apply_unfavorite();
        assert_eq!(result.favorite_count, 0);
    }

    #[test]
    fn unreshare_decrements_reshare_count_only() {
        let result = status(5, 2).apply_unreshare();
        assert_eq!(result.reshare_count, 1);
        assert_eq!(result.favorite_count, 5);
        assert_eq!(result.reshared, Some(false));
    }

    #[test]
    fn unreshare_clamps_at_zero() {
        let result = status(0, 0).apply_unreshare();
        assert_eq!(result.reshare_count, 0);
    }
}
