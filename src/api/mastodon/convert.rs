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

//! Type converters from Mastodon wire DTOs to the shared model

use crate::models::{
    MediaAttachment, MediaType, Notification, NotificationKind, Relationship, Status, User,
};

use super::dto;

/// Convert a Mastodon status to a shared Status
pub fn convert_status(status: &dto::MastodonStatus) -> Status {
    // A boost wrapper has empty content of its own
    let text = if status.content.is_empty() {
        status
            .reblog
            .as_deref()
            .map(|inner| strip_html(&inner.content))
            .unwrap_or_default()
    } else {
        strip_html(&status.content)
    };

    Status {
        id: status.id.clone(),
        author: convert_account(&status.account),
        text,
        url: status.url.clone(),
        created_at: status.created_at,
        in_reply_to_id: status.in_reply_to_id.clone(),
        language: status.language.clone(),
        favorite_count: status.favourites_count,
        reshare_count: status.reblogs_count,
        reply_count: status.replies_count,
        favorited: status.favourited,
        reshared: status.reblogged,
        attachments: status
            .media_attachments
            .iter()
            .map(convert_attachment)
            .collect(),
    }
}

/// Convert a Mastodon account to a shared User
pub fn convert_account(account: &dto::MastodonAccount) -> User {
    let display_name = if account.display_name.is_empty() {
        account.username.clone()
    } else {
        account.display_name.clone()
    };

    User {
        id: account.id.clone(),
        handle: account.username.clone(),
        display_name,
        bio: if account.note.is_empty() {
            None
        } else {
            Some(strip_html(&account.note))
        },
        profile_url: account.url.clone(),
        avatar_url: account.avatar.clone(),
        statuses_count: account.statuses_count,
        followers_count: account.followers_count,
        following_count: account.following_count,
        created_at: account.created_at,
    }
}

/// Convert a media attachment
pub fn convert_attachment(media: &dto::MastodonAttachment) -> MediaAttachment {
    MediaAttachment {
        id: media.id.clone(),
        media_type: convert_media_type(&media.kind),
        url: media.url.clone().unwrap_or_default(),
        preview_url: media.preview_url.clone(),
        description: media.description.clone(),
    }
}

fn convert_media_type(kind: &str) -> MediaType {
    match kind {
        "image" => MediaType::Image,
        "video" => MediaType::Video,
        "gifv" => MediaType::Gif,
        "audio" => MediaType::Audio,
        _ => MediaType::Unknown,
    }
}

/// Convert a relationship entry, correcting the wire-name inversion.
///
/// The endpoint's `following` field carries "the target follows me" and
/// its `followed_by` field carries "I follow the target"; the shared
/// model uses the semantic names, so the pair is swapped here and only
/// here.
pub fn convert_relationship(relationship: &dto::MastodonRelationship) -> Relationship {
    Relationship {
        followed_by: relationship.following.unwrap_or(false),
        following: relationship.followed_by.unwrap_or(false),
    }
}

/// Convert a notification
pub fn convert_notification(notification: &dto::MastodonNotification) -> Notification {
    Notification {
        id: notification.id.clone(),
        kind: convert_notification_kind(&notification.kind),
        created_at: notification.created_at,
        account: convert_account(&notification.account),
        status: notification.status.as_ref().map(convert_status),
    }
}

pub(super) fn convert_notification_kind(kind: &str) -> NotificationKind {
    match kind {
        "mention" => NotificationKind::Mention,
        "reblog" => NotificationKind::Reshare,
        "favourite" => NotificationKind::Favorite,
        "follow" => NotificationKind::Follow,
        _ => NotificationKind::Unknown,
    }
}

/// Strip HTML tags from content for plain text
pub(super) fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_inversion_is_corrected_exactly_once() {
        // Wire says following=true, followed_by=false, meaning "they
        // follow me, I don't follow them".
        let wire = dto::MastodonRelationship {
            id: "1".to_string(),
            following: Some(true),
            followed_by: Some(false),
        };

        let relationship = convert_relationship(&wire);
        assert!(relationship.followed_by);
        assert!(!relationship.following);
    }

    #[test]
    fn missing_relationship_flags_default_to_false() {
        let wire = dto::MastodonRelationship {
            id: "1".to_string(),
            following: None,
            followed_by: None,
        };

        let relationship = convert_relationship(&wire);
        assert!(!relationship.followed_by);
        assert!(!relationship.following);
    }

    #[test]
    fn notification_kinds_map_to_model_kinds() {
        assert_eq!(convert_notification_kind("mention"), NotificationKind::Mention);
        assert_eq!(convert_notification_kind("reblog"), NotificationKind::Reshare);
        assert_eq!(convert_notification_kind("favourite"), NotificationKind::Favorite);
        assert_eq!(convert_notification_kind("follow"), NotificationKind::Follow);
        assert_eq!(convert_notification_kind("poll"), NotificationKind::Unknown);
    }

    #[test]
    fn strips_html_and_decodes_entities() {
        let html = "<p>hello <a href=\"x\">world</a> &amp; friends</p>";
        assert_eq!(strip_html(html), "hello world & friends");
    }

    #[test]
    fn empty_display_name_falls_back_to_username() {
        let account = dto::MastodonAccount {
            id: "1".to_string(),
            username: "ferris".to_string(),
            display_name: String::new(),
            note: String::new(),
            url: None,
            avatar: None,
            statuses_count: 0,
            followers_count: 0,
            following_count: 0,
            created_at: None,
        };

        assert_eq!(convert_account(&account).display_name, "ferris");
    }
}
