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

//! Type converters from Twitter wire DTOs to the shared model

use chrono::{DateTime, Utc};

use crate::models::{
    MediaAttachment, MediaType, Notification, NotificationKind, Relationship, Status, User,
};

use super::dto;

/// Twitter's legacy timestamp format
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Convert a tweet to a shared Status
pub fn convert_status(status: &dto::TwitterStatus) -> Status {
    let text = status
        .full_text
        .as_deref()
        .or(status.text.as_deref())
        .unwrap_or_default()
        .to_string();

    // extended_entities carries the full media list when present
    let media = status
        .extended_entities
        .as_ref()
        .or(status.entities.as_ref())
        .map(|entities| entities.media.as_slice())
        .unwrap_or_default();

    Status {
        id: status.id_str.clone(),
        author: convert_user(&status.user),
        text,
        url: Some(format!(
            "https://twitter.com/{}/status/{}",
            status.user.screen_name, status.id_str
        )),
        created_at: parse_created_at(&status.created_at),
        in_reply_to_id: status.in_reply_to_status_id_str.clone(),
        language: status.lang.clone(),
        favorite_count: status.favorite_count,
        reshare_count: status.retweet_count,
        reply_count: status.reply_count.unwrap_or(0),
        favorited: status.favorited,
        reshared: status.retweeted,
        attachments: media.iter().map(convert_media).collect(),
    }
}

/// Convert a Twitter user to a shared User
pub fn convert_user(user: &dto::TwitterUser) -> User {
    User {
        id: user.id_str.clone(),
        handle: user.screen_name.clone(),
        display_name: user.name.clone(),
        bio: user.description.clone().filter(|d| !d.is_empty()),
        profile_url: Some(format!("https://twitter.com/{}", user.screen_name)),
        avatar_url: user.profile_image_url_https.clone(),
        statuses_count: user.statuses_count,
        followers_count: user.followers_count,
        following_count: user.friends_count,
        created_at: user.created_at.as_deref().map(parse_created_at),
    }
}

fn convert_media(media: &dto::TwitterMedia) -> MediaAttachment {
    MediaAttachment {
        id: media.id_str.clone(),
        media_type: match media.kind.as_deref() {
            Some("photo") => MediaType::Image,
            Some("video") => MediaType::Video,
            Some("animated_gif") => MediaType::Gif,
            _ => MediaType::Unknown,
        },
        url: media.media_url_https.clone().unwrap_or_default(),
        preview_url: media.media_url_https.clone(),
        description: None,
    }
}

/// The `source` block already uses semantic names; no swap here.
pub fn convert_relationship(source: &dto::FriendshipSource) -> Relationship {
    Relationship {
        followed_by: source.followed_by.unwrap_or(false),
        following: source.following.unwrap_or(false),
    }
}

/// A mention, recast as a notification record. Twitter has no general
/// notification feed on this API, so mentions are the feed.
pub fn mention_to_notification(status: &dto::TwitterStatus) -> Notification {
    let converted = convert_status(status);
    Notification {
        id: converted.id.clone(),
        kind: NotificationKind::Mention,
        created_at: converted.created_at,
        account: converted.author.clone(),
        status: Some(converted),
    }
}

fn parse_created_at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .map(|created_at| created_at.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_user() -> dto::TwitterUser {
        dto::TwitterUser {
            id_str: "12".to_string(),
            screen_name: "ferris".to_string(),
            name: "Ferris".to_string(),
            description: Some("crab".to_string()),
            profile_image_url_https: None,
            statuses_count: 4,
            followers_count: 2,
            friends_count: 3,
            created_at: Some("Wed Oct 10 20:19:24 +0000 2018".to_string()),
        }
    }

    #[test]
    fn parses_legacy_timestamps() {
        let parsed = parse_created_at("Wed Oct 10 20:19:24 +0000 2018");
        assert_eq!(parsed.to_rfc3339(), "2018-10-10T20:19:24+00:00");
    }

    #[test]
    fn unparseable_timestamp_degrades_to_epoch() {
        assert_eq!(parse_created_at("not a date"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn friendship_source_maps_without_inversion() {
        let source = dto::FriendshipSource {
            following: Some(true),
            followed_by: Some(false),
        };

        let relationship = convert_relationship(&source);
        assert!(relationship.following);
        assert!(!relationship.followed_by);
    }

    #[test]
    fn full_text_wins_over_truncated_text() {
        let status = dto::TwitterStatus {
            id_str: "1".to_string(),
            created_at: "Wed Oct 10 20:19:24 +0000 2018".to_string(),
            text: Some("short…".to_string()),
            full_text: Some("the whole thing".to_string()),
            in_reply_to_status_id_str: None,
            lang: None,
            favorite_count: 0,
            retweet_count: 0,
            reply_count: None,
            favorited: None,
            retweeted: None,
            user: wire_user(),
            entities: None,
            extended_entities: None,
        };

        assert_eq!(convert_status(&status).text, "the whole thing");
    }

    #[test]
    fn friends_count_maps_to_following_count() {
        let user = convert_user(&wire_user());
        assert_eq!(user.following_count, 3);
        assert_eq!(user.handle, "ferris");
    }
}
