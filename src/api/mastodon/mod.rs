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

//! Mastodon backend adapter
//!
//! Speaks the Mastodon REST API (`/api/v1`, `/api/v2/search`). Everything
//! pages by id here: timelines through raw `since_id`/`max_id` bounds,
//! followers/following and status search through an id-bounded cursor
//! derived from the last element of the page. The notification feed
//! doubles as the mentions timeline since Mastodon has no dedicated
//! mentions endpoint.

mod convert;
mod dto;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::models::{
    BackendKind, Cursor, Notification, NotificationKind, Page, Relationship, Status, User,
};

use super::error::{classify_status, ApiError, ApiResult};
use super::transport::{self, ByteStream, ProgressObserver};
use super::{
    own_cursor, LookupService, MediaDownloadService, MicroBlogService, NotificationService,
    RelationshipService, SearchService, StatusService, TimelineService,
};

/// Notification types excluded when deriving the mentions timeline: every
/// kind except `mention`, so only mention entries come back.
const NON_MENTION_TYPES: &[&str] = &[
    "follow",
    "follow_request",
    "favourite",
    "reblog",
    "poll",
    "update",
    "status",
];

/// Adapter for a Mastodon-compatible instance.
pub struct MastodonAdapter {
    base_url: String,
    access_token: String,
    client: OnceCell<reqwest::Client>,
}

impl MastodonAdapter {
    pub fn new(host: &str, access_token: &str) -> Self {
        Self {
            base_url: transport::normalize_base_url(host),
            access_token: access_token.to_string(),
            client: OnceCell::new(),
        }
    }

    /// The transport client, built on first use and shared afterwards.
    async fn client(&self) -> ApiResult<&reqwest::Client> {
        self.client
            .get_or_try_init(|| async { transport::build_client(&self.access_token) })
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_api_call!("GET", &url);
        let response = self
            .client()
            .await?
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;
        read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_api_call!("POST", &url);
        let response = self
            .client()
            .await?
            .post(&url)
            .send()
            .await
            .map_err(ApiError::from)?;
        read_json(response).await
    }

    /// POST where the response body is irrelevant (follow/unfollow).
    async fn post_discard(&self, path: &str) -> ApiResult<()> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_api_call!("POST", &url);
        let response = self
            .client()
            .await?
            .post(&url)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_error(status.as_u16(), &body))
    }

    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_api_call!("DELETE", &url);
        let response = self
            .client()
            .await?
            .delete(&url)
            .send()
            .await
            .map_err(ApiError::from)?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(ApiError::from)?;

    if !status.is_success() {
        return Err(map_error(status.as_u16(), &body));
    }
    if body.is_empty() {
        return Err(ApiError::Transport("empty response body".to_string()));
    }

    serde_json::from_str(&body)
        .map_err(|e| ApiError::Transport(format!("malformed response body: {e}")))
}

fn map_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<dto::ErrorBody>(body)
        .ok()
        .map(|payload| payload.error);
    classify_status(status, message)
}

fn paging_query(
    count: u32,
    since_id: Option<&str>,
    max_id: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", count.to_string())];
    if let Some(since_id) = since_id {
        query.push(("since_id", since_id.to_string()));
    }
    if let Some(max_id) = max_id {
        query.push(("max_id", max_id.to_string()));
    }
    query
}

fn to_statuses(items: &[dto::MastodonStatus], count: u32) -> Vec<Status> {
    let mut statuses: Vec<Status> = items.iter().map(convert::convert_status).collect();
    statuses.truncate(count as usize);
    statuses
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[async_trait]
impl TimelineService for MastodonAdapter {
    async fn home_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>> {
        let query = paging_query(count, since_id, max_id);
        let statuses: Vec<dto::MastodonStatus> =
            self.get_json("/api/v1/timelines/home", &query).await?;
        Ok(to_statuses(&statuses, count))
    }

    async fn user_timeline(
        &self,
        user_id: &str,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
        exclude_replies: bool,
    ) -> ApiResult<Vec<Status>> {
        let mut query = paging_query(count, since_id, max_id);
        query.push(("exclude_replies", exclude_replies.to_string()));
        let path = format!("/api/v1/accounts/{}/statuses", encode(user_id));
        let statuses: Vec<dto::MastodonStatus> = self.get_json(&path, &query).await?;
        Ok(to_statuses(&statuses, count))
    }

    async fn favorites(
        &self,
        _user_id: &str,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>> {
        // Mastodon only exposes the caller's own favorites
        let query = paging_query(count, since_id, max_id);
        let statuses: Vec<dto::MastodonStatus> =
            self.get_json("/api/v1/favourites", &query).await?;
        Ok(to_statuses(&statuses, count))
    }

    async fn pinned_statuses(&self, user_id: &str) -> ApiResult<Vec<Status>> {
        let path = format!("/api/v1/accounts/{}/statuses", encode(user_id));
        let query = vec![("pinned", "true".to_string())];
        let statuses: Vec<dto::MastodonStatus> = self.get_json(&path, &query).await?;
        Ok(statuses.iter().map(convert::convert_status).collect())
    }
}

#[async_trait]
impl LookupService for MastodonAdapter {
    async fn lookup_user(&self, id: &str) -> ApiResult<User> {
        let path = format!("/api/v1/accounts/{}", encode(id));
        let account: dto::MastodonAccount = self.get_json(&path, &[]).await?;
        Ok(convert::convert_account(&account))
    }

    async fn lookup_user_by_name(&self, name: &str) -> ApiResult<User> {
        debug!(name, "name-based user lookup has no wire endpoint here");
        Err(ApiError::Unsupported)
    }

    async fn lookup_users_by_name(&self, _names: &[String]) -> ApiResult<Vec<User>> {
        Err(ApiError::Unsupported)
    }

    async fn lookup_status(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/api/v1/statuses/{}", encode(id));
        let status: dto::MastodonStatus = self.get_json(&path, &[]).await?;
        Ok(convert::convert_status(&status))
    }
}

#[async_trait]
impl RelationshipService for MastodonAdapter {
    async fn show_relationship(&self, target_id: &str) -> ApiResult<Relationship> {
        let query = vec![("id[]", target_id.to_string())];
        let relationships: Vec<dto::MastodonRelationship> = self
            .get_json("/api/v1/accounts/relationships", &query)
            .await?;
        let relationship = relationships.first().ok_or(ApiError::NotFound)?;
        Ok(convert::convert_relationship(relationship))
    }

    async fn followers(&self, user_id: &str, cursor: Option<&Cursor>) -> ApiResult<Page<User>> {
        let token = own_cursor(cursor, BackendKind::Mastodon)?;
        let path = format!("/api/v1/accounts/{}/followers", encode(user_id));
        let mut query = Vec::new();
        if let Some(token) = token {
            query.push(("max_id", token.to_string()));
        }
        let accounts: Vec<dto::MastodonAccount> = self.get_json(&path, &query).await?;
        let users: Vec<User> = accounts.iter().map(convert::convert_account).collect();
        Ok(Page::id_bounded(BackendKind::Mastodon, users, |user| {
            user.id.as_str()
        }))
    }

    async fn following(&self, user_id: &str, cursor: Option<&Cursor>) -> ApiResult<Page<User>> {
        let token = own_cursor(cursor, BackendKind::Mastodon)?;
        let path = format!("/api/v1/accounts/{}/following", encode(user_id));
        let mut query = Vec::new();
        if let Some(token) = token {
            query.push(("max_id", token.to_string()));
        }
        let accounts: Vec<dto::MastodonAccount> = self.get_json(&path, &query).await?;
        let users: Vec<User> = accounts.iter().map(convert::convert_account).collect();
        Ok(Page::id_bounded(BackendKind::Mastodon, users, |user| {
            user.id.as_str()
        }))
    }

    async fn follow(&self, user_id: &str) -> ApiResult<()> {
        let path = format!("/api/v1/accounts/{}/follow", encode(user_id));
        self.post_discard(&path).await
    }

    async fn unfollow(&self, user_id: &str) -> ApiResult<()> {
        let path = format!("/api/v1/accounts/{}/unfollow", encode(user_id));
        self.post_discard(&path).await
    }
}

#[async_trait]
impl NotificationService for MastodonAdapter {
    async fn notification_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Notification>> {
        let query = paging_query(count, since_id, max_id);
        let notifications: Vec<dto::MastodonNotification> =
            self.get_json("/api/v1/notifications", &query).await?;
        let mut notifications: Vec<Notification> = notifications
            .iter()
            .map(convert::convert_notification)
            .collect();
        notifications.truncate(count as usize);
        Ok(notifications)
    }

    async fn mentions_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>> {
        let mut query = paging_query(count, since_id, max_id);
        for kind in NON_MENTION_TYPES {
            query.push(("exclude_types[]", kind.to_string()));
        }

        let notifications: Vec<dto::MastodonNotification> =
            self.get_json("/api/v1/notifications", &query).await?;
        let mut mentions: Vec<Status> = notifications
            .iter()
            .map(convert::convert_notification)
            .filter(|notification| notification.kind == NotificationKind::Mention)
            .filter_map(|notification| notification.status)
            .collect();
        mentions.truncate(count as usize);
        Ok(mentions)
    }
}

#[async_trait]
impl SearchService for MastodonAdapter {
    async fn search_statuses(
        &self,
        query: &str,
        count: u32,
        cursor: Option<&Cursor>,
    ) -> ApiResult<Page<Status>> {
        let token = own_cursor(cursor, BackendKind::Mastodon)?;
        let mut params = vec![
            ("q", query.to_string()),
            ("type", "statuses".to_string()),
            ("limit", count.to_string()),
        ];
        if let Some(token) = token {
            params.push(("max_id", token.to_string()));
        }

        let results: dto::SearchResults = self.get_json("/api/v2/search", &params).await?;
        let statuses = to_statuses(&results.statuses, count);
        Ok(Page::id_bounded(BackendKind::Mastodon, statuses, |status| {
            status.id.as_str()
        }))
    }

    async fn search_users(
        &self,
        query: &str,
        page: Option<u32>,
        count: u32,
    ) -> ApiResult<Vec<User>> {
        let offset = page.unwrap_or(0) * count;
        let params = vec![
            ("q", query.to_string()),
            ("type", "accounts".to_string()),
            ("limit", count.to_string()),
            ("offset", offset.to_string()),
        ];

        let results: dto::SearchResults = self.get_json("/api/v2/search", &params).await?;
        Ok(results.accounts.iter().map(convert::convert_account).collect())
    }
}

#[async_trait]
impl StatusService for MastodonAdapter {
    async fn like(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/api/v1/statuses/{}/favourite", encode(id));
        let status: dto::MastodonStatus = self.post_json(&path).await?;
        Ok(convert::convert_status(&status))
    }

    async fn unlike(&self, id: &str) -> ApiResult<Status> {
        // The echo still carries the pre-mutation count
        let path = format!("/api/v1/statuses/{}/unfavourite", encode(id));
        let status: dto::MastodonStatus = self.post_json(&path).await?;
        Ok(convert::convert_status(&status).apply_unfavorite())
    }

    async fn reshare(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/api/v1/statuses/{}/reblog", encode(id));
        let status: dto::MastodonStatus = self.post_json(&path).await?;
        Ok(convert::convert_status(&status))
    }

    async fn unreshare(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/api/v1/statuses/{}/unreblog", encode(id));
        let status: dto::MastodonStatus = self.post_json(&path).await?;
        Ok(convert::convert_status(&status).apply_unreshare())
    }

    async fn delete(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/api/v1/statuses/{}", encode(id));
        let status: dto::MastodonStatus = self.delete_json(&path).await?;
        Ok(convert::convert_status(&status))
    }
}

#[async_trait]
impl MediaDownloadService for MastodonAdapter {
    async fn download(
        &self,
        url: &str,
        observer: Option<ProgressObserver>,
    ) -> ApiResult<ByteStream> {
        let client = self.client().await?;
        transport::fetch_stream(client, url, observer, map_error).await
    }
}

impl MicroBlogService for MastodonAdapter {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Mastodon
    }

    fn timelines(&self) -> Option<&dyn TimelineService> {
        Some(self)
    }

    fn lookups(&self) -> Option<&dyn LookupService> {
        Some(self)
    }

    fn relationships(&self) -> Option<&dyn RelationshipService> {
        Some(self)
    }

    fn notifications(&self) -> Option<&dyn NotificationService> {
        Some(self)
    }

    fn search(&self) -> Option<&dyn SearchService> {
        Some(self)
    }

    fn statuses(&self) -> Option<&dyn StatusService> {
        Some(self)
    }

    fn media_download(&self) -> Option<&dyn MediaDownloadService> {
        Some(self)
    }
}
