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

//! Capability-oriented service contracts
//!
//! Each backend adapter implements the subset of narrow capability traits
//! its service supports; callers discover capabilities through the
//! [`MicroBlogService`] accessors instead of calling into stubs. An
//! adapter may also implement a capability but decline an individual
//! operation with [`ApiError::Unsupported`] when its wire API has no
//! equivalent endpoint.

pub mod error;
pub mod mastodon;
pub mod transport;
pub mod twitter;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    BackendKind, Cursor, Notification, Page, Relationship, Status, StoredAccount, User,
};
use error::{ApiError, ApiResult};
use transport::{ByteStream, ProgressObserver};

/// Timeline fetches. `count` is an upper bound on the returned items;
/// `since_id`/`max_id` bound the id window on backends that page by id.
#[async_trait]
pub trait TimelineService: Send + Sync {
    async fn home_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>>;

    async fn user_timeline(
        &self,
        user_id: &str,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
        exclude_replies: bool,
    ) -> ApiResult<Vec<Status>>;

    async fn favorites(
        &self,
        user_id: &str,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>>;

    async fn pinned_statuses(&self, user_id: &str) -> ApiResult<Vec<Status>>;
}

/// Resolution of users and statuses by id or name.
///
/// Name-based lookup may legitimately be declined with
/// [`ApiError::Unsupported`]; callers must treat that distinctly from
/// [`ApiError::NotFound`].
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn lookup_user(&self, id: &str) -> ApiResult<User>;

    async fn lookup_user_by_name(&self, name: &str) -> ApiResult<User>;

    async fn lookup_users_by_name(&self, names: &[String]) -> ApiResult<Vec<User>>;

    async fn lookup_status(&self, id: &str) -> ApiResult<Status>;
}

/// Follower graph queries and mutations.
#[async_trait]
pub trait RelationshipService: Send + Sync {
    async fn show_relationship(&self, target_id: &str) -> ApiResult<Relationship>;

    async fn followers(&self, user_id: &str, cursor: Option<&Cursor>) -> ApiResult<Page<User>>;

    async fn following(&self, user_id: &str, cursor: Option<&Cursor>) -> ApiResult<Page<User>>;

    async fn follow(&self, user_id: &str) -> ApiResult<()>;

    async fn unfollow(&self, user_id: &str) -> ApiResult<()>;
}

/// Notification feed and the mentions timeline derived from it on
/// backends without a dedicated mentions endpoint.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notification_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Notification>>;

    async fn mentions_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>>;
}

/// Full-text search over statuses and users.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search_statuses(
        &self,
        query: &str,
        count: u32,
        cursor: Option<&Cursor>,
    ) -> ApiResult<Page<Status>>;

    async fn search_users(&self, query: &str, page: Option<u32>, count: u32)
        -> ApiResult<Vec<User>>;
}

/// Status mutations. Every operation returns the post-mutation status.
#[async_trait]
pub trait StatusService: Send + Sync {
    async fn like(&self, id: &str) -> ApiResult<Status>;

    async fn unlike(&self, id: &str) -> ApiResult<Status>;

    async fn reshare(&self, id: &str) -> ApiResult<Status>;

    async fn unreshare(&self, id: &str) -> ApiResult<Status>;

    async fn delete(&self, id: &str) -> ApiResult<Status>;
}

/// Authenticated streaming fetch of a media resource.
#[async_trait]
pub trait MediaDownloadService: Send + Sync {
    /// Fetch `url`, reporting progress to `observer` as the body streams.
    async fn download(&self, url: &str, observer: Option<ProgressObserver>)
        -> ApiResult<ByteStream>;
}

/// A backend adapter: one remote service made to look like every other.
///
/// The accessors return `None` for capabilities the backend does not
/// support at all, letting callers choose a different flow up front.
pub trait MicroBlogService: Send + Sync {
    /// Which backend this adapter speaks to.
    fn backend_kind(&self) -> BackendKind;

    fn timelines(&self) -> Option<&dyn TimelineService> {
        None
    }

    fn lookups(&self) -> Option<&dyn LookupService> {
        None
    }

    fn relationships(&self) -> Option<&dyn RelationshipService> {
        None
    }

    fn notifications(&self) -> Option<&dyn NotificationService> {
        None
    }

    fn search(&self) -> Option<&dyn SearchService> {
        None
    }

    fn statuses(&self) -> Option<&dyn StatusService> {
        None
    }

    fn media_download(&self) -> Option<&dyn MediaDownloadService> {
        None
    }
}

/// Resolve the adapter for a stored account by its backend kind.
pub fn adapter_for(account: &StoredAccount) -> Arc<dyn MicroBlogService> {
    match account.backend {
        BackendKind::Mastodon => Arc::new(mastodon::MastodonAdapter::new(
            &account.host,
            &account.access_token,
        )),
        BackendKind::Twitter => Arc::new(twitter::TwitterAdapter::new(
            &account.host,
            &account.access_token,
        )),
    }
}

/// Check that a caller-supplied cursor was minted by `backend` before an
/// adapter consumes it. A foreign cursor is a contract violation and must
/// not silently produce a wrong page.
pub(crate) fn own_cursor<'a>(
    cursor: Option<&'a Cursor>,
    backend: BackendKind,
) -> ApiResult<Option<&'a str>> {
    match cursor {
        None => Ok(None),
        Some(cursor) if cursor.backend() == backend => Ok(Some(cursor.value())),
        Some(_) => Err(ApiError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cursor;

    #[test]
    fn own_cursor_accepts_matching_backend() {
        let cursor = Cursor::token(BackendKind::Twitter, "42");
        let value = own_cursor(Some(&cursor), BackendKind::Twitter).unwrap();
        assert_eq!(value, Some("42"));
    }

    #[test]
    fn own_cursor_rejects_foreign_backend() {
        let cursor = Cursor::token(BackendKind::Twitter, "42");
        let result = own_cursor(Some(&cursor), BackendKind::Mastodon);
        assert_eq!(result, Err(ApiError::Unsupported));
    }

    #[test]
    fn own_cursor_passes_missing_cursor_through() {
        assert_eq!(own_cursor(None, BackendKind::Mastodon).unwrap(), None);
    }
}
