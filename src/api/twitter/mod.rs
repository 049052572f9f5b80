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

//! Twitter backend adapter
//!
//! Speaks the v1.1 REST API. Timelines page by id; follower listings page
//! by numeric cursor (`"0"` meaning exhausted); status search forwards the
//! backend-issued `next_results` token verbatim. Unlike Mastodon, name
//! lookup and a dedicated mentions endpoint exist here, while the
//! notification feed is derived from mentions instead.

mod convert;
mod dto;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::models::{
    BackendKind, Cursor, Notification, Page, Relationship, Status, User,
};

use super::error::{classify_status, ApiError, ApiResult};
use super::transport::{self, ByteStream, ProgressObserver};
use super::{
    own_cursor, LookupService, MediaDownloadService, MicroBlogService, NotificationService,
    RelationshipService, SearchService, StatusService, TimelineService,
};

/// A follower-listing cursor of "0" means the listing is exhausted.
const CURSOR_EXHAUSTED: &str = "0";

/// Adapter for the Twitter v1.1 REST API.
pub struct TwitterAdapter {
    base_url: String,
    access_token: String,
    client: OnceCell<reqwest::Client>,
}

impl TwitterAdapter {
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

    /// GET with a raw, backend-issued query string appended verbatim.
    async fn get_json_raw<T: DeserializeOwned>(&self, path_and_query: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        crate::log_api_call!("GET", &url);
        let response = self
            .client()
            .await?
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from)?;
        read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_api_call!("POST", &url);
        let response = self
            .client()
            .await?
            .post(&url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;
        read_json(response).await
    }

    /// POST where the response body is irrelevant (follow/unfollow).
    async fn post_discard(&self, path: &str, query: &[(&str, String)]) -> ApiResult<()> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_api_call!("POST", &url);
        let response = self
            .client()
            .await?
            .post(&url)
            .query(query)
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

    async fn user_listing(
        &self,
        path: &str,
        user_id: &str,
        cursor: Option<&Cursor>,
    ) -> ApiResult<Page<User>> {
        let token = own_cursor(cursor, BackendKind::Twitter)?;
        let mut query = vec![("user_id", user_id.to_string())];
        if let Some(token) = token {
            query.push(("cursor", token.to_string()));
        }

        let listing: dto::UserCursorPage = self.get_json(path, &query).await?;
        let users: Vec<User> = listing.users.iter().map(convert::convert_user).collect();
        let next = listing
            .next_cursor_str
            .filter(|cursor| cursor != CURSOR_EXHAUSTED);
        Ok(Page::token_bounded(BackendKind::Twitter, users, next))
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
    if let Ok(payload) = serde_json::from_str::<dto::ErrorBody>(body) {
        if let Some(first) = payload.errors.first() {
            return match first.code {
                // 34/144: no such resource; 50: no such user
                34 | 50 | 144 => ApiError::NotFound,
                // 32: bad credentials; 89: expired token; 215: bad auth data
                32 | 89 | 215 => ApiError::AuthFailure,
                _ => classify_status(status, Some(first.message.clone())),
            };
        }
    }
    classify_status(status, None)
}

fn paging_query(
    count: u32,
    since_id: Option<&str>,
    max_id: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("count", count.to_string()),
        ("tweet_mode", "extended".to_string()),
    ];
    if let Some(since_id) = since_id {
        query.push(("since_id", since_id.to_string()));
    }
    if let Some(max_id) = max_id {
        query.push(("max_id", max_id.to_string()));
    }
    query
}

fn to_statuses(items: &[dto::TwitterStatus], count: u32) -> Vec<Status> {
    let mut statuses: Vec<Status> = items.iter().map(convert::convert_status).collect();
    statuses.truncate(count as usize);
    statuses
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[async_trait]
impl TimelineService for TwitterAdapter {
    async fn home_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>> {
        let query = paging_query(count, since_id, max_id);
        let statuses: Vec<dto::TwitterStatus> = self
            .get_json("/1.1/statuses/home_timeline.json", &query)
            .await?;
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
        query.push(("user_id", user_id.to_string()));
        query.push(("exclude_replies", exclude_replies.to_string()));
        let statuses: Vec<dto::TwitterStatus> = self
            .get_json("/1.1/statuses/user_timeline.json", &query)
            .await?;
        Ok(to_statuses(&statuses, count))
    }

    async fn favorites(
        &self,
        user_id: &str,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Status>> {
        let mut query = paging_query(count, since_id, max_id);
        query.push(("user_id", user_id.to_string()));
        let statuses: Vec<dto::TwitterStatus> =
            self.get_json("/1.1/favorites/list.json", &query).await?;
        Ok(to_statuses(&statuses, count))
    }

    async fn pinned_statuses(&self, _user_id: &str) -> ApiResult<Vec<Status>> {
        // v1.1 exposes no pinned-tweet listing
        Err(ApiError::Unsupported)
    }
}

#[async_trait]
impl LookupService for TwitterAdapter {
    async fn lookup_user(&self, id: &str) -> ApiResult<User> {
        let query = vec![("user_id", id.to_string())];
        let user: dto::TwitterUser = self.get_json("/1.1/users/show.json", &query).await?;
        Ok(convert::convert_user(&user))
    }

    async fn lookup_user_by_name(&self, name: &str) -> ApiResult<User> {
        let query = vec![("screen_name", name.to_string())];
        let user: dto::TwitterUser = self.get_json("/1.1/users/show.json", &query).await?;
        Ok(convert::convert_user(&user))
    }

    async fn lookup_users_by_name(&self, names: &[String]) -> ApiResult<Vec<User>> {
        let query = vec![("screen_name", names.join(","))];
        let users: Vec<dto::TwitterUser> =
            self.get_json("/1.1/users/lookup.json", &query).await?;
        Ok(users.iter().map(convert::convert_user).collect())
    }

    async fn lookup_status(&self, id: &str) -> ApiResult<Status> {
        let query = vec![
            ("id", id.to_string()),
            ("tweet_mode", "extended".to_string()),
        ];
        let status: dto::TwitterStatus =
            self.get_json("/1.1/statuses/show.json", &query).await?;
        Ok(convert::convert_status(&status))
    }
}

#[async_trait]
impl RelationshipService for TwitterAdapter {
    async fn show_relationship(&self, target_id: &str) -> ApiResult<Relationship> {
        let query = vec![("target_id", target_id.to_string())];
        let envelope: dto::FriendshipEnvelope =
            self.get_json("/1.1/friendships/show.json", &query).await?;
        Ok(convert::convert_relationship(&envelope.relationship.source))
    }

    async fn followers(&self, user_id: &str, cursor: Option<&Cursor>) -> ApiResult<Page<User>> {
        self.user_listing("/1.1/followers/list.json", user_id, cursor)
            .await
    }

    async fn following(&self, user_id: &str, cursor: Option<&Cursor>) -> ApiResult<Page<User>> {
        self.user_listing("/1.1/friends/list.json", user_id, cursor)
            .await
    }

    async fn follow(&self, user_id: &str) -> ApiResult<()> {
        let query = vec![("user_id", user_id.to_string())];
        self.post_discard("/1.1/friendships/create.json", &query)
            .await
    }

    async fn unfollow(&self, user_id: &str) -> ApiResult<()> {
        let query = vec![("user_id", user_id.to_string())];
        self.post_discard("/1.1/friendships/destroy.json", &query)
            .await
    }
}

#[async_trait]
impl NotificationService for TwitterAdapter {
    async fn notification_timeline(
        &self,
        count: u32,
        since_id: Option<&str>,
        max_id: Option<&str>,
    ) -> ApiResult<Vec<Notification>> {
        // No notification feed on this API; mentions are the closest thing
        let query = paging_query(count, since_id, max_id);
        let statuses: Vec<dto::TwitterStatus> = self
            .get_json("/1.1/statuses/mentions_timeline.json", &query)
            .await?;
        let mut notifications: Vec<Notification> = statuses
            .iter()
            .map(convert::mention_to_notification)
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
        let query = paging_query(count, since_id, max_id);
        let statuses: Vec<dto::TwitterStatus> = self
            .get_json("/1.1/statuses/mentions_timeline.json", &query)
            .await?;
        Ok(to_statuses(&statuses, count))
    }
}

#[async_trait]
impl SearchService for TwitterAdapter {
    async fn search_statuses(
        &self,
        query: &str,
        count: u32,
        cursor: Option<&Cursor>,
    ) -> ApiResult<Page<Status>> {
        let token = own_cursor(cursor, BackendKind::Twitter)?;

        let response: dto::SearchResponse = match token {
            // The token is the backend's ready-made next_results query
            Some(token) => {
                let path_and_query = format!("/1.1/search/tweets.json{token}");
                self.get_json_raw(&path_and_query).await?
            }
            None => {
                let params = vec![
                    ("q", query.to_string()),
                    ("count", count.to_string()),
                    ("tweet_mode", "extended".to_string()),
                ];
                self.get_json("/1.1/search/tweets.json", &params).await?
            }
        };

        let statuses = to_statuses(&response.statuses, count);
        let next = response
            .search_metadata
            .and_then(|metadata| metadata.next_results);
        Ok(Page::token_bounded(BackendKind::Twitter, statuses, next))
    }

    async fn search_users(
        &self,
        query: &str,
        page: Option<u32>,
        count: u32,
    ) -> ApiResult<Vec<User>> {
        let params = vec![
            ("q", query.to_string()),
            ("page", page.unwrap_or(0).to_string()),
            ("count", count.to_string()),
        ];
        let users: Vec<dto::TwitterUser> =
            self.get_json("/1.1/users/search.json", &params).await?;
        Ok(users.iter().map(convert::convert_user).collect())
    }
}

#[async_trait]
impl StatusService for TwitterAdapter {
    async fn like(&self, id: &str) -> ApiResult<Status> {
        let query = vec![("id", id.to_string())];
        let status: dto::TwitterStatus =
            self.post_json("/1.1/favorites/create.json", &query).await?;
        Ok(convert::convert_status(&status))
    }

    async fn unlike(&self, id: &str) -> ApiResult<Status> {
        // The echo still carries the pre-mutation count
        let query = vec![("id", id.to_string())];
        let status: dto::TwitterStatus = self
            .post_json("/1.1/favorites/destroy.json", &query)
            .await?;
        Ok(convert::convert_status(&status).apply_unfavorite())
    }

    async fn reshare(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/1.1/statuses/retweet/{}.json", encode(id));
        let status: dto::TwitterStatus = self.post_json(&path, &[]).await?;
        Ok(convert::convert_status(&status))
    }

    async fn unreshare(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/1.1/statuses/unretweet/{}.json", encode(id));
        let status: dto::TwitterStatus = self.post_json(&path, &[]).await?;
        Ok(convert::convert_status(&status).apply_unreshare())
    }

    async fn delete(&self, id: &str) -> ApiResult<Status> {
        let path = format!("/1.1/statuses/destroy/{}.json", encode(id));
        let status: dto::TwitterStatus = self.post_json(&path, &[]).await?;
        Ok(convert::convert_status(&status))
    }
}

#[async_trait]
impl MediaDownloadService for TwitterAdapter {
    async fn download(
        &self,
        url: &str,
        observer: Option<ProgressObserver>,
    ) -> ApiResult<ByteStream> {
        let client = self.client().await?;
        transport::fetch_stream(client, url, observer, map_error).await
    }
}

impl MicroBlogService for TwitterAdapter {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Twitter
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

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn wire_user(id: &str) -> serde_json::Value {
        json!({
            "id_str": id,
            "screen_name": "ferris",
            "name": "Ferris",
            "description": "crab",
            "profile_image_url_https": null,
            "statuses_count": 4,
            "followers_count": 2,
            "friends_count": 3,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018"
        })
    }

    fn wire_status(id: &str) -> serde_json::Value {
        json!({
            "id_str": id,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "full_text": "hello",
            "favorite_count": 2,
            "retweet_count": 1,
            "favorited": false,
            "retweeted": false,
            "user": wire_user("12")
        })
    }

    fn adapter(server: &MockServer) -> TwitterAdapter {
        TwitterAdapter::new(&server.uri(), "secret")
    }

    #[tokio::test]
    async fn home_timeline_caps_item_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/statuses/home_timeline.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                wire_status("3"),
                wire_status("2"),
                wire_status("1"),
            ])))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        let statuses = adapter.home_timeline(2, None, None).await.unwrap();

        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|status| !status.id.is_empty()));
    }

    #[tokio::test]
    async fn name_lookup_is_supported_here() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/users/show.json"))
            .and(query_param("screen_name", "ferris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(wire_user("12")))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        let user = adapter.lookup_user_by_name("ferris").await.unwrap();
        assert_eq!(user.id, "12");
    }

    #[tokio::test]
    async fn follower_listing_stops_at_cursor_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/followers/list.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [wire_user("12")],
                "next_cursor_str": "0"
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        let page = adapter.followers("12", None).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(page.next_page().is_none());
    }

    #[tokio::test]
    async fn search_forwards_backend_token_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .and(query_param("max_id", "99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statuses": [wire_status("98")],
                "search_metadata": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.1/search/tweets.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statuses": [wire_status("100")],
                "search_metadata": { "next_results": "?max_id=99&q=rust" }
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server);

        let first = adapter.search_statuses("rust", 20, None).await.unwrap();
        let cursor = first.next_page().cloned().expect("next cursor");

        let second = adapter
            .search_statuses("rust", 20, Some(&cursor))
            .await
            .unwrap();
        assert_eq!(second.items[0].id, "98");
        assert!(second.next_page().is_none());
    }

    #[tokio::test]
    async fn error_code_34_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/statuses/show.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errors": [{ "code": 34, "message": "Sorry, that page does not exist" }]
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        assert_eq!(
            adapter.lookup_status("404").await.unwrap_err(),
            ApiError::NotFound
        );
    }

    #[tokio::test]
    async fn expired_token_maps_to_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/statuses/home_timeline.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{ "code": 89, "message": "Invalid or expired token" }]
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        assert_eq!(
            adapter.home_timeline(20, None, None).await.unwrap_err(),
            ApiError::AuthFailure
        );
    }

    #[tokio::test]
    async fn pinned_statuses_are_unsupported() {
        let server = MockServer::start().await;
        let adapter = adapter(&server);
        assert_eq!(
            adapter.pinned_statuses("12").await.unwrap_err(),
            ApiError::Unsupported
        );
    }

    #[tokio::test]
    async fn notification_feed_derives_from_mentions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1/statuses/mentions_timeline.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([wire_status("55")])),
            )
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        let notifications = adapter.notification_timeline(20, None, None).await.unwrap();

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, crate::models::NotificationKind::Mention);
        assert_eq!(notifications[0].status.as_ref().unwrap().id, "55");
    }
}
