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

//! Authenticated HTTP transport
//!
//! Client factory bound to a bearer-token authorization strategy, plus the
//! progress-reporting byte stream used by media downloads. Adapters build
//! their client once and share it for concurrent use.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::{ApiError, ApiResult};

/// One observation of download progress. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    /// Bytes copied so far
    pub bytes_read: u64,
    /// Total length when the backend reports one
    pub total_bytes: Option<u64>,
    /// Set on the final sample
    pub done: bool,
}

/// Callback invoked with a sample after every chunk of a streaming fetch.
/// May fire at high frequency; observers are expected to be cheap.
pub type ProgressObserver = Arc<dyn Fn(ProgressSample) + Send + Sync>;

/// Build a client that attaches `Authorization: Bearer <token>` to every
/// request it issues.
pub fn build_client(access_token: &str) -> ApiResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|e| ApiError::Transport(format!("invalid access token: {e}")))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| ApiError::Transport(e.to_string()))
}

/// Normalize a host into a base URL: add a scheme when missing, strip any
/// trailing slash.
pub fn normalize_base_url(host: &str) -> String {
    let host = host.trim();
    let url = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    url.trim_end_matches('/').to_string()
}

/// Issue an authenticated streaming GET and hand back the body as a
/// [`ByteStream`]. `map_error` is the owning adapter's error-payload
/// mapper, applied when the fetch is refused.
pub(crate) async fn fetch_stream(
    client: &reqwest::Client,
    url: &str,
    observer: Option<ProgressObserver>,
    map_error: fn(u16, &str) -> ApiError,
) -> ApiResult<ByteStream> {
    crate::log_api_call!("GET", url);
    let response = client.get(url).send().await.map_err(ApiError::from)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_error(status.as_u16(), &body));
    }

    Ok(ByteStream::new(response, observer))
}

/// Streaming response body with progress reporting.
///
/// Produced by the download capability; consumed once via [`copy_to`].
///
/// [`copy_to`]: ByteStream::copy_to
pub struct ByteStream {
    response: reqwest::Response,
    observer: Option<ProgressObserver>,
    bytes_read: u64,
    total_bytes: Option<u64>,
}

impl ByteStream {
    pub(crate) fn new(response: reqwest::Response, observer: Option<ProgressObserver>) -> Self {
        let total_bytes = response.content_length();
        Self {
            response,
            observer,
            bytes_read: 0,
            total_bytes,
        }
    }

    /// Total length of the body, when the backend reported one.
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Copy the whole body into `writer`, emitting a progress sample per
    /// chunk and one final sample with `done` set. Returns the number of
    /// bytes copied.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> ApiResult<u64>
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(chunk) = self.response.chunk().await.map_err(ApiError::from)? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ApiError::Transport(format!("write to sink failed: {e}")))?;
            self.bytes_read += chunk.len() as u64;
            self.emit(false);
        }

        writer
            .flush()
            .await
            .map_err(|e| ApiError::Transport(format!("flush of sink failed: {e}")))?;
        self.emit(true);

        Ok(self.bytes_read)
    }

    fn emit(&self, done: bool) {
        if let Some(observer) = &self.observer {
            observer(ProgressSample {
                bytes_read: self.bytes_read,
                total_bytes: self.total_bytes,
                done,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn normalizes_bare_hosts() {
        assert_eq!(normalize_base_url("mastodon.social"), "https://mastodon.social");
        assert_eq!(
            normalize_base_url("https://mastodon.social/"),
            "https://mastodon.social"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8080"),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn copies_body_and_reports_progress() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            let body = vec![7u8; 1000];
            Mock::given(method("GET"))
                .and(path("/media/1.png"))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
                .mount(&server)
                .await;

            let samples: Arc<Mutex<Vec<ProgressSample>>> = Arc::new(Mutex::new(Vec::new()));
            let recorded = samples.clone();
            let observer: ProgressObserver =
                Arc::new(move |sample| recorded.lock().unwrap().push(sample));

            let client = build_client("token").unwrap();
            let response = client
                .get(format!("{}/media/1.png", server.uri()))
                .send()
                .await
                .unwrap();
            let stream = ByteStream::new(response, Some(observer));

            let mut sink = Vec::new();
            let copied = stream.copy_to(&mut sink).await.unwrap();

            assert_eq!(copied, 1000);
            assert_eq!(sink, body);

            let samples = samples.lock().unwrap();
            let last = samples.last().expect("at least the final sample");
            assert!(last.done);
            assert_eq!(last.bytes_read, 1000);
            assert_eq!(last.total_bytes, Some(1000));
        });
    }
}
