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

//! Media download task
//!
//! A stand-alone asynchronous unit: resolve the account, require the
//! download capability, stream the source into a caller-supplied target,
//! and drive a notification lifecycle
//! (`Pending → InProgress(percent) → Succeeded | Failed`). One attempt per
//! task; retry policy belongs to the submitting work queue. Each task gets
//! its own notification identity, and every attempt ends in exactly one
//! terminal notification.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::transport::{ProgressObserver, ProgressSample};
use crate::api::adapter_for;
use crate::models::AccountStore;

const SAVING_TITLE: &str = "Saving media";
const SAVED_TITLE: &str = "Media saved";
const SAVE_FAILED_TITLE: &str = "Could not save media";

/// Writable destination for a download.
///
/// The task opens the target once and owns the writer exclusively until
/// it exits; the writer is dropped on every exit path, success, failure
/// or cancellation.
#[async_trait]
pub trait DownloadTarget: Send + Sync {
    /// Open the target for writing. Called once per task.
    async fn open(&self) -> io::Result<Box<dyn AsyncWrite + Send + Unpin>>;

    /// Display name for notifications.
    fn name(&self) -> Option<String> {
        None
    }
}

/// File-backed download target
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DownloadTarget for FileTarget {
    async fn open(&self) -> io::Result<Box<dyn AsyncWrite + Send + Unpin>> {
        let file = tokio::fs::File::create(&self.path).await?;
        Ok(Box::new(file))
    }

    fn name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// One notification update emitted by a download task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadNotification {
    /// Identity of the task's notification; stable across its updates
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    /// Progress percent while the task is streaming
    pub percent: Option<u8>,
    /// An ongoing notification cannot be swiped away by the user
    pub ongoing: bool,
    pub dismissible: bool,
}

impl DownloadNotification {
    fn progress(id: Uuid, subtitle: Option<String>, percent: u8) -> Self {
        Self {
            id,
            title: SAVING_TITLE.to_string(),
            subtitle,
            percent: Some(percent),
            ongoing: true,
            dismissible: false,
        }
    }

    fn finished(id: Uuid, subtitle: Option<String>) -> Self {
        Self {
            id,
            title: SAVED_TITLE.to_string(),
            subtitle,
            percent: None,
            ongoing: false,
            dismissible: true,
        }
    }

    fn failed(id: Uuid, subtitle: Option<String>) -> Self {
        Self {
            id,
            title: SAVE_FAILED_TITLE.to_string(),
            subtitle,
            percent: None,
            ongoing: false,
            dismissible: true,
        }
    }
}

/// Presentation boundary: the core emits updates, the host renders them.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: DownloadNotification);
}

/// Lifecycle state of a download task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    InProgress(u8),
    Succeeded,
    Failed,
}

impl DownloadState {
    /// Terminal states absorb all further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadState::Succeeded | DownloadState::Failed)
    }
}

/// State machine driving the notification lifecycle of one task.
#[derive(Debug)]
struct DownloadLifecycle {
    state: DownloadState,
}

impl DownloadLifecycle {
    fn new() -> Self {
        Self {
            state: DownloadState::Pending,
        }
    }

    /// Fold a progress sample in. Returns the percent to announce when
    /// the visible progress changed, `None` otherwise; repeated samples
    /// at the same percent stay silent.
    fn on_progress(&mut self, sample: ProgressSample) -> Option<u8> {
        if self.state.is_terminal() {
            return None;
        }

        let percent = match sample.total_bytes {
            Some(total) if total > 0 => {
                let ratio = sample.bytes_read as f64 / total as f64;
                (ratio * 100.0).round().clamp(0.0, 100.0) as u8
            }
            // Unknown length: hold the last known percent
            _ => match self.state {
                DownloadState::InProgress(previous) => previous,
                _ => 0,
            },
        };

        let changed = self.state != DownloadState::InProgress(percent);
        self.state = DownloadState::InProgress(percent);
        changed.then_some(percent)
    }

    fn complete(&mut self) {
        if !self.state.is_terminal() {
            self.state = DownloadState::Succeeded;
        }
    }

    fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = DownloadState::Failed;
        }
    }

    #[cfg(test)]
    fn state(&self) -> DownloadState {
        self.state
    }
}

/// Input for a download task, consumed exactly once.
pub struct DownloadRequest {
    /// Key of the account whose backend serves the source
    pub account_key: String,
    /// URL of the remote resource
    pub source: String,
    /// Where the bytes go
    pub target: Arc<dyn DownloadTarget>,
}

/// Terminal outcome of a download task. Carries no payload; the side
/// effect is the populated target and the emitted notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Succeeded,
    Failed,
}

/// One media download: account resolution, capability check, streaming
/// copy, notification lifecycle.
pub struct DownloadTask {
    request: DownloadRequest,
    accounts: Arc<dyn AccountStore>,
    notifications: Arc<dyn NotificationSink>,
    notification_id: Uuid,
}

impl DownloadTask {
    pub fn new(
        request: DownloadRequest,
        accounts: Arc<dyn AccountStore>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            request,
            accounts,
            notifications,
            notification_id: Uuid::new_v4(),
        }
    }

    /// Identity of this task's notification.
    pub fn notification_id(&self) -> Uuid {
        self.notification_id
    }

    /// Submit fire-and-forget. Completion is observed through the
    /// terminal notification, not the handle. Aborting the handle
    /// releases the target without ever emitting a success update.
    pub fn spawn(self) -> JoinHandle<DownloadOutcome> {
        tokio::spawn(self.run())
    }

    /// Run the task to its terminal state. Every failure kind collapses
    /// into one `Failed` notification; details only go to the log.
    pub async fn run(self) -> DownloadOutcome {
        let lifecycle = Arc::new(Mutex::new(DownloadLifecycle::new()));
        let subtitle = self.request.target.name();

        let result = self.execute(&lifecycle, subtitle.clone()).await;

        match result {
            Ok(bytes) => {
                lock(&lifecycle).complete();
                info!(source = %self.request.source, bytes, "media download finished");
                self.notifications
                    .notify(DownloadNotification::finished(self.notification_id, subtitle));
                DownloadOutcome::Succeeded
            }
            Err(error) => {
                lock(&lifecycle).fail();
                warn!(source = %self.request.source, error = %error, "media download failed");
                self.notifications
                    .notify(DownloadNotification::failed(self.notification_id, subtitle));
                DownloadOutcome::Failed
            }
        }
    }

    async fn execute(
        &self,
        lifecycle: &Arc<Mutex<DownloadLifecycle>>,
        subtitle: Option<String>,
    ) -> anyhow::Result<u64> {
        let account = self
            .accounts
            .find_by_key(&self.request.account_key)
            .await
            .with_context(|| format!("unknown account {}", self.request.account_key))?;

        let adapter = adapter_for(&account);
        let downloads = adapter
            .media_download()
            .ok_or(ApiError::Unsupported)
            .context("backend has no media download capability")?;

        let mut sink = self
            .request
            .target
            .open()
            .await
            .context("failed to open download target")?;

        let observer: ProgressObserver = {
            let lifecycle = lifecycle.clone();
            let notifications = self.notifications.clone();
            let notification_id = self.notification_id;
            Arc::new(move |sample| {
                let Some(percent) = lock(&lifecycle).on_progress(sample) else {
                    return;
                };
                notifications.notify(DownloadNotification::progress(
                    notification_id,
                    subtitle.clone(),
                    percent,
                ));
            })
        };

        let stream = downloads
            .download(&self.request.source, Some(observer))
            .await?;
        let copied = stream.copy_to(&mut sink).await?;
        sink.shutdown()
            .await
            .context("failed to finalize download target")?;

        Ok(copied)
    }
}

fn lock(lifecycle: &Mutex<DownloadLifecycle>) -> MutexGuard<'_, DownloadLifecycle> {
    lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::models::{BackendKind, StoredAccount};

    use super::*;

    fn sample(bytes_read: u64, total_bytes: Option<u64>) -> ProgressSample {
        ProgressSample {
            bytes_read,
            total_bytes,
            done: false,
        }
    }

    #[test]
    fn lifecycle_computes_rounded_percent() {
        let mut lifecycle = DownloadLifecycle::new();
        assert_eq!(lifecycle.on_progress(sample(333, Some(1000))), Some(33));
        assert_eq!(lifecycle.state(), DownloadState::InProgress(33));
    }

    #[test]
    fn lifecycle_holds_percent_when_total_is_unknown() {
        let mut lifecycle = DownloadLifecycle::new();
        lifecycle.on_progress(sample(500, Some(1000)));
        assert_eq!(lifecycle.on_progress(sample(700, None)), None);
        assert_eq!(lifecycle.state(), DownloadState::InProgress(50));
    }

    #[test]
    fn lifecycle_guards_division_by_zero() {
        let mut lifecycle = DownloadLifecycle::new();
        assert_eq!(lifecycle.on_progress(sample(100, Some(0))), Some(0));
    }

    #[test]
    fn lifecycle_is_silent_on_repeated_percent() {
        let mut lifecycle = DownloadLifecycle::new();
        assert_eq!(lifecycle.on_progress(sample(100, Some(1000))), Some(10));
        assert_eq!(lifecycle.on_progress(sample(101, Some(1000))), None);
        assert_eq!(lifecycle.on_progress(sample(200, Some(1000))), Some(20));
    }

    #[test]
    fn lifecycle_caps_percent_at_one_hundred() {
        let mut lifecycle = DownloadLifecycle::new();
        assert_eq!(lifecycle.on_progress(sample(1500, Some(1000))), Some(100));
    }

    #[test]
    fn terminal_state_absorbs_further_transitions() {
        let mut lifecycle = DownloadLifecycle::new();
        lifecycle.on_progress(sample(500, Some(1000)));
        lifecycle.fail();
        assert_eq!(lifecycle.state(), DownloadState::Failed);

        lifecycle.complete();
        assert_eq!(lifecycle.state(), DownloadState::Failed);
        assert_eq!(lifecycle.on_progress(sample(900, Some(1000))), None);
    }

    struct SingleAccountStore(StoredAccount);

    #[async_trait]
    impl AccountStore for SingleAccountStore {
        async fn find_by_key(&self, key: &str) -> Option<StoredAccount> {
            (key == self.0.key).then(|| self.0.clone())
        }
    }

    #[derive(Default)]
    struct CollectingSink(Mutex<Vec<DownloadNotification>>);

    impl NotificationSink for CollectingSink {
        fn notify(&self, notification: DownloadNotification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    fn account(key: &str, host: &str) -> StoredAccount {
        StoredAccount {
            key: key.to_string(),
            backend: BackendKind::Mastodon,
            host: host.to_string(),
            username: "a".to_string(),
            display_name: "A".to_string(),
            access_token: "secret".to_string(),
            added_at: Utc::now(),
            last_used_at: Utc::now(),
        }
    }

    fn task(
        server_uri: &str,
        source: String,
        target: Arc<dyn DownloadTarget>,
        sink: Arc<CollectingSink>,
    ) -> DownloadTask {
        let accounts = Arc::new(SingleAccountStore(account("acct-1", server_uri)));
        DownloadTask::new(
            DownloadRequest {
                account_key: "acct-1".to_string(),
                source,
                target,
            },
            accounts,
            sink,
        )
    }

    #[tokio::test]
    async fn download_streams_to_target_and_reports_lifecycle() {
        let server = MockServer::start().await;
        let body = vec![42u8; 1000];
        Mock::given(method("GET"))
            .and(path("/media/clip.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("clip.bin");
        let sink = Arc::new(CollectingSink::default());

        let outcome = task(
            &server.uri(),
            format!("{}/media/clip.bin", server.uri()),
            Arc::new(FileTarget::new(&target_path)),
            sink.clone(),
        )
        .run()
        .await;

        assert_eq!(outcome, DownloadOutcome::Succeeded);
        assert_eq!(tokio::fs::read(&target_path).await.unwrap(), body);

        let updates = sink.0.lock().unwrap();
        let progress: Vec<_> = updates.iter().filter(|n| n.ongoing).collect();
        assert!(!progress.is_empty());
        assert!(progress
            .iter()
            .all(|n| n.percent.is_some_and(|p| p <= 100)));

        let terminal: Vec<_> = updates.iter().filter(|n| !n.ongoing).collect();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].title, SAVED_TITLE);
        assert!(terminal[0].dismissible);
        // one notification identity for the whole task
        assert!(updates.iter().all(|n| n.id == updates[0].id));
    }

    #[tokio::test]
    async fn unreachable_source_fails_once_without_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/missing.bin"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CollectingSink::default());

        let outcome = task(
            &server.uri(),
            format!("{}/media/missing.bin", server.uri()),
            Arc::new(FileTarget::new(dir.path().join("missing.bin"))),
            sink.clone(),
        )
        .run()
        .await;

        assert_eq!(outcome, DownloadOutcome::Failed);

        let updates = sink.0.lock().unwrap();
        assert!(updates.iter().all(|n| n.title != SAVED_TITLE));
        let failed: Vec<_> = updates.iter().filter(|n| n.title == SAVE_FAILED_TITLE).collect();
        assert_eq!(failed.len(), 1);

        // target directory can be cleaned up: nothing holds the file open
        drop(updates);
        dir.close().unwrap();
    }

    #[tokio::test]
    async fn unknown_account_fails_with_terminal_notification() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CollectingSink::default());

        let accounts = Arc::new(SingleAccountStore(account("acct-1", &server.uri())));
        let outcome = DownloadTask::new(
            DownloadRequest {
                account_key: "nobody".to_string(),
                source: format!("{}/media/clip.bin", server.uri()),
                target: Arc::new(FileTarget::new(dir.path().join("clip.bin"))),
            },
            accounts,
            sink.clone(),
        )
        .run()
        .await;

        assert_eq!(outcome, DownloadOutcome::Failed);

        let updates = sink.0.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].title, SAVE_FAILED_TITLE);
    }

    #[tokio::test]
    async fn distinct_tasks_get_distinct_notification_ids() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CollectingSink::default());

        let first = task(
            &server.uri(),
            String::new(),
            Arc::new(FileTarget::new(dir.path().join("a"))),
            sink.clone(),
        );
        let second = task(
            &server.uri(),
            String::new(),
            Arc::new(FileTarget::new(dir.path().join("b"))),
            sink,
        );

        assert_ne!(first.notification_id(), second.notification_id());
    }
}
