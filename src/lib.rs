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

//! Plumage Core - multi-backend service layer for Plumage
//!
//! Several structurally different microblogging REST APIs, normalized
//! behind one capability-oriented contract: the host application resolves
//! an adapter for an account with [`adapter_for`], asks it for the
//! capabilities it needs, and works entirely in the shared data model.
//! The [`download`] module adds the asynchronous media download task with
//! its progress notification lifecycle.

pub mod api;
pub mod download;
pub mod logger;
pub mod models;

pub use api::error::{ApiError, ApiResult};
pub use api::transport::{ProgressObserver, ProgressSample};
pub use api::{
    adapter_for, LookupService, MediaDownloadService, MicroBlogService, NotificationService,
    RelationshipService, SearchService, StatusService, TimelineService,
};
pub use download::{
    DownloadNotification, DownloadOutcome, DownloadRequest, DownloadState, DownloadTask,
    DownloadTarget, FileTarget, NotificationSink,
};
pub use logger::{Logger, LoggerConfig};
