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

//! Account model for multi-backend, multi-account support

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which remote service an account belongs to.
///
/// An account resolves to exactly one backend kind; the kind selects the
/// adapter that speaks the account's wire protocol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Mastodon,
    Twitter,
}

impl BackendKind {
    /// Get a display name for this backend kind
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Mastodon => "Mastodon",
            BackendKind::Twitter => "Twitter",
        }
    }
}

/// A stored account (for multi-account support)
///
/// Owned by the host application's account store; the core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAccount {
    /// Opaque key identifying this account locally
    pub key: String,

    /// Which backend this account lives on
    pub backend: BackendKind,

    /// Host of the account's instance, with or without scheme
    /// (e.g., "mastodon.social" or "https://mastodon.social")
    pub host: String,

    /// Username on the backend
    pub username: String,

    /// Display name
    pub display_name: String,

    /// Bearer access token
    #[serde(skip_serializing, default)]
    pub access_token: String,

    /// When this account was added
    pub added_at: DateTime<Utc>,

    /// When this account was last used
    pub last_used_at: DateTime<Utc>,
}

/// Read-only boundary to the host application's account storage.
///
/// Credential persistence and retrieval live outside the core; this trait
/// is how the core resolves an opaque account key into a usable account.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by its opaque key, or `None` if it is unknown.
    async fn find_by_key(&self, key: &str) -> Option<StoredAccount>;
}
