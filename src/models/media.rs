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

//! Media attachment model

use serde::{Deserialize, Serialize};

/// Type of media attachment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Gif,
    Audio,
    Unknown,
}

/// A media attachment on a status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Unique identifier
    pub id: String,

    /// Type of media
    #[serde(rename = "type")]
    pub media_type: MediaType,

    /// URL to the media file
    pub url: String,

    /// URL to the preview image
    pub preview_url: Option<String>,

    /// Alt text description
    pub description: Option<String>,
}
