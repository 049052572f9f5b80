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

//! Data models for Plumage
//!
//! The unified data model shared across all backends: statuses, users,
//! relationships, notifications, media attachments, accounts, and the
//! pagination cursor. Backend adapters translate their wire shapes into
//! these types; nothing backend-specific leaks out of the adapter layer.

mod account;
mod media;
mod notification;
mod paging;
mod status;
mod user;

pub use account::*;
pub use media::*;
pub use notification::*;
pub use paging::*;
pub use status::*;
pub use user::*;
