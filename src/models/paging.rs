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

//! Forward pagination cursor
//!
//! Two pagination schemes are unified behind one opaque cursor: id-bounded
//! paging (the next `max_id` is the id of the page's last element) and
//! token-bounded paging (the backend issues an explicit next-page token).
//! Callers only ever call [`Page::next_page`] and hand the cursor back to
//! the adapter that minted it; the internal shape is not part of the
//! contract.

use serde::{Deserialize, Serialize};

use super::BackendKind;

/// How the cursor value advances the page window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CursorStyle {
    /// Value is the `max_id` bound derived from the last element seen
    IdBounded,
    /// Value is a backend-issued token, forwarded verbatim
    Token,
}

/// Opaque forward-pagination cursor.
///
/// A cursor is only valid on the backend that minted it; adapters reject
/// a cursor tagged with a different [`BackendKind`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    backend: BackendKind,
    style: CursorStyle,
    value: String,
}

impl Cursor {
    pub(crate) fn id_bounded(backend: BackendKind, max_id: impl Into<String>) -> Self {
        Self {
            backend,
            style: CursorStyle::IdBounded,
            value: max_id.into(),
        }
    }

    pub(crate) fn token(backend: BackendKind, value: impl Into<String>) -> Self {
        Self {
            backend,
            style: CursorStyle::Token,
            value: value.into(),
        }
    }

    /// The backend this cursor was minted by.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }
}

/// One page of results plus the cursor for the next page, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The elements of this page
    pub items: Vec<T>,
    next: Option<Cursor>,
}

impl<T> Page<T> {
    /// A page with an explicit next cursor. An empty page is always
    /// terminal, whatever cursor the backend claims.
    pub(crate) fn new(items: Vec<T>, next: Option<Cursor>) -> Self {
        let next = if items.is_empty() { None } else { next };
        Self { items, next }
    }

    /// Page in id-bounded style: the next window is bounded by the id of
    /// the last element of this page.
    pub(crate) fn id_bounded(backend: BackendKind, items: Vec<T>, id_of: impl Fn(&T) -> &str) -> Self {
        let next = items
            .last()
            .map(|last| Cursor::id_bounded(backend, id_of(last)));
        Self::new(items, next)
    }

    /// Page in token-bounded style: the backend either issued a next-page
    /// token or signalled the end.
    pub(crate) fn token_bounded(backend: BackendKind, items: Vec<T>, token: Option<String>) -> Self {
        let next = token.map(|value| Cursor::token(backend, value));
        Self::new(items, next)
    }

    /// Cursor for the page after this one, or `None` once exhausted.
    /// Exhaustion is stable: a terminal page keeps answering `None`.
    pub fn next_page(&self) -> Option<&Cursor> {
        self.next.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_is_terminal() {
        let page: Page<String> = Page::id_bounded(BackendKind::Mastodon, Vec::new(), |s| s.as_str());
        assert!(page.items.is_empty());
        assert!(page.next_page().is_none());
        // exhaustion is idempotent
        assert!(page.next_page().is_none());
    }

    #[test]
    fn empty_page_discards_backend_token() {
        let page: Page<String> =
            Page::token_bounded(BackendKind::Twitter, Vec::new(), Some("1234".to_string()));
        assert!(page.next_page().is_none());
    }

    #[test]
    fn id_bounded_cursor_comes_from_last_element() {
        let items = vec!["30".to_string(), "20".to_string(), "10".to_string()];
        let page = Page::id_bounded(BackendKind::Mastodon, items, |s| s.as_str());
        let cursor = page.next_page().expect("non-empty page has a cursor");
        assert_eq!(cursor.value(), "10");
        assert_eq!(cursor.backend(), BackendKind::Mastodon);
    }

    #[test]
    fn token_cursor_forwards_backend_token_verbatim() {
        let items = vec!["a".to_string()];
        let page = Page::token_bounded(
            BackendKind::Twitter,
            items,
            Some("?max_id=99&q=rust".to_string()),
        );
        let cursor = page.next_page().expect("token page has a cursor");
        assert_eq!(cursor.value(), "?max_id=99&q=rust");
    }

    #[test]
    fn cursors_carry_their_backend() {
        let mastodon = Cursor::token(BackendKind::Mastodon, "t");
        let twitter = Cursor::token(BackendKind::Twitter, "t");
        assert_ne!(mastodon.backend(), twitter.backend());
    }
}
