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

//! Shared error taxonomy
//!
//! Every backend's failure shapes collapse into [`ApiError`]. Adapters map
//! their structured error payloads through [`classify_status`]; transport
//! faults and unparseable bodies stay [`ApiError::Transport`].

use thiserror::Error;

/// Result alias used across the capability surface.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified failure taxonomy across all backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The backend does not implement this operation. Recoverable: the
    /// caller picks a different flow. Distinct from [`ApiError::NotFound`].
    #[error("operation not supported by this backend")]
    Unsupported,

    /// Network or HTTP-layer failure, including a missing body where one
    /// was required. Not retried in-core.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The remote service returned a structured error payload. Carries the
    /// backend's message for user display.
    #[error("{0}")]
    BackendRejected(String),

    /// The requested resource does not exist on the backend.
    #[error("not found")]
    NotFound,

    /// Credentials are invalid or expired. Surfaced for re-authentication,
    /// not retried in-core.
    #[error("authentication failed")]
    AuthFailure,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return classify_status(status.as_u16(), None);
        }
        ApiError::Transport(err.to_string())
    }
}

/// Map an HTTP status and an optional backend-supplied message into the
/// shared taxonomy. A non-2xx status with no parseable message is a
/// transport fault, not a backend rejection.
pub fn classify_status(status: u16, message: Option<String>) -> ApiError {
    match status {
        401 | 403 => ApiError::AuthFailure,
        404 => ApiError::NotFound,
        _ => match message {
            Some(message) => ApiError::BackendRejected(message),
            None => ApiError::Transport(format!("http status {status}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_statuses() {
        assert_eq!(classify_status(401, None), ApiError::AuthFailure);
        assert_eq!(
            classify_status(403, Some("forbidden".to_string())),
            ApiError::AuthFailure
        );
    }

    #[test]
    fn classifies_not_found() {
        assert_eq!(classify_status(404, None), ApiError::NotFound);
    }

    #[test]
    fn structured_payload_becomes_backend_rejected() {
        assert_eq!(
            classify_status(422, Some("Validation failed".to_string())),
            ApiError::BackendRejected("Validation failed".to_string())
        );
    }

    #[test]
    fn missing_payload_is_a_transport_fault() {
        assert_eq!(
            classify_status(500, None),
            ApiError::Transport("http status 500".to_string())
        );
    }
}
