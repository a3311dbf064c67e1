// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Session variants are raised while validating the signed session
/// cookie; CSRF variants while checking the double-submit pair on
/// mutating requests. Messages stay generic, details go to logs.
#[derive(Debug)]
pub enum AuthError {
    /// No session cookie present
    MissingSession,
    /// Session cookie is malformed or its signature does not verify
    InvalidSession,
    /// Session cookie is older than the maximum age
    SessionExpired,
    /// CSRF cookie or header absent on a mutating request
    CsrfMissing,
    /// CSRF cookie and header do not match
    CsrfMismatch,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSession => "missing_session",
            AuthError::InvalidSession => "invalid_session",
            AuthError::SessionExpired => "session_expired",
            AuthError::CsrfMissing => "csrf_missing",
            AuthError::CsrfMismatch => "csrf_mismatch",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession | AuthError::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::CsrfMissing | AuthError::CsrfMismatch => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "Authentication required"),
            AuthError::InvalidSession => write!(f, "Session is invalid"),
            AuthError::SessionExpired => write!(f, "Session has expired"),
            AuthError::CsrfMissing => write!(f, "CSRF token is required"),
            AuthError::CsrfMismatch => write!(f, "CSRF token mismatch"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_session_returns_401() {
        let response = AuthError::MissingSession.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_session");
    }

    #[tokio::test]
    async fn csrf_mismatch_returns_403() {
        let response = AuthError::CsrfMismatch.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn expired_session_is_unauthorized() {
        assert_eq!(AuthError::SessionExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::SessionExpired.error_code(), "session_expired");
    }
}
