// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SESSION_SECRET` | HMAC secret for session tokens | Required |
//! | `DATA_DIR` | Root directory for the embedded database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `KOIOS_BASE_URL` | Chain indexer REST base URL | Koios mainnet |
//! | `KOIOS_API_KEY` | Bearer token for the chain indexer | Optional |
//! | `SEED_PROJECT` | `uuid:owner_address` project to seed at startup | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the session HMAC secret.
///
/// The secret signs every session token. Without it the server refuses to
/// start; there is no unsigned fallback mode.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

/// Environment variable name for the data directory path.
///
/// The embedded redb database file lives here.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// File name of the embedded database inside the data directory.
pub const DB_FILE_NAME: &str = "dashboard-auth.redb";

/// Environment variable name for the chain indexer base URL.
pub const KOIOS_BASE_URL_ENV: &str = "KOIOS_BASE_URL";

/// Environment variable name for the optional chain indexer API key.
pub const KOIOS_API_KEY_ENV: &str = "KOIOS_API_KEY";

/// Environment variable name for a project seeded at startup.
///
/// Format: `<project-uuid>:<owner-address>`. Projects are normally created
/// by the dashboard CRUD layer; this hook exists for local development.
pub const SEED_PROJECT_ENV: &str = "SEED_PROJECT";

/// Read an environment variable, treating empty/whitespace values as unset.
pub fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Read an environment variable with a fallback default.
pub fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
