// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::SessionKeys;
use crate::chain::IndexerClient;
use crate::storage::AuthDatabase;

/// Shared application state. redb serializes its own transactions and
/// the other members are immutable, so no locking here.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<AuthDatabase>,
    pub indexer: Arc<IndexerClient>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(db: AuthDatabase, indexer: IndexerClient, sessions: SessionKeys) -> Self {
        Self {
            db: Arc::new(db),
            indexer: Arc::new(indexer),
            sessions: Arc::new(sessions),
        }
    }
}
