// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project roles and the resolution engine behind role mutations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod engine;
pub mod principal;
pub mod reconcile;

pub use engine::{CallerIdentity, RoleEngine};
pub use principal::{Principal, PrincipalParts, PrincipalType};

/// Role granted on a project.
///
/// Roles are stored as distinct flat grants. The `owner > admin > editor`
/// ordering is a UI convention; authorization checks test membership in a
/// single role, never a computed "highest role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May grant/revoke roles and transfer ownership.
    Owner,
    /// May manage project content and settings.
    Admin,
    /// May edit project content.
    Editor,
}

impl Role {
    /// Parse a role from its wire form (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
            Role::Editor => write!(f, "editor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(Role::from_str("owner"), Some(Role::Owner));
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("Editor"), Some(Role::Editor));
        assert_eq!(Role::from_str("viewer"), None);
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(Role::Owner.to_string(), "owner");
        assert_eq!(
            serde_json::to_string(&Role::Editor).unwrap(),
            r#""editor""#
        );
    }
}
