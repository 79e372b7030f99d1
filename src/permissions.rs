//! The permission engine: role → capability predicates.
//!
//! Every command that mutates data or exposes financial fields consults
//! these predicates before doing anything else. The role is always looked
//! up fresh from the `user_roles` table by user id (see
//! [`crate::commands::fetch_role`]); it is never taken from caller-supplied
//! input and never cached across invocations, so a role change takes effect
//! on the next command without any re-login.
//!
//! An absent role (unauthenticated caller, or no `user_roles` row) is
//! `None`, never an error, and answers `false` to every predicate.

use serde::{Deserialize, Serialize};

/// Permission class assigned to exactly one user identity.
///
/// `Admin`, `MusicProducer`, and `SalesTeam` are the canonical set.
/// `Editor` and `Viewer` are legacy values written by an earlier variant of
/// the product; rows carrying them still resolve, but new assignments are
/// rejected (see [`Role::is_legacy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    MusicProducer,
    SalesTeam,
    Editor,
    Viewer,
}

impl Role {
    /// Parse a stored role string. Unknown strings resolve to `None`,
    /// which downgrades the caller to no capabilities at all.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "music_producer" => Some(Role::MusicProducer),
            "sales_team" => Some(Role::SalesTeam),
            "editor" => Some(Role::Editor),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// The storage/wire form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::MusicProducer => "music_producer",
            Role::SalesTeam => "sales_team",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// True for role values carried over from the legacy variant. These
    /// still resolve for existing rows but cannot be newly assigned.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Role::Editor | Role::Viewer)
    }
}

/// Can the user create and update clients, projects, and tasks?
pub fn can_edit(role: Option<Role>) -> bool {
    matches!(
        role,
        Some(Role::Admin) | Some(Role::MusicProducer) | Some(Role::Editor)
    )
}

/// Can the user delete records? Strictly narrower than [`can_edit`].
pub fn can_delete(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin))
}

/// Can the user see financial fields (budget, amount paid, money left,
/// revenue aggregates, commission)?
///
/// Callers must skip the computation entirely when this is false, not just
/// hide the result.
pub fn can_see_money(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin) | Some(Role::SalesTeam))
}

/// Can the user manage accounts and assign roles?
pub fn can_access_admin(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin))
}

/// Display label for a role. Absent or unrecognized roles fall back to a
/// generic label rather than failing.
pub fn role_label(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "Admin",
        Some(Role::MusicProducer) => "Music Producer",
        Some(Role::SalesTeam) => "Sales Team",
        Some(Role::Editor) => "Editor",
        Some(Role::Viewer) => "Viewer",
        None => "User",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 5] = [
        Role::Admin,
        Role::MusicProducer,
        Role::SalesTeam,
        Role::Editor,
        Role::Viewer,
    ];

    #[test]
    fn parse_round_trips_known_roles() {
        for role in ALL_ROLES {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn parse_rejects_unknown_strings() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Admin"), None); // case-sensitive
    }

    #[test]
    fn absent_role_has_no_capabilities() {
        assert!(!can_edit(None));
        assert!(!can_delete(None));
        assert!(!can_see_money(None));
        assert!(!can_access_admin(None));
        assert_eq!(role_label(None), "User");
    }

    #[test]
    fn admin_has_every_capability() {
        let r = Some(Role::Admin);
        assert!(can_edit(r));
        assert!(can_delete(r));
        assert!(can_see_money(r));
        assert!(can_access_admin(r));
    }

    #[test]
    fn sales_team_is_read_only_with_money() {
        let r = Some(Role::SalesTeam);
        assert!(can_see_money(r));
        assert!(!can_edit(r));
        assert!(!can_delete(r));
        assert!(!can_access_admin(r));
    }

    #[test]
    fn music_producer_edits_without_money() {
        let r = Some(Role::MusicProducer);
        assert!(can_edit(r));
        assert!(!can_see_money(r));
        assert!(!can_delete(r));
        assert!(!can_access_admin(r));
    }

    #[test]
    fn legacy_editor_and_viewer_matrix() {
        assert!(can_edit(Some(Role::Editor)));
        assert!(!can_delete(Some(Role::Editor)));
        assert!(!can_see_money(Some(Role::Editor)));

        assert!(!can_edit(Some(Role::Viewer)));
        assert!(!can_delete(Some(Role::Viewer)));
        assert!(!can_see_money(Some(Role::Viewer)));

        assert!(Role::Editor.is_legacy());
        assert!(Role::Viewer.is_legacy());
        assert!(!Role::Admin.is_legacy());
    }

    #[test]
    fn delete_is_subset_of_edit() {
        for role in ALL_ROLES {
            if can_delete(Some(role)) {
                assert!(can_edit(Some(role)), "{:?} can delete but not edit", role);
            }
        }
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(role_label(Some(Role::MusicProducer)), "Music Producer");
        assert_eq!(role_label(Some(Role::SalesTeam)), "Sales Team");
    }
}
