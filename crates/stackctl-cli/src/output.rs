//! Formatted output helpers for CLI commands.
//!
//! Tables are left-aligned with a fixed minimum column width so that
//! service keys and assigned IDs line up.

use std::fmt::Write;

use stackctl_compose::resolver::StackComposition;
use stackctl_compose::submission::PersistedStack;

/// Minimum width of the first table column.
const KEY_COLUMN: usize = 20;

/// Renders the two-column `SERVICE` / `SID` table of a persisted stack.
#[must_use]
pub fn stack_table(stack: &PersistedStack) -> String {
    let mut out = format!("{:<KEY_COLUMN$} {}\n", "SERVICE", "SID");
    for member in &stack.services {
        let _ = writeln!(out, "{:<KEY_COLUMN$} {}", member.service.as_str(), member.id);
    }
    out
}

/// Renders a composition as a numbered member list.
#[must_use]
pub fn composition_list(composition: &StackComposition) -> String {
    let mut out = String::new();
    for (i, key) in composition.member_keys().enumerate() {
        let marker = if *key == composition.root_key { " (root)" } else { "" };
        let _ = writeln!(out, "  {:>2}. {key}{marker}", i + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use stackctl_common::types::{ServiceKey, StackId, StackServiceId};
    use stackctl_compose::membership::MembershipEntry;
    use stackctl_compose::submission::PersistedMember;

    use super::*;

    #[test]
    fn stack_table_has_header_and_one_row_per_member() {
        let stack = PersistedStack {
            id: StackId::new("s1"),
            key: ServiceKey::new("web"),
            name: "blog".into(),
            services: vec![
                PersistedMember {
                    id: StackServiceId::new("s1-web"),
                    service: ServiceKey::new("web"),
                },
                PersistedMember {
                    id: StackServiceId::new("s1-db"),
                    service: ServiceKey::new("db"),
                },
            ],
        };
        let table = stack_table(&stack);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{:<20} SID", "SERVICE"));
        assert_eq!(lines[2], format!("{:<20} s1-db", "db"));
    }

    #[test]
    fn composition_list_marks_root() {
        let composition = StackComposition {
            root_key: ServiceKey::new("web"),
            name: "s".into(),
            members: vec![
                MembershipEntry::new(ServiceKey::new("web")),
                MembershipEntry::new(ServiceKey::new("db")),
            ],
        };
        let list = composition_list(&composition);
        assert_eq!(list, "   1. web (root)\n   2. db\n");
    }
}
