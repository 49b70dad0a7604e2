//! The tree layout resolver.
//!
//! Derives the ordered sequence of visible rows from the catalog and the
//! player's progression. A node is visible once its prerequisites are all
//! purchased, independent of affordability or prior purchase -- a purchased
//! node stays visible. The row sequence is stable and append-only: rows
//! never lose members as progression advances, and a grouped row gains
//! members as siblings become visible.

use crate::catalog::UpgradeCatalog;
use crate::id::{RowGroupId, UpgradeId};
use crate::progression::ProgressionState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Row {
    /// An ungrouped node on its own row.
    Single(UpgradeId),

    /// All currently-visible members of a row group, in catalog order.
    Group {
        group: RowGroupId,
        members: Vec<UpgradeId>,
    },
}

/// Compute the visible rows in catalog order.
///
/// Grouped nodes are emitted once per group, at the position of the first
/// visible member encountered; the row contains every visible member of
/// that group at that moment.
pub fn visible_rows(catalog: &UpgradeCatalog, progression: &ProgressionState) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut handled: HashSet<RowGroupId> = HashSet::new();

    for node in catalog.all() {
        if !progression.prereqs_met(&node.prereqs) {
            continue;
        }
        match node.row_group {
            Some(group) => {
                if handled.insert(group) {
                    let members: Vec<UpgradeId> = catalog
                        .all()
                        .iter()
                        .filter(|n| n.row_group == Some(group))
                        .filter(|n| progression.prereqs_met(&n.prereqs))
                        .map(|n| n.id.clone())
                        .collect();
                    rows.push(Row::Group { group, members });
                }
            }
            None => rows.push(Row::Single(node.id.clone())),
        }
    }

    rows
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UpgradeNode;

    fn node(id: &str, prereqs: &[&str], group: Option<u32>) -> UpgradeNode {
        UpgradeNode {
            id: UpgradeId::new(id),
            title: id.to_string(),
            description: String::new(),
            cost: 0,
            prereqs: prereqs.iter().map(|p| UpgradeId::new(*p)).collect(),
            row_group: group.map(RowGroupId),
            question: None,
            effects: Vec::new(),
        }
    }

    /// Catalog [A, B(prereq A, group G), C(prereq A, group G)].
    fn grouped_catalog() -> UpgradeCatalog {
        let mut catalog = UpgradeCatalog::new(7);
        catalog.register(node("A", &[], None)).unwrap();
        catalog.register(node("B", &["A"], Some(1))).unwrap();
        catalog.register(node("C", &["A"], Some(1))).unwrap();
        catalog
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    #[test]
    fn only_root_visible_at_start() {
        let catalog = grouped_catalog();
        let progression = ProgressionState::new();
        let rows = visible_rows(&catalog, &progression);
        assert_eq!(rows, vec![Row::Single(UpgradeId::new("A"))]);
    }

    #[test]
    fn group_emitted_as_one_row() {
        // After purchasing A, B and C share a single grouped row.
        let catalog = grouped_catalog();
        let mut progression = ProgressionState::new();
        progression.mark_purchased(UpgradeId::new("A"));

        let rows = visible_rows(&catalog, &progression);
        assert_eq!(
            rows,
            vec![
                Row::Single(UpgradeId::new("A")),
                Row::Group {
                    group: RowGroupId(1),
                    members: vec![UpgradeId::new("B"), UpgradeId::new("C")],
                },
            ]
        );
    }

    #[test]
    fn purchased_nodes_stay_visible() {
        let catalog = grouped_catalog();
        let mut progression = ProgressionState::new();
        progression.mark_purchased(UpgradeId::new("A"));
        progression.mark_purchased(UpgradeId::new("B"));

        let rows = visible_rows(&catalog, &progression);
        assert_eq!(rows.len(), 2);
        match &rows[1] {
            Row::Group { members, .. } => {
                assert!(members.contains(&UpgradeId::new("B")));
                assert!(members.contains(&UpgradeId::new("C")));
            }
            other => panic!("expected grouped row, got {other:?}"),
        }
    }

    #[test]
    fn group_gains_members_as_prereqs_unlock() {
        // D joins group 1 but needs B as well as A; the row grows once B is
        // purchased, without the earlier members moving.
        let mut catalog = grouped_catalog();
        catalog.register(node("D", &["A", "B"], Some(1))).unwrap();

        let mut progression = ProgressionState::new();
        progression.mark_purchased(UpgradeId::new("A"));

        let rows = visible_rows(&catalog, &progression);
        match &rows[1] {
            Row::Group { members, .. } => {
                assert_eq!(members, &vec![UpgradeId::new("B"), UpgradeId::new("C")]);
            }
            other => panic!("expected grouped row, got {other:?}"),
        }

        progression.mark_purchased(UpgradeId::new("B"));
        let rows = visible_rows(&catalog, &progression);
        match &rows[1] {
            Row::Group { members, .. } => {
                assert_eq!(
                    members,
                    &vec![
                        UpgradeId::new("B"),
                        UpgradeId::new("C"),
                        UpgradeId::new("D")
                    ]
                );
            }
            other => panic!("expected grouped row, got {other:?}"),
        }
    }

    #[test]
    fn singletons_keep_catalog_order_around_groups() {
        let mut catalog = grouped_catalog();
        catalog.register(node("E", &["A"], None)).unwrap();

        let mut progression = ProgressionState::new();
        progression.mark_purchased(UpgradeId::new("A"));

        let rows = visible_rows(&catalog, &progression);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], Row::Single(UpgradeId::new("E")));
    }
}
