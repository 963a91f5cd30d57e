//! Change classification and dependency ordering.
//!
//! Tables must be created after the tables their foreign keys reference.
//! [`detach_cycles`] sorts table-level changes so referenced tables come
//! first. When the references form a cycle, foreign keys are split off into
//! trailing `ALTER TABLE` changes that run once every table exists.

use std::collections::HashMap;

use tracing::debug;

use crate::change::{Change, TableChange};
use crate::error::{PlanError, Result};
use crate::schema::ForeignKey;

/// Splits `changes` into schema-level changes and table-level changes,
/// preserving the input order within each group.
#[must_use]
pub fn split_top_level(changes: &[Change]) -> (Vec<Change>, Vec<Change>) {
    changes.iter().cloned().partition(Change::is_top_level)
}

/// Checks that a foreign key being created names both sides of the
/// reference.
///
/// # Errors
///
/// Returns [`PlanError::InvalidForeignKey`] listing every missing piece.
pub fn check_fk(fk: &ForeignKey) -> Result<()> {
    let mut missing = Vec::new();
    if fk.table.is_empty() {
        missing.push("child table");
    }
    if fk.columns.is_empty() {
        missing.push("child columns");
    }
    if fk.ref_table.name.is_empty() {
        missing.push("parent table");
    }
    if fk.ref_columns.is_empty() {
        missing.push("parent columns");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidForeignKey {
            symbol: fk.symbol.clone(),
            missing,
        })
    }
}

/// Orders table-level changes so that referenced tables are handled before
/// the tables referencing them, detaching foreign keys when the references
/// form a cycle.
///
/// # Errors
///
/// Returns an error if a foreign key being created is incomplete, or if a
/// cycle remains after detaching.
pub fn detach_cycles(changes: Vec<Change>) -> Result<Vec<Change>> {
    for change in &changes {
        for fk in created_foreign_keys(change) {
            check_fk(fk)?;
        }
    }

    let graph = dependencies(&changes);
    match sort_map(&graph) {
        Ok(sorted) => Ok(sort_changes(changes, &sorted)),
        Err(cycle) => {
            debug!(tables = ?cycle, "Detaching foreign keys to break dependency cycle");
            let (planned, deferred) = detach_references(changes);
            let mut ordered = sort_detached(planned)?;
            ordered.extend(deferred);
            Ok(ordered)
        }
    }
}

fn created_foreign_keys(change: &Change) -> Vec<&ForeignKey> {
    match change {
        Change::AddTable { table, .. } => table.foreign_keys.iter().collect(),
        Change::ModifyTable { changes, .. } => changes
            .iter()
            .filter_map(TableChange::created_foreign_key)
            .collect(),
        _ => Vec::new(),
    }
}

/// Dependency graph keyed by table, with nodes in first-appearance order.
#[derive(Debug, Default)]
struct Graph {
    nodes: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl Graph {
    fn add_edge(&mut self, from: String, to: String) {
        if !self.edges.contains_key(&from) {
            self.nodes.push(from.clone());
        }
        let refs = self.edges.entry(from).or_default();
        if !refs.contains(&to) {
            refs.push(to);
        }
    }

    fn refs(&self, node: &str) -> &[String] {
        self.edges.get(node).map_or(&[], Vec::as_slice)
    }
}

fn dependencies(changes: &[Change]) -> Graph {
    let mut graph = Graph::default();
    for change in changes {
        let Some(table) = change.table() else {
            continue;
        };
        for fk in created_foreign_keys(change) {
            if !table.is_self_reference(fk) {
                graph.add_edge(table.key(), fk.ref_table.key(table.schema_name()));
            }
        }
    }
    graph
}

/// Numbers every node so that referenced tables get lower numbers than the
/// tables referencing them. On a cycle, returns the tables on it.
fn sort_map(graph: &Graph) -> std::result::Result<HashMap<String, usize>, Vec<String>> {
    fn visit(
        graph: &Graph,
        node: &str,
        path: &mut Vec<String>,
        sorted: &mut HashMap<String, usize>,
    ) -> std::result::Result<(), Vec<String>> {
        if let Some(pos) = path.iter().position(|n| n == node) {
            return Err(path[pos..].to_vec());
        }
        if sorted.contains_key(node) {
            return Ok(());
        }
        path.push(node.to_string());
        for next in graph.refs(node) {
            visit(graph, next, path, sorted)?;
        }
        path.pop();
        let n = sorted.len();
        sorted.insert(node.to_string(), n);
        Ok(())
    }

    let mut sorted = HashMap::new();
    for node in &graph.nodes {
        visit(graph, node, &mut Vec::new(), &mut sorted)?;
    }
    Ok(sorted)
}

fn sort_changes(mut changes: Vec<Change>, sorted: &HashMap<String, usize>) -> Vec<Change> {
    changes.sort_by_cached_key(|c| {
        c.table()
            .and_then(|t| sorted.get(&t.key()).copied())
            .unwrap_or(0)
    });
    changes
}

/// Sorts the changes left after [`detach_references`]. Only self references
/// remain on them, so the graph is expected to be acyclic; a cycle here means
/// a reference escaped detaching and is reported instead of emitted.
fn sort_detached(planned: Vec<Change>) -> Result<Vec<Change>> {
    let sorted =
        sort_map(&dependencies(&planned)).map_err(|tables| PlanError::Cycle { tables })?;
    Ok(sort_changes(planned, &sorted))
}

/// Moves foreign keys between distinct tables out of `changes`. Returns the
/// remaining changes and the deferred `ModifyTable` changes adding the keys.
fn detach_references(changes: Vec<Change>) -> (Vec<Change>, Vec<Change>) {
    let mut planned = Vec::with_capacity(changes.len());
    let mut deferred = Vec::new();
    for change in changes {
        match change {
            Change::AddTable {
                mut table,
                if_not_exists,
            } => {
                let (own, other): (Vec<_>, Vec<_>) = std::mem::take(&mut table.foreign_keys)
                    .into_iter()
                    .partition(|fk| table.is_self_reference(fk));
                table.foreign_keys = own;
                if !other.is_empty() {
                    deferred.push(Change::modify_table(
                        table.clone(),
                        other
                            .into_iter()
                            .map(|fk| TableChange::AddForeignKey { fk })
                            .collect(),
                    ));
                }
                planned.push(Change::AddTable {
                    table,
                    if_not_exists,
                });
            }
            Change::ModifyTable { table, changes } => {
                let (kept, fks) = split_fk_changes(changes);
                if !fks.is_empty() {
                    deferred.push(Change::modify_table(table.clone(), fks));
                }
                if !kept.is_empty() {
                    planned.push(Change::modify_table(table, kept));
                }
            }
            other => planned.push(other),
        }
    }
    (planned, deferred)
}

fn split_fk_changes(changes: Vec<TableChange>) -> (Vec<TableChange>, Vec<TableChange>) {
    let mut kept = Vec::new();
    let mut fks = Vec::new();
    for change in changes {
        match change {
            TableChange::AddForeignKey { .. } => fks.push(change),
            TableChange::ModifyForeignKey { from, to, .. } => {
                fks.push(TableChange::DropForeignKey { fk: from });
                fks.push(TableChange::AddForeignKey { fk: to });
            }
            other => kept.push(other),
        }
    }
    (kept, fks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType, Schema, Table, TableRef};

    fn table(name: &str) -> Table {
        Table::new(name).column(Column::new("id", ColumnType::Bool).not_null())
    }

    fn fk(symbol: &str, from: &str, to: &str) -> ForeignKey {
        ForeignKey::new(symbol, from, TableRef::new(to)).column(format!("{to}_id"), "id")
    }

    fn names(changes: &[Change]) -> Vec<String> {
        changes
            .iter()
            .map(|c| format!("{}:{}", c.kind_name(), c.table().map_or("", |t| &t.name)))
            .collect()
    }

    #[test]
    fn test_split_top_level() {
        let changes = vec![
            Change::add_table(table("a")),
            Change::AddSchema {
                schema: Schema::new("s"),
                if_not_exists: false,
            },
            Change::drop_table(table("b")),
        ];
        let (top, rest) = split_top_level(&changes);
        assert_eq!(top.len(), 1);
        assert_eq!(names(&rest), ["AddTable:a", "DropTable:b"]);
    }

    #[test]
    fn test_check_fk_reports_missing_pieces() {
        let bad = ForeignKey::new("fk", "", TableRef::new(""));
        let err = check_fk(&bad).unwrap_err();
        match err {
            PlanError::InvalidForeignKey { symbol, missing } => {
                assert_eq!(symbol, "fk");
                assert_eq!(
                    missing,
                    ["child table", "child columns", "parent table", "parent columns"]
                );
            }
            other => panic!("Unexpected error: {other}"),
        }
        assert!(check_fk(&fk("fk", "a", "b")).is_ok());
    }

    #[test]
    fn test_referenced_first() {
        let changes = vec![
            Change::add_table(table("posts").foreign_key(fk("fk_user", "posts", "users"))),
            Change::add_table(table("users")),
        ];
        let ordered = detach_cycles(changes).unwrap();
        assert_eq!(names(&ordered), ["AddTable:users", "AddTable:posts"]);
    }

    #[test]
    fn test_chain_order() {
        let changes = vec![
            Change::add_table(table("c").foreign_key(fk("fk_b", "c", "b"))),
            Change::add_table(table("b").foreign_key(fk("fk_a", "b", "a"))),
            Change::add_table(table("a")),
        ];
        let ordered = detach_cycles(changes).unwrap();
        assert_eq!(names(&ordered), ["AddTable:a", "AddTable:b", "AddTable:c"]);
    }

    #[test]
    fn test_self_reference_is_not_a_dependency() {
        let nodes = table("nodes").foreign_key(fk("fk_parent", "nodes", "nodes"));
        let ordered = detach_cycles(vec![Change::add_table(nodes)]).unwrap();
        assert_eq!(ordered.len(), 1);
        match &ordered[0] {
            Change::AddTable { table, .. } => assert_eq!(table.foreign_keys.len(), 1),
            other => panic!("Unexpected change: {other}"),
        }
    }

    #[test]
    fn test_cycle_is_detached() {
        let changes = vec![
            Change::add_table(table("a").foreign_key(fk("fk_b", "a", "b"))),
            Change::add_table(
                table("b")
                    .foreign_key(fk("fk_a", "b", "a"))
                    .foreign_key(fk("fk_self", "b", "b")),
            ),
        ];
        let ordered = detach_cycles(changes).unwrap();
        assert_eq!(
            names(&ordered),
            [
                "AddTable:a",
                "AddTable:b",
                "ModifyTable:a",
                "ModifyTable:b"
            ]
        );
        match &ordered[1] {
            Change::AddTable { table, .. } => {
                assert_eq!(table.foreign_keys.len(), 1);
                assert_eq!(table.foreign_keys[0].symbol, "fk_self");
            }
            other => panic!("Unexpected change: {other}"),
        }
        match &ordered[3] {
            Change::ModifyTable { changes, .. } => {
                assert_eq!(changes.len(), 1);
                assert_eq!(changes[0].kind_name(), "AddForeignKey");
            }
            other => panic!("Unexpected change: {other}"),
        }
    }

    #[test]
    fn test_remaining_cycle_is_an_error() {
        let changes = vec![
            Change::add_table(table("a").foreign_key(fk("fk_b", "a", "b"))),
            Change::add_table(table("b").foreign_key(fk("fk_a", "b", "a"))),
        ];
        match sort_detached(changes).unwrap_err() {
            PlanError::Cycle { tables } => assert_eq!(tables, ["a", "b"]),
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_detached_changes_are_acyclic() {
        let changes = vec![
            Change::add_table(table("a").foreign_key(fk("fk_b", "a", "b"))),
            Change::add_table(table("b").foreign_key(fk("fk_a", "b", "a"))),
        ];
        let (planned, deferred) = detach_references(changes);
        assert_eq!(deferred.len(), 2);
        let ordered = sort_detached(planned).unwrap();
        assert_eq!(names(&ordered), ["AddTable:a", "AddTable:b"]);
    }

    #[test]
    fn test_modify_foreign_key_detached_as_pair() {
        let changes = vec![
            Change::add_table(table("a").foreign_key(fk("fk_b", "a", "b"))),
            Change::modify_table(
                table("b"),
                vec![
                    TableChange::AddColumn {
                        column: Column::new("a_id", ColumnType::Bool),
                    },
                    TableChange::ModifyForeignKey {
                        from: fk("fk_a", "b", "c"),
                        to: fk("fk_a", "b", "a"),
                        change: crate::change::ChangeKind::REF_TABLE,
                    },
                ],
            ),
        ];
        let ordered = detach_cycles(changes).unwrap();
        assert_eq!(
            names(&ordered),
            [
                "AddTable:a",
                "ModifyTable:b",
                "ModifyTable:a",
                "ModifyTable:b"
            ]
        );
        match &ordered[3] {
            Change::ModifyTable { changes, .. } => {
                let kinds: Vec<_> = changes.iter().map(TableChange::kind_name).collect();
                assert_eq!(kinds, ["DropForeignKey", "AddForeignKey"]);
            }
            other => panic!("Unexpected change: {other}"),
        }
    }

    #[test]
    fn test_schema_qualified_keys() {
        let s = Schema::new("app");
        let changes = vec![
            Change::add_table(
                table("posts")
                    .in_schema(s.clone())
                    .foreign_key(fk("fk_user", "posts", "users")),
            ),
            Change::add_table(table("users").in_schema(Schema::new("other"))),
            Change::add_table(table("users").in_schema(s)),
        ];
        let ordered = detach_cycles(changes).unwrap();
        let keys: Vec<_> = ordered.iter().filter_map(Change::table).map(Table::key).collect();
        assert_eq!(keys, ["other.users", "app.users", "app.posts"]);
    }
}
