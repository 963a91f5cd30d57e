//! Grouping of table edits into `ALTER TABLE` statements.
//!
//! A table modification is rendered as at most two statements. The first
//! drops indexes and foreign keys, the second applies everything else.
//! Constraints go first because dropping a column that belongs to a
//! multi-column unique index may otherwise fail on the intermediate state.

use std::collections::HashSet;

use schemaplan_core::{ChangeKind, Index, PlanError, Result, TableChange};

/// Removes `DropIndex` edits that MySQL performs on its own: an index is
/// dropped automatically once every column it covers is dropped.
///
/// An index covering an expression or a surviving column is kept, and so
/// is an index without parts.
#[must_use]
pub fn skip_auto_changes(changes: &[TableChange]) -> Vec<TableChange> {
    let dropped: HashSet<&str> = changes
        .iter()
        .filter_map(|c| match c {
            TableChange::DropColumn { column } => Some(column.name.as_str()),
            _ => None,
        })
        .collect();
    changes
        .iter()
        .filter(|c| match c {
            TableChange::DropIndex { index } => {
                index.parts.is_empty()
                    || !index
                        .parts
                        .iter()
                        .all(|p| p.column_name().is_some_and(|name| dropped.contains(name)))
            }
            _ => true,
        })
        .cloned()
        .collect()
}

/// Splits table edits into the drop batch and the main batch.
///
/// Index and foreign key drops go to the first batch. Modifications of
/// either become a drop in the first batch and an add in the second.
///
/// # Errors
///
/// Returns [`PlanError::UnsupportedTableChange`] for `DropAttr`.
pub fn split(changes: Vec<TableChange>) -> Result<[Vec<TableChange>; 2]> {
    let mut drops = Vec::new();
    let mut rest = Vec::new();
    for change in changes {
        match change {
            TableChange::DropIndex { .. } | TableChange::DropForeignKey { .. } => {
                drops.push(change);
            }
            TableChange::ModifyForeignKey { from, to, change } => {
                // Dropping the key leaves behind the index MySQL created
                // for it. It has to go too when the reference changes.
                let symbol = from.symbol.clone();
                drops.push(TableChange::DropForeignKey { fk: from });
                if change.is(ChangeKind::REF_TABLE | ChangeKind::REF_COLUMN) {
                    drops.push(TableChange::DropIndex {
                        index: Index::new(symbol),
                    });
                }
                rest.push(TableChange::AddForeignKey { fk: to });
            }
            TableChange::ModifyIndex { from, to, .. } => {
                drops.push(TableChange::DropIndex { index: from });
                rest.push(TableChange::AddIndex { index: to });
            }
            TableChange::DropAttr { .. } => {
                return Err(PlanError::UnsupportedTableChange(change.kind_name()));
            }
            other => rest.push(other),
        }
    }
    Ok([drops, rest])
}
