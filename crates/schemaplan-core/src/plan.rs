//! Migration plans.

use serde::Serialize;

use crate::change::Change;
use crate::error::Result;

/// One statement of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedChange {
    /// Forward statement.
    pub cmd: String,
    /// Statement undoing `cmd`, when one exists.
    pub reverse: Option<String>,
    /// Human-readable description.
    pub comment: String,
    /// The change this statement was planned from.
    pub source: Change,
}

impl PlannedChange {
    /// Creates a planned statement.
    #[must_use]
    pub fn new(cmd: impl Into<String>, comment: impl Into<String>, source: Change) -> Self {
        Self {
            cmd: cmd.into(),
            reverse: None,
            comment: comment.into(),
            source,
        }
    }

    /// Sets the reverse statement.
    #[must_use]
    pub fn reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }

    /// Returns true if the statement can be undone.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.reverse.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// An ordered list of statements implementing a set of changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    /// Plan name.
    pub name: String,
    /// Whether the statements may run inside one transaction.
    pub transactional: bool,
    /// Whether every statement has a reverse.
    pub reversible: bool,
    /// Statements in execution order.
    pub changes: Vec<PlannedChange>,
}

impl Plan {
    /// Creates an empty plan. An empty plan is trivially reversible.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transactional: false,
            reversible: true,
            changes: Vec::new(),
        }
    }

    /// Appends a statement.
    pub fn push(&mut self, change: PlannedChange) {
        self.changes.push(change);
    }

    /// Recomputes `reversible` from the statements.
    pub fn recompute_reversible(&mut self) {
        self.reversible = self.changes.iter().all(PlannedChange::is_reversible);
    }

    /// Returns the reverse statements in the order they must run to undo
    /// the plan, or `None` if some statement is irreversible.
    #[must_use]
    pub fn reverse_statements(&self) -> Option<Vec<&str>> {
        self.changes
            .iter()
            .rev()
            .map(|c| c.reverse.as_deref().filter(|r| !r.is_empty()))
            .collect()
    }
}

/// Turns a list of changes into a [`Plan`] for one dialect.
///
/// Implementations keep per-call state local to the call, so a single
/// planner may be shared across threads.
pub trait PlanApply: Send + Sync {
    /// Plans `changes` under the given plan name.
    ///
    /// # Errors
    ///
    /// Returns an error if a change cannot be expressed in the dialect or
    /// the changes are structurally invalid.
    fn plan_changes(&self, name: &str, changes: &[Change]) -> Result<Plan>;
}
