//! Plan output.

use clap::ValueEnum;
use schemaplan_core::Plan;
use serde::Serialize;

use crate::error::{Error, Result};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// SQL script with one commented statement per change.
    #[default]
    Sql,
    /// The plan as JSON.
    Json,
}

#[derive(Serialize)]
struct ReverseScript<'a> {
    name: &'a str,
    statements: Vec<&'a str>,
}

/// Renders the forward script of `plan`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(plan: &Plan, format: Format) -> Result<String> {
    match format {
        Format::Sql => {
            let mut out = String::new();
            for change in &plan.changes {
                out.push_str(&format!("-- {}\n{};\n", change.comment, change.cmd));
            }
            Ok(out)
        }
        Format::Json => Ok(serde_json::to_string_pretty(plan)?),
    }
}

/// Renders the script undoing `plan`, last statement first.
///
/// # Errors
///
/// Returns [`Error::NotReversible`] if some statement has no reverse.
pub fn render_reverse(plan: &Plan, format: Format) -> Result<String> {
    let statements = plan
        .reverse_statements()
        .ok_or_else(|| Error::NotReversible(plan.name.clone()))?;
    match format {
        Format::Sql => {
            let mut out = String::new();
            for (change, statement) in plan.changes.iter().rev().zip(&statements) {
                out.push_str(&format!("-- reverse: {}\n{};\n", change.comment, statement));
            }
            Ok(out)
        }
        Format::Json => Ok(serde_json::to_string_pretty(&ReverseScript {
            name: &plan.name,
            statements,
        })?),
    }
}
