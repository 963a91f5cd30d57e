//! Reversible MySQL migration planning.
//!
//! `schemaplan` turns a list of schema changes into an ordered SQL script
//! where:
//! - Referenced tables are created before the tables pointing at them
//! - Foreign key cycles are broken into trailing `ALTER TABLE` statements
//! - Every statement carries its reverse when one exists
//!
//! # Architecture
//!
//! - **schemaplan-core** - Change model, statement builder and dependency ordering
//! - **schemaplan-mysql** - MySQL/MariaDB planner and value formatting
//! - **Input** - Loads JSON change lists produced by a schema differ
//! - **Probe** - Reads flavor, version and default collation from a live server
//! - **Render** - Prints forward or reverse scripts as SQL or JSON
//!
//! # Example
//!
//! ```rust
//! use schemaplan::prelude::*;
//!
//! let changes = parse_changes(r#"[
//!     { "type": "drop_table", "table": { "name": "sessions" }, "if_exists": true }
//! ]"#).unwrap();
//!
//! let plan = MysqlPlanner::default().plan_changes("cleanup", &changes).unwrap();
//! assert_eq!(
//!     render(&plan, Format::Sql).unwrap(),
//!     "-- drop \"sessions\" table\nDROP TABLE IF EXISTS `sessions`;\n"
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Plan a change file against MySQL 8 defaults
//! schemaplan plan changes.json
//!
//! # Plan against a live server and print the rollback script
//! schemaplan plan changes.json --database mysql://root@localhost/app --reverse
//!
//! # Show what the planner detects on a server
//! schemaplan probe --database mysql://root@localhost/app
//! ```

pub mod error;
pub mod input;
pub mod probe;
pub mod render;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::input::{load_changes, parse_changes};
    pub use crate::probe::{offline, probe};
    pub use crate::render::{render, render_reverse, Format};
    pub use schemaplan_core::{Change, Plan, PlanApply, PlannedChange, TableChange};
    pub use schemaplan_mysql::{Flavor, MysqlPlanner, ServerInfo, ServerVersion};
}
