//! # schemaplan-mysql
//!
//! MySQL and MariaDB planner for `schemaplan-core`.
//!
//! # How MySQL differs from other dialects
//!
//! - **[Implicit commit]**: every DDL statement commits the current
//!   transaction, so plans are never transactional.
//! - **Identifier quoting**: MySQL quotes identifiers with backticks
//!   (`` ` ``). See [Schema object names].
//! - **Table options**: the `AUTO_INCREMENT` start value, character set,
//!   collation and comment are [table options] written after the column
//!   list, not column attributes.
//! - **[ALTER TABLE]**: several clauses may be combined in one statement.
//!   An index is dropped automatically once all of its columns are
//!   dropped, and dropping a foreign key keeps the index MySQL created for
//!   it.
//! - **[JSON]** on MariaDB is an alias for `LONGTEXT`. Versions before
//!   10.4.3 do not add the `json_valid` check themselves.
//!
//! [Implicit commit]: https://dev.mysql.com/doc/refman/8.0/en/implicit-commit.html
//! [Schema object names]: https://dev.mysql.com/doc/refman/8.0/en/identifiers.html
//! [table options]: https://dev.mysql.com/doc/refman/8.0/en/create-table.html
//! [ALTER TABLE]: https://dev.mysql.com/doc/refman/8.0/en/alter-table.html
//! [JSON]: https://mariadb.com/kb/en/json-data-type/
//!
//! ## Example
//!
//! ```rust
//! use schemaplan_core::{Change, Column, ColumnType, Index, IntegerKind, PlanApply, Table};
//! use schemaplan_mysql::MysqlPlanner;
//!
//! let users = Table::new("users")
//!     .column(Column::new("id", ColumnType::Integer { kind: IntegerKind::Int, unsigned: false }).not_null())
//!     .primary_key(Index::primary_key(["id"]));
//!
//! let plan = MysqlPlanner::default()
//!     .plan_changes("init", &[Change::add_table(users)])
//!     .unwrap();
//! assert_eq!(
//!     plan.changes[0].cmd,
//!     "CREATE TABLE `users` (`id` int NOT NULL, PRIMARY KEY (`id`))"
//! );
//! assert!(plan.reversible);
//! ```

pub mod batch;
pub mod format;
pub mod planner;
pub mod server;

pub use planner::MysqlPlanner;
pub use server::{Flavor, ParseVersionError, ServerInfo, ServerVersion};
