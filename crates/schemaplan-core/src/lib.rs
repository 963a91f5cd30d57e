//! # schemaplan-core
//!
//! Dialect-agnostic building blocks for planning schema migrations.
//!
//! A planner receives a list of [`Change`]s (tables to create, columns to
//! drop, foreign keys to add) and turns them into a [`Plan`]: an ordered
//! list of DDL statements, each paired with a statement undoing it when one
//! exists.
//!
//! This crate provides:
//!
//! - the schema object graph ([`Table`], [`Column`], [`Index`], [`ForeignKey`])
//! - the input change types ([`Change`], [`TableChange`], [`ChangeKind`])
//! - the output plan ([`Plan`], [`PlannedChange`]) and the [`PlanApply`] trait
//! - a statement [`Builder`]
//! - dependency ordering of table changes ([`order::detach_cycles`])
//!
//! Dialects live in their own crates and implement [`PlanApply`].
//!
//! ## Example
//!
//! ```rust
//! use schemaplan_core::order::detach_cycles;
//! use schemaplan_core::{Change, Column, ColumnType, ForeignKey, Table, TableRef};
//!
//! let users = Table::new("users").column(Column::new("id", ColumnType::Bool));
//! let posts = Table::new("posts")
//!     .column(Column::new("user_id", ColumnType::Bool))
//!     .foreign_key(ForeignKey::new("fk_user", "posts", TableRef::new("users")).column("user_id", "id"));
//!
//! let ordered = detach_cycles(vec![Change::add_table(posts), Change::add_table(users)]).unwrap();
//! assert_eq!(ordered[0].table().unwrap().name, "users");
//! ```

pub mod builder;
pub mod change;
pub mod error;
pub mod order;
pub mod plan;
pub mod schema;

pub use builder::Builder;
pub use change::{Change, ChangeKind, TableChange};
pub use error::{PlanError, Result};
pub use plan::{Plan, PlanApply, PlannedChange};
pub use schema::{
    Column, ColumnAttr, ColumnType, DefaultValue, ForeignKey, ForeignKeyAction, Index, IndexAttr,
    IndexPart, IntegerKind, LobSize, PartTarget, Schema, SchemaAttr, Table, TableAttr, TableRef,
};
