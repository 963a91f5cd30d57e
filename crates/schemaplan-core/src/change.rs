//! Schema changes consumed by the planner.
//!
//! Changes come in two closed categories: [`Change`] for top-level
//! (schema and table) changes and [`TableChange`] for edits inside a single
//! table modification. Planners match on them exhaustively, so adding a
//! variant forces every planner to decide how to handle it.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::schema::{Column, ForeignKey, Index, Schema, Table, TableAttr};

/// Bitmask of the sub-fields that differ between the two sides of a
/// `Modify*` change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeKind(u32);

impl ChangeKind {
    /// Nothing changed.
    pub const NONE: Self = Self(0);
    /// A generic attribute changed.
    pub const ATTR: Self = Self(1);
    /// Character set changed.
    pub const CHARSET: Self = Self(1 << 1);
    /// Collation changed.
    pub const COLLATION: Self = Self(1 << 2);
    /// Comment changed.
    pub const COMMENT: Self = Self(1 << 3);
    /// Nullability changed.
    pub const NULL: Self = Self(1 << 4);
    /// Type changed.
    pub const TYPE: Self = Self(1 << 5);
    /// Default value changed.
    pub const DEFAULT: Self = Self(1 << 6);
    /// Index uniqueness changed.
    pub const UNIQUE: Self = Self(1 << 7);
    /// Index parts changed.
    pub const PARTS: Self = Self(1 << 8);
    /// Foreign key columns changed.
    pub const COLUMN: Self = Self(1 << 9);
    /// Foreign key referenced columns changed.
    pub const REF_COLUMN: Self = Self(1 << 10);
    /// Foreign key referenced table changed.
    pub const REF_TABLE: Self = Self(1 << 11);
    /// ON UPDATE action changed.
    pub const UPDATE_ACTION: Self = Self(1 << 12);
    /// ON DELETE action changed.
    pub const DELETE_ACTION: Self = Self(1 << 13);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reports whether `self` equals `other` or shares any bit with it.
    #[must_use]
    pub const fn is(self, other: Self) -> bool {
        self.0 == other.0 || self.0 & other.0 != 0
    }
}

impl BitOr for ChangeKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChangeKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A top-level schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// Create a schema.
    AddSchema {
        /// The schema to create.
        schema: Schema,
        /// Guard with `IF NOT EXISTS`.
        #[serde(default)]
        if_not_exists: bool,
    },
    /// Drop a schema.
    DropSchema {
        /// The schema to drop.
        schema: Schema,
        /// Guard with `IF EXISTS`.
        #[serde(default)]
        if_exists: bool,
    },
    /// Change schema-level attributes.
    ModifySchema {
        /// Current definition.
        from: Schema,
        /// Desired definition.
        to: Schema,
    },
    /// Create a table.
    AddTable {
        /// The table to create.
        table: Table,
        /// Guard with `IF NOT EXISTS`.
        #[serde(default)]
        if_not_exists: bool,
    },
    /// Drop a table.
    DropTable {
        /// The table to drop.
        table: Table,
        /// Guard with `IF EXISTS`.
        #[serde(default)]
        if_exists: bool,
    },
    /// Modify a table in place.
    ModifyTable {
        /// The table being modified.
        table: Table,
        /// Edits to apply, in no particular order.
        changes: Vec<TableChange>,
    },
}

impl Change {
    /// Creates an `AddTable` change without a guard.
    #[must_use]
    pub const fn add_table(table: Table) -> Self {
        Self::AddTable {
            table,
            if_not_exists: false,
        }
    }

    /// Creates a `DropTable` change without a guard.
    #[must_use]
    pub const fn drop_table(table: Table) -> Self {
        Self::DropTable {
            table,
            if_exists: false,
        }
    }

    /// Creates a `ModifyTable` change.
    #[must_use]
    pub const fn modify_table(table: Table, changes: Vec<TableChange>) -> Self {
        Self::ModifyTable { table, changes }
    }

    /// Returns true for schema-level changes.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        matches!(
            self,
            Self::AddSchema { .. } | Self::DropSchema { .. } | Self::ModifySchema { .. }
        )
    }

    /// Returns the table this change operates on, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&Table> {
        match self {
            Self::AddTable { table, .. }
            | Self::DropTable { table, .. }
            | Self::ModifyTable { table, .. } => Some(table),
            Self::AddSchema { .. } | Self::DropSchema { .. } | Self::ModifySchema { .. } => None,
        }
    }

    /// Returns the variant name, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::AddSchema { .. } => "AddSchema",
            Self::DropSchema { .. } => "DropSchema",
            Self::ModifySchema { .. } => "ModifySchema",
            Self::AddTable { .. } => "AddTable",
            Self::DropTable { .. } => "DropTable",
            Self::ModifyTable { .. } => "ModifyTable",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddSchema { schema, .. }
            | Self::DropSchema { schema, .. }
            | Self::ModifySchema { to: schema, .. } => {
                write!(f, "{} {:?}", self.kind_name(), schema.name)
            }
            Self::AddTable { table, .. }
            | Self::DropTable { table, .. }
            | Self::ModifyTable { table, .. } => {
                write!(f, "{} {:?}", self.kind_name(), table.key())
            }
        }
    }
}

/// An edit inside a table modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableChange {
    /// Add a column.
    AddColumn {
        /// The new column.
        column: Column,
    },
    /// Change a column definition.
    ModifyColumn {
        /// Current definition.
        from: Column,
        /// Desired definition.
        to: Column,
        /// Which parts differ.
        #[serde(default)]
        change: ChangeKind,
    },
    /// Drop a column.
    DropColumn {
        /// The dropped column.
        column: Column,
    },
    /// Add an index.
    AddIndex {
        /// The new index.
        index: Index,
    },
    /// Change an index definition.
    ModifyIndex {
        /// Current definition.
        from: Index,
        /// Desired definition.
        to: Index,
        /// Which parts differ.
        #[serde(default)]
        change: ChangeKind,
    },
    /// Drop an index.
    DropIndex {
        /// The dropped index.
        index: Index,
    },
    /// Add a foreign key.
    AddForeignKey {
        /// The new key.
        fk: ForeignKey,
    },
    /// Change a foreign key.
    ModifyForeignKey {
        /// Current definition.
        from: ForeignKey,
        /// Desired definition.
        to: ForeignKey,
        /// Which parts differ.
        #[serde(default)]
        change: ChangeKind,
    },
    /// Drop a foreign key.
    DropForeignKey {
        /// The dropped key.
        fk: ForeignKey,
    },
    /// Add a table option.
    AddAttr {
        /// The new option.
        attr: TableAttr,
    },
    /// Change a table option.
    ModifyAttr {
        /// Current value.
        from: TableAttr,
        /// Desired value.
        to: TableAttr,
    },
    /// Drop a table option.
    DropAttr {
        /// The dropped option.
        attr: TableAttr,
    },
}

impl TableChange {
    /// Returns the variant name, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::AddColumn { .. } => "AddColumn",
            Self::ModifyColumn { .. } => "ModifyColumn",
            Self::DropColumn { .. } => "DropColumn",
            Self::AddIndex { .. } => "AddIndex",
            Self::ModifyIndex { .. } => "ModifyIndex",
            Self::DropIndex { .. } => "DropIndex",
            Self::AddForeignKey { .. } => "AddForeignKey",
            Self::ModifyForeignKey { .. } => "ModifyForeignKey",
            Self::DropForeignKey { .. } => "DropForeignKey",
            Self::AddAttr { .. } => "AddAttr",
            Self::ModifyAttr { .. } => "ModifyAttr",
            Self::DropAttr { .. } => "DropAttr",
        }
    }

    /// Returns the foreign key being created by this edit, if any.
    #[must_use]
    pub const fn created_foreign_key(&self) -> Option<&ForeignKey> {
        match self {
            Self::AddForeignKey { fk } | Self::ModifyForeignKey { to: fk, .. } => Some(fk),
            _ => None,
        }
    }
}
