//! Schema object graph.
//!
//! These types describe the schema elements a change refers to. A [`Table`]
//! owns its columns, keys and indexes. Foreign keys name the table they
//! reference instead of pointing at it, so tables that reference each other
//! never form ownership cycles.

use serde::{Deserialize, Serialize};

/// A database schema (a MySQL database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name.
    pub name: String,
    /// Schema-level attributes.
    #[serde(default)]
    pub attrs: Vec<SchemaAttr>,
}

impl Schema {
    /// Creates a new schema without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, attr: SchemaAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Returns the schema collation, if set.
    #[must_use]
    pub fn collation(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            SchemaAttr::Collation(c) => Some(c.as_str()),
            SchemaAttr::Charset(_) => None,
        })
    }

    /// Returns the schema character set, if set.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            SchemaAttr::Charset(c) => Some(c.as_str()),
            SchemaAttr::Collation(_) => None,
        })
    }
}

/// Schema-level attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaAttr {
    /// Default character set.
    Charset(String),
    /// Default collation.
    Collation(String),
}

/// Size class of a large-object type (`TEXT` or `BLOB` family).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobSize {
    /// `TINYTEXT` / `TINYBLOB`.
    Tiny,
    /// `TEXT` / `BLOB`.
    #[default]
    Regular,
    /// `MEDIUMTEXT` / `MEDIUMBLOB`.
    Medium,
    /// `LONGTEXT` / `LONGBLOB`.
    Long,
}

/// Integer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegerKind {
    /// 8-bit.
    TinyInt,
    /// 16-bit.
    SmallInt,
    /// 24-bit.
    MediumInt,
    /// 32-bit.
    Int,
    /// 64-bit.
    BigInt,
}

/// Column type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Boolean.
    Bool,
    /// Integer of the given width.
    Integer {
        /// Integer width.
        kind: IntegerKind,
        /// Whether the column is unsigned.
        #[serde(default)]
        unsigned: bool,
    },
    /// Fixed-point number.
    Decimal {
        /// Total number of digits.
        precision: u32,
        /// Digits after the decimal point.
        scale: u32,
        /// Whether the column is unsigned.
        #[serde(default)]
        unsigned: bool,
    },
    /// Floating-point number.
    Float {
        /// `DOUBLE` instead of `FLOAT`.
        #[serde(default)]
        double: bool,
        /// Optional precision.
        #[serde(default)]
        precision: Option<u32>,
        /// Whether the column is unsigned.
        #[serde(default)]
        unsigned: bool,
    },
    /// Bit-field with optional width.
    Bit(Option<u32>),
    /// Fixed-length string.
    Char(u32),
    /// Variable-length string.
    Varchar(u32),
    /// Text large object.
    Text(LobSize),
    /// Fixed-length binary string.
    Binary(u32),
    /// Variable-length binary string.
    Varbinary(u32),
    /// Binary large object.
    Blob(LobSize),
    /// Date only.
    Date,
    /// Time of day with optional fractional precision.
    Time(Option<u8>),
    /// Date and time with optional fractional precision.
    Datetime(Option<u8>),
    /// Timestamp with optional fractional precision.
    Timestamp(Option<u8>),
    /// Year.
    Year,
    /// JSON document.
    Json,
    /// Enumeration of allowed values.
    Enum(Vec<String>),
    /// Set of allowed values.
    Set(Vec<String>),
    /// Spatial type (`point`, `geometry`, ...).
    Spatial(String),
    /// Any other type, rendered verbatim.
    Raw(String),
}

impl ColumnType {
    /// Returns true for types whose defaults are numeric literals.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Integer { .. }
                | Self::Decimal { .. }
                | Self::Float { .. }
                | Self::Bit(_)
        )
    }

    /// Returns true for date and time types.
    #[must_use]
    pub const fn is_time(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time(_) | Self::Datetime(_) | Self::Timestamp(_) | Self::Year
        )
    }

    /// Returns true for the JSON type.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// A literal value (`5`, `active`, `'quoted'`).
    Literal(String),
    /// A raw SQL expression (`CURRENT_TIMESTAMP`, `(UUID())`).
    RawExpr(String),
}

/// Column-level attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAttr {
    /// Column collation.
    Collation(String),
    /// Column comment.
    Comment(String),
    /// `ON UPDATE` expression.
    OnUpdate(String),
    /// Auto-increment, with an optional starting value.
    AutoIncrement(Option<i64>),
    /// Check constraint expression.
    Check(String),
}

/// Schema definition for a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub ty: ColumnType,
    /// Whether the column allows NULL values. Columns are nullable unless
    /// declared otherwise, both from [`Column::new`] and when deserialized.
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Dialect attributes.
    #[serde(default)]
    pub attrs: Vec<ColumnAttr>,
}

const fn nullable_by_default() -> bool {
    true
}

impl Column {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: nullable_by_default(),
            default: None,
            attrs: Vec::new(),
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_literal(mut self, value: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Sets a raw expression default.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::RawExpr(expr.into()));
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, attr: ColumnAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Returns true if the column carries an explicit check constraint.
    #[must_use]
    pub fn has_check(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, ColumnAttr::Check(_)))
    }
}

/// What an index part covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartTarget {
    /// A column, by name.
    Column(String),
    /// A functional key part.
    Expr(String),
}

/// One ordered part of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPart {
    /// Column or expression.
    pub target: PartTarget,
    /// Descending order.
    #[serde(default)]
    pub desc: bool,
}

impl IndexPart {
    /// Creates an ascending column part.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            target: PartTarget::Column(name.into()),
            desc: false,
        }
    }

    /// Creates an ascending expression part.
    #[must_use]
    pub fn expr(expr: impl Into<String>) -> Self {
        Self {
            target: PartTarget::Expr(expr.into()),
            desc: false,
        }
    }

    /// Marks the part as descending.
    #[must_use]
    pub const fn desc(mut self) -> Self {
        self.desc = true;
        self
    }

    /// Returns the column name when the part covers a column.
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        match &self.target {
            PartTarget::Column(name) => Some(name),
            PartTarget::Expr(_) => None,
        }
    }
}

/// Index-level attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAttr {
    /// Index comment.
    Comment(String),
}

/// Schema definition for an index or primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<IndexPart>,
    /// Index attributes.
    #[serde(default)]
    pub attrs: Vec<IndexAttr>,
}

impl Index {
    /// Creates an index without parts.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            parts: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Creates a primary key over the given columns.
    #[must_use]
    pub fn primary_key<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pk = Self::new("PRIMARY");
        pk.unique = true;
        pk.parts = columns.into_iter().map(IndexPart::column).collect();
        pk
    }

    /// Marks the index as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds a part.
    #[must_use]
    pub fn part(mut self, part: IndexPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Adds an ascending column part.
    #[must_use]
    pub fn column(self, name: impl Into<String>) -> Self {
        self.part(IndexPart::column(name))
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, attr: IndexAttr) -> Self {
        self.attrs.push(attr);
        self
    }
}

/// Referential action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A table referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema of the referenced table. `None` means the referencing table's schema.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableRef {
    /// References a table in the current schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// References a table in an explicit schema.
    #[must_use]
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Returns the graph key of the referenced table, resolving a missing
    /// schema to `default_schema`.
    #[must_use]
    pub fn key(&self, default_schema: Option<&str>) -> String {
        table_key(self.schema.as_deref().or(default_schema), &self.name)
    }
}

/// Schema definition for a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub symbol: String,
    /// Name of the table owning the key.
    pub table: String,
    /// Column(s) in the referencing table.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Referenced table.
    pub ref_table: TableRef,
    /// Referenced column(s).
    #[serde(default)]
    pub ref_columns: Vec<String>,
    /// Action on update.
    #[serde(default)]
    pub on_update: Option<ForeignKeyAction>,
    /// Action on delete.
    #[serde(default)]
    pub on_delete: Option<ForeignKeyAction>,
}

impl ForeignKey {
    /// Creates a foreign key owned by `table` and referencing `ref_table`.
    #[must_use]
    pub fn new(symbol: impl Into<String>, table: impl Into<String>, ref_table: TableRef) -> Self {
        Self {
            symbol: symbol.into(),
            table: table.into(),
            columns: Vec::new(),
            ref_table,
            ref_columns: Vec::new(),
            on_update: None,
            on_delete: None,
        }
    }

    /// Adds a (column, referenced column) pair.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>, ref_column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self.ref_columns.push(ref_column.into());
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }
}

/// Table-level attribute (table option).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableAttr {
    /// `AUTO_INCREMENT` start value. A missing value cannot be rendered.
    AutoIncrement(Option<i64>),
    /// Default character set.
    Charset(String),
    /// Default collation.
    Collation(String),
    /// Table comment.
    Comment(String),
}

/// Complete schema definition for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Owning schema header, if qualified.
    #[serde(default)]
    pub schema: Option<Schema>,
    /// Column definitions, in order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Primary key.
    #[serde(default)]
    pub primary_key: Option<Index>,
    /// Secondary indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Table options.
    #[serde(default)]
    pub attrs: Vec<TableAttr>,
}

impl Table {
    /// Creates a new table schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Places the table in a schema.
    #[must_use]
    pub fn in_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Adds a column to the table.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, pk: Index) -> Self {
        self.primary_key = Some(pk);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Adds a table option.
    #[must_use]
    pub fn attr(mut self, attr: TableAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the schema name, if the table is qualified.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_ref().map(|s| s.name.as_str())
    }

    /// Returns the graph key identifying this table.
    #[must_use]
    pub fn key(&self) -> String {
        table_key(self.schema_name(), &self.name)
    }

    /// Returns true if `fk` points back at this table.
    #[must_use]
    pub fn is_self_reference(&self, fk: &ForeignKey) -> bool {
        fk.ref_table.key(self.schema_name()) == self.key()
    }

    /// Returns the table collation, if set.
    #[must_use]
    pub fn collation(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            TableAttr::Collation(c) => Some(c.as_str()),
            _ => None,
        })
    }

    /// Returns true if the table carries an `AUTO_INCREMENT` option.
    #[must_use]
    pub fn has_auto_increment(&self) -> bool {
        self.attrs
            .iter()
            .any(|a| matches!(a, TableAttr::AutoIncrement(_)))
    }
}

fn table_key(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(s) if !s.is_empty() => format!("{s}.{name}"),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_schema_builder() {
        let table = Table::new("users")
            .column(
                Column::new(
                    "id",
                    ColumnType::Integer {
                        kind: IntegerKind::BigInt,
                        unsigned: true,
                    },
                )
                .not_null(),
            )
            .column(Column::new("name", ColumnType::Varchar(255)))
            .primary_key(Index::primary_key(["id"]));

        assert_eq!(table.columns.len(), 2);
        assert!(!table.get_column("id").unwrap().nullable);
        assert!(table.get_column("name").unwrap().nullable);
        assert_eq!(table.primary_key.as_ref().unwrap().name, "PRIMARY");
    }

    #[test]
    fn test_table_keys() {
        let t = Table::new("users");
        assert_eq!(t.key(), "users");

        let t = Table::new("users").in_schema(Schema::new("app"));
        assert_eq!(t.key(), "app.users");
        assert_eq!(TableRef::new("users").key(Some("app")), "app.users");
        assert_eq!(
            TableRef::qualified("other", "users").key(Some("app")),
            "other.users"
        );
    }

    #[test]
    fn test_self_reference() {
        let t = Table::new("nodes").in_schema(Schema::new("app"));
        let parent =
            ForeignKey::new("parent", "nodes", TableRef::new("nodes")).column("parent_id", "id");
        let other =
            ForeignKey::new("owner", "nodes", TableRef::new("users")).column("owner_id", "id");
        assert!(t.is_self_reference(&parent));
        assert!(!t.is_self_reference(&other));
    }

    #[test]
    fn test_type_classes() {
        assert!(ColumnType::Bool.is_numeric());
        assert!(ColumnType::Bit(Some(8)).is_numeric());
        assert!(!ColumnType::Varchar(10).is_numeric());
        assert!(ColumnType::Timestamp(None).is_time());
        assert!(!ColumnType::Json.is_time());
        assert!(ColumnType::Json.is_json());
    }

    #[test]
    fn test_column_serde() {
        let col = Column::new("status", ColumnType::Varchar(16))
            .not_null()
            .default_literal("active");
        let json = serde_json::to_string(&col).unwrap();
        let back: Column = serde_json::from_str(&json).unwrap();
        assert_eq!(back, col);
    }

    #[test]
    fn test_column_nullable_default_matches_builder() {
        let loaded: Column =
            serde_json::from_str(r#"{ "name": "bio", "type": { "varchar": 64 } }"#).unwrap();
        assert_eq!(loaded, Column::new("bio", ColumnType::Varchar(64)));
        assert!(loaded.nullable);

        let loaded: Column = serde_json::from_str(
            r#"{ "name": "id", "type": "bool", "nullable": false }"#,
        )
        .unwrap();
        assert!(!loaded.nullable);
    }
}
