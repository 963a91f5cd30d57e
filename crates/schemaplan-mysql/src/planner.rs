//! MySQL migration planner.

use schemaplan_core::order::{detach_cycles, split_top_level};
use schemaplan_core::{
    Builder, Change, Column, ColumnAttr, ForeignKey, IndexAttr, IndexPart, PartTarget, Plan,
    PlanApply, PlanError, PlannedChange, Result, Schema, Table, TableAttr, TableChange,
};
use tracing::{debug, info};

use crate::batch::{skip_auto_changes, split};
use crate::format::{column_default, comment, format_type};
use crate::server::ServerInfo;

/// Identifier quote character.
pub const QUOTE: char = '`';

/// Starts a MySQL statement with `phrase`.
#[must_use]
pub fn build(phrase: &str) -> Builder {
    Builder::build(QUOTE, phrase)
}

/// Plans schema changes for a MySQL or MariaDB server.
///
/// The planner only reads its [`ServerInfo`]; every call to
/// [`PlanApply::plan_changes`] works on its own state, so one planner can
/// serve many threads.
#[derive(Debug, Clone, Default)]
pub struct MysqlPlanner {
    server: ServerInfo,
}

impl MysqlPlanner {
    /// Creates a planner targeting `server`.
    #[must_use]
    pub const fn new(server: ServerInfo) -> Self {
        Self { server }
    }

    /// Returns the target server.
    #[must_use]
    pub const fn server(&self) -> &ServerInfo {
        &self.server
    }
}

impl PlanApply for MysqlPlanner {
    fn plan_changes(&self, name: &str, changes: &[Change]) -> Result<Plan> {
        let mut state = State {
            server: &self.server,
            plan: Plan::new(name),
        };
        state.plan(changes)?;

        let mut plan = state.plan;
        // DDL statements commit implicitly.
        plan.transactional = false;
        plan.recompute_reversible();
        info!(
            name = %plan.name,
            statements = plan.changes.len(),
            reversible = plan.reversible,
            "Planned schema changes"
        );
        Ok(plan)
    }
}

/// State of a single planning call.
struct State<'a> {
    server: &'a ServerInfo,
    plan: Plan,
}

impl State<'_> {
    fn plan(&mut self, changes: &[Change]) -> Result<()> {
        let (top, rest) = split_top_level(changes);
        self.top_level(&top)?;
        for change in detach_cycles(rest)? {
            match change {
                Change::AddTable {
                    table,
                    if_not_exists,
                } => self.add_table(table, if_not_exists)?,
                Change::DropTable { table, if_exists } => self.drop_table(table, if_exists),
                Change::ModifyTable { table, changes } => self.modify_table(&table, &changes)?,
                other => return Err(PlanError::UnsupportedChange(other.kind_name())),
            }
        }
        Ok(())
    }

    fn top_level(&mut self, changes: &[Change]) -> Result<()> {
        for change in changes {
            match change {
                Change::AddSchema {
                    schema,
                    if_not_exists,
                } => {
                    let mut b = build("CREATE DATABASE");
                    if *if_not_exists {
                        b.p("IF NOT EXISTS");
                    }
                    b.ident(&schema.name);
                    schema_attrs(&mut b, schema);
                    let mut reverse = build("DROP DATABASE");
                    reverse.ident(&schema.name);
                    self.append(
                        PlannedChange::new(
                            b.into_string(),
                            format!("add new schema named {:?}", schema.name),
                            change.clone(),
                        )
                        .reverse(reverse.into_string()),
                    );
                }
                Change::DropSchema { schema, if_exists } => {
                    let mut b = build("DROP DATABASE");
                    if *if_exists {
                        b.p("IF EXISTS");
                    }
                    b.ident(&schema.name);
                    self.append(PlannedChange::new(
                        b.into_string(),
                        format!("drop schema named {:?}", schema.name),
                        change.clone(),
                    ));
                }
                other => return Err(PlanError::UnsupportedChange(other.kind_name())),
            }
        }
        Ok(())
    }

    fn add_table(&mut self, table: Table, if_not_exists: bool) -> Result<()> {
        let mut b = build("CREATE TABLE");
        if if_not_exists {
            b.p("IF NOT EXISTS");
        }
        b.table(table.schema_name(), &table.name);

        let mut promoted = None;
        b.wrap(|b| {
            b.map_comma(&table.columns, |c, b| {
                let start = self.column(b, &table, c);
                if promoted.is_none() && !table.has_auto_increment() {
                    promoted = start;
                }
            });
            let mut written = !table.columns.is_empty();
            if let Some(pk) = &table.primary_key {
                if written {
                    b.comma();
                }
                b.p("PRIMARY KEY");
                index_parts(b, &pk.parts);
                index_attrs(b, &pk.attrs);
                written = true;
            }
            if !table.indexes.is_empty() {
                if written {
                    b.comma();
                }
                b.map_comma(&table.indexes, |idx, b| {
                    if idx.unique {
                        b.p("UNIQUE");
                    }
                    b.p("INDEX").ident(&idx.name);
                    index_parts(b, &idx.parts);
                    index_attrs(b, &idx.attrs);
                });
                written = true;
            }
            if !table.foreign_keys.is_empty() {
                if written {
                    b.comma();
                }
                fks(b, &table, &table.foreign_keys);
            }
        });

        // A start value given on a column is a table option in MySQL.
        let mut attrs = table.attrs.clone();
        attrs.extend(promoted);
        table_attr(&mut b, &attrs)?;

        let mut reverse = build("DROP TABLE");
        reverse.table(table.schema_name(), &table.name);
        let comment = format!("create {:?} table", table.name);
        self.append(
            PlannedChange::new(
                b.into_string(),
                comment,
                Change::AddTable {
                    table,
                    if_not_exists,
                },
            )
            .reverse(reverse.into_string()),
        );
        Ok(())
    }

    fn drop_table(&mut self, table: Table, if_exists: bool) {
        let mut b = build("DROP TABLE");
        if if_exists {
            b.p("IF EXISTS");
        }
        b.table(table.schema_name(), &table.name);
        let comment = format!("drop {:?} table", table.name);
        self.append(PlannedChange::new(
            b.into_string(),
            comment,
            Change::DropTable { table, if_exists },
        ));
    }

    fn modify_table(&mut self, table: &Table, changes: &[TableChange]) -> Result<()> {
        for batch in split(skip_auto_changes(changes))? {
            if !batch.is_empty() {
                self.alter_table(table, batch)?;
            }
        }
        Ok(())
    }

    /// Applies `changes` to `table` in one `ALTER TABLE` statement.
    fn alter_table(&mut self, table: &Table, changes: Vec<TableChange>) -> Result<()> {
        let mut b = build("ALTER TABLE");
        b.table(table.schema_name(), &table.name);
        let mut reverse = b.clone();
        let mut undo = Vec::with_capacity(changes.len());
        let mut reversible = true;
        let mut errors = Vec::new();

        b.map_comma(&changes, |change, b| {
            let mut r = Builder::new(QUOTE);
            match change {
                TableChange::AddColumn { column } => {
                    b.p("ADD COLUMN");
                    self.column(b, table, column);
                    r.p("DROP COLUMN").ident(&column.name);
                }
                TableChange::ModifyColumn { from, to, .. } => {
                    b.p("MODIFY COLUMN");
                    self.column(b, table, to);
                    r.p("MODIFY COLUMN");
                    self.column(&mut r, table, from);
                }
                TableChange::DropColumn { column } => {
                    b.p("DROP COLUMN").ident(&column.name);
                    reversible = false;
                }
                TableChange::AddIndex { index } => {
                    b.p("ADD");
                    if index.unique {
                        b.p("UNIQUE");
                    }
                    b.p("INDEX").ident(&index.name);
                    index_parts(b, &index.parts);
                    index_attrs(b, &index.attrs);
                    r.p("DROP INDEX").ident(&index.name);
                }
                TableChange::DropIndex { index } => {
                    b.p("DROP INDEX").ident(&index.name);
                    reversible = false;
                }
                TableChange::AddForeignKey { fk } => {
                    b.p("ADD");
                    fks(b, table, std::slice::from_ref(fk));
                    r.p("DROP FOREIGN KEY").ident(&fk.symbol);
                }
                TableChange::DropForeignKey { fk } => {
                    b.p("DROP FOREIGN KEY").ident(&fk.symbol);
                    reversible = false;
                }
                TableChange::AddAttr { attr } => {
                    if let Err(err) = table_attr(b, std::slice::from_ref(attr)) {
                        errors.push(format!("add attribute: {err}"));
                    }
                    reversible = false;
                }
                TableChange::ModifyAttr { from, to } => {
                    if let Err(err) = table_attr(b, std::slice::from_ref(to)) {
                        errors.push(format!("modify attribute: {err}"));
                    }
                    if let Err(err) = table_attr(&mut r, std::slice::from_ref(from)) {
                        errors.push(format!("reverse modify attribute: {err}"));
                    }
                }
                TableChange::ModifyIndex { .. }
                | TableChange::ModifyForeignKey { .. }
                | TableChange::DropAttr { .. } => {
                    errors.push(format!("unsupported change {}", change.kind_name()));
                }
            }
            undo.push(r.into_string());
        });
        if !errors.is_empty() {
            return Err(PlanError::AlterTable {
                table: table.name.clone(),
                errors,
            });
        }

        let comment = format!("modify {:?} table", table.name);
        let mut planned = PlannedChange::new(
            b.into_string(),
            comment,
            Change::modify_table(table.clone(), changes),
        );
        if reversible {
            // Undo the clauses in the opposite order they were applied.
            undo.reverse();
            reverse.map_comma(&undo, |clause, b| {
                b.p(clause);
            });
            planned = planned.reverse(reverse.into_string());
        }
        self.append(planned);
        Ok(())
    }

    /// Writes a column definition. Returns the auto-increment start value of
    /// the column as a table option, if it has one.
    fn column(&self, b: &mut Builder, table: &Table, c: &Column) -> Option<TableAttr> {
        b.ident(&c.name).p(&format_type(&c.ty));
        if !c.nullable {
            b.p("NOT");
        }
        b.p("NULL");
        if let Some(value) = column_default(c) {
            b.p("DEFAULT").p(&value);
        }
        if c.ty.is_json() && self.server.needs_json_check() && !c.has_check() {
            b.p("CHECK").wrap(|b| {
                b.raw("json_valid(").ident(&c.name).raw(")");
            });
        }
        let mut start = None;
        for attr in &c.attrs {
            match attr {
                ColumnAttr::Collation(collation) => {
                    if self.collation(table) != collation {
                        b.p("COLLATE").p(collation);
                    }
                }
                ColumnAttr::OnUpdate(expr) => {
                    b.p("ON UPDATE").p(expr);
                }
                ColumnAttr::AutoIncrement(value) => {
                    b.p("AUTO_INCREMENT");
                    if let Some(v) = value.filter(|v| *v != 0) {
                        start = Some(TableAttr::AutoIncrement(Some(v)));
                    }
                }
                ColumnAttr::Comment(text) => {
                    b.p("COMMENT").p(&comment(text));
                }
                ColumnAttr::Check(expr) => {
                    b.p("CHECK").wrap(|b| {
                        b.p(expr);
                    });
                }
            }
        }
        start
    }

    /// Returns the effective collation of `table`: its own, its schema's, or
    /// the server default.
    fn collation<'t>(&'t self, table: &'t Table) -> &'t str {
        table
            .collation()
            .or_else(|| table.schema.as_ref().and_then(Schema::collation))
            .unwrap_or(&self.server.collation)
    }

    fn append(&mut self, change: PlannedChange) {
        debug!(
            comment = %change.comment,
            reversible = change.is_reversible(),
            "Planned statement"
        );
        self.plan.push(change);
    }
}

fn schema_attrs(b: &mut Builder, schema: &Schema) {
    if let Some(charset) = schema.charset() {
        b.p("CHARACTER SET").p(charset);
    }
    if let Some(collation) = schema.collation() {
        b.p("COLLATE").p(collation);
    }
}

fn index_parts(b: &mut Builder, parts: &[IndexPart]) {
    b.wrap(|b| {
        b.map_comma(parts, |part, b| {
            match &part.target {
                PartTarget::Column(name) => b.ident(name),
                PartTarget::Expr(expr) => b.p(expr),
            };
            if part.desc {
                b.p("DESC");
            }
        });
    });
}

fn index_attrs(b: &mut Builder, attrs: &[IndexAttr]) {
    for attr in attrs {
        match attr {
            IndexAttr::Comment(text) => {
                b.p("COMMENT").p(&comment(text));
            }
        }
    }
}

/// Writes foreign key definitions. A reference without a schema resolves
/// to the schema of `table`.
fn fks(b: &mut Builder, table: &Table, fks: &[ForeignKey]) {
    b.map_comma(fks, |fk, b| {
        if !fk.symbol.is_empty() {
            b.p("CONSTRAINT").ident(&fk.symbol);
        }
        b.p("FOREIGN KEY").wrap(|b| {
            b.map_comma(&fk.columns, |c, b| {
                b.ident(c);
            });
        });
        let schema = fk.ref_table.schema.as_deref().or(table.schema_name());
        b.p("REFERENCES").table(schema, &fk.ref_table.name);
        b.wrap(|b| {
            b.map_comma(&fk.ref_columns, |c, b| {
                b.ident(c);
            });
        });
        if let Some(action) = fk.on_update {
            b.p("ON UPDATE").p(action.to_sql());
        }
        if let Some(action) = fk.on_delete {
            b.p("ON DELETE").p(action.to_sql());
        }
    });
}

/// Writes table options.
fn table_attr(b: &mut Builder, attrs: &[TableAttr]) -> Result<()> {
    for attr in attrs {
        match attr {
            TableAttr::AutoIncrement(value) => match value.filter(|v| *v != 0) {
                Some(v) => {
                    b.p("AUTO_INCREMENT").p(&v.to_string());
                }
                None => return Err(PlanError::MissingAttrValue("AUTO_INCREMENT")),
            },
            TableAttr::Charset(charset) => {
                b.p("CHARACTER SET").p(charset);
            }
            TableAttr::Collation(collation) => {
                b.p("COLLATE").p(collation);
            }
            TableAttr::Comment(text) => {
                b.p("COMMENT").p(&comment(text));
            }
        }
    }
    Ok(())
}
