//! Schema building.
//!
//! [`SchemaBuilder`] issues the DDL for one scenario database: the
//! database itself, super tables with their tag schemas, deterministic
//! runs of child tables bound via tag values, and independent normal
//! tables. Table names within a database are unique by construction and
//! re-creation is never papered over: a duplicate-name refusal from the
//! engine surfaces as a DDL error.

use tracing::debug;

use ebb_common::constants::{CHILD_PREFIX, NORMAL_PREFIX};
use ebb_common::{SchemaDescriptor, SqlExecutor, Value};

use crate::error::{HarnessError, HarnessResult};
use crate::statement;

/// Issues DDL against one database through the SQL collaborator.
pub struct SchemaBuilder<'a> {
    executor: &'a dyn SqlExecutor,
    database: &'a str,
}

impl<'a> SchemaBuilder<'a> {
    /// Binds a builder to an executor and database name.
    #[must_use]
    pub fn new(executor: &'a dyn SqlExecutor, database: &'a str) -> Self {
        Self { executor, database }
    }

    fn ddl(&self, object: &str, sql: &str) -> HarnessResult<()> {
        debug!(object, sql, "issuing DDL");
        self.executor
            .execute(sql)
            .map_err(|source| HarnessError::Ddl { object: object.to_string(), source })?;
        Ok(())
    }

    /// Creates the database, with an optional database-level TTL default.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Ddl`] when the database already exists or the
    /// engine refuses the statement.
    pub fn create_database(&self, ttl: Option<u32>) -> HarnessResult<()> {
        self.ddl(
            self.database,
            &statement::create_database(self.database, ttl),
        )
    }

    /// Drops the database.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Ddl`] when the engine refuses the statement.
    pub fn drop_database(&self) -> HarnessResult<()> {
        self.ddl(self.database, &statement::drop_database(self.database))
    }

    /// Creates a super table from a schema with tag columns.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Schema`] when the schema is invalid or has no
    /// tags; [`HarnessError::Ddl`] when the engine refuses the DDL.
    pub fn create_super_table(
        &self,
        name: &str,
        schema: &SchemaDescriptor,
    ) -> HarnessResult<()> {
        schema.validate_for_super()?;
        let object = format!("{}.{name}", self.database);
        self.ddl(&object, &statement::create_super_table(self.database, name, schema))
    }

    /// Creates `count` child tables under `super_name`, named
    /// `ct1..ctN`, each bound via `tag_fn(1-based index)`.
    ///
    /// Tag value arity and kinds are checked against the super schema
    /// before any statement is issued for that child.
    ///
    /// # Errors
    ///
    /// [`HarnessError::TagMismatch`] on arity or kind mismatch,
    /// [`HarnessError::Ddl`] on engine refusal. Returns the created
    /// table names on success.
    pub fn create_child_tables(
        &self,
        super_name: &str,
        schema: &SchemaDescriptor,
        count: usize,
        tag_fn: impl Fn(usize) -> Vec<Value>,
        ttl: Option<u32>,
    ) -> HarnessResult<Vec<String>> {
        let mut names = Vec::with_capacity(count);
        for i in 1..=count {
            let name = format!("{CHILD_PREFIX}{i}");
            let tags = tag_fn(i);
            self.check_tags(&name, schema, &tags)?;
            let object = format!("{}.{name}", self.database);
            self.ddl(
                &object,
                &statement::create_child_table(self.database, &name, super_name, &tags, ttl),
            )?;
            names.push(name);
        }
        Ok(names)
    }

    /// Creates `count` independent normal tables named `nt1..ntN`.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Schema`] when the schema is invalid,
    /// [`HarnessError::Ddl`] on engine refusal. Returns the created
    /// table names on success.
    pub fn create_normal_tables(
        &self,
        count: usize,
        schema: &SchemaDescriptor,
        ttl: Option<u32>,
    ) -> HarnessResult<Vec<String>> {
        schema.validate()?;
        let mut names = Vec::with_capacity(count);
        for i in 1..=count {
            let name = format!("{NORMAL_PREFIX}{i}");
            let object = format!("{}.{name}", self.database);
            self.ddl(
                &object,
                &statement::create_normal_table(self.database, &name, schema, ttl),
            )?;
            names.push(name);
        }
        Ok(names)
    }

    /// Re-arms a table's TTL in place.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Ddl`] when the table does not exist.
    pub fn alter_table_ttl(&self, table: &str, ttl: u32) -> HarnessResult<()> {
        let object = format!("{}.{table}", self.database);
        self.ddl(&object, &statement::alter_table_ttl(self.database, table, ttl))
    }

    fn check_tags(
        &self,
        table: &str,
        schema: &SchemaDescriptor,
        tags: &[Value],
    ) -> HarnessResult<()> {
        let arity_ok = tags.len() == schema.tag_columns.len();
        let kinds_ok = arity_ok
            && tags
                .iter()
                .zip(&schema.tag_columns)
                .all(|(value, col)| value.matches(&col.ty));
        if arity_ok && kinds_ok {
            return Ok(());
        }
        Err(HarnessError::TagMismatch {
            table: table.to_string(),
            expected: schema
                .tag_columns
                .iter()
                .map(|c| c.render())
                .collect::<Vec<_>>()
                .join(", "),
            actual: tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
