//! In-memory mock EbbDB engine.
//!
//! [`MockEbb`] implements `SqlExecutor` over the narrow statement dialect
//! the harness renders, keeps a catalog of databases and tables behind a
//! `parking_lot::RwLock`, and applies the documented retention contract:
//! a non-super table is removed once simulated time passes
//! `max(created, last flushed write) + effective TTL`, unless it still
//! has WAL-pending writes. The sweep runs lazily at observation points
//! (`SHOW`, `SELECT`), which is indistinguishable from a background sweep
//! to a polling observer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use ebb_common::constants::TTL_UNIT_MS;
use ebb_common::{Clock, ExecResult, ExecutionError, QueryResult, SqlExecutor, TableClass, Value};

#[derive(Debug, Clone)]
struct MockTable {
    class: TableClass,
    ttl: Option<u32>,
    created_ms: i64,
    /// Data columns declared (children inherit the super's count).
    col_count: usize,
    /// Tag columns declared; meaningful for supers only.
    tag_count: usize,
    /// Primary timestamps of inserted rows.
    rows: Vec<i64>,
    last_write_ms: Option<i64>,
    flushed_write_ms: Option<i64>,
    wal_pending: bool,
}

impl MockTable {
    fn new(class: TableClass, ttl: Option<u32>, created_ms: i64, col_count: usize) -> Self {
        Self {
            class,
            ttl,
            created_ms,
            col_count,
            tag_count: 0,
            rows: Vec::new(),
            last_write_ms: None,
            flushed_write_ms: None,
            wal_pending: false,
        }
    }

    /// Purge anchor: creation time, moved forward by flushed writes only.
    fn anchor_ms(&self) -> i64 {
        self.flushed_write_ms.map_or(self.created_ms, |w| w.max(self.created_ms))
    }
}

#[derive(Debug, Default)]
struct MockDatabase {
    default_ttl: u32,
    tables: BTreeMap<String, MockTable>,
}

impl MockDatabase {
    /// Removes expired tables per the retention contract.
    fn sweep(&mut self, now: i64) -> Vec<String> {
        let expired: Vec<String> = self
            .tables
            .iter()
            .filter(|(_, t)| {
                if t.class == TableClass::Super || t.wal_pending {
                    return false;
                }
                let ttl = t.ttl.unwrap_or(self.default_ttl);
                ttl > 0 && now >= t.anchor_ms() + i64::from(ttl) * TTL_UNIT_MS
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in &expired {
            self.tables.remove(name);
        }
        expired
    }

    fn flush(&mut self) {
        for table in self.tables.values_mut() {
            table.wal_pending = false;
            if let Some(w) = table.last_write_ms {
                table.flushed_write_ms = Some(w);
            }
        }
    }
}

/// Mock engine holding its whole catalog in memory.
pub struct MockEbb {
    clock: Arc<dyn Clock>,
    catalog: RwLock<HashMap<String, MockDatabase>>,
    statements: AtomicU64,
}

impl MockEbb {
    /// Creates an engine ticking on `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            catalog: RwLock::new(HashMap::new()),
            statements: AtomicU64::new(0),
        }
    }

    /// Total statements accepted so far.
    #[must_use]
    pub fn statements_executed(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    /// Flushes WAL-pending writes in every database, as a full-cluster
    /// restart would.
    pub fn flush_all(&self) {
        let mut catalog = self.catalog.write();
        for db in catalog.values_mut() {
            db.flush();
        }
    }

    fn err(sql: &str, message: impl Into<String>) -> ExecutionError {
        ExecutionError::new(sql, message)
    }

    fn create_database(&self, sql: &str, name: &str, ttl: u32) -> ExecResult {
        let mut catalog = self.catalog.write();
        if catalog.contains_key(name) {
            return Err(Self::err(sql, format!("database '{name}' already exists")));
        }
        debug!(database = name, ttl, "create database");
        catalog.insert(
            name.to_string(),
            MockDatabase { default_ttl: ttl, ..MockDatabase::default() },
        );
        Ok(QueryResult::affected(0))
    }

    fn drop_database(&self, sql: &str, name: &str) -> ExecResult {
        let mut catalog = self.catalog.write();
        if catalog.remove(name).is_none() {
            return Err(Self::err(sql, format!("database '{name}' not found")));
        }
        Ok(QueryResult::affected(0))
    }

    fn flush_database(&self, sql: &str, name: &str) -> ExecResult {
        let mut catalog = self.catalog.write();
        let db = catalog
            .get_mut(name)
            .ok_or_else(|| Self::err(sql, format!("database '{name}' not found")))?;
        db.flush();
        Ok(QueryResult::affected(0))
    }

    fn create_table(
        &self,
        sql: &str,
        db_name: &str,
        table: &str,
        spec: TableSpec,
    ) -> ExecResult {
        let now = self.clock.now_ms();
        let mut catalog = self.catalog.write();
        let db = catalog
            .get_mut(db_name)
            .ok_or_else(|| Self::err(sql, format!("database '{db_name}' not found")))?;
        if db.tables.contains_key(table) {
            return Err(Self::err(sql, format!("table '{table}' already exists")));
        }
        let entry = match spec {
            TableSpec::Plain { col_names, tag_count, ttl } => {
                check_columns(sql, &col_names)?;
                let class = if tag_count > 0 { TableClass::Super } else { TableClass::Normal };
                let mut t = MockTable::new(class, ttl, now, col_names.len());
                t.tag_count = tag_count;
                t
            }
            TableSpec::Child { super_name, tag_values, ttl } => {
                let parent = db.tables.get(&super_name).ok_or_else(|| {
                    Self::err(sql, format!("super table '{super_name}' not found"))
                })?;
                if parent.class != TableClass::Super {
                    return Err(Self::err(sql, format!("'{super_name}' is not a super table")));
                }
                if tag_values != parent.tag_count {
                    return Err(Self::err(
                        sql,
                        format!(
                            "tag value count {tag_values} does not match tag schema of '{super_name}' ({})",
                            parent.tag_count
                        ),
                    ));
                }
                let mut t = MockTable::new(TableClass::Child, ttl, now, parent.col_count);
                t.col_count = parent.col_count;
                t
            }
        };
        trace!(database = db_name, table, class = %entry.class, "create table");
        db.tables.insert(table.to_string(), entry);
        Ok(QueryResult::affected(0))
    }

    fn alter_ttl(&self, sql: &str, db_name: &str, table: &str, ttl: u32) -> ExecResult {
        let mut catalog = self.catalog.write();
        let db = catalog
            .get_mut(db_name)
            .ok_or_else(|| Self::err(sql, format!("database '{db_name}' not found")))?;
        let entry = db
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::err(sql, format!("table '{table}' not found")))?;
        // Re-arms the policy in place; never drops at alter time.
        entry.ttl = Some(ttl);
        Ok(QueryResult::affected(0))
    }

    fn insert(&self, sql: &str, db_name: &str, table: &str, ts: i64, values: usize) -> ExecResult {
        let now = self.clock.now_ms();
        let mut catalog = self.catalog.write();
        let db = catalog
            .get_mut(db_name)
            .ok_or_else(|| Self::err(sql, format!("database '{db_name}' not found")))?;
        let entry = db
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::err(sql, format!("table '{table}' not found")))?;
        if entry.class == TableClass::Super {
            return Err(Self::err(sql, "cannot insert into a super table"));
        }
        if values != entry.col_count {
            return Err(Self::err(
                sql,
                format!("value count {values} does not match {} columns", entry.col_count),
            ));
        }
        entry.rows.push(ts);
        entry.last_write_ms = Some(now);
        entry.wal_pending = true;
        Ok(QueryResult::affected(1))
    }

    fn count(&self, sql: &str, db_name: &str, table: &str) -> ExecResult {
        let now = self.clock.now_ms();
        let mut catalog = self.catalog.write();
        let db = catalog
            .get_mut(db_name)
            .ok_or_else(|| Self::err(sql, format!("database '{db_name}' not found")))?;
        db.sweep(now);
        let entry = db
            .tables
            .get(table)
            .ok_or_else(|| Self::err(sql, format!("table '{table}' not found")))?;
        Ok(QueryResult::scalar("count(*)", Value::BigInt(entry.rows.len() as i64)))
    }

    fn show(&self, sql: &str, db_name: &str, supers: bool) -> ExecResult {
        let now = self.clock.now_ms();
        let mut catalog = self.catalog.write();
        let db = catalog
            .get_mut(db_name)
            .ok_or_else(|| Self::err(sql, format!("database '{db_name}' not found")))?;
        let expired = db.sweep(now);
        if !expired.is_empty() {
            debug!(database = db_name, ?expired, "ttl sweep removed tables");
        }
        let names: Vec<String> = db
            .tables
            .iter()
            .filter(|(_, t)| (t.class == TableClass::Super) == supers)
            .map(|(name, _)| name.clone())
            .collect();
        Ok(QueryResult::names(if supers { "stable_name" } else { "table_name" }, names))
    }
}

impl SqlExecutor for MockEbb {
    fn execute(&self, statement: &str) -> ExecResult {
        self.statements.fetch_add(1, Ordering::Relaxed);
        let sql = statement.trim();
        let words: Vec<&str> = sql.split_whitespace().collect();
        let head = |i: usize| words.get(i).map(|w| w.to_ascii_uppercase());

        match (head(0).as_deref(), head(1).as_deref()) {
            (Some("CREATE"), Some("DATABASE")) => {
                let name = expect_word(sql, &words, 2)?;
                let ttl = match head(3).as_deref() {
                    Some("TTL") => parse_u32(sql, expect_word(sql, &words, 4)?)?,
                    Some(other) => {
                        return Err(Self::err(sql, format!("unexpected token '{other}'")))
                    }
                    None => 0,
                };
                self.create_database(sql, name, ttl)
            }
            (Some("DROP"), Some("DATABASE")) => {
                self.drop_database(sql, expect_word(sql, &words, 2)?)
            }
            (Some("FLUSH"), Some("DATABASE")) => {
                self.flush_database(sql, expect_word(sql, &words, 2)?)
            }
            (Some("CREATE"), Some("TABLE")) => {
                let name = expect_word(sql, &words, 2)?;
                let (db_name, table) = split_qualified(sql, name)?;
                let spec = parse_table_spec(sql, &words)?;
                self.create_table(sql, db_name, table, spec)
            }
            (Some("ALTER"), Some("TABLE")) => {
                let name = expect_word(sql, &words, 2)?;
                let (db_name, table) = split_qualified(sql, name)?;
                if head(3).as_deref() != Some("TTL") {
                    return Err(Self::err(sql, "expected TTL clause"));
                }
                let ttl = parse_u32(sql, expect_word(sql, &words, 4)?)?;
                self.alter_ttl(sql, db_name, table, ttl)
            }
            (Some("INSERT"), Some("INTO")) => {
                let name = expect_word(sql, &words, 2)?;
                let (db_name, table) = split_qualified(sql, name)?;
                let values = paren_group(sql)?;
                let parts = split_top_level(&values);
                let first = parts
                    .first()
                    .ok_or_else(|| Self::err(sql, "empty VALUES list"))?;
                let ts: i64 = first
                    .trim()
                    .parse()
                    .map_err(|_| Self::err(sql, "primary timestamp is not an integer"))?;
                self.insert(sql, db_name, table, ts, parts.len())
            }
            (Some("SELECT"), _) => {
                let from = words
                    .iter()
                    .position(|w| w.eq_ignore_ascii_case("FROM"))
                    .ok_or_else(|| Self::err(sql, "missing FROM"))?;
                let name = expect_word(sql, &words, from + 1)?;
                let (db_name, table) = split_qualified(sql, name)?;
                self.count(sql, db_name, table)
            }
            (Some("SHOW"), Some("TABLES")) => {
                let db_name = expect_word(sql, &words, 3)?;
                self.show(sql, db_name, false)
            }
            (Some("SHOW"), Some("STABLES")) => {
                let db_name = expect_word(sql, &words, 3)?;
                self.show(sql, db_name, true)
            }
            _ => Err(Self::err(sql, "unrecognized statement")),
        }
    }
}

/// Parsed CREATE TABLE shape.
enum TableSpec {
    Plain {
        col_names: Vec<String>,
        tag_count: usize,
        ttl: Option<u32>,
    },
    Child {
        super_name: String,
        tag_values: usize,
        ttl: Option<u32>,
    },
}

fn parse_table_spec(sql: &str, words: &[&str]) -> Result<TableSpec, ExecutionError> {
    let ttl = trailing_ttl(sql, words)?;
    if words.iter().any(|w| w.eq_ignore_ascii_case("USING")) {
        let using = words
            .iter()
            .position(|w| w.eq_ignore_ascii_case("USING"))
            .unwrap_or_default();
        let qualified = expect_word(sql, words, using + 1)?;
        let (_, super_name) = split_qualified(sql, qualified)?;
        let tags = paren_group(sql)?;
        let tag_values = if tags.trim().is_empty() { 0 } else { split_top_level(&tags).len() };
        return Ok(TableSpec::Child {
            super_name: super_name.to_string(),
            tag_values,
            ttl,
        });
    }

    let cols = paren_group(sql)?;
    let col_names: Vec<String> = split_top_level(&cols)
        .iter()
        .filter_map(|c| c.split_whitespace().next())
        .map(str::to_string)
        .collect();
    let tag_count = match sql.to_ascii_uppercase().find(" TAGS") {
        Some(offset) => {
            let tags = paren_group(&sql[offset..])?;
            split_top_level(&tags).len()
        }
        None => 0,
    };
    Ok(TableSpec::Plain { col_names, tag_count, ttl })
}

fn check_columns(sql: &str, col_names: &[String]) -> Result<(), ExecutionError> {
    if col_names.is_empty() {
        return Err(ExecutionError::new(sql, "table declares zero columns"));
    }
    let mut seen = HashSet::new();
    for name in col_names {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(ExecutionError::new(sql, format!("duplicate column '{name}'")));
        }
    }
    Ok(())
}

fn expect_word<'s>(sql: &str, words: &[&'s str], index: usize) -> Result<&'s str, ExecutionError> {
    words
        .get(index)
        .copied()
        .ok_or_else(|| ExecutionError::new(sql, "truncated statement"))
}

fn split_qualified<'s>(sql: &str, name: &'s str) -> Result<(&'s str, &'s str), ExecutionError> {
    name.split_once('.')
        .ok_or_else(|| ExecutionError::new(sql, format!("'{name}' is not database-qualified")))
}

fn parse_u32(sql: &str, word: &str) -> Result<u32, ExecutionError> {
    word.parse()
        .map_err(|_| ExecutionError::new(sql, format!("'{word}' is not a valid TTL")))
}

/// TTL clause at the very end of a statement, if present.
fn trailing_ttl(sql: &str, words: &[&str]) -> Result<Option<u32>, ExecutionError> {
    let len = words.len();
    if len >= 2 && words[len - 2].eq_ignore_ascii_case("TTL") {
        return Ok(Some(parse_u32(sql, words[len - 1])?));
    }
    Ok(None)
}

/// Contents of the first top-level parenthesized group in `sql`.
fn paren_group(sql: &str) -> Result<String, ExecutionError> {
    let open = sql
        .find('(')
        .ok_or_else(|| ExecutionError::new(sql, "expected parenthesized list"))?;
    let mut depth = 0usize;
    let mut in_text = false;
    for (i, c) in sql[open..].char_indices() {
        match c {
            '\'' => in_text = !in_text,
            '(' if !in_text => depth += 1,
            ')' if !in_text => {
                depth -= 1;
                if depth == 0 {
                    return Ok(sql[open + 1..open + i].to_string());
                }
            }
            _ => {}
        }
    }
    Err(ExecutionError::new(sql, "unbalanced parentheses"))
}

/// Splits on commas outside nested parentheses and quoted text.
fn split_top_level(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_text = false;
    for c in list.chars() {
        match c {
            '\'' => {
                in_text = !in_text;
                current.push(c);
            }
            '(' if !in_text => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_text => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 && !in_text => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::time::Duration;

    fn engine() -> (Arc<MockClock>, MockEbb) {
        let clock = Arc::new(MockClock::default());
        let engine = MockEbb::new(clock.clone());
        (clock, engine)
    }

    fn wide_ddl(table: &str) -> String {
        format!(
            "CREATE TABLE db.{table} (ts TIMESTAMP, c_int INT, c_binary BINARY(16))"
        )
    }

    #[test]
    fn test_duplicate_database_rejected() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db TTL 1").unwrap();
        assert!(engine.execute("CREATE DATABASE db").is_err());
    }

    #[test]
    fn test_duplicate_table_rejected_no_upsert() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        engine.execute(&wide_ddl("nt1")).unwrap();
        assert!(engine.execute(&wide_ddl("nt1")).is_err());
    }

    #[test]
    fn test_zero_and_duplicate_columns_rejected() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        assert!(engine.execute("CREATE TABLE db.bad ()").is_err());
        assert!(engine
            .execute("CREATE TABLE db.bad (ts TIMESTAMP, ts TIMESTAMP)")
            .is_err());
    }

    #[test]
    fn test_child_tag_arity_checked() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        engine
            .execute("CREATE TABLE db.stb1 (ts TIMESTAMP, c_int INT) TAGS (t_int INT)")
            .unwrap();
        assert!(engine
            .execute("CREATE TABLE db.ct1 USING db.stb1 TAGS (1, 2)")
            .is_err());
        engine.execute("CREATE TABLE db.ct1 USING db.stb1 TAGS (1)").unwrap();
    }

    #[test]
    fn test_insert_and_count() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        engine.execute(&wide_ddl("nt1")).unwrap();
        engine
            .execute("INSERT INTO db.nt1 VALUES (1704067200000, 5, 'a, b')")
            .unwrap();
        let count = engine.execute("SELECT COUNT(*) FROM db.nt1").unwrap();
        assert_eq!(count.scalar_i64(), Some(1));
        // Quoted comma must not inflate the value count.
        assert!(engine
            .execute("INSERT INTO db.nt1 VALUES (1704067200001, 5)")
            .is_err());
    }

    #[test]
    fn test_insert_into_super_rejected() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        engine
            .execute("CREATE TABLE db.stb1 (ts TIMESTAMP, c_int INT) TAGS (t_int INT)")
            .unwrap();
        assert!(engine.execute("INSERT INTO db.stb1 VALUES (1, 2)").is_err());
    }

    #[test]
    fn test_empty_table_purged_after_ttl_super_survives() {
        let (clock, engine) = engine();
        engine.execute("CREATE DATABASE db TTL 1").unwrap();
        engine
            .execute("CREATE TABLE db.stb1 (ts TIMESTAMP, c_int INT) TAGS (t_int INT)")
            .unwrap();
        engine.execute("CREATE TABLE db.ct1 USING db.stb1 TAGS (1)").unwrap();

        clock.advance(Duration::from_millis(1_500));
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert!(tables.name_list().is_empty());
        let stables = engine.execute("SHOW STABLES FROM db").unwrap();
        assert_eq!(stables.name_list(), vec!["stb1"]);
    }

    #[test]
    fn test_wal_pending_blocks_purge_until_flush() {
        let (clock, engine) = engine();
        engine.execute("CREATE DATABASE db TTL 1").unwrap();
        engine.execute(&wide_ddl("nt1")).unwrap();
        engine
            .execute("INSERT INTO db.nt1 VALUES (1704067200000, 1, 'x')")
            .unwrap();

        clock.advance(Duration::from_secs(10));
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert_eq!(tables.name_list(), vec!["nt1"]);

        engine.execute("FLUSH DATABASE db").unwrap();
        clock.advance(Duration::from_millis(1_500));
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert!(tables.name_list().is_empty());
    }

    #[test]
    fn test_table_ttl_zero_overrides_database_default() {
        let (clock, engine) = engine();
        engine.execute("CREATE DATABASE db TTL 1").unwrap();
        engine.execute(&format!("{} TTL 0", wide_ddl("nt1"))).unwrap();
        engine.execute(&wide_ddl("nt2")).unwrap();

        clock.advance(Duration::from_secs(5));
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert_eq!(tables.name_list(), vec!["nt1"]);
    }

    #[test]
    fn test_alter_ttl_rearms_without_dropping() {
        let (clock, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        engine.execute(&wide_ddl("nt1")).unwrap();

        // No TTL yet, so a long wait changes nothing.
        clock.advance(Duration::from_secs(60));
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert_eq!(tables.name_list(), vec!["nt1"]);

        engine.execute("ALTER TABLE db.nt1 TTL 120").unwrap();
        // Present immediately after the alter; the anchor is unchanged,
        // so expiry lands at creation + 120 s.
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert_eq!(tables.name_list(), vec!["nt1"]);

        clock.advance(Duration::from_secs(61));
        let tables = engine.execute("SHOW TABLES FROM db").unwrap();
        assert!(tables.name_list().is_empty());
    }

    #[test]
    fn test_drop_database_discards_namespace() {
        let (_, engine) = engine();
        engine.execute("CREATE DATABASE db").unwrap();
        engine.execute("DROP DATABASE db").unwrap();
        assert!(engine.execute("SHOW TABLES FROM db").is_err());
        // The name is reusable afterwards.
        engine.execute("CREATE DATABASE db").unwrap();
    }
}
