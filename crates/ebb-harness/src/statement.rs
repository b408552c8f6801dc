//! Typed SQL statement rendering.
//!
//! Every statement the harness submits is rendered here, against the
//! `Value` literal rules from `ebb-common`. Nothing else in the workspace
//! formats SQL text, so the type-to-literal boundary lives in exactly one
//! place.

use ebb_common::{SchemaDescriptor, Value};
use ebb_datagen::Row;

fn render_columns(schema: &SchemaDescriptor) -> String {
    schema
        .data_columns
        .iter()
        .map(|c| c.render())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_tags(schema: &SchemaDescriptor) -> String {
    schema
        .tag_columns
        .iter()
        .map(|c| c.render())
        .collect::<Vec<_>>()
        .join(", ")
}

fn ttl_clause(ttl: Option<u32>) -> String {
    match ttl {
        Some(ttl) => format!(" TTL {ttl}"),
        None => String::new(),
    }
}

/// `CREATE DATABASE <db> [TTL <n>]`.
#[must_use]
pub fn create_database(db: &str, ttl: Option<u32>) -> String {
    format!("CREATE DATABASE {db}{}", ttl_clause(ttl))
}

/// `DROP DATABASE <db>`.
#[must_use]
pub fn drop_database(db: &str) -> String {
    format!("DROP DATABASE {db}")
}

/// `FLUSH DATABASE <db>` — persists WAL-pending writes.
#[must_use]
pub fn flush_database(db: &str) -> String {
    format!("FLUSH DATABASE {db}")
}

/// `CREATE TABLE <db>.<name> (<data columns>) TAGS (<tag columns>)`.
#[must_use]
pub fn create_super_table(db: &str, name: &str, schema: &SchemaDescriptor) -> String {
    format!(
        "CREATE TABLE {db}.{name} ({}) TAGS ({})",
        render_columns(schema),
        render_tags(schema)
    )
}

/// `CREATE TABLE <db>.<name> (<data columns>) [TTL <n>]`.
#[must_use]
pub fn create_normal_table(
    db: &str,
    name: &str,
    schema: &SchemaDescriptor,
    ttl: Option<u32>,
) -> String {
    format!(
        "CREATE TABLE {db}.{name} ({}){}",
        render_columns(schema),
        ttl_clause(ttl)
    )
}

/// `CREATE TABLE <db>.<name> USING <db>.<super> TAGS (<values>) [TTL <n>]`.
#[must_use]
pub fn create_child_table(
    db: &str,
    name: &str,
    super_name: &str,
    tags: &[Value],
    ttl: Option<u32>,
) -> String {
    let tag_values = tags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE {db}.{name} USING {db}.{super_name} TAGS ({tag_values}){}",
        ttl_clause(ttl)
    )
}

/// `ALTER TABLE <db>.<table> TTL <n>`.
#[must_use]
pub fn alter_table_ttl(db: &str, table: &str, ttl: u32) -> String {
    format!("ALTER TABLE {db}.{table} TTL {ttl}")
}

/// `INSERT INTO <db>.<table> VALUES (<ts>, <payload>)` for one row.
#[must_use]
pub fn insert_row(db: &str, table: &str, ts: i64, row: &Row) -> String {
    format!("INSERT INTO {db}.{table} VALUES ({ts}, {})", row.render())
}

/// `SELECT COUNT(*) FROM <db>.<table>`.
#[must_use]
pub fn count_rows(db: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {db}.{table}")
}

/// `SHOW TABLES FROM <db>` — lists child and normal tables.
#[must_use]
pub fn show_tables(db: &str) -> String {
    format!("SHOW TABLES FROM {db}")
}

/// `SHOW STABLES FROM <db>` — lists super tables.
#[must_use]
pub fn show_stables(db: &str) -> String {
    format!("SHOW STABLES FROM {db}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_database_with_and_without_ttl() {
        assert_eq!(create_database("db1", Some(1)), "CREATE DATABASE db1 TTL 1");
        assert_eq!(create_database("db1", None), "CREATE DATABASE db1");
    }

    #[test]
    fn test_super_table_ddl_shape() {
        let schema = SchemaDescriptor::wide();
        let sql = create_super_table("db", "stb1", &schema);
        assert!(sql.starts_with("CREATE TABLE db.stb1 (ts TIMESTAMP, c_int INT,"));
        assert!(sql.contains("c_utint TINYINT UNSIGNED"));
        assert!(sql.ends_with("TAGS (t_int INT)"));
    }

    #[test]
    fn test_child_table_ddl_shape() {
        let sql = create_child_table("db", "ct7", "stb1", &[Value::Int(7)], None);
        assert_eq!(sql, "CREATE TABLE db.ct7 USING db.stb1 TAGS (7)");

        let sql = create_child_table("db", "ct7", "stb1", &[Value::Int(7)], Some(3));
        assert_eq!(sql, "CREATE TABLE db.ct7 USING db.stb1 TAGS (7) TTL 3");
    }

    #[test]
    fn test_normal_table_ttl_override() {
        let schema = SchemaDescriptor::wide();
        let sql = create_normal_table("db", "nt1", &schema, Some(0));
        assert!(sql.ends_with(" TTL 0"));
        assert!(!sql.contains("TAGS"));
    }

    #[test]
    fn test_text_tag_values_are_quoted() {
        let sql = create_child_table(
            "db",
            "ct1",
            "stb1",
            &[Value::Int(1), Value::Binary("site'a".to_string())],
            None,
        );
        assert!(sql.contains("TAGS (1, 'site''a')"));
    }
}
