//! CQL statement builders for the document-carrier table layout.
//!
//! Tables provisioned by this driver hold schemaless rows as JSON text:
//!
//! ```text
//! (bucket int, seq bigint, doc text, PRIMARY KEY (bucket, seq))
//! ```
//!
//! All rows live in bucket 0, so the `seq` clustering key gives one total,
//! stable order over the table - the driver's documented pagination key. CQL
//! has no OFFSET, which is why reads fetch `offset + limit` rows in
//! clustering order and skip the prefix client-side.

/// Quote a CQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Qualify a table with its keyspace.
pub fn qualify(keyspace: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(keyspace), quote_ident(table))
}

/// Keyspace provisioning. `IF NOT EXISTS` is deliberate here: the keyspace is
/// shared infrastructure, not one of the caller's tables.
pub fn create_keyspace_cql(keyspace: &str) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = \
         {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
        quote_ident(keyspace)
    )
}

/// Table creation, without `IF NOT EXISTS`: the already-exists outcome is
/// classified on the server error instead, so unrelated failures cannot hide
/// behind it.
pub fn create_table_cql(keyspace: &str, table: &str) -> String {
    format!(
        "CREATE TABLE {} (bucket int, seq bigint, doc text, PRIMARY KEY (bucket, seq))",
        qualify(keyspace, table)
    )
}

/// Existence probe against the schema tables.
pub fn table_exists_cql() -> &'static str {
    "SELECT table_name FROM system_schema.tables \
     WHERE keyspace_name = ? AND table_name = ?"
}

/// All tables in the keyspace, in the order the schema tables return them.
pub fn list_tables_cql() -> &'static str {
    "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?"
}

pub fn count_rows_cql(keyspace: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", qualify(keyspace, table))
}

pub fn max_seq_cql(keyspace: &str, table: &str) -> String {
    format!("SELECT MAX(seq) FROM {}", qualify(keyspace, table))
}

/// Page read in clustering order. The bind parameter is the total number of
/// rows to fetch (`offset + limit`).
pub fn select_rows_cql(keyspace: &str, table: &str) -> String {
    format!(
        "SELECT doc FROM {} WHERE bucket = 0 ORDER BY seq ASC LIMIT ?",
        qualify(keyspace, table)
    )
}

pub fn insert_row_cql(keyspace: &str, table: &str) -> String {
    format!(
        "INSERT INTO {} (bucket, seq, doc) VALUES (0, ?, ?)",
        qualify(keyspace, table)
    )
}
