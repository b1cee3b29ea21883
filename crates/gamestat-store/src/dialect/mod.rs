//! SQL dialect strategies.
//!
//! Every engine-specific fragment the store needs lives behind [`Dialect`]:
//! catalog probes, table renames, auto-increment ids and index DDL. The
//! strategy is chosen once from [`DatabaseKind`] when the database opens, and
//! everything above it (table creation, patches, cleanup) is written once.

mod h2;
mod mysql;
mod sqlite;

use gamestat_settings::DatabaseKind;

pub use h2::H2Dialect;
pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::statement::Query;

/// Engine-specific SQL fragments and catalog probes.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Which engine this strategy speaks for.
    fn kind(&self) -> DatabaseKind;

    /// Whether `CREATE INDEX IF NOT EXISTS` is understood.
    ///
    /// Dialects returning `false` get a probe-then-create instead.
    fn supports_conditional_index_ddl(&self) -> bool;

    /// Probe returning `true` when `table` exists.
    fn table_exists_query(&self, table: &str) -> Query<bool>;

    /// Probe returning `true` when `table.column` exists.
    fn column_exists_query(&self, table: &str, column: &str) -> Query<bool>;

    /// Probe returning `true` when index `index` exists on `table`.
    fn index_exists_query(&self, table: &str, index: &str) -> Query<bool>;

    /// Statement renaming `from` to `to`.
    fn rename_table_statement(&self, from: &str, to: &str) -> String;

    /// Column definition for an auto-increment integer primary key named `id`.
    fn id_column(&self) -> &'static str;

    /// Statement creating index `index` on `table (columns)`.
    fn create_index_statement(&self, table: &str, index: &str, columns: &[&str]) -> String {
        let conditional = if self.supports_conditional_index_ddl() {
            "IF NOT EXISTS "
        } else {
            ""
        };
        format!(
            "CREATE INDEX {conditional}{index} ON {table} ({})",
            columns.join(", ")
        )
    }

    /// Statement adding a column.
    fn add_column_statement(&self, table: &str, column_definition: &str) -> String {
        format!("ALTER TABLE {table} ADD COLUMN {column_definition}")
    }

    /// Statement dropping `table` if present.
    fn drop_table_statement(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {table}")
    }
}

/// Strategy for `kind`.
pub fn for_kind(kind: DatabaseKind) -> Box<dyn Dialect> {
    match kind {
        DatabaseKind::Sqlite => Box::new(SqliteDialect),
        DatabaseKind::Mysql => Box::new(MySqlDialect),
        DatabaseKind::H2 => Box::new(H2Dialect),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_kind_selects_matching_strategy() {
        for kind in [DatabaseKind::Sqlite, DatabaseKind::Mysql, DatabaseKind::H2] {
            assert_eq!(for_kind(kind).kind(), kind);
        }
    }

    #[test]
    fn index_ddl_is_conditional_only_where_supported() {
        let sqlite = for_kind(DatabaseKind::Sqlite);
        assert_eq!(
            sqlite.create_index_statement("plan_ping", "plan_ping_date_index", &["date"]),
            "CREATE INDEX IF NOT EXISTS plan_ping_date_index ON plan_ping (date)"
        );
        let mysql = for_kind(DatabaseKind::Mysql);
        assert_eq!(
            mysql.create_index_statement("plan_tps", "plan_tps_idx", &["server_uuid", "date"]),
            "CREATE INDEX plan_tps_idx ON plan_tps (server_uuid, date)"
        );
    }

    #[test]
    fn shared_ddl_fragments() {
        for kind in [DatabaseKind::Sqlite, DatabaseKind::Mysql, DatabaseKind::H2] {
            let dialect = for_kind(kind);
            assert_eq!(
                dialect.add_column_statement("plan_tps", "free_disk_space BIGINT"),
                "ALTER TABLE plan_tps ADD COLUMN free_disk_space BIGINT"
            );
            assert_eq!(
                dialect.drop_table_statement("plan_version"),
                "DROP TABLE IF EXISTS plan_version"
            );
            assert!(dialect.id_column().starts_with("id "));
        }
    }
}
