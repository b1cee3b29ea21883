use gamestat_settings::DatabaseKind;

use super::Dialect;
use crate::statement::{Query, text};

/// Embedded single-file engine. Probes read `sqlite_master` and the
/// `pragma_table_info` table-valued function.
#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Sqlite
    }

    fn supports_conditional_index_ddl(&self) -> bool {
        true
    }

    fn table_exists_query(&self, table: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
            vec![text(table)],
        )
    }

    fn column_exists_query(&self, table: &str, column: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM pragma_table_info(?) WHERE name = ? COLLATE NOCASE",
            vec![text(table), text(column)],
        )
    }

    fn index_exists_query(&self, table: &str, index: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM sqlite_master \
             WHERE type = 'index' AND tbl_name = ? COLLATE NOCASE AND name = ? COLLATE NOCASE",
            vec![text(table), text(index)],
        )
    }

    fn rename_table_statement(&self, from: &str, to: &str) -> String {
        format!("ALTER TABLE {from} RENAME TO {to}")
    }

    fn id_column(&self) -> &'static str {
        "id INTEGER PRIMARY KEY AUTOINCREMENT"
    }
}
