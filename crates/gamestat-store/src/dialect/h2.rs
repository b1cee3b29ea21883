use gamestat_settings::DatabaseKind;

use super::Dialect;
use crate::statement::{Query, text};

/// Embedded server engine. The catalog stores unquoted identifiers in upper
/// case under the `PUBLIC` schema, so probe parameters are upper-cased.
#[derive(Clone, Copy, Debug, Default)]
pub struct H2Dialect;

impl Dialect for H2Dialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::H2
    }

    fn supports_conditional_index_ddl(&self) -> bool {
        true
    }

    fn table_exists_query(&self, table: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = 'PUBLIC' AND TABLE_NAME = ?",
            vec![text(table.to_uppercase())],
        )
    }

    fn column_exists_query(&self, table: &str, column: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = 'PUBLIC' AND TABLE_NAME = ? AND COLUMN_NAME = ?",
            vec![text(table.to_uppercase()), text(column.to_uppercase())],
        )
    }

    fn index_exists_query(&self, table: &str, index: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM INFORMATION_SCHEMA.INDEXES \
             WHERE TABLE_SCHEMA = 'PUBLIC' AND TABLE_NAME = ? AND INDEX_NAME = ?",
            vec![text(table.to_uppercase()), text(index.to_uppercase())],
        )
    }

    fn rename_table_statement(&self, from: &str, to: &str) -> String {
        format!("ALTER TABLE {from} RENAME TO {to}")
    }

    fn id_column(&self) -> &'static str {
        "id INT NOT NULL AUTO_INCREMENT PRIMARY KEY"
    }
}
