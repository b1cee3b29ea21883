use gamestat_settings::DatabaseKind;

use super::Dialect;
use crate::statement::{Query, text};

/// Networked server engine. Probes read `information_schema` scoped to the
/// connection's current schema.
#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Mysql
    }

    // No IF NOT EXISTS for CREATE INDEX.
    fn supports_conditional_index_ddl(&self) -> bool {
        false
    }

    fn table_exists_query(&self, table: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
            vec![text(table)],
        )
    }

    fn column_exists_query(&self, table: &str, column: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
            vec![text(table), text(column)],
        )
    }

    fn index_exists_query(&self, table: &str, index: &str) -> Query<bool> {
        Query::exists(
            "SELECT 1 FROM information_schema.STATISTICS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?",
            vec![text(table), text(index)],
        )
    }

    fn rename_table_statement(&self, from: &str, to: &str) -> String {
        format!("RENAME TABLE {from} TO {to}")
    }

    fn id_column(&self) -> &'static str {
        "id INT NOT NULL AUTO_INCREMENT PRIMARY KEY"
    }
}
