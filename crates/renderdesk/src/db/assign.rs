//! Builder for partial `UPDATE ... SET` statements.

use rusqlite::types::ToSql;
use rusqlite::Connection;

use super::DatabaseError;

/// Collects `column = ?n` assignments and their bound values.
#[derive(Default)]
pub(crate) struct Assignments {
    columns: Vec<String>,
    values: Vec<Box<dyn ToSql>>,
}

impl Assignments {
    pub fn set<T: ToSql + 'static>(&mut self, column: &str, value: T) {
        self.values.push(Box::new(value));
        self.columns
            .push(format!("{} = ?{}", column, self.values.len()));
    }

    pub fn set_opt<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) {
        if let Some(value) = value {
            self.set(column, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Executes `UPDATE <table> SET ... WHERE <keys>`, returning the number
    /// of changed rows. Key columns are bound after the assignments.
    pub fn execute(
        mut self,
        conn: &Connection,
        table: &str,
        keys: &[(&str, &str)],
    ) -> Result<usize, DatabaseError> {
        let mut conditions = Vec::with_capacity(keys.len());
        for (column, value) in keys {
            self.values.push(Box::new(value.to_string()));
            conditions.push(format!("{} = ?{}", column, self.values.len()));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            self.columns.join(", "),
            conditions.join(" AND ")
        );
        let params: Vec<&dyn ToSql> = self.values.iter().map(|v| v.as_ref()).collect();
        Ok(conn.execute(&sql, params.as_slice())?)
    }
}
