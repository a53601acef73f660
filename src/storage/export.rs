//! Row export for pushing tables to the hosted backend

use super::schema::{ClubDatabase, TABLES};
use crate::error::{ClubError, Result};
use rusqlite::types::ValueRef;
use serde_json::{Map, Number, Value};

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b.to_vec()),
    }
}

impl ClubDatabase {
    /// Every row of `table` as a JSON object keyed by column name.
    ///
    /// Only tables listed in [`TABLES`] can be exported.
    pub fn export_table(&self, table: &str) -> Result<Vec<Value>> {
        if !TABLES.iter().any(|(name, _)| *name == table) {
            return Err(ClubError::InvalidValue {
                kind: "table",
                value: table.to_string(),
            });
        }

        let mut stmt = self.conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut exported = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::with_capacity(columns.len());
            for (idx, column) in columns.iter().enumerate() {
                object.insert(column.clone(), to_json(row.get_ref(idx)?));
            }
            exported.push(Value::Object(object));
        }
        Ok(exported)
    }

    /// Row count per exportable table, in push order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, usize)>> {
        let mut counts = Vec::with_capacity(TABLES.len());
        for (table, _) in TABLES {
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
            counts.push((*table, count as usize));
        }
        Ok(counts)
    }
}
