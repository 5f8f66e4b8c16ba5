use serde_json::{Map, Value};

use super::error::FilterError;

/// Rendered SQL with its positional parameters ($1, $2, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

/// Conjunction of exact-match equality conditions over text columns.
///
/// Every lookup the warehouse performs has this shape, e.g.
/// `code = 'ST-1' AND location_code = 'LOC-1'`. The same filter is rendered to
/// SQL for the Postgres store and evaluated against JSON rows for the
/// in-memory store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value` to the conjunction
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    /// Check every referenced column against the table's declared columns
    pub fn validate(&self, table_name: &str, columns: &[&str]) -> Result<(), FilterError> {
        if !Self::is_identifier(table_name) {
            return Err(FilterError::InvalidTableName(table_name.to_string()));
        }

        for (column, _) in &self.conditions {
            if !Self::is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.clone()));
            }
            if !columns.contains(&column.as_str()) {
                return Err(FilterError::UnknownColumn {
                    table: table_name.to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn to_sql(&self, table_name: &str, columns: &[&str]) -> Result<SqlResult, FilterError> {
        self.validate(table_name, columns)?;

        let where_clause = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("\"{}\" = ${}", column, i + 1))
            .collect::<Vec<_>>()
            .join(" AND ");

        let query = if where_clause.is_empty() {
            format!("SELECT * FROM \"{}\"", table_name)
        } else {
            format!("SELECT * FROM \"{}\" WHERE {}", table_name, where_clause)
        };

        let params = self.conditions.iter().map(|(_, value)| value.clone()).collect();
        Ok(SqlResult { query, params })
    }

    /// Evaluate against a serialized row; a missing or non-string field never matches
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            matches!(row.get(column), Some(Value::String(actual)) if actual == expected)
        })
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}
