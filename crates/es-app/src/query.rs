//! Query helpers for summarizing collected result tables.

use es_results::SimulationTable;

use crate::error::{AppError, AppResult};

/// Min and max of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

/// Summary of a collected table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub row_count: usize,
    pub columns: Vec<String>,
    /// Ranges of the columns that parse as numbers in every row.
    pub numeric_ranges: Vec<ColumnRange>,
}

/// Get a summary of a result table.
pub fn summarize_table(table: &SimulationTable) -> AppResult<TableSummary> {
    if table.is_empty() {
        return Err(AppError::InvalidInput("No rows in result table".to_string()));
    }

    let numeric_ranges = table
        .headers()
        .iter()
        .filter_map(|name| {
            let values = table.numeric_column(name).ok()?;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(ColumnRange {
                name: name.clone(),
                min,
                max,
            })
        })
        .collect();

    Ok(TableSummary {
        row_count: table.row_count(),
        columns: table.headers().to_vec(),
        numeric_ranges,
    })
}

/// Values of one column as numbers.
pub fn column_values(table: &SimulationTable, column: &str) -> AppResult<Vec<f64>> {
    Ok(table.numeric_column(column)?)
}
