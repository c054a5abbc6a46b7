//! es-results: parsed quicksolver result tables.

pub mod naming;
pub mod table;

pub use naming::result_file_name;
pub use table::SimulationTable;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Result file has no header row")]
    MissingHeader,

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Non-numeric cell in column {column}, row {row}: {value}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}
