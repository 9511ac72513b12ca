use thiserror::Error;

/// Fatal problems found while reading the workbook. Any of these aborts the
/// reporting pass; nothing here is ever defaulted silently.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sheet '{0}' not found in data source")]
    MissingTable(String),

    #[error("sheet '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("sheet '{table}' row {row}: column '{column}' has unparseable date '{value}'")]
    InvalidDate {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("sheet '{table}' row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("failed to read sheet '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}
