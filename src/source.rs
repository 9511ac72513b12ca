//! Sheet access for the workbook the reports are built from.
//!
//! A [`DataSource`] hands out raw [`Table`]s by sheet name. Typed decoding
//! lives in `loader`; this layer only knows about headers and string cells.

use crate::error::LoadError;
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One sheet: a header row plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Index of a column the caller cannot work without.
    pub fn require(&self, column: &str) -> Result<usize, LoadError> {
        self.column_index(column).ok_or_else(|| LoadError::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Cell text, or `""` for a short (ragged) row.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can produce named sheets.
pub trait DataSource {
    fn table(&self, name: &str) -> Result<Table, LoadError>;
}

/// A workbook exported as a directory with one `<Sheet>.csv` per sheet.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.csv", name))
    }
}

impl DataSource for CsvDirectory {
    fn table(&self, name: &str) -> Result<Table, LoadError> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(LoadError::MissingTable(name.to_string()));
        }
        let csv_err = |source: csv::Error| LoadError::Csv {
            table: name.to_string(),
            source,
        };
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_path(&path)
            .map_err(csv_err)?;

        let headers = rdr
            .headers()
            .map_err(csv_err)?
            .iter()
            // Excel likes to prepend a byte-order mark to the first header.
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(csv_err)?;
            // Fully blank lines are spreadsheet padding, not data.
            if record.iter().all(|c| c.is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Table {
            name: name.to_string(),
            headers,
            rows,
        })
    }
}

/// Sheets registered in code. Used by tests and by embedders that already
/// hold the data in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: HashMap<String, Table>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Convenience for literal rows: `with_rows("Revenue", &["A", "B"], &[&["1", "2"]])`.
    pub fn with_rows(self, name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        self.with_table(Table::new(name, headers, rows))
    }
}

impl DataSource for InMemorySource {
    fn table(&self, name: &str) -> Result<Table, LoadError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::MissingTable(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_sheet_from_csv_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(
            dir.path().join("Revenue.csv"),
            "\u{feff}Invoice_Date, Gross_Amount ,Service_Category\n\
             2024-01-05,1000,Audit\n\
             ,,\n\
             2024-02-05,1500,Training\n",
        )
        .expect("write sheet");

        let table = CsvDirectory::new(dir.path()).table("Revenue").expect("load sheet");
        assert_eq!(table.headers, vec!["Invoice_Date", "Gross_Amount", "Service_Category"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 1), "1500");
    }

    #[test]
    fn missing_sheet_file_is_a_missing_table() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = CsvDirectory::new(dir.path()).table("Clients").unwrap_err();
        assert!(matches!(err, LoadError::MissingTable(name) if name == "Clients"));
    }

    #[test]
    fn require_reports_table_and_column() {
        let table = Table::new("Expenses", &["Category"], vec![]);
        let err = table.require("Amount").unwrap_err();
        assert_eq!(
            err.to_string(),
            "sheet 'Expenses' is missing required column 'Amount'"
        );
    }

    #[test]
    fn ragged_rows_read_as_blank() {
        let source =
            InMemorySource::new().with_rows("SEO", &["Month", "Website_Visitors"], &[&["Jan"]]);
        let table = source.table("SEO").expect("registered");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
    }
}
