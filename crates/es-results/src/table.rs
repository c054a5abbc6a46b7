//! In-memory result table.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::{ResultsError, ResultsResult};

/// Rows are simulated cases, columns are measured quantities.
///
/// Cells keep the exact text of the download, surrounding whitespace
/// included; numeric views are computed on demand. Header names are
/// trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SimulationTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> ResultsResult<Self> {
        if headers.is_empty() {
            return Err(ResultsError::MissingHeader);
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(ResultsError::RaggedRow {
                    row: index,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    /// Parse comma-separated text with a header row.
    pub fn from_reader<R: Read>(reader: R) -> ResultsResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ResultsError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }

        Self::new(headers, rows)
    }

    pub fn from_path(path: &Path) -> ResultsResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> ResultsResult<Vec<&str>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| ResultsError::ColumnNotFound(name.to_string()))?;
        Ok(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// One column parsed as floating point.
    pub fn numeric_column(&self, name: &str) -> ResultsResult<Vec<f64>> {
        self.column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.trim().parse::<f64>().map_err(|_| ResultsError::NonNumeric {
                    column: name.to_string(),
                    row,
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> ResultsResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = SimulationTable::from_reader("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ResultsError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = SimulationTable::from_reader("V,Thrust\n1000,1e-6\n\n1100,2e-6\n".as_bytes())
            .unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn cells_keep_their_exact_text() {
        let table =
            SimulationTable::from_reader(" V , Mode \n1000, ion mode \n".as_bytes()).unwrap();
        assert_eq!(table.headers(), ["V", "Mode"]);
        assert_eq!(table.cell(0, "Mode"), Some(" ion mode "));
        assert_eq!(table.cell(0, "V"), Some("1000"));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = SimulationTable::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, ResultsError::MissingHeader));
    }

    #[test]
    fn numeric_column_reports_bad_cell() {
        let table = SimulationTable::from_reader("V,Isp\n1000,NaN?\n".as_bytes()).unwrap();
        let err = table.numeric_column("Isp").unwrap_err();
        assert!(matches!(err, ResultsError::NonNumeric { row: 0, .. }));
        assert!(matches!(
            table.numeric_column("Thrust"),
            Err(ResultsError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn write_csv_preserves_cells() {
        let table = SimulationTable::new(
            vec!["Propellant".to_string(), "Thrust".to_string()],
            vec![vec!["EMI-BF4,Ionic Liquid".to_string(), "1.2e-6".to_string()]],
        )
        .unwrap();

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let reparsed = SimulationTable::from_reader(out.as_slice()).unwrap();
        assert_eq!(reparsed, table);
    }
}
