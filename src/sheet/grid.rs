//! In-memory sparse spreadsheet

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::{CellAddress, CellRead, SheetError, Spreadsheet};

/// Sparse cell store keyed by address
///
/// Empty strings are never stored, so "present" always means "has text".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cells: BTreeMap<CellAddress, String>,
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows of cells, the first row landing in row 1
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut grid = Self::new();
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, value) in row.into_iter().enumerate() {
                grid.set(
                    CellAddress::new(col_idx as u32 + 1, row_idx as u32 + 1),
                    value,
                );
            }
        }
        grid
    }

    /// Set a cell; an empty value clears it
    pub fn set(&mut self, address: CellAddress, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&address);
        } else {
            self.cells.insert(address, value);
        }
    }

    /// Number of non-empty cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Highest populated row, or 0 for an empty grid
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|a| a.row).max().unwrap_or(0)
    }

    /// Highest populated column, or 0 for an empty grid
    pub fn max_column(&self) -> u32 {
        self.cells.keys().map(|a| a.column).max().unwrap_or(0)
    }

    /// Parse CSV text (no header handling, ragged rows allowed)
    pub fn from_csv_str(content: &str) -> Result<Self, SheetError> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// Load a CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self, SheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_csv_str(&content)
    }

    fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid = Self::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            for (col_idx, field) in record.iter().enumerate() {
                grid.set(
                    CellAddress::new(col_idx as u32 + 1, row_idx as u32 + 1),
                    field,
                );
            }
        }
        Ok(grid)
    }

    /// Load one worksheet of a workbook (xlsx, xlsm, xls, xlsb, ods)
    pub fn from_workbook(path: &Path, sheet: &str) -> Result<Self, SheetError> {
        let mut workbook = open_workbook_auto(path)?;
        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(SheetError::WorksheetNotFound {
                sheet: sheet.to_string(),
                path: path.to_path_buf(),
            });
        }
        let range = workbook.worksheet_range(sheet)?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        let mut grid = Self::new();
        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let address = CellAddress::new(
                    start_col + col_idx as u32 + 1,
                    start_row + row_idx as u32 + 1,
                );
                if let Some(text) = data_to_text(cell) {
                    grid.set(address, text);
                }
            }
        }
        Ok(grid)
    }

    /// Load a spreadsheet by extension: `.csv` as CSV, anything else as a workbook
    pub fn load(path: &Path, sheet: &str) -> Result<Self, SheetError> {
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::from_csv_path(path)
        } else {
            Self::from_workbook(path, sheet)
        }
    }

    /// Render the grid as CSV text, one record per row up to the last populated row
    pub fn to_csv_string(&self) -> Result<String, SheetError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| SheetError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the grid to a CSV file
    pub fn write_csv(&self, path: &Path) -> Result<(), SheetError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)?;
        self.write_records(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_records<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<(), SheetError> {
        let columns = self.max_column();
        for row in 1..=self.max_row() {
            let mut record: Vec<&str> = (1..=columns)
                .map(|col| {
                    self.cells
                        .get(&CellAddress::new(col, row))
                        .map(String::as_str)
                        .unwrap_or("")
                })
                .collect();
            // Trailing empties are omitted, so records may be ragged
            while record.last() == Some(&"") {
                record.pop();
            }
            if record.is_empty() {
                // csv refuses to write a zero-field record
                record.push("");
            }
            writer.write_record(&record)?;
        }
        Ok(())
    }
}

impl Spreadsheet for Grid {
    fn get(&self, address: &CellAddress) -> CellRead {
        match self.cells.get(address) {
            Some(value) => CellRead::Value(value.clone()),
            None => CellRead::Empty,
        }
    }
}

fn data_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{}", n))
            }
        }
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("#{:?}", e)),
    }
}
