//! Spreadsheet access for the title-block table
//!
//! The fill logic only ever reads single cells by address, so the data source
//! is abstracted behind [`Spreadsheet`]. [`Grid`] is the in-memory
//! implementation, loadable from CSV or any workbook format calamine reads.

pub mod address;
mod grid;

use std::path::PathBuf;

use thiserror::Error;

pub use address::{a1_from_r1c1, column_letter, column_number, CellAddress};
pub use grid::Grid;

/// Errors that can occur when loading or addressing spreadsheets
#[derive(Debug, Error)]
pub enum SheetError {
    /// Cell reference that is neither A1 nor R1C1
    #[error("invalid cell address '{address}'")]
    InvalidAddress { address: String },

    #[error("failed to read spreadsheet file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// Requested worksheet is not in the workbook
    #[error("worksheet '{sheet}' not found in {path}")]
    WorksheetNotFound { sheet: String, path: PathBuf },
}

impl SheetError {
    /// Create an invalid address error
    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }
}

/// Outcome of reading one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRead {
    /// The cell holds a value (always in its string form)
    Value(String),
    /// The cell is absent or empty
    Empty,
}

impl CellRead {
    /// The value, if present
    pub fn as_value(&self) -> Option<&str> {
        match self {
            CellRead::Value(v) => Some(v),
            CellRead::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellRead::Empty)
    }
}

/// Read access to a spreadsheet's cells
pub trait Spreadsheet {
    /// Read the cell at `address`
    fn get(&self, address: &CellAddress) -> CellRead;
}
