//! Title-block filling
//!
//! Reads the `TitleBlock` spreadsheet as a three-column table and writes its
//! values into the editable texts of every drawing page:
//!
//! | Column | Meaning                                                      |
//! |--------|--------------------------------------------------------------|
//! | A      | name of the editable text                                    |
//! | B      | value to write (an empty cell clears the field)              |
//! | C      | increment flag; a value starting with `y` adds the page index |
//!
//! Row 1 is a header. Scanning starts at row 2 and stops as soon as the next
//! row has no name in column A, or after [`MAX_ROWS`] rows.
//!
//! A run is computed for every page first ([`plan_fill`]) and only then
//! written back ([`apply_fill`]), one whole-map replacement per page, so a
//! fatal error never leaves some pages filled and others not.

use std::fmt;

use thiserror::Error;

use crate::document::{Document, DocumentError, EditableTexts, PageId};
use crate::notify::Notifier;
use crate::sheet::{CellAddress, CellRead, Grid, Spreadsheet};

/// Name of the spreadsheet object holding the title-block table
pub const TITLE_BLOCK_SHEET: &str = "TitleBlock";

/// First row holding data; row 1 is the header
pub const FIRST_DATA_ROW: u32 = 2;

/// Maximum number of rows scanned per page
pub const MAX_ROWS: u32 = 1000;

/// Message shown when the document has no drawing pages
pub const NO_PAGE_MESSAGE: &str = "No page present!!!";

/// Header row written by [`populate_spreadsheet`]
pub const HEADER: [&str; 3] = ["Property name", "Value", "Increase"];

/// Errors that abort a fill run
#[derive(Debug, Error)]
pub enum FillError {
    /// The document has no drawing pages
    #[error("no page present")]
    NoPagesFound,

    /// The document has no spreadsheet with the expected name
    #[error("no spreadsheet named '{name}'")]
    SpreadsheetNotFound { name: String },

    /// A drawing page has no template to fill
    #[error("page '{page}' has no template")]
    PageWithoutTemplate { page: String },

    /// Writing a page back failed
    #[error("failed to update page: {0}")]
    Document(#[from] DocumentError),
}

impl FillError {
    /// Text of the dialog shown for this error
    pub fn user_message(&self) -> String {
        match self {
            FillError::NoPagesFound | FillError::PageWithoutTemplate { .. } => {
                NO_PAGE_MESSAGE.to_string()
            }
            FillError::SpreadsheetNotFound { name } => {
                format!("No spreadsheet named '{}'!!!", name)
            }
            FillError::Document(e) => e.to_string(),
        }
    }
}

/// Options for a fill run
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Name of the spreadsheet object to read
    pub sheet_name: String,
    /// Maximum number of data rows scanned per page
    pub max_rows: u32,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            sheet_name: TITLE_BLOCK_SHEET.to_string(),
            max_rows: MAX_ROWS,
        }
    }
}

impl FillOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from a differently named spreadsheet
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the per-page row limit (at least one row is always read)
    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }
}

/// Kind of non-fatal data problem found while filling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillWarningKind {
    /// An increment-flagged value is not an integer; it was written unchanged
    ValueNotNumeric,
}

impl fmt::Display for FillWarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillWarningKind::ValueNotNumeric => write!(f, "this is not a number!"),
        }
    }
}

/// A non-fatal data problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillWarning {
    pub kind: FillWarningKind,
    pub page: String,
    pub row: u32,
    pub key: String,
    pub value: String,
}

impl fmt::Display for FillWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: row {} ({} = \"{}\"): {}",
            self.page, self.row, self.key, self.value, self.kind
        )
    }
}

/// The result of filling one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFill {
    pub page: PageId,
    pub name: String,
    /// Page counter value applied to flagged rows
    pub offset: i64,
    /// Spreadsheet rows read, in order
    pub rows: Vec<u32>,
    /// Editable texts after filling
    pub texts: EditableTexts,
}

/// Outcome of a fill run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub pages: Vec<PageFill>,
    pub warnings: Vec<FillWarning>,
}

/// Fill every page of `doc` from its `TitleBlock` spreadsheet
///
/// Fatal errors are shown once through `notifier` and returned; no page is
/// modified in that case.
pub fn fill_title_block<D>(
    doc: &mut D,
    notifier: &mut dyn Notifier,
) -> Result<FillReport, FillError>
where
    D: Document + ?Sized,
{
    fill_title_block_with(doc, notifier, &FillOptions::default())
}

/// [`fill_title_block`] with explicit options
pub fn fill_title_block_with<D>(
    doc: &mut D,
    notifier: &mut dyn Notifier,
    options: &FillOptions,
) -> Result<FillReport, FillError>
where
    D: Document + ?Sized,
{
    let result = plan_fill(doc, options).and_then(|report| {
        apply_fill(doc, &report)?;
        Ok(report)
    });

    if let Err(e) = &result {
        log::error!("title block fill aborted: {}", e);
        notifier.notify(&e.user_message(), "");
    }
    result
}

/// Compute the new editable texts of every page without touching the document
pub fn plan_fill<D>(doc: &D, options: &FillOptions) -> Result<FillReport, FillError>
where
    D: Document + ?Sized,
{
    let pages = doc.pages();
    if pages.is_empty() {
        return Err(FillError::NoPagesFound);
    }

    let sheet = doc
        .spreadsheet(&options.sheet_name)
        .ok_or_else(|| FillError::SpreadsheetNotFound {
            name: options.sheet_name.clone(),
        })?;

    let mut report = FillReport::default();
    let mut counter: i64 = -1;

    for page in pages {
        let name = doc.page_name(page);
        let texts = doc
            .editable_texts(page)
            .ok_or_else(|| FillError::PageWithoutTemplate { page: name.clone() })?;

        counter += 1;
        log::info!("filling page '{}' (offset {})", name, counter);

        let (texts, rows) = fill_page(sheet, texts, counter, &name, options, &mut report.warnings);
        report.pages.push(PageFill {
            page,
            name,
            offset: counter,
            rows,
            texts,
        });
    }

    Ok(report)
}

/// Write a planned fill back into the document, one replacement per page
pub fn apply_fill<D>(doc: &mut D, report: &FillReport) -> Result<(), FillError>
where
    D: Document + ?Sized,
{
    for page in &report.pages {
        doc.replace_editable_texts(page.page, page.texts.clone())?;
    }
    Ok(())
}

/// Apply the spreadsheet rows to one page's editable texts
///
/// Returns the updated texts and the rows that were read.
pub fn fill_page(
    sheet: &dyn Spreadsheet,
    mut texts: EditableTexts,
    offset: i64,
    page_name: &str,
    options: &FillOptions,
    warnings: &mut Vec<FillWarning>,
) -> (EditableTexts, Vec<u32>) {
    let last_row = FIRST_DATA_ROW.saturating_add(options.max_rows.max(1) - 1);
    let mut rows = Vec::new();
    let mut row = FIRST_DATA_ROW;

    loop {
        rows.push(row);
        match sheet.get(&CellAddress::key(row)) {
            CellRead::Value(key) => {
                let value = row_value(sheet, row, offset, |value| {
                    log::warn!(
                        "{}: row {}: value '{}' of '{}' is not a number",
                        page_name,
                        row,
                        value,
                        key
                    );
                    warnings.push(FillWarning {
                        kind: FillWarningKind::ValueNotNumeric,
                        page: page_name.to_string(),
                        row,
                        key: key.clone(),
                        value: value.to_string(),
                    });
                });
                log::debug!("{}: {} = \"{}\"", CellAddress::key(row), key, value);
                texts.insert(key, value);
            }
            CellRead::Empty => {
                log::debug!("{} is empty, nothing to fill", CellAddress::key(row));
            }
        }

        if row >= last_row || sheet.get(&CellAddress::key(row + 1)).is_empty() {
            break;
        }
        row += 1;
    }

    (texts, rows)
}

/// The text a row assigns to its field
fn row_value(
    sheet: &dyn Spreadsheet,
    row: u32,
    offset: i64,
    on_not_numeric: impl FnOnce(&str),
) -> String {
    let CellRead::Value(value) = sheet.get(&CellAddress::value(row)) else {
        return String::new();
    };

    if !is_increment_flag(&sheet.get(&CellAddress::flag(row))) {
        return value;
    }

    match value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| n.checked_add(offset))
    {
        Some(n) => n.to_string(),
        None => {
            on_not_numeric(&value);
            value
        }
    }
}

/// Whether a flag cell asks for the page offset ("y", "Yes", …)
pub fn is_increment_flag(flag: &CellRead) -> bool {
    flag.as_value()
        .map_or(false, |f| f.to_lowercase().starts_with('y'))
}

/// Build a title-block table from a page's editable texts
///
/// The result has the header row followed by one row per field, sorted by
/// name, with the current value and the increment flag set to "No".
pub fn populate_spreadsheet(texts: &EditableTexts) -> Grid {
    let mut grid = Grid::new();
    for (col, title) in HEADER.iter().enumerate() {
        grid.set(CellAddress::new(col as u32 + 1, 1), *title);
    }
    for (row, (key, value)) in (FIRST_DATA_ROW..).zip(texts) {
        grid.set(CellAddress::key(row), key.as_str());
        grid.set(CellAddress::value(row), value.as_str());
        grid.set(CellAddress::flag(row), "No");
    }
    grid
}
