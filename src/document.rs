//! Drawing document model
//!
//! The fill logic never reaches for a global "active document"; it is handed
//! something implementing [`Document`]. [`MemoryDocument`] is the plain
//! in-memory implementation used by the on-disk project loader and by tests.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::sheet::{Grid, Spreadsheet};

/// Field name -> field value map of a page template
pub type EditableTexts = BTreeMap<String, String>;

/// Handle of a page within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub usize);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by document mutation
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("page {0} does not exist")]
    UnknownPage(PageId),
}

/// The slice of a drawing document the title-block filler needs
pub trait Document {
    /// Drawing pages, in document order
    fn pages(&self) -> Vec<PageId>;

    /// Human-readable page name
    fn page_name(&self, page: PageId) -> String {
        page.to_string()
    }

    /// Current editable texts of a page's template, `None` if the page has no template
    fn editable_texts(&self, page: PageId) -> Option<EditableTexts>;

    /// Replace a page's editable texts wholesale
    fn replace_editable_texts(
        &mut self,
        page: PageId,
        texts: EditableTexts,
    ) -> Result<(), DocumentError>;

    /// Look up a spreadsheet object by name
    fn spreadsheet(&self, name: &str) -> Option<&dyn Spreadsheet>;
}

/// A drawing page and its template's editable texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub editable_texts: EditableTexts,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            editable_texts: EditableTexts::new(),
        }
    }

    /// Add an editable text field
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.editable_texts.insert(key.into(), value.into());
        self
    }
}

/// Document held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<Page>,
    spreadsheets: BTreeMap<String, Grid>,
    /// Number of whole-map replacements performed, per page index
    writes: Vec<usize>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page
    pub fn add_page(&mut self, page: Page) -> PageId {
        self.pages.push(page);
        self.writes.push(0);
        PageId(self.pages.len() - 1)
    }

    /// Add or replace a named spreadsheet
    pub fn add_spreadsheet(&mut self, name: impl Into<String>, grid: Grid) {
        self.spreadsheets.insert(name.into(), grid);
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.add_page(page);
        self
    }

    pub fn with_spreadsheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.add_spreadsheet(name, grid);
        self
    }

    pub fn page(&self, page: PageId) -> Option<&Page> {
        self.pages.get(page.0)
    }

    /// How many times a page's editable texts have been replaced
    pub fn write_count(&self, page: PageId) -> usize {
        self.writes.get(page.0).copied().unwrap_or(0)
    }
}

impl Document for MemoryDocument {
    fn pages(&self) -> Vec<PageId> {
        (0..self.pages.len()).map(PageId).collect()
    }

    fn page_name(&self, page: PageId) -> String {
        self.pages
            .get(page.0)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| page.to_string())
    }

    fn editable_texts(&self, page: PageId) -> Option<EditableTexts> {
        self.pages.get(page.0).map(|p| p.editable_texts.clone())
    }

    fn replace_editable_texts(
        &mut self,
        page: PageId,
        texts: EditableTexts,
    ) -> Result<(), DocumentError> {
        let target = self
            .pages
            .get_mut(page.0)
            .ok_or(DocumentError::UnknownPage(page))?;
        target.editable_texts = texts;
        self.writes[page.0] += 1;
        Ok(())
    }

    fn spreadsheet(&self, name: &str) -> Option<&dyn Spreadsheet> {
        self.spreadsheets.get(name).map(|g| g as &dyn Spreadsheet)
    }
}
