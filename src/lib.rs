//! Title block filler - fill drawing title blocks from a spreadsheet
//!
//! Every drawing page carries a template with named editable texts (drawing
//! number, author, revision, …). This library fills them from a companion
//! spreadsheet named `TitleBlock` whose rows are `name | value | increment`:
//!
//! ```rust
//! use titleblock_filler::{fill_title_block, Grid, MemoryDocument, Page, PageId};
//! use titleblock_filler::notify::RecordingNotifier;
//!
//! let sheet = Grid::from_rows(vec![
//!     vec!["Property name", "Value", "Increase"],
//!     vec!["SheetNumber", "1", "Yes"],
//!     vec!["Author", "Jane Doe", "No"],
//! ]);
//! let mut doc = MemoryDocument::new()
//!     .with_page(Page::new("Page001"))
//!     .with_page(Page::new("Page002"))
//!     .with_spreadsheet("TitleBlock", sheet);
//!
//! let report = fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();
//! assert!(report.warnings.is_empty());
//! assert_eq!(doc.page(PageId(1)).unwrap().editable_texts["SheetNumber"], "2");
//! ```

pub mod document;
pub mod filler;
pub mod launch;
pub mod notify;
pub mod project;
pub mod settings;
pub mod sheet;
pub mod template;

pub use document::{Document, DocumentError, EditableTexts, MemoryDocument, Page, PageId};
pub use filler::{
    fill_title_block, fill_title_block_with, plan_fill, populate_spreadsheet, FillError,
    FillOptions, FillReport, FillWarning,
};
pub use project::{Project, ProjectError};
pub use settings::{Settings, SettingsError};
pub use sheet::{CellAddress, CellRead, Grid, SheetError, Spreadsheet};
pub use template::{SvgTemplate, TemplateError};

use thiserror::Error;

/// Any error the command-line tool can report
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fill(#[from] FillError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A page named on the command line does not exist
    #[error("no page named '{0}'")]
    UnknownPage(String),
}
