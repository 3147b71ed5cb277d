//! On-disk drawing projects
//!
//! A project is a TOML manifest naming the title-block spreadsheet and the
//! SVG template of every page:
//!
//! ```toml
//! [spreadsheet]
//! name = "TitleBlock"
//! path = "titleblock.csv"
//!
//! [[page]]
//! name = "Page001"
//! template = "templates/A3_Landscape.svg"
//! ```
//!
//! Paths are relative to the manifest. Loading builds a [`MemoryDocument`];
//! saving writes each page's template back with the document's current
//! editable texts.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::document::{Document, MemoryDocument, Page, PageId};
use crate::filler::{FillError, NO_PAGE_MESSAGE, TITLE_BLOCK_SHEET};
use crate::notify::Notifier;
use crate::sheet::{Grid, SheetError};
use crate::template::{SvgTemplate, TemplateError};

/// Errors that can occur when loading or saving projects
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse project manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("spreadsheet {path}: {source}")]
    Sheet { path: PathBuf, source: SheetError },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Template path has no file name to reuse in an output directory
    #[error("template path {0} has no file name")]
    NoFileName(PathBuf),
}

#[derive(Debug, Deserialize)]
struct Manifest {
    spreadsheet: Option<SpreadsheetEntry>,
    #[serde(default, rename = "page")]
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetEntry {
    #[serde(default = "default_sheet_name")]
    name: String,
    path: PathBuf,
    /// Worksheet inside a workbook; defaults to `name`
    sheet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    name: String,
    template: PathBuf,
}

fn default_sheet_name() -> String {
    TITLE_BLOCK_SHEET.to_string()
}

/// A page template on disk
#[derive(Debug, Clone)]
struct PageTemplate {
    page: PageId,
    path: PathBuf,
    template: SvgTemplate,
}

/// A loaded project
#[derive(Debug)]
pub struct Project {
    document: MemoryDocument,
    templates: Vec<PageTemplate>,
}

impl Project {
    /// Load a project from its manifest file
    pub fn load(manifest: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(manifest).map_err(|source| ProjectError::Read {
            path: manifest.to_path_buf(),
            source,
        })?;
        let root = manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_manifest_str(&content, &root)
    }

    /// Load a project from manifest text, resolving paths against `root`
    pub fn from_manifest_str(content: &str, root: &Path) -> Result<Self, ProjectError> {
        let manifest: Manifest = toml::from_str(content)?;
        let mut document = MemoryDocument::new();
        let mut templates = Vec::new();

        if let Some(entry) = &manifest.spreadsheet {
            let path = root.join(&entry.path);
            let sheet = entry.sheet.as_deref().unwrap_or(&entry.name);
            let grid = load_grid(&path, sheet)?;
            log::debug!("loaded spreadsheet '{}' from {}", entry.name, path.display());
            document.add_spreadsheet(entry.name.clone(), grid);
        }

        for entry in &manifest.pages {
            let path = root.join(&entry.template);
            let template = SvgTemplate::from_file(&path)?;
            let mut page = Page::new(entry.name.clone());
            page.editable_texts = template.editable_texts()?;
            log::debug!(
                "page '{}': {} editable texts in {}",
                entry.name,
                page.editable_texts.len(),
                path.display()
            );
            let id = document.add_page(page);
            templates.push(PageTemplate {
                page: id,
                path,
                template,
            });
        }

        Ok(Self {
            document,
            templates,
        })
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    /// Replace (or add) a spreadsheet with one loaded from `path`
    pub fn load_spreadsheet(
        &mut self,
        name: &str,
        path: &Path,
        sheet: &str,
    ) -> Result<(), ProjectError> {
        let grid = load_grid(path, sheet)?;
        self.document.add_spreadsheet(name, grid);
        Ok(())
    }

    /// Find a page by name
    pub fn page_by_name(&self, name: &str) -> Option<PageId> {
        self.document
            .pages()
            .into_iter()
            .find(|id| self.document.page_name(*id) == name)
    }

    /// The page to read fields from
    ///
    /// A named page must exist. Without a name, the only page is used, or the
    /// user picks one when there are several; `Ok(None)` means the pick was
    /// cancelled. A project without pages is reported through `notifier`.
    pub fn select_page(
        &self,
        name: Option<&str>,
        notifier: &mut dyn Notifier,
    ) -> Result<Option<PageId>, crate::Error> {
        if let Some(name) = name {
            return self
                .page_by_name(name)
                .map(Some)
                .ok_or_else(|| crate::Error::UnknownPage(name.to_string()));
        }

        let pages = self.document.pages();
        match pages.as_slice() {
            [] => {
                notifier.notify(NO_PAGE_MESSAGE, "");
                Err(FillError::NoPagesFound.into())
            }
            [page] => Ok(Some(*page)),
            _ => {
                let names: Vec<String> = pages
                    .iter()
                    .map(|id| self.document.page_name(*id))
                    .collect();
                let picked = notifier.choose("Page to read the fields from", "Populate", &names);
                Ok(picked.and_then(|name| self.page_by_name(&name)))
            }
        }
    }

    /// Write every page's template with its current editable texts
    ///
    /// With `out_dir`, templates are written there under their original file
    /// names; otherwise they are overwritten in place. Returns the written
    /// paths in page order.
    pub fn save(&self, out_dir: Option<&Path>) -> Result<Vec<PathBuf>, ProjectError> {
        if let Some(dir) = out_dir {
            std::fs::create_dir_all(dir).map_err(|source| ProjectError::OutputDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let mut written = Vec::new();
        for entry in &self.templates {
            let Some(texts) = self.document.editable_texts(entry.page) else {
                continue;
            };

            let fields = entry.template.editable_texts()?;
            for key in texts.keys().filter(|k| !fields.contains_key(*k)) {
                log::warn!(
                    "page '{}': template {} has no editable text '{}'",
                    self.document.page_name(entry.page),
                    entry.path.display(),
                    key
                );
            }

            let target = match out_dir {
                Some(dir) => dir.join(
                    entry
                        .path
                        .file_name()
                        .ok_or_else(|| ProjectError::NoFileName(entry.path.clone()))?,
                ),
                None => entry.path.clone(),
            };

            let rendered = SvgTemplate::from_str(entry.template.apply_editable_texts(&texts)?);
            rendered.write(&target)?;
            log::info!("wrote {}", target.display());
            written.push(target);
        }
        Ok(written)
    }
}

fn load_grid(path: &Path, sheet: &str) -> Result<Grid, ProjectError> {
    Grid::load(path, sheet).map_err(|source| ProjectError::Sheet {
        path: path.to_path_buf(),
        source,
    })
}
