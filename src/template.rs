//! SVG drawing templates with editable text fields
//!
//! A drawing template marks each user-fillable field with a
//! `freecad:editable="<name>"` attribute, typically on a `<text>` element
//! whose value sits in a child `<tspan>`:
//!
//! ```text
//! <text freecad:editable="Author" x="10" y="20"><tspan>Jane Doe</tspan></text>
//! ```
//!
//! Reading collects the text content of every such element. Rewriting
//! replaces only that text content and passes every other event through
//! unchanged, so the rest of the markup survives byte for byte.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::document::EditableTexts;

/// Attribute naming an editable field
pub const EDITABLE_ATTR: &str = "freecad:editable";

/// Errors that can occur when reading or rewriting templates
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write template file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Template markup could not be parsed
    #[error("malformed template at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Serializing the rewritten template failed
    #[error("failed to render template: {message}")]
    Render { message: String },
}

impl TemplateError {
    /// Create a malformed template error
    pub fn malformed(position: u64, message: impl ToString) -> Self {
        Self::Malformed {
            position,
            message: message.to_string(),
        }
    }

    fn render(message: impl ToString) -> Self {
        Self::Render {
            message: message.to_string(),
        }
    }
}

/// An SVG drawing template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgTemplate {
    source: String,
}

impl SvgTemplate {
    /// Wrap SVG markup
    pub fn from_str(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load a template file
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_str(source))
    }

    /// Collect all editable fields and their current values
    pub fn editable_texts(&self) -> Result<EditableTexts, TemplateError> {
        let mut reader = Reader::from_str(&self.source);
        let mut texts = EditableTexts::new();
        let mut current: Option<OpenField> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| TemplateError::malformed(position, e))?;

            match event {
                Event::Eof => break,
                Event::Start(e) => match current.as_mut() {
                    Some(field) => {
                        field.depth += 1;
                        field.nested = true;
                    }
                    None => {
                        if let Some(name) = editable_name(&e, position)? {
                            current = Some(OpenField::new(name));
                        }
                    }
                },
                Event::Empty(e) => match current.as_mut() {
                    Some(field) => field.nested = true,
                    None => {
                        if let Some(name) = editable_name(&e, position)? {
                            texts.insert(name, String::new());
                        }
                    }
                },
                Event::Text(t) => {
                    if let Some(field) = current.as_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| TemplateError::malformed(position, e))?;
                        field.push(&text);
                    }
                }
                Event::CData(c) => {
                    if let Some(field) = current.as_mut() {
                        field.push(&String::from_utf8_lossy(&c));
                    }
                }
                Event::End(_) => {
                    if let Some(field) = current.as_mut() {
                        if field.depth == 0 {
                            if let Some(field) = current.take() {
                                let (name, value) = field.finish();
                                texts.insert(name, value);
                            }
                        } else {
                            field.depth -= 1;
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(texts)
    }

    /// Render the template with field values taken from `texts`
    ///
    /// Fields without an entry in `texts` keep their current content.
    pub fn apply_editable_texts(&self, texts: &EditableTexts) -> Result<String, TemplateError> {
        let mut reader = Reader::from_str(&self.source);
        let mut writer = Writer::new(Vec::new());

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| TemplateError::malformed(position, e))?;

            match event {
                Event::Eof => break,
                Event::Start(e) => {
                    let value = editable_name(&e, position)?.and_then(|name| texts.get(&name));
                    match value {
                        Some(value) => {
                            let children = read_subtree(&mut reader)?;
                            write_field(&mut writer, e, children, value)?;
                        }
                        None => write(&mut writer, Event::Start(e))?,
                    }
                }
                Event::Empty(e) => {
                    let value = editable_name(&e, position)?.and_then(|name| texts.get(&name));
                    match value {
                        Some(value) => write_field(&mut writer, e, Vec::new(), value)?,
                        None => write(&mut writer, Event::Empty(e))?,
                    }
                }
                other => write(&mut writer, other)?,
            }
        }

        String::from_utf8(writer.into_inner()).map_err(TemplateError::render)
    }

    /// Write the template markup to `path`
    pub fn write(&self, path: &Path) -> Result<(), TemplateError> {
        std::fs::write(path, &self.source).map_err(|source| TemplateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// An editable element whose end tag has not been reached yet
struct OpenField {
    name: String,
    /// Text inside child elements plus non-blank text directly in the field
    inner: String,
    /// All text directly in the field element
    direct: String,
    /// Nesting depth below the field element
    depth: usize,
    /// Whether the field element has child elements
    nested: bool,
}

impl OpenField {
    fn new(name: String) -> Self {
        Self {
            name,
            inner: String::new(),
            direct: String::new(),
            depth: 0,
            nested: false,
        }
    }

    fn push(&mut self, text: &str) {
        if self.depth == 0 {
            self.direct.push_str(text);
            // Indentation between child tags is not part of the value
            if text.trim().is_empty() {
                return;
            }
        }
        self.inner.push_str(text);
    }

    fn finish(self) -> (String, String) {
        let value = if self.nested { self.inner } else { self.direct };
        (self.name, value)
    }
}

/// Value of the editable attribute, if the element carries one
fn editable_name(e: &BytesStart<'_>, position: u64) -> Result<Option<String>, TemplateError> {
    let attr = e
        .try_get_attribute(EDITABLE_ATTR)
        .map_err(|err| TemplateError::malformed(position, err))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|err| TemplateError::malformed(position, err))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Read events up to (not including) the end tag closing the current element
fn read_subtree<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Vec<Event<'a>>, TemplateError> {
    let mut events = Vec::new();
    let mut depth = 0usize;
    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| TemplateError::malformed(position, e))?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(events),
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(TemplateError::malformed(position, "unclosed editable element"))
            }
            _ => {}
        }
        events.push(event);
    }
}

/// Emit an editable element with its text replaced by `value`
///
/// The value goes into the first `<tspan>` when there is one, otherwise
/// directly into the element. Existing text is dropped; whitespace-only text
/// between child tags is kept.
fn write_field<W: std::io::Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    children: Vec<Event<'_>>,
    value: &str,
) -> Result<(), TemplateError> {
    let end = start.to_end().into_owned();
    write(writer, Event::Start(start))?;

    let nested = children
        .iter()
        .any(|e| matches!(e, Event::Start(_) | Event::Empty(_)));
    let mut inserted = false;
    for event in children {
        match event {
            Event::Text(t) => {
                let keep = nested && t.unescape().map_or(false, |s| s.trim().is_empty());
                if keep {
                    write(writer, Event::Text(t))?;
                }
            }
            Event::CData(_) => {}
            Event::Start(s) if !inserted && s.local_name().as_ref() == b"tspan" => {
                write(writer, Event::Start(s))?;
                write(writer, Event::Text(BytesText::new(value)))?;
                inserted = true;
            }
            Event::Empty(s) if !inserted && s.local_name().as_ref() == b"tspan" => {
                let tspan_end = s.to_end().into_owned();
                write(writer, Event::Start(s))?;
                write(writer, Event::Text(BytesText::new(value)))?;
                write(writer, Event::End(tspan_end))?;
                inserted = true;
            }
            other => write(writer, other)?,
        }
    }

    if !inserted {
        write(writer, Event::Text(BytesText::new(value)))?;
    }
    write(writer, Event::End(end))
}

fn write<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), TemplateError> {
    writer.write_event(event).map_err(TemplateError::render)
}
