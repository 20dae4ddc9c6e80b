//! In-memory host editor
//!
//! The document is a flat list of segments: runs of text (the visible text of whatever
//! HTML was pasted) and native math objects. Searching only looks inside text segments,
//! so a placeholder can never be found inside a math object. Deleting a range leaves the
//! cursor where the range started, which is where the next math object lands; with no
//! cursor, math objects are appended.

use super::{resolve, CommandPayload, DocumentApi, HostEditor, MathSyntax, PasteAck, ResolveReport, TextRange};
use crate::error::HostError;
use crate::html::text_content;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Math { source: String, syntax: MathSyntax },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    segment: usize,
    offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    segments: Vec<Segment>,
    selection: Option<TextRange>,
    cursor: Option<Cursor>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Text(text.into())],
            ..Self::default()
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn selection(&self) -> Option<&TextRange> {
        self.selection.as_ref()
    }

    /// Sources of every math object, in document order
    pub fn math_sources(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Math { source, .. } => Some(source.as_str()),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Plain text with each math object shown as `⟨source⟩`
    pub fn render_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(text) => text.clone(),
                Segment::Math { source, .. } => format!("⟨{source}⟩"),
            })
            .collect()
    }

    fn append_text(&mut self, text: &str) {
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(text),
            _ => self.segments.push(Segment::Text(text.to_string())),
        }
    }

    fn text_at(&self, range: &TextRange) -> Result<&str, HostError> {
        match self.segments.get(range.container) {
            Some(Segment::Text(text)) if range.start <= range.end && range.end <= text.len() => text
                .get(range.start..range.end)
                .ok_or_else(|| HostError::Command(format!("range {range:?} splits a character"))),
            _ => Err(HostError::Command(format!("range {range:?} is outside the document"))),
        }
    }
}

impl DocumentApi for MemoryDocument {
    fn search(&mut self, pattern: &str) -> Vec<TextRange> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let mut found = Vec::new();
        for (container, segment) in self.segments.iter().enumerate() {
            if let Segment::Text(text) = segment {
                found.extend(text.match_indices(pattern).map(|(start, m)| TextRange {
                    container,
                    start,
                    end: start + m.len(),
                }));
            }
        }
        found
    }

    fn select(&mut self, range: &TextRange) -> Result<(), HostError> {
        self.text_at(range)?;
        self.selection = Some(*range);
        Ok(())
    }

    fn delete(&mut self, range: &TextRange) -> Result<(), HostError> {
        self.text_at(range)?;
        if let Some(Segment::Text(text)) = self.segments.get_mut(range.container) {
            text.replace_range(range.start..range.end, "");
        }
        self.selection = None;
        self.cursor = Some(Cursor {
            segment: range.container,
            offset: range.start,
        });
        Ok(())
    }

    fn insert_math(&mut self, source: &str, syntax: MathSyntax) -> Result<(), HostError> {
        let math = Segment::Math {
            source: source.to_string(),
            syntax,
        };
        let Some(cursor) = self.cursor.take() else {
            self.segments.push(math);
            return Ok(());
        };

        let tail = match self.segments.get_mut(cursor.segment) {
            Some(Segment::Text(text)) => text.split_off(cursor.offset),
            _ => return Err(HostError::Command("cursor is not inside text".to_string())),
        };
        self.segments.insert(cursor.segment + 1, math);
        if !tail.is_empty() {
            self.segments.insert(cursor.segment + 2, Segment::Text(tail));
        }
        Ok(())
    }
}

/// A host editor holding a [`MemoryDocument`]
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    document: MemoryDocument,
    selection: String,
    pasted: Vec<String>,
    reject_paste: Option<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose user has `text` selected
    pub fn with_selection(text: impl Into<String>) -> Self {
        Self {
            selection: text.into(),
            ..Self::default()
        }
    }

    /// A host that refuses every paste with `reason`
    pub fn rejecting_paste(reason: impl Into<String>) -> Self {
        Self {
            reject_paste: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    /// HTML of every accepted paste, oldest first
    pub fn pasted(&self) -> &[String] {
        &self.pasted
    }
}

impl HostEditor for MemoryHost {
    fn paste_html(&mut self, html: &str) -> Result<PasteAck, HostError> {
        if let Some(reason) = &self.reject_paste {
            return Err(HostError::Paste(reason.clone()));
        }
        let text = text_content(html);
        debug!(chars = text.len(), "pasting into memory document");
        self.document.append_text(&text);
        self.pasted.push(html.to_string());
        Ok(PasteAck { bytes: html.len() })
    }

    fn selected_text(&mut self) -> Result<String, HostError> {
        Ok(self.selection.clone())
    }

    fn run_command(&mut self, payload: CommandPayload) -> Result<ResolveReport, HostError> {
        let formulas = payload.decode()?;
        Ok(resolve(&mut self.document, &formulas))
    }
}
