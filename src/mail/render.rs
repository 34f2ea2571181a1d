//! PDF layout for single messages and the archive index.
//!
//! A [`Canvas`] is a cursor over an A4 document: it writes wrapped lines
//! top to bottom and starts a new page when the next line would cross the
//! bottom margin. Line width is estimated from an average glyph width,
//! which is close enough for Helvetica and typical sans-serif TTFs.

use crate::error::MessageError;
use crate::mail::message::EmailRecord;
use crate::mail::text::{fold_to_ascii, sanitize_text, MISSING_SUBJECT};
use crate::output::ArchiveEntry;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::io::BufWriter;
use std::sync::Arc;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const BOTTOM_BREAK_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const PT_TO_MM: f32 = 0.352_778;
/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

const BODY_SIZE: f32 = 12.0;
const MESSAGE_TITLE_SIZE: f32 = 14.0;
const INDEX_TITLE_SIZE: f32 = 16.0;

/// Where glyphs come from.
#[derive(Debug, Clone, Default)]
pub enum FontSource {
    /// Built-in Helvetica; text is folded to ASCII.
    #[default]
    Builtin,
    /// An embedded TrueType font, loaded once and shared across documents.
    TrueType(Arc<Vec<u8>>),
}

impl FontSource {
    fn is_builtin(&self) -> bool {
        matches!(self, FontSource::Builtin)
    }
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    ascii_only: bool,
    y: f32,
}

impl Canvas {
    fn new(title: &str, source: &FontSource) -> Result<Self, MessageError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let font = match source {
            FontSource::Builtin => doc.add_builtin_font(BuiltinFont::Helvetica),
            FontSource::TrueType(bytes) => doc.add_external_font(bytes.as_slice()),
        }
        .map_err(|e| render_failed(format!("PDF font error: {e}")))?;

        Ok(Self {
            doc,
            layer,
            font,
            ascii_only: source.is_builtin(),
            y: top_baseline(),
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = top_baseline();
    }

    fn ensure_room(&mut self) {
        if self.y < BOTTOM_BREAK_MM {
            self.new_page();
        }
    }

    fn prepare(&self, text: &str) -> String {
        if self.ascii_only {
            fold_to_ascii(text)
        } else {
            text.replace('\t', " ")
        }
    }

    /// Centered single-line heading.
    fn title(&mut self, text: &str, size: f32) {
        self.ensure_room();
        let text = self.prepare(text);
        let width = text.chars().count() as f32 * glyph_width_mm(size);
        let x = ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM);
        self.layer
            .use_text(text, size, Mm(x), Mm(self.y), &self.font);
        self.y -= LINE_HEIGHT_MM;
    }

    /// Left-aligned text, wrapped to the page width. Embedded newlines start
    /// new lines; blank lines still advance the cursor.
    fn paragraph(&mut self, text: &str, size: f32) {
        let text = self.prepare(text);
        let width = wrap_width(size);
        for source_line in text.lines() {
            for line in textwrap::wrap(source_line, width) {
                self.ensure_room();
                if !line.trim().is_empty() {
                    self.layer
                        .use_text(line.as_ref(), size, Mm(MARGIN_MM), Mm(self.y), &self.font);
                }
                self.y -= LINE_HEIGHT_MM;
            }
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn finish(self) -> Result<Vec<u8>, MessageError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| render_failed(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| render_failed(format!("PDF buffer error: {e}")))
    }
}

fn top_baseline() -> f32 {
    PAGE_HEIGHT_MM - MARGIN_MM - LINE_HEIGHT_MM
}

fn glyph_width_mm(size: f32) -> f32 {
    size * PT_TO_MM * AVG_GLYPH_EM
}

fn wrap_width(size: f32) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    ((usable / glyph_width_mm(size)) as usize).max(1)
}

fn render_failed(detail: String) -> MessageError {
    MessageError::Render { detail }
}

/// Lay out one message: a header block, the body, then attachment names.
pub fn render_message(record: &EmailRecord, font: &FontSource) -> Result<Vec<u8>, MessageError> {
    let subject = sanitize_text(record.subject.as_deref());
    let mut canvas = Canvas::new(&subject, font)?;

    canvas.title("Email Details", MESSAGE_TITLE_SIZE);
    canvas.gap(5.0);

    let headers = [
        ("Subject", subject.clone()),
        ("From", sanitize_text(record.from.as_deref())),
        ("To", sanitize_text(record.to.as_deref())),
        ("Date", sanitize_text(record.date.as_deref())),
    ];
    for (label, value) in headers.iter().filter(|(_, v)| !v.is_empty()) {
        canvas.paragraph(&format!("{label}: {value}"), BODY_SIZE);
    }
    canvas.gap(10.0);

    let body = sanitize_text(record.body.as_deref());
    if !body.is_empty() {
        canvas.paragraph(&body, BODY_SIZE);
    }

    if !record.attachments.is_empty() {
        canvas.gap(10.0);
        canvas.paragraph("Attachments:", BODY_SIZE);
        for name in &record.attachments {
            canvas.paragraph(&format!("- {}", sanitize_text(Some(name))), BODY_SIZE);
        }
    }

    canvas.finish()
}

/// Lay out the archive index, one numbered block per entry, in the order given.
pub fn render_index(entries: &[ArchiveEntry], font: &FontSource) -> Result<Vec<u8>, MessageError> {
    let mut canvas = Canvas::new("Email Archive Index", font)?;
    canvas.title("Email Archive Index", INDEX_TITLE_SIZE);
    canvas.gap(10.0);

    for (i, entry) in entries.iter().enumerate() {
        let date = entry.date.as_deref().unwrap_or("Unknown");
        let sender = entry.sender.as_deref().unwrap_or("Unknown");
        let subject = entry.subject.as_deref().unwrap_or(MISSING_SUBJECT);

        canvas.paragraph(&format!("{}. Date: {}", i + 1, sanitize_text(Some(date))), BODY_SIZE);
        canvas.paragraph(&format!("From: {}", sanitize_text(Some(sender))), BODY_SIZE);
        canvas.paragraph(&format!("Subject: {}", sanitize_text(Some(subject))), BODY_SIZE);
        canvas.paragraph(&format!("File: {}", entry.file_name), BODY_SIZE);
        canvas.gap(5.0);
    }

    canvas.finish()
}
