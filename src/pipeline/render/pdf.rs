//! PDF generation via `printpdf` built-in fonts.
//!
//! A4 portrait, single column. Pages are added when the cursor reaches the
//! bottom margin.

use std::io::BufWriter;

use printpdf::*;

use super::markup::{parse_markup, Block};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MM: f32 = 280.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LEFT_MM: f32 = 20.0;
const INDENT_MM: f32 = 26.0;

const TITLE_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 11.5;
const BODY_SIZE: f32 = 9.5;
const FOOTER_SIZE: f32 = 7.0;

const BODY_LINE_MM: f32 = 4.6;
const HEADING_LINE_MM: f32 = 6.0;
const BLANK_MM: f32 = 2.5;

const BODY_WRAP_CHARS: usize = 95;
const INDENTED_WRAP_CHARS: usize = 88;
const HEADING_WRAP_CHARS: usize = 70;

/// Text cursor that owns the current page layer and paginates on demand.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    page_count: usize,
}

impl<'a> Cursor<'a> {
    fn new(doc: &'a PdfDocumentReference, page: PdfPageIndex, layer: PdfLayerIndex) -> Self {
        Self {
            doc,
            layer: doc.get_page(page).get_layer(layer),
            y: TOP_MM,
            page_count: 1,
        }
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y - needed_mm >= BOTTOM_MARGIN_MM {
            return;
        }
        self.page_count += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", self.page_count),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_MM;
    }

    fn line(&mut self, text: &str, size: f32, x_mm: f32, font: &IndirectFontRef, advance_mm: f32) {
        self.ensure_space(advance_mm);
        self.layer.use_text(text, size, Mm(x_mm), Mm(self.y), font);
        self.y -= advance_mm;
    }

    fn skip(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Render a report body to PDF bytes.
pub fn render_report_pdf(title: &str, body: &str, footer: &str) -> Result<Vec<u8>, String> {
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| format!("PDF font error: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| format!("PDF font error: {e}"))?;

    let mut cursor = Cursor::new(&doc, page1, layer1);

    cursor.line(&pdf_safe(title), TITLE_SIZE, LEFT_MM, &bold, 10.0);

    for block in parse_markup(body) {
        match block {
            Block::Heading(text) => {
                cursor.skip(2.0);
                for line in wrap_text(&pdf_safe(&text), HEADING_WRAP_CHARS) {
                    cursor.line(&line, HEADING_SIZE, LEFT_MM, &bold, HEADING_LINE_MM);
                }
            }
            Block::Bullet(text) => {
                write_item(&mut cursor, "-", &text, &font);
            }
            Block::Numbered { marker, text } => {
                write_item(&mut cursor, &marker, &text, &font);
            }
            Block::Paragraph(text) => {
                for line in wrap_text(&pdf_safe(&text), BODY_WRAP_CHARS) {
                    cursor.line(&line, BODY_SIZE, LEFT_MM, &font, BODY_LINE_MM);
                }
            }
            Block::Blank => cursor.skip(BLANK_MM),
        }
    }

    cursor.skip(6.0);
    for line in wrap_text(&pdf_safe(footer), 110) {
        cursor.line(&line, FOOTER_SIZE, LEFT_MM, &font, 3.5);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| format!("PDF save error: {e}"))?;
    buf.into_inner()
        .map_err(|e| format!("PDF buffer error: {e}"))
}

/// List item: marker at the left margin, wrapped text on the indent.
fn write_item(cursor: &mut Cursor<'_>, marker: &str, text: &str, font: &IndirectFontRef) {
    let lines = wrap_text(&pdf_safe(text), INDENTED_WRAP_CHARS);
    for (i, line) in lines.iter().enumerate() {
        cursor.ensure_space(BODY_LINE_MM);
        if i == 0 {
            cursor
                .layer
                .use_text(marker, BODY_SIZE, Mm(LEFT_MM + 1.0), Mm(cursor.y), font);
        }
        cursor.line(line, BODY_SIZE, INDENT_MM, font, BODY_LINE_MM);
    }
}

/// Built-in PDF fonts only cover WinAnsi; map common typography to ASCII
/// and drop anything else outside Latin-1.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2013}' | '\u{2014}' => Some('-'),
            '\u{2022}' => Some('-'),
            '\u{2026}' => Some('.'),
            c if (c as u32) < 0x100 && !c.is_control() => Some(c),
            _ => None,
        })
        .collect()
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
