//! PDF output
//!
//! [`PdfWriter`] draws onto A4 pages through `printpdf`, which owns the
//! object graph, the builtin Helvetica faces and the cross-reference table.
//! Text goes out in WinAnsiEncoding; [`win_ansi`] checks every run against
//! windows-1252 with `encoding_rs` first, so a character the builtin fonts
//! cannot show is an error instead of a silently replaced glyph.
//!
//! ```text
//! PdfWriter::new(title) ──► page 1 ─► fill_rect / stroke_rect / line / text
//!        add_page()     ──► page 2 ─► ...
//!        finish()       ──► Vec<u8>
//! ```
//!
//! Coordinates are millimetres with the origin at the bottom-left corner.

use encoding_rs::WINDOWS_1252;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect,
};
use tracing::instrument;

use crate::error::{RenderError, RenderResult};
use crate::font::base_letter;
use crate::layout::{FontStyle, Rgb};

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;

const LAYER: &str = "Quote";
const TARGET: &str = "PDF (WinAnsiEncoding)";

// === Fonts ===

/// The three builtin faces the writer registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl From<FontStyle> for PdfFont {
    fn from(style: FontStyle) -> Self {
        match style {
            FontStyle::Regular => PdfFont::Helvetica,
            FontStyle::Bold => PdfFont::HelveticaBold,
            FontStyle::Italic => PdfFont::HelveticaOblique,
        }
    }
}

impl From<PdfFont> for BuiltinFont {
    fn from(font: PdfFont) -> Self {
        match font {
            PdfFont::Helvetica => BuiltinFont::Helvetica,
            PdfFont::HelveticaBold => BuiltinFont::HelveticaBold,
            PdfFont::HelveticaOblique => BuiltinFont::HelveticaOblique,
        }
    }
}

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Width of one character in 1/1000 em. Accented letters measure as their
/// base letter; characters outside windows-1252 measure as zero.
/// Bold and oblique text is measured with the regular widths.
fn char_width(c: char) -> u32 {
    let Some(byte) = win_ansi_byte(c) else {
        return 0;
    };
    let ascii = match byte {
        0x20..=0x7E => Some(byte as char),
        _ => base_letter(c).filter(|base| (' '..='~').contains(base)),
    };
    match ascii {
        Some(base) => HELVETICA_WIDTHS[(base as u32 - 32) as usize] as u32,
        None => 556,
    }
}

/// Width of `text` in points at `size`.
pub fn text_width_pt(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(char_width).sum();
    units as f32 * size / 1000.0
}

// === Encoding ===

/// The windows-1252 byte for `c`, if it has one.
fn win_ansi_byte(c: char) -> Option<u8> {
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    match (had_errors, &*bytes) {
        (false, [byte]) => Some(*byte),
        _ => None,
    }
}

/// Encodes `text` as WinAnsi bytes, failing on the first character the
/// builtin fonts cannot show.
pub fn win_ansi(text: &str) -> RenderResult<Vec<u8>> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if !had_errors {
        return Ok(bytes.into_owned());
    }

    let character = text
        .chars()
        .find(|c| win_ansi_byte(*c).is_none())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Err(RenderError::UnsupportedText {
        target: TARGET,
        character,
        text: text.to_string(),
    })
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

// === Writer ===

/// A4 PDF writer
///
/// Starts with one page; [`PdfWriter::add_page`] moves drawing to a fresh
/// page. Stroke widths are given in millimetres like everything else.
pub struct PdfWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    layer: PdfLayerReference,
    pages: usize,
}

impl PdfWriter {
    pub fn new(title: &str) -> RenderResult<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), LAYER);
        let regular = doc.add_builtin_font(PdfFont::Helvetica.into())?;
        let bold = doc.add_builtin_font(PdfFont::HelveticaBold.into())?;
        let oblique = doc.add_builtin_font(PdfFont::HelveticaOblique.into())?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(PdfWriter {
            doc,
            regular,
            bold,
            oblique,
            layer,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Continues on a new A4 page
    pub fn add_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    /// Filled rectangle; `(x, y)` is the bottom-left corner
    pub fn fill_rect(&self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.layer.set_fill_color(pdf_color(color));
        self.layer
            .add_rect(Rect::new(Mm(x), Mm(y), Mm(x + w), Mm(y + h)).with_mode(PaintMode::Fill));
    }

    /// Outlined rectangle; `(x, y)` is the bottom-left corner
    pub fn stroke_rect(&self, x: f32, y: f32, w: f32, h: f32, color: Rgb, width: f32) {
        self.stroke_style(color, width);
        self.layer
            .add_rect(Rect::new(Mm(x), Mm(y), Mm(x + w), Mm(y + h)).with_mode(PaintMode::Stroke));
    }

    pub fn line(&self, from: (f32, f32), to: (f32, f32), color: Rgb, width: f32) {
        self.stroke_style(color, width);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }

    /// Text with its baseline starting at `(x, y)`
    pub fn text(
        &self,
        font: PdfFont,
        size: f32,
        (x, y): (f32, f32),
        color: Rgb,
        text: &str,
    ) -> RenderResult<()> {
        win_ansi(text)?;
        self.layer.set_fill_color(pdf_color(color));
        self.layer.use_text(text, size, Mm(x), Mm(y), self.font(font));
        Ok(())
    }

    /// Serializes the document
    #[instrument(skip(self), fields(pages = self.pages))]
    pub fn finish(self) -> RenderResult<Vec<u8>> {
        Ok(self.doc.save_to_bytes()?)
    }

    fn font(&self, font: PdfFont) -> &IndirectFontRef {
        match font {
            PdfFont::Helvetica => &self.regular,
            PdfFont::HelveticaBold => &self.bold,
            PdfFont::HelveticaOblique => &self.oblique,
        }
    }

    fn stroke_style(&self, color: Rgb, width: f32) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(mm_to_pt(width));
    }
}
