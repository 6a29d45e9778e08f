//! # Flattened Receipt Image
//!
//! A single-page raster rendition of the quote for sharing over chat. The
//! canvas is 1000 px wide and grows downward with the content, so long
//! orders never paginate.
//!
//! ```text
//! ┌──────────────────── 1000 px ───────────────────┐
//! │ ┌────────────────── card ────────────────────┐ │
//! │ │ VT Anunciando                       RECIBO │ │
//! │ │ address / phone        Fecha / Cliente/Tel │ │
//! │ │ ───────────────────────────────────────────│ │
//! │ │ table, alternating row fill                │ │
//! │ │                     ┌ totals + deposit ──┐ │ │
//! │ │ notes panel                                │ │
//! │ │ payments panel, two cards per row          │ │
//! │ │ billing panel (invoice orders)             │ │
//! │ │               footer                       │ │
//! │ └────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Text uses the embedded bitmap font in [`crate::font`], scaled by an
//! integer factor. Layout refuses text the font has no glyph for, so every
//! tagged text is drawn in full. Marks keep their [`ViewField`] tag like
//! the document renderer does.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, instrument};

use vt_core::view::{DeliveryView, RenderableOrderView, ViewField};

use crate::error::{RenderError, RenderResult};
use crate::font::{self, GLYPH_HEIGHT};
use crate::layout::{wrap_text, Align, FontStyle, Rgb, TaggedLayout};

pub const CANVAS_WIDTH: u32 = 1000;
/// Canvases taller than this are refused.
pub const MAX_CANVAS_HEIGHT: u32 = 32_000;

const BACKDROP: Rgb = Rgb(240, 242, 245);
const STRIPE: Rgb = Rgb(250, 251, 252);
const NOTES_FILL: Rgb = Rgb(249, 250, 251);
const PAY_HEADER: Rgb = Rgb(209, 250, 229);
const PAY_BODY: Rgb = Rgb(240, 253, 244);
const BILL_HEADER: Rgb = Rgb(254, 243, 199);
const BILL_BODY: Rgb = Rgb(255, 251, 235);

const LEFT: i32 = 60;
const RIGHT: i32 = 940;
const LINE: i32 = 22;
const SECTION_GAP: i32 = 30;

// =============================================================================
// Marks
// =============================================================================

/// A positioned text run. `y` is the top of the glyph cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageText {
    pub x: i32,
    pub y: i32,
    pub scale: u32,
    pub font: FontStyle,
    pub color: Rgb,
    pub align: Align,
    pub struck: bool,
    pub text: String,
    pub field: Option<ViewField>,
}

impl ImageText {
    pub fn width(&self) -> i32 {
        text_px(&self.text, self.scale)
    }

    fn left(&self) -> i32 {
        self.align.left_edge(self.x as f32, self.width() as f32).round() as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Fill { x: i32, y: i32, w: u32, h: u32, color: Rgb },
    Text(ImageText),
}

fn text_px(text: &str, scale: u32) -> i32 {
    (font::text_width(text) * scale) as i32
}

/// A laid-out receipt image.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptImage {
    width: u32,
    height: u32,
    paints: Vec<Paint>,
}

impl ReceiptImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn paints(&self) -> &[Paint] {
        &self.paints
    }

    pub fn texts(&self) -> impl Iterator<Item = &ImageText> {
        self.paints.iter().filter_map(|paint| match paint {
            Paint::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Rasterizes every paint onto a fresh canvas.
    pub fn rasterize(&self) -> RenderResult<RgbaImage> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyDocument);
        }
        if self.height > MAX_CANVAS_HEIGHT {
            return Err(RenderError::Canvas(format!(
                "height {} exceeds {} px",
                self.height, MAX_CANVAS_HEIGHT
            )));
        }

        let mut canvas = Canvas {
            image: RgbaImage::from_pixel(self.width, self.height, rgba(BACKDROP)),
        };
        for paint in &self.paints {
            match paint {
                Paint::Fill { x, y, w, h, color } => canvas.fill(*x, *y, *w, *h, *color),
                Paint::Text(text) => canvas.text(text),
            }
        }
        Ok(canvas.image)
    }

    /// Rasterizes and encodes as PNG.
    #[instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let image = self.rasterize()?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        debug!(bytes = bytes.len(), "Receipt image encoded");
        Ok(bytes)
    }
}

impl TaggedLayout for ReceiptImage {
    fn tagged_text(&self) -> Vec<(ViewField, &str)> {
        self.texts()
            .filter_map(|text| text.field.map(|field| (field, text.text.as_str())))
            .collect()
    }
}

// =============================================================================
// Rasterizer
// =============================================================================

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color.0, color.1, color.2, 255])
}

struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Fills a rectangle, clipped to the canvas.
    fn fill(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        let (width, height) = self.image.dimensions();
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = ((x as i64 + w as i64).clamp(0, width as i64)) as u32;
        let y1 = ((y as i64 + h as i64).clamp(0, height as i64)) as u32;
        let pixel = rgba(color);

        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, pixel);
            }
        }
    }

    fn text(&mut self, text: &ImageText) {
        let scale = text.scale as i32;
        let left = text.left();
        let mut pen = left;

        // Layout has already refused glyph-less text
        for glyph in text.text.chars().filter_map(font::glyph) {
            for (col, row) in glyph.pixels() {
                let slant = match text.font {
                    FontStyle::Italic => (GLYPH_HEIGHT as i32 - 1 - row) * scale / 3,
                    _ => 0,
                };
                let px = pen + col as i32 * scale + slant;
                let py = text.y + row * scale;
                self.fill(px, py, text.scale, text.scale, text.color);
                if text.font == FontStyle::Bold {
                    self.fill(px + 1, py, text.scale, text.scale, text.color);
                }
            }
            pen += font::ADVANCE as i32 * scale;
        }

        if text.struck {
            let thickness = (text.scale / 2).max(1);
            let mid = text.y + (GLYPH_HEIGHT as i32 * scale) / 2;
            self.fill(left, mid, text.width().max(0) as u32, thickness, text.color);
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

struct Sketch {
    paints: Vec<Paint>,
}

struct Run {
    scale: u32,
    font: FontStyle,
    color: Rgb,
    align: Align,
}

const fn run(scale: u32, font: FontStyle, color: Rgb, align: Align) -> Run {
    Run {
        scale,
        font,
        color,
        align,
    }
}

const BRAND: Run = run(5, FontStyle::Bold, Rgb::BRAND, Align::Left);
const TITLE: Run = run(4, FontStyle::Bold, Rgb::HEADING, Align::Right);
const BODY: Run = run(2, FontStyle::Regular, Rgb::BODY, Align::Left);
const BODY_RIGHT: Run = run(2, FontStyle::Regular, Rgb::BODY, Align::Right);
const LABEL_RIGHT: Run = run(2, FontStyle::Bold, Rgb::HEADING, Align::Right);
const HEAD: Run = run(2, FontStyle::Bold, Rgb::HEADING, Align::Left);
const HEAD_CENTER: Run = run(2, FontStyle::Bold, Rgb::HEADING, Align::Center);
const HEAD_RIGHT: Run = run(2, FontStyle::Bold, Rgb::HEADING, Align::Right);
const CELL_CENTER: Run = run(2, FontStyle::Regular, Rgb::BODY, Align::Center);
const MUTED_RIGHT: Run = run(2, FontStyle::Regular, Rgb::MUTED, Align::Right);
const FREE: Run = run(2, FontStyle::Bold, Rgb::FREE, Align::Right);
const TOTAL: Run = run(3, FontStyle::Bold, Rgb::HEADING, Align::Left);
const TOTAL_RIGHT: Run = run(3, FontStyle::Bold, Rgb::HEADING, Align::Right);
const DEPOSIT_LABEL: Run = run(2, FontStyle::Bold, Rgb::WHITE, Align::Center);
const DEPOSIT_AMOUNT: Run = run(3, FontStyle::Bold, Rgb::WHITE, Align::Center);
const PAY_TITLE: Run = run(2, FontStyle::Bold, Rgb::PAY_TITLE, Align::Left);
const PAY_HEADING: Run = run(2, FontStyle::Bold, Rgb::PAY_TITLE, Align::Center);
const PAY_ACCOUNT: Run = run(3, FontStyle::Bold, Rgb::PAY_ACCOUNT, Align::Left);
const BILL_HEADING: Run = run(2, FontStyle::Bold, Rgb::BILL_TITLE, Align::Center);
const FOOTER: Run = run(2, FontStyle::Italic, Rgb::FOOTER, Align::Center);

impl Sketch {
    fn fill(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        self.paints.push(Paint::Fill { x, y, w, h, color });
    }

    fn text(&mut self, x: i32, y: i32, run: &Run, text: &str, field: Option<ViewField>) {
        self.push_text(x, y, run, text, field, false);
    }

    fn struck(&mut self, x: i32, y: i32, run: &Run, text: &str, field: Option<ViewField>) {
        self.push_text(x, y, run, text, field, true);
    }

    fn push_text(&mut self, x: i32, y: i32, run: &Run, text: &str, field: Option<ViewField>, struck: bool) {
        self.paints.push(Paint::Text(ImageText {
            x,
            y,
            scale: run.scale,
            font: run.font,
            color: run.color,
            align: run.align,
            struck,
            text: text.to_string(),
            field,
        }));
    }
}

/// Lays out the receipt on one canvas sized to fit.
///
/// Fails with [`RenderError::UnsupportedText`] when a text holds a
/// character the bitmap font cannot draw.
pub fn layout_image(view: &RenderableOrderView) -> RenderResult<ReceiptImage> {
    let mut s = Sketch { paints: Vec::new() };

    let y = header(&mut s, view);
    let y = table(&mut s, view, y);
    let y = totals(&mut s, view, y);
    let y = notes(&mut s, view, y);
    let y = payments(&mut s, view, y);
    let y = billing(&mut s, view, y);

    s.text(500, y, &FOOTER, &view.footer, Some(ViewField::Footer));
    let bottom = y + 14 + 40;

    let height = (bottom + 20).max(0) as u32;
    // Card goes under everything else
    s.paints.insert(
        0,
        Paint::Fill {
            x: 20,
            y: 20,
            w: CANVAS_WIDTH - 40,
            h: height.saturating_sub(40),
            color: Rgb::WHITE,
        },
    );

    let image = ReceiptImage {
        width: CANVAS_WIDTH,
        height,
        paints: s.paints,
    };
    for text in image.texts() {
        font::ensure_drawable(&text.text)?;
    }
    debug!(height, items = view.items.len(), "Receipt image laid out");

    Ok(image)
}

fn header(s: &mut Sketch, view: &RenderableOrderView) -> i32 {
    s.text(LEFT, 60, &BRAND, &view.business_name, Some(ViewField::BusinessName));
    s.text(RIGHT, 60, &TITLE, &view.title, Some(ViewField::DocumentTitle));
    s.text(RIGHT, 100, &BODY_RIGHT, &view.invoice_line, Some(ViewField::InvoiceId));

    let mut left_y = 130;
    for (i, line) in view.address_lines.iter().enumerate() {
        s.text(LEFT, left_y, &BODY, line, Some(ViewField::AddressLine(i)));
        left_y += LINE;
    }
    s.text(LEFT, left_y, &BODY, &view.business_phone, Some(ViewField::BusinessPhone));
    left_y += LINE;

    s.text(RIGHT, 130, &BODY_RIGHT, &view.date_line, Some(ViewField::Date));
    let name_width = text_px(&view.client_name, BODY_RIGHT.scale);
    s.text(RIGHT, 152, &BODY_RIGHT, &view.client_name, Some(ViewField::ClientName));
    s.text(RIGHT - name_width - 8, 152, &LABEL_RIGHT, "Cliente:", None);
    s.text(RIGHT, 174, &BODY_RIGHT, &view.client_phone_line, Some(ViewField::ClientPhone));
    let right_y = 174 + LINE;

    let divider = left_y.max(right_y) + 16;
    s.fill(40, divider, 920, 2, Rgb::RULE);
    divider + 24
}

fn table(s: &mut Sketch, view: &RenderableOrderView, y: i32) -> i32 {
    s.fill(40, y, 920, 36, Rgb::HEADER_FILL);
    s.text(52, y + 11, &HEAD, "Descripción", None);
    s.text(580, y + 11, &HEAD_CENTER, "Cant.", None);
    s.text(780, y + 11, &HEAD_RIGHT, "P. Unit.", None);
    s.text(948, y + 11, &HEAD_RIGHT, "Total", None);

    let mut y = y + 36;
    for (i, row) in view.items.iter().enumerate() {
        let lines = wrap_text(&row.description, 460.0, |t| text_px(t, BODY.scale) as f32);
        let row_height = 10 + lines.len().max(1) as i32 * LINE + 4;

        if i % 2 == 1 {
            s.fill(40, y, 920, row_height as u32, STRIPE);
        }
        for (j, line) in lines.iter().enumerate() {
            s.text(52, y + 10 + j as i32 * LINE, &BODY, line, Some(ViewField::ItemDescription(i)));
        }
        s.text(580, y + 10, &CELL_CENTER, &row.quantity, Some(ViewField::ItemQuantity(i)));
        s.text(780, y + 10, &BODY_RIGHT, &row.unit_price, Some(ViewField::ItemUnitPrice(i)));
        s.text(948, y + 10, &BODY_RIGHT, &row.line_total, Some(ViewField::ItemTotal(i)));
        s.fill(40, y + row_height - 1, 920, 1, Rgb::ROW_RULE);

        y += row_height;
    }

    y + 24
}

fn totals(s: &mut Sketch, view: &RenderableOrderView, y: i32) -> i32 {
    let rows = 2 + i32::from(view.tax.is_some());
    let box_height = 164 + 30 * rows;
    s.fill(560, y, 400, box_height as u32, Rgb::WHITE);
    s.fill(560, y, 400, 2, Rgb::RULE);
    s.fill(560, y + box_height - 2, 400, 2, Rgb::RULE);

    let mut ty = y + 20;
    s.text(580, ty, &BODY, "Subtotal:", None);
    s.text(RIGHT, ty, &BODY_RIGHT, &view.subtotal, Some(ViewField::Subtotal));

    ty += 30;
    s.text(580, ty, &BODY, "Envío:", None);
    match &view.delivery {
        DeliveryView::Plain(amount) => {
            s.text(RIGHT, ty, &BODY_RIGHT, amount, Some(ViewField::Delivery));
        }
        DeliveryView::Waived { struck, indicator } => {
            let indicator_width = text_px(indicator, FREE.scale);
            s.text(RIGHT, ty, &FREE, indicator, Some(ViewField::DeliveryIndicator));
            s.struck(RIGHT - indicator_width - 12, ty, &MUTED_RIGHT, struck, Some(ViewField::DeliveryStruck));
        }
    }

    if let Some(tax) = &view.tax {
        ty += 30;
        s.text(580, ty, &BODY, &tax.label, Some(ViewField::TaxLabel));
        s.text(RIGHT, ty, &BODY_RIGHT, &tax.amount, Some(ViewField::TaxAmount));
    }

    ty += 30;
    s.fill(580, ty, 360, 2, Rgb::RULE);
    ty += 14;
    s.text(580, ty, &TOTAL, "Total:", None);
    s.text(RIGHT, ty, &TOTAL_RIGHT, &view.grand_total, Some(ViewField::GrandTotal));

    ty += 40;
    s.fill(580, ty, 360, 70, Rgb::DEPOSIT);
    s.text(760, ty + 12, &DEPOSIT_LABEL, &view.deposit.label, Some(ViewField::DepositLabel));
    s.text(760, ty + 36, &DEPOSIT_AMOUNT, &view.deposit.amount, Some(ViewField::DepositAmount));

    y + box_height + SECTION_GAP
}

fn notes(s: &mut Sketch, view: &RenderableOrderView, y: i32) -> i32 {
    let Some(notes) = &view.notes else {
        return y;
    };

    let lines = wrap_text(notes, 880.0, |t| text_px(t, BODY.scale) as f32);
    let height = 16 + 28 + lines.len() as i32 * LINE + 16;
    s.fill(40, y, 920, height as u32, NOTES_FILL);
    s.text(LEFT, y + 16, &HEAD, vt_core::view::NOTES_LABEL, Some(ViewField::NotesLabel));
    for (j, line) in lines.iter().enumerate() {
        s.text(LEFT, y + 44 + j as i32 * LINE, &BODY, line, Some(ViewField::Notes));
    }

    y + height + SECTION_GAP
}

fn payments(s: &mut Sketch, view: &RenderableOrderView, y: i32) -> i32 {
    const CARD_WIDTH: u32 = 430;
    const CARD_HEIGHT: i32 = 140;
    const CARD_GAP: i32 = 16;

    s.fill(40, y, 920, 44, PAY_HEADER);
    s.text(500, y + 15, &PAY_HEADING, &view.payments_title, Some(ViewField::PaymentsTitle));

    let card_rows = (view.payment_methods.len() as i32 + 1) / 2;
    let body_height = CARD_GAP + card_rows * (CARD_HEIGHT + CARD_GAP);
    s.fill(40, y + 44, 920, body_height as u32, PAY_BODY);

    for (i, method) in view.payment_methods.iter().enumerate() {
        let cx = if i % 2 == 0 { LEFT } else { 510 };
        let cy = y + 44 + CARD_GAP + (i as i32 / 2) * (CARD_HEIGHT + CARD_GAP);
        s.fill(cx, cy, CARD_WIDTH, CARD_HEIGHT as u32, Rgb::WHITE);

        let tx = cx + 15;
        s.text(tx, cy + 15, &PAY_TITLE, &method.title, Some(ViewField::PaymentTitle(i)));
        s.text(tx, cy + 45, &PAY_ACCOUNT, &method.account, Some(ViewField::PaymentAccount(i)));
        s.text(tx, cy + 85, &BODY, &method.bank, Some(ViewField::PaymentBank(i)));
        s.text(tx, cy + 110, &BODY, &method.holder, Some(ViewField::PaymentHolder(i)));
    }

    y + 44 + body_height + SECTION_GAP
}

fn billing(s: &mut Sketch, view: &RenderableOrderView, y: i32) -> i32 {
    let Some(billing) = &view.billing else {
        return y;
    };

    let height = 44 + 16 + 26 * billing.lines.len() as i32 + 8;
    s.fill(40, y, 920, 44, BILL_HEADER);
    s.fill(40, y + 44, 920, (height - 44) as u32, BILL_BODY);
    s.text(500, y + 15, &BILL_HEADING, &billing.title, Some(ViewField::BillingTitle));
    for (i, line) in billing.lines.iter().enumerate() {
        s.text(LEFT, y + 60 + 26 * i as i32, &BODY, line, Some(ViewField::BillingLine(i)));
    }

    y + height + SECTION_GAP
}

/// Lays out and encodes in one step.
pub fn render_png(view: &RenderableOrderView) -> RenderResult<Vec<u8>> {
    layout_image(view)?.to_png()
}
