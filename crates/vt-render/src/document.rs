//! # Paginated Document Renderer
//!
//! Lays a [`RenderableOrderView`] out on A4 pages (millimetres, top-left
//! origin) and serializes the result as PDF. Layout fails when a text holds
//! a character the PDF fonts cannot show, so a laid-out document always
//! draws every text it reports.
//!
//! ## Page Layout
//! ```text
//! ┌──────────────────────────────── 210 mm ─┐
//! │ VT Anunciando                    RECIBO │  25
//! │                                ID: ...  │  28
//! │ address lines            Fecha: ...     │  45
//! │ phone                    Cliente / Tel  │
//! │─────────────────────────────────────────│  75
//! │ Descripción   Cant.  Precio Unit.  Total│  85   table header
//! │ rows, 9 mm apart ...                    │       new page past 250 mm
//! │                        ┌ totals box ──┐ │
//! │                        │ deposit (50%)│ │
//! │ Notas: ...             └──────────────┘ │
//! │ ▓▓▓▓▓▓▓▓ MÉTODOS DE PAGO ▓▓▓▓▓▓▓▓▓▓▓▓▓▓ │       new page past 230 mm
//! │ ▓▓▓▓▓ DATOS PARA FACTURACIÓN ▓▓▓▓▓▓▓▓▓▓ │       invoice orders only
//! │        Gracias por su preferencia       │ 280
//! └─────────────────────────────────────────┘ 297 mm
//! ```
//!
//! Every content-bearing text is tagged with the [`ViewField`] it shows;
//! see [`TaggedLayout`].

use tracing::debug;

use vt_core::view::{DeliveryView, RenderableOrderView, ViewField};

use crate::error::{RenderError, RenderResult};
use crate::layout::{wrap_text, Align, FontStyle, Rgb, TaggedLayout};
use crate::pdf::{text_width_pt, win_ansi, PdfFont, PdfWriter};

// =============================================================================
// Page Geometry
// =============================================================================

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// A line-item row starting below this line goes to a new page.
pub const ROW_BREAK_MM: f32 = 250.0;
/// The payment panel starting below this line goes to a new page.
pub const PANEL_BREAK_MM: f32 = 230.0;
/// Where content resumes on a continuation page.
pub const CONTINUE_AT_MM: f32 = 20.0;
/// Nothing but the footer is drawn below this line.
const CONTENT_LIMIT_MM: f32 = 277.0;
const FOOTER_MM: f32 = 280.0;

const DESCRIPTION_WIDTH_MM: f32 = 95.0;
const NOTES_WIDTH_MM: f32 = 170.0;
const ROW_HEIGHT_MM: f32 = 9.0;
const WRAPPED_LINE_MM: f32 = 3.5;

/// Width of `text` in millimetres at `size` points.
pub fn text_width_mm(text: &str, size: f32) -> f32 {
    text_width_pt(text, size) * 25.4 / 72.0
}

// =============================================================================
// Document Model
// =============================================================================

/// Font, size (points), colour and anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub font: FontStyle,
    pub color: Rgb,
    pub align: Align,
}

const fn style(size: f32, font: FontStyle, color: Rgb, align: Align) -> TextStyle {
    TextStyle {
        size,
        font,
        color,
        align,
    }
}

const BRAND: TextStyle = style(24.0, FontStyle::Bold, Rgb::BRAND, Align::Left);
const TITLE: TextStyle = style(16.0, FontStyle::Bold, Rgb::HEADING, Align::Right);
const BODY_LEFT: TextStyle = style(9.0, FontStyle::Regular, Rgb::BODY, Align::Left);
const BODY_RIGHT: TextStyle = style(9.0, FontStyle::Regular, Rgb::BODY, Align::Right);
const CLIENT_LABEL: TextStyle = style(10.0, FontStyle::Bold, Rgb::HEADING, Align::Right);
const TABLE_HEAD: TextStyle = style(9.0, FontStyle::Bold, Rgb::HEADING, Align::Left);
const ROW: TextStyle = style(8.5, FontStyle::Regular, Rgb::BODY, Align::Left);
const STRUCK: TextStyle = style(9.0, FontStyle::Regular, Rgb::MUTED, Align::Right);
const FREE: TextStyle = style(9.0, FontStyle::Bold, Rgb::FREE, Align::Right);
const TOTAL: TextStyle = style(11.0, FontStyle::Bold, Rgb::HEADING, Align::Left);
const DEPOSIT_LABEL: TextStyle = style(9.0, FontStyle::Bold, Rgb::WHITE, Align::Center);
const DEPOSIT_AMOUNT: TextStyle = style(11.0, FontStyle::Bold, Rgb::WHITE, Align::Center);
const SECTION_LABEL: TextStyle = style(10.0, FontStyle::Bold, Rgb::HEADING, Align::Left);
const PANEL_TITLE: TextStyle = style(10.0, FontStyle::Bold, Rgb::WHITE, Align::Center);
const METHOD_TITLE: TextStyle = style(9.0, FontStyle::Bold, Rgb::PAY_TITLE, Align::Left);
const METHOD_ACCOUNT: TextStyle = style(11.0, FontStyle::Bold, Rgb::PAY_ACCOUNT, Align::Left);
const BILLING_TITLE: TextStyle = style(10.0, FontStyle::Bold, Rgb::BILL_TITLE, Align::Center);
const FOOTER: TextStyle = style(8.0, FontStyle::Italic, Rgb::FOOTER, Align::Center);

/// A positioned text run. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
    pub text: String,
    pub field: Option<ViewField>,
}

/// One drawing operation on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Fill { x: f32, y: f32, w: f32, h: f32, color: Rgb },
    Frame { x: f32, y: f32, w: f32, h: f32, color: Rgb, width: f32 },
    Rule { x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32 },
    Text(TextMark),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub marks: Vec<Mark>,
}

impl Page {
    fn blank() -> Self {
        Page {
            marks: vec![Mark::Fill {
                x: 0.0,
                y: 0.0,
                w: PAGE_WIDTH_MM,
                h: PAGE_HEIGHT_MM,
                color: Rgb::PAGE,
            }],
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextMark> {
        self.marks.iter().filter_map(|mark| match mark {
            Mark::Text(text) => Some(text),
            _ => None,
        })
    }
}

/// A laid-out, paginated quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
    title: String,
}

impl Document {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes the document as PDF.
    pub fn to_pdf(&self) -> RenderResult<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        let mut writer = PdfWriter::new(&self.title)?;
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                writer.add_page();
            }
            for mark in &page.marks {
                draw_mark(&writer, mark)?;
            }
        }

        writer.finish()
    }
}

impl TaggedLayout for Document {
    fn tagged_text(&self) -> Vec<(ViewField, &str)> {
        self.pages
            .iter()
            .flat_map(Page::texts)
            .filter_map(|text| text.field.map(|field| (field, text.text.as_str())))
            .collect()
    }
}

fn draw_mark(writer: &PdfWriter, mark: &Mark) -> RenderResult<()> {
    // Flip to PDF's bottom-left origin
    let flip = |mm: f32| PAGE_HEIGHT_MM - mm;

    match mark {
        Mark::Fill { x, y, w, h, color } => {
            writer.fill_rect(*x, flip(y + h), *w, *h, *color);
        }
        Mark::Frame {
            x,
            y,
            w,
            h,
            color,
            width,
        } => {
            writer.stroke_rect(*x, flip(y + h), *w, *h, *color, *width);
        }
        Mark::Rule {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            writer.line((*x1, flip(*y1)), (*x2, flip(*y2)), *color, *width);
        }
        Mark::Text(text) => {
            let width = text_width_mm(&text.text, text.style.size);
            let left = text.style.align.left_edge(text.x, width);
            writer.text(
                PdfFont::from(text.style.font),
                text.style.size,
                (left, flip(text.y)),
                text.style.color,
                &text.text,
            )?;
        }
    }

    Ok(())
}

// =============================================================================
// Layout
// =============================================================================

/// Page-by-page layout state.
struct Composer {
    done: Vec<Page>,
    page: Page,
}

impl Composer {
    fn new() -> Self {
        Composer {
            done: Vec::new(),
            page: Page::blank(),
        }
    }

    /// Starts a new page and returns the y to continue at.
    fn break_page(&mut self) -> f32 {
        let finished = std::mem::replace(&mut self.page, Page::blank());
        self.done.push(finished);
        CONTINUE_AT_MM
    }

    fn text(&mut self, x: f32, y: f32, style: TextStyle, text: &str, field: Option<ViewField>) {
        self.page.marks.push(Mark::Text(TextMark {
            x,
            y,
            style,
            text: text.to_string(),
            field,
        }));
    }

    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.page.marks.push(Mark::Fill { x, y, w, h, color });
    }

    fn frame(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, width: f32) {
        self.page.marks.push(Mark::Frame {
            x,
            y,
            w,
            h,
            color,
            width,
        });
    }

    fn rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32) {
        self.page.marks.push(Mark::Rule {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        });
    }

    fn finish(mut self) -> Vec<Page> {
        self.done.push(self.page);
        self.done
    }
}

/// Lays out the quote on as many A4 pages as it needs.
///
/// Fails with [`RenderError::UnsupportedText`] when any text falls outside
/// WinAnsiEncoding.
pub fn layout_document(view: &RenderableOrderView) -> RenderResult<Document> {
    let mut c = Composer::new();

    let table_y = header(&mut c, view);
    let y = line_items(&mut c, view, table_y);
    let y = totals(&mut c, view, y);
    let y = notes(&mut c, view, y);
    let y = payments(&mut c, view, y);
    billing(&mut c, view, y);

    c.text(105.0, FOOTER_MM, FOOTER, &view.footer, Some(ViewField::Footer));

    let pages = c.finish();
    for text in pages.iter().flat_map(Page::texts) {
        win_ansi(&text.text)?;
    }
    debug!(pages = pages.len(), items = view.items.len(), "Document laid out");

    Ok(Document {
        pages,
        title: view.invoice_line.clone(),
    })
}

/// Business and client blocks. Returns the y of the table header.
fn header(c: &mut Composer, view: &RenderableOrderView) -> f32 {
    c.text(20.0, 25.0, BRAND, &view.business_name, Some(ViewField::BusinessName));
    c.text(190.0, 22.0, TITLE, &view.title, Some(ViewField::DocumentTitle));
    c.text(190.0, 28.0, BODY_RIGHT, &view.invoice_line, Some(ViewField::InvoiceId));

    let mut y = 45.0;
    for (i, line) in view.address_lines.iter().enumerate() {
        c.text(20.0, y, BODY_LEFT, line, Some(ViewField::AddressLine(i)));
        y += 5.0;
    }
    let phone_y = y + 3.0;
    c.text(20.0, phone_y, BODY_LEFT, &view.business_phone, Some(ViewField::BusinessPhone));

    c.text(190.0, 45.0, BODY_RIGHT, &view.date_line, Some(ViewField::Date));
    c.text(190.0, 53.0, CLIENT_LABEL, "Cliente:", None);
    c.text(190.0, 58.0, BODY_RIGHT, &view.client_name, Some(ViewField::ClientName));
    c.text(190.0, 63.0, BODY_RIGHT, &view.client_phone_line, Some(ViewField::ClientPhone));

    let divider = (phone_y + 12.0).max(75.0);
    c.rule(20.0, divider, 190.0, divider, Rgb::RULE, 0.5);

    divider + 10.0
}

/// Table header and one row per line item. Returns the y below the table.
fn line_items(c: &mut Composer, view: &RenderableOrderView, table_y: f32) -> f32 {
    c.fill(20.0, table_y, 170.0, 8.0, Rgb::HEADER_FILL);
    let head_y = table_y + 5.5;
    c.text(22.0, head_y, TABLE_HEAD, "Descripción", None);
    c.text(125.0, head_y, TextStyle { align: Align::Center, ..TABLE_HEAD }, "Cant.", None);
    c.text(160.0, head_y, TextStyle { align: Align::Right, ..TABLE_HEAD }, "Precio Unit.", None);
    c.text(188.0, head_y, TextStyle { align: Align::Right, ..TABLE_HEAD }, "Total", None);

    let mut y = table_y + 10.0;
    for (i, row) in view.items.iter().enumerate() {
        let lines = wrap_text(&row.description, DESCRIPTION_WIDTH_MM, |s| {
            text_width_mm(s, ROW.size)
        });
        let row_height = ROW_HEIGHT_MM + lines.len().saturating_sub(1) as f32 * WRAPPED_LINE_MM;

        if y > ROW_BREAK_MM || y + row_height > CONTENT_LIMIT_MM {
            y = c.break_page();
        }

        for (j, line) in lines.iter().enumerate() {
            let line_y = y + 4.0 + j as f32 * WRAPPED_LINE_MM;
            c.text(22.0, line_y, ROW, line, Some(ViewField::ItemDescription(i)));
        }
        c.text(125.0, y + 4.0, TextStyle { align: Align::Center, ..ROW }, &row.quantity, Some(ViewField::ItemQuantity(i)));
        c.text(160.0, y + 4.0, TextStyle { align: Align::Right, ..ROW }, &row.unit_price, Some(ViewField::ItemUnitPrice(i)));
        c.text(188.0, y + 4.0, TextStyle { align: Align::Right, ..ROW }, &row.line_total, Some(ViewField::ItemTotal(i)));

        c.rule(20.0, y + row_height - 2.0, 190.0, y + row_height - 2.0, Rgb::ROW_RULE, 0.3);
        y += row_height;
    }

    y
}

/// Totals box and deposit block. Returns the y where the next section starts.
fn totals(c: &mut Composer, view: &RenderableOrderView, y: f32) -> f32 {
    let waived = matches!(view.delivery, DeliveryView::Waived { .. });
    let mut box_height = 24.0;
    if view.tax.is_some() {
        box_height += 6.0;
    }
    if waived {
        box_height += 4.0;
    }

    let mut y = y + 5.0;
    // Box, total rule and deposit block stay together
    if y + box_height + 16.0 > CONTENT_LIMIT_MM {
        y = c.break_page();
    }

    c.fill(125.0, y, 65.0, box_height, Rgb::WHITE);
    c.frame(125.0, y, 65.0, box_height, Rgb::RULE, 0.5);

    let mut ty = y + 6.0;
    c.text(130.0, ty, BODY_LEFT, "Subtotal:", None);
    c.text(185.0, ty, BODY_RIGHT, &view.subtotal, Some(ViewField::Subtotal));

    ty += 6.0;
    c.text(130.0, ty, BODY_LEFT, "Envío:", None);
    match &view.delivery {
        DeliveryView::Plain(amount) => {
            c.text(185.0, ty, BODY_RIGHT, amount, Some(ViewField::Delivery));
        }
        DeliveryView::Waived { struck, indicator } => {
            c.text(185.0, ty, STRUCK, struck, Some(ViewField::DeliveryStruck));
            let width = text_width_mm(struck, STRUCK.size);
            c.rule(185.0 - width, ty - 1.0, 185.0, ty - 1.0, Rgb::MUTED, 0.3);
            c.text(185.0, ty + 4.0, FREE, indicator, Some(ViewField::DeliveryIndicator));
            ty += 4.0;
        }
    }

    if let Some(tax) = &view.tax {
        ty += 6.0;
        c.text(130.0, ty, BODY_LEFT, &tax.label, Some(ViewField::TaxLabel));
        c.text(185.0, ty, BODY_RIGHT, &tax.amount, Some(ViewField::TaxAmount));
    }

    ty += 6.0;
    c.rule(130.0, ty - 2.0, 185.0, ty - 2.0, Rgb::RULE, 0.5);
    c.text(130.0, ty + 2.0, TOTAL, "Total:", None);
    c.text(185.0, ty + 2.0, TextStyle { align: Align::Right, ..TOTAL }, &view.grand_total, Some(ViewField::GrandTotal));

    ty += 8.0;
    c.fill(125.0, ty, 65.0, 12.0, Rgb::DEPOSIT);
    c.text(157.5, ty + 4.0, DEPOSIT_LABEL, &view.deposit.label, Some(ViewField::DepositLabel));
    c.text(157.5, ty + 9.0, DEPOSIT_AMOUNT, &view.deposit.amount, Some(ViewField::DepositAmount));

    ty + 20.0
}

fn notes(c: &mut Composer, view: &RenderableOrderView, y: f32) -> f32 {
    let Some(notes) = &view.notes else {
        return y;
    };

    let mut y = y;
    if y > PANEL_BREAK_MM {
        y = c.break_page();
    }

    c.text(20.0, y, SECTION_LABEL, vt_core::view::NOTES_LABEL, Some(ViewField::NotesLabel));

    let lines = wrap_text(notes, NOTES_WIDTH_MM, |s| text_width_mm(s, BODY_LEFT.size));
    let mut line_y = y + 6.0;
    for line in &lines {
        if line_y > CONTENT_LIMIT_MM {
            line_y = c.break_page();
        }
        c.text(20.0, line_y, BODY_LEFT, line, Some(ViewField::Notes));
        line_y += 5.0;
    }

    line_y + 15.0
}

fn payments(c: &mut Composer, view: &RenderableOrderView, y: f32) -> f32 {
    let mut y = y;
    if y > PANEL_BREAK_MM {
        y = c.break_page();
    }

    c.fill(20.0, y, 170.0, 8.0, Rgb::PAY_FILL);
    c.text(105.0, y + 5.5, PANEL_TITLE, &view.payments_title, Some(ViewField::PaymentsTitle));
    y += 12.0;

    for (i, method) in view.payment_methods.iter().enumerate() {
        if i > 0 {
            y += 10.0;
        }
        if y + 16.0 > CONTENT_LIMIT_MM {
            y = c.break_page();
        }

        c.text(20.0, y, METHOD_TITLE, &method.title, Some(ViewField::PaymentTitle(i)));
        y += 6.0;
        c.text(20.0, y, METHOD_ACCOUNT, &method.account, Some(ViewField::PaymentAccount(i)));
        y += 5.0;
        c.text(20.0, y, BODY_LEFT, &method.bank, Some(ViewField::PaymentBank(i)));
        y += 5.0;
        c.text(20.0, y, BODY_LEFT, &method.holder, Some(ViewField::PaymentHolder(i)));
    }

    y
}

fn billing(c: &mut Composer, view: &RenderableOrderView, y: f32) {
    let Some(billing) = &view.billing else {
        return;
    };

    let mut y = y + 12.0;
    let needed = 12.0 + billing.lines.len() as f32 * 5.0;
    if y + needed > CONTENT_LIMIT_MM {
        y = c.break_page();
    }

    c.fill(20.0, y, 170.0, 8.0, Rgb::BILL_FILL);
    c.text(105.0, y + 5.5, BILLING_TITLE, &billing.title, Some(ViewField::BillingTitle));
    y += 12.0;

    for (i, line) in billing.lines.iter().enumerate() {
        c.text(20.0, y, BODY_LEFT, line, Some(ViewField::BillingLine(i)));
        y += 5.0;
    }
}

/// Lays out and serializes in one step.
pub fn render_pdf(view: &RenderableOrderView) -> RenderResult<Vec<u8>> {
    layout_document(view)?.to_pdf()
}

// =============================================================================
// Unit Tests
// =============================================================================
