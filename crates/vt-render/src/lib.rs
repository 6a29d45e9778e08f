//! # vt-render: Document and Image Back-ends
//!
//! Two independent layouts of the same [`RenderableOrderView`]:
//!
//! - [`document`] - paginated A4 quote, serialized as PDF by [`pdf`]
//! - [`receipt`] - single-page raster receipt, encoded as PNG
//!
//! Neither layout computes anything: every string it draws comes from the
//! view. Both remember which [`ViewField`](vt_core::view::ViewField) each
//! text came from, so [`TaggedLayout::fields`] of either artifact can be
//! compared with the view's own field set.
//!
//! ```rust,ignore
//! let view = RenderableOrderView::build(&order, &profile, &policy);
//! let pdf = vt_render::render_document_pdf(&view)?;
//! let png = vt_render::render_receipt_png(&view)?;
//! ```

pub mod document;
pub mod error;
pub mod font;
pub mod layout;
pub mod pdf;
pub mod receipt;

pub use document::{layout_document, Document};
pub use error::{RenderError, RenderResult};
pub use layout::TaggedLayout;
pub use receipt::{layout_image, ReceiptImage};

use vt_core::view::RenderableOrderView;

/// Paginated quote as PDF bytes.
pub fn render_document_pdf(view: &RenderableOrderView) -> RenderResult<Vec<u8>> {
    document::render_pdf(view)
}

/// Flattened receipt as PNG bytes.
pub fn render_receipt_png(view: &RenderableOrderView) -> RenderResult<Vec<u8>> {
    receipt::render_png(view)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;
    use vt_core::{
        aggregate, build_line_items, BusinessProfile, Catalog, ClientInfo, InvoiceId,
        OrderContext, PricingPolicy, Quantities, RenderableOrderView,
    };

    /// A small priced order through the real pipeline.
    pub(crate) fn fixture_view(tax_required: bool) -> RenderableOrderView {
        let catalog = Catalog::vt_default();
        let quantities = Quantities::from_pairs([("imanes_normal_chico", 50), ("llaveros", 120)]);
        let items = build_line_items(&catalog, &quantities);
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let context = OrderContext {
            client: ClientInfo::new("Ana López", "55 1234 5678", date),
            tax_required,
            invoice_id: InvoiceId::from_timestamp("VT", date.and_hms_opt(9, 30, 0).unwrap()),
        };
        let policy = PricingPolicy::default();
        let order = aggregate(items, context, &policy);
        RenderableOrderView::build(&order, &BusinessProfile::default(), &policy)
    }
}
