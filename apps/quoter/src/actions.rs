//! # Quote Actions
//!
//! The user-facing operations of the quote form.
//!
//! ## Action Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Quote Actions                                   │
//! │                                                                         │
//! │  preview (every keystroke)                                              │
//! │     quantities ──► line items ──► totals          no validation, no I/O │
//! │                                                                         │
//! │  generate_document / generate_image / copy_image                        │
//! │     QuoteRequest                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │     build_order ── validation fails ──► ApiError (nothing rendered)    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │     Order + RenderableOrderView                                         │
//! │         │                                                               │
//! │         ├──► PDF ──► ArtifactSink                                       │
//! │         └──► PNG ──► ArtifactSink / Clipboard ── fails ──► ArtifactSink │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every action builds the order through the same [`QuoteService::build_order`],
//! so the three outputs can never disagree about a figure.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use vt_core::line_item::QuantityField;
use vt_core::validation::{validate_client, validate_line_items};
use vt_core::{
    aggregate, build_line_items, BusinessProfile, Catalog, InvoiceId, LineItem, Order,
    OrderContext, OrderTotals, PriceHint, PricingPolicy, Quantities, RenderableOrderView,
};

use crate::config::{ConfigResult, QuoterConfig};
use crate::delivery::{Artifact, ArtifactSink, Clipboard, FileSink, UnavailableClipboard};
use crate::error::ApiError;

pub const DOCUMENT_SAVED: &str = "✅ Recibo PDF descargado exitosamente.";
pub const IMAGE_SAVED: &str = "✅ Imagen descargada exitosamente.";
pub const IMAGE_COPIED: &str = "✅ Imagen copiada al portapapeles. Puedes pegarla donde necesites.";
pub const IMAGE_SAVED_MOBILE: &str =
    "✅ Imagen guardada. Puedes encontrarla en tu galería y compartirla por WhatsApp.";
pub const IMAGE_FALLBACK_SAVED: &str =
    "✅ Imagen descargada. Puedes compartirla desde tu carpeta de descargas.";

const DOCUMENT_FAILED: &str = "Error al generar el PDF: ";
const IMAGE_FAILED: &str = "Error al generar la imagen: ";
const COPY_FAILED: &str = "Error al copiar la imagen: ";

// =============================================================================
// Request Types
// =============================================================================

/// The client platform an action was triggered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Desktop,
    /// Phones and tablets: images go to the gallery instead of the clipboard.
    Mobile,
}

impl Platform {
    /// Classifies a browser user agent.
    pub fn from_user_agent(user_agent: &str) -> Self {
        const MOBILE_MARKERS: [&str; 4] = ["iPhone", "iPad", "iPod", "Android"];
        if MOBILE_MARKERS.iter().any(|m| user_agent.contains(m)) {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }
}

/// Everything the quote form submits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    /// `YYYY-MM-DD`. Required by the generating actions only.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub requires_invoice: bool,
    /// Raw quantity per product id, as a number or the input text.
    #[serde(default)]
    pub quantities: BTreeMap<String, QuantityField>,
    #[serde(default)]
    pub platform: Platform,
}

impl QuoteRequest {
    pub fn parsed_quantities(&self) -> Quantities {
        Quantities::from_fields(&self.quantities)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Hint next to one product's quantity input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductHint {
    pub product_id: String,
    pub hint: PriceHint,
    /// Rendered hint text, empty when nothing was entered.
    pub text: String,
}

/// Live-preview state of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotePreview {
    pub hints: Vec<ProductHint>,
    pub line_items: Vec<LineItem>,
    pub totals: OrderTotals,
}

/// A validated, priced order and the view both renderers draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuote {
    pub order: Order,
    pub view: RenderableOrderView,
}

/// How an artifact reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Saved,
    Copied,
    SavedToGallery,
    /// The clipboard failed and the file was saved instead.
    FallbackSaved,
}

/// The result of a generating action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub delivery: Delivery,
    pub invoice_id: String,
    pub filename: String,
    /// Where the file was written, when one was.
    pub path: Option<PathBuf>,
    /// Confirmation shown to the user.
    pub message: String,
}

// =============================================================================
// Quote Service
// =============================================================================

/// Prices quotes and delivers their artifacts.
///
/// Holds only immutable configuration plus the two delivery seams, so one
/// service can serve concurrent actions.
pub struct QuoteService {
    catalog: Catalog,
    profile: BusinessProfile,
    policy: PricingPolicy,
    invoice_prefix: String,
    sink: Arc<dyn ArtifactSink>,
    clipboard: Arc<dyn Clipboard>,
}

impl QuoteService {
    pub fn new(
        catalog: Catalog,
        profile: BusinessProfile,
        policy: PricingPolicy,
        invoice_prefix: impl Into<String>,
        sink: Arc<dyn ArtifactSink>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        QuoteService {
            catalog,
            profile,
            policy,
            invoice_prefix: invoice_prefix.into(),
            sink,
            clipboard,
        }
    }

    /// Service writing into the configured output directory, headless clipboard.
    pub fn from_config(config: &QuoterConfig) -> ConfigResult<Self> {
        Ok(QuoteService::new(
            config.build_catalog()?,
            config.business.clone(),
            config.pricing,
            config.output.invoice_prefix.clone(),
            Arc::new(FileSink::new(&config.output.dir)),
            Arc::new(UnavailableClipboard),
        ))
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Prices whatever the form holds. Never validates, never writes.
    pub fn preview(&self, request: &QuoteRequest) -> QuotePreview {
        let quantities = request.parsed_quantities();

        let hints = self
            .catalog
            .iter()
            .map(|product| {
                let hint = PriceHint::for_quantity(quantities.get(&product.id), &product.tier_table);
                ProductHint {
                    product_id: product.id.clone(),
                    text: hint.to_string(),
                    hint,
                }
            })
            .collect();

        let line_items = build_line_items(&self.catalog, &quantities);
        let totals = OrderTotals::compute(&line_items, request.requires_invoice, &self.policy);

        QuotePreview {
            hints,
            line_items,
            totals,
        }
    }

    // =========================================================================
    // Order Building
    // =========================================================================

    /// Validates the request and prices it, stamping the current local time.
    pub fn build_order(&self, request: &QuoteRequest) -> Result<PreparedQuote, ApiError> {
        self.build_order_at(request, Local::now().naive_local())
    }

    /// Validates the request and prices it with a fixed invoice timestamp.
    ///
    /// Validation runs in form order and stops at the first failure.
    pub fn build_order_at(
        &self,
        request: &QuoteRequest,
        at: NaiveDateTime,
    ) -> Result<PreparedQuote, ApiError> {
        let client = validate_client(
            &request.client_name,
            &request.client_phone,
            request.date.as_deref(),
            &request.notes,
        )?;

        let line_items = build_line_items(&self.catalog, &request.parsed_quantities());
        validate_line_items(&line_items)?;

        let context = OrderContext {
            client,
            tax_required: request.requires_invoice,
            invoice_id: InvoiceId::from_timestamp(&self.invoice_prefix, at),
        };
        let order = aggregate(line_items, context, &self.policy);
        let view = RenderableOrderView::build(&order, &self.profile, &self.policy);

        debug!(
            invoice_id = %order.invoice_id(),
            items = order.line_items().len(),
            grand_total = %order.totals().grand_total,
            "Order built"
        );

        Ok(PreparedQuote { order, view })
    }

    // =========================================================================
    // Generating Actions
    // =========================================================================

    /// Builds the paginated PDF and saves it.
    #[instrument(skip(self, request), fields(invoice = request.requires_invoice))]
    pub async fn generate_document(&self, request: &QuoteRequest) -> Result<ActionOutcome, ApiError> {
        let quote = self.build_order(request).map_err(|e| e.during(DOCUMENT_FAILED))?;
        self.deliver_document(&quote).await.map_err(|e| e.during(DOCUMENT_FAILED))
    }

    /// Builds the flattened PNG and saves it.
    #[instrument(skip(self, request), fields(invoice = request.requires_invoice))]
    pub async fn generate_image(&self, request: &QuoteRequest) -> Result<ActionOutcome, ApiError> {
        let quote = self.build_order(request).map_err(|e| e.during(IMAGE_FAILED))?;
        let artifact = render_image(&quote).map_err(|e| e.during(IMAGE_FAILED))?;
        self.save(&quote, artifact, Delivery::Saved, IMAGE_SAVED)
            .await
            .map_err(|e| e.during(IMAGE_FAILED))
    }

    /// Builds the PNG and puts it on the clipboard.
    ///
    /// On mobile the image is saved directly. When the clipboard write
    /// fails the image is saved as a file and the outcome says so.
    #[instrument(skip(self, request), fields(platform = ?request.platform))]
    pub async fn copy_image(&self, request: &QuoteRequest) -> Result<ActionOutcome, ApiError> {
        let quote = self.build_order(request).map_err(|e| e.during(COPY_FAILED))?;
        let artifact = render_image(&quote).map_err(|e| e.during(COPY_FAILED))?;

        if request.platform == Platform::Mobile {
            return self
                .save(&quote, artifact, Delivery::SavedToGallery, IMAGE_SAVED_MOBILE)
                .await
                .map_err(|e| e.during(COPY_FAILED));
        }

        match self.clipboard.copy_image(&artifact).await {
            Ok(()) => {
                info!(invoice_id = %quote.order.invoice_id(), "Image copied to clipboard");
                Ok(ActionOutcome {
                    delivery: Delivery::Copied,
                    invoice_id: quote.order.invoice_id().to_string(),
                    filename: artifact.filename,
                    path: None,
                    message: IMAGE_COPIED.to_string(),
                })
            }
            Err(err) => {
                warn!(error = %err, "Clipboard write failed, saving the image instead");
                self.save(&quote, artifact, Delivery::FallbackSaved, IMAGE_FALLBACK_SAVED)
                    .await
                    .map_err(|e| e.during(COPY_FAILED))
            }
        }
    }

    /// Builds the order once and saves both the PDF and the PNG, so the two
    /// files share one invoice id.
    #[instrument(skip(self, request), fields(invoice = request.requires_invoice))]
    pub async fn generate_both(&self, request: &QuoteRequest) -> Result<Vec<ActionOutcome>, ApiError> {
        let quote = self.build_order(request).map_err(|e| e.during(DOCUMENT_FAILED))?;
        let document = self
            .deliver_document(&quote)
            .await
            .map_err(|e| e.during(DOCUMENT_FAILED))?;

        let artifact = render_image(&quote).map_err(|e| e.during(IMAGE_FAILED))?;
        let image = self
            .save(&quote, artifact, Delivery::Saved, IMAGE_SAVED)
            .await
            .map_err(|e| e.during(IMAGE_FAILED))?;

        Ok(vec![document, image])
    }

    async fn deliver_document(&self, quote: &PreparedQuote) -> Result<ActionOutcome, ApiError> {
        let document = vt_render::layout_document(&quote.view)?;
        debug!(pages = document.page_count(), "Document paginated");

        let artifact = Artifact::pdf(quote.view.document_filename.clone(), document.to_pdf()?);
        self.save(quote, artifact, Delivery::Saved, DOCUMENT_SAVED).await
    }

    async fn save(
        &self,
        quote: &PreparedQuote,
        artifact: Artifact,
        delivery: Delivery,
        message: &str,
    ) -> Result<ActionOutcome, ApiError> {
        let path = self.sink.save(&artifact).await?;

        Ok(ActionOutcome {
            delivery,
            invoice_id: quote.order.invoice_id().to_string(),
            filename: artifact.filename,
            path: Some(path),
            message: message.to_string(),
        })
    }
}

fn render_image(quote: &PreparedQuote) -> Result<Artifact, ApiError> {
    let bytes = vt_render::render_receipt_png(&quote.view)?;
    Ok(Artifact::png(quote.view.image_filename.clone(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_user_agent() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        let android = "Mozilla/5.0 (Linux; Android 14; Pixel 8)";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Firefox/131.0";

        assert_eq!(Platform::from_user_agent(iphone), Platform::Mobile);
        assert_eq!(Platform::from_user_agent(android), Platform::Mobile);
        assert_eq!(Platform::from_user_agent(desktop), Platform::Desktop);
    }

    #[test]
    fn test_request_accepts_numbers_and_text() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{
                "client_name": "Ana",
                "quantities": { "imanes_3d": 120, "llaveros": "15", "portallaves": "" }
            }"#,
        )
        .unwrap();

        let quantities = request.parsed_quantities();
        assert_eq!(quantities.get("imanes_3d"), 120);
        assert_eq!(quantities.get("llaveros"), 15);
        assert_eq!(quantities.get("portallaves"), 0);
        assert_eq!(request.platform, Platform::Desktop);
        assert!(!request.requires_invoice);
    }
}
