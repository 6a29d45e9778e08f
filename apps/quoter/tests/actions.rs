//! Quote actions end to end: validation, pricing, rendering, delivery.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use vt_core::{BusinessProfile, Catalog, PricingPolicy};
use vt_quoter::actions::{
    IMAGE_COPIED, IMAGE_FALLBACK_SAVED, IMAGE_SAVED, IMAGE_SAVED_MOBILE,
};
use vt_quoter::delivery::DeliveryResult;
use vt_quoter::{
    Artifact, ArtifactSink, Clipboard, Delivery, DeliveryError, ErrorCode, FileSink, Platform,
    QuoteRequest, QuoteService, QuoterConfig, UnavailableClipboard,
};

// =============================================================================
// Test Doubles
// =============================================================================

#[derive(Default)]
struct MemorySink {
    saved: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    fn filenames(&self) -> Vec<String> {
        self.saved.lock().unwrap().iter().map(|a| a.filename.clone()).collect()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn save(&self, artifact: &Artifact) -> DeliveryResult<PathBuf> {
        self.saved.lock().unwrap().push(artifact.clone());
        Ok(PathBuf::from("/mem").join(&artifact.filename))
    }
}

#[derive(Default)]
struct RecordingClipboard {
    copied: Mutex<Vec<String>>,
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn copy_image(&self, artifact: &Artifact) -> DeliveryResult<()> {
        self.copied.lock().unwrap().push(artifact.filename.clone());
        Ok(())
    }
}

struct DeniedClipboard;

#[async_trait]
impl Clipboard for DeniedClipboard {
    async fn copy_image(&self, _artifact: &Artifact) -> DeliveryResult<()> {
        Err(DeliveryError::ClipboardFailed("permission denied".to_string()))
    }
}

fn service(sink: Arc<dyn ArtifactSink>, clipboard: Arc<dyn Clipboard>) -> QuoteService {
    QuoteService::new(
        Catalog::vt_default(),
        BusinessProfile::default(),
        PricingPolicy::default(),
        "VT",
        sink,
        clipboard,
    )
}

fn request() -> QuoteRequest {
    serde_json::from_str(
        r#"{
            "client_name": "Ana López",
            "client_phone": "55 1234 5678",
            "date": "2026-10-15",
            "notes": "Entregar en recepción",
            "requires_invoice": false,
            "quantities": { "imanes_normal_chico": 50 }
        }"#,
    )
    .unwrap()
}

// =============================================================================
// Order Building
// =============================================================================

#[test]
fn test_build_order_end_to_end() {
    let service = service(Arc::new(MemorySink::default()), Arc::new(UnavailableClipboard));
    let at = NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_hms_opt(14, 25, 30)
        .unwrap();

    let quote = service.build_order_at(&request(), at).unwrap();
    let totals = quote.order.totals();

    let item = &quote.order.line_items()[0];
    assert_eq!(item.unit_price.cents(), 800);
    assert_eq!(item.tier_label, "1-99 piezas");
    assert_eq!(item.line_total.cents(), 40000);
    assert_eq!(totals.total_quantity, 50);
    assert_eq!(totals.delivery_fee().cents(), 21000);
    assert_eq!(totals.grand_total.cents(), 61000);
    assert_eq!(totals.deposit_amount.cents(), 30500);

    assert_eq!(quote.order.invoice_id().as_str(), "VT-20261015-142530");
    assert_eq!(quote.view.document_filename, "Factura_VT-20261015-142530_Ana_López.pdf");
}

#[test]
fn test_validation_fails_fast_in_form_order() {
    let service = service(Arc::new(MemorySink::default()), Arc::new(UnavailableClipboard));

    let mut req = request();
    req.client_name = "  ".to_string();
    req.client_phone = String::new();
    let err = service.build_order(&req).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "Por favor ingrese el nombre del cliente");

    let mut req = request();
    req.client_phone = String::new();
    req.date = None;
    assert_eq!(
        service.build_order(&req).unwrap_err().message,
        "Por favor ingrese el teléfono del cliente"
    );

    let mut req = request();
    req.date = None;
    assert_eq!(
        service.build_order(&req).unwrap_err().message,
        "Por favor seleccione una fecha"
    );

    let mut req = request();
    req.quantities.clear();
    assert_eq!(
        service.build_order(&req).unwrap_err().message,
        "Por favor seleccione al menos un producto"
    );
}

#[test]
fn test_preview_never_validates() {
    let service = service(Arc::new(MemorySink::default()), Arc::new(UnavailableClipboard));

    let empty = service.preview(&QuoteRequest::default());
    assert!(empty.line_items.is_empty());
    assert_eq!(empty.totals.grand_total.cents(), 0);
    assert!(empty.hints.iter().all(|h| h.text.is_empty()));

    let mut req = QuoteRequest::default();
    req.quantities.insert("imanes_3d".to_string(), "120".into());
    req.quantities.insert("portallaves".to_string(), 5u32.into());
    let preview = service.preview(&req);

    let hint = |id: &str| {
        preview
            .hints
            .iter()
            .find(|h| h.product_id == id)
            .map(|h| h.text.clone())
            .unwrap()
    };
    assert_eq!(hint("imanes_3d"), "$15.00 c/u (100-299 piezas)");
    assert_eq!(hint("portallaves"), "Cantidad mínima no alcanzada");

    // Idempotent
    assert_eq!(service.preview(&req), preview);
}

// =============================================================================
// Generating Actions
// =============================================================================

#[tokio::test]
async fn test_generate_document_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(
        Arc::new(FileSink::new(dir.path())),
        Arc::new(UnavailableClipboard),
    );

    let outcome = service.generate_document(&request()).await.unwrap();
    assert_eq!(outcome.delivery, Delivery::Saved);
    assert!(outcome.filename.starts_with("Factura_VT-"));
    assert!(outcome.filename.ends_with("_Ana_López.pdf"));

    let bytes = std::fs::read(outcome.path.unwrap()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_generate_image_writes_png() {
    let sink = Arc::new(MemorySink::default());
    let service = service(sink.clone(), Arc::new(UnavailableClipboard));

    let outcome = service.generate_image(&request()).await.unwrap();
    assert_eq!(outcome.message, IMAGE_SAVED);
    assert!(outcome.filename.starts_with("Recibo_VT-"));

    let saved = sink.saved.lock().unwrap();
    assert_eq!(saved[0].media_type, "image/png");
    assert!(image::load_from_memory(&saved[0].bytes).is_ok());
}

#[tokio::test]
async fn test_generate_both_share_invoice_id() {
    let sink = Arc::new(MemorySink::default());
    let service = service(sink.clone(), Arc::new(UnavailableClipboard));

    let outcomes = service.generate_both(&request()).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].invoice_id, outcomes[1].invoice_id);

    let id = &outcomes[0].invoice_id;
    for name in sink.filenames() {
        assert!(name.contains(id.as_str()), "{} lacks {}", name, id);
    }
}

#[tokio::test]
async fn test_validation_failure_writes_nothing() {
    let sink = Arc::new(MemorySink::default());
    let service = service(sink.clone(), Arc::new(UnavailableClipboard));

    let mut req = request();
    req.client_name.clear();
    let err = service.generate_document(&req).await.unwrap_err();
    assert_eq!(err.message, "Por favor ingrese el nombre del cliente");
    assert!(sink.filenames().is_empty());
}

#[tokio::test]
async fn test_copy_image_uses_clipboard() {
    let sink = Arc::new(MemorySink::default());
    let clipboard = Arc::new(RecordingClipboard::default());
    let service = service(sink.clone(), clipboard.clone());

    let outcome = service.copy_image(&request()).await.unwrap();
    assert_eq!(outcome.delivery, Delivery::Copied);
    assert_eq!(outcome.message, IMAGE_COPIED);
    assert!(outcome.path.is_none());
    assert_eq!(clipboard.copied.lock().unwrap().len(), 1);
    assert!(sink.filenames().is_empty());
}

#[tokio::test]
async fn test_copy_image_falls_back_to_file() {
    let sink = Arc::new(MemorySink::default());
    let service = service(sink.clone(), Arc::new(DeniedClipboard));

    let outcome = service.copy_image(&request()).await.unwrap();
    assert_eq!(outcome.delivery, Delivery::FallbackSaved);
    assert_eq!(outcome.message, IMAGE_FALLBACK_SAVED);
    assert_eq!(sink.filenames().len(), 1);
}

#[tokio::test]
async fn test_copy_image_on_mobile_saves_directly() {
    let sink = Arc::new(MemorySink::default());
    let clipboard = Arc::new(RecordingClipboard::default());
    let service = service(sink.clone(), clipboard.clone());

    let mut req = request();
    req.platform = Platform::Mobile;
    let outcome = service.copy_image(&req).await.unwrap();

    assert_eq!(outcome.delivery, Delivery::SavedToGallery);
    assert_eq!(outcome.message, IMAGE_SAVED_MOBILE);
    assert!(clipboard.copied.lock().unwrap().is_empty());
    assert_eq!(sink.filenames().len(), 1);
}

#[tokio::test]
async fn test_configured_service_copy_ends_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = QuoterConfig::default();
    config.output.dir = dir.path().to_path_buf();

    // No clipboard is wired in by default
    let service = QuoteService::from_config(&config).unwrap();
    let outcome = service.copy_image(&request()).await.unwrap();

    assert_eq!(outcome.delivery, Delivery::FallbackSaved);
    assert!(dir.path().join(&outcome.filename).exists());
}

#[tokio::test]
async fn test_undrawable_name_fails_without_writing() {
    let sink = Arc::new(MemorySink::default());
    let service = service(sink.clone(), Arc::new(UnavailableClipboard));

    let mut req = request();
    req.client_name = "Ana 🎉".to_string();

    let err = service.generate_document(&req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RenderError);
    assert!(err.message.starts_with("Error al generar el PDF: "));
    assert!(err.message.contains("Ana 🎉"));

    let err = service.generate_image(&req).await.unwrap_err();
    assert!(err.message.starts_with("Error al generar la imagen: "));
    assert!(sink.filenames().is_empty());
}
