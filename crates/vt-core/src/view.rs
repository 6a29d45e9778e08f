//! # Renderable Order View
//!
//! The single, fully resolved description of a quote that both renderers
//! lay out. Every string is formatted here, and every conditional section
//! is decided here, so the paginated document and the flattened image
//! cannot disagree on a figure, a label or whether a panel exists.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Order + BusinessProfile + PricingPolicy                               │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │        RenderableOrderView::build  (all formatting happens here)        │
//! │                    │                                                    │
//! │          ┌─────────┴──────────┐                                         │
//! │          ▼                    ▼                                         │
//! │   document renderer     image renderer      (layout only)               │
//! │          │                    │                                         │
//! │          ▼                    ▼                                         │
//! │   fields() ════════ fields() ════════ view.fields()                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field tags
//! Renderers tag every content-bearing text they draw with a [`ViewField`].
//! Static chrome (column headers, `"Subtotal:"`) is untagged. Collecting the
//! tagged text of a rendered artifact with [`collect_fields`] must give the
//! same [`FieldSet`] as [`RenderableOrderView::fields`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::invoice::format_long_date;
use crate::line_item::LineItem;
use crate::order::{DeliveryAssessment, Order, PricingPolicy};
use crate::profile::{BusinessProfile, PaymentMethod};
use crate::types::percent_label;

/// Shown in place of a tier label when no tier accepted the quantity.
pub const BELOW_MINIMUM_TEXT: &str = "Cantidad mínima no alcanzada";

/// Shown next to the struck-through delivery fee when delivery is free.
pub const FREE_DELIVERY_TEXT: &str = "Gratis";

/// Document title printed next to the business name.
pub const DOCUMENT_TITLE: &str = "RECIBO";

pub const PAYMENTS_TITLE: &str = "MÉTODOS DE PAGO";
pub const BILLING_TITLE: &str = "DATOS PARA FACTURACIÓN";
pub const NOTES_LABEL: &str = "Notas:";

// =============================================================================
// View Field
// =============================================================================

/// Tag for a content-bearing piece of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ViewField {
    BusinessName,
    DocumentTitle,
    InvoiceId,
    AddressLine(usize),
    BusinessPhone,
    Date,
    ClientName,
    ClientPhone,
    ItemDescription(usize),
    ItemQuantity(usize),
    ItemUnitPrice(usize),
    ItemTotal(usize),
    Subtotal,
    Delivery,
    DeliveryStruck,
    DeliveryIndicator,
    TaxLabel,
    TaxAmount,
    GrandTotal,
    DepositLabel,
    DepositAmount,
    NotesLabel,
    Notes,
    PaymentsTitle,
    PaymentTitle(usize),
    PaymentAccount(usize),
    PaymentBank(usize),
    PaymentHolder(usize),
    BillingTitle,
    BillingLine(usize),
    Footer,
}

impl fmt::Display for ViewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewField::BusinessName => f.write_str("business.name"),
            ViewField::DocumentTitle => f.write_str("document.title"),
            ViewField::InvoiceId => f.write_str("document.invoice_id"),
            ViewField::AddressLine(i) => write!(f, "business.address[{}]", i),
            ViewField::BusinessPhone => f.write_str("business.phone"),
            ViewField::Date => f.write_str("client.date"),
            ViewField::ClientName => f.write_str("client.name"),
            ViewField::ClientPhone => f.write_str("client.phone"),
            ViewField::ItemDescription(i) => write!(f, "items[{}].description", i),
            ViewField::ItemQuantity(i) => write!(f, "items[{}].quantity", i),
            ViewField::ItemUnitPrice(i) => write!(f, "items[{}].unit_price", i),
            ViewField::ItemTotal(i) => write!(f, "items[{}].total", i),
            ViewField::Subtotal => f.write_str("totals.subtotal"),
            ViewField::Delivery => f.write_str("totals.delivery"),
            ViewField::DeliveryStruck => f.write_str("totals.delivery.struck"),
            ViewField::DeliveryIndicator => f.write_str("totals.delivery.indicator"),
            ViewField::TaxLabel => f.write_str("totals.tax.label"),
            ViewField::TaxAmount => f.write_str("totals.tax.amount"),
            ViewField::GrandTotal => f.write_str("totals.grand_total"),
            ViewField::DepositLabel => f.write_str("totals.deposit.label"),
            ViewField::DepositAmount => f.write_str("totals.deposit.amount"),
            ViewField::NotesLabel => f.write_str("notes.label"),
            ViewField::Notes => f.write_str("notes.text"),
            ViewField::PaymentsTitle => f.write_str("payments.title"),
            ViewField::PaymentTitle(i) => write!(f, "payments[{}].title", i),
            ViewField::PaymentAccount(i) => write!(f, "payments[{}].account", i),
            ViewField::PaymentBank(i) => write!(f, "payments[{}].bank", i),
            ViewField::PaymentHolder(i) => write!(f, "payments[{}].holder", i),
            ViewField::BillingTitle => f.write_str("billing.title"),
            ViewField::BillingLine(i) => write!(f, "billing.lines[{}]", i),
            ViewField::Footer => f.write_str("footer"),
        }
    }
}

/// `(field key, displayed value)` pairs of a view or rendered artifact.
pub type FieldSet = BTreeSet<(String, String)>;

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Groups tagged text fragments into a [`FieldSet`].
///
/// Fragments sharing a tag (a wrapped description, wrapped notes) are joined
/// with a space in the order given, then whitespace is normalized.
pub fn collect_fields<'a, I>(fragments: I) -> FieldSet
where
    I: IntoIterator<Item = (ViewField, &'a str)>,
{
    let mut grouped: BTreeMap<ViewField, Vec<&'a str>> = BTreeMap::new();
    for (field, text) in fragments {
        grouped.entry(field).or_default().push(text);
    }

    grouped
        .into_iter()
        .map(|(field, parts)| (field.to_string(), normalize_text(&parts.join(" "))))
        .collect()
}

// =============================================================================
// View Parts
// =============================================================================

/// One product row, every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    /// `"Imanes 3D (50-99 piezas)"`
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

/// How the delivery line is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DeliveryView {
    /// A plain amount: the charged fee, or `$0.00 MXN` with no order.
    Plain(String),
    /// The nominal fee struck through, followed by the indicator.
    Waived { struck: String, indicator: String },
}

/// A `label ... amount` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledAmount {
    pub label: String,
    pub amount: String,
}

/// The invoice-only billing panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingPanel {
    pub title: String,
    pub lines: Vec<String>,
}

// =============================================================================
// Renderable Order View
// =============================================================================

/// Everything a renderer prints, resolved once from an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderableOrderView {
    pub business_name: String,
    pub title: String,
    /// `"ID: VT-20261015-142530"`
    pub invoice_line: String,
    pub address_lines: Vec<String>,
    pub business_phone: String,

    /// `"Fecha: 15 de octubre de 2026"`
    pub date_line: String,
    pub client_name: String,
    /// `"Tel: 55 1234 5678"`
    pub client_phone_line: String,

    pub items: Vec<ItemRow>,

    pub subtotal: String,
    pub delivery: DeliveryView,
    /// Present iff the order requires an invoice.
    pub tax: Option<LabeledAmount>,
    pub grand_total: String,
    pub deposit: LabeledAmount,

    /// Trimmed notes; present iff non-blank.
    pub notes: Option<String>,

    pub payments_title: String,
    pub payment_methods: Vec<PaymentMethod>,
    /// Present iff the order requires an invoice.
    pub billing: Option<BillingPanel>,
    pub footer: String,

    pub document_filename: String,
    pub image_filename: String,
}

impl RenderableOrderView {
    /// Resolves every string and section of the quote.
    pub fn build(order: &Order, profile: &BusinessProfile, policy: &PricingPolicy) -> Self {
        let totals = order.totals();
        let client = order.client();
        let invoice_id = order.invoice_id();

        let delivery = match totals.delivery {
            DeliveryAssessment::NoOrder => DeliveryView::Plain(totals.delivery_fee().with_currency()),
            DeliveryAssessment::Charged { fee } => DeliveryView::Plain(fee.with_currency()),
            DeliveryAssessment::Waived { nominal_fee } => DeliveryView::Waived {
                struck: nominal_fee.with_currency(),
                indicator: FREE_DELIVERY_TEXT.to_string(),
            },
        };

        let tax = order.tax_required().then(|| LabeledAmount {
            label: format!("IVA ({}):", policy.tax_rate.label()),
            amount: totals.tax_amount.with_currency(),
        });

        let billing = order.tax_required().then(|| BillingPanel {
            title: BILLING_TITLE.to_string(),
            lines: vec![
                format!("Beneficiario: {}", profile.billing.beneficiary),
                format!("Clabe: {}", profile.billing.clabe),
                format!("Cuenta: {}", profile.billing.account),
            ],
        });

        RenderableOrderView {
            business_name: profile.name.clone(),
            title: DOCUMENT_TITLE.to_string(),
            invoice_line: format!("ID: {}", invoice_id),
            address_lines: profile.address_lines.clone(),
            business_phone: profile.phone.clone(),

            date_line: format!("Fecha: {}", format_long_date(client.date)),
            client_name: client.name.clone(),
            client_phone_line: format!("Tel: {}", client.phone),

            items: order.line_items().iter().map(item_row).collect(),

            subtotal: totals.subtotal.with_currency(),
            delivery,
            tax,
            grand_total: totals.grand_total.with_currency(),
            deposit: LabeledAmount {
                label: format!(
                    "Cantidad a depositar ({}):",
                    percent_label(policy.deposit_bps)
                ),
                amount: totals.deposit_amount.with_currency(),
            },

            notes: client.trimmed_notes().map(str::to_string),

            payments_title: PAYMENTS_TITLE.to_string(),
            payment_methods: profile.payment_methods.clone(),
            billing,
            footer: profile.footer.clone(),

            document_filename: invoice_id.document_filename(&client.name),
            image_filename: invoice_id.image_filename(&client.name),
        }
    }

    /// Every tagged value a renderer must draw.
    pub fn tagged_values(&self) -> Vec<(ViewField, &str)> {
        let mut out: Vec<(ViewField, &str)> = vec![
            (ViewField::BusinessName, self.business_name.as_str()),
            (ViewField::DocumentTitle, self.title.as_str()),
            (ViewField::InvoiceId, self.invoice_line.as_str()),
        ];

        for (i, line) in self.address_lines.iter().enumerate() {
            out.push((ViewField::AddressLine(i), line));
        }
        out.push((ViewField::BusinessPhone, &self.business_phone));
        out.push((ViewField::Date, &self.date_line));
        out.push((ViewField::ClientName, &self.client_name));
        out.push((ViewField::ClientPhone, &self.client_phone_line));

        for (i, row) in self.items.iter().enumerate() {
            out.push((ViewField::ItemDescription(i), &row.description));
            out.push((ViewField::ItemQuantity(i), &row.quantity));
            out.push((ViewField::ItemUnitPrice(i), &row.unit_price));
            out.push((ViewField::ItemTotal(i), &row.line_total));
        }

        out.push((ViewField::Subtotal, &self.subtotal));
        match &self.delivery {
            DeliveryView::Plain(amount) => out.push((ViewField::Delivery, amount)),
            DeliveryView::Waived { struck, indicator } => {
                out.push((ViewField::DeliveryStruck, struck));
                out.push((ViewField::DeliveryIndicator, indicator));
            }
        }
        if let Some(tax) = &self.tax {
            out.push((ViewField::TaxLabel, &tax.label));
            out.push((ViewField::TaxAmount, &tax.amount));
        }
        out.push((ViewField::GrandTotal, &self.grand_total));
        out.push((ViewField::DepositLabel, &self.deposit.label));
        out.push((ViewField::DepositAmount, &self.deposit.amount));

        if let Some(notes) = &self.notes {
            out.push((ViewField::NotesLabel, NOTES_LABEL));
            out.push((ViewField::Notes, notes));
        }

        out.push((ViewField::PaymentsTitle, &self.payments_title));
        for (i, method) in self.payment_methods.iter().enumerate() {
            out.push((ViewField::PaymentTitle(i), &method.title));
            out.push((ViewField::PaymentAccount(i), &method.account));
            out.push((ViewField::PaymentBank(i), &method.bank));
            out.push((ViewField::PaymentHolder(i), &method.holder));
        }

        if let Some(billing) = &self.billing {
            out.push((ViewField::BillingTitle, &billing.title));
            for (i, line) in billing.lines.iter().enumerate() {
                out.push((ViewField::BillingLine(i), line));
            }
        }

        out.push((ViewField::Footer, &self.footer));
        out
    }

    /// The expected field set of any faithful rendering of this view.
    pub fn fields(&self) -> FieldSet {
        collect_fields(self.tagged_values())
    }
}

fn item_row(item: &LineItem) -> ItemRow {
    let tier = if item.tier_label.is_empty() {
        BELOW_MINIMUM_TEXT
    } else {
        item.tier_label.as_str()
    };

    ItemRow {
        description: format!("{} ({})", item.display_name, tier),
        quantity: item.quantity.to_string(),
        unit_price: item.unit_price.with_currency(),
        line_total: item.line_total.with_currency(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::invoice::InvoiceId;
    use crate::line_item::{build_line_items, Quantities};
    use crate::order::{aggregate, OrderContext};
    use crate::types::ClientInfo;
    use chrono::NaiveDate;

    fn view_for(pairs: &[(&str, u32)], tax_required: bool, notes: &str) -> RenderableOrderView {
        let catalog = Catalog::vt_default();
        let quantities = Quantities::from_pairs(pairs.iter().map(|(k, v)| (*k, *v)));
        let items = build_line_items(&catalog, &quantities);
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let context = OrderContext {
            client: ClientInfo::new("Ana López", "55 1234 5678", date).with_notes(notes),
            tax_required,
            invoice_id: InvoiceId::from_timestamp("VT", date.and_hms_opt(14, 25, 30).unwrap()),
        };
        let policy = PricingPolicy::default();
        let order = aggregate(items, context, &policy);
        RenderableOrderView::build(&order, &BusinessProfile::default(), &policy)
    }

    #[test]
    fn test_end_to_end_strings() {
        let view = view_for(&[("imanes_normal_chico", 50)], false, "");

        assert_eq!(view.invoice_line, "ID: VT-20261015-142530");
        assert_eq!(view.date_line, "Fecha: 15 de octubre de 2026");
        assert_eq!(view.client_phone_line, "Tel: 55 1234 5678");
        assert_eq!(
            view.items[0],
            ItemRow {
                description: "Imanes Normales - Chicos (1-99 piezas)".to_string(),
                quantity: "50".to_string(),
                unit_price: "$8.00 MXN".to_string(),
                line_total: "$400.00 MXN".to_string(),
            }
        );
        assert_eq!(view.subtotal, "$400.00 MXN");
        assert_eq!(view.delivery, DeliveryView::Plain("$210.00 MXN".to_string()));
        assert_eq!(view.grand_total, "$610.00 MXN");
        assert_eq!(view.deposit.label, "Cantidad a depositar (50%):");
        assert_eq!(view.deposit.amount, "$305.00 MXN");
        assert_eq!(view.document_filename, "Factura_VT-20261015-142530_Ana_López.pdf");
        assert_eq!(view.image_filename, "Recibo_VT-20261015-142530_Ana_López.png");
    }

    #[test]
    fn test_invoice_sections_follow_tax_flag() {
        let view = view_for(&[("llaveros", 10)], true, "");
        let tax = view.tax.as_ref().unwrap();
        assert_eq!(tax.label, "IVA (16%):");
        assert_eq!(view.billing.as_ref().unwrap().lines[1], "Clabe: 012180004835769653");

        let view = view_for(&[("llaveros", 10)], false, "");
        assert!(view.tax.is_none());
        assert!(view.billing.is_none());
        assert!(!view.fields().iter().any(|(k, _)| k.starts_with("billing")));
    }

    #[test]
    fn test_delivery_views() {
        let view = view_for(&[("imanes_3d", 300)], false, "");
        assert_eq!(
            view.delivery,
            DeliveryView::Waived {
                struck: "$210.00 MXN".to_string(),
                indicator: "Gratis".to_string(),
            }
        );

        let view = view_for(&[], false, "");
        assert_eq!(view.delivery, DeliveryView::Plain("$0.00 MXN".to_string()));
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_below_minimum_description() {
        let view = view_for(&[("portallaves", 5)], false, "");
        assert_eq!(
            view.items[0].description,
            "Portallaves (MDF 4.5mm) (Cantidad mínima no alcanzada)"
        );
        assert_eq!(view.items[0].line_total, "$0.00 MXN");
    }

    #[test]
    fn test_notes_only_when_not_blank() {
        assert!(view_for(&[("llaveros", 1)], false, "   ").notes.is_none());

        let view = view_for(&[("llaveros", 1)], false, "  Entregar  el lunes ");
        assert_eq!(view.notes.as_deref(), Some("Entregar  el lunes"));
        assert!(view
            .fields()
            .contains(&("notes.text".to_string(), "Entregar el lunes".to_string())));
    }

    #[test]
    fn test_collect_fields_joins_fragments() {
        let fields = collect_fields(vec![
            (ViewField::Notes, "first  line"),
            (ViewField::Footer, "Gracias"),
            (ViewField::Notes, "second\nline"),
        ]);
        assert!(fields.contains(&("notes.text".to_string(), "first line second line".to_string())));
        assert_eq!(fields.len(), 2);
    }
}
