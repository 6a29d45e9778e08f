//! # Order Aggregator
//!
//! Folds priced line items into the order totals.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_quantity = Σ quantity                                            │
//! │  subtotal       = Σ line_total                                          │
//! │                                                                         │
//! │  delivery       qty == 0      → NoOrder            fee $0               │
//! │                 qty <  300    → Charged            fee $210             │
//! │                 qty >= 300    → Waived ("Gratis")  fee $0               │
//! │                                                                         │
//! │  tax_amount     = invoice ? round((subtotal + fee) × 16%) : 0           │
//! │  grand_total    = subtotal + fee + tax_amount                           │
//! │  deposit_amount = round(grand_total × 50%)                              │
//! │                                                                         │
//! │  All in integer centavos; each rounded figure is rounded half up once.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`OrderTotals::compute`] is the single fold. The live preview calls it on
//! every keystroke, and [`aggregate`] calls it again when a document is
//! generated, so both always agree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::invoice::InvoiceId;
use crate::line_item::LineItem;
use crate::money::Money;
use crate::types::{ClientInfo, TaxRate};
use crate::validation::validate_tax_rate;
use crate::{DEFAULT_DELIVERY_FEE, DEPOSIT_BPS, FREE_DELIVERY_MIN_QUANTITY, IVA_RATE};

// =============================================================================
// Pricing Policy
// =============================================================================

/// The business rules the aggregator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    #[serde(with = "crate::money::decimal")]
    pub delivery_fee: Money,
    /// Total pieces at or above which delivery is free.
    pub free_delivery_min_quantity: u32,
    pub tax_rate: TaxRate,
    /// Deposit fraction of the grand total, in basis points.
    pub deposit_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            delivery_fee: DEFAULT_DELIVERY_FEE,
            free_delivery_min_quantity: FREE_DELIVERY_MIN_QUANTITY,
            tax_rate: IVA_RATE,
            deposit_bps: DEPOSIT_BPS,
        }
    }
}

impl PricingPolicy {
    pub fn validate(&self) -> CoreResult<()> {
        if self.delivery_fee.cents() < 0 {
            return Err(CoreError::InvalidPrice {
                field: "delivery_fee".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        validate_tax_rate(self.tax_rate)?;
        if self.deposit_bps > 10000 {
            return Err(ValidationError::OutOfRange {
                field: "deposit_bps".to_string(),
                min: 0,
                max: 10000,
            }
            .into());
        }
        Ok(())
    }

    /// Assesses delivery for a total piece count.
    pub fn assess_delivery(&self, total_quantity: u32) -> DeliveryAssessment {
        if total_quantity == 0 {
            DeliveryAssessment::NoOrder
        } else if total_quantity < self.free_delivery_min_quantity {
            DeliveryAssessment::Charged {
                fee: self.delivery_fee,
            }
        } else {
            DeliveryAssessment::Waived {
                nominal_fee: self.delivery_fee,
            }
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// How delivery applies to an order.
///
/// `NoOrder` and `Waived` both charge nothing; they differ in how the quote
/// shows it (a plain zero vs the struck-through fee and "Gratis").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum DeliveryAssessment {
    NoOrder,
    Charged { fee: Money },
    Waived { nominal_fee: Money },
}

impl DeliveryAssessment {
    /// The amount actually charged.
    pub fn fee(&self) -> Money {
        match self {
            DeliveryAssessment::Charged { fee } => *fee,
            DeliveryAssessment::NoOrder | DeliveryAssessment::Waived { .. } => Money::zero(),
        }
    }

    pub fn is_waived(&self) -> bool {
        matches!(self, DeliveryAssessment::Waived { .. })
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// The numeric summary of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub total_quantity: u32,
    pub subtotal: Money,
    pub delivery: DeliveryAssessment,
    pub tax_amount: Money,
    pub grand_total: Money,
    pub deposit_amount: Money,
}

impl OrderTotals {
    /// Computes totals for a set of line items. Never fails; no items means
    /// all zeros.
    ///
    /// ```rust
    /// use vt_core::order::{OrderTotals, PricingPolicy};
    ///
    /// let totals = OrderTotals::compute(&[], true, &PricingPolicy::default());
    /// assert!(totals.grand_total.is_zero());
    /// ```
    pub fn compute(items: &[LineItem], tax_required: bool, policy: &PricingPolicy) -> Self {
        let total_quantity = items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity));
        let subtotal: Money = items.iter().map(|item| item.line_total).sum();

        let delivery = policy.assess_delivery(total_quantity);
        let taxable = subtotal + delivery.fee();

        let tax_amount = if tax_required {
            taxable.calculate_tax(policy.tax_rate)
        } else {
            Money::zero()
        };

        let grand_total = taxable + tax_amount;
        let deposit_amount = grand_total.portion_bps(policy.deposit_bps);

        OrderTotals {
            total_quantity,
            subtotal,
            delivery,
            tax_amount,
            grand_total,
            deposit_amount,
        }
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery.fee()
    }
}

// =============================================================================
// Order
// =============================================================================

/// Everything about an order that does not come from the line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderContext {
    pub client: ClientInfo,
    pub tax_required: bool,
    pub invoice_id: InvoiceId,
}

/// A fully priced order. Built fresh for every generation action and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    line_items: Vec<LineItem>,
    totals: OrderTotals,
    tax_required: bool,
    client: ClientInfo,
    invoice_id: InvoiceId,
}

impl Order {
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    pub fn tax_required(&self) -> bool {
        self.tax_required
    }

    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    pub fn invoice_id(&self) -> &InvoiceId {
        &self.invoice_id
    }
}

/// Builds the immutable order from priced line items.
pub fn aggregate(line_items: Vec<LineItem>, context: OrderContext, policy: &PricingPolicy) -> Order {
    let totals = OrderTotals::compute(&line_items, context.tax_required, policy);

    Order {
        line_items,
        totals,
        tax_required: context.tax_required,
        client: context.client,
        invoice_id: context.invoice_id,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::BusinessProfile;
    use crate::view::{DeliveryView, RenderableOrderView};
    use chrono::NaiveDate;

    fn item(quantity: u32, unit_cents: i64) -> LineItem {
        let unit_price = Money::from_cents(unit_cents);
        LineItem {
            product_id: "p".to_string(),
            display_name: "P".to_string(),
            quantity,
            unit_price,
            tier_label: "1+ piezas".to_string(),
            line_total: unit_price.multiply_quantity(quantity),
        }
    }

    fn context(tax_required: bool) -> OrderContext {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        OrderContext {
            client: ClientInfo::new("Ana", "5512345678", date),
            tax_required,
            invoice_id: InvoiceId::from_timestamp("VT", date.and_hms_opt(12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_empty_order_is_all_zero() {
        let totals = OrderTotals::compute(&[], true, &PricingPolicy::default());
        assert_eq!(totals.total_quantity, 0);
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.delivery, DeliveryAssessment::NoOrder);
        assert_eq!(totals.tax_amount, Money::zero());
        assert_eq!(totals.grand_total, Money::zero());
        assert_eq!(totals.deposit_amount, Money::zero());
    }

    #[test]
    fn test_delivery_threshold() {
        let policy = PricingPolicy::default();

        let totals = OrderTotals::compute(&[item(299, 100)], false, &policy);
        assert_eq!(totals.delivery_fee(), Money::from_pesos(210));
        assert!(matches!(totals.delivery, DeliveryAssessment::Charged { .. }));

        let totals = OrderTotals::compute(&[item(300, 100)], false, &policy);
        assert_eq!(totals.delivery_fee(), Money::zero());
        assert_eq!(
            totals.delivery,
            DeliveryAssessment::Waived {
                nominal_fee: Money::from_pesos(210)
            }
        );

        // Threshold counts total pieces across products
        let totals = OrderTotals::compute(&[item(150, 100), item(150, 100)], false, &policy);
        assert!(totals.delivery.is_waived());
    }

    #[test]
    fn test_zero_quantity_items_mean_no_order() {
        let policy = PricingPolicy::default();

        // Items present, but not a single piece
        let items = vec![item(0, 0), item(0, 800)];
        let order = aggregate(items, context(true), &policy);
        let totals = order.totals();
        assert_eq!(totals.total_quantity, 0);
        assert_eq!(totals.delivery, DeliveryAssessment::NoOrder);
        assert_eq!(totals.grand_total, Money::zero());

        let view = RenderableOrderView::build(&order, &BusinessProfile::default(), &policy);
        assert_eq!(view.delivery, DeliveryView::Plain("$0.00 MXN".to_string()));

        // Below-minimum pieces still count toward delivery
        let totals = OrderTotals::compute(&[item(3, 0)], false, &policy);
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.delivery_fee(), Money::from_pesos(210));
    }

    #[test]
    fn test_extreme_prices_saturate() {
        let policy = PricingPolicy::default();
        let totals = OrderTotals::compute(&[item(u32::MAX, i64::MAX / 2)], true, &policy);
        assert_eq!(totals.subtotal.cents(), i64::MAX);
        assert_eq!(totals.grand_total.cents(), i64::MAX);
    }

    #[test]
    fn test_tax_and_deposit() {
        let policy = PricingPolicy::default();
        let items = [item(100, 1000)]; // subtotal $1,000.00

        let with_tax = OrderTotals::compute(&items, true, &policy);
        assert_eq!(with_tax.tax_amount.cents(), 19360);
        assert_eq!(with_tax.grand_total.cents(), 140360);
        assert_eq!(with_tax.deposit_amount.cents(), 70180);

        let without_tax = OrderTotals::compute(&items, false, &policy);
        assert_eq!(without_tax.tax_amount, Money::zero());
        assert_eq!(without_tax.grand_total.cents(), 121000);
        assert_eq!(without_tax.deposit_amount.cents(), 60500);
    }

    #[test]
    fn test_totals_invariants() {
        let policy = PricingPolicy::default();
        let items = [item(7, 1333), item(41, 1799), item(3, 2500)];
        let totals = OrderTotals::compute(&items, true, &policy);

        let subtotal: Money = items.iter().map(|i| i.line_total).sum();
        assert_eq!(totals.subtotal, subtotal);
        assert_eq!(
            totals.grand_total,
            totals.subtotal + totals.delivery_fee() + totals.tax_amount
        );
        assert_eq!(totals.deposit_amount, totals.grand_total.portion_bps(5000));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let policy = PricingPolicy::default();
        let items = vec![item(50, 800)];

        let first = aggregate(items.clone(), context(true), &policy);
        let second = aggregate(items, context(true), &policy);
        assert_eq!(first, second);
        assert_eq!(first.totals().grand_total.cents(), 70760);
    }

    #[test]
    fn test_policy_validation() {
        assert!(PricingPolicy::default().validate().is_ok());

        let policy = PricingPolicy {
            delivery_fee: Money::from_cents(-1),
            ..PricingPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(CoreError::InvalidPrice { .. })));

        let policy = PricingPolicy {
            deposit_bps: 10001,
            ..PricingPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(CoreError::Validation(_))));
    }
}
