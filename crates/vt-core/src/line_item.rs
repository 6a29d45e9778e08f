//! # Line-Item Builder
//!
//! Turns the quantities typed into the quote form into priced line items.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form inputs            Quantities             Line items               │
//! │  ───────────            ──────────             ──────────               │
//! │  "50"        ──parse──► chico: 50   ──┐                                 │
//! │  ""          ──parse──► (absent)      ├─► catalog order ──► [chico×50]  │
//! │  "abc"       ──parse──► 0           ──┘   skip qty 0                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each kept product is priced against its own tier table. A quantity below
//! the table's minimum still produces a line item, priced at zero with an
//! empty tier label.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::tier::{resolve_tier_label, resolve_unit_price};

// =============================================================================
// Line Item
// =============================================================================

/// One priced product row of an order.
///
/// `line_total == unit_price × quantity`, always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    pub display_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// `""` when the quantity is below every tier.
    pub tier_label: String,
    pub line_total: Money,
}

impl LineItem {
    /// True when no tier accepted the quantity.
    pub fn is_below_minimum(&self) -> bool {
        self.tier_label.is_empty()
    }
}

// =============================================================================
// Quantities
// =============================================================================

/// Requested quantity per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantities(HashMap<String, u32>);

impl Quantities {
    pub fn new() -> Self {
        Quantities::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        Quantities(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parses raw form fields, one per product input.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a QuantityField)>,
    {
        Quantities(
            fields
                .into_iter()
                .map(|(id, field)| (id.clone(), field.quantity()))
                .collect(),
        )
    }

    pub fn set(&mut self, product_id: impl Into<String>, quantity: u32) {
        self.0.insert(product_id.into(), quantity);
    }

    /// Quantity for a product; absent ids read as 0.
    pub fn get(&self, product_id: &str) -> u32 {
        self.0.get(product_id).copied().unwrap_or(0)
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A quantity as submitted: a JSON number or the raw input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityField {
    Number(f64),
    Text(String),
}

impl QuantityField {
    /// Whole, non-negative quantity. Anything unusable reads as 0.
    pub fn quantity(&self) -> u32 {
        match self {
            QuantityField::Number(n) if n.is_finite() && *n >= 1.0 => {
                n.trunc().min(u32::MAX as f64) as u32
            }
            QuantityField::Number(_) => 0,
            QuantityField::Text(text) => parse_quantity(text),
        }
    }
}

impl From<u32> for QuantityField {
    fn from(quantity: u32) -> Self {
        QuantityField::Number(quantity as f64)
    }
}

impl From<&str> for QuantityField {
    fn from(text: &str) -> Self {
        QuantityField::Text(text.to_string())
    }
}

/// Reads a quantity from input text.
///
/// Leading whitespace and an optional sign are accepted, then leading digits
/// are read and anything after them is ignored (`"12 pzas"` → 12). Empty,
/// non-numeric and negative input read as 0. Oversized values saturate.
///
/// ```rust
/// use vt_core::line_item::parse_quantity;
///
/// assert_eq!(parse_quantity("50"), 50);
/// assert_eq!(parse_quantity(" 12.9"), 12);
/// assert_eq!(parse_quantity("abc"), 0);
/// assert_eq!(parse_quantity("-5"), 0);
/// ```
pub fn parse_quantity(input: &str) -> u32 {
    let input = input.trim_start();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    let mut value: u32 = 0;
    let mut any = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        any = true;
        value = value.saturating_mul(10).saturating_add(d);
    }

    if !any || negative {
        return 0;
    }
    value
}

// =============================================================================
// Builder
// =============================================================================

/// Prices every catalog product with a positive quantity, in catalog order.
///
/// Quantities for ids the catalog does not declare are ignored.
pub fn build_line_items(catalog: &Catalog, quantities: &Quantities) -> Vec<LineItem> {
    for id in quantities.product_ids() {
        if !catalog.contains(id) {
            debug!(product_id = %id, "Ignoring quantity for unknown product");
        }
    }

    catalog
        .iter()
        .filter_map(|product| {
            let quantity = quantities.get(&product.id);
            if quantity == 0 {
                return None;
            }

            let unit_price = resolve_unit_price(quantity, &product.tier_table);
            let tier_label = resolve_tier_label(quantity, &product.tier_table);

            if tier_label.is_empty() {
                debug!(product_id = %product.id, quantity, "Quantity below minimum tier");
            }

            Some(LineItem {
                product_id: product.id.clone(),
                display_name: product.display_name.clone(),
                quantity,
                unit_price,
                tier_label,
                line_total: unit_price.multiply_quantity(quantity),
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0"), 0);
        assert_eq!(parse_quantity("300"), 300);
        assert_eq!(parse_quantity("+7"), 7);
        assert_eq!(parse_quantity("12 pzas"), 12);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("   "), 0);
        assert_eq!(parse_quantity("x12"), 0);
        assert_eq!(parse_quantity("-"), 0);
        assert_eq!(parse_quantity("99999999999"), u32::MAX);
    }

    #[test]
    fn test_quantity_field() {
        let fields: HashMap<String, QuantityField> =
            serde_json::from_str(r#"{"a": 50, "b": "20", "c": 2.7, "d": -3, "e": "abc"}"#).unwrap();
        let quantities = Quantities::from_fields(&fields);
        assert_eq!(quantities.get("a"), 50);
        assert_eq!(quantities.get("b"), 20);
        assert_eq!(quantities.get("c"), 2);
        assert_eq!(quantities.get("d"), 0);
        assert_eq!(quantities.get("e"), 0);
        assert_eq!(quantities.get("missing"), 0);
    }

    #[test]
    fn test_build_line_items_end_to_end() {
        let catalog = Catalog::vt_default();
        let items = build_line_items(&catalog, &Quantities::from_pairs([("imanes_normal_chico", 50)]));

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.display_name, "Imanes Normales - Chicos");
        assert_eq!(item.unit_price, Money::from_pesos(8));
        assert_eq!(item.tier_label, "1-99 piezas");
        assert_eq!(item.line_total, Money::from_pesos(400));
    }

    #[test]
    fn test_build_keeps_catalog_order_and_skips_zero() {
        let catalog = Catalog::vt_default();
        let quantities = Quantities::from_pairs([
            ("portallaves", 10),
            ("imanes_3d", 0),
            ("imanes_normal_chico", 5),
            ("no_such_product", 40),
        ]);
        let items = build_line_items(&catalog, &quantities);

        let ids: Vec<_> = items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["imanes_normal_chico", "portallaves"]);
    }

    #[test]
    fn test_below_minimum_is_kept_at_zero() {
        let catalog = Catalog::vt_default();
        let items = build_line_items(&catalog, &Quantities::from_pairs([("imanes_3d", 20)]));

        assert_eq!(items.len(), 1);
        assert!(items[0].is_below_minimum());
        assert_eq!(items[0].unit_price, Money::zero());
        assert_eq!(items[0].line_total, Money::zero());
    }

    #[test]
    fn test_each_product_uses_its_own_table() {
        let catalog = Catalog::vt_default();
        let quantities = Quantities::from_pairs([("imanes_normal_grande", 150), ("llaveros", 150)]);
        let items = build_line_items(&catalog, &quantities);

        assert_eq!(items[0].unit_price, Money::from_pesos(10));
        assert_eq!(items[1].unit_price, Money::from_pesos(12));
        assert!(items.iter().all(|i| i.line_total == i.unit_price.multiply_quantity(i.quantity)));
    }
}
