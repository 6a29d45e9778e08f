//! # Tier Resolver
//!
//! Quantity-tiered unit pricing. Every product owns an ordered list of
//! [`TierRule`]s; the first rule whose range contains the quantity sets the
//! unit price and the tier label printed next to the product name.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  imanes_3d: [50-99 → $18] [100-299 → $15] [300+ → $12]                 │
//! │                                                                         │
//! │  qty   0  ──► (no scan)            price $0   label ""                  │
//! │  qty  20  ──► no rule matches      price $0   label ""  (below minimum) │
//! │  qty  75  ──► rule 0               price $18  label "50-99 piezas"      │
//! │  qty 450  ──► rule 2               price $12  label "300+ piezas"       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are evaluated in listed order and never sorted. A table listed out
//! of order still resolves first-match-wins; [`TierTable::ordering_issues`]
//! reports such tables so the catalog can warn about them at load time.
//!
//! ## Typed vs raw tables
//! Tables are parsed once, at configuration time, with
//! [`TierTable::from_json`] (typed error). The `*_raw` resolvers accept the
//! legacy string-encoded form per call, log parse failures and degrade to a
//! zero price; they never surface an error to the user.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, TierTableError};
use crate::money::Money;

// =============================================================================
// Tier Rule
// =============================================================================

/// One price band: `min ≤ quantity ≤ max` (or `quantity ≥ min` if unbounded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierRule {
    pub min: u32,

    /// Upper bound, inclusive. `None` means no upper bound. A zero maximum
    /// in tier data is read as unbounded, like the form's tier attributes.
    #[serde(
        default,
        deserialize_with = "upper_bound",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<u32>,

    /// Unit price in this band, written as decimal pesos in tier data.
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub price: Money,
}

impl TierRule {
    pub fn new(min: u32, max: Option<u32>, price: Money) -> Self {
        TierRule { min, max, price }
    }

    /// Bounded rule shorthand with a whole-peso price.
    pub fn bounded(min: u32, max: u32, pesos: i64) -> Self {
        TierRule::new(min, Some(max), Money::from_pesos(pesos))
    }

    /// Unbounded rule shorthand with a whole-peso price.
    pub fn open_ended(min: u32, pesos: i64) -> Self {
        TierRule::new(min, None, Money::from_pesos(pesos))
    }

    /// True when `quantity` falls inside this band.
    #[inline]
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min && self.max.map_or(true, |max| quantity <= max)
    }

    /// `"50-99 piezas"` for bounded bands, `"300+ piezas"` otherwise.
    pub fn label(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{} piezas", self.min, max),
            None => format!("{}+ piezas", self.min),
        }
    }
}

fn upper_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let max = Option::<u32>::deserialize(deserializer)?;
    Ok(max.filter(|&m| m != 0))
}

// =============================================================================
// Tier Table
// =============================================================================

/// An ordered, first-match-wins list of tier rules.
///
/// Only serialized; input tables go through [`TierTable::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TierTable(Vec<TierRule>);

impl TierTable {
    /// Builds a table, rejecting rules that can never match or carry a
    /// negative price. Rule order is kept as given.
    pub fn new(rules: Vec<TierRule>) -> Result<Self, TierTableError> {
        for (index, rule) in rules.iter().enumerate() {
            if let Some(max) = rule.max {
                if max < rule.min {
                    return Err(TierTableError::InvertedBounds {
                        index,
                        min: rule.min,
                        max,
                    });
                }
            }
            if rule.price.cents() < 0 {
                return Err(TierTableError::NegativePrice { index });
            }
        }
        Ok(TierTable(rules))
    }

    /// Parses the JSON tier form: `[{"min":1,"max":99,"price":8}, ...]`.
    pub fn parse_json(json: &str) -> Result<Self, TierTableError> {
        let rules: Vec<TierRule> = serde_json::from_str(json)?;
        TierTable::new(rules)
    }

    /// Parses a product's JSON tier table at configuration time.
    ///
    /// ```rust
    /// use vt_core::tier::TierTable;
    ///
    /// let table = TierTable::from_json("imanes_normal_chico",
    ///     r#"[{"min":1,"max":99,"price":8},{"min":100,"price":6}]"#).unwrap();
    /// assert_eq!(table.rules().len(), 2);
    /// assert!(TierTable::from_json("x", "not json").is_err());
    /// ```
    pub fn from_json(product: &str, json: &str) -> CoreResult<Self> {
        TierTable::parse_json(json).map_err(|source| CoreError::InvalidTierTable {
            product: product.to_string(),
            source,
        })
    }

    pub fn rules(&self) -> &[TierRule] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The single first-match scan both the price and the label use.
    pub fn resolve(&self, quantity: u32) -> Option<&TierRule> {
        if quantity == 0 {
            return None;
        }
        self.0.iter().find(|rule| rule.contains(quantity))
    }

    /// Smallest quantity any rule accepts.
    pub fn minimum_quantity(&self) -> Option<u32> {
        self.0.iter().map(|rule| rule.min.max(1)).min()
    }

    /// Reports rules whose position makes the table depend on listing order.
    ///
    /// Nothing is reordered; first-match-wins stays the resolution rule.
    pub fn ordering_issues(&self) -> Vec<OrderingIssue> {
        let mut issues = Vec::new();
        let last = self.0.len().saturating_sub(1);

        for (index, rule) in self.0.iter().enumerate() {
            if rule.max.is_none() && index != last {
                issues.push(OrderingIssue::UnboundedNotLast { index });
            }

            let Some(previous_index) = index.checked_sub(1) else {
                continue;
            };
            let previous = &self.0[previous_index];

            if rule.min < previous.min {
                issues.push(OrderingIssue::Unsorted { index });
            } else if previous.max.map_or(true, |max| rule.min <= max) {
                issues.push(OrderingIssue::Overlap {
                    index,
                    previous: previous_index,
                });
            }
        }

        issues
    }
}

impl From<Vec<TierRule>> for TierTable {
    /// Wraps rules without validation. Prefer [`TierTable::new`] for input.
    fn from(rules: Vec<TierRule>) -> Self {
        TierTable(rules)
    }
}

/// A tier table shape that makes results depend on rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingIssue {
    /// Rule starts below the rule listed before it.
    Unsorted { index: usize },
    /// Rule's range overlaps the rule listed before it.
    Overlap { index: usize, previous: usize },
    /// An unbounded rule shadows every rule after it.
    UnboundedNotLast { index: usize },
}

impl fmt::Display for OrderingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingIssue::Unsorted { index } => {
                write!(f, "rule {} starts below the previous rule", index)
            }
            OrderingIssue::Overlap { index, previous } => {
                write!(f, "rule {} overlaps rule {}", index, previous)
            }
            OrderingIssue::UnboundedNotLast { index } => {
                write!(f, "unbounded rule {} is not the last rule", index)
            }
        }
    }
}

// =============================================================================
// Resolver Functions
// =============================================================================

/// Unit price for `quantity`, or zero when no rule applies.
///
/// ```rust
/// use vt_core::tier::{resolve_unit_price, TierRule, TierTable};
///
/// let table = TierTable::from(vec![TierRule::bounded(1, 99, 8), TierRule::open_ended(100, 6)]);
/// assert_eq!(resolve_unit_price(50, &table).cents(), 800);
/// assert_eq!(resolve_unit_price(150, &table).cents(), 600);
/// assert_eq!(resolve_unit_price(0, &table).cents(), 0);
/// ```
pub fn resolve_unit_price(quantity: u32, table: &TierTable) -> Money {
    table
        .resolve(quantity)
        .map(|rule| rule.price)
        .unwrap_or_default()
}

/// Tier label for `quantity`, or `""` when no rule applies.
pub fn resolve_tier_label(quantity: u32, table: &TierTable) -> String {
    table
        .resolve(quantity)
        .map(TierRule::label)
        .unwrap_or_default()
}

/// Resolves the price against a string-encoded table.
///
/// Malformed tier data is logged and treated as "no rule matches".
pub fn resolve_unit_price_raw(quantity: u32, tiers_json: &str) -> Money {
    parse_lenient(quantity, tiers_json)
        .map(|table| resolve_unit_price(quantity, &table))
        .unwrap_or_default()
}

/// Resolves the label against a string-encoded table. See
/// [`resolve_unit_price_raw`].
pub fn resolve_tier_label_raw(quantity: u32, tiers_json: &str) -> String {
    parse_lenient(quantity, tiers_json)
        .map(|table| resolve_tier_label(quantity, &table))
        .unwrap_or_default()
}

fn parse_lenient(quantity: u32, tiers_json: &str) -> Option<TierTable> {
    if quantity == 0 {
        return None;
    }
    match TierTable::parse_json(tiers_json) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(error = %e, quantity, "Ignoring malformed tier data");
            None
        }
    }
}

// =============================================================================
// Price Hint
// =============================================================================

/// The per-product hint shown next to a quantity input while typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum PriceHint {
    /// Nothing entered.
    Empty,
    /// A rule matched.
    Priced { unit_price: Money, tier_label: String },
    /// A quantity was entered but no rule accepts it.
    BelowMinimum,
}

impl PriceHint {
    pub fn for_quantity(quantity: u32, table: &TierTable) -> Self {
        if quantity == 0 {
            return PriceHint::Empty;
        }
        match table.resolve(quantity) {
            Some(rule) => PriceHint::Priced {
                unit_price: rule.price,
                tier_label: rule.label(),
            },
            None => PriceHint::BelowMinimum,
        }
    }
}

/// `"$8.00 c/u (1-99 piezas)"`, `"Cantidad mínima no alcanzada"` or `""`.
impl fmt::Display for PriceHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceHint::Empty => Ok(()),
            PriceHint::Priced {
                unit_price,
                tier_label,
            } => write!(f, "{} c/u ({})", unit_price, tier_label),
            PriceHint::BelowMinimum => f.write_str(crate::view::BELOW_MINIMUM_TEXT),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn imanes_3d() -> TierTable {
        TierTable::new(vec![
            TierRule::bounded(50, 99, 18),
            TierRule::bounded(100, 299, 15),
            TierRule::open_ended(300, 12),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_in_band() {
        let table = imanes_3d();
        assert_eq!(resolve_unit_price(50, &table), Money::from_pesos(18));
        assert_eq!(resolve_unit_price(99, &table), Money::from_pesos(18));
        assert_eq!(resolve_unit_price(100, &table), Money::from_pesos(15));
        assert_eq!(resolve_unit_price(5000, &table), Money::from_pesos(12));

        assert_eq!(resolve_tier_label(75, &table), "50-99 piezas");
        assert_eq!(resolve_tier_label(300, &table), "300+ piezas");
    }

    #[test]
    fn test_zero_and_below_minimum() {
        let table = imanes_3d();
        assert_eq!(resolve_unit_price(0, &table), Money::zero());
        assert_eq!(resolve_tier_label(0, &table), "");
        assert_eq!(resolve_unit_price(49, &table), Money::zero());
        assert_eq!(resolve_tier_label(49, &table), "");
    }

    #[test]
    fn test_first_match_wins_on_unsorted_table() {
        // Deliberately unsorted and overlapping: the unbounded rule comes first
        let table = TierTable::from(vec![
            TierRule::open_ended(1, 5),
            TierRule::bounded(1, 99, 8),
        ]);
        assert_eq!(resolve_unit_price(50, &table), Money::from_pesos(5));
        assert_eq!(resolve_tier_label(50, &table), "1+ piezas");

        let table = TierTable::from(vec![
            TierRule::open_ended(100, 6),
            TierRule::bounded(1, 99, 8),
        ]);
        assert_eq!(resolve_unit_price(150, &table), Money::from_pesos(6));
        assert_eq!(resolve_unit_price(10, &table), Money::from_pesos(8));
    }

    #[test]
    fn test_from_json() {
        let table = TierTable::from_json(
            "imanes_normal_chico",
            r#"[{"min":1,"max":99,"price":8},{"min":100,"price":6.5}]"#,
        )
        .unwrap();
        assert_eq!(table.rules()[0], TierRule::bounded(1, 99, 8));
        assert_eq!(table.rules()[1].price.cents(), 650);
        assert_eq!(table.rules()[1].max, None);
    }

    #[test]
    fn test_from_json_null_and_zero_max_are_unbounded() {
        let table = TierTable::parse_json(
            r#"[{"min":1,"max":null,"price":8},{"min":2,"max":0,"price":6}]"#,
        )
        .unwrap();
        assert!(table.rules().iter().all(|rule| rule.max.is_none()));
    }

    #[test]
    fn test_from_json_rejects_bad_tables() {
        let err = TierTable::from_json("llaveros", "[{]").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTierTable { ref product, .. } if product == "llaveros"));

        let err = TierTable::parse_json(r#"[{"min":100,"max":50,"price":6}]"#).unwrap_err();
        assert!(matches!(err, TierTableError::InvertedBounds { index: 0, .. }));

        assert!(TierTable::parse_json(r#"[{"min":1,"price":-6}]"#).is_err());
        assert!(TierTable::parse_json(r#"[{"min":-1,"price":6}]"#).is_err());
    }

    #[test]
    fn test_new_rejects_negative_price() {
        let err = TierTable::new(vec![TierRule::new(1, None, Money::from_cents(-1))]).unwrap_err();
        assert!(matches!(err, TierTableError::NegativePrice { index: 0 }));
    }

    #[test]
    fn test_raw_resolvers_degrade() {
        let json = r#"[{"min":1,"max":99,"price":8}]"#;
        assert_eq!(resolve_unit_price_raw(10, json), Money::from_pesos(8));
        assert_eq!(resolve_tier_label_raw(10, json), "1-99 piezas");

        assert_eq!(resolve_unit_price_raw(10, "garbage"), Money::zero());
        assert_eq!(resolve_tier_label_raw(10, "garbage"), "");
        assert_eq!(resolve_unit_price_raw(0, json), Money::zero());
    }

    #[test]
    fn test_ordering_issues() {
        assert!(imanes_3d().ordering_issues().is_empty());

        let table = TierTable::from(vec![
            TierRule::open_ended(100, 6),
            TierRule::bounded(1, 99, 8),
        ]);
        assert_eq!(
            table.ordering_issues(),
            vec![
                OrderingIssue::UnboundedNotLast { index: 0 },
                OrderingIssue::Unsorted { index: 1 },
            ]
        );

        let table = TierTable::from(vec![
            TierRule::bounded(1, 100, 8),
            TierRule::open_ended(100, 6),
        ]);
        assert_eq!(
            table.ordering_issues(),
            vec![OrderingIssue::Overlap { index: 1, previous: 0 }]
        );
    }

    #[test]
    fn test_minimum_quantity() {
        assert_eq!(imanes_3d().minimum_quantity(), Some(50));
        assert_eq!(TierTable::default().minimum_quantity(), None);
    }

    #[test]
    fn test_price_hint() {
        let table = imanes_3d();
        assert_eq!(PriceHint::for_quantity(0, &table), PriceHint::Empty);
        assert_eq!(PriceHint::for_quantity(10, &table), PriceHint::BelowMinimum);

        let hint = PriceHint::for_quantity(120, &table);
        assert_eq!(hint.to_string(), "$15.00 c/u (100-299 piezas)");
        assert_eq!(PriceHint::BelowMinimum.to_string(), "Cantidad mínima no alcanzada");
        assert_eq!(PriceHint::Empty.to_string(), "");
    }
}
