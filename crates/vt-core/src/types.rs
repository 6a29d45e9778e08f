//! # Domain Types
//!
//! Small value types shared across the engine.
//!
//! ```text
//! ┌─────────────────┐   ┌──────────────────────────┐
//! │    TaxRate      │   │       ClientInfo         │
//! │  ─────────────  │   │  ──────────────────────  │
//! │  bps (u32)      │   │  name, phone             │
//! │  1600 = 16%     │   │  date (NaiveDate), notes │
//! └─────────────────┘   └──────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so IVA 16% is exactly `1600`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Short percentage label: `"16%"`, or `"8.25%"` for fractional rates.
    pub fn label(&self) -> String {
        percent_label(self.0)
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Formats basis points as a percentage without trailing zeros.
pub(crate) fn percent_label(bps: u32) -> String {
    let whole = bps / 100;
    let frac = bps % 100;
    if frac == 0 {
        format!("{}%", whole)
    } else if frac % 10 == 0 {
        format!("{}.{}%", whole, frac / 10)
    } else {
        format!("{}.{:02}%", whole, frac)
    }
}

// =============================================================================
// Client Info
// =============================================================================

/// The client block of a quote, after validation.
///
/// Notes are kept verbatim; whether the notes panel appears is decided on
/// the trimmed text when the view is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, date: NaiveDate) -> Self {
        ClientInfo {
            name: name.into(),
            phone: phone.into(),
            date,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Notes with surrounding whitespace removed, or `None` when blank.
    pub fn trimmed_notes(&self) -> Option<&str> {
        let notes = self.notes.trim();
        (!notes.is_empty()).then_some(notes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1600);
        assert_eq!(rate.bps(), 1600);
        assert!((rate.percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(16.0).bps(), 1600);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_percent_labels() {
        assert_eq!(TaxRate::from_bps(1600).label(), "16%");
        assert_eq!(TaxRate::from_bps(825).label(), "8.25%");
        assert_eq!(TaxRate::from_bps(750).label(), "7.5%");
        assert_eq!(percent_label(5000), "50%");
    }

    #[test]
    fn test_trimmed_notes() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let client = ClientInfo::new("Ana", "5512345678", date);
        assert_eq!(client.trimmed_notes(), None);

        let client = client.with_notes("  \n\t ");
        assert_eq!(client.trimmed_notes(), None);

        let client = client.with_notes("  Entregar en recepción ");
        assert_eq!(client.trimmed_notes(), Some("Entregar en recepción"));
    }
}
