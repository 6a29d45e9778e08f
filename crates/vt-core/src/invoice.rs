//! # Invoice Identifiers
//!
//! One identifier per generated quote, shared by both renderings and both
//! output filenames.
//!
//! ```text
//! VT-20261015-142530
//! ── ──────── ──────
//! │     │       └── local time HHMMSS
//! │     └────────── local date YYYYMMDD
//! └──────────────── prefix
//!
//! Factura_VT-20261015-142530_Ana_López.pdf
//! Recibo_VT-20261015-142530_Ana_López.png
//! ```

use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Quote identifier, e.g. `VT-20261015-142530`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Builds the identifier for a given local timestamp.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use vt_core::invoice::InvoiceId;
    ///
    /// let at = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(9, 5, 7).unwrap();
    /// assert_eq!(InvoiceId::from_timestamp("VT", at).as_str(), "VT-20261015-090507");
    /// ```
    pub fn from_timestamp(prefix: &str, at: NaiveDateTime) -> Self {
        InvoiceId(format!("{}-{}", prefix, at.format("%Y%m%d-%H%M%S")))
    }

    /// Identifier for the current local time.
    pub fn now(prefix: &str) -> Self {
        InvoiceId::from_timestamp(prefix, Local::now().naive_local())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Factura_<id>_<client>.pdf`
    pub fn document_filename(&self, client_name: &str) -> String {
        format!("Factura_{}_{}.pdf", self.0, filename_component(client_name))
    }

    /// `Recibo_<id>_<client>.png`
    pub fn image_filename(&self, client_name: &str) -> String {
        format!("Recibo_{}_{}.png", self.0, filename_component(client_name))
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replaces each whitespace run with `_`. Path separators are replaced too so
/// the name stays a single path component.
fn filename_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        out.push(if c == '/' || c == '\\' { '-' } else { c });
    }

    out
}

// =============================================================================
// Dates
// =============================================================================

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Long-form es-MX date: `"15 de octubre de 2026"`.
pub fn format_long_date(date: NaiveDate) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

// =============================================================================
// Unit Tests
// =============================================================================
