//! # Validation Module
//!
//! Input validation for quote requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Order (fail fast)                       │
//! │                                                                         │
//! │  1. client name      → "Por favor ingrese el nombre del cliente"       │
//! │  2. client phone     → "Por favor ingrese el teléfono del cliente"     │
//! │  3. date             → "Por favor seleccione una fecha"                │
//! │  4. ≥ 1 line item    → "Por favor seleccione al menos un producto"     │
//! │                                                                         │
//! │  The first failure stops the action. Nothing is rendered or written.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Live preview never validates; it renders whatever the form currently holds.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::line_item::LineItem;
use crate::types::{ClientInfo, TaxRate};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product id.
pub const MAX_PRODUCT_ID_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates the client name. Returns the trimmed name. Only presence is
/// checked; long names are accepted as typed.
///
/// ```rust
/// use vt_core::validation::validate_client_name;
///
/// assert_eq!(validate_client_name("  Ana López ").unwrap(), "Ana López");
/// assert!(validate_client_name("   ").is_err());
/// ```
pub fn validate_client_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("client_name"));
    }

    Ok(name.to_string())
}

/// Validates the client phone. Only presence is checked; the number is
/// printed as typed.
pub fn validate_client_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::required("client_phone"));
    }

    Ok(phone.to_string())
}

/// Parses the order date (`YYYY-MM-DD`, as a date input submits it).
pub fn validate_date(date: Option<&str>) -> ValidationResult<NaiveDate> {
    let raw = date.map(str::trim).unwrap_or_default();

    if raw.is_empty() {
        return Err(ValidationError::required("date"));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format("date", "expected YYYY-MM-DD"))
}

/// Validates a catalog product id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Only lowercase ASCII letters, digits and underscores
///
/// ```rust
/// use vt_core::validation::validate_product_id;
///
/// assert!(validate_product_id("imanes_3d").is_ok());
/// assert!(validate_product_id("Imanes 3D").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::required("product_id"));
    }

    if id.len() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "product_id",
            "must contain only lowercase letters, digits and underscores",
        ));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.bps() > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Quote Validators
// =============================================================================

/// Validates the client block in form order and builds a [`ClientInfo`].
///
/// Notes are optional and kept verbatim.
pub fn validate_client(
    name: &str,
    phone: &str,
    date: Option<&str>,
    notes: &str,
) -> ValidationResult<ClientInfo> {
    let name = validate_client_name(name)?;
    let phone = validate_client_phone(phone)?;
    let date = validate_date(date)?;

    Ok(ClientInfo::new(name, phone, date).with_notes(notes))
}

/// Rejects an order with no priced products.
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
