//! # Business Profile
//!
//! The fixed content printed on every quote: who is selling, where to pay,
//! and where to send invoicing details.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ VT Anunciando        RECIBO  │ ◄── name
//! │ address lines, phone         │ ◄── address_lines, phone
//! │ ...                          │
//! │ ┌── MÉTODOS DE PAGO ───────┐ │ ◄── payment_methods (always)
//! │ └──────────────────────────┘ │
//! │ ┌── DATOS PARA FACTURACIÓN ┐ │ ◄── billing (invoice orders only)
//! │ └──────────────────────────┘ │
//! │   Gracias por su preferencia │ ◄── footer
//! └──────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// One way to pay the deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub title: String,
    pub account: String,
    pub bank: String,
    pub holder: String,
}

impl PaymentMethod {
    pub fn new(
        title: impl Into<String>,
        account: impl Into<String>,
        bank: impl Into<String>,
        holder: impl Into<String>,
    ) -> Self {
        PaymentMethod {
            title: title.into(),
            account: account.into(),
            bank: bank.into(),
            holder: holder.into(),
        }
    }
}

/// Where invoice (factura) payments go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub beneficiary: String,
    pub clabe: String,
    pub account: String,
}

/// Seller identity and payment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub payment_methods: Vec<PaymentMethod>,
    pub billing: BillingDetails,
    pub footer: String,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        BusinessProfile {
            name: "VT Anunciando".to_string(),
            address_lines: vec![
                "Fray Juan de Torquemada 146-Int 6".to_string(),
                "Obrera, Cuauhtémoc".to_string(),
                "06800 Ciudad de México, CDMX".to_string(),
            ],
            phone: "55 3825 3251".to_string(),
            payment_methods: vec![
                PaymentMethod::new(
                    "TRANSFERENCIA BANCARIA",
                    "012 180 01571714055 4",
                    "BBVA",
                    "Iván Valencia",
                ),
                PaymentMethod::new(
                    "DEPÓSITO EN BANCO/CAJERO/OXXO",
                    "4152 3138 4049 8567",
                    "BBVA",
                    "Iván Valencia",
                ),
            ],
            billing: BillingDetails {
                beneficiary: "Alejandra Pérez Sierra".to_string(),
                clabe: "012180004835769653".to_string(),
                account: "0483576965".to_string(),
            },
            footer: "Gracias por su preferencia".to_string(),
        }
    }
}

impl Default for BillingDetails {
    fn default() -> Self {
        BusinessProfile::default().billing
    }
}
