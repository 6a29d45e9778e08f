//! # vt-core: Pure Pricing Engine for VT Quote
//!
//! This crate is the **heart** of VT Quote. It turns a quote form (client,
//! per-product quantities, invoice flag) into a fully priced order and the
//! pre-resolved view both document renderers consume. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VT Quote Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/quoter                                  │   │
//! │  │   QuoteRequest ──► QuoteService ──► FileSink / Clipboard        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vt-core (THIS CRATE) ★                          │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌────────────┐  ┌──────────┐  ┌────────────┐  │   │
//! │  │   │   tier   │─►│ line_item  │─►│  order   │─►│    view    │  │   │
//! │  │   │ resolver │  │  builder   │  │aggregator│  │ (renderable)│  │   │
//! │  │   └──────────┘  └────────────┘  └──────────┘  └─────┬──────┘  │   │
//! │  │                                                     │          │   │
//! │  │   NO I/O • NO FILES • NO CLIPBOARD • PURE FUNCTIONS │          │   │
//! │  └─────────────────────────────────────────────────────┼──────────┘   │
//! │                                                        │              │
//! │  ┌─────────────────────────────────────────────────────▼──────────┐   │
//! │  │                    vt-render                                    │   │
//! │  │          paginated document (PDF) + flattened image (PNG)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Small shared value types (TaxRate, ClientInfo)
//! - [`tier`] - Quantity-tiered unit price resolution
//! - [`catalog`] - The ordered product list and its tier tables
//! - [`line_item`] - Quantities → priced line items
//! - [`order`] - Totals, delivery, IVA and deposit
//! - [`view`] - The renderable order view shared by both renderers
//! - [`invoice`] - Invoice identifiers, filenames, long-form dates
//! - [`profile`] - Fixed business content printed on every quote
//! - [`validation`] - Quote input validation (fail fast)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use vt_core::catalog::Catalog;
//! use vt_core::line_item::{build_line_items, Quantities};
//! use vt_core::order::{OrderTotals, PricingPolicy};
//!
//! let catalog = Catalog::vt_default();
//! let quantities = Quantities::from_pairs([("imanes_normal_chico", 50)]);
//! let items = build_line_items(&catalog, &quantities);
//!
//! let totals = OrderTotals::compute(&items, false, &PricingPolicy::default());
//! assert_eq!(totals.grand_total.cents(), 61000);    // $400 + $210 delivery
//! assert_eq!(totals.deposit_amount.cents(), 30500); // 50%
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod invoice;
pub mod line_item;
pub mod money;
pub mod order;
pub mod profile;
pub mod tier;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, Product};
pub use invoice::{format_long_date, InvoiceId};
pub use error::{CoreError, CoreResult, TierTableError, ValidationError};
pub use line_item::{build_line_items, LineItem, Quantities};
pub use money::Money;
pub use order::{aggregate, DeliveryAssessment, Order, OrderContext, OrderTotals, PricingPolicy};
pub use profile::BusinessProfile;
pub use tier::{resolve_tier_label, resolve_unit_price, PriceHint, TierRule, TierTable};
pub use types::*;
pub use view::{RenderableOrderView, ViewField};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency marker appended to every amount on the rendered quote.
pub const CURRENCY_CODE: &str = "MXN";

/// Flat delivery fee charged below the free-delivery threshold ($210.00).
pub const DEFAULT_DELIVERY_FEE: Money = Money::from_cents(21_000);

/// Total piece count at which delivery becomes free.
pub const FREE_DELIVERY_MIN_QUANTITY: u32 = 300;

/// IVA, applied to subtotal + delivery when an invoice is requested.
pub const IVA_RATE: TaxRate = TaxRate::from_bps(1600);

/// Deposit owed up front, in basis points of the grand total.
pub const DEPOSIT_BPS: u32 = 5000;

/// Prefix of generated invoice identifiers (`VT-20261015-142530`).
pub const DEFAULT_INVOICE_PREFIX: &str = "VT";
