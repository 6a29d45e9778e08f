//! # VT Quoter
//!
//! Application shell around the pricing engine and the renderers.
//!
//! ## Module Organization
//! ```text
//! vt_quoter/
//! ├── lib.rs          ◄─── You are here (tracing setup, exports)
//! ├── actions.rs      ◄─── QuoteService: preview, build_order, 3 actions
//! ├── config.rs       ◄─── QuoterConfig (TOML + env)
//! ├── delivery.rs     ◄─── ArtifactSink / Clipboard seams, FileSink
//! └── error.rs        ◄─── ApiError for every action
//! ```

pub mod actions;
pub mod config;
pub mod delivery;
pub mod error;

pub use actions::{ActionOutcome, Delivery, Platform, QuotePreview, QuoteRequest, QuoteService};
pub use config::{ConfigError, QuoterConfig};
pub use delivery::{Artifact, ArtifactSink, Clipboard, DeliveryError, FileSink, UnavailableClipboard};
pub use error::{ApiError, ErrorCode};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vt=trace` - Show trace for vt crates only
/// - Default: INFO, DEBUG for vt crates
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,vt=debug"));

    // Logs go to stderr; stdout carries the action outcome
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
