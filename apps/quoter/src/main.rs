//! # VT Quoter Entry Point
//!
//! Reads one quote request (JSON) from stdin and writes the document and the
//! receipt image into the configured output directory.
//!
//! ```text
//!   stdin ──► QuoteRequest ──► QuoteService ──► Factura_<id>_<client>.pdf
//!                                           └─► Recibo_<id>_<client>.png
//!   stdout ◄── outcomes (JSON)        stderr ◄── logs
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (file, then environment)
//! 3. Read the request
//! 4. Save the document and the image under one invoice id

use tokio::io::AsyncReadExt;
use tracing::{error, info};

use vt_quoter::{init_tracing, QuoteRequest, QuoteService, QuoterConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = QuoterConfig::load(None)?;
    info!(
        output_dir = %config.output.dir.display(),
        products = config.catalog.len(),
        "Configuration loaded"
    );

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let request: QuoteRequest = serde_json::from_str(&input)?;

    let service = QuoteService::from_config(&config)?;

    match service.generate_both(&request).await {
        Ok(outcomes) => {
            for outcome in &outcomes {
                info!(path = ?outcome.path, "{}", outcome.message);
            }
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            Ok(())
        }
        Err(err) => {
            error!(code = ?err.code, "{}", err.message);
            eprintln!("{}", serde_json::to_string(&err)?);
            std::process::exit(1);
        }
    }
}
