//! # Quoter Configuration
//!
//! Everything the quoter needs that is not typed into the form.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VT_OUTPUT_DIR=/srv/quotes                                          │
//! │     VT_INVOICE_PREFIX=VT                                               │
//! │     VT_TAX_RATE=16          (percent)                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     VT_CONFIG_PATH, or the platform config dir:                        │
//! │     ~/.config/vt-quote/quoter.toml (Linux)                             │
//! │     ~/Library/Application Support/mx.vt.vt-quote/quoter.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     VT Anunciando profile, IVA 16%, $210 delivery, built-in catalog    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [business]
//! name = "VT Anunciando"
//! phone = "55 3825 3251"
//!
//! [pricing]
//! delivery_fee = 210.0
//! free_delivery_min_quantity = 300
//! tax_rate = 1600     # basis points
//! deposit_bps = 5000
//!
//! [output]
//! dir = "/home/ana/Descargas"
//! invoice_prefix = "VT"
//!
//! [[catalog]]
//! id = "imanes_3d"
//! name = "Imanes 3D"
//! tiers = [{ min = 50, max = 99, price = 18.0 }, { min = 100, price = 15.0 }]
//!
//! [[catalog]]
//! id = "llaveros"
//! name = "Llaveros"
//! tiers_json = '[{"min":1,"max":99,"price":15},{"min":100,"max":null,"price":12}]'
//! ```
//!
//! An empty `[[catalog]]` list means the built-in product line.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use vt_core::catalog::ProductDef;
use vt_core::{BusinessProfile, Catalog, CoreError, PricingPolicy, TaxRate, DEFAULT_INVOICE_PREFIX};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "quoter.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Catalog entries or pricing rejected by the engine.
    #[error("Invalid catalog or pricing: {0}")]
    Catalog(#[from] CoreError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Output Settings
// =============================================================================

/// Where artifacts go and how they are named.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputSettings {
    /// Directory generated documents and images are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Prefix of generated invoice ids.
    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,
}

/// The user's downloads folder, like the browser would use.
fn default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_invoice_prefix() -> String {
    DEFAULT_INVOICE_PREFIX.to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            dir: default_output_dir(),
            invoice_prefix: default_invoice_prefix(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete quoter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoterConfig {
    /// Seller identity and payment details printed on every quote.
    #[serde(default)]
    pub business: BusinessProfile,

    #[serde(default)]
    pub pricing: PricingPolicy,

    #[serde(default)]
    pub output: OutputSettings,

    /// Product line in display order. Empty means the built-in catalog.
    #[serde(default)]
    pub catalog: Vec<ProductDef>,
}

impl QuoterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`quoter.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("VT_CONFIG_PATH").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading quoter config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load quoter config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file body.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration, catalog included.
    pub fn validate(&self) -> ConfigResult<()> {
        self.pricing.validate()?;

        if self.output.invoice_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("output.invoice_prefix must not be empty".into()));
        }

        if self.business.payment_methods.is_empty() {
            return Err(ConfigError::Invalid(
                "business.payment_methods must list at least one method".into(),
            ));
        }

        self.build_catalog()?;
        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// [`load`](Self::load)).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("VT_OUTPUT_DIR") {
            debug!(dir = %dir, "Overriding output directory from environment");
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(prefix) = lookup("VT_INVOICE_PREFIX") {
            self.output.invoice_prefix = prefix;
        }

        if let Some(rate) = lookup("VT_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if (0.0..=100.0).contains(&pct) => {
                    debug!(percent = pct, "Overriding tax rate from environment");
                    self.pricing.tax_rate = TaxRate::from_percentage(pct);
                }
                _ => warn!(value = %rate, "Ignoring invalid VT_TAX_RATE"),
            }
        }
    }

    /// Builds the product catalog this configuration describes.
    pub fn build_catalog(&self) -> ConfigResult<Catalog> {
        if self.catalog.is_empty() {
            return Ok(Catalog::vt_default());
        }
        Ok(Catalog::from_defs(self.catalog.clone())?)
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("mx", "vt", "vt-quote")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = QuoterConfig::default();
        assert_eq!(config.pricing, PricingPolicy::default());
        assert_eq!(config.output.invoice_prefix, "VT");
        assert!(config.validate().is_ok());
        assert_eq!(config.build_catalog().unwrap().len(), 7);
    }

    #[test]
    fn test_toml_parsing() {
        let config = QuoterConfig::from_toml_str(
            r#"
            [business]
            name = "Taller Norte"

            [pricing]
            delivery_fee = 150.0
            tax_rate = 800

            [output]
            dir = "/tmp/quotes"

            [[catalog]]
            id = "imanes_3d"
            name = "Imanes 3D"
            tiers = [{ min = 50, max = 99, price = 18.0 }, { min = 100, price = 15.0 }]

            [[catalog]]
            id = "llaveros"
            name = "Llaveros"
            tiers_json = '[{"min":1,"max":99,"price":15},{"min":100,"max":null,"price":12}]'
            "#,
        )
        .unwrap();

        assert_eq!(config.business.name, "Taller Norte");
        assert_eq!(config.business.footer, "Gracias por su preferencia");
        assert_eq!(config.pricing.delivery_fee.cents(), 15000);
        assert_eq!(config.pricing.tax_rate.bps(), 800);
        assert_eq!(config.pricing.free_delivery_min_quantity, 300);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/quotes"));
        assert_eq!(config.output.invoice_prefix, "VT");

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[0].id, "imanes_3d");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VT_OUTPUT_DIR", "/srv/quotes"),
            ("VT_INVOICE_PREFIX", "COT"),
            ("VT_TAX_RATE", "8"),
        ]
        .into_iter()
        .collect();

        let mut config = QuoterConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.output.dir, PathBuf::from("/srv/quotes"));
        assert_eq!(config.output.invoice_prefix, "COT");
        assert_eq!(config.pricing.tax_rate.bps(), 800);
    }

    #[test]
    fn test_invalid_tax_override_is_ignored() {
        let mut config = QuoterConfig::default();
        config.apply_overrides(|key| (key == "VT_TAX_RATE").then(|| "mucho".to_string()));
        assert_eq!(config.pricing.tax_rate.bps(), 1600);
    }

    #[test]
    fn test_validation_rejects_bad_catalog() {
        let config = QuoterConfig::from_toml_str(
            r#"
            [[catalog]]
            id = "imanes_3d"
            name = "Imanes 3D"
            tiers_json = 'not json'
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Catalog(_))));

        let mut config = QuoterConfig::default();
        config.output.invoice_prefix = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuoterConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.output.invoice_prefix, "VT");
    }
}
