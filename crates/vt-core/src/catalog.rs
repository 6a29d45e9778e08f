//! # Catalog
//!
//! The ordered product list. Declaration order is the order line items are
//! printed in; each product owns its own tier table.
//!
//! Catalogs are built once, at configuration time. Building one parses and
//! checks every tier table, rejects duplicate ids, and logs (never fixes)
//! tables whose results depend on rule order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::tier::{TierRule, TierTable};
use crate::validation::validate_product_id;

// =============================================================================
// Product
// =============================================================================

/// A sellable product and its quantity-tiered prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: String,
    pub display_name: String,
    pub tier_table: TierTable,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        tier_table: TierTable,
    ) -> Self {
        Product {
            id: id.into(),
            display_name: display_name.into(),
            tier_table,
        }
    }
}

/// A product as written in configuration.
///
/// Tiers come either as a typed list or as the legacy JSON string the quote
/// form carried per input. Exactly one of the two must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tiers: Option<Vec<TierRule>>,
    #[serde(default)]
    pub tiers_json: Option<String>,
}

impl ProductDef {
    pub fn into_product(self) -> CoreResult<Product> {
        validate_product_id(&self.id)?;

        let tier_table = match (self.tiers, self.tiers_json) {
            (Some(rules), None) => {
                TierTable::new(rules).map_err(|source| CoreError::InvalidTierTable {
                    product: self.id.clone(),
                    source,
                })?
            }
            (None, Some(json)) => TierTable::from_json(&self.id, &json)?,
            (Some(_), Some(_)) => {
                return Err(CoreError::InvalidTierTable {
                    product: self.id,
                    source: crate::error::TierTableError::Malformed(
                        "both tiers and tiers_json given".to_string(),
                    ),
                })
            }
            (None, None) => {
                return Err(CoreError::InvalidTierTable {
                    product: self.id,
                    source: crate::error::TierTableError::Malformed(
                        "no tiers given".to_string(),
                    ),
                })
            }
        };

        Ok(Product::new(self.id, self.name, tier_table))
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Ordered, id-unique product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog, keeping declaration order.
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        let mut seen = HashSet::new();

        for product in &products {
            validate_product_id(&product.id)?;

            if !seen.insert(product.id.as_str()) {
                return Err(CoreError::DuplicateProduct(product.id.clone()));
            }

            if product.tier_table.is_empty() {
                warn!(product_id = %product.id, "Product has no tiers and will always price at zero");
            }

            for issue in product.tier_table.ordering_issues() {
                warn!(
                    product_id = %product.id,
                    issue = %issue,
                    "Tier table depends on rule order; first match wins"
                );
            }
        }

        debug!(products = products.len(), "Catalog loaded");
        Ok(Catalog { products })
    }

    /// Builds a catalog from configuration entries.
    pub fn from_defs(defs: Vec<ProductDef>) -> CoreResult<Self> {
        let products = defs
            .into_iter()
            .map(ProductDef::into_product)
            .collect::<CoreResult<Vec<_>>>()?;
        Catalog::new(products)
    }

    /// The VT Anunciando product line.
    pub fn vt_default() -> Self {
        let products = vec![
            Product::new(
                "imanes_normal_chico",
                "Imanes Normales - Chicos",
                TierTable::from(vec![TierRule::bounded(1, 99, 8), TierRule::open_ended(100, 6)]),
            ),
            Product::new(
                "imanes_normal_grande",
                "Imanes Normales - Grandes",
                TierTable::from(vec![TierRule::bounded(1, 99, 12), TierRule::open_ended(100, 10)]),
            ),
            Product::new(
                "imanes_3d",
                "Imanes 3D",
                TierTable::from(vec![
                    TierRule::bounded(50, 99, 18),
                    TierRule::bounded(100, 299, 15),
                    TierRule::open_ended(300, 12),
                ]),
            ),
            Product::new(
                "imanes_foil",
                "Imanes Foil Metálico",
                TierTable::from(vec![
                    TierRule::bounded(50, 99, 20),
                    TierRule::bounded(100, 299, 17),
                    TierRule::open_ended(300, 14),
                ]),
            ),
            Product::new(
                "llaveros",
                "Llaveros (argolla reforzada)",
                TierTable::from(vec![TierRule::bounded(1, 99, 15), TierRule::open_ended(100, 12)]),
            ),
            Product::new(
                "destapadores",
                "Destapadores (doble remache, herraje completo, imán)",
                TierTable::from(vec![TierRule::bounded(1, 99, 25), TierRule::open_ended(100, 20)]),
            ),
            Product::new(
                "portallaves",
                "Portallaves (MDF 4.5mm)",
                TierTable::from(vec![TierRule::bounded(10, 49, 45), TierRule::open_ended(50, 38)]),
            ),
        ];
        Catalog { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TierTableError;
    use crate::money::Money;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = Catalog::vt_default();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.products()[0].id, "imanes_normal_chico");

        // Re-validating the built-in catalog must succeed
        let rebuilt = Catalog::new(catalog.products().to_vec()).unwrap();
        assert_eq!(rebuilt, catalog);
        for product in catalog.iter() {
            assert!(product.tier_table.ordering_issues().is_empty(), "{}", product.id);
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let table = TierTable::from(vec![TierRule::open_ended(1, 8)]);
        let err = Catalog::new(vec![
            Product::new("llaveros", "A", table.clone()),
            Product::new("llaveros", "B", table),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateProduct(id) if id == "llaveros"));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let err = Catalog::new(vec![Product::new("Bad Id", "X", TierTable::default())]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_from_defs_typed_and_json() {
        let defs = vec![
            ProductDef {
                id: "a".to_string(),
                name: "A".to_string(),
                tiers: Some(vec![TierRule::bounded(1, 9, 3)]),
                tiers_json: None,
            },
            ProductDef {
                id: "b".to_string(),
                name: "B".to_string(),
                tiers: None,
                tiers_json: Some(r#"[{"min":1,"price":2.5}]"#.to_string()),
            },
        ];
        let catalog = Catalog::from_defs(defs).unwrap();
        assert_eq!(catalog.get("b").unwrap().tier_table.rules()[0].price, Money::from_cents(250));
        assert!(catalog.contains("a"));
        assert!(!catalog.contains("c"));
    }

    #[test]
    fn test_from_defs_rejects_missing_or_double_tiers() {
        let neither = ProductDef {
            id: "a".to_string(),
            name: "A".to_string(),
            tiers: None,
            tiers_json: None,
        };
        assert!(matches!(
            neither.into_product(),
            Err(CoreError::InvalidTierTable { source: TierTableError::Malformed(_), .. })
        ));

        let inverted = ProductDef {
            id: "a".to_string(),
            name: "A".to_string(),
            tiers: Some(vec![TierRule::bounded(10, 5, 3)]),
            tiers_json: None,
        };
        assert!(inverted.into_product().is_err());
    }
}
