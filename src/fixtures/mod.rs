//! Fixtures
//!
//! YAML-backed product catalogs for demos and tests. A fixture file defines
//! products with minor-unit prices (optionally per currency); the parsed set
//! can be turned into an [`EntityRegistry`] backed by in-memory catalogs.

use std::{collections::BTreeMap, fs, path::PathBuf, sync::Arc};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    context::PricingContext,
    entities::{BuyableId, Entity, EntityError, EntityLoader, EntityRegistry, Priceable},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

fn default_kind() -> String {
    "product".to_string()
}

/// A catalog product used by demos and tests.
///
/// Prices are quoted in minor units; `prices` holds per-currency overrides of
/// the default `price`, which makes context-sensitive resolution observable.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureProduct {
    #[serde(default = "default_kind")]
    kind: String,
    id: BuyableId,
    #[serde(default)]
    name: String,
    price: u64,
    #[serde(default)]
    prices: FxHashMap<String, u64>,
    #[serde(default)]
    original_price: Option<u64>,
}

impl FixtureProduct {
    /// Creates a product of the given kind with a flat price.
    pub fn priced(kind: impl Into<String>, id: impl Into<BuyableId>, price: u64) -> Self {
        FixtureProduct {
            kind: kind.into(),
            id: id.into(),
            name: String::new(),
            price,
            prices: FxHashMap::default(),
            original_price: None,
        }
    }

    /// Adds a per-currency price override (ISO alpha code).
    #[must_use]
    pub fn with_price_for(mut self, currency: impl Into<String>, price: u64) -> Self {
        self.prices.insert(currency.into(), price);
        self
    }

    /// Sets the pre-discount price.
    #[must_use]
    pub fn with_original(mut self, original_price: u64) -> Self {
        self.original_price = Some(original_price);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The product's entity kind tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The product's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wraps the product as a shared catalog entity.
    #[must_use]
    pub fn into_entity(self) -> Arc<dyn Entity> {
        Arc::new(self)
    }
}

impl Entity for FixtureProduct {
    fn id(&self) -> BuyableId {
        self.id.clone()
    }

    fn as_priceable(&self) -> Option<&dyn Priceable> {
        Some(self)
    }
}

impl Priceable for FixtureProduct {
    fn price(&self, context: &PricingContext) -> u64 {
        self.prices
            .get(context.currency().iso_alpha_code)
            .copied()
            .unwrap_or(self.price)
    }

    fn original_price(&self) -> u64 {
        self.original_price.unwrap_or(self.price)
    }
}

/// In-memory entity catalog for one kind.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entities: FxHashMap<BuyableId, Arc<dyn Entity>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, keyed by its own identifier.
    pub fn insert(&mut self, entity: Arc<dyn Entity>) {
        self.entities.insert(entity.id(), entity);
    }
}

impl EntityLoader for InMemoryCatalog {
    fn load_many(
        &self,
        ids: &[BuyableId],
    ) -> Result<FxHashMap<BuyableId, Arc<dyn Entity>>, EntityError> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.entities
                    .get(id)
                    .map(|entity| (id.clone(), Arc::clone(entity)))
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: BTreeMap<String, FixtureProduct>,
}

/// A parsed product catalog fixture.
#[derive(Debug)]
pub struct CatalogFixture {
    products: BTreeMap<String, FixtureProduct>,
}

impl CatalogFixture {
    /// Parses a catalog fixture from YAML contents.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the YAML cannot be parsed.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let file: CatalogFile = serde_norway::from_str(contents)?;

        Ok(CatalogFixture {
            products: file.products,
        })
    }

    /// Loads a catalog fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path.into())?;

        Self::from_yaml(&contents)
    }

    /// Gets a product by its fixture key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] if the key is unknown.
    pub fn product(&self, key: &str) -> Result<&FixtureProduct, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Builds an entity registry with one in-memory catalog per product kind.
    #[must_use]
    pub fn registry(&self) -> EntityRegistry {
        let mut catalogs: FxHashMap<String, InMemoryCatalog> = FxHashMap::default();

        for product in self.products.values() {
            catalogs
                .entry(product.kind().to_string())
                .or_default()
                .insert(product.clone().into_entity());
        }

        let mut registry = EntityRegistry::new();

        for (kind, catalog) in catalogs {
            registry.register(kind, Box::new(catalog));
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    const CATALOG_YAML: &str = r"
products:
  tee:
    id: 1
    name: Logo tee
    price: 1999
    prices:
      USD: 2199
    original_price: 2499
  gift:
    kind: gift_card
    id: gc-50
    name: Gift card
    price: 5000
";

    #[test]
    fn parses_products_from_yaml() -> TestResult {
        let fixture = CatalogFixture::from_yaml(CATALOG_YAML)?;

        let tee = fixture.product("tee")?;
        assert_eq!(tee.kind(), "product");
        assert_eq!(tee.name(), "Logo tee");
        assert_eq!(tee.original_price(), 2499);

        let gift = fixture.product("gift")?;
        assert_eq!(gift.kind(), "gift_card");
        assert_eq!(gift.id(), BuyableId::from("gc-50"));

        Ok(())
    }

    #[test]
    fn unknown_product_key_errors() -> TestResult {
        let fixture = CatalogFixture::from_yaml(CATALOG_YAML)?;

        let result = fixture.product("socks");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));

        Ok(())
    }

    #[test]
    fn prices_vary_by_context_currency() -> TestResult {
        let fixture = CatalogFixture::from_yaml(CATALOG_YAML)?;
        let tee = fixture.product("tee")?;

        let gbp = PricingContext::new("main", GBP, "en-GB");
        let usd = PricingContext::new("main", USD, "en-US");

        assert_eq!(tee.price(&gbp), 1999);
        assert_eq!(tee.price(&usd), 2199);

        Ok(())
    }

    #[test]
    fn registry_covers_each_kind() -> TestResult {
        let fixture = CatalogFixture::from_yaml(CATALOG_YAML)?;

        let registry = fixture.registry();

        assert!(registry.is_registered("product"));
        assert!(registry.is_registered("gift_card"));

        Ok(())
    }

    #[test]
    fn in_memory_catalog_returns_present_subset() -> TestResult {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert(FixtureProduct::priced("product", 1_u64, 100).into_entity());

        let loaded = catalog.load_many(&[BuyableId::from(1), BuyableId::from(2)])?;

        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key(&BuyableId::from(1)));

        Ok(())
    }
}
