//! Priceable entities
//!
//! The boundary to the external catalog: entity records are fetched in
//! batches by a per-kind [`EntityLoader`], and expose their price through the
//! [`Priceable`] capability. Loaders are registered up front in an
//! [`EntityRegistry`], so the set of supported entity kinds is known at
//! startup rather than discovered at resolution time.

use std::{fmt, sync::Arc};

use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::PricingContext;

/// Errors raised at the entity repository boundary.
#[derive(Debug, Error)]
pub enum EntityError {
    /// The underlying repository failed to perform a batch lookup.
    #[error("entity lookup for kind {kind} failed: {source}")]
    Lookup {
        /// Entity kind the lookup was issued for.
        kind: String,

        /// Error reported by the repository.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EntityError {
    /// Wraps a repository failure for the given entity kind.
    pub fn lookup(
        kind: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EntityError::Lookup {
            kind: kind.into(),
            source: source.into(),
        }
    }
}

/// Identifier of a purchasable entity within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuyableId {
    /// Numeric identifier.
    Number(u64),

    /// String identifier.
    Key(String),
}

impl fmt::Display for BuyableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuyableId::Number(id) => write!(f, "{id}"),
            BuyableId::Key(key) => f.write_str(key),
        }
    }
}

impl From<u64> for BuyableId {
    fn from(id: u64) -> Self {
        BuyableId::Number(id)
    }
}

impl From<&str> for BuyableId {
    fn from(key: &str) -> Self {
        BuyableId::Key(key.to_string())
    }
}

impl From<String> for BuyableId {
    fn from(key: String) -> Self {
        BuyableId::Key(key)
    }
}

/// Capability of quoting a price under a pricing context.
pub trait Priceable {
    /// Unit price in minor units under the given context.
    fn price(&self, context: &PricingContext) -> u64;

    /// Pre-discount price in minor units, independent of context.
    fn original_price(&self) -> u64;
}

/// A catalog record that a line item can reference.
///
/// Not every record is purchasable; [`Entity::as_priceable`] distinguishes a
/// present-but-unpriceable record from a missing one.
pub trait Entity: fmt::Debug + Send + Sync {
    /// The record's own identifier.
    fn id(&self) -> BuyableId;

    /// The pricing capability, if this record has one.
    fn as_priceable(&self) -> Option<&dyn Priceable>;
}

/// Batch "find many by id set" lookup for one entity kind.
#[automock]
pub trait EntityLoader: Send + Sync {
    /// Loads the records for the given set of identifiers.
    ///
    /// Identifiers with no backing record are simply absent from the returned
    /// map; the result may be empty.
    ///
    /// # Errors
    ///
    /// Returns an [`EntityError`] if the underlying repository fails.
    fn load_many(
        &self,
        ids: &[BuyableId],
    ) -> Result<FxHashMap<BuyableId, Arc<dyn Entity>>, EntityError>;
}

/// Open registry mapping each entity kind tag to its loader.
#[derive(Default)]
pub struct EntityRegistry {
    loaders: FxHashMap<String, Box<dyn EntityLoader>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loader for an entity kind, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, loader: Box<dyn EntityLoader>) {
        self.loaders.insert(kind.into(), loader);
    }

    /// Returns the loader for an entity kind, if one is registered.
    #[must_use]
    pub fn loader(&self, kind: &str) -> Option<&dyn EntityLoader> {
        self.loaders.get(kind).map(Box::as_ref)
    }

    /// Whether a loader is registered for the given kind.
    #[must_use]
    pub fn is_registered(&self, kind: &str) -> bool {
        self.loaders.contains_key(kind)
    }

    /// Iterates over the registered entity kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("kinds", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}
