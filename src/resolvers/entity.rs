//! Entity Price Resolver

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::{
    context::PricingContext,
    entities::{BuyableId, Entity, EntityRegistry},
    items::{LineItem, RowId, collection::LineItemCollection},
    prices::ResolvedPrice,
    resolvers::{PriceResolver, ResolvePriceError},
};

/// Resolves prices by batch-loading backing entities from the registry.
///
/// Items are grouped by entity kind and each kind gets at most one repository
/// lookup per pass, so a collection spanning T kinds costs T external calls
/// regardless of how many rows it holds. Items that already carry a loaded
/// model are priced from it without refetching.
#[derive(Debug, Clone)]
pub struct EntityPriceResolver {
    registry: Arc<EntityRegistry>,
}

impl EntityPriceResolver {
    /// Creates a resolver over the given entity registry.
    #[must_use]
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        EntityPriceResolver { registry }
    }
}

impl PriceResolver for EntityPriceResolver {
    fn resolve(
        &self,
        item: &LineItem,
        context: &PricingContext,
    ) -> Result<ResolvedPrice, ResolvePriceError> {
        let mut items = LineItemCollection::new();
        items.push(item.clone());

        let mut resolved = self.resolve_many(&items, context)?;

        resolved
            .remove(item.row_id())
            .ok_or_else(|| ResolvePriceError::MissingRow {
                row_id: item.row_id().clone(),
            })
    }

    fn resolve_many(
        &self,
        items: &LineItemCollection,
        context: &PricingContext,
    ) -> Result<FxHashMap<RowId, ResolvedPrice>, ResolvePriceError> {
        if items.is_empty() {
            return Ok(FxHashMap::default());
        }

        let mut fetched: FxHashMap<&str, FxHashMap<BuyableId, Arc<dyn Entity>>> =
            FxHashMap::default();

        for (kind, group) in items.group_by_kind() {
            let mut seen: FxHashSet<&BuyableId> = FxHashSet::default();
            let ids: Vec<BuyableId> = group
                .iter()
                .filter(|item| item.model().is_none())
                .filter(|item| seen.insert(item.id()))
                .map(|item| item.id().clone())
                .collect();

            if ids.is_empty() {
                continue;
            }

            let Some(loader) = self.registry.loader(kind) else {
                // Unregistered kind: the per-row location step below reports
                // it as a missing model.
                continue;
            };

            fetched.insert(kind, loader.load_many(&ids)?);
        }

        debug!(
            rows = items.len(),
            lookups = fetched.len(),
            "resolved entity batch"
        );

        let mut resolved: FxHashMap<RowId, ResolvedPrice> = FxHashMap::default();

        for item in items.iter() {
            let entity: &dyn Entity = if let Some(model) = item.model() {
                model.as_ref()
            } else if let Some(found) = fetched
                .get(item.kind())
                .and_then(|entities| entities.get(item.id()))
            {
                found.as_ref()
            } else {
                return Err(ResolvePriceError::ModelNotFound {
                    row_id: item.row_id().clone(),
                    kind: item.kind().to_string(),
                    id: item.id().clone(),
                });
            };

            let priceable =
                entity
                    .as_priceable()
                    .ok_or_else(|| ResolvePriceError::NotPriceable {
                        row_id: item.row_id().clone(),
                        kind: item.kind().to_string(),
                        id: item.id().clone(),
                    })?;

            resolved.insert(
                item.row_id().clone(),
                ResolvedPrice::new(priceable.price(context), priceable.original_price()),
            );
        }

        Ok(resolved)
    }
}
