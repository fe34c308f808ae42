//! Line Item Collection

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::{
    entities::{BuyableId, EntityError, EntityRegistry},
    items::{LineItem, RowId},
    prices::ResolvedPrice,
    resolvers::ResolvePriceError,
};

/// An insertion-ordered collection of line items, keyed by row id.
///
/// Iteration order is the order rows were added, which keeps display and
/// batch operations deterministic.
#[derive(Debug, Clone, Default)]
pub struct LineItemCollection {
    items: Vec<LineItem>,
}

impl LineItemCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item. The caller is responsible for ensuring its row id is
    /// not already present; the owning cart enforces this.
    pub fn push(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Removes and returns the item with the given row id.
    pub fn remove(&mut self, row_id: &RowId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.row_id() == row_id)?;

        Some(self.items.remove(index))
    }

    /// Removes all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the item with the given row id.
    #[must_use]
    pub fn get(&self, row_id: &RowId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.row_id() == row_id)
    }

    /// Returns the item with the given row id, mutably.
    pub fn get_mut(&mut self, row_id: &RowId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.row_id() == row_id)
    }

    /// Whether an item with the given row id is present.
    #[must_use]
    pub fn contains(&self, row_id: &RowId) -> bool {
        self.get(row_id).is_some()
    }

    /// Iterates over the items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Iterates over the rows referencing the given entity, in insertion
    /// order. Rows with different options share an entity but not a row id.
    pub fn find_by_buyable<'a>(
        &'a self,
        kind: &'a str,
        id: &'a BuyableId,
    ) -> impl Iterator<Item = &'a LineItem> {
        self.items
            .iter()
            .filter(move |item| item.kind() == kind && item.id() == id)
    }

    /// Groups items by entity kind, kinds in first-seen order.
    #[must_use]
    pub fn group_by_kind(&self) -> Vec<(&str, SmallVec<[&LineItem; 10]>)> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: FxHashMap<&str, SmallVec<[&LineItem; 10]>> = FxHashMap::default();

        for item in &self.items {
            if !groups.contains_key(item.kind()) {
                order.push(item.kind());
            }

            groups.entry(item.kind()).or_default().push(item);
        }

        order
            .into_iter()
            .map(|kind| (kind, groups.remove(kind).unwrap_or_default()))
            .collect()
    }

    /// Number of rows in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all rows.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }

    /// Loads backing entities for items that do not have one yet.
    ///
    /// Items are partitioned by entity kind; each kind with a registered
    /// loader gets exactly one batch lookup over the distinct missing ids.
    /// Kinds with no registered loader are skipped, leaving their items
    /// without a model; price resolution fails explicitly for those later.
    ///
    /// # Errors
    ///
    /// Returns an [`EntityError`] if a loader fails; models assigned by
    /// earlier kinds in the pass are kept.
    pub fn load_models(&mut self, registry: &EntityRegistry) -> Result<(), EntityError> {
        let mut kinds: Vec<String> = Vec::new();

        for item in self.items.iter().filter(|item| item.model().is_none()) {
            if !kinds.iter().any(|kind| kind == item.kind()) {
                kinds.push(item.kind().to_string());
            }
        }

        for kind in kinds {
            let Some(loader) = registry.loader(&kind) else {
                continue;
            };

            let mut seen: FxHashSet<&BuyableId> = FxHashSet::default();
            let ids: Vec<BuyableId> = self
                .items
                .iter()
                .filter(|item| item.kind() == kind && item.model().is_none())
                .filter(|item| seen.insert(item.id()))
                .map(|item| item.id().clone())
                .collect();

            let loaded = loader.load_many(&ids)?;

            for item in self
                .items
                .iter_mut()
                .filter(|item| item.kind() == kind && item.model().is_none())
            {
                if let Some(model) = loaded.get(item.id()) {
                    item.set_model(Arc::clone(model));
                }
            }
        }

        Ok(())
    }

    /// Assigns one resolved price per row from a resolver's result mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ResolvePriceError::MissingRow`] if any row is not covered by
    /// the mapping; in that case no item is touched. Extra row ids in the
    /// mapping are ignored.
    pub fn assign_prices(
        &mut self,
        mut prices: FxHashMap<RowId, ResolvedPrice>,
    ) -> Result<(), ResolvePriceError> {
        if let Some(item) = self
            .items
            .iter()
            .find(|item| !prices.contains_key(item.row_id()))
        {
            return Err(ResolvePriceError::MissingRow {
                row_id: item.row_id().clone(),
            });
        }

        for item in &mut self.items {
            if let Some(price) = prices.remove(item.row_id()) {
                item.set_resolved_price(price);
            }
        }

        Ok(())
    }
}
