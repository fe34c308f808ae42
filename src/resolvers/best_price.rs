//! Best Price Resolver

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::{
    context::PricingContext,
    items::{LineItem, RowId, collection::LineItemCollection},
    prices::ResolvedPrice,
    resolvers::{PriceResolver, ResolvePriceError},
};

/// Tries an ordered list of resolvers and keeps the lowest viable unit price.
///
/// An individual resolver's failure is logged and treated as an abstention;
/// the composite fails only when every resolver abstains. Ties on the lowest
/// unit price go to the earliest resolver in the list.
#[derive(Default)]
pub struct BestPriceResolver {
    resolvers: Vec<Box<dyn PriceResolver>>,
}

impl BestPriceResolver {
    /// Creates a composite with no inner resolvers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a composite over the given resolvers, tried in order.
    #[must_use]
    pub fn with_resolvers(resolvers: Vec<Box<dyn PriceResolver>>) -> Self {
        BestPriceResolver { resolvers }
    }

    /// Appends a resolver to the end of the list.
    pub fn push(&mut self, resolver: Box<dyn PriceResolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of inner resolvers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the composite has no inner resolvers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for BestPriceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BestPriceResolver")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

impl PriceResolver for BestPriceResolver {
    fn resolve(
        &self,
        item: &LineItem,
        context: &PricingContext,
    ) -> Result<ResolvedPrice, ResolvePriceError> {
        let mut best: Option<ResolvedPrice> = None;

        for (index, resolver) in self.resolvers.iter().enumerate() {
            match resolver.resolve(item, context) {
                Ok(price) => {
                    if best.is_none_or(|current| price.unit_price() < current.unit_price()) {
                        best = Some(price);
                    }
                }
                Err(error) => {
                    warn!(resolver = index, row = %item.row_id(), %error, "price resolver abstained");
                }
            }
        }

        best.ok_or(ResolvePriceError::Exhausted)
    }

    fn resolve_many(
        &self,
        items: &LineItemCollection,
        context: &PricingContext,
    ) -> Result<FxHashMap<RowId, ResolvedPrice>, ResolvePriceError> {
        if items.is_empty() {
            return Ok(FxHashMap::default());
        }

        let mut best: FxHashMap<RowId, ResolvedPrice> = FxHashMap::default();
        let mut succeeded = false;

        for (index, resolver) in self.resolvers.iter().enumerate() {
            // One batch call per resolver; a failing batch is skipped
            // wholesale, never retried per item.
            match resolver.resolve_many(items, context) {
                Ok(resolved) => {
                    succeeded = true;

                    for (row_id, price) in resolved {
                        match best.get(&row_id) {
                            Some(current) if price.unit_price() >= current.unit_price() => {}
                            _ => {
                                best.insert(row_id, price);
                            }
                        }
                    }
                }
                Err(error) => {
                    warn!(resolver = index, %error, "price resolver abstained from batch");
                }
            }
        }

        if succeeded {
            Ok(best)
        } else {
            Err(ResolvePriceError::Exhausted)
        }
    }
}
