//! Price Resolvers

use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    context::PricingContext,
    entities::{BuyableId, EntityError},
    items::{LineItem, RowId, collection::LineItemCollection},
    prices::ResolvedPrice,
};

pub mod best_price;
pub mod entity;

/// Errors raised when a price cannot be resolved.
#[derive(Debug, Error)]
pub enum ResolvePriceError {
    /// The repository returned no record for an item's buyable id.
    #[error("no {kind} record with id {id} for row {row_id}")]
    ModelNotFound {
        /// Row whose entity was missing.
        row_id: RowId,

        /// Entity kind tag.
        kind: String,

        /// Entity identifier that had no record.
        id: BuyableId,
    },

    /// A record was found but does not expose the pricing capability.
    #[error("{kind} record {id} for row {row_id} is not priceable")]
    NotPriceable {
        /// Row whose entity cannot be priced.
        row_id: RowId,

        /// Entity kind tag.
        kind: String,

        /// Entity identifier of the unpriceable record.
        id: BuyableId,
    },

    /// A resolver's result omitted a row present in the input.
    #[error("resolver returned no price for row {row_id}")]
    MissingRow {
        /// Row the resolver failed to cover.
        row_id: RowId,
    },

    /// No resolver produced a price.
    #[error("no price resolver produced a price")]
    Exhausted,

    /// Wrapped entity repository error.
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Strategy capability for resolving line item prices.
///
/// `resolve_many` is the batched entry point the cart uses; implementations
/// must cover every row id present in the input or fail the whole batch.
#[automock]
pub trait PriceResolver: Send + Sync {
    /// Resolves the price of a single item under the given context.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolvePriceError`] if no price can be computed.
    fn resolve(
        &self,
        item: &LineItem,
        context: &PricingContext,
    ) -> Result<ResolvedPrice, ResolvePriceError>;

    /// Resolves prices for a whole collection in one pass, returning one
    /// resolved price per input row id.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolvePriceError`] if any row's price cannot be computed;
    /// partial results are never returned.
    fn resolve_many(
        &self,
        items: &LineItemCollection,
        context: &PricingContext,
    ) -> Result<FxHashMap<RowId, ResolvedPrice>, ResolvePriceError>;
}
