//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartConfig, CartError, DuplicatePolicy},
    context::PricingContext,
    entities::{BuyableId, Entity, EntityError, EntityLoader, EntityRegistry, Priceable},
    fixtures::{CatalogFixture, FixtureError, FixtureProduct, InMemoryCatalog},
    items::{
        ItemError, LineItem, RowId,
        collection::LineItemCollection,
        rows::CartRow,
    },
    prices::ResolvedPrice,
    resolvers::{
        PriceResolver, ResolvePriceError,
        best_price::BestPriceResolver,
        entity::EntityPriceResolver,
    },
};
