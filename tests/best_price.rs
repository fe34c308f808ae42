//! Composite "best price" resolution across several catalogs, driven through
//! a cart.

use std::sync::Arc;

use rusty_money::iso::GBP;
use testresult::TestResult;

use till::prelude::*;

/// A registry whose "product" catalog holds the given (id, price) pairs.
fn product_registry(entries: &[(u64, u64)]) -> EntityRegistry {
    let mut catalog = InMemoryCatalog::new();

    for (id, price) in entries {
        catalog.insert(FixtureProduct::priced("product", *id, *price).into_entity());
    }

    let mut registry = EntityRegistry::new();
    registry.register("product", Box::new(catalog));

    registry
}

fn entity_resolver(registry: EntityRegistry) -> Box<dyn PriceResolver> {
    Box::new(EntityPriceResolver::new(Arc::new(registry)))
}

fn cart_over(resolvers: Vec<Box<dyn PriceResolver>>) -> Cart {
    Cart::new(
        PricingContext::new("main", GBP, "en-GB"),
        CartConfig::default(),
        Box::new(BestPriceResolver::with_resolvers(resolvers)),
    )
}

#[test]
fn the_cheapest_catalog_wins_per_row() -> TestResult {
    let standard = product_registry(&[(1, 1500), (2, 2000)]);
    let sale = product_registry(&[(1, 1000), (2, 2400)]);

    let mut cart = cart_over(vec![entity_resolver(standard), entity_resolver(sale)]);

    let first = cart.add("product", 1_u64, 1)?;
    let second = cart.add("product", 2_u64, 1)?;

    assert_eq!(cart.unit_price(&first)?, 1000, "sale catalog is cheaper");
    assert_eq!(cart.unit_price(&second)?, 2000, "standard catalog is cheaper");
    assert_eq!(cart.total()?, 3000);

    Ok(())
}

#[test]
fn a_branch_missing_a_record_abstains_from_the_whole_batch() -> TestResult {
    // The partial catalog knows only product 1, so its batch aborts; prices
    // must all come from the complete catalog, even for product 1.
    let partial = product_registry(&[(1, 1)]);
    let complete = product_registry(&[(1, 1500), (2, 1500)]);

    let mut cart = cart_over(vec![entity_resolver(partial), entity_resolver(complete)]);

    cart.add("product", 1_u64, 1)?;
    cart.add("product", 2_u64, 1)?;

    assert_eq!(cart.total()?, 3000);

    Ok(())
}

#[test]
fn all_branches_abstaining_surfaces_an_unresolvable_price() -> TestResult {
    let partial = product_registry(&[(1, 1500)]);

    let mut cart = cart_over(vec![entity_resolver(partial)]);

    cart.add("product", 1_u64, 1)?;
    cart.add("product", 2_u64, 1)?;

    let result = cart.total();

    assert!(
        matches!(
            result,
            Err(CartError::Resolution(ResolvePriceError::Exhausted))
        ),
        "expected Exhausted, got {result:?}"
    );
    assert!(!cart.is_resolved());

    Ok(())
}

#[test]
fn an_empty_cart_totals_zero_with_no_resolvers_at_all() -> TestResult {
    let mut cart = cart_over(Vec::new());

    assert_eq!(cart.total()?, 0);

    Ok(())
}
