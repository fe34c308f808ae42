//! Cart Example
//!
//! This example fills a cart from a YAML product catalog, reads totals (the
//! first read triggers one batch resolution per entity kind), then switches
//! currency to show context-sensitive re-resolution.
//!
//! Use `-c` to pick the currency, `-l` the locale, `-f` the fixture file.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rusty_money::{Money, iso};
use till::{
    cart::{Cart, CartConfig},
    context::PricingContext,
    fixtures::CatalogFixture,
    resolvers::entity::EntityPriceResolver,
    utils::DemoCartArgs,
};

/// Cart Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoCartArgs::parse();

    let currency = iso::find(&args.currency)
        .with_context(|| format!("unknown currency {}", args.currency))?;

    let catalog = CatalogFixture::from_path(&args.fixture)?;
    let registry = Arc::new(catalog.registry());
    let resolver = Box::new(EntityPriceResolver::new(registry));

    let context = PricingContext::new("demo", currency, args.locale);
    let mut cart = Cart::new(context, CartConfig::default(), resolver);

    cart.add("product", 1_u64, 2)?;
    cart.add("product", 2_u64, 1)?;
    cart.add("gift_card", "gc-50", 1)?;

    let total = cart.total()?;

    for item in cart.items().iter() {
        println!(
            "{kind} {id} x{quantity} @ {price}",
            kind = item.kind(),
            id = item.id(),
            quantity = item.quantity(),
            price = Money::from_minor(i64::try_from(item.unit_price())?, currency),
        );
    }

    println!(
        "total: {}",
        Money::from_minor(i64::try_from(total)?, currency)
    );

    let other = if currency == iso::USD { iso::GBP } else { iso::USD };
    cart.set_context(cart.context().clone().with_currency(other));

    let total = cart.total()?;

    println!(
        "total in {code}: {total}",
        code = other.iso_alpha_code,
        total = Money::from_minor(i64::try_from(total)?, other),
    );

    Ok(())
}
