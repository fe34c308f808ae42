//! Utils

use clap::Parser;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct DemoCartArgs {
    /// Currency to price the cart in (ISO alpha code)
    #[clap(short, long, default_value = "GBP")]
    pub currency: String,

    /// Locale to price the cart for
    #[clap(short, long, default_value = "en-GB")]
    pub locale: String,

    /// Path to the products fixture file
    #[clap(short, long, default_value = "fixtures/products.yml")]
    pub fixture: String,
}
