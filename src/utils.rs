//! Utils

use clap::Parser;

/// Arguments for the storefront demo
#[derive(Debug, Parser)]
pub struct StorefrontArgs {
    /// Product fixture file to load the catalog from
    #[clap(short, long, default_value = "fixtures/products/demo.yml")]
    pub fixture: String,

    /// File the cart is persisted to between runs
    #[clap(short, long, default_value = "target/storefront-cart.json")]
    pub state_file: String,

    /// Browse only this category
    #[clap(short, long)]
    pub category: Option<String>,

    /// Search the catalog with this query
    #[clap(short, long)]
    pub query: Option<String>,

    /// Discard any persisted cart before starting
    #[clap(long)]
    pub reset: bool,
}
