//! Storefront Example
//!
//! Walks the storefront end to end: browse the catalog, fill the cart from a
//! couple of surfaces, step through checkout and print the receipt.
//!
//! Use `-f` to load a different product fixture file
//! Use `-s` to persist the cart somewhere else between runs
//! Use `-c` / `-q` to browse a category or search the catalog
//! Use `--reset` to discard a previously saved cart

use std::{fs, io};

use anyhow::Result;
use clap::Parser;
use duka::{
    cart::store::CartStore,
    catalog::ProductFilter,
    checkout::{CheckoutFlow, ContactDetails, ShippingAddress},
    fixtures::load_catalog,
    receipt::Receipt,
    storage::FileStorage,
    utils::StorefrontArgs,
    views::{cart_badge, cart_page, format_money, mini_cart},
};

/// Storefront Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let args = StorefrontArgs::parse();

    if args.reset {
        _ = fs::remove_file(&args.state_file);
    }

    let catalog = load_catalog(&args.fixture)?;
    let currency = catalog.currency()?;

    let store = CartStore::restore(FileStorage::new(&args.state_file));
    let handle = store.handle();

    let shelf = catalog.filter(&ProductFilter {
        category: args.category.clone(),
        query: args.query.clone(),
        ..ProductFilter::default()
    });

    println!("Browsing {} of {} products:", shelf.len(), catalog.len());

    for product in &shelf {
        let price = if product.is_on_sale() {
            format!(
                "{} (was {})",
                format_money(product.effective_price(), currency),
                format_money(product.price, currency)
            )
        } else {
            format_money(product.price, currency)
        };

        println!(
            "  {:<28} {:<12} ages {:<5} {price}",
            product.title, product.category, product.age_range
        );
    }

    // Shop a little: two of the first match, one of the second.
    if let Some(first) = shelf.first() {
        handle.add_item((*first).clone(), 2)?;
    }

    if let Some(second) = shelf.get(1) {
        handle.add((*second).clone())?;
    }

    let badge = cart_badge(&handle)?;

    println!("\nNavbar badge: {} item(s)", badge.count);

    let mini = mini_cart(&handle, currency)?;

    println!("Mini cart ({} product(s)):", mini.distinct_products);

    for line in &mini.lines {
        println!(
            "  {} × {:<28} {}",
            line.quantity, line.title, line.line_total
        );
    }

    if mini.free_shipping.qualified {
        println!("  Free delivery unlocked.");
    } else {
        println!(
            "  Spend {} more to unlock free delivery.",
            mini.free_shipping.remaining
        );
    }

    // Bump the first line from the cart page's quantity stepper.
    if let Some(line) = mini.lines.first() {
        handle.update_quantity(line.product_id, 3)?;
    }

    let page = cart_page(&handle, currency)?;

    println!(
        "\nCart page: {} item(s), subtotal {}",
        page.item_count, page.subtotal
    );

    if page.is_empty {
        println!("Nothing in the cart to check out.");

        return Ok(());
    }

    let mut flow = CheckoutFlow::new();

    flow.submit_contact(ContactDetails::new("Wanjiku Kamau", "wanjiku@example.com")?)?;
    flow.submit_shipping(ShippingAddress::new("14 Riverside Drive", "Nairobi", "Kenya")?)?;

    let confirmation = flow.place_order(&handle)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    Receipt::new(&confirmation, currency).write_to(&mut out)?;

    println!("\nOrder placed for {}.", confirmation.contact().full_name());
    println!("Redirecting to {}", confirmation.redirect_to());

    Ok(())
}
