//! Cart view models
//!
//! Pure builders from a cart store handle to plain render models for the
//! surfaces that consume the cart: the navbar badge, the mini-cart popover,
//! the full cart page and the checkout summary. Each builder reads a single
//! snapshot, so surfaces rendered together always agree on the cart's
//! contents.

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::{
        LineItem,
        store::{CartHandle, CartStoreError},
    },
    products::ProductId,
};

/// Order subtotal, in minor units, at which delivery becomes free (`KSh 5,000`).
pub const FREE_SHIPPING_THRESHOLD_MINOR: i64 = 500_000;

/// Format an amount in minor units as a display string for `currency`.
#[must_use]
pub fn format_money(amount_minor: i64, currency: &'static Currency) -> String {
    format!("{}", Money::from_minor(amount_minor, currency))
}

/// Render model for one cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    /// Product identity, used for quantity and removal controls.
    pub product_id: ProductId,

    /// Product title.
    pub title: String,

    /// Thumbnail image path.
    pub thumb_url: String,

    /// Units of this product in the cart.
    pub quantity: u32,

    /// Price charged per unit.
    pub unit_price: String,

    /// Original list price, present only when the line is on sale.
    pub list_price: Option<String>,

    /// Unit price times quantity.
    pub line_total: String,
}

/// Render model for the navbar cart indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartBadge {
    /// Total units across all lines.
    pub count: u64,

    /// Whether the indicator is shown at all; hidden for an empty cart.
    pub visible: bool,
}

/// Progress toward the free-delivery threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeShippingProgress {
    /// Whether the current subtotal qualifies for free delivery.
    pub qualified: bool,

    /// Amount still to spend before delivery is free; zero once qualified.
    pub remaining: String,

    /// Fill fraction for a progress bar, in `0.0..=1.0`.
    pub fraction: f64,
}

/// Render model for the mini-cart popover.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniCartView {
    /// One entry per distinct product.
    pub lines: Vec<CartLineView>,

    /// Number of distinct products.
    pub distinct_products: usize,

    /// Total units across all lines.
    pub item_count: u64,

    /// Formatted cart subtotal.
    pub subtotal: String,

    /// Free-delivery progress for the popover footer.
    pub free_shipping: FreeShippingProgress,
}

/// Render model for the full cart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPageView {
    /// One entry per distinct product.
    pub lines: Vec<CartLineView>,

    /// Total units across all lines.
    pub item_count: u64,

    /// Formatted cart subtotal.
    pub subtotal: String,

    /// Whether the page should show its empty state instead of lines.
    pub is_empty: bool,
}

/// Render model for the checkout sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    /// One entry per distinct product.
    pub lines: Vec<CartLineView>,

    /// Total units across all lines.
    pub item_count: u64,

    /// Formatted cart subtotal.
    pub subtotal: String,
}

/// Build the navbar badge from the current cart.
///
/// # Errors
///
/// Fails when the store handle is detached or the store is busy.
pub fn cart_badge(handle: &CartHandle) -> Result<CartBadge, CartStoreError> {
    let totals = handle.totals()?;

    Ok(CartBadge {
        count: totals.count,
        visible: totals.count > 0,
    })
}

/// Build the mini-cart popover model from the current cart.
///
/// # Errors
///
/// Fails when the store handle is detached or the store is busy.
pub fn mini_cart(
    handle: &CartHandle,
    currency: &'static Currency,
) -> Result<MiniCartView, CartStoreError> {
    let (items, totals) = handle.read(|cart| (cart.items().to_vec(), cart.totals()))?;

    Ok(MiniCartView {
        lines: line_views(&items, currency),
        distinct_products: items.len(),
        item_count: totals.count,
        subtotal: format_money(totals.subtotal, currency),
        free_shipping: free_shipping_progress(totals.subtotal, currency),
    })
}

/// Build the full cart page model from the current cart.
///
/// # Errors
///
/// Fails when the store handle is detached or the store is busy.
pub fn cart_page(
    handle: &CartHandle,
    currency: &'static Currency,
) -> Result<CartPageView, CartStoreError> {
    let (items, totals) = handle.read(|cart| (cart.items().to_vec(), cart.totals()))?;

    Ok(CartPageView {
        lines: line_views(&items, currency),
        item_count: totals.count,
        subtotal: format_money(totals.subtotal, currency),
        is_empty: items.is_empty(),
    })
}

/// Build the checkout sidebar model from the current cart.
///
/// # Errors
///
/// Fails when the store handle is detached or the store is busy.
pub fn checkout_summary(
    handle: &CartHandle,
    currency: &'static Currency,
) -> Result<CheckoutSummary, CartStoreError> {
    let (items, totals) = handle.read(|cart| (cart.items().to_vec(), cart.totals()))?;

    Ok(CheckoutSummary {
        lines: line_views(&items, currency),
        item_count: totals.count,
        subtotal: format_money(totals.subtotal, currency),
    })
}

/// Progress toward free delivery for `subtotal_minor`.
#[must_use]
pub fn free_shipping_progress(
    subtotal_minor: i64,
    currency: &'static Currency,
) -> FreeShippingProgress {
    if subtotal_minor >= FREE_SHIPPING_THRESHOLD_MINOR {
        return FreeShippingProgress {
            qualified: true,
            remaining: format_money(0, currency),
            fraction: 1.0,
        };
    }

    let fraction = Decimal::from_i64(subtotal_minor)
        .zip(Decimal::from_i64(FREE_SHIPPING_THRESHOLD_MINOR))
        .and_then(|(spent, threshold)| spent.checked_div(threshold))
        .and_then(|ratio| ratio.to_f64())
        .map_or(0.0, |ratio| ratio.clamp(0.0, 1.0));

    FreeShippingProgress {
        qualified: false,
        remaining: format_money(
            FREE_SHIPPING_THRESHOLD_MINOR.saturating_sub(subtotal_minor),
            currency,
        ),
        fraction,
    }
}

fn line_views(items: &[LineItem], currency: &'static Currency) -> Vec<CartLineView> {
    items.iter().map(|item| line_view(item, currency)).collect()
}

fn line_view(item: &LineItem, currency: &'static Currency) -> CartLineView {
    let product = &item.product;

    CartLineView {
        product_id: product.id,
        title: product.title.clone(),
        thumb_url: product.thumb_url.clone(),
        quantity: item.quantity,
        unit_price: format_money(product.effective_price(), currency),
        list_price: product
            .is_on_sale()
            .then(|| format_money(product.price, currency)),
        line_total: format_money(item.line_total(), currency),
    }
}
