//! Cart

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::{Product, ProductId};

pub mod store;

/// Errors related to cart mutation or reconstruction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line item quantity must be at least 1.
    #[error("Line item quantity must be at least 1")]
    ZeroQuantity,

    /// Two line items reference the same product.
    #[error("Duplicate line item for product {0}")]
    DuplicateProduct(ProductId),
}

/// One cart entry: a product snapshot and the quantity requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product snapshot taken when the line was added.
    pub product: Product,

    /// Requested quantity, always at least 1.
    pub quantity: u32,
}

impl LineItem {
    /// Line total at the effective unit price, in minor units.
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.product.effective_price() * i64::from(self.quantity)
    }
}

/// Derived cart totals.
///
/// Always recomputed from the current line items, never stored or patched
/// incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Total number of units across all line items.
    pub count: u64,

    /// Sum of effective price times quantity, in minor units.
    pub subtotal: i64,
}

/// Ordered collection of line items, at most one per product id.
///
/// Insertion order is preserved for display. Mutations that reference an
/// absent product id are idempotent no-ops, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from previously captured line items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a quantity is zero or a product id repeats.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartError> {
        let mut cart = Cart::new();

        for item in items {
            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity);
            }

            if cart.quantity_of(item.product.id).is_some() {
                return Err(CartError::DuplicateProduct(item.product.id));
            }

            cart.items.push(item);
        }

        Ok(cart)
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line item when the product is already in the
    /// cart, otherwise appends a new line. The product snapshot of an
    /// existing line is kept as it was first added.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` when `quantity` is 0.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if let Some(item) = self.line_mut(product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
        } else {
            self.items.push(LineItem { product, quantity });
        }

        Ok(())
    }

    /// Remove the line item for `id`. Removing an absent id is a no-op.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|item| item.product.id != id);
    }

    /// Set the quantity for `id` directly.
    ///
    /// A quantity of 0 removes the line item entirely; it is never retained
    /// at zero. Unknown ids are a no-op.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(id);
            return;
        }

        if let Some(item) = self.line_mut(id) {
            item.quantity = quantity;
        }
    }

    /// Remove every line item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Current totals, recomputed from the line items on every call.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.items.iter().fold(Totals::default(), |acc, item| Totals {
            count: acc.count + u64::from(item.quantity),
            subtotal: acc.subtotal + item.line_total(),
        })
    }

    /// Quantity currently in the cart for `id`.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.product.id == id)
            .map(|item| item.quantity)
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the line items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.product.id == id)
    }
}
