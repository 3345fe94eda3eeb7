//! Duka prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, LineItem, Totals,
        store::{CartHandle, CartStore, CartStoreError},
    },
    catalog::{Catalog, CatalogError, CatalogKey, ProductFilter, SortOrder},
    checkout::{
        CheckoutError, CheckoutFlow, CheckoutStep, ContactDetails, ORDER_SUCCESS_ROUTE,
        OrderConfirmation, ShippingAddress,
    },
    fixtures::{FixtureError, load_catalog},
    products::{Product, ProductId},
    receipt::{Receipt, ReceiptError},
    storage::{CartStorage, FileStorage, MemoryStorage, StorageError},
    views::{
        CartBadge, CartLineView, CartPageView, CheckoutSummary, FREE_SHIPPING_THRESHOLD_MINOR,
        FreeShippingProgress, MiniCartView, cart_badge, cart_page, checkout_summary, format_money,
        free_shipping_progress, mini_cart,
    },
};
