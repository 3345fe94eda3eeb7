//! Cart store
//!
//! Single source of truth for cart contents. The [`CartStore`] owns the
//! state; every consuming surface holds a [`CartHandle`] and sees each
//! mutation immediately. The store restores itself from durable storage at
//! construction and persists after every mutation, fire-and-forget.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError, LineItem, Totals},
    products::{Product, ProductId},
    storage::{self, CartStorage},
};

/// Errors raised by shared cart store access.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The owning store was dropped; this handle no longer works.
    #[error("Cart store is gone; the owning scope was dropped")]
    Detached,

    /// A handle call re-entered the store while a mutation was in progress.
    #[error("Cart store is busy with another access")]
    Reentrant,

    /// Invalid mutation rejected by the cart.
    #[error(transparent)]
    Cart(#[from] CartError),
}

#[derive(Debug)]
struct StoreInner {
    cart: RefCell<Cart>,
    storage: Box<dyn CartStorage>,
    revision: Cell<u64>,
}

/// Owner of the shared cart state.
///
/// Dropping the store detaches every handle; subsequent handle calls fail
/// with [`CartStoreError::Detached`] rather than degrading silently.
#[derive(Debug)]
pub struct CartStore {
    inner: Rc<StoreInner>,
}

impl CartStore {
    /// Restore a store from `storage`.
    ///
    /// A missing payload starts an empty cart. Unreadable or structurally
    /// invalid payloads also fall back to an empty cart after a logged
    /// warning; restoring never fails.
    pub fn restore(storage: impl CartStorage + 'static) -> Self {
        let cart = match storage.load() {
            Ok(Some(payload)) => decode_persisted(&payload),
            Ok(None) => {
                debug!("no persisted cart found; starting empty");
                Cart::new()
            }
            Err(err) => {
                warn!(error = %err, "failed to read persisted cart; starting empty");
                Cart::new()
            }
        };

        CartStore {
            inner: Rc::new(StoreInner {
                cart: RefCell::new(cart),
                storage: Box::new(storage),
                revision: Cell::new(0),
            }),
        }
    }

    /// Create a handle for a consuming surface.
    ///
    /// Handles are cheap to clone and all observe the same state.
    #[must_use]
    pub fn handle(&self) -> CartHandle {
        CartHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

fn decode_persisted(payload: &str) -> Cart {
    let items = match storage::decode_items(payload) {
        Ok(items) => items,
        Err(err) => {
            warn!(error = %err, "persisted cart payload is unreadable; starting empty");
            return Cart::new();
        }
    };

    match Cart::from_items(items) {
        Ok(cart) => cart,
        Err(err) => {
            warn!(error = %err, "persisted cart state is invalid; starting empty");
            Cart::new()
        }
    }
}

fn persist(storage: &dyn CartStorage, items: &[LineItem]) {
    let payload = match storage::encode_items(items) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to encode cart for persistence");
            return;
        }
    };

    // A failed write is logged and dropped: the in-memory cart stays the
    // source of truth for this session.
    if let Err(err) = storage.save(&payload) {
        warn!(error = %err, "failed to persist cart; keeping in-memory state");
    }
}

/// Shared access to the cart store for one consuming surface.
#[derive(Debug, Clone)]
pub struct CartHandle {
    inner: Weak<StoreInner>,
}

impl CartHandle {
    /// Run a read-only closure against the current cart.
    ///
    /// # Errors
    ///
    /// Fails with [`CartStoreError::Detached`] once the owning store has
    /// been dropped, or [`CartStoreError::Reentrant`] while a mutation on
    /// the same store is in progress.
    pub fn read<R>(&self, f: impl FnOnce(&Cart) -> R) -> Result<R, CartStoreError> {
        let inner = self.upgrade()?;
        let cart = inner
            .cart
            .try_borrow()
            .map_err(|_err| CartStoreError::Reentrant)?;

        Ok(f(&cart))
    }

    /// Add `quantity` units of `product`, merging by product id.
    ///
    /// # Errors
    ///
    /// Rejects a zero quantity, a detached handle, or reentrant access.
    pub fn add_item(&self, product: Product, quantity: u32) -> Result<(), CartStoreError> {
        self.mutate(|cart| cart.add_item(product, quantity))
    }

    /// Add a single unit of `product`, the product-card button behavior.
    ///
    /// # Errors
    ///
    /// Fails for a detached handle or reentrant access.
    pub fn add(&self, product: Product) -> Result<(), CartStoreError> {
        self.add_item(product, 1)
    }

    /// Remove the line item for `id`; a no-op when absent.
    ///
    /// # Errors
    ///
    /// Fails only for a detached handle or reentrant access.
    pub fn remove_item(&self, id: ProductId) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.remove_item(id);
            Ok(())
        })
    }

    /// Set the quantity for `id`; 0 removes the line item.
    ///
    /// # Errors
    ///
    /// Fails only for a detached handle or reentrant access.
    pub fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.update_quantity(id, quantity);
            Ok(())
        })
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Fails only for a detached handle or reentrant access.
    pub fn clear(&self) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Current totals, recomputed fresh.
    ///
    /// # Errors
    ///
    /// Fails for a detached handle or reentrant access.
    pub fn totals(&self) -> Result<Totals, CartStoreError> {
        self.read(Cart::totals)
    }

    /// Clone of the current line items, for rendering.
    ///
    /// # Errors
    ///
    /// Fails for a detached handle or reentrant access.
    pub fn snapshot(&self) -> Result<Vec<LineItem>, CartStoreError> {
        self.read(|cart| cart.items().to_vec())
    }

    /// Quantity currently in the cart for `id`.
    ///
    /// # Errors
    ///
    /// Fails for a detached handle or reentrant access.
    pub fn quantity_of(&self, id: ProductId) -> Result<Option<u32>, CartStoreError> {
        self.read(|cart| cart.quantity_of(id))
    }

    /// Whether the cart currently holds no line items.
    ///
    /// # Errors
    ///
    /// Fails for a detached handle or reentrant access.
    pub fn is_empty(&self) -> Result<bool, CartStoreError> {
        self.read(Cart::is_empty)
    }

    /// Mutation counter; increases after every successful mutation.
    ///
    /// # Errors
    ///
    /// Fails with [`CartStoreError::Detached`] once the owning store has
    /// been dropped.
    pub fn revision(&self) -> Result<u64, CartStoreError> {
        Ok(self.upgrade()?.revision.get())
    }

    fn upgrade(&self) -> Result<Rc<StoreInner>, CartStoreError> {
        self.inner.upgrade().ok_or(CartStoreError::Detached)
    }

    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Cart) -> Result<R, CartError>,
    ) -> Result<R, CartStoreError> {
        let inner = self.upgrade()?;

        let (result, items) = {
            let mut cart = inner
                .cart
                .try_borrow_mut()
                .map_err(|_err| CartStoreError::Reentrant)?;

            let result = f(&mut cart)?;

            (result, cart.items().to_vec())
        };

        inner.revision.set(inner.revision.get().wrapping_add(1));
        persist(inner.storage.as_ref(), &items);

        Ok(result)
    }
}
