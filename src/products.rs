//! Products

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Identifier of a product in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sellable product as listed in the catalog.
///
/// All prices are integer minor units of the storefront display currency.
/// The cart keeps a copy of the product taken at add time, so a later
/// catalog change never rewrites lines already sitting in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier
    pub id: ProductId,

    /// URL slug
    pub slug: String,

    /// Display title
    pub title: String,

    /// List price in minor units
    pub price: i64,

    /// Sale price in minor units, when discounted
    pub sale_price: Option<i64>,

    /// Category name (tops, dresses, ...)
    pub category: String,

    /// Thumbnail image URL
    pub thumb_url: String,

    /// Condition grade of the secondhand garment
    pub condition: String,

    /// Age range the garment fits (e.g. "3-5")
    pub age_range: String,

    /// Fabric description
    pub material: String,

    /// Units left in stock, shown as an availability hint only
    pub stock: u32,

    /// Garment size label
    pub size: String,

    /// Gallery image URLs
    pub images: SmallVec<[String; 4]>,
}

impl Product {
    /// The price a buyer actually pays per unit: the sale price when one is
    /// set below the list price, otherwise the list price.
    #[must_use]
    pub fn effective_price(&self) -> i64 {
        match self.sale_price {
            Some(sale) if sale < self.price => sale,
            _ => self.price,
        }
    }

    /// Whether the product currently sells below its list price.
    ///
    /// A sale price at or above the list price is not a sale.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some_and(|sale| sale < self.price)
    }

    /// Discount off the list price as a fraction, for sale badges.
    ///
    /// Returns zero when the product is not on sale or the list price is zero.
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        if !self.is_on_sale() || self.price == 0 {
            return Percentage::from(0.0);
        }

        let savings = self.price - self.effective_price();
        let savings_dec = Decimal::from_i64(savings).unwrap_or(Decimal::ZERO);
        let price_dec = Decimal::from_i64(self.price).unwrap_or(Decimal::ZERO);

        Percentage::from(savings_dec / price_dec)
    }
}
