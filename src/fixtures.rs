//! Fixtures

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{Currency, EUR, GBP, KES, USD};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    products::{Product, ProductId},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Catalog assembly error
    #[error("Failed to assemble catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Wrapper document for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products in listing order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Catalog identifier
    pub id: u64,

    /// URL slug
    pub slug: String,

    /// Display title
    pub title: String,

    /// List price (e.g., "2500 KES")
    pub price: String,

    /// Sale price, when discounted
    pub sale_price: Option<String>,

    /// Category name
    pub category: String,

    /// Thumbnail image URL
    pub thumb_url: String,

    /// Condition grade
    pub condition: String,

    /// Age range
    pub age_range: String,

    /// Fabric description
    pub material: String,

    /// Units in stock
    pub stock: u32,

    /// Garment size label
    pub size: String,

    /// Gallery image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductFixture {
    /// Convert the fixture entry into a catalog product and its currency.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed or the sale price uses
    /// a different currency from the list price.
    pub fn try_into_product(self) -> Result<(Product, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price)?;

        let sale_price = match &self.sale_price {
            Some(raw) => {
                let (minor_units, sale_currency) = parse_price(raw)?;

                if sale_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        sale_currency.iso_alpha_code.to_string(),
                    ));
                }

                Some(minor_units)
            }
            None => None,
        };

        let product = Product {
            id: ProductId(self.id),
            slug: self.slug,
            title: self.title,
            price,
            sale_price,
            category: self.category,
            thumb_url: self.thumb_url,
            condition: self.condition,
            age_range: self.age_range,
            material: self.material,
            stock: self.stock,
            size: self.size,
            images: SmallVec::from_vec(self.images),
        };

        Ok((product, currency))
    }
}

/// Parse price string (e.g., "2500 KES") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "KES" => KES,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Load a product catalog from a YAML fixture file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the
/// product set is internally inconsistent.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, FixtureError> {
    let contents = fs::read_to_string(path.as_ref())?;

    catalog_from_str(&contents)
}

/// Parse a product catalog from YAML fixture contents
///
/// # Errors
///
/// Returns an error if the YAML cannot be parsed, a price is malformed,
/// products mix currencies, or an id or slug repeats.
pub fn catalog_from_str(contents: &str) -> Result<Catalog, FixtureError> {
    let fixture: ProductsFixture = serde_norway::from_str(contents)?;

    let mut currency: Option<&'static Currency> = None;
    let mut products = Vec::with_capacity(fixture.products.len());

    for product_fixture in fixture.products {
        let (product, product_currency) = product_fixture.try_into_product()?;

        if let Some(existing) = currency {
            if existing != product_currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    product_currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            currency = Some(product_currency);
        }

        products.push(product);
    }

    let mut catalog = match currency {
        Some(currency) => Catalog::with_currency(currency),
        None => Catalog::new(),
    };

    for product in products {
        catalog.insert(product)?;
    }

    Ok(catalog)
}
