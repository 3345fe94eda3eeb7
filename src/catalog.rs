//! Catalog

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::products::{Product, ProductId};

new_key_type! {
    /// Key for products stored in the catalog arena.
    pub struct CatalogKey;
}

/// Errors raised while assembling or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two products share an id.
    #[error("Duplicate product id: {0}")]
    DuplicateId(ProductId),

    /// Two products share a slug.
    #[error("Duplicate product slug: {0}")]
    DuplicateSlug(String),

    /// No products loaded yet.
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Sort orders offered on the product listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently listed first (descending id).
    #[default]
    Newest,

    /// Cheapest first, on the effective price.
    PriceLowHigh,

    /// Most expensive first, on the effective price.
    PriceHighLow,

    /// Alphabetical by title.
    Name,
}

/// Filter parameters accepted by [`Catalog::filter`].
///
/// `category` and `age_range` match exactly, with `"all"` acting as no
/// filter. The query matches case-insensitively against title and age range.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Keep only this category when set.
    pub category: Option<String>,

    /// Keep only this age range when set.
    pub age_range: Option<String>,

    /// Case-insensitive text query.
    pub query: Option<String>,

    /// Ordering of the result.
    pub sort: SortOrder,
}

/// Read-only product catalog with id and slug lookups.
///
/// Iteration follows listing order. The catalog never changes a product
/// after insertion; carts keep their own snapshots.
#[derive(Debug, Default)]
pub struct Catalog {
    products: SlotMap<CatalogKey, Product>,
    order: Vec<CatalogKey>,
    ids: FxHashMap<ProductId, CatalogKey>,
    slugs: FxHashMap<String, CatalogKey>,
    currency: Option<&'static Currency>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog priced in `currency`.
    #[must_use]
    pub fn with_currency(currency: &'static Currency) -> Self {
        Catalog {
            currency: Some(currency),
            ..Self::default()
        }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the product's id or slug is already taken.
    pub fn insert(&mut self, product: Product) -> Result<CatalogKey, CatalogError> {
        if self.ids.contains_key(&product.id) {
            return Err(CatalogError::DuplicateId(product.id));
        }

        if self.slugs.contains_key(&product.slug) {
            return Err(CatalogError::DuplicateSlug(product.slug.clone()));
        }

        let id = product.id;
        let slug = product.slug.clone();
        let key = self.products.insert(product);

        self.order.push(key);
        self.ids.insert(id, key);
        self.slugs.insert(slug, key);

        Ok(key)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.ids.get(&id).and_then(|key| self.products.get(*key))
    }

    /// Look up a product by its URL slug.
    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<&Product> {
        self.slugs.get(slug).and_then(|key| self.products.get(*key))
    }

    /// Iterate over products in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct category names in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();

        for product in self.iter() {
            if !seen.contains(&product.category) {
                seen.push(product.category.clone());
            }
        }

        seen
    }

    /// Distinct age ranges in first-seen order.
    #[must_use]
    pub fn age_ranges(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();

        for product in self.iter() {
            if !seen.contains(&product.age_range) {
                seen.push(product.age_range.clone());
            }
        }

        seen
    }

    /// Products whose title or age range contains `query`, case-insensitively.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();

        self.iter()
            .filter(|product| matches_query(product, &needle))
            .collect()
    }

    /// Products matching `filter`, in the requested sort order.
    #[must_use]
    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        let needle = filter.query.as_deref().map(str::to_lowercase);

        let mut results: Vec<&Product> = self
            .iter()
            .filter(|product| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| category == "all" || product.category == category)
            })
            .filter(|product| {
                filter
                    .age_range
                    .as_deref()
                    .is_none_or(|age| age == "all" || product.age_range == age)
            })
            .filter(|product| {
                needle
                    .as_deref()
                    .is_none_or(|needle| matches_query(product, needle))
            })
            .collect();

        sort_products(&mut results, filter.sort);

        results
    }

    /// The currency products are priced in.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoCurrency` before any product has been loaded.
    pub fn currency(&self) -> Result<&'static Currency, CatalogError> {
        self.currency.ok_or(CatalogError::NoCurrency)
    }
}

fn matches_query(product: &Product, needle: &str) -> bool {
    product.title.to_lowercase().contains(needle)
        || product.age_range.to_lowercase().contains(needle)
}

fn sort_products(products: &mut [&Product], sort: SortOrder) {
    match sort {
        SortOrder::Newest => products.sort_by(|a, b| b.id.cmp(&a.id)),
        SortOrder::PriceLowHigh => products.sort_by_key(|product| product.effective_price()),
        SortOrder::PriceHighLow => {
            products.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()));
        }
        SortOrder::Name => {
            products.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KES;
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    fn product(id: u64, title: &str, price: i64, sale_price: Option<i64>) -> Product {
        Product {
            id: ProductId(id),
            slug: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            price,
            sale_price,
            category: "tops".to_string(),
            thumb_url: format!("/images/{id}.jpg"),
            condition: "Gently used".to_string(),
            age_range: "3-5".to_string(),
            material: "Cotton".to_string(),
            stock: 2,
            size: "4T".to_string(),
            images: smallvec![],
        }
    }

    fn sample_catalog() -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog::with_currency(KES);

        let mut dino = product(1, "Dino Roar Tee", 45_000, None);
        dino.age_range = "6-8".to_string();

        let mut dress = product(2, "Rainbow Twirl Dress", 120_000, Some(90_000));
        dress.category = "dresses".to_string();

        let mut boots = product(3, "Puddle Stomper Boots", 150_000, None);
        boots.category = "shoes".to_string();
        boots.age_range = "0-2".to_string();

        let cardigan = product(4, "Apple Orchard Cardigan", 80_000, Some(60_000));

        catalog.insert(dino)?;
        catalog.insert(dress)?;
        catalog.insert(boots)?;
        catalog.insert(cardigan)?;

        Ok(catalog)
    }

    #[test]
    fn insert_rejects_duplicate_id() -> TestResult {
        let mut catalog = Catalog::new();

        catalog.insert(product(1, "Dino Roar Tee", 45_000, None))?;

        let result = catalog.insert(product(1, "Another Tee", 50_000, None));

        assert!(
            matches!(result, Err(CatalogError::DuplicateId(ProductId(1)))),
            "expected DuplicateId error"
        );

        Ok(())
    }

    #[test]
    fn insert_rejects_duplicate_slug() -> TestResult {
        let mut catalog = Catalog::new();

        catalog.insert(product(1, "Dino Roar Tee", 45_000, None))?;

        let result = catalog.insert(product(2, "Dino Roar Tee", 50_000, None));

        assert!(
            matches!(result, Err(CatalogError::DuplicateSlug(_))),
            "expected DuplicateSlug error"
        );

        Ok(())
    }

    #[test]
    fn lookups_by_id_and_slug_agree() -> TestResult {
        let catalog = sample_catalog()?;

        let by_id = catalog.get(ProductId(2)).ok_or("product 2 missing")?;
        let by_slug = catalog
            .by_slug("rainbow-twirl-dress")
            .ok_or("slug missing")?;

        assert_eq!(by_id, by_slug);

        Ok(())
    }

    #[test]
    fn missing_lookups_return_none() -> TestResult {
        let catalog = sample_catalog()?;

        assert!(catalog.get(ProductId(99)).is_none());
        assert!(catalog.by_slug("no-such-slug").is_none());

        Ok(())
    }

    #[test]
    fn iter_preserves_listing_order() -> TestResult {
        let catalog = sample_catalog()?;

        let ids: Vec<u64> = catalog.iter().map(|product| product.id.0).collect();

        assert_eq!(ids, vec![1, 2, 3, 4]);

        Ok(())
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() -> TestResult {
        let catalog = sample_catalog()?;

        assert_eq!(catalog.categories(), vec!["tops", "dresses", "shoes"]);

        Ok(())
    }

    #[test]
    fn age_ranges_are_distinct() -> TestResult {
        let catalog = sample_catalog()?;

        assert_eq!(catalog.age_ranges(), vec!["6-8", "3-5", "0-2"]);

        Ok(())
    }

    #[test]
    fn search_matches_title_case_insensitively() -> TestResult {
        let catalog = sample_catalog()?;

        let hits = catalog.search("RAINBOW");

        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits.first().map(|product| product.id),
            Some(ProductId(2))
        );

        Ok(())
    }

    #[test]
    fn search_matches_age_range() -> TestResult {
        let catalog = sample_catalog()?;

        let hits = catalog.search("6-8");

        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits.first().map(|product| product.id),
            Some(ProductId(1))
        );

        Ok(())
    }

    #[test]
    fn filter_by_category_with_all_passthrough() -> TestResult {
        let catalog = sample_catalog()?;

        let dresses = catalog.filter(&ProductFilter {
            category: Some("dresses".to_string()),
            ..ProductFilter::default()
        });

        assert_eq!(dresses.len(), 1);

        let all = catalog.filter(&ProductFilter {
            category: Some("all".to_string()),
            ..ProductFilter::default()
        });

        assert_eq!(all.len(), 4);

        Ok(())
    }

    #[test]
    fn filter_by_age_range() -> TestResult {
        let catalog = sample_catalog()?;

        let toddler = catalog.filter(&ProductFilter {
            age_range: Some("0-2".to_string()),
            ..ProductFilter::default()
        });

        assert_eq!(toddler.len(), 1);
        assert_eq!(
            toddler.first().map(|product| product.id),
            Some(ProductId(3))
        );

        Ok(())
    }

    #[test]
    fn default_sort_is_newest_first() -> TestResult {
        let catalog = sample_catalog()?;

        let ids: Vec<u64> = catalog
            .filter(&ProductFilter::default())
            .iter()
            .map(|product| product.id.0)
            .collect();

        assert_eq!(ids, vec![4, 3, 2, 1]);

        Ok(())
    }

    #[test]
    fn price_sorts_use_effective_price() -> TestResult {
        let catalog = sample_catalog()?;

        let low_high: Vec<u64> = catalog
            .filter(&ProductFilter {
                sort: SortOrder::PriceLowHigh,
                ..ProductFilter::default()
            })
            .iter()
            .map(|product| product.id.0)
            .collect();

        // Effective prices: 45_000, 90_000 (sale), 150_000, 60_000 (sale).
        assert_eq!(low_high, vec![1, 4, 2, 3]);

        let high_low: Vec<u64> = catalog
            .filter(&ProductFilter {
                sort: SortOrder::PriceHighLow,
                ..ProductFilter::default()
            })
            .iter()
            .map(|product| product.id.0)
            .collect();

        assert_eq!(high_low, vec![3, 2, 4, 1]);

        Ok(())
    }

    #[test]
    fn name_sort_is_alphabetical() -> TestResult {
        let catalog = sample_catalog()?;

        let names: Vec<&str> = catalog
            .filter(&ProductFilter {
                sort: SortOrder::Name,
                ..ProductFilter::default()
            })
            .iter()
            .map(|product| product.title.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "Apple Orchard Cardigan",
                "Dino Roar Tee",
                "Puddle Stomper Boots",
                "Rainbow Twirl Dress",
            ]
        );

        Ok(())
    }

    #[test]
    fn filter_combines_category_and_query() -> TestResult {
        let catalog = sample_catalog()?;

        let hits = catalog.filter(&ProductFilter {
            category: Some("tops".to_string()),
            query: Some("cardigan".to_string()),
            ..ProductFilter::default()
        });

        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits.first().map(|product| product.id),
            Some(ProductId(4))
        );

        Ok(())
    }

    #[test]
    fn currency_errors_before_any_product_loads() {
        let catalog = Catalog::new();

        assert!(matches!(
            catalog.currency(),
            Err(CatalogError::NoCurrency)
        ));
    }

    #[test]
    fn currency_returns_configured_value() -> TestResult {
        let catalog = sample_catalog()?;

        assert_eq!(catalog.currency()?, KES);

        Ok(())
    }
}
