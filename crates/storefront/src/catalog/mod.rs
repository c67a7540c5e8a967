//! Product catalog.
//!
//! The catalog is loaded once at startup from a JSON file and held in
//! memory. Queries are plain scans; there is no index or search engine
//! behind this module, and none is needed at catalog sizes this shop has.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use redline_core::Price;

/// Listing page size, matching the shop's 18-per-page grid.
pub const PAGE_SIZE: usize = 18;

/// Number of page links shown around the current page.
pub const PAGE_RANGE: usize = 5;

/// Errors that can occur while loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the catalog file failed.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON of the expected shape.
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share a slug.
    #[error("duplicate product slug: {0}")]
    DuplicateSlug(String),
}

/// What kind of product this is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    /// A complete car.
    Car {
        color: String,
        /// Body class, e.g. "Coupe" or "Cabriolet".
        class: String,
    },
    /// A spare or accessory part, usable with specific cars.
    AccessoryPart {
        /// Slugs of the cars this part fits.
        #[serde(default)]
        compatible_with: Vec<String>,
    },
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// URL-safe unique identifier.
    pub slug: String,
    pub name: String,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl Product {
    /// Label used in search autocomplete: cars carry color and class.
    #[must_use]
    pub fn autocomplete_label(&self) -> String {
        match &self.kind {
            ProductKind::Car { color, class } => format!("{} {color}, {class}", self.name),
            ProductKind::AccessoryPart { .. } => self.name.clone(),
        }
    }

    /// Path of the product's detail page.
    #[must_use]
    pub fn href(&self) -> String {
        format!("/shop/{}", self.slug)
    }
}

/// One page of a listing, with the sliding pager window precomputed.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based current page number.
    pub current: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Page numbers to render as pager links.
    pub pages: Vec<usize>,
}

impl<T> Page<T> {
    /// Slice `items` into the requested page.
    ///
    /// Out-of-range page numbers clamp to the nearest valid page; an empty
    /// input yields a single empty page.
    #[must_use]
    pub fn paginate(items: Vec<T>, page: usize) -> Self {
        let total_items = items.len();
        let total_pages = total_items.div_ceil(PAGE_SIZE).max(1);
        let current = page.clamp(1, total_pages);

        let start = (current - 1) * PAGE_SIZE;
        let items: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .collect();

        // Sliding window of PAGE_RANGE pages centered on the current one.
        let half = PAGE_RANGE / 2;
        let first = current.saturating_sub(half).max(1);
        let last = (first + PAGE_RANGE - 1).min(total_pages);
        let first = last.saturating_sub(PAGE_RANGE - 1).max(1);
        let pages = (first..=last).collect();

        Self {
            items,
            current,
            total_pages,
            total_items,
            pages,
        }
    }

    /// Previous page number, if any.
    #[must_use]
    pub fn prev(&self) -> Option<usize> {
        (self.current > 1).then(|| self.current - 1)
    }

    /// Next page number, if any.
    #[must_use]
    pub fn next(&self) -> Option<usize> {
        (self.current < self.total_pages).then(|| self.current + 1)
    }
}

/// The in-memory product catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_slug: HashMap<String, usize>,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed, or contains
    /// duplicate slugs.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        Self::from_products(products)
    }

    /// Build a catalog from an already-loaded product list.
    ///
    /// # Errors
    ///
    /// Returns an error when two products share a slug.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut by_slug = HashMap::with_capacity(products.len());
        for (i, product) in products.iter().enumerate() {
            if by_slug.insert(product.slug.clone(), i).is_some() {
                return Err(CatalogError::DuplicateSlug(product.slug.clone()));
            }
        }
        Ok(Self { products, by_slug })
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by slug.
    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<&Product> {
        self.by_slug.get(slug).map(|&i| &self.products[i])
    }

    /// All category names, sorted and deduplicated.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> =
            self.products.iter().map(|p| p.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Products in a category, or all products when no category is given.
    #[must_use]
    pub fn in_category(&self, category: Option<&str>) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    /// Full-text search over name, description, and category.
    ///
    /// The term is split on whitespace; every word must match somewhere
    /// (case-insensitive substring). An empty term matches everything.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let words: Vec<String> = term
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        self.products
            .iter()
            .filter(|p| {
                let haystack = format!(
                    "{} {} {}",
                    p.name.to_lowercase(),
                    p.description.to_lowercase(),
                    p.category.to_lowercase()
                );
                words.iter().all(|w| haystack.contains(w.as_str()))
            })
            .collect()
    }

    /// Products an accessory part is compatible with.
    ///
    /// Empty for cars and for parts whose referenced slugs are unknown.
    #[must_use]
    pub fn compatible_products(&self, product: &Product) -> Vec<&Product> {
        match &product.kind {
            ProductKind::Car { .. } => Vec::new(),
            ProductKind::AccessoryPart { compatible_with } => compatible_with
                .iter()
                .filter_map(|slug| self.by_slug(slug))
                .collect(),
        }
    }
}

/// Normalize a raw search term: strip markup and collapse whitespace.
#[must_use]
pub fn normalize_term(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn car(slug: &str, name: &str, color: &str) -> Product {
        Product {
            slug: slug.to_owned(),
            name: name.to_owned(),
            category: "cars".to_owned(),
            price: Price::from_cents(1_250_000),
            description: format!("A classic {name}."),
            kind: ProductKind::Car {
                color: color.to_owned(),
                class: "Coupe".to_owned(),
            },
        }
    }

    fn part(slug: &str, name: &str, fits: &[&str]) -> Product {
        Product {
            slug: slug.to_owned(),
            name: name.to_owned(),
            category: "parts".to_owned(),
            price: Price::from_cents(4500),
            description: String::new(),
            kind: ProductKind::AccessoryPart {
                compatible_with: fits.iter().map(|s| (*s).to_owned()).collect(),
            },
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            car("ts-250", "Speedster 250", "British Racing Green"),
            car("gt-400", "Grand Tourer 400", "Rosso"),
            part("chrome-mirror", "Chrome Mirror", &["ts-250"]),
            part("oil-filter", "Oil Filter", &["ts-250", "gt-400"]),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_by_slug() {
        let catalog = catalog();
        assert_eq!(catalog.by_slug("gt-400").unwrap().name, "Grand Tourer 400");
        assert!(catalog.by_slug("missing").is_none());
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let result = Catalog::from_products(vec![
            car("ts-250", "Speedster", "Green"),
            car("ts-250", "Speedster again", "Red"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateSlug(s)) if s == "ts-250"));
    }

    #[test]
    fn search_requires_all_words() {
        let catalog = catalog();
        assert_eq!(catalog.search("speedster classic").len(), 1);
        assert_eq!(catalog.search("speedster tourer").len(), 0);
        assert_eq!(catalog.search("FILTER").len(), 1);
        assert_eq!(catalog.search("").len(), 4);
    }

    #[test]
    fn category_filter() {
        let catalog = catalog();
        assert_eq!(catalog.in_category(Some("parts")).len(), 2);
        assert_eq!(catalog.in_category(None).len(), 4);
        assert_eq!(catalog.categories(), vec!["cars", "parts"]);
    }

    #[test]
    fn compatible_products_resolve_slugs() {
        let catalog = catalog();
        let filter = catalog.by_slug("oil-filter").unwrap();
        let compatible = catalog.compatible_products(filter);
        assert_eq!(compatible.len(), 2);

        let speedster = catalog.by_slug("ts-250").unwrap();
        assert!(catalog.compatible_products(speedster).is_empty());
    }

    #[test]
    fn autocomplete_labels() {
        let catalog = catalog();
        assert_eq!(
            catalog.by_slug("ts-250").unwrap().autocomplete_label(),
            "Speedster 250 British Racing Green, Coupe"
        );
        assert_eq!(
            catalog.by_slug("oil-filter").unwrap().autocomplete_label(),
            "Oil Filter"
        );
    }

    #[test]
    fn normalize_term_strips_tags_and_whitespace() {
        assert_eq!(normalize_term("  <b>oil</b>   filter\t"), "oil filter");
        assert_eq!(normalize_term("<script>x</script>"), "x");
    }

    #[test]
    fn pagination_clamps_and_windows() {
        let items: Vec<usize> = (0..40).collect();
        let page = Page::paginate(items.clone(), 2);
        assert_eq!(page.items.len(), 18);
        assert_eq!(page.items[0], 18);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.pages, vec![1, 2, 3]);

        let clamped = Page::paginate(items, 99);
        assert_eq!(clamped.current, 3);
        assert_eq!(clamped.items.len(), 4);

        let empty = Page::paginate(Vec::<usize>::new(), 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
