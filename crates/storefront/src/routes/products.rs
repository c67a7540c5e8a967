//! Product route handlers: category listing and product detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{Page, Product, ProductKind};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub description: String,
    /// Color and body class, for cars.
    pub car_details: Option<String>,
    pub is_accessory: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let (car_details, is_accessory) = match &product.kind {
            ProductKind::Car { color, class } => (Some(format!("{color}, {class}")), false),
            ProductKind::AccessoryPart { .. } => (None, true),
        };

        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            car_details,
            is_accessory,
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub page: Option<usize>,
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/listing.html")]
pub struct ListingTemplate {
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub products: Vec<ProductView>,
    pub current_page: usize,
    pub total_pages: usize,
    pub pager: Vec<usize>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/detail.html")]
pub struct DetailTemplate {
    pub product: ProductView,
    /// Products a part is compatible with; empty for cars.
    pub compatible: Vec<ProductView>,
}

/// Display the shop listing, optionally filtered to one category.
#[instrument(skip(state))]
pub async fn listing(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let catalog = state.catalog();
    let products = catalog.in_category(query.category.as_deref());
    let page = Page::paginate(products, query.page.unwrap_or(1));

    ListingTemplate {
        category: query.category,
        categories: catalog.categories().iter().map(|&c| c.to_owned()).collect(),
        products: page.items.iter().map(|&p| ProductView::from(p)).collect(),
        current_page: page.current,
        total_pages: page.total_pages,
        pager: page.pages,
    }
    .into_response()
}

/// Display a product detail page.
///
/// Accessory parts additionally list the cars they are compatible with.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    let catalog = state.catalog();
    let product = catalog
        .by_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let compatible = catalog
        .compatible_products(product)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(DetailTemplate {
        product: ProductView::from(product),
        compatible,
    }
    .into_response())
}
