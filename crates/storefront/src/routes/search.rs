//! Search route handlers.
//!
//! One endpoint serves both the autocomplete widget (JSON) and the full
//! results page, switched by the `autocomplete` query parameter, matching
//! the shop's original search surface.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::{Page, normalize_term};
use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Maximum number of autocomplete suggestions.
const AUTOCOMPLETE_LIMIT: usize = 10;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
    /// When set to a truthy value, return JSON suggestions instead of a page.
    #[serde(default)]
    pub autocomplete: Option<String>,
    pub page: Option<usize>,
}

/// One autocomplete suggestion.
#[derive(Debug, Serialize)]
pub struct Suggestion {
    pub href: String,
    pub product: String,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/results.html")]
pub struct SearchTemplate {
    pub term: String,
    pub products: Vec<ProductView>,
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub pager: Vec<usize>,
}

/// Search the catalog.
///
/// Every whitespace-separated word of the term must match; markup in the
/// raw term is stripped before matching.
#[instrument(skip(state))]
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let term = normalize_term(&query.term);
    let results = state.catalog().search(&term);

    if query.autocomplete.as_deref().is_some_and(|v| v == "1" || v == "true") {
        let suggestions: Vec<Suggestion> = results
            .iter()
            .take(AUTOCOMPLETE_LIMIT)
            .map(|product| Suggestion {
                href: product.href(),
                product: product.autocomplete_label(),
            })
            .collect();

        return Json(suggestions).into_response();
    }

    let total = results.len();
    let page = Page::paginate(results, query.page.unwrap_or(1));

    SearchTemplate {
        term,
        products: page.items.iter().map(|&p| ProductView::from(p)).collect(),
        total,
        current_page: page.current,
        total_pages: page.total_pages,
        pager: page.pages,
    }
    .into_response()
}
