//! Web server adapter.
//!
//! JSON API over [`InvestmentService`]: list, get, search, create, update,
//! delete, plus the chart summaries.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::InvestmentService;

pub struct AppState {
    pub service: InvestmentService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/investment",
            get(handlers::list_investments).post(handlers::add_investment),
        )
        .route("/investment/search", post(handlers::search_investments))
        .route("/investment/summary", get(handlers::summary))
        .route("/investment/summary/monthly", get(handlers::monthly_summary))
        .route(
            "/investment/{id}",
            get(handlers::get_investment)
                .put(handlers::update_investment)
                .delete(handlers::delete_investment),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
