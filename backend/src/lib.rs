//! # Shopping List Backend
//!
//! Development HTTP server for the shopping list client. It serves the same
//! call contract as the real service on top of the in-memory store from
//! `shared`, so the frontend can run in HTTP mode locally.

use std::sync::Arc;

use axum::{
    http::Method,
    routing::{delete, get, patch, post, put},
    Router,
};
use shared::ShoppingListStore;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod rest;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ShoppingListStore>>,
}

impl AppState {
    pub fn new(store: ShoppingListStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ShoppingListStore::seeded())
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let list_routes = Router::new()
        .route("/list", get(rest::list_shopping_lists))
        .route("/get", get(rest::get_shopping_list))
        .route("/create", post(rest::create_shopping_list))
        .route("/update", put(rest::update_shopping_list))
        .route("/delete", delete(rest::delete_shopping_list))
        .route("/setArchived", patch(rest::set_archived))
        .route("/addMember", post(rest::add_member))
        .route("/removeMember", delete(rest::remove_member))
        .route("/leave", delete(rest::leave_shopping_list));

    let item_routes = Router::new()
        .route("/create", post(rest::create_item))
        .route("/delete", delete(rest::delete_item))
        .route("/setResolved", patch(rest::set_item_resolved));

    info!("Shopping list routes configured");
    Router::new()
        .nest("/shoppingList", list_routes)
        .nest("/shoppingListItem", item_routes)
        .layer(cors)
        .with_state(app_state)
}
