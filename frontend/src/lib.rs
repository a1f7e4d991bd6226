//! # Shopping List Frontend
//!
//! UI-agnostic client core for the shared shopping list app.
//!
//! ## Architecture
//!
//! ```text
//! UI components (overview, detail)
//!     ↓ snapshots / actions
//! Hooks (use_shopping_lists, use_shopping_list_detail)
//!     ↓
//! Services (ApiClient → mock store | HTTP backend)
//! ```
//!
//! Components read state snapshots from the hooks and call their actions;
//! hooks talk only to [`services::api::ApiClient`], which hides whether the
//! mock store or the real backend answers.

pub mod config;
pub mod hooks;
pub mod services;

pub use config::{ApiConfig, ConfigError};
pub use hooks::load_state::LoadState;
pub use hooks::use_shopping_list_detail::{use_shopping_list_detail, UseShoppingListDetail};
pub use hooks::use_shopping_lists::{use_shopping_lists, UseShoppingLists};
pub use services::api::{ApiClient, ShoppingListApi};
