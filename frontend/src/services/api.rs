use async_trait::async_trait;
use shared::{ApiError, Item, ShoppingList, User};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::ApiConfig;
use crate::services::http_api::HttpApi;
use crate::services::mock_api::MockApi;

/// Call contract of the list/item backend.
///
/// The current user is implicit: each implementation knows who it acts for
/// and scopes `list`, `get`, `create` and `leave` accordingly.
#[async_trait]
pub trait ShoppingListApi: Send + Sync {
    fn current_user(&self) -> &User;

    /// Lists the current user owns or is a member of
    async fn list(&self) -> Result<Vec<ShoppingList>, ApiError>;

    async fn get(&self, id: &str) -> Result<ShoppingList, ApiError>;

    /// Create a list owned by the current user
    async fn create(&self, name: &str) -> Result<ShoppingList, ApiError>;

    async fn update(&self, id: &str, name: &str) -> Result<ShoppingList, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;

    async fn set_archived(&self, id: &str, archived: bool) -> Result<ShoppingList, ApiError>;

    async fn add_member(
        &self,
        list_id: &str,
        member_id: &str,
        member_name: &str,
    ) -> Result<ShoppingList, ApiError>;

    async fn remove_member(&self, list_id: &str, member_id: &str) -> Result<ShoppingList, ApiError>;

    /// Remove the current user from the list's members
    async fn leave(&self, list_id: &str) -> Result<(), ApiError>;

    async fn create_item(&self, list_id: &str, name: &str) -> Result<Item, ApiError>;

    async fn delete_item(&self, list_id: &str, item_id: &str) -> Result<(), ApiError>;

    async fn set_item_resolved(
        &self,
        list_id: &str,
        item_id: &str,
        resolved: bool,
    ) -> Result<Item, ApiError>;
}

/// API client handed to the hooks.
///
/// Cheap to clone; every clone talks to the same backend (and, in mock mode,
/// the same in-memory store).
#[derive(Clone)]
pub struct ApiClient {
    api: Arc<dyn ShoppingListApi>,
}

impl ApiClient {
    /// Create a client over any backend implementation
    pub fn new(api: Arc<dyn ShoppingListApi>) -> Self {
        Self { api }
    }

    /// Pick the mock store or the HTTP backend according to the config
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.use_mock {
            info!("Using mock shopping list API for user {}", config.current_user_id);
            let mock = MockApi::new(config.current_user())
                .with_latency(Duration::from_millis(config.mock_latency_ms));
            Ok(Self::new(Arc::new(mock)))
        } else {
            info!(
                "Using shopping list API at {} for user {}",
                config.base_url, config.current_user_id
            );
            let http = HttpApi::new(
                &config.base_url,
                config.current_user(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Self::new(Arc::new(http)))
        }
    }

    pub fn current_user(&self) -> &User {
        self.api.current_user()
    }

    pub fn current_user_id(&self) -> &str {
        &self.api.current_user().id
    }

    /// List all shopping lists for the current user
    pub async fn list(&self) -> Result<Vec<ShoppingList>, ApiError> {
        self.api.list().await
    }

    /// Get a single shopping list by ID
    pub async fn get(&self, id: &str) -> Result<ShoppingList, ApiError> {
        self.api.get(id).await
    }

    /// Create a new shopping list
    pub async fn create(&self, name: &str) -> Result<ShoppingList, ApiError> {
        self.api.create(name).await
    }

    /// Rename a shopping list
    pub async fn update(&self, id: &str, name: &str) -> Result<ShoppingList, ApiError> {
        self.api.update(id, name).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(id).await
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> Result<ShoppingList, ApiError> {
        self.api.set_archived(id, archived).await
    }

    pub async fn add_member(
        &self,
        list_id: &str,
        member_id: &str,
        member_name: &str,
    ) -> Result<ShoppingList, ApiError> {
        self.api.add_member(list_id, member_id, member_name).await
    }

    pub async fn remove_member(&self, list_id: &str, member_id: &str) -> Result<ShoppingList, ApiError> {
        self.api.remove_member(list_id, member_id).await
    }

    /// Leave a list as a member
    pub async fn leave(&self, list_id: &str) -> Result<(), ApiError> {
        self.api.leave(list_id).await
    }

    pub async fn create_item(&self, list_id: &str, name: &str) -> Result<Item, ApiError> {
        self.api.create_item(list_id, name).await
    }

    pub async fn delete_item(&self, list_id: &str, item_id: &str) -> Result<(), ApiError> {
        self.api.delete_item(list_id, item_id).await
    }

    pub async fn set_item_resolved(
        &self,
        list_id: &str,
        item_id: &str,
        resolved: bool,
    ) -> Result<Item, ApiError> {
        self.api.set_item_resolved(list_id, item_id, resolved).await
    }
}
