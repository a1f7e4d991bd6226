//! In-process backend used during development.
//!
//! Every call locks the store for its whole duration, simulated latency
//! included, so calls are applied strictly one after another.

use async_trait::async_trait;
use shared::{ApiError, Item, ShoppingList, ShoppingListStore, User};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::services::api::ShoppingListApi;

pub struct MockApi {
    store: Mutex<ShoppingListStore>,
    user: User,
    latency: Duration,
}

impl MockApi {
    /// Mock backend over the demo data, without latency
    pub fn new(user: User) -> Self {
        Self::with_store(ShoppingListStore::seeded(), user)
    }

    pub fn with_store(store: ShoppingListStore, user: User) -> Self {
        Self {
            store: Mutex::new(store),
            user,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Restore the demo data
    pub async fn reset(&self) {
        self.store.lock().await.reset();
    }

    async fn begin(&self, call: &str) -> MutexGuard<'_, ShoppingListStore> {
        let store = self.store.lock().await;
        info!("Mock API call: {} (user {})", call, self.user.id);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        store
    }
}

fn logged<T>(call: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &result {
        warn!("Mock API call {} failed: {}", call, e);
    }
    result
}

#[async_trait]
impl ShoppingListApi for MockApi {
    fn current_user(&self) -> &User {
        &self.user
    }

    async fn list(&self) -> Result<Vec<ShoppingList>, ApiError> {
        let store = self.begin("list").await;
        Ok(store.list_for_user(&self.user.id))
    }

    async fn get(&self, id: &str) -> Result<ShoppingList, ApiError> {
        let store = self.begin("get").await;
        logged("get", store.get(id, &self.user.id))
    }

    async fn create(&self, name: &str) -> Result<ShoppingList, ApiError> {
        let mut store = self.begin("create").await;
        logged("create", store.create(name, &self.user.id, &self.user.name))
    }

    async fn update(&self, id: &str, name: &str) -> Result<ShoppingList, ApiError> {
        let mut store = self.begin("update").await;
        logged("update", store.update_name(id, name))
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let mut store = self.begin("delete").await;
        logged("delete", store.delete(id))
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<ShoppingList, ApiError> {
        let mut store = self.begin("setArchived").await;
        logged("setArchived", store.set_archived(id, archived))
    }

    async fn add_member(
        &self,
        list_id: &str,
        member_id: &str,
        member_name: &str,
    ) -> Result<ShoppingList, ApiError> {
        let mut store = self.begin("addMember").await;
        logged("addMember", store.add_member(list_id, member_id, member_name))
    }

    async fn remove_member(&self, list_id: &str, member_id: &str) -> Result<ShoppingList, ApiError> {
        let mut store = self.begin("removeMember").await;
        logged("removeMember", store.remove_member(list_id, member_id))
    }

    async fn leave(&self, list_id: &str) -> Result<(), ApiError> {
        let mut store = self.begin("leave").await;
        logged("leave", store.leave(list_id, &self.user.id))
    }

    async fn create_item(&self, list_id: &str, name: &str) -> Result<Item, ApiError> {
        let mut store = self.begin("item/create").await;
        logged("item/create", store.create_item(list_id, name))
    }

    async fn delete_item(&self, list_id: &str, item_id: &str) -> Result<(), ApiError> {
        let mut store = self.begin("item/delete").await;
        logged("item/delete", store.delete_item(list_id, item_id))
    }

    async fn set_item_resolved(
        &self,
        list_id: &str,
        item_id: &str,
        resolved: bool,
    ) -> Result<Item, ApiError> {
        let mut store = self.begin("item/setResolved").await;
        logged(
            "item/setResolved",
            store.set_item_resolved(list_id, item_id, resolved),
        )
    }
}
