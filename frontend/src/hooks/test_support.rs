//! Backend wrapper for hook tests: records calls, injects failures and can
//! hold a call open after it has read from the store.

use async_trait::async_trait;
use shared::{ApiError, Item, ShoppingList, User};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::services::api::{ApiClient, ShoppingListApi};
use crate::services::mock_api::MockApi;

pub(crate) struct Gate {
    /// Fires once the held call has its result
    pub fetched: oneshot::Receiver<()>,
    /// Lets the held call return
    pub release: oneshot::Sender<()>,
}

struct Held {
    fetched: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

pub(crate) struct ScriptedApi {
    inner: MockApi,
    calls: Mutex<Vec<(String, String)>>,
    failures: Mutex<HashMap<String, ApiError>>,
    held: Mutex<HashMap<String, Held>>,
}

/// Client over a fresh demo store, acting as user `u1`
pub(crate) fn mock_client() -> (ApiClient, Arc<ScriptedApi>) {
    let scripted = Arc::new(ScriptedApi::new(User {
        id: "u1".to_string(),
        name: "Pavel Arbes".to_string(),
    }));
    (ApiClient::new(scripted.clone()), scripted)
}

impl ScriptedApi {
    pub(crate) fn new(user: User) -> Self {
        Self {
            inner: MockApi::new(user),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            held: Mutex::new(HashMap::new()),
        }
    }

    /// Make the next call of this name fail without touching the store
    pub(crate) fn fail_next(&self, call: &str, error: ApiError) {
        self.failures.lock().unwrap().insert(call.to_string(), error);
    }

    /// Hold the next call of this name open after it has read the store
    pub(crate) fn hold_next(&self, call: &str) -> Gate {
        let (fetched_tx, fetched_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.held.lock().unwrap().insert(
            call.to_string(),
            Held {
                fetched: fetched_tx,
                release: release_rx,
            },
        );
        Gate {
            fetched: fetched_rx,
            release: release_tx,
        }
    }

    pub(crate) fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(name, _)| name == call).count()
    }

    /// Arguments of every recorded call of this name, in order
    pub(crate) fn calls_of(&self, call: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == call)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub(crate) async fn backend_has_list(&self, id: &str) -> bool {
        self.inner.get(id).await.is_ok()
    }

    fn before(&self, call: &str, args: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push((call.to_string(), args));
        match self.failures.lock().unwrap().remove(call) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn after<T>(&self, call: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        let held = self.held.lock().unwrap().remove(call);
        if let Some(held) = held {
            let _ = held.fetched.send(());
            let _ = held.release.await;
        }
        result
    }
}

#[async_trait]
impl ShoppingListApi for ScriptedApi {
    fn current_user(&self) -> &User {
        self.inner.current_user()
    }

    async fn list(&self) -> Result<Vec<ShoppingList>, ApiError> {
        self.before("list", String::new())?;
        let result = self.inner.list().await;
        self.after("list", result).await
    }

    async fn get(&self, id: &str) -> Result<ShoppingList, ApiError> {
        self.before("get", id.to_string())?;
        let result = self.inner.get(id).await;
        self.after("get", result).await
    }

    async fn create(&self, name: &str) -> Result<ShoppingList, ApiError> {
        self.before("create", name.to_string())?;
        let result = self.inner.create(name).await;
        self.after("create", result).await
    }

    async fn update(&self, id: &str, name: &str) -> Result<ShoppingList, ApiError> {
        self.before("update", format!("{} {}", id, name))?;
        let result = self.inner.update(id, name).await;
        self.after("update", result).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.before("delete", id.to_string())?;
        let result = self.inner.delete(id).await;
        self.after("delete", result).await
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<ShoppingList, ApiError> {
        self.before("setArchived", format!("{} {}", id, archived))?;
        let result = self.inner.set_archived(id, archived).await;
        self.after("setArchived", result).await
    }

    async fn add_member(
        &self,
        list_id: &str,
        member_id: &str,
        member_name: &str,
    ) -> Result<ShoppingList, ApiError> {
        self.before("addMember", format!("{} {} {}", list_id, member_id, member_name))?;
        let result = self.inner.add_member(list_id, member_id, member_name).await;
        self.after("addMember", result).await
    }

    async fn remove_member(&self, list_id: &str, member_id: &str) -> Result<ShoppingList, ApiError> {
        self.before("removeMember", format!("{} {}", list_id, member_id))?;
        let result = self.inner.remove_member(list_id, member_id).await;
        self.after("removeMember", result).await
    }

    async fn leave(&self, list_id: &str) -> Result<(), ApiError> {
        self.before("leave", list_id.to_string())?;
        let result = self.inner.leave(list_id).await;
        self.after("leave", result).await
    }

    async fn create_item(&self, list_id: &str, name: &str) -> Result<Item, ApiError> {
        self.before("item/create", format!("{} {}", list_id, name))?;
        let result = self.inner.create_item(list_id, name).await;
        self.after("item/create", result).await
    }

    async fn delete_item(&self, list_id: &str, item_id: &str) -> Result<(), ApiError> {
        self.before("item/delete", format!("{} {}", list_id, item_id))?;
        let result = self.inner.delete_item(list_id, item_id).await;
        self.after("item/delete", result).await
    }

    async fn set_item_resolved(
        &self,
        list_id: &str,
        item_id: &str,
        resolved: bool,
    ) -> Result<Item, ApiError> {
        self.before("item/setResolved", format!("{} {} {}", list_id, item_id, resolved))?;
        let result = self.inner.set_item_resolved(list_id, item_id, resolved).await;
        self.after("item/setResolved", result).await
    }
}
