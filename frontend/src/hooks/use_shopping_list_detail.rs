//! # Shopping List Detail Hook
//!
//! Holds one shopping list (name, owner, members, items) keyed by its ID.
//!
//! Two reconciliation strategies are used after a successful mutation:
//! - **replace**: rename, archive and membership changes swap in the whole
//!   record returned by the backend, so the server stays the source of truth
//! - **patch**: item add/delete/toggle touch only the affected item, since
//!   the backend answers those with the item alone
//!
//! A failed mutation records its message in `error` but leaves `state`
//! alone: only a failed load blocks the content.

use chrono::Utc;
use shared::{ApiError, Item, Member, ShoppingList};
use tracing::{debug, info, warn};

use crate::hooks::load_state::{HookState, LoadState};
use crate::services::api::ApiClient;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShoppingListDetailState {
    pub list_id: String,
    pub list: Option<ShoppingList>,
    pub state: LoadState,
    /// Latest error, from a load or a mutation
    pub error: Option<String>,
}

/// A member as shown in the members section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    pub member: Member,
    pub is_owner: bool,
    pub is_current_user: bool,
}

/// Fresh member ID for a member added by name
pub fn generate_member_id() -> String {
    Member::generate_id(Utc::now().timestamp_millis())
}

#[derive(Clone)]
pub struct UseShoppingListDetail {
    api_client: ApiClient,
    state: HookState<ShoppingListDetailState>,
}

/// Mount the detail state for one list and run its initial load
pub async fn use_shopping_list_detail(api_client: &ApiClient, list_id: &str) -> UseShoppingListDetail {
    let hook = UseShoppingListDetail::new(api_client.clone(), list_id);
    hook.reload().await;
    hook
}

impl UseShoppingListDetail {
    pub fn new(api_client: ApiClient, list_id: &str) -> Self {
        Self {
            api_client,
            state: HookState::new(ShoppingListDetailState {
                list_id: list_id.to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn snapshot(&self) -> ShoppingListDetailState {
        self.state.snapshot()
    }

    pub fn list_id(&self) -> String {
        self.state.read(|s| s.list_id.clone())
    }

    pub fn list(&self) -> Option<ShoppingList> {
        self.state.read(|s| s.list.clone())
    }

    pub fn load_state(&self) -> LoadState {
        self.state.read(|s| s.state.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.state.read(|s| s.error.clone())
    }

    /// Whether the current user owns the loaded list
    pub fn is_owner(&self) -> bool {
        let user_id = self.api_client.current_user_id();
        self.state
            .read(|s| s.list.as_ref().is_some_and(|l| l.owner_id == user_id))
    }

    /// Fetch the list again. Nothing happens while the ID is empty.
    pub async fn reload(&self) {
        let list_id = self.list_id();
        if list_id.is_empty() {
            return;
        }

        let ticket = self.state.begin_load(|s| {
            s.state = LoadState::Pending;
            s.error = None;
        });
        info!("Loading shopping list {}", list_id);

        let result = self.api_client.get(&list_id).await;

        let applied = self.state.finish_load(ticket, |s| match result {
            Ok(list) => {
                info!("Loaded shopping list {} with {} items", list.id, list.items.len());
                s.list = Some(list);
                s.state = LoadState::Ready;
            }
            Err(e) => {
                warn!("Failed to load shopping list {}: {}", list_id, e);
                s.error = Some(e.to_string());
                s.state = LoadState::Error(e.to_string());
            }
        });
        if !applied {
            debug!("Discarded stale load of shopping list {}", list_id);
        }
    }

    /// Point the hook at another list and load it; same ID is a no-op
    pub async fn set_list_id(&self, list_id: &str) {
        let changed = self.state.read(|s| s.list_id != list_id);
        if !changed {
            return;
        }
        info!("Switching shopping list detail to {}", list_id);
        // Starts a cycle even for an empty ID, so loads of the old list are dropped
        self.state.begin_load(|s| {
            s.list_id = list_id.to_string();
            s.list = None;
            s.state = LoadState::Pending;
            s.error = None;
        });
        self.reload().await;
    }

    /// Rename the list (replace)
    pub async fn update_name(&self, name: &str) -> Result<ShoppingList, ApiError> {
        let list_id = self.list_id();
        info!("Renaming shopping list {} to {}", list_id, name);
        let result = self.api_client.update(&list_id, name).await;
        self.replace_list(&list_id, "rename shopping list", result)
    }

    /// Archive or unarchive the list (replace)
    pub async fn set_archived(&self, archived: bool) -> Result<ShoppingList, ApiError> {
        let list_id = self.list_id();
        info!("Setting shopping list {} archived={}", list_id, archived);
        let result = self.api_client.set_archived(&list_id, archived).await;
        self.replace_list(&list_id, "archive shopping list", result)
    }

    /// Add a member under a caller-generated ID (replace)
    pub async fn add_member(&self, member_id: &str, member_name: &str) -> Result<ShoppingList, ApiError> {
        let list_id = self.list_id();
        info!("Adding member {} ({}) to shopping list {}", member_name, member_id, list_id);
        let result = self
            .api_client
            .add_member(&list_id, member_id, member_name)
            .await;
        self.replace_list(&list_id, "add member", result)
    }

    /// Remove a member (replace)
    pub async fn remove_member(&self, member_id: &str) -> Result<ShoppingList, ApiError> {
        let list_id = self.list_id();
        info!("Removing member {} from shopping list {}", member_id, list_id);
        let result = self.api_client.remove_member(&list_id, member_id).await;
        self.replace_list(&list_id, "remove member", result)
    }

    /// Leave the list as the current user. The local record is kept; the
    /// caller is expected to navigate away.
    pub async fn leave_list(&self) -> Result<(), ApiError> {
        let list_id = self.list_id();
        info!("Leaving shopping list {}", list_id);
        match self.api_client.leave(&list_id).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.record_error(&list_id, "leave shopping list", e)),
        }
    }

    /// Add an item and append it locally (patch)
    pub async fn add_item(&self, name: &str) -> Result<Item, ApiError> {
        let list_id = self.list_id();
        info!("Adding item {} to shopping list {}", name, list_id);
        match self.api_client.create_item(&list_id, name).await {
            Ok(item) => {
                self.patch_items(&list_id, |items| items.push(item.clone()));
                Ok(item)
            }
            Err(e) => Err(self.record_error(&list_id, "add item", e)),
        }
    }

    /// Delete an item and drop it locally (patch)
    pub async fn delete_item(&self, item_id: &str) -> Result<(), ApiError> {
        let list_id = self.list_id();
        info!("Deleting item {} from shopping list {}", item_id, list_id);
        match self.api_client.delete_item(&list_id, item_id).await {
            Ok(()) => {
                self.patch_items(&list_id, |items| items.retain(|i| i.id != item_id));
                Ok(())
            }
            Err(e) => Err(self.record_error(&list_id, "delete item", e)),
        }
    }

    /// Flip an item's resolved flag (patch).
    ///
    /// Returns `Ok(None)` without calling the backend when the item is not
    /// in the local list. The stored flag is the one echoed by the backend.
    pub async fn toggle_item_resolved(&self, item_id: &str) -> Result<Option<Item>, ApiError> {
        let (list_id, current) = self.state.read(|s| {
            let resolved = s
                .list
                .as_ref()
                .and_then(|l| l.find_item(item_id))
                .map(|i| i.resolved);
            (s.list_id.clone(), resolved)
        });
        let Some(resolved) = current else {
            debug!("Item {} not in shopping list {}, nothing to toggle", item_id, list_id);
            return Ok(None);
        };

        info!("Setting item {} resolved={}", item_id, !resolved);
        match self
            .api_client
            .set_item_resolved(&list_id, item_id, !resolved)
            .await
        {
            Ok(updated) => {
                self.patch_items(&list_id, |items| {
                    if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
                        item.resolved = updated.resolved;
                    }
                });
                Ok(Some(updated))
            }
            Err(e) => Err(self.record_error(&list_id, "toggle item", e)),
        }
    }

    /// Items to render; resolved ones only when asked for
    pub fn visible_items(&self, show_resolved: bool) -> Vec<Item> {
        self.state.read(|s| {
            s.list
                .iter()
                .flat_map(|l| l.items.iter())
                .filter(|i| show_resolved || !i.resolved)
                .cloned()
                .collect()
        })
    }

    pub fn member_views(&self) -> Vec<MemberView> {
        let user_id = self.api_client.current_user_id();
        self.state.read(|s| match &s.list {
            Some(list) => list
                .members
                .iter()
                .map(|m| MemberView {
                    member: m.clone(),
                    is_owner: m.id == list.owner_id,
                    is_current_user: m.id == user_id,
                })
                .collect(),
            None => Vec::new(),
        })
    }

    pub fn resolved_count(&self) -> usize {
        self.state.read(|s| {
            s.list
                .as_ref()
                .map_or(0, |l| l.items.iter().filter(|i| i.resolved).count())
        })
    }

    /// Tear the hook down; completions arriving later are ignored
    pub fn unmount(&self) {
        self.state.unmount();
    }

    fn replace_list(
        &self,
        list_id: &str,
        action: &str,
        result: Result<ShoppingList, ApiError>,
    ) -> Result<ShoppingList, ApiError> {
        match result {
            Ok(list) => {
                self.state.update(|s| {
                    if s.list_id == list_id {
                        s.list = Some(list.clone());
                    }
                });
                Ok(list)
            }
            Err(e) => Err(self.record_error(list_id, action, e)),
        }
    }

    fn patch_items(&self, list_id: &str, f: impl FnOnce(&mut Vec<Item>)) {
        self.state.update(|s| {
            if s.list_id != list_id {
                return;
            }
            if let Some(list) = s.list.as_mut() {
                f(&mut list.items);
            }
        });
    }

    /// Outcomes for a list the hook no longer shows are not recorded
    fn record_error(&self, list_id: &str, action: &str, error: ApiError) -> ApiError {
        warn!("Failed to {} on shopping list {}: {}", action, list_id, error);
        self.state.update(|s| {
            if s.list_id == list_id {
                s.error = Some(error.to_string());
            }
        });
        error
    }
}
