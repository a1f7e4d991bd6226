use shared::{ApiError, ShoppingList};
use tracing::{debug, info, warn};

use crate::hooks::load_state::{HookState, LoadState};
use crate::services::api::ApiClient;

/// Lists visible to the current user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShoppingListsState {
    pub lists: Vec<ShoppingList>,
    pub state: LoadState,
    /// Latest error, from a load or a mutation
    pub error: Option<String>,
}

/// Handle returned by [`use_shopping_lists`].
///
/// Clones share state, so a clone can be moved into a spawned task.
#[derive(Clone)]
pub struct UseShoppingLists {
    api_client: ApiClient,
    state: HookState<ShoppingListsState>,
}

/// Mount the list overview state and run its initial load
pub async fn use_shopping_lists(api_client: &ApiClient) -> UseShoppingLists {
    let hook = UseShoppingLists::new(api_client.clone());
    hook.reload().await;
    hook
}

impl UseShoppingLists {
    /// Create the handle without loading anything yet
    pub fn new(api_client: ApiClient) -> Self {
        Self {
            api_client,
            state: HookState::new(ShoppingListsState::default()),
        }
    }

    pub fn snapshot(&self) -> ShoppingListsState {
        self.state.snapshot()
    }

    pub fn lists(&self) -> Vec<ShoppingList> {
        self.state.read(|s| s.lists.clone())
    }

    pub fn load_state(&self) -> LoadState {
        self.state.read(|s| s.state.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.state.read(|s| s.error.clone())
    }

    /// Fetch the whole collection again; failures end up in the state only
    pub async fn reload(&self) {
        let ticket = self.state.begin_load(|s| {
            s.state = LoadState::Pending;
            s.error = None;
        });
        info!("Loading shopping lists");

        let result = self.api_client.list().await;

        let applied = self.state.finish_load(ticket, |s| match result {
            Ok(lists) => {
                info!("Loaded {} shopping lists", lists.len());
                s.lists = lists;
                s.state = LoadState::Ready;
            }
            Err(e) => {
                warn!("Failed to load shopping lists: {}", e);
                s.error = Some(e.to_string());
                s.state = LoadState::Error(e.to_string());
            }
        });
        if !applied {
            debug!("Discarded stale shopping list load");
        }
    }

    /// Create a list and append the returned record; the name is sent as is
    pub async fn create_list(&self, name: &str) -> Result<ShoppingList, ApiError> {
        info!("Creating shopping list: {}", name);
        match self.api_client.create(name).await {
            Ok(list) => {
                self.state.update(|s| s.lists.push(list.clone()));
                Ok(list)
            }
            Err(e) => Err(self.record_error("create shopping list", e)),
        }
    }

    /// Delete a list and drop it from the local collection
    pub async fn delete_list(&self, id: &str) -> Result<(), ApiError> {
        info!("Deleting shopping list: {}", id);
        match self.api_client.delete(id).await {
            Ok(()) => {
                self.state.update(|s| s.lists.retain(|l| l.id != id));
                Ok(())
            }
            Err(e) => Err(self.record_error("delete shopping list", e)),
        }
    }

    /// Archive or unarchive a list, replacing the local entry with the server record
    pub async fn set_archived(&self, id: &str, archived: bool) -> Result<ShoppingList, ApiError> {
        info!("Setting shopping list {} archived={}", id, archived);
        match self.api_client.set_archived(id, archived).await {
            Ok(updated) => {
                self.state.update(|s| {
                    if let Some(entry) = s.lists.iter_mut().find(|l| l.id == updated.id) {
                        *entry = updated.clone();
                    }
                });
                Ok(updated)
            }
            Err(e) => Err(self.record_error("archive shopping list", e)),
        }
    }

    /// Lists to render; archived ones only when asked for
    pub fn visible_lists(&self, show_archived: bool) -> Vec<ShoppingList> {
        self.state.read(|s| {
            s.lists
                .iter()
                .filter(|l| show_archived || !l.archived)
                .cloned()
                .collect()
        })
    }

    pub fn is_owned_by_current_user(&self, list: &ShoppingList) -> bool {
        list.owner_id == self.api_client.current_user_id()
    }

    /// Tear the hook down; completions arriving later are ignored
    pub fn unmount(&self) {
        self.state.unmount();
    }

    fn record_error(&self, action: &str, error: ApiError) -> ApiError {
        warn!("Failed to {}: {}", action, error);
        self.state.update(|s| s.error = Some(error.to_string()));
        error
    }
}
