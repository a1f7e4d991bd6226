//! # Shopping List Store
//!
//! In-memory collection of shopping lists shared by the mock transport and
//! the development HTTP server. The store is a plain value: whoever owns it
//! decides how calls are serialized, so all mutations take `&mut self`.

use chrono::Utc;
use tracing::{info, warn};

use crate::{ApiError, Item, Member, ShoppingList, User};

pub const LIST_NOT_FOUND: &str = "Shopping list not found";
pub const ITEM_NOT_FOUND: &str = "Item not found";
pub const ACCESS_DENIED: &str = "Access denied";
pub const MEMBER_ALREADY_EXISTS: &str = "Member already exists";
pub const LIST_NAME_REQUIRED: &str = "List name is required";
pub const ITEM_NAME_REQUIRED: &str = "Item name is required";

#[derive(Debug, Clone)]
pub struct ShoppingListStore {
    lists: Vec<ShoppingList>,
    users: Vec<User>,
}

impl ShoppingListStore {
    pub fn new(lists: Vec<ShoppingList>, users: Vec<User>) -> Self {
        Self { lists, users }
    }

    /// Store pre-filled with the demo lists and users
    pub fn seeded() -> Self {
        Self::new(demo_lists(), demo_users())
    }

    /// Throw away all changes and go back to the demo data
    pub fn reset(&mut self) {
        info!("Resetting shopping list store to demo data");
        *self = Self::seeded();
    }

    pub fn user_name(&self, user_id: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.name.as_str())
    }

    /// Lists the user owns or is a member of, in store order
    pub fn list_for_user(&self, user_id: &str) -> Vec<ShoppingList> {
        let lists: Vec<ShoppingList> = self
            .lists
            .iter()
            .filter(|l| l.is_accessible_by(user_id))
            .cloned()
            .collect();
        info!("Found {} shopping lists for user {}", lists.len(), user_id);
        lists
    }

    pub fn get(&self, id: &str, user_id: &str) -> Result<ShoppingList, ApiError> {
        let list = self.find(id)?;
        if !list.is_accessible_by(user_id) {
            warn!("User {} denied access to shopping list {}", user_id, id);
            return Err(ApiError::AccessDenied(ACCESS_DENIED.to_string()));
        }
        Ok(list.clone())
    }

    /// Create a list with the owner as its only member
    pub fn create(
        &mut self,
        name: &str,
        owner_id: &str,
        owner_name: &str,
    ) -> Result<ShoppingList, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(LIST_NAME_REQUIRED.to_string()));
        }

        let mut millis = Utc::now().timestamp_millis();
        while self.lists.iter().any(|l| l.id == ShoppingList::generate_id(millis)) {
            millis += 1;
        }

        let list = ShoppingList {
            id: ShoppingList::generate_id(millis),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            owner_name: owner_name.to_string(),
            archived: false,
            members: vec![Member {
                id: owner_id.to_string(),
                name: owner_name.to_string(),
            }],
            items: Vec::new(),
        };
        self.lists.push(list.clone());

        info!("Created shopping list: {} with ID: {}", list.name, list.id);
        Ok(list)
    }

    pub fn update_name(&mut self, id: &str, name: &str) -> Result<ShoppingList, ApiError> {
        let list = self.find_mut(id)?;
        list.name = name.to_string();
        Ok(list.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        let index = self
            .lists
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| ApiError::NotFound(LIST_NOT_FOUND.to_string()))?;
        let removed = self.lists.remove(index);
        info!("Deleted shopping list: {} with ID: {}", removed.name, removed.id);
        Ok(())
    }

    pub fn set_archived(&mut self, id: &str, archived: bool) -> Result<ShoppingList, ApiError> {
        let list = self.find_mut(id)?;
        list.archived = archived;
        Ok(list.clone())
    }

    pub fn add_member(
        &mut self,
        list_id: &str,
        member_id: &str,
        member_name: &str,
    ) -> Result<ShoppingList, ApiError> {
        let list = self.find_mut(list_id)?;
        if list.has_member(member_id) {
            return Err(ApiError::Conflict(MEMBER_ALREADY_EXISTS.to_string()));
        }
        list.members.push(Member {
            id: member_id.to_string(),
            name: member_name.to_string(),
        });
        Ok(list.clone())
    }

    /// Removing someone who is not a member succeeds without changes
    pub fn remove_member(&mut self, list_id: &str, member_id: &str) -> Result<ShoppingList, ApiError> {
        let list = self.find_mut(list_id)?;
        list.members.retain(|m| m.id != member_id);
        Ok(list.clone())
    }

    /// Drop the user from the members; the list itself is kept
    pub fn leave(&mut self, list_id: &str, user_id: &str) -> Result<(), ApiError> {
        let list = self.find_mut(list_id)?;
        list.members.retain(|m| m.id != user_id);
        info!("User {} left shopping list {}", user_id, list_id);
        Ok(())
    }

    pub fn create_item(&mut self, list_id: &str, name: &str) -> Result<Item, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(ITEM_NAME_REQUIRED.to_string()));
        }
        let list = self.find_mut(list_id)?;

        let mut millis = Utc::now().timestamp_millis();
        while list.find_item(&Item::generate_id(millis)).is_some() {
            millis += 1;
        }

        let item = Item {
            id: Item::generate_id(millis),
            name: name.to_string(),
            resolved: false,
        };
        list.items.push(item.clone());
        Ok(item)
    }

    pub fn delete_item(&mut self, list_id: &str, item_id: &str) -> Result<(), ApiError> {
        let list = self.find_mut(list_id)?;
        let index = list
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| ApiError::NotFound(ITEM_NOT_FOUND.to_string()))?;
        list.items.remove(index);
        Ok(())
    }

    pub fn set_item_resolved(
        &mut self,
        list_id: &str,
        item_id: &str,
        resolved: bool,
    ) -> Result<Item, ApiError> {
        let list = self.find_mut(list_id)?;
        let item = list
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| ApiError::NotFound(ITEM_NOT_FOUND.to_string()))?;
        item.resolved = resolved;
        Ok(item.clone())
    }

    fn find(&self, id: &str) -> Result<&ShoppingList, ApiError> {
        self.lists
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| ApiError::NotFound(LIST_NOT_FOUND.to_string()))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut ShoppingList, ApiError> {
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ApiError::NotFound(LIST_NOT_FOUND.to_string()))
    }
}

impl Default for ShoppingListStore {
    fn default() -> Self {
        Self::seeded()
    }
}

pub fn demo_users() -> Vec<User> {
    [
        ("u1", "Pavel Arbes"),
        ("u2", "Jan Novak"),
        ("u3", "Marie Svobodova"),
        ("u4", "Petr Dvorak"),
    ]
    .into_iter()
    .map(|(id, name)| User {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

fn member(id: &str, name: &str) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn items(entries: &[(&str, &str, bool)]) -> Vec<Item> {
    entries
        .iter()
        .map(|(id, name, resolved)| Item {
            id: id.to_string(),
            name: name.to_string(),
            resolved: *resolved,
        })
        .collect()
}

pub fn demo_lists() -> Vec<ShoppingList> {
    let pavel = member("u1", "Pavel Arbes");
    let jan = member("u2", "Jan Novak");
    let marie = member("u3", "Marie Svobodova");
    let petr = member("u4", "Petr Dvorak");

    vec![
        ShoppingList {
            id: "1".to_string(),
            name: "Weekly Groceries".to_string(),
            owner_id: pavel.id.clone(),
            owner_name: pavel.name.clone(),
            archived: false,
            members: vec![pavel.clone(), jan.clone()],
            items: items(&[
                ("item1", "Milk", false),
                ("item2", "Bread", false),
                ("item3", "Butter", true),
                ("item4", "Eggs", false),
                ("item5", "Cheese", true),
            ]),
        },
        ShoppingList {
            id: "2".to_string(),
            name: "Party Supplies".to_string(),
            owner_id: jan.id.clone(),
            owner_name: jan.name.clone(),
            archived: false,
            members: vec![jan.clone(), pavel.clone(), marie.clone()],
            items: items(&[
                ("item6", "Balloons", false),
                ("item7", "Cake", false),
                ("item8", "Candles", true),
            ]),
        },
        ShoppingList {
            id: "3".to_string(),
            name: "Office Supplies".to_string(),
            owner_id: pavel.id.clone(),
            owner_name: pavel.name.clone(),
            archived: false,
            members: vec![pavel.clone()],
            items: items(&[
                ("item9", "Pens", false),
                ("item10", "Paper", false),
                ("item11", "Stapler", false),
                ("item12", "Folders", true),
                ("item13", "Highlighters", false),
                ("item14", "Notebooks", true),
                ("item15", "Tape", false),
                ("item16", "Scissors", false),
            ]),
        },
        ShoppingList {
            id: "4".to_string(),
            name: "Old Shopping List".to_string(),
            owner_id: pavel.id.clone(),
            owner_name: pavel.name.clone(),
            archived: true,
            members: vec![pavel.clone()],
            items: Vec::new(),
        },
        ShoppingList {
            id: "5".to_string(),
            name: "Holiday Gifts".to_string(),
            owner_id: marie.id.clone(),
            owner_name: marie.name.clone(),
            archived: false,
            members: vec![marie.clone(), pavel, jan, petr],
            items: items(&[
                ("item17", "Gift for Mom", false),
                ("item18", "Gift for Dad", true),
                ("item19", "Gift for Sister", false),
                ("item20", "Gift for Brother", false),
                ("item21", "Gift cards", true),
                ("item22", "Wrapping paper", false),
                ("item23", "Ribbons", false),
                ("item24", "Christmas tree", true),
                ("item25", "Decorations", false),
                ("item26", "Lights", true),
                ("item27", "Chocolate box", false),
                ("item28", "Wine", false),
            ]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test() -> ShoppingListStore {
        ShoppingListStore::seeded()
    }

    #[test]
    fn test_list_for_user_filters_by_owner_or_member() {
        let store = setup_test();

        let ids: Vec<String> = store.list_for_user("u1").into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

        let ids: Vec<String> = store.list_for_user("u4").into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["5"]);

        assert!(store.list_for_user("nobody").is_empty());
    }

    #[test]
    fn test_get_checks_existence_then_access() {
        let store = setup_test();

        let list = store.get("1", "u2").expect("member should read the list");
        assert_eq!(list.name, "Weekly Groceries");

        assert_eq!(
            store.get("404", "u1"),
            Err(ApiError::NotFound(LIST_NOT_FOUND.to_string()))
        );
        assert_eq!(
            store.get("3", "u2"),
            Err(ApiError::AccessDenied(ACCESS_DENIED.to_string()))
        );
    }

    #[test]
    fn test_create_seeds_owner_as_only_member() {
        let mut store = setup_test();

        let list = store.create("Party", "u1", "Pavel Arbes").expect("Failed to create list");
        assert_eq!(list.name, "Party");
        assert_eq!(list.owner_id, "u1");
        assert!(!list.archived);
        assert!(list.items.is_empty());
        assert_eq!(list.members, vec![member("u1", "Pavel Arbes")]);

        assert_eq!(store.get(&list.id, "u1").unwrap(), list);
    }

    #[test]
    fn test_create_assigns_distinct_ids_within_same_millisecond() {
        let mut store = setup_test();

        let first = store.create("A", "u1", "Pavel Arbes").unwrap();
        let second = store.create("B", "u1", "Pavel Arbes").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut store = setup_test();

        let result = store.create("   ", "u1", "Pavel Arbes");
        assert_eq!(result, Err(ApiError::Validation(LIST_NAME_REQUIRED.to_string())));
        assert_eq!(store.list_for_user("u1").len(), 5);
    }

    #[test]
    fn test_update_name_and_archive() {
        let mut store = setup_test();

        let renamed = store.update_name("1", "Groceries").unwrap();
        assert_eq!(renamed.name, "Groceries");

        let archived = store.set_archived("1", true).unwrap();
        assert!(archived.archived);
        assert_eq!(archived.name, "Groceries");

        assert!(store.update_name("404", "x").is_err());
        assert!(store.set_archived("404", true).is_err());
    }

    #[test]
    fn test_delete_list() {
        let mut store = setup_test();

        store.delete("3").expect("Failed to delete list");
        assert!(store.get("3", "u1").is_err());
        assert_eq!(
            store.delete("3"),
            Err(ApiError::NotFound(LIST_NOT_FOUND.to_string()))
        );
    }

    #[test]
    fn test_add_member_rejects_duplicates() {
        let mut store = setup_test();

        let list = store.add_member("1", "u3", "Marie Svobodova").unwrap();
        assert_eq!(list.members.len(), 3);

        let result = store.add_member("1", "u2", "X");
        assert_eq!(result, Err(ApiError::Conflict(MEMBER_ALREADY_EXISTS.to_string())));
        assert_eq!(store.get("1", "u1").unwrap().members.len(), 3);
    }

    #[test]
    fn test_remove_member_of_non_member_is_noop() {
        let mut store = setup_test();

        let before = store.get("1", "u1").unwrap();
        let after = store.remove_member("1", "u4").unwrap();
        assert_eq!(before, after);

        let after = store.remove_member("1", "u2").unwrap();
        assert_eq!(after.members, vec![member("u1", "Pavel Arbes")]);
    }

    #[test]
    fn test_leave_keeps_list_and_revokes_access() {
        let mut store = setup_test();

        store.leave("2", "u1").expect("Failed to leave list");
        assert_eq!(
            store.get("2", "u1"),
            Err(ApiError::AccessDenied(ACCESS_DENIED.to_string()))
        );
        assert!(store.get("2", "u2").is_ok());
        assert!(store.leave("404", "u1").is_err());
    }

    #[test]
    fn test_item_lifecycle() {
        let mut store = setup_test();

        let item = store.create_item("4", "Soap").unwrap();
        assert!(item.id.starts_with("item"));
        assert!(!item.resolved);

        let toggled = store.set_item_resolved("4", &item.id, true).unwrap();
        assert!(toggled.resolved);
        assert_eq!(toggled.id, item.id);

        store.delete_item("4", &item.id).unwrap();
        assert!(store.get("4", "u1").unwrap().items.is_empty());
    }

    #[test]
    fn test_item_errors() {
        let mut store = setup_test();

        assert_eq!(
            store.create_item("404", "Soap"),
            Err(ApiError::NotFound(LIST_NOT_FOUND.to_string()))
        );
        assert_eq!(
            store.create_item("1", ""),
            Err(ApiError::Validation(ITEM_NAME_REQUIRED.to_string()))
        );
        assert_eq!(
            store.delete_item("1", "missing"),
            Err(ApiError::NotFound(ITEM_NOT_FOUND.to_string()))
        );
        assert_eq!(
            store.set_item_resolved("1", "missing", true),
            Err(ApiError::NotFound(ITEM_NOT_FOUND.to_string()))
        );
    }

    #[test]
    fn test_reset_restores_demo_data() {
        let mut store = setup_test();

        store.delete("1").unwrap();
        store.create("Temp", "u1", "Pavel Arbes").unwrap();
        store.reset();

        assert_eq!(store.list_for_user("u1"), demo_lists());
    }

    #[test]
    fn test_user_name_lookup() {
        let store = setup_test();
        assert_eq!(store.user_name("u3"), Some("Marie Svobodova"));
        assert_eq!(store.user_name("u9"), None);
    }
}
