use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod store;

pub use store::ShoppingListStore;

/// Fallback message when an error response carries nothing readable
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Header carrying the caller's identity on every HTTP request
pub const USER_ID_HEADER: &str = "x-user-id";

/// A shopping list with its members and items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_name: String,
    /// Archived lists stay readable and editable, they are only hidden by default
    pub archived: bool,
    pub members: Vec<Member>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub resolved: bool,
}

/// A known user of the system (used to resolve display names)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl ShoppingList {
    /// List ID in format: "<epoch_millis>"
    pub fn generate_id(epoch_millis: i64) -> String {
        epoch_millis.to_string()
    }

    pub fn is_accessible_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.has_member(user_id)
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.id == member_id)
    }

    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

impl Item {
    /// Item ID in format: "item<epoch_millis>"
    pub fn generate_id(epoch_millis: i64) -> String {
        format!("item{}", epoch_millis)
    }
}

impl Member {
    /// Member ID in format: "user<epoch_millis>"
    pub fn generate_id(epoch_millis: i64) -> String {
        format!("user{}", epoch_millis)
    }
}

/// Every failure of the list/item API.
///
/// Each variant carries the human-readable message and displays as exactly
/// that message, so callers that only care about text can use `to_string()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Target list, item or member is absent
    #[error("{0}")]
    NotFound(String),
    /// Caller is neither owner nor member
    #[error("{0}")]
    AccessDenied(String),
    /// Duplicate member
    #[error("{0}")]
    Conflict(String),
    /// Empty or otherwise invalid input
    #[error("{0}")]
    Validation(String),
    /// Network, decoding or unexpected server failure
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::AccessDenied(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::Transport(msg) => msg,
        }
    }

    /// Stable machine-readable code, used as the key of `uuAppErrorMap`
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "notFound",
            ApiError::AccessDenied(_) => "accessDenied",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation",
            ApiError::Transport(_) => "transport",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::AccessDenied(_) => 403,
            ApiError::Conflict(_) => 409,
            ApiError::Validation(_) => 400,
            ApiError::Transport(_) => 500,
        }
    }

    /// Rebuild an error from a non-2xx HTTP status and the extracted message
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ApiError::Validation(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Transport(message),
        }
    }
}

// Request bodies for the HTTP wire contract

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetListQuery {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateListRequest {
    pub id: String,
    pub name: String,
}

/// Body of the calls that only need the list ID (delete, leave)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListIdRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetArchivedRequest {
    pub id: String,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub id: String,
    pub member_id: String,
    /// Optional on the wire; the server falls back to its user directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberRequest {
    pub id: String,
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub list_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemRequest {
    pub list_id: String,
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetItemResolvedRequest {
    pub list_id: String,
    pub item_id: String,
    pub resolved: bool,
}

// Response bodies

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListsResponse {
    pub lists: Vec<ShoppingList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub list: ShoppingList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item: Item,
}

/// Success marker returned by delete/leave calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body of a non-2xx response.
///
/// Servers either send a nested `uuAppErrorMap` keyed by error code or a
/// flat `error` string. The map keeps the order the server sent its entries in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "uuAppErrorMap", default, skip_serializing_if = "Option::is_none")]
    pub uu_app_error_map: Option<IndexMap<String, ErrorEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn from_error(error: &ApiError) -> Self {
        let mut map = IndexMap::new();
        map.insert(
            error.code().to_string(),
            ErrorEntry {
                message: Some(error.message().to_string()),
            },
        );
        Self {
            uu_app_error_map: Some(map),
            error: None,
        }
    }

    /// Message to surface to the user.
    ///
    /// The first map entry as sent wins. A present `uuAppErrorMap` wins even
    /// when that entry has no message; only without a map is the flat
    /// `error` field consulted.
    pub fn message(&self) -> String {
        match &self.uu_app_error_map {
            Some(map) => map
                .values()
                .next()
                .and_then(|entry| entry.message.clone())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            None => self
                .error
                .clone()
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_list() -> ShoppingList {
        ShoppingList {
            id: "1".to_string(),
            name: "Weekly Groceries".to_string(),
            owner_id: "u1".to_string(),
            owner_name: "Pavel Arbes".to_string(),
            archived: false,
            members: vec![
                Member { id: "u1".to_string(), name: "Pavel Arbes".to_string() },
                Member { id: "u2".to_string(), name: "Jan Novak".to_string() },
            ],
            items: vec![Item { id: "item1".to_string(), name: "Milk".to_string(), resolved: false }],
        }
    }

    #[test]
    fn test_shopping_list_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(sample_list()).unwrap();
        assert_eq!(json["ownerId"], "u1");
        assert_eq!(json["ownerName"], "Pavel Arbes");
        assert!(json.get("owner_id").is_none());

        let back: ShoppingList = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_list());
    }

    #[test]
    fn test_access_check() {
        let list = sample_list();
        assert!(list.is_accessible_by("u1"));
        assert!(list.is_accessible_by("u2"));
        assert!(!list.is_accessible_by("u3"));
    }

    #[test]
    fn test_generate_ids() {
        assert_eq!(ShoppingList::generate_id(1702516122000), "1702516122000");
        assert_eq!(Item::generate_id(1702516122000), "item1702516122000");
        assert_eq!(Member::generate_id(1702516122000), "user1702516122000");
    }

    #[test]
    fn test_api_error_displays_bare_message() {
        let err = ApiError::NotFound("Shopping list not found".to_string());
        assert_eq!(err.to_string(), "Shopping list not found");
        assert_eq!(err.code(), "notFound");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_api_error_from_status() {
        let msg = || "boom".to_string();
        assert_eq!(ApiError::from_status(400, msg()), ApiError::Validation(msg()));
        assert_eq!(ApiError::from_status(403, msg()), ApiError::AccessDenied(msg()));
        assert_eq!(ApiError::from_status(404, msg()), ApiError::NotFound(msg()));
        assert_eq!(ApiError::from_status(409, msg()), ApiError::Conflict(msg()));
        assert_eq!(ApiError::from_status(502, msg()), ApiError::Transport(msg()));
    }

    #[test]
    fn test_error_message_prefers_error_map() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"uuAppErrorMap": {"listNotFound": {"message": "Shopping list not found"}}, "error": "flat"}"#,
        )
        .unwrap();
        assert_eq!(body.message(), "Shopping list not found");
    }

    #[test]
    fn test_error_message_takes_first_entry_as_sent() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"uuAppErrorMap": {"zeta": {"message": "sent first"}, "alpha": {"message": "sent second"}}}"#,
        )
        .unwrap();
        assert_eq!(body.message(), "sent first");
    }

    #[test]
    fn test_error_message_map_without_message_falls_back_to_unknown() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"uuAppErrorMap": {}, "error": "flat"}"#).unwrap();
        assert_eq!(body.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_error_message_flat_field_and_fallback() {
        let flat: ErrorResponse = serde_json::from_str(r#"{"error": "Access denied"}"#).unwrap();
        assert_eq!(flat.message(), "Access denied");

        let empty: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_error_response_from_error() {
        let err = ApiError::Conflict("Member already exists".to_string());
        let body = ErrorResponse::from_error(&err);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["uuAppErrorMap"]["conflict"]["message"], "Member already exists");
        assert!(json.get("error").is_none());
        assert_eq!(body.message(), "Member already exists");
    }

    #[test]
    fn test_add_member_request_member_name_is_optional() {
        let req: AddMemberRequest =
            serde_json::from_str(r#"{"id": "1", "memberId": "u3"}"#).unwrap();
        assert_eq!(req.member_name, None);

        let json = serde_json::to_value(AddMemberRequest {
            id: "1".to_string(),
            member_id: "u3".to_string(),
            member_name: Some("Marie Svobodova".to_string()),
        })
        .unwrap();
        assert_eq!(json["memberName"], "Marie Svobodova");
    }
}
