use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    AddMemberRequest, ApiError, CreateItemRequest, CreateListRequest, DeleteItemRequest,
    ErrorResponse, GetListQuery, Item, ItemResponse, ListIdRequest, ListResponse, ListsResponse,
    RemoveMemberRequest, SetArchivedRequest, SetItemResolvedRequest, ShoppingList,
    SuccessResponse, UpdateListRequest, User, UNKNOWN_ERROR_MESSAGE, USER_ID_HEADER,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::services::api::ShoppingListApi;

/// Backend reached over HTTP with JSON bodies
pub struct HttpApi {
    client: Client,
    base_url: String,
    user: User,
}

impl HttpApi {
    pub fn new(base_url: &str, user: User, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
        })
    }

    async fn call<B, R>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&GetListQuery>,
        body: Option<&B>,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        info!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(USER_ID_HEADER, &self.user.id)
            .header(CONTENT_TYPE, "application/json");
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Network error: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let error = ApiError::from_status(status.as_u16(), error_message(&text));
            warn!("{} failed with {}: {}", url, status, error);
            return Err(error);
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::Transport(format!("Failed to parse response: {}", e)))
    }
}

/// Message of an error body: nested error map, then flat `error`, then fallback
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|response| response.message())
        .unwrap_or_else(|_| UNKNOWN_ERROR_MESSAGE.to_string())
}

#[async_trait]
impl ShoppingListApi for HttpApi {
    fn current_user(&self) -> &User {
        &self.user
    }

    async fn list(&self) -> Result<Vec<ShoppingList>, ApiError> {
        let data: ListsResponse = self
            .call::<(), _>(Method::GET, "/shoppingList/list", None, None)
            .await?;
        Ok(data.lists)
    }

    async fn get(&self, id: &str) -> Result<ShoppingList, ApiError> {
        let query = GetListQuery { id: id.to_string() };
        let data: ListResponse = self
            .call::<(), _>(Method::GET, "/shoppingList/get", Some(&query), None)
            .await?;
        Ok(data.list)
    }

    async fn create(&self, name: &str) -> Result<ShoppingList, ApiError> {
        let body = CreateListRequest { name: name.to_string() };
        let data: ListResponse = self
            .call(Method::POST, "/shoppingList/create", None, Some(&body))
            .await?;
        Ok(data.list)
    }

    async fn update(&self, id: &str, name: &str) -> Result<ShoppingList, ApiError> {
        let body = UpdateListRequest {
            id: id.to_string(),
            name: name.to_string(),
        };
        let data: ListResponse = self
            .call(Method::PUT, "/shoppingList/update", None, Some(&body))
            .await?;
        Ok(data.list)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let body = ListIdRequest { id: id.to_string() };
        let _: SuccessResponse = self
            .call(Method::DELETE, "/shoppingList/delete", None, Some(&body))
            .await?;
        Ok(())
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<ShoppingList, ApiError> {
        let body = SetArchivedRequest {
            id: id.to_string(),
            archived,
        };
        let data: ListResponse = self
            .call(Method::PATCH, "/shoppingList/setArchived", None, Some(&body))
            .await?;
        Ok(data.list)
    }

    async fn add_member(
        &self,
        list_id: &str,
        member_id: &str,
        member_name: &str,
    ) -> Result<ShoppingList, ApiError> {
        let body = AddMemberRequest {
            id: list_id.to_string(),
            member_id: member_id.to_string(),
            member_name: Some(member_name.to_string()),
        };
        let data: ListResponse = self
            .call(Method::POST, "/shoppingList/addMember", None, Some(&body))
            .await?;
        Ok(data.list)
    }

    async fn remove_member(&self, list_id: &str, member_id: &str) -> Result<ShoppingList, ApiError> {
        let body = RemoveMemberRequest {
            id: list_id.to_string(),
            member_id: member_id.to_string(),
        };
        let data: ListResponse = self
            .call(Method::DELETE, "/shoppingList/removeMember", None, Some(&body))
            .await?;
        Ok(data.list)
    }

    async fn leave(&self, list_id: &str) -> Result<(), ApiError> {
        let body = ListIdRequest { id: list_id.to_string() };
        let _: SuccessResponse = self
            .call(Method::DELETE, "/shoppingList/leave", None, Some(&body))
            .await?;
        Ok(())
    }

    async fn create_item(&self, list_id: &str, name: &str) -> Result<Item, ApiError> {
        let body = CreateItemRequest {
            list_id: list_id.to_string(),
            name: name.to_string(),
        };
        let data: ItemResponse = self
            .call(Method::POST, "/shoppingListItem/create", None, Some(&body))
            .await?;
        Ok(data.item)
    }

    async fn delete_item(&self, list_id: &str, item_id: &str) -> Result<(), ApiError> {
        let body = DeleteItemRequest {
            list_id: list_id.to_string(),
            item_id: item_id.to_string(),
        };
        let _: SuccessResponse = self
            .call(Method::DELETE, "/shoppingListItem/delete", None, Some(&body))
            .await?;
        Ok(())
    }

    async fn set_item_resolved(
        &self,
        list_id: &str,
        item_id: &str,
        resolved: bool,
    ) -> Result<Item, ApiError> {
        let body = SetItemResolvedRequest {
            list_id: list_id.to_string(),
            item_id: item_id.to_string(),
            resolved,
        };
        let data: ItemResponse = self
            .call(Method::PATCH, "/shoppingListItem/setResolved", None, Some(&body))
            .await?;
        Ok(data.item)
    }
}
