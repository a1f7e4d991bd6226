use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use shared::store::LIST_NAME_REQUIRED;
use shared::{
    AddMemberRequest, ApiError, CreateItemRequest, CreateListRequest, DeleteItemRequest,
    ErrorResponse, GetListQuery, ItemResponse, ListIdRequest, ListResponse, ListsResponse,
    RemoveMemberRequest, SetArchivedRequest, SetItemResolvedRequest, SuccessResponse,
    UpdateListRequest, USER_ID_HEADER,
};
use tracing::{info, warn};

use crate::AppState;

pub const MISSING_USER_HEADER: &str = "Missing x-user-id header";

/// Handler outcome: a JSON body with its status, or an error body
pub type RestResult<T> = Result<(StatusCode, Json<T>), RestError>;

/// Failure answered with the `uuAppErrorMap` body and the matching status
#[derive(Debug)]
pub struct RestError(ApiError);

impl From<ApiError> for RestError {
    fn from(error: ApiError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for RestError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ApiError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for RestError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ApiError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let error = self.0;
        warn!("Request failed: {} ({})", error, error.code());
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from_error(&error))).into_response()
    }
}

/// JSON body whose decoding failures are answered like any other error
#[derive(FromRequest)]
#[from_request(via(Json), rejection(RestError))]
pub struct ApiJson<T>(pub T);

/// Query string whose decoding failures are answered like any other error
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(RestError))]
pub struct ApiQuery<T>(pub T);

/// ID of the calling user, taken from the user header
fn caller_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(MISSING_USER_HEADER.to_string()))
}

/// Axum handler function for GET /shoppingList/list
pub async fn list_shopping_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> RestResult<ListsResponse> {
    let user_id = caller_id(&headers)?;
    info!("GET /shoppingList/list - user: {}", user_id);

    let lists = state.store.lock().await.list_for_user(&user_id);
    Ok((StatusCode::OK, Json(ListsResponse { lists })))
}

/// Axum handler function for GET /shoppingList/get?id=
pub async fn get_shopping_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<GetListQuery>,
) -> RestResult<ListResponse> {
    let user_id = caller_id(&headers)?;
    info!("GET /shoppingList/get - id: {}, user: {}", query.id, user_id);

    let list = state
        .store
        .lock()
        .await
        .get(&query.id, &user_id)?;
    Ok((StatusCode::OK, Json(ListResponse { list })))
}

/// Axum handler function for POST /shoppingList/create
pub async fn create_shopping_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateListRequest>,
) -> RestResult<ListResponse> {
    let user_id = caller_id(&headers)?;
    info!("POST /shoppingList/create - name: {}, user: {}", request.name, user_id);

    let mut store = state.store.lock().await;
    let owner_name = store.user_name(&user_id).unwrap_or(&user_id).to_string();
    let list = store.create(&request.name, &user_id, &owner_name)?;
    Ok((StatusCode::CREATED, Json(ListResponse { list })))
}

/// Axum handler function for PUT /shoppingList/update
pub async fn update_shopping_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<UpdateListRequest>,
) -> RestResult<ListResponse> {
    let user_id = caller_id(&headers)?;
    info!("PUT /shoppingList/update - id: {}, user: {}", request.id, user_id);

    if request.name.trim().is_empty() {
        return Err(ApiError::Validation(LIST_NAME_REQUIRED.to_string()).into());
    }

    let list = state
        .store
        .lock()
        .await
        .update_name(&request.id, &request.name)?;
    Ok((StatusCode::OK, Json(ListResponse { list })))
}

/// Axum handler function for DELETE /shoppingList/delete
pub async fn delete_shopping_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<ListIdRequest>,
) -> RestResult<SuccessResponse> {
    let user_id = caller_id(&headers)?;
    info!("DELETE /shoppingList/delete - id: {}, user: {}", request.id, user_id);

    state
        .store
        .lock()
        .await
        .delete(&request.id)?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

/// Axum handler function for PATCH /shoppingList/setArchived
pub async fn set_archived(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<SetArchivedRequest>,
) -> RestResult<ListResponse> {
    let user_id = caller_id(&headers)?;
    info!(
        "PATCH /shoppingList/setArchived - id: {}, archived: {}, user: {}",
        request.id, request.archived, user_id
    );

    let list = state
        .store
        .lock()
        .await
        .set_archived(&request.id, request.archived)?;
    Ok((StatusCode::OK, Json(ListResponse { list })))
}

/// Axum handler function for POST /shoppingList/addMember
///
/// Without a `memberName` the name comes from the user directory, or the
/// member ID when the user is unknown.
pub async fn add_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AddMemberRequest>,
) -> RestResult<ListResponse> {
    let user_id = caller_id(&headers)?;
    info!(
        "POST /shoppingList/addMember - id: {}, member: {}, user: {}",
        request.id, request.member_id, user_id
    );

    let mut store = state.store.lock().await;
    let member_name = match request.member_name {
        Some(name) => name,
        None => store
            .user_name(&request.member_id)
            .unwrap_or(&request.member_id)
            .to_string(),
    };
    let list = store.add_member(&request.id, &request.member_id, &member_name)?;
    Ok((StatusCode::OK, Json(ListResponse { list })))
}

/// Axum handler function for DELETE /shoppingList/removeMember
pub async fn remove_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RemoveMemberRequest>,
) -> RestResult<ListResponse> {
    let user_id = caller_id(&headers)?;
    info!(
        "DELETE /shoppingList/removeMember - id: {}, member: {}, user: {}",
        request.id, request.member_id, user_id
    );

    let list = state
        .store
        .lock()
        .await
        .remove_member(&request.id, &request.member_id)?;
    Ok((StatusCode::OK, Json(ListResponse { list })))
}

/// Axum handler function for DELETE /shoppingList/leave
pub async fn leave_shopping_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<ListIdRequest>,
) -> RestResult<SuccessResponse> {
    let user_id = caller_id(&headers)?;
    info!("DELETE /shoppingList/leave - id: {}, user: {}", request.id, user_id);

    state
        .store
        .lock()
        .await
        .leave(&request.id, &user_id)?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

/// Axum handler function for POST /shoppingListItem/create
pub async fn create_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> RestResult<ItemResponse> {
    let user_id = caller_id(&headers)?;
    info!(
        "POST /shoppingListItem/create - list: {}, name: {}, user: {}",
        request.list_id, request.name, user_id
    );

    let item = state
        .store
        .lock()
        .await
        .create_item(&request.list_id, &request.name)?;
    Ok((StatusCode::CREATED, Json(ItemResponse { item })))
}

/// Axum handler function for DELETE /shoppingListItem/delete
pub async fn delete_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<DeleteItemRequest>,
) -> RestResult<SuccessResponse> {
    let user_id = caller_id(&headers)?;
    info!(
        "DELETE /shoppingListItem/delete - list: {}, item: {}, user: {}",
        request.list_id, request.item_id, user_id
    );

    state
        .store
        .lock()
        .await
        .delete_item(&request.list_id, &request.item_id)?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

/// Axum handler function for PATCH /shoppingListItem/setResolved
pub async fn set_item_resolved(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<SetItemResolvedRequest>,
) -> RestResult<ItemResponse> {
    let user_id = caller_id(&headers)?;
    info!(
        "PATCH /shoppingListItem/setResolved - list: {}, item: {}, resolved: {}, user: {}",
        request.list_id, request.item_id, request.resolved, user_id
    );

    let item = state
        .store
        .lock()
        .await
        .set_item_resolved(&request.list_id, &request.item_id, request.resolved)?;
    Ok((StatusCode::OK, Json(ItemResponse { item })))
}
