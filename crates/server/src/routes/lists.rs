use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use models::{ClaimInput, GiftList, ListPatch, NewItemInput, NewListInput};

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// 创建心愿单
#[utoipa::path(post, path = "/api/lists", tag = "lists",
    request_body = crate::openapi::NewListRequest,
    responses(
        (status = 200, description = "List created", body = crate::openapi::GiftListDoc),
        (status = 400, description = "Missing or invalid field", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorDoc)
    ))]
pub async fn create_list(
    State(state): State<AppState>,
    payload: Result<Json<NewListInput>, JsonRejection>,
) -> Result<Json<GiftList>, JsonApiError> {
    let Json(input) = payload?;
    let list = state.lists.create(input).await?;
    Ok(Json(list))
}

/// 获取指定心愿单
#[utoipa::path(get, path = "/api/lists/{id}", tag = "lists",
    params(("id" = String, Path, description = "List id")),
    responses(
        (status = 200, description = "List found", body = crate::openapi::GiftListDoc),
        (status = 404, description = "Unknown list", body = crate::openapi::ErrorDoc)
    ))]
pub async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GiftList>, JsonApiError> {
    Ok(Json(state.lists.get(&id).await?))
}

/// Merge the supplied fields over the stored list. `items` replaces the whole array.
#[utoipa::path(put, path = "/api/lists/{id}", tag = "lists",
    params(("id" = String, Path, description = "List id")),
    request_body = crate::openapi::ListPatchDoc,
    responses(
        (status = 200, description = "Merged list", body = crate::openapi::GiftListDoc),
        (status = 400, description = "Invalid field", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown list", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Version mismatch", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorDoc)
    ))]
pub async fn update_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ListPatch>, JsonRejection>,
) -> Result<Json<GiftList>, JsonApiError> {
    let Json(patch) = payload?;
    Ok(Json(state.lists.update(&id, patch).await?))
}

#[utoipa::path(post, path = "/api/lists/{id}/items", tag = "items",
    params(("id" = String, Path, description = "List id")),
    request_body = crate::openapi::NewItemRequest,
    responses(
        (status = 200, description = "List with the new item appended", body = crate::openapi::GiftListDoc),
        (status = 400, description = "Missing item name", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown list", body = crate::openapi::ErrorDoc)
    ))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewItemInput>, JsonRejection>,
) -> Result<Json<GiftList>, JsonApiError> {
    let Json(input) = payload?;
    Ok(Json(state.lists.add_item(&id, input).await?))
}

#[utoipa::path(delete, path = "/api/lists/{id}/items/{item_id}", tag = "items",
    params(
        ("id" = String, Path, description = "List id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "List without the item", body = crate::openapi::GiftListDoc),
        (status = 404, description = "Unknown list or item", body = crate::openapi::ErrorDoc)
    ))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<GiftList>, JsonApiError> {
    Ok(Json(state.lists.remove_item(&id, &item_id).await?))
}

#[utoipa::path(post, path = "/api/lists/{id}/items/{item_id}/claim", tag = "items",
    params(
        ("id" = String, Path, description = "List id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    request_body = crate::openapi::ClaimRequest,
    responses(
        (status = 200, description = "Item claimed", body = crate::openapi::GiftListDoc),
        (status = 400, description = "Missing claimer name", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown list or item", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Item already claimed", body = crate::openapi::ErrorDoc)
    ))]
pub async fn claim_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
    payload: Result<Json<ClaimInput>, JsonRejection>,
) -> Result<Json<GiftList>, JsonApiError> {
    let Json(input) = payload?;
    Ok(Json(state.lists.claim_item(&id, &item_id, input).await?))
}

#[utoipa::path(delete, path = "/api/lists/{id}/items/{item_id}/claim", tag = "items",
    params(
        ("id" = String, Path, description = "List id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Claim cleared", body = crate::openapi::GiftListDoc),
        (status = 404, description = "Unknown list or item", body = crate::openapi::ErrorDoc)
    ))]
pub async fn unclaim_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<GiftList>, JsonApiError> {
    Ok(Json(state.lists.unclaim_item(&id, &item_id).await?))
}
