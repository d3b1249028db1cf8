//! Raw read endpoints over the content tables.

use crate::AppState;
use crate::api::error::AppError;
use crate::models::{Category, ContentItem};
use axum::{
    Json,
    extract::{Path, State},
};
use std::collections::BTreeMap;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories sorted by order", body = Vec<Category>)
    ),
    tag = "content"
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.content.list_categories().await)
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    ),
    tag = "content"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, AppError> {
    state
        .content
        .get_category_by_slug(&slug)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/items",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Items filed under the category", body = Vec<ContentItem>)
    ),
    tag = "content"
)]
pub async fn list_category_items(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Json<Vec<ContentItem>> {
    Json(state.content.list_items_by_category(&slug).await)
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item", body = ContentItem),
        (status = 404, description = "Item not found")
    ),
    tag = "content"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContentItem>, AppError> {
    state
        .content
        .get_item_detail(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Global settings as a key/value object")
    ),
    tag = "content"
)]
pub async fn get_settings(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.content.get_site_settings().await)
}
