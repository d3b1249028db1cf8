//! Authenticated CRUD endpoints. Every mutation answers with the stored
//! record and a fresh dashboard snapshot. The snapshot is `null` when it
//! could not be re-read; the mutation itself is already committed.

use crate::AppState;
use crate::api::error::AppError;
use crate::models::{Category, CategoryDraft, ContentItem, Dashboard, ItemDraft, SettingKey, SiteSetting};
use crate::services::admin::CategoryDeletion;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EditorQuery {
    /// Existing record to edit; omit for a blank draft
    pub id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CategorySaved {
    pub category: Category,
    pub dashboard: Option<Dashboard>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryDeleted {
    pub deletion: CategoryDeletion,
    pub dashboard: Option<Dashboard>,
}

#[derive(Serialize, ToSchema)]
pub struct ItemSaved {
    pub item: ContentItem,
    pub dashboard: Option<Dashboard>,
}

#[derive(Serialize, ToSchema)]
pub struct ItemDeleted {
    pub id: String,
    pub dashboard: Option<Dashboard>,
}

#[derive(Deserialize, ToSchema)]
pub struct SettingRequest {
    pub value: String,
}

#[derive(Serialize, ToSchema)]
pub struct SettingSaved {
    pub setting: SiteSetting,
    pub dashboard: Option<Dashboard>,
}

async fn refreshed_dashboard(state: &AppState) -> Option<Dashboard> {
    match state.admin.dashboard().await {
        Ok(dashboard) => Some(dashboard),
        Err(e) => {
            error!("❌ Dashboard refresh after commit failed: {}", e);
            None
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Categories, items and settings", body = Dashboard),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(state.admin.dashboard().await?))
}

#[utoipa::path(
    get,
    path = "/admin/categories/editor",
    params(EditorQuery),
    responses(
        (status = 200, description = "Category draft", body = CategoryDraft),
        (status = 404, description = "Category not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn category_editor(
    State(state): State<AppState>,
    Query(query): Query<EditorQuery>,
) -> Result<Json<CategoryDraft>, AppError> {
    Ok(Json(
        state.admin.open_category_editor(query.id.as_deref()).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/admin/categories",
    request_body = CategoryDraft,
    responses(
        (status = 200, description = "Category saved", body = CategorySaved),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Store changed no rows")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn save_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(draft): Json<CategoryDraft>,
) -> Result<Json<CategorySaved>, AppError> {
    let category = state.admin.save_category(draft).await?;
    info!("✏️  {} saved category {}", claims.email, category.slug);

    Ok(Json(CategorySaved {
        category,
        dashboard: refreshed_dashboard(&state).await,
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category and its items deleted", body = CategoryDeleted),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Store refused the delete; nothing changed")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<CategoryDeleted>, AppError> {
    let deletion = state.admin.delete_category(&id).await?;
    info!("✏️  {} deleted category {}", claims.email, deletion.category_slug);

    Ok(Json(CategoryDeleted {
        deletion,
        dashboard: refreshed_dashboard(&state).await,
    }))
}

#[utoipa::path(
    get,
    path = "/admin/items/editor",
    params(EditorQuery),
    responses(
        (status = 200, description = "Item draft", body = ItemDraft),
        (status = 404, description = "Item not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn item_editor(
    State(state): State<AppState>,
    Query(query): Query<EditorQuery>,
) -> Result<Json<ItemDraft>, AppError> {
    Ok(Json(state.admin.open_item_editor(query.id.as_deref()).await?))
}

#[utoipa::path(
    put,
    path = "/admin/items",
    request_body = ItemDraft,
    responses(
        (status = 200, description = "Item saved", body = ItemSaved),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Store changed no rows")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn save_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(draft): Json<ItemDraft>,
) -> Result<Json<ItemSaved>, AppError> {
    let item = state.admin.save_item(draft).await?;
    info!("✏️  {} saved item {}", claims.email, item.id);

    Ok(Json(ItemSaved {
        item,
        dashboard: refreshed_dashboard(&state).await,
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/items/{id}",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted", body = ItemDeleted),
        (status = 409, description = "Store changed no rows")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ItemDeleted>, AppError> {
    state.admin.delete_item(&id).await?;
    info!("✏️  {} deleted item {}", claims.email, id);

    Ok(Json(ItemDeleted {
        dashboard: refreshed_dashboard(&state).await,
        id,
    }))
}

#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    params(
        ("key" = String, Path, description = "Setting key: hero_image or bg_music")
    ),
    request_body = SettingRequest,
    responses(
        (status = 200, description = "Setting saved", body = SettingSaved),
        (status = 400, description = "Unknown setting key")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "admin"
)]
pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<SettingRequest>,
) -> Result<Json<SettingSaved>, AppError> {
    let key: SettingKey = key.parse().map_err(AppError::BadRequest)?;
    let setting = state.admin.upsert_setting(key, payload.value).await?;

    Ok(Json(SettingSaved {
        setting,
        dashboard: refreshed_dashboard(&state).await,
    }))
}
