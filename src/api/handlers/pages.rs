use crate::AppState;
use crate::api::error::AppError;
use crate::services::site::{CategoryPage, HomePage, ItemPage};
use axum::{
    Json,
    extract::{Path, State},
};

#[utoipa::path(
    get,
    path = "/api/pages/home",
    responses(
        (status = 200, description = "Home page view model", body = HomePage)
    ),
    tag = "pages"
)]
pub async fn home(State(state): State<AppState>) -> Json<HomePage> {
    Json(state.site.home().await)
}

#[utoipa::path(
    get,
    path = "/api/pages/category/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category timeline", body = CategoryPage),
        (status = 404, description = "Category not found"),
        (status = 503, description = "Content store unreachable")
    ),
    tag = "pages"
)]
pub async fn category_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryPage>, AppError> {
    Ok(Json(state.site.category(&slug).await?))
}

#[utoipa::path(
    get,
    path = "/api/pages/item/{id}",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item detail", body = ItemPage),
        (status = 404, description = "Item not found"),
        (status = 503, description = "Content store unreachable")
    ),
    tag = "pages"
)]
pub async fn item_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemPage>, AppError> {
    Ok(Json(state.site.item(&id).await?))
}
