pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::admin::AdminService;
use crate::services::auth::AuthService;
use crate::services::content::ContentService;
use crate::services::events::EventBus;
use crate::services::media::MediaService;
use crate::services::site::SiteService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::content::list_categories,
        api::handlers::content::get_category,
        api::handlers::content::list_category_items,
        api::handlers::content::get_item,
        api::handlers::content::get_settings,
        api::handlers::pages::home,
        api::handlers::pages::category_page,
        api::handlers::pages::item_page,
        api::handlers::events::stream_events,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::session,
        api::handlers::admin::dashboard,
        api::handlers::admin::category_editor,
        api::handlers::admin::save_category,
        api::handlers::admin::delete_category,
        api::handlers::admin::item_editor,
        api::handlers::admin::save_item,
        api::handlers::admin::delete_item,
        api::handlers::admin::update_setting,
        api::handlers::media::upload_media,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::auth::LoginRequest,
            api::handlers::admin::CategorySaved,
            api::handlers::admin::CategoryDeleted,
            api::handlers::admin::ItemSaved,
            api::handlers::admin::ItemDeleted,
            api::handlers::admin::SettingRequest,
            api::handlers::admin::SettingSaved,
            api::handlers::media::MediaUploadForm,
            models::Category,
            models::ContentItem,
            models::SiteSetting,
            models::SettingKey,
            models::CategoryDraft,
            models::ItemDraft,
            models::Dashboard,
            models::Coordinates,
            models::PhotoSpot,
            services::admin::CategoryDeletion,
            services::auth::Session,
            services::auth::SessionInfo,
            services::media::UploadedMedia,
            services::site::HomePage,
            services::site::CategoryPage,
            services::site::ItemPage,
            services::site::TimelineEntry,
            services::site::Side,
            services::site::MapSection,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "content", description = "Public content reads"),
        (name = "pages", description = "Public page view models"),
        (name = "events", description = "Live site events"),
        (name = "auth", description = "Admin authentication"),
        (name = "admin", description = "Content management")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub config: AppConfig,
    pub events: Arc<EventBus>,
    pub content: Arc<ContentService>,
    pub site: Arc<SiteService>,
    pub admin: Arc<AdminService>,
    pub auth: Arc<AuthService>,
    pub media: Arc<MediaService>,
}

impl AppState {
    /// Wires every service over one connection, one bucket and one event bus.
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let events = Arc::new(EventBus::default());
        let content = Arc::new(ContentService::new(db.clone(), config.demo_map_backfill));

        Self {
            site: Arc::new(SiteService::new(
                content.clone(),
                config.default_hero_image.clone(),
            )),
            admin: Arc::new(AdminService::new(db.clone(), events.clone())),
            auth: Arc::new(AuthService::new(db.clone(), config.clone(), events.clone())),
            media: Arc::new(MediaService::new(storage.clone(), config.max_upload_size)),
            content,
            events,
            db,
            storage,
            config,
        }
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(state: AppState) -> Router {
    use api::handlers::{admin, auth, content, events, health, media, pages};

    let protected = Router::new()
        .route("/admin/logout", post(auth::logout))
        .route("/admin/session", get(auth::session))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/categories/editor", get(admin::category_editor))
        .route("/admin/categories", put(admin::save_category))
        .route("/admin/categories/:id", delete(admin::delete_category))
        .route("/admin/items/editor", get(admin::item_editor))
        .route("/admin/items", put(admin::save_item))
        .route("/admin/items/:id", delete(admin::delete_item))
        .route("/admin/settings/:key", put(admin::update_setting))
        .route("/admin/media", post(media::upload_media))
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .route("/api/categories", get(content::list_categories))
        .route("/api/categories/:slug", get(content::get_category))
        .route("/api/categories/:slug/items", get(content::list_category_items))
        .route("/api/items/:id", get(content::get_item))
        .route("/api/settings", get(content::get_settings))
        .route("/api/pages/home", get(pages::home))
        .route("/api/pages/category/:slug", get(pages::category_page))
        .route("/api/pages/item/:id", get(pages::item_page))
        .route("/api/events", get(events::stream_events))
        .route("/admin/login", post(auth::login))
        .merge(protected)
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer(&state.config))
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size + 10 * 1024 * 1024, // multipart overhead
        ))
        .with_state(state)
}
