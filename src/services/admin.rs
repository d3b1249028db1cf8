use crate::api::error::AppError;
use crate::entities::content_items::{ImageList, PhotoSpots};
use crate::entities::{categories, content_items, prelude::*, site_settings};
use crate::models::{
    Category, CategoryDraft, ContentItem, Dashboard, ItemDraft, SettingKey, SiteSetting,
};
use crate::services::events::{ContentKind, EventBus, SiteEvent};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryDeletion {
    pub category_id: String,
    pub category_slug: String,
    pub items_deleted: u64,
}

/// Create, update and delete for categories, items and settings.
///
/// Every write checks the affected-row count; a write that touches nothing is
/// reported as [`AppError::PolicyRejected`] rather than treated as success.
pub struct AdminService {
    db: DatabaseConnection,
    events: Arc<EventBus>,
}

impl AdminService {
    pub fn new(db: DatabaseConnection, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    /// Full resync: categories by order, newest items first, settings by key.
    pub async fn dashboard(&self) -> Result<Dashboard, AppError> {
        let categories = Categories::find()
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Slug)
            .all(&self.db)
            .await
            .map_err(AppError::backend)?;

        let items = ContentItems::find()
            .order_by_desc(content_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::backend)?;

        let settings = SiteSettings::find()
            .order_by_asc(site_settings::Column::Key)
            .all(&self.db)
            .await
            .map_err(AppError::backend)?;

        Ok(Dashboard {
            categories: categories.into_iter().map(Category::from).collect(),
            items: items.into_iter().map(ContentItem::from).collect(),
            settings: settings.into_iter().map(SiteSetting::from).collect(),
        })
    }

    pub async fn open_category_editor(&self, id: Option<&str>) -> Result<CategoryDraft, AppError> {
        match id {
            Some(id) => {
                let category = Categories::find_by_id(id.to_string())
                    .one(&self.db)
                    .await
                    .map_err(AppError::backend)?
                    .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
                Ok(CategoryDraft::from(Category::from(category)))
            }
            None => {
                let existing = Categories::find()
                    .count(&self.db)
                    .await
                    .map_err(AppError::backend)?;
                Ok(CategoryDraft::blank(existing as usize))
            }
        }
    }

    pub async fn open_item_editor(&self, id: Option<&str>) -> Result<ItemDraft, AppError> {
        match id {
            Some(id) => {
                let item = ContentItems::find_by_id(id.to_string())
                    .one(&self.db)
                    .await
                    .map_err(AppError::backend)?
                    .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
                Ok(ItemDraft::from(ContentItem::from(item)))
            }
            None => Ok(ItemDraft::default()),
        }
    }

    pub async fn save_category(&self, draft: CategoryDraft) -> Result<Category, AppError> {
        draft.check().map_err(AppError::BadRequest)?;

        let existing = match draft.id.as_deref() {
            Some(id) => Categories::find_by_id(id.to_string())
                .one(&self.db)
                .await
                .map_err(AppError::backend)?,
            None => None,
        };

        let saved = match existing {
            Some(existing) => {
                if existing.slug != draft.slug {
                    return Err(AppError::BadRequest(
                        "Category slug cannot be changed after creation.".to_string(),
                    ));
                }

                let changes = categories::ActiveModel {
                    title_en: Set(draft.title_en.clone()),
                    title_km: Set(draft.title_km.clone()),
                    description_en: Set(draft.description_en.clone()),
                    description_km: Set(draft.description_km.clone()),
                    cover_image: Set(draft.cover_image.clone()),
                    sort_order: Set(draft.order),
                    has_map_feature: Set(draft.has_map_feature),
                    ..Default::default()
                };

                let res = Categories::update_many()
                    .set(changes)
                    .filter(categories::Column::Id.eq(existing.id.clone()))
                    .exec(&self.db)
                    .await
                    .map_err(AppError::backend)?;

                if res.rows_affected == 0 {
                    return Err(AppError::PolicyRejected(
                        "Category was not saved (0 rows affected). The store refused the update."
                            .to_string(),
                    ));
                }

                categories::Model {
                    id: existing.id,
                    slug: existing.slug,
                    title_en: draft.title_en,
                    title_km: draft.title_km,
                    description_en: draft.description_en,
                    description_km: draft.description_km,
                    cover_image: draft.cover_image,
                    sort_order: draft.order,
                    has_map_feature: draft.has_map_feature,
                }
            }
            None => {
                let model = categories::ActiveModel {
                    id: Set(draft.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
                    slug: Set(draft.slug),
                    title_en: Set(draft.title_en),
                    title_km: Set(draft.title_km),
                    description_en: Set(draft.description_en),
                    description_km: Set(draft.description_km),
                    cover_image: Set(draft.cover_image),
                    sort_order: Set(draft.order),
                    has_map_feature: Set(draft.has_map_feature),
                };
                model.insert(&self.db).await.map_err(AppError::backend)?
            }
        };

        info!("📝 Saved category '{}' ({})", saved.slug, saved.id);
        self.events.publish(SiteEvent::ContentChanged {
            kind: ContentKind::Category,
            id: saved.id.clone(),
            deleted: false,
        });

        Ok(Category::from(saved))
    }

    /// Deletes a category and every item filed under its slug in one transaction.
    ///
    /// If the category row itself is not removed the item deletions are rolled
    /// back, so both tables are left exactly as they were.
    pub async fn delete_category(&self, id: &str) -> Result<CategoryDeletion, AppError> {
        let txn = self.db.begin().await.map_err(AppError::backend)?;

        let category = Categories::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(AppError::backend)?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        info!("🗑️  Deleting items for category slug: {}", category.slug);
        let items = ContentItems::delete_many()
            .filter(content_items::Column::CategorySlug.eq(category.slug.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Backend(format!("Failed to delete items: {}", e)))?;

        let deleted = Categories::delete_many()
            .filter(categories::Column::Id.eq(category.id.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Backend(format!("Failed to delete category: {}", e)))?;

        if deleted.rows_affected == 0 {
            txn.rollback().await.map_err(AppError::backend)?;
            warn!(
                "⚠️  Category {} delete affected 0 rows; item deletions rolled back",
                category.id
            );
            return Err(AppError::PolicyRejected(
                "0 categories were deleted. The store is blocking deletion for this account; no items were removed."
                    .to_string(),
            ));
        }

        txn.commit().await.map_err(AppError::backend)?;

        info!(
            "✅ Deleted category '{}' and {} item(s)",
            category.slug, items.rows_affected
        );
        self.events.publish(SiteEvent::ContentChanged {
            kind: ContentKind::Category,
            id: category.id.clone(),
            deleted: true,
        });

        Ok(CategoryDeletion {
            category_id: category.id,
            category_slug: category.slug,
            items_deleted: items.rows_affected,
        })
    }

    pub async fn save_item(&self, draft: ItemDraft) -> Result<ContentItem, AppError> {
        draft.check().map_err(AppError::BadRequest)?;

        let existing = match draft.id.as_deref() {
            Some(id) => ContentItems::find_by_id(id.to_string())
                .one(&self.db)
                .await
                .map_err(AppError::backend)?,
            None => None,
        };

        let audio = non_empty(draft.audio);
        let video = non_empty(draft.video);
        let map_image_url = non_empty(draft.map_image_url);
        let photo_spots = draft.photo_spots.map(PhotoSpots);

        let saved = match existing {
            Some(existing) => {
                let changes = content_items::ActiveModel {
                    category_slug: Set(draft.category_slug.clone()),
                    title_en: Set(draft.title_en.clone()),
                    title_km: Set(draft.title_km.clone()),
                    summary_en: Set(draft.summary_en.clone()),
                    summary_km: Set(draft.summary_km.clone()),
                    content_en: Set(draft.content_en.clone()),
                    content_km: Set(draft.content_km.clone()),
                    images: Set(ImageList(draft.images.clone())),
                    audio: Set(audio.clone()),
                    video: Set(video.clone()),
                    location_coordinates: Set(draft.location_coordinates),
                    map_image_url: Set(map_image_url.clone()),
                    photo_spots: Set(photo_spots.clone()),
                    ..Default::default()
                };

                let res = ContentItems::update_many()
                    .set(changes)
                    .filter(content_items::Column::Id.eq(existing.id.clone()))
                    .exec(&self.db)
                    .await
                    .map_err(AppError::backend)?;

                if res.rows_affected == 0 {
                    return Err(AppError::PolicyRejected(
                        "Item was not saved (0 rows affected). The store refused the update."
                            .to_string(),
                    ));
                }

                content_items::Model {
                    id: existing.id,
                    category_slug: draft.category_slug,
                    title_en: draft.title_en,
                    title_km: draft.title_km,
                    summary_en: draft.summary_en,
                    summary_km: draft.summary_km,
                    content_en: draft.content_en,
                    content_km: draft.content_km,
                    images: ImageList(draft.images),
                    audio,
                    video,
                    created_at: existing.created_at,
                    location_coordinates: draft.location_coordinates,
                    map_image_url,
                    photo_spots,
                }
            }
            None => {
                let model = content_items::ActiveModel {
                    id: Set(draft.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
                    category_slug: Set(draft.category_slug),
                    title_en: Set(draft.title_en),
                    title_km: Set(draft.title_km),
                    summary_en: Set(draft.summary_en),
                    summary_km: Set(draft.summary_km),
                    content_en: Set(draft.content_en),
                    content_km: Set(draft.content_km),
                    images: Set(ImageList(draft.images)),
                    audio: Set(audio),
                    video: Set(video),
                    created_at: Set(Utc::now()),
                    location_coordinates: Set(draft.location_coordinates),
                    map_image_url: Set(map_image_url),
                    photo_spots: Set(photo_spots),
                };
                model.insert(&self.db).await.map_err(AppError::backend)?
            }
        };

        info!("📝 Saved item '{}' ({})", saved.title_en, saved.id);
        self.events.publish(SiteEvent::ContentChanged {
            kind: ContentKind::Item,
            id: saved.id.clone(),
            deleted: false,
        });

        Ok(ContentItem::from(saved))
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), AppError> {
        let res = ContentItems::delete_many()
            .filter(content_items::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::backend)?;

        if res.rows_affected == 0 {
            return Err(AppError::PolicyRejected(
                "Item was not deleted (0 rows affected). The store is blocking the delete for this account."
                    .to_string(),
            ));
        }

        info!("🗑️  Deleted item {}", id);
        self.events.publish(SiteEvent::ContentChanged {
            kind: ContentKind::Item,
            id: id.to_string(),
            deleted: true,
        });
        Ok(())
    }

    /// Inserts the setting if absent, otherwise replaces its value.
    pub async fn upsert_setting(&self, key: SettingKey, value: String) -> Result<SiteSetting, AppError> {
        let now = Utc::now();
        let existing = SiteSettings::find_by_id(key.as_str().to_string())
            .one(&self.db)
            .await
            .map_err(AppError::backend)?;

        let saved = match existing {
            Some(existing) => {
                let res = SiteSettings::update_many()
                    .set(site_settings::ActiveModel {
                        value: Set(value.clone()),
                        updated_at: Set(now),
                        ..Default::default()
                    })
                    .filter(site_settings::Column::Key.eq(key.as_str()))
                    .exec(&self.db)
                    .await
                    .map_err(AppError::backend)?;

                if res.rows_affected == 0 {
                    return Err(AppError::PolicyRejected(format!(
                        "Setting '{}' was not saved (0 rows affected).",
                        key
                    )));
                }

                SiteSetting {
                    key: existing.key,
                    value,
                    label: existing.label,
                }
            }
            None => {
                let model = site_settings::ActiveModel {
                    key: Set(key.as_str().to_string()),
                    value: Set(value),
                    label: Set(key.as_str().to_string()),
                    updated_at: Set(now),
                };
                SiteSetting::from(model.insert(&self.db).await.map_err(AppError::backend)?)
            }
        };

        info!("⚙️  Setting '{}' updated", key);
        self.events.publish(SiteEvent::SettingsChanged { key });
        Ok(saved)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
