//! Read access to categories, items and settings.
//!
//! The `get_*` / `list_*` methods never fail: errors are logged and an empty
//! value is returned. The `fetch_*` methods return the error so callers can
//! tell an outage apart from "no content".

use crate::api::error::AppError;
use crate::entities::{categories, content_items, prelude::*};
use crate::models::{Category, ContentItem, Coordinates, PhotoSpot};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::BTreeMap;
use tracing::error;

#[derive(Clone)]
pub struct ContentService {
    db: DatabaseConnection,
    demo_map_backfill: bool,
}

impl ContentService {
    pub fn new(db: DatabaseConnection, demo_map_backfill: bool) -> Self {
        Self {
            db,
            demo_map_backfill,
        }
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, AppError> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Slug)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Categories sorted by `order`; empty on failure.
    pub async fn list_categories(&self) -> Vec<Category> {
        self.fetch_categories().await.unwrap_or_else(|e| {
            error!("❌ Failed to fetch categories: {}", e);
            Vec::new()
        })
    }

    pub async fn fetch_category_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        let row = Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(row.map(Category::from))
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Option<Category> {
        self.fetch_category_by_slug(slug).await.unwrap_or_else(|e| {
            error!("❌ Failed to fetch category {}: {}", slug, e);
            None
        })
    }

    pub async fn fetch_items_by_category(&self, slug: &str) -> Result<Vec<ContentItem>, AppError> {
        let rows = ContentItems::find()
            .filter(content_items::Column::CategorySlug.eq(slug))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ContentItem::from).collect())
    }

    pub async fn list_items_by_category(&self, slug: &str) -> Vec<ContentItem> {
        self.fetch_items_by_category(slug).await.unwrap_or_else(|e| {
            error!("❌ Failed to fetch items for {}: {}", slug, e);
            Vec::new()
        })
    }

    pub async fn fetch_item_detail(&self, id: &str) -> Result<Option<ContentItem>, AppError> {
        let row = ContentItems::find_by_id(id.to_string())
            .one(&self.db)
            .await?;

        Ok(row.map(|model| {
            let mut item = ContentItem::from(model);
            if self.demo_map_backfill {
                demo_backfill(&mut item);
            }
            item
        }))
    }

    pub async fn get_item_detail(&self, id: &str) -> Option<ContentItem> {
        self.fetch_item_detail(id).await.unwrap_or_else(|e| {
            error!("❌ Failed to fetch item {}: {}", id, e);
            None
        })
    }

    pub async fn fetch_site_settings(&self) -> Result<BTreeMap<String, String>, AppError> {
        let rows = SiteSettings::find().all(&self.db).await?;
        Ok(rows.into_iter().map(|s| (s.key, s.value)).collect())
    }

    /// Settings as `key -> value`; empty on failure.
    pub async fn get_site_settings(&self) -> BTreeMap<String, String> {
        self.fetch_site_settings().await.unwrap_or_else(|e| {
            error!("❌ Failed to fetch site settings: {}", e);
            BTreeMap::new()
        })
    }
}

const DEMO_COORDINATES: Coordinates = Coordinates {
    lat: 13.4125,
    lng: 103.8670,
};

const DEMO_MAP_IMAGE: &str = "https://media.gettyimages.com/id/165516082/vector/angkor-wat-plan.jpg";

/// Fills absent map fields with Angkor Wat sample data.
///
/// Only active when `DEMO_MAP_BACKFILL` is set; never enable it for real content.
pub fn demo_backfill(item: &mut ContentItem) {
    if item.location_coordinates.is_none() {
        item.location_coordinates = Some(DEMO_COORDINATES);
    }
    if item.map_image_url.is_none() {
        item.map_image_url = Some(DEMO_MAP_IMAGE.to_string());
    }
    if item.photo_spots.is_none() {
        item.photo_spots = Some(vec![
            PhotoSpot {
                title: "Reflection Pond at Sunrise".to_string(),
                description: "Capture the five towers reflected in the northern lily pond. Best visited between 5:30 AM and 6:00 AM.".to_string(),
                image_url: "https://submit.shutterstock.com/700/1039860268.jpg".to_string(),
            },
            PhotoSpot {
                title: "The Eastern Gallery".to_string(),
                description: "Deep bas-reliefs look spectacular when the morning sun strikes them at a low angle.".to_string(),
                image_url: "https://media.istockphoto.com/id/507005072/photo/bas-reliefs-in-angkor-wat-cambodia.jpg".to_string(),
            },
            PhotoSpot {
                title: "Upper Level View".to_string(),
                description: "A commanding view of the causeway and the surrounding jungle from the Akanistha level.".to_string(),
                image_url: "https://thumbs.dreamstime.com/b/view-angkor-wat-temple-top-level-siem-reap-cambodia-119154743.jpg".to_string(),
            },
        ]);
    }
}
