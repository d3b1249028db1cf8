//! View models for the public pages.

use crate::api::error::AppError;
use crate::models::{Category, ContentItem, Coordinates, GlobalSettings, PhotoSpot};
use crate::services::content::ContentService;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

const HOME_CATEGORY_LIMIT: usize = 6;
const FEATURED_CATEGORY: &str = "featured";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomePage {
    pub hero_image: String,
    pub categories: Vec<Category>,
    pub featured: Option<ContentItem>,
    pub background_music: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimelineEntry {
    pub side: Side,
    pub item: ContentItem,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryPage {
    pub category: Category,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapSection {
    pub coordinates: Option<Coordinates>,
    pub map_image_url: Option<String>,
    pub photo_spots: Vec<PhotoSpot>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemPage {
    pub item: ContentItem,
    /// Absent when the item's category no longer exists.
    pub category: Option<Category>,
    pub cover_image: Option<String>,
    pub gallery: Vec<String>,
    pub audio: Option<String>,
    pub map: Option<MapSection>,
}

pub struct SiteService {
    content: Arc<ContentService>,
    default_hero_image: String,
}

impl SiteService {
    pub fn new(content: Arc<ContentService>, default_hero_image: String) -> Self {
        Self {
            content,
            default_hero_image,
        }
    }

    pub async fn home(&self) -> HomePage {
        let (mut categories, settings, featured) = tokio::join!(
            self.content.list_categories(),
            self.content.get_site_settings(),
            self.content.list_items_by_category(FEATURED_CATEGORY),
        );
        categories.truncate(HOME_CATEGORY_LIMIT);
        let settings = GlobalSettings::from(settings);

        HomePage {
            hero_image: settings
                .hero_image()
                .unwrap_or(self.default_hero_image.as_str())
                .to_string(),
            background_music: settings.background_music().map(str::to_string),
            categories,
            featured: featured.into_iter().next(),
        }
    }

    pub async fn category(&self, slug: &str) -> Result<CategoryPage, AppError> {
        let category = self
            .content
            .fetch_category_by_slug(slug)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))?;

        let items = self.content.list_items_by_category(slug).await;

        Ok(CategoryPage {
            category,
            timeline: timeline(items),
        })
    }

    pub async fn item(&self, id: &str) -> Result<ItemPage, AppError> {
        let item = self
            .content
            .fetch_item_detail(id)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        let category = self.content.get_category_by_slug(&item.category_slug).await;
        Ok(item_page(item, category))
    }
}

fn unavailable(e: AppError) -> AppError {
    error!("❌ Content store unreachable: {}", e);
    AppError::ServiceUnavailable("Content is temporarily unavailable".to_string())
}

/// Alternates sides starting on the left.
pub fn timeline(items: Vec<ContentItem>) -> Vec<TimelineEntry> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| TimelineEntry {
            side: if i % 2 == 0 { Side::Left } else { Side::Right },
            item,
        })
        .collect()
}

pub fn item_page(item: ContentItem, category: Option<Category>) -> ItemPage {
    let has_map_feature = category.as_ref().is_some_and(|c| c.has_map_feature);
    let has_map_data = item.location_coordinates.is_some()
        || item.photo_spots.as_ref().is_some_and(|s| !s.is_empty());

    let map = (has_map_feature && has_map_data).then(|| MapSection {
        coordinates: item.location_coordinates,
        map_image_url: item.map_image_url.clone(),
        photo_spots: item.photo_spots.clone().unwrap_or_default(),
    });

    ItemPage {
        cover_image: item.cover_image().map(str::to_string),
        gallery: item.gallery().to_vec(),
        audio: item.audio.clone(),
        map,
        category,
        item,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(images: &[&str]) -> ContentItem {
        ContentItem {
            id: "bayon".into(),
            category_slug: "temples".into(),
            title_en: "Bayon".into(),
            title_km: "បាយ័ន".into(),
            summary_en: String::new(),
            summary_km: String::new(),
            content_en: String::new(),
            content_km: String::new(),
            images: images.iter().map(|s| s.to_string()).collect(),
            audio: None,
            video: None,
            created_at: Utc::now(),
            location_coordinates: None,
            map_image_url: None,
            photo_spots: None,
        }
    }

    fn category(has_map_feature: bool) -> Category {
        Category {
            id: "c1".into(),
            slug: "temples".into(),
            title_en: "Temples".into(),
            title_km: "ប្រាសាទ".into(),
            description_en: String::new(),
            description_km: String::new(),
            cover_image: String::new(),
            order: 1,
            has_map_feature,
        }
    }

    #[test]
    fn timeline_alternates_from_left() {
        let sides: Vec<Side> = timeline(vec![item(&[]), item(&[]), item(&[])])
            .into_iter()
            .map(|e| e.side)
            .collect();
        assert_eq!(sides, vec![Side::Left, Side::Right, Side::Left]);
    }

    #[test]
    fn item_page_splits_cover_and_gallery() {
        let page = item_page(item(&["a", "b", "c"]), None);
        assert_eq!(page.cover_image.as_deref(), Some("a"));
        assert_eq!(page.gallery, vec!["b", "c"]);
        assert!(page.category.is_none());

        let empty = item_page(item(&[]), None);
        assert!(empty.cover_image.is_none());
        assert!(empty.gallery.is_empty());
    }

    #[test]
    fn map_needs_feature_flag_and_data() {
        let mut with_coords = item(&[]);
        with_coords.location_coordinates = Some(Coordinates {
            lat: 13.44,
            lng: 103.86,
        });

        assert!(item_page(with_coords.clone(), Some(category(true))).map.is_some());
        assert!(item_page(with_coords, Some(category(false))).map.is_none());
        assert!(item_page(item(&[]), Some(category(true))).map.is_none());
    }
}
