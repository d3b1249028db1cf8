use crate::entities::{categories, content_items, site_settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

pub use crate::entities::content_items::{Coordinates, PhotoSpot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub title_en: String,
    pub title_km: String,
    pub description_en: String,
    pub description_km: String,
    pub cover_image: String,
    pub order: i32,
    pub has_map_feature: bool,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            title_en: model.title_en,
            title_km: model.title_km,
            description_en: model.description_en,
            description_km: model.description_km,
            cover_image: model.cover_image,
            order: model.sort_order,
            has_map_feature: model.has_map_feature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentItem {
    pub id: String,
    pub category_slug: String,
    pub title_en: String,
    pub title_km: String,
    pub summary_en: String,
    pub summary_km: String,
    pub content_en: String,
    pub content_km: String,
    pub images: Vec<String>,
    pub audio: Option<String>,
    pub video: Option<String>,
    pub created_at: DateTime<Utc>,
    pub location_coordinates: Option<Coordinates>,
    pub map_image_url: Option<String>,
    pub photo_spots: Option<Vec<PhotoSpot>>,
}

impl ContentItem {
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn gallery(&self) -> &[String] {
        self.images.get(1..).unwrap_or_default()
    }
}

impl From<content_items::Model> for ContentItem {
    fn from(model: content_items::Model) -> Self {
        Self {
            id: model.id,
            category_slug: model.category_slug,
            title_en: model.title_en,
            title_km: model.title_km,
            summary_en: model.summary_en,
            summary_km: model.summary_km,
            content_en: model.content_en,
            content_km: model.content_km,
            images: model.images.0,
            audio: model.audio,
            video: model.video,
            created_at: model.created_at,
            location_coordinates: model.location_coordinates,
            map_image_url: model.map_image_url,
            photo_spots: model.photo_spots.map(|spots| spots.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
    pub label: String,
}

impl From<site_settings::Model> for SiteSetting {
    fn from(model: site_settings::Model) -> Self {
        Self {
            key: model.key,
            value: model.value,
            label: model.label,
        }
    }
}

/// Keys the admin panel is allowed to write into `site_settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SettingKey {
    #[serde(rename = "hero_image")]
    HeroImage,
    #[serde(rename = "bg_music")]
    BackgroundMusic,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::HeroImage, SettingKey::BackgroundMusic];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::HeroImage => "hero_image",
            SettingKey::BackgroundMusic => "bg_music",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("Unknown setting key: {}", s))
    }
}

/// Typed view over the raw `key -> value` settings map.
///
/// Empty values are treated the same as missing ones, so a cleared
/// hero image falls back to the default just like an unset one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSettings {
    values: BTreeMap<String, String>,
}

impl GlobalSettings {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.values
            .get(key.as_str())
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn hero_image(&self) -> Option<&str> {
        self.get(SettingKey::HeroImage)
    }

    pub fn background_music(&self) -> Option<&str> {
        self.get(SettingKey::BackgroundMusic)
    }
}

impl From<BTreeMap<String, String>> for GlobalSettings {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self::new(values)
    }
}

const CATEGORY_REQUIRED: &str = "Slug, English Title, and Khmer Title are required.";
const ITEM_REQUIRED: &str = "Category, English Title, and Khmer Title are required.";

/// Editable copy of a category. Nothing is persisted until it is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CategoryDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "English title is required"))]
    pub title_en: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Khmer title is required"))]
    pub title_km: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_km: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub has_map_feature: bool,
}

impl CategoryDraft {
    /// Blank template placed after the existing categories.
    pub fn blank(existing: usize) -> Self {
        Self {
            order: existing as i32 + 1,
            ..Default::default()
        }
    }

    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|_| CATEGORY_REQUIRED.to_string())
    }
}

impl From<Category> for CategoryDraft {
    fn from(category: Category) -> Self {
        Self {
            id: Some(category.id),
            slug: category.slug,
            title_en: category.title_en,
            title_km: category.title_km,
            description_en: category.description_en,
            description_km: category.description_km,
            cover_image: category.cover_image,
            order: category.order,
            has_map_feature: category.has_map_feature,
        }
    }
}

/// Editable copy of a content item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ItemDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_slug: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "English title is required"))]
    pub title_en: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Khmer title is required"))]
    pub title_km: String,
    #[serde(default)]
    pub summary_en: String,
    #[serde(default)]
    pub summary_km: String,
    #[serde(default)]
    pub content_en: String,
    #[serde(default)]
    pub content_km: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub location_coordinates: Option<Coordinates>,
    #[serde(default)]
    pub map_image_url: Option<String>,
    #[serde(default)]
    pub photo_spots: Option<Vec<PhotoSpot>>,
}

impl ItemDraft {
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|_| ITEM_REQUIRED.to_string())
    }
}

impl From<ContentItem> for ItemDraft {
    fn from(item: ContentItem) -> Self {
        Self {
            id: Some(item.id),
            category_slug: item.category_slug,
            title_en: item.title_en,
            title_km: item.title_km,
            summary_en: item.summary_en,
            summary_km: item.summary_km,
            content_en: item.content_en,
            content_km: item.content_km,
            images: item.images,
            audio: item.audio,
            video: item.video,
            location_coordinates: item.location_coordinates,
            map_image_url: item.map_image_url,
            photo_spots: item.photo_spots,
        }
    }
}

/// Everything the admin dashboard shows, re-fetched after each mutation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub categories: Vec<Category>,
    pub items: Vec<ContentItem>,
    pub settings: Vec<SiteSetting>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_key_round_trips_through_its_name() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), key);
        }
        assert!("hero-image".parse::<SettingKey>().is_err());
    }

    #[test]
    fn global_settings_ignore_blank_values() {
        let mut map = BTreeMap::new();
        map.insert("hero_image".to_string(), "  ".to_string());
        map.insert("bg_music".to_string(), "https://cdn/track.mp3".to_string());
        let settings = GlobalSettings::new(map);

        assert_eq!(settings.hero_image(), None);
        assert_eq!(settings.background_music(), Some("https://cdn/track.mp3"));
    }

    #[test]
    fn category_draft_requires_slug_and_both_titles() {
        let mut draft = CategoryDraft::blank(3);
        assert_eq!(draft.order, 4);
        assert!(draft.check().is_err());

        draft.slug = "temples".to_string();
        draft.title_en = "Temples".to_string();
        assert!(draft.check().is_err());

        draft.title_km = "ប្រាសាទ".to_string();
        assert!(draft.check().is_ok());
    }

    #[test]
    fn item_draft_deserializes_with_defaults() {
        let draft: ItemDraft =
            serde_json::from_str(r#"{"category_slug":"temples","title_en":"X","title_km":"Y"}"#)
                .unwrap();
        assert!(draft.images.is_empty());
        assert!(draft.id.is_none());
        assert!(draft.check().is_ok());
    }

    #[test]
    fn cover_and_gallery_split_images() {
        let item = ContentItem {
            id: "1".into(),
            category_slug: "temples".into(),
            title_en: "Angkor".into(),
            title_km: "អង្គរ".into(),
            summary_en: String::new(),
            summary_km: String::new(),
            content_en: String::new(),
            content_km: String::new(),
            images: vec!["a".into(), "b".into(), "c".into()],
            audio: None,
            video: None,
            created_at: Utc::now(),
            location_coordinates: None,
            map_image_url: None,
            photo_spots: None,
        };
        assert_eq!(item.cover_image(), Some("a"));
        assert_eq!(item.gallery(), &["b".to_string(), "c".to_string()]);
    }
}
