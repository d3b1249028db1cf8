use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category_slug: String,
    pub title_en: String,
    pub title_km: String,
    #[sea_orm(column_type = "Text")]
    pub summary_en: String,
    #[sea_orm(column_type = "Text")]
    pub summary_km: String,
    #[sea_orm(column_type = "Text")]
    pub content_en: String,
    #[sea_orm(column_type = "Text")]
    pub content_km: String,
    #[sea_orm(column_type = "Json")]
    pub images: ImageList,
    #[sea_orm(column_type = "Text", nullable)]
    pub audio: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub video: Option<String>,
    pub created_at: DateTimeUtc,
    #[sea_orm(column_type = "Json", nullable)]
    pub location_coordinates: Option<Coordinates>,
    #[sea_orm(column_type = "Text", nullable)]
    pub map_image_url: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub photo_spots: Option<PhotoSpots>,
}

/// Ordered image URLs. The first entry is the cover, the rest form the gallery.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageList(pub Vec<String>);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PhotoSpot {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PhotoSpots(pub Vec<PhotoSpot>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
