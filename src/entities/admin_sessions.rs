use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per issued admin token, keyed by the token's `jti`.
/// Deleting the row revokes the token.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin_users::Entity",
        from = "Column::UserId",
        to = "super::admin_users::Column::Id",
        on_delete = "Cascade"
    )]
    AdminUsers,
}

impl Related<super::admin_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
