//! Integration record entity: one row per connected Telegram user.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub telegram_id: i64,
    pub access_token: String,
    pub workspace_id: String,
    pub workspace_name: String,
    pub bot_id: String,
    pub database_id: String,
    pub user_name: String,
    /// Unix millis, set once on first insert.
    pub created_at: i64,
    /// Unix millis, refreshed on every upsert.
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
