//! Click event entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "click_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// visitors.session_id（不做外键约束）
    pub visitor_id: String,
    pub element_id: String,
    #[sea_orm(column_type = "Text")]
    pub element_class: String,
    #[sea_orm(column_type = "Text")]
    pub element_text: String,
    #[sea_orm(column_type = "Text")]
    pub page_url: String,
    pub x_position: i32,
    pub y_position: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
