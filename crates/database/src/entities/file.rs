use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Uploaded file metadata; the bytes live in external storage
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub mime: String,
    pub extension: String,
    pub status: i16, // see models::file::FileStatus
    pub owner_table: Option<String>, // "assignments" or "user_assignments"
    pub owner_id: Option<i64>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
