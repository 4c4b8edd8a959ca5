use models::assignment::Submission;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's submission, at most one per (assignment, user)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub user_id: i64,
    pub description: Option<String>,
    pub score: Option<f64>, // written by grading only
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Submission {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            assignment_id: model.assignment_id,
            user_id: model.user_id,
            description: model.description,
            score: model.score,
            updated_at: model.updated_at,
        }
    }
}
