use models::grade_parameter::{GradeParameter, GradeParameterType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grade_parameters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub schedule_id: i64,
    #[sea_orm(column_type = "Text")]
    pub grade_type: GradeParameterType, // unique per schedule
    pub percentage: f64,
    pub status_change: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::schedule::Column::Id"
    )]
    Schedule,
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for GradeParameter {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            schedule_id: model.schedule_id,
            grade_type: model.grade_type,
            percentage: model.percentage,
            status_change: model.status_change,
        }
    }
}
