use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: String,
    pub status: i16, // see models::schedule::ScheduleStatus
    pub semester: i16,
    pub year: i16,
    pub class: String,
    pub created_by: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::grade_parameter::Entity")]
    GradeParameters,
    #[sea_orm(has_many = "super::schedule_user::Entity")]
    Roster,
    #[sea_orm(has_many = "super::meeting::Entity")]
    Meetings,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::grade_parameter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeParameters.def()
    }
}

impl Related<super::schedule_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roster.def()
    }
}

impl Related<super::meeting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
