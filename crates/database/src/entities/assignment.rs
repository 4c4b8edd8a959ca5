use models::assignment::{Assignment, AssignmentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub grade_parameter_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: i16, // see models::assignment::AssignmentStatus
    pub due_date: DateTime,
    pub max_uploads: i16,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grade_parameter::Entity",
        from = "Column::GradeParameterId",
        to = "super::grade_parameter::Column::Id"
    )]
    GradeParameter,
    #[sea_orm(has_many = "super::user_assignment::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::assignment_file_type::Entity")]
    FileTypes,
}

impl Related<super::grade_parameter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeParameter.def()
    }
}

impl Related<super::user_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::assignment_file_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Assignment {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = AssignmentStatus::from_repr(model.status).ok_or_else(|| {
            DbErr::Type(format!(
                "Unknown status {} on assignment {}",
                model.status, model.id
            ))
        })?;

        Ok(Self {
            id: model.id,
            grade_parameter_id: model.grade_parameter_id,
            name: model.name,
            due_date: model.due_date,
            // A negative limit in storage means nothing may be uploaded
            max_uploads: u16::try_from(model.max_uploads).unwrap_or(0),
            status,
        })
    }
}
