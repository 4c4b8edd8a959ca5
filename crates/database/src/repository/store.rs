use super::{GradeReader, ScopedAssignment, SubmissionStore, Transactional};
use crate::entities::{
    assignment, attendance, course, grade_parameter, meeting, schedule, schedule_user,
    user_assignment,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use models::{
    assignment::{Assignment, Submission},
    grade_parameter::GradeParameter,
    schedule::{AttendanceCount, RosterRole, ScheduleStatus, ScheduleSummary},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait,
};
use std::{collections::HashMap, sync::Arc};

/// The PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &*self.db
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn schedule_summary(
    model: schedule::Model,
    course: Option<course::Model>,
) -> Result<ScheduleSummary, DbErr> {
    let status = ScheduleStatus::from_repr(model.status).ok_or_else(|| {
        DbErr::Type(format!(
            "Unknown status {} on schedule {}",
            model.status, model.id
        ))
    })?;

    Ok(ScheduleSummary {
        id: model.id,
        course_name: course.map(|c| c.name).unwrap_or(model.course_id),
        status,
    })
}

#[async_trait]
impl Transactional for SeaOrmStore {
    type Txn = DatabaseTransaction;

    async fn begin(&self) -> Result<Self::Txn, DbErr> {
        self.db.begin().await
    }

    async fn commit(&self, txn: Self::Txn) -> Result<(), DbErr> {
        txn.commit().await
    }

    async fn rollback(&self, txn: Self::Txn) -> Result<(), DbErr> {
        txn.rollback().await
    }
}

#[async_trait]
impl GradeReader for SeaOrmStore {
    async fn schedules(&self, ids: &[i64]) -> Result<Vec<ScheduleSummary>, DbErr> {
        let rows = schedule::Entity::find()
            .filter(schedule::Column::Id.is_in(ids.to_vec()))
            .find_also_related(course::Entity)
            .order_by_asc(schedule::Column::Id)
            .all(&*self.db)
            .await?;

        rows.into_iter()
            .map(|(model, course)| schedule_summary(model, course))
            .collect()
    }

    async fn grade_parameters_by_schedules(
        &self,
        schedule_ids: &[i64],
    ) -> Result<Vec<GradeParameter>, DbErr> {
        let rows = grade_parameter::Entity::find()
            .filter(grade_parameter::Column::ScheduleId.is_in(schedule_ids.to_vec()))
            .order_by_asc(grade_parameter::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(GradeParameter::from).collect())
    }

    async fn assignments_by_grade_parameters(
        &self,
        grade_parameter_ids: &[i64],
    ) -> Result<Vec<Assignment>, DbErr> {
        let rows = assignment::Entity::find()
            .filter(assignment::Column::GradeParameterId.is_in(grade_parameter_ids.to_vec()))
            .order_by_asc(assignment::Column::Id)
            .all(&*self.db)
            .await?;

        rows.into_iter().map(Assignment::try_from).collect()
    }

    async fn submissions_by_assignments_and_user(
        &self,
        assignment_ids: &[i64],
        user_id: i64,
    ) -> Result<Vec<Submission>, DbErr> {
        let rows = user_assignment::Entity::find()
            .filter(user_assignment::Column::AssignmentId.is_in(assignment_ids.to_vec()))
            .filter(user_assignment::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(Submission::from).collect())
    }

    async fn attendance_counts(
        &self,
        user_id: i64,
        schedule_ids: &[i64],
    ) -> Result<HashMap<i64, AttendanceCount>, DbErr> {
        let held = meeting::Entity::find()
            .select_only()
            .column(meeting::Column::ScheduleId)
            .column_as(meeting::Column::Id.count(), "held")
            .filter(meeting::Column::ScheduleId.is_in(schedule_ids.to_vec()))
            .group_by(meeting::Column::ScheduleId)
            .into_tuple::<(i64, i64)>()
            .all(&*self.db);

        let attended = attendance::Entity::find()
            .select_only()
            .column(meeting::Column::ScheduleId)
            .column_as(attendance::Column::Id.count(), "attended")
            .join(JoinType::InnerJoin, attendance::Relation::Meeting.def())
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(meeting::Column::ScheduleId.is_in(schedule_ids.to_vec()))
            .group_by(meeting::Column::ScheduleId)
            .into_tuple::<(i64, i64)>()
            .all(&*self.db);

        let (held, attended) = futures::try_join!(held, attended)?;
        let held: HashMap<i64, i64> = held.into_iter().collect();
        let attended: HashMap<i64, i64> = attended.into_iter().collect();

        Ok(schedule_ids
            .iter()
            .map(|&schedule_id| {
                let counts = AttendanceCount {
                    schedule_id,
                    meetings_held: held.get(&schedule_id).copied().map(to_u32).unwrap_or(0),
                    meetings_attended: attended
                        .get(&schedule_id)
                        .copied()
                        .map(to_u32)
                        .unwrap_or(0),
                };
                (schedule_id, counts)
            })
            .collect())
    }

    async fn enrolled_schedule_ids(&self, user_id: i64) -> Result<Vec<i64>, DbErr> {
        schedule_user::Entity::find()
            .select_only()
            .column(schedule_user::Column::ScheduleId)
            .filter(schedule_user::Column::UserId.eq(user_id))
            .filter(schedule_user::Column::Role.eq(RosterRole::Student as i16))
            .distinct()
            .order_by_asc(schedule_user::Column::ScheduleId)
            .into_tuple::<i64>()
            .all(&*self.db)
            .await
    }
}

#[async_trait]
impl SubmissionStore for SeaOrmStore {
    async fn assignment(
        &self,
        txn: &Self::Txn,
        assignment_id: i64,
    ) -> Result<Option<ScopedAssignment>, DbErr> {
        let Some((model, parameter)) = assignment::Entity::find_by_id(assignment_id)
            .find_also_related(grade_parameter::Entity)
            .one(txn)
            .await?
        else {
            return Ok(None);
        };

        let parameter = parameter.ok_or_else(|| {
            DbErr::RecordNotFound(format!(
                "Grade parameter {} of assignment {assignment_id}",
                model.grade_parameter_id
            ))
        })?;

        Ok(Some(ScopedAssignment {
            assignment: Assignment::try_from(model)?,
            schedule_id: parameter.schedule_id,
        }))
    }

    async fn is_enrolled_student(
        &self,
        txn: &Self::Txn,
        schedule_id: i64,
        user_id: i64,
    ) -> Result<bool, DbErr> {
        let entries = schedule_user::Entity::find()
            .filter(schedule_user::Column::ScheduleId.eq(schedule_id))
            .filter(schedule_user::Column::UserId.eq(user_id))
            .filter(schedule_user::Column::Role.eq(RosterRole::Student as i16))
            .count(txn)
            .await?;

        Ok(entries > 0)
    }

    async fn submission(
        &self,
        txn: &Self::Txn,
        assignment_id: i64,
        user_id: i64,
    ) -> Result<Option<Submission>, DbErr> {
        let row = user_assignment::Entity::find()
            .filter(user_assignment::Column::AssignmentId.eq(assignment_id))
            .filter(user_assignment::Column::UserId.eq(user_id))
            .one(txn)
            .await?;

        Ok(row.map(Submission::from))
    }

    async fn insert_submission(
        &self,
        txn: &Self::Txn,
        assignment_id: i64,
        user_id: i64,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Submission, DbErr> {
        let model = user_assignment::ActiveModel {
            assignment_id: Set(assignment_id),
            user_id: Set(user_id),
            description: Set(description),
            score: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        debug!("Created submission {} for assignment {assignment_id}", model.id);
        Ok(Submission::from(model))
    }

    async fn touch_submission(
        &self,
        txn: &Self::Txn,
        submission_id: i64,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        user_assignment::ActiveModel {
            id: Set(submission_id),
            description: Set(description),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(txn)
        .await?;

        Ok(())
    }
}
