//! Storage contracts the services are written against.
//!
//! Reads go through [`GradeReader`]. Writes open a transaction through [`Transactional`] and pass
//! the handle to every call, so a service decides where a unit of work starts and ends while the
//! store decides what a transaction is. [`SeaOrmStore`] implements all of them over PostgreSQL.

mod associations;
mod kinds;
mod store;

pub use kinds::{AllowedFileTypes, AssociationKind, Assistants, FileAttachments, GradeParameters};
pub use store::SeaOrmStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use models::{
    assignment::{Assignment, Submission},
    grade_parameter::GradeParameter,
    schedule::{AttendanceCount, ScheduleSummary},
};
use sea_orm::DbErr;
use std::collections::HashMap;

/// Batched reads behind a grade report; one call per data kind
#[async_trait]
pub trait GradeReader: Send + Sync {
    /// Schedules with the given ids, in ascending id order; unknown ids are skipped
    async fn schedules(&self, ids: &[i64]) -> Result<Vec<ScheduleSummary>, DbErr>;

    async fn grade_parameters_by_schedules(
        &self,
        schedule_ids: &[i64],
    ) -> Result<Vec<GradeParameter>, DbErr>;

    async fn assignments_by_grade_parameters(
        &self,
        grade_parameter_ids: &[i64],
    ) -> Result<Vec<Assignment>, DbErr>;

    async fn submissions_by_assignments_and_user(
        &self,
        assignment_ids: &[i64],
        user_id: i64,
    ) -> Result<Vec<Submission>, DbErr>;

    /// Attendance of one student keyed by schedule id, with an entry for every requested schedule
    async fn attendance_counts(
        &self,
        user_id: i64,
        schedule_ids: &[i64],
    ) -> Result<HashMap<i64, AttendanceCount>, DbErr>;

    /// Schedules the user is on the roster of as a student, whatever their status
    async fn enrolled_schedule_ids(&self, user_id: i64) -> Result<Vec<i64>, DbErr>;
}

#[async_trait]
pub trait Transactional: Send + Sync {
    type Txn: Send + Sync;

    async fn begin(&self) -> Result<Self::Txn, DbErr>;
    async fn commit(&self, txn: Self::Txn) -> Result<(), DbErr>;
    async fn rollback(&self, txn: Self::Txn) -> Result<(), DbErr>;
}

/// Persistence of one association kind, always inside a caller-owned transaction
#[async_trait]
pub trait AssociationStore<K: AssociationKind>: Transactional {
    async fn owner_exists(&self, txn: &Self::Txn, owner: &K::Owner) -> Result<bool, DbErr>;

    async fn existing(
        &self,
        txn: &Self::Txn,
        owner: &K::Owner,
    ) -> Result<Vec<(K::Key, K::Payload)>, DbErr>;

    async fn insert(
        &self,
        txn: &Self::Txn,
        owner: &K::Owner,
        key: &K::Key,
        payload: &K::Payload,
    ) -> Result<(), DbErr>;

    async fn update(
        &self,
        txn: &Self::Txn,
        owner: &K::Owner,
        key: &K::Key,
        payload: &K::Payload,
    ) -> Result<(), DbErr>;

    async fn delete(&self, txn: &Self::Txn, owner: &K::Owner, key: &K::Key)
    -> Result<(), DbErr>;

    /// Keys among `keys` that other records still depend on and so must not be deleted
    async fn blocked_deletions(
        &self,
        _txn: &Self::Txn,
        _owner: &K::Owner,
        _keys: &[K::Key],
    ) -> Result<Vec<K::Key>, DbErr> {
        Ok(Vec::new())
    }

    /// Keys among `keys` that cannot be inserted, such as files that no longer exist
    async fn unusable_insertions(
        &self,
        _txn: &Self::Txn,
        _owner: &K::Owner,
        _keys: &[K::Key],
    ) -> Result<Vec<K::Key>, DbErr> {
        Ok(Vec::new())
    }
}

/// An assignment together with the schedule it is graded in
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedAssignment {
    pub assignment: Assignment,
    pub schedule_id: i64,
}

/// Student submission records
#[async_trait]
pub trait SubmissionStore: Transactional {
    async fn assignment(
        &self,
        txn: &Self::Txn,
        assignment_id: i64,
    ) -> Result<Option<ScopedAssignment>, DbErr>;

    async fn is_enrolled_student(
        &self,
        txn: &Self::Txn,
        schedule_id: i64,
        user_id: i64,
    ) -> Result<bool, DbErr>;

    async fn submission(
        &self,
        txn: &Self::Txn,
        assignment_id: i64,
        user_id: i64,
    ) -> Result<Option<Submission>, DbErr>;

    async fn insert_submission(
        &self,
        txn: &Self::Txn,
        assignment_id: i64,
        user_id: i64,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Submission, DbErr>;

    /// Replaces the description and bumps `updated_at`, leaving the score alone
    async fn touch_submission(
        &self,
        txn: &Self::Txn,
        submission_id: i64,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), DbErr>;
}
