use super::{
    AllowedFileTypes, AssociationStore, Assistants, FileAttachments, GradeParameters, SeaOrmStore,
};
use crate::entities::{
    assignment, assignment_file_type, file, grade_parameter, schedule, schedule_user,
    user_assignment,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use models::{
    file::{Attachment, FileStatus, OwnerTable},
    grade_parameter::{GradeParameterType, GradeWeight},
    schedule::RosterRole,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, sea_query::Expr,
};
use std::collections::HashSet;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

async fn schedule_exists(txn: &DatabaseTransaction, schedule_id: i64) -> Result<bool, DbErr> {
    Ok(schedule::Entity::find_by_id(schedule_id)
        .count(txn)
        .await?
        > 0)
}

#[async_trait]
impl AssociationStore<GradeParameters> for SeaOrmStore {
    async fn owner_exists(&self, txn: &Self::Txn, owner: &i64) -> Result<bool, DbErr> {
        schedule_exists(txn, *owner).await
    }

    async fn existing(
        &self,
        txn: &Self::Txn,
        owner: &i64,
    ) -> Result<Vec<(GradeParameterType, GradeWeight)>, DbErr> {
        let rows = grade_parameter::Entity::find()
            .filter(grade_parameter::Column::ScheduleId.eq(*owner))
            .all(txn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let weight = GradeWeight {
                    percentage: row.percentage,
                    status_change: row.status_change,
                };
                (row.grade_type, weight)
            })
            .collect())
    }

    async fn insert(
        &self,
        txn: &Self::Txn,
        owner: &i64,
        key: &GradeParameterType,
        payload: &GradeWeight,
    ) -> Result<(), DbErr> {
        let now = now();
        grade_parameter::ActiveModel {
            schedule_id: Set(*owner),
            grade_type: Set(key.clone()),
            percentage: Set(payload.percentage),
            status_change: Set(payload.status_change),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        txn: &Self::Txn,
        owner: &i64,
        key: &GradeParameterType,
        payload: &GradeWeight,
    ) -> Result<(), DbErr> {
        grade_parameter::Entity::update_many()
            .col_expr(
                grade_parameter::Column::Percentage,
                Expr::value(payload.percentage),
            )
            .col_expr(
                grade_parameter::Column::StatusChange,
                Expr::value(payload.status_change),
            )
            .col_expr(grade_parameter::Column::UpdatedAt, Expr::value(now()))
            .filter(grade_parameter::Column::ScheduleId.eq(*owner))
            .filter(grade_parameter::Column::GradeType.eq(key.clone()))
            .exec(txn)
            .await?;

        Ok(())
    }

    async fn delete(
        &self,
        txn: &Self::Txn,
        owner: &i64,
        key: &GradeParameterType,
    ) -> Result<(), DbErr> {
        grade_parameter::Entity::delete_many()
            .filter(grade_parameter::Column::ScheduleId.eq(*owner))
            .filter(grade_parameter::Column::GradeType.eq(key.clone()))
            .exec(txn)
            .await?;

        Ok(())
    }

    /// Parameters that still have assignments graded under them
    async fn blocked_deletions(
        &self,
        txn: &Self::Txn,
        owner: &i64,
        keys: &[GradeParameterType],
    ) -> Result<Vec<GradeParameterType>, DbErr> {
        let parameters = grade_parameter::Entity::find()
            .filter(grade_parameter::Column::ScheduleId.eq(*owner))
            .filter(grade_parameter::Column::GradeType.is_in(keys.to_vec()))
            .all(txn)
            .await?;

        let parameter_ids: Vec<i64> = parameters.iter().map(|p| p.id).collect();
        let referenced: HashSet<i64> = assignment::Entity::find()
            .select_only()
            .column(assignment::Column::GradeParameterId)
            .filter(assignment::Column::GradeParameterId.is_in(parameter_ids))
            .distinct()
            .into_tuple::<i64>()
            .all(txn)
            .await?
            .into_iter()
            .collect();

        Ok(parameters
            .into_iter()
            .filter(|p| referenced.contains(&p.id))
            .map(|p| p.grade_type)
            .collect())
    }
}

#[async_trait]
impl AssociationStore<Assistants> for SeaOrmStore {
    async fn owner_exists(&self, txn: &Self::Txn, owner: &i64) -> Result<bool, DbErr> {
        schedule_exists(txn, *owner).await
    }

    async fn existing(&self, txn: &Self::Txn, owner: &i64) -> Result<Vec<(i64, ())>, DbErr> {
        let user_ids = schedule_user::Entity::find()
            .select_only()
            .column(schedule_user::Column::UserId)
            .filter(schedule_user::Column::ScheduleId.eq(*owner))
            .filter(schedule_user::Column::Role.eq(RosterRole::Assistant as i16))
            .into_tuple::<i64>()
            .all(txn)
            .await?;

        Ok(user_ids.into_iter().map(|id| (id, ())).collect())
    }

    async fn insert(
        &self,
        txn: &Self::Txn,
        owner: &i64,
        key: &i64,
        _payload: &(),
    ) -> Result<(), DbErr> {
        schedule_user::ActiveModel {
            schedule_id: Set(*owner),
            user_id: Set(*key),
            role: Set(RosterRole::Assistant as i16),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(())
    }

    // Membership carries no payload, so there is never anything to update
    async fn update(
        &self,
        _txn: &Self::Txn,
        _owner: &i64,
        _key: &i64,
        _payload: &(),
    ) -> Result<(), DbErr> {
        Ok(())
    }

    async fn delete(&self, txn: &Self::Txn, owner: &i64, key: &i64) -> Result<(), DbErr> {
        schedule_user::Entity::delete_many()
            .filter(schedule_user::Column::ScheduleId.eq(*owner))
            .filter(schedule_user::Column::UserId.eq(*key))
            .filter(schedule_user::Column::Role.eq(RosterRole::Assistant as i16))
            .exec(txn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl AssociationStore<FileAttachments> for SeaOrmStore {
    async fn owner_exists(&self, txn: &Self::Txn, owner: &Attachment) -> Result<bool, DbErr> {
        let rows = match owner.table {
            OwnerTable::Assignments => assignment::Entity::find_by_id(owner.id).count(txn).await?,
            OwnerTable::UserAssignments => {
                user_assignment::Entity::find_by_id(owner.id)
                    .count(txn)
                    .await?
            }
        };

        Ok(rows > 0)
    }

    async fn existing(
        &self,
        txn: &Self::Txn,
        owner: &Attachment,
    ) -> Result<Vec<(String, ())>, DbErr> {
        let file_ids = file::Entity::find()
            .select_only()
            .column(file::Column::Id)
            .filter(file::Column::OwnerTable.eq(owner.table.as_str()))
            .filter(file::Column::OwnerId.eq(owner.id))
            .filter(file::Column::Status.eq(FileStatus::Active as i16))
            .into_tuple::<String>()
            .all(txn)
            .await?;

        Ok(file_ids.into_iter().map(|id| (id, ())).collect())
    }

    /// Attaches a file that is unowned or already belongs to this owner
    async fn insert(
        &self,
        txn: &Self::Txn,
        owner: &Attachment,
        key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        file::ActiveModel {
            id: Set(key.clone()),
            owner_table: Set(Some(owner.table.as_str().to_string())),
            owner_id: Set(Some(owner.id)),
            updated_at: Set(now()),
            ..Default::default()
        }
        .update(txn)
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        _txn: &Self::Txn,
        _owner: &Attachment,
        _key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        Ok(())
    }

    /// Detaches the file and marks it deleted; the stored bytes are cleaned up elsewhere
    async fn delete(
        &self,
        txn: &Self::Txn,
        _owner: &Attachment,
        key: &String,
    ) -> Result<(), DbErr> {
        file::ActiveModel {
            id: Set(key.clone()),
            status: Set(FileStatus::Deleted as i16),
            owner_table: Set(None),
            owner_id: Set(None),
            updated_at: Set(now()),
            ..Default::default()
        }
        .update(txn)
        .await?;

        Ok(())
    }

    /// Files that do not exist, were deleted, or are attached to another owner
    async fn unusable_insertions(
        &self,
        txn: &Self::Txn,
        owner: &Attachment,
        keys: &[String],
    ) -> Result<Vec<String>, DbErr> {
        let usable: HashSet<String> = file::Entity::find()
            .select_only()
            .column(file::Column::Id)
            .filter(file::Column::Id.is_in(keys.to_vec()))
            .filter(file::Column::Status.eq(FileStatus::Active as i16))
            .filter(
                Condition::any().add(file::Column::OwnerTable.is_null()).add(
                    Condition::all()
                        .add(file::Column::OwnerTable.eq(owner.table.as_str()))
                        .add(file::Column::OwnerId.eq(owner.id)),
                ),
            )
            .into_tuple::<String>()
            .all(txn)
            .await?
            .into_iter()
            .collect();

        Ok(keys
            .iter()
            .filter(|key| !usable.contains(*key))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssociationStore<AllowedFileTypes> for SeaOrmStore {
    async fn owner_exists(&self, txn: &Self::Txn, owner: &i64) -> Result<bool, DbErr> {
        Ok(assignment::Entity::find_by_id(*owner).count(txn).await? > 0)
    }

    async fn existing(&self, txn: &Self::Txn, owner: &i64) -> Result<Vec<(String, ())>, DbErr> {
        let file_types = assignment_file_type::Entity::find()
            .select_only()
            .column(assignment_file_type::Column::FileType)
            .filter(assignment_file_type::Column::AssignmentId.eq(*owner))
            .into_tuple::<String>()
            .all(txn)
            .await?;

        Ok(file_types.into_iter().map(|t| (t, ())).collect())
    }

    async fn insert(
        &self,
        txn: &Self::Txn,
        owner: &i64,
        key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        assignment_file_type::ActiveModel {
            assignment_id: Set(*owner),
            file_type: Set(key.clone()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        _txn: &Self::Txn,
        _owner: &i64,
        _key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        Ok(())
    }

    async fn delete(&self, txn: &Self::Txn, owner: &i64, key: &String) -> Result<(), DbErr> {
        assignment_file_type::Entity::delete_many()
            .filter(assignment_file_type::Column::AssignmentId.eq(*owner))
            .filter(assignment_file_type::Column::FileType.eq(key.as_str()))
            .exec(txn)
            .await?;

        Ok(())
    }
}
