use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // A grade parameter type appears at most once per schedule
        manager
            .create_index(
                Index::create()
                    .name("idx_grade_parameters_schedule_id_grade_type")
                    .table(GradeParameters::Table)
                    .col(GradeParameters::ScheduleId)
                    .col(GradeParameters::GradeType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One submission per student and assignment
        manager
            .create_index(
                Index::create()
                    .name("idx_user_assignments_assignment_id_user_id")
                    .table(UserAssignments::Table)
                    .col(UserAssignments::AssignmentId)
                    .col(UserAssignments::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_users_schedule_id_user_id_role")
                    .table(ScheduleUsers::Table)
                    .col(ScheduleUsers::ScheduleId)
                    .col(ScheduleUsers::UserId)
                    .col(ScheduleUsers::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Enrollment lookups start from the user
        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_users_user_id")
                    .table(ScheduleUsers::Table)
                    .col(ScheduleUsers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_grade_parameter_id")
                    .table(Assignments::Table)
                    .col(Assignments::GradeParameterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meetings_schedule_id")
                    .table(Meetings::Table)
                    .col(Meetings::ScheduleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendances_meeting_id_user_id")
                    .table(Attendances::Table)
                    .col(Attendances::MeetingId)
                    .col(Attendances::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Attached files are looked up by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_files_owner_table_owner_id")
                    .table(Files::Table)
                    .col(Files::OwnerTable)
                    .col(Files::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignment_file_types_assignment_id_file_type")
                    .table(AssignmentFileTypes::Table)
                    .col(AssignmentFileTypes::AssignmentId)
                    .col(AssignmentFileTypes::FileType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes in reverse order
        for name in [
            "idx_assignment_file_types_assignment_id_file_type",
            "idx_files_owner_table_owner_id",
            "idx_attendances_meeting_id_user_id",
            "idx_meetings_schedule_id",
            "idx_assignments_grade_parameter_id",
            "idx_schedule_users_user_id",
            "idx_schedule_users_schedule_id_user_id_role",
            "idx_user_assignments_assignment_id_user_id",
            "idx_grade_parameters_schedule_id_grade_type",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum GradeParameters {
    Table,
    ScheduleId,
    GradeType,
}

#[derive(Iden)]
enum UserAssignments {
    Table,
    AssignmentId,
    UserId,
}

#[derive(Iden)]
enum ScheduleUsers {
    Table,
    ScheduleId,
    UserId,
    Role,
}

#[derive(Iden)]
enum Assignments {
    Table,
    GradeParameterId,
}

#[derive(Iden)]
enum Meetings {
    Table,
    ScheduleId,
}

#[derive(Iden)]
enum Attendances {
    Table,
    MeetingId,
    UserId,
}

#[derive(Iden)]
enum Files {
    Table,
    OwnerTable,
    OwnerId,
}

#[derive(Iden)]
enum AssignmentFileTypes {
    Table,
    AssignmentId,
    FileType,
}
