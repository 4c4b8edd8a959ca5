use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text())
                    .col(ColumnDef::new(Courses::Ucu).small_integer().not_null())
                    .col(timestamp_column(Courses::CreatedAt))
                    .col(timestamp_column(Courses::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create schedules table
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(id_column(Schedules::Id))
                    .col(ColumnDef::new(Schedules::CourseId).string().not_null())
                    .col(
                        ColumnDef::new(Schedules::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Schedules::Semester).small_integer().not_null())
                    .col(ColumnDef::new(Schedules::Year).small_integer().not_null())
                    .col(ColumnDef::new(Schedules::Class).string().not_null())
                    .col(ColumnDef::new(Schedules::CreatedBy).big_integer().not_null())
                    .col(timestamp_column(Schedules::CreatedAt))
                    .col(timestamp_column(Schedules::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedules-course_id")
                            .from(Schedules::Table, Schedules::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create grade_parameters table
        manager
            .create_table(
                Table::create()
                    .table(GradeParameters::Table)
                    .if_not_exists()
                    .col(id_column(GradeParameters::Id))
                    .col(
                        ColumnDef::new(GradeParameters::ScheduleId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeParameters::GradeType).text().not_null())
                    .col(ColumnDef::new(GradeParameters::Percentage).double().not_null())
                    .col(
                        ColumnDef::new(GradeParameters::StatusChange)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_column(GradeParameters::CreatedAt))
                    .col(timestamp_column(GradeParameters::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grade_parameters-schedule_id")
                            .from(GradeParameters::Table, GradeParameters::ScheduleId)
                            .to(Schedules::Table, Schedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create assignments table; a parameter with assignments cannot be dropped
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(id_column(Assignments::Id))
                    .col(
                        ColumnDef::new(Assignments::GradeParameterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::Name).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text())
                    .col(ColumnDef::new(Assignments::Status).small_integer().not_null())
                    .col(ColumnDef::new(Assignments::DueDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Assignments::MaxUploads)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(timestamp_column(Assignments::CreatedAt))
                    .col(timestamp_column(Assignments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignments-grade_parameter_id")
                            .from(Assignments::Table, Assignments::GradeParameterId)
                            .to(GradeParameters::Table, GradeParameters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_assignments table (submissions)
        manager
            .create_table(
                Table::create()
                    .table(UserAssignments::Table)
                    .if_not_exists()
                    .col(id_column(UserAssignments::Id))
                    .col(
                        ColumnDef::new(UserAssignments::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserAssignments::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserAssignments::Description).text())
                    .col(ColumnDef::new(UserAssignments::Score).double())
                    .col(timestamp_column(UserAssignments::CreatedAt))
                    .col(timestamp_column(UserAssignments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_assignments-assignment_id")
                            .from(UserAssignments::Table, UserAssignments::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create schedule_users junction table (roster)
        manager
            .create_table(
                Table::create()
                    .table(ScheduleUsers::Table)
                    .if_not_exists()
                    .col(id_column(ScheduleUsers::Id))
                    .col(ColumnDef::new(ScheduleUsers::ScheduleId).big_integer().not_null())
                    .col(ColumnDef::new(ScheduleUsers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ScheduleUsers::Role).small_integer().not_null())
                    .col(timestamp_column(ScheduleUsers::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_users-schedule_id")
                            .from(ScheduleUsers::Table, ScheduleUsers::ScheduleId)
                            .to(Schedules::Table, Schedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create meetings table
        manager
            .create_table(
                Table::create()
                    .table(Meetings::Table)
                    .if_not_exists()
                    .col(id_column(Meetings::Id))
                    .col(ColumnDef::new(Meetings::ScheduleId).big_integer().not_null())
                    .col(ColumnDef::new(Meetings::Number).small_integer().not_null())
                    .col(ColumnDef::new(Meetings::Subject).string().not_null())
                    .col(ColumnDef::new(Meetings::Date).timestamp().not_null())
                    .col(timestamp_column(Meetings::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-meetings-schedule_id")
                            .from(Meetings::Table, Meetings::ScheduleId)
                            .to(Schedules::Table, Schedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create attendances table
        manager
            .create_table(
                Table::create()
                    .table(Attendances::Table)
                    .if_not_exists()
                    .col(id_column(Attendances::Id))
                    .col(ColumnDef::new(Attendances::MeetingId).big_integer().not_null())
                    .col(ColumnDef::new(Attendances::UserId).big_integer().not_null())
                    .col(timestamp_column(Attendances::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendances-meeting_id")
                            .from(Attendances::Table, Attendances::MeetingId)
                            .to(Meetings::Table, Meetings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create files table; the owner is polymorphic so it has no foreign key
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Files::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Files::Name).string().not_null())
                    .col(ColumnDef::new(Files::Mime).string().not_null())
                    .col(ColumnDef::new(Files::Extension).string().not_null())
                    .col(
                        ColumnDef::new(Files::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Files::OwnerTable).string())
                    .col(ColumnDef::new(Files::OwnerId).big_integer())
                    .col(timestamp_column(Files::CreatedAt))
                    .col(timestamp_column(Files::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create assignment_file_types table
        manager
            .create_table(
                Table::create()
                    .table(AssignmentFileTypes::Table)
                    .if_not_exists()
                    .col(id_column(AssignmentFileTypes::Id))
                    .col(
                        ColumnDef::new(AssignmentFileTypes::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentFileTypes::FileType)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignment_file_types-assignment_id")
                            .from(AssignmentFileTypes::Table, AssignmentFileTypes::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(AssignmentFileTypes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Attendances::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Meetings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ScheduleUsers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserAssignments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GradeParameters::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    Name,
    Description,
    Ucu,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Schedules {
    Table,
    Id,
    CourseId,
    Status,
    Semester,
    Year,
    Class,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GradeParameters {
    Table,
    Id,
    ScheduleId,
    GradeType,
    Percentage,
    StatusChange,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Assignments {
    Table,
    Id,
    GradeParameterId,
    Name,
    Description,
    Status,
    DueDate,
    MaxUploads,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserAssignments {
    Table,
    Id,
    AssignmentId,
    UserId,
    Description,
    Score,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ScheduleUsers {
    Table,
    Id,
    ScheduleId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Meetings {
    Table,
    Id,
    ScheduleId,
    Number,
    Subject,
    Date,
    CreatedAt,
}

#[derive(Iden)]
enum Attendances {
    Table,
    Id,
    MeetingId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Files {
    Table,
    Id,
    Name,
    Mime,
    Extension,
    Status,
    OwnerTable,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AssignmentFileTypes {
    Table,
    Id,
    AssignmentId,
    FileType,
}
