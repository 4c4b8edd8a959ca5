pub mod assignment;
pub mod assignment_file_type;
pub mod attendance;
pub mod course;
pub mod file;
pub mod grade_parameter;
pub mod meeting;
pub mod schedule;
pub mod schedule_user;
pub mod user_assignment;
