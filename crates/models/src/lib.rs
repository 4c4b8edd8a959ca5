pub mod assignment;
pub mod file;
pub mod format;
pub mod grade;
pub mod grade_parameter;
pub mod reconcile;
pub mod schedule;
