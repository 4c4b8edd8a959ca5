use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// Whether students hand in files for an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[repr(i16)]
pub enum AssignmentStatus {
    UploadNotRequired = 0,
    UploadRequired = 1,
}

/// A graded item belonging to exactly one grade parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub grade_parameter_id: i64,
    pub name: String,
    pub due_date: NaiveDateTime,
    pub max_uploads: u16,
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn accepts_uploads(&self) -> bool {
        self.status == AssignmentStatus::UploadRequired
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.due_date < now
    }
}

/// A student's record for one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub user_id: i64,
    pub description: Option<String>,
    /// Set only by grading; `None` means not graded yet
    pub score: Option<f64>,
    pub updated_at: NaiveDateTime,
}
