use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// Whether a schedule is running this term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[repr(i16)]
pub enum ScheduleStatus {
    Inactive = 0,
    Active = 1,
}

/// Role a user holds on a schedule roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[repr(i16)]
pub enum RosterRole {
    Student = 1,
    Assistant = 2,
}

/// The minimum a report needs to know about a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub id: i64,
    pub course_name: String,
    pub status: ScheduleStatus,
}

/// A student's attendance in one schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCount {
    pub schedule_id: i64,
    pub meetings_held: u32,
    pub meetings_attended: u32,
}

impl AttendanceCount {
    /// Attendance rate on a 0-100 scale; zero when no meeting has been held
    pub fn rate(&self) -> f64 {
        if self.meetings_held == 0 {
            return 0.0;
        }
        f64::from(self.meetings_attended) / f64::from(self.meetings_held) * 100.0
    }
}
