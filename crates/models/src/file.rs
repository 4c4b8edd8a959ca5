use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use strum::FromRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[repr(i16)]
pub enum FileStatus {
    /// Detached from its owner; never attached again
    Deleted = 0,
    Active = 1,
}

/// Table a file can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerTable {
    /// Reference material handed out with an assignment
    Assignments,
    /// A student's submission
    UserAssignments,
}

impl OwnerTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerTable::Assignments => "assignments",
            OwnerTable::UserAssignments => "user_assignments",
        }
    }
}

/// The row a set of files is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    pub table: OwnerTable,
    pub id: i64,
}

impl Attachment {
    pub fn assignment(id: i64) -> Self {
        Self {
            table: OwnerTable::Assignments,
            id,
        }
    }

    pub fn submission(id: i64) -> Self {
        Self {
            table: OwnerTable::UserAssignments,
            id,
        }
    }
}

impl Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table.as_str(), self.id)
    }
}
