//! In-memory store for driving the services without a database.
//!
//! A transaction works on a private copy of the committed state, so a rollback (or a dropped
//! transaction) leaves nothing behind. Any operation can be made to fail by name.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use database::repository::{
    AllowedFileTypes, AssociationStore, Assistants, FileAttachments, GradeParameters, GradeReader,
    ScopedAssignment, SubmissionStore, Transactional,
};
use models::{
    assignment::{Assignment, AssignmentStatus, Submission},
    file::{Attachment, FileStatus, OwnerTable},
    grade_parameter::{GradeParameter, GradeParameterType, GradeWeight},
    schedule::{AttendanceCount, RosterRole, ScheduleStatus, ScheduleSummary},
};
use sea_orm::DbErr;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Mutex,
};

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub status: FileStatus,
    pub owner: Option<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub schedules: BTreeMap<i64, ScheduleSummary>,
    pub parameters: Vec<GradeParameter>,
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<Submission>,
    /// Keyed by (user id, schedule id)
    pub attendance: HashMap<(i64, i64), AttendanceCount>,
    /// (schedule id, user id, role)
    pub roster: Vec<(i64, i64, RosterRole)>,
    pub files: BTreeMap<String, StoredFile>,
    pub file_types: BTreeMap<i64, BTreeSet<String>>,
    pub next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        1000 + self.next_id
    }

    pub fn schedule(&mut self, id: i64, name: &str, status: ScheduleStatus) -> &mut Self {
        self.schedules.insert(
            id,
            ScheduleSummary {
                id,
                course_name: name.to_string(),
                status,
            },
        );
        self
    }

    pub fn parameter(
        &mut self,
        id: i64,
        schedule_id: i64,
        grade_type: GradeParameterType,
        percentage: f64,
    ) -> &mut Self {
        self.parameters.push(GradeParameter {
            id,
            schedule_id,
            grade_type,
            percentage,
            status_change: false,
        });
        self
    }

    pub fn assignment(&mut self, id: i64, grade_parameter_id: i64) -> &mut Self {
        self.assignments.push(Assignment {
            id,
            grade_parameter_id,
            name: format!("Assignment {id}"),
            due_date: at(20, 23),
            max_uploads: 2,
            status: AssignmentStatus::UploadRequired,
        });
        self
    }

    pub fn graded(&mut self, id: i64, assignment_id: i64, user_id: i64, score: f64) -> &mut Self {
        self.submissions.push(Submission {
            id,
            assignment_id,
            user_id,
            description: None,
            score: Some(score),
            updated_at: at(1, 9),
        });
        self
    }

    pub fn attended(
        &mut self,
        user_id: i64,
        schedule_id: i64,
        held: u32,
        attended: u32,
    ) -> &mut Self {
        self.attendance.insert(
            (user_id, schedule_id),
            AttendanceCount {
                schedule_id,
                meetings_held: held,
                meetings_attended: attended,
            },
        );
        self
    }

    pub fn enroll(&mut self, schedule_id: i64, user_id: i64, role: RosterRole) -> &mut Self {
        self.roster.push((schedule_id, user_id, role));
        self
    }

    pub fn file(&mut self, id: &str, status: FileStatus, owner: Option<Attachment>) -> &mut Self {
        self.files
            .insert(id.to_string(), StoredFile { status, owner });
        self
    }

    pub fn assistants(&self, schedule_id: i64) -> BTreeSet<i64> {
        self.roster
            .iter()
            .filter(|(s, _, role)| *s == schedule_id && *role == RosterRole::Assistant)
            .map(|(_, user, _)| *user)
            .collect()
    }

    pub fn weights(&self, schedule_id: i64) -> BTreeMap<GradeParameterType, f64> {
        self.parameters
            .iter()
            .filter(|p| p.schedule_id == schedule_id)
            .map(|p| (p.grade_type.clone(), p.percentage))
            .collect()
    }

    pub fn files_of(&self, owner: Attachment) -> BTreeSet<String> {
        self.files
            .iter()
            .filter(|(_, f)| f.owner == Some(owner) && f.status == FileStatus::Active)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn scope_of(&self, assignment: &Assignment) -> Option<i64> {
        self.parameters
            .iter()
            .find(|p| p.id == assignment.grade_parameter_id)
            .map(|p| p.schedule_id)
    }

    fn attachment_owner_exists(&self, owner: &Attachment) -> bool {
        match owner.table {
            OwnerTable::Assignments => self.assignments.iter().any(|a| a.id == owner.id),
            OwnerTable::UserAssignments => self.submissions.iter().any(|s| s.id == owner.id),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: Mutex<State>,
    fail_on: Mutex<Option<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

#[derive(Debug)]
pub struct MemoryTxn {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(state: State) -> Self {
        Self {
            committed: Mutex::new(state),
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> State {
        self.committed.lock().unwrap().clone()
    }

    /// Makes every later call of `op` fail with a store error
    pub fn fail_on(&self, op: &'static str) {
        *self.fail_on.lock().unwrap() = Some(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: &'static str) -> Result<(), DbErr> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(DbErr::Custom(format!("injected failure in {op}")));
        }
        Ok(())
    }

    fn read<T>(&self, op: &'static str, f: impl FnOnce(&State) -> T) -> Result<T, DbErr> {
        self.record(op)?;
        Ok(f(&self.committed.lock().unwrap()))
    }
}

fn within<T>(txn: &MemoryTxn, f: impl FnOnce(&mut State) -> T) -> T {
    f(&mut txn.state.lock().unwrap())
}

#[async_trait]
impl Transactional for MemoryStore {
    type Txn = MemoryTxn;

    async fn begin(&self) -> Result<MemoryTxn, DbErr> {
        self.record("begin")?;
        Ok(MemoryTxn {
            state: Mutex::new(self.snapshot()),
        })
    }

    async fn commit(&self, txn: MemoryTxn) -> Result<(), DbErr> {
        self.record("commit")?;
        *self.committed.lock().unwrap() = txn.state.into_inner().unwrap();
        Ok(())
    }

    async fn rollback(&self, _txn: MemoryTxn) -> Result<(), DbErr> {
        self.record("rollback")
    }
}

#[async_trait]
impl GradeReader for MemoryStore {
    async fn schedules(&self, ids: &[i64]) -> Result<Vec<ScheduleSummary>, DbErr> {
        self.read("schedules", |state| {
            state
                .schedules
                .values()
                .filter(|s| ids.contains(&s.id))
                .cloned()
                .collect()
        })
    }

    async fn grade_parameters_by_schedules(
        &self,
        schedule_ids: &[i64],
    ) -> Result<Vec<GradeParameter>, DbErr> {
        self.read("grade_parameters", |state| {
            state
                .parameters
                .iter()
                .filter(|p| schedule_ids.contains(&p.schedule_id))
                .cloned()
                .collect()
        })
    }

    async fn assignments_by_grade_parameters(
        &self,
        grade_parameter_ids: &[i64],
    ) -> Result<Vec<Assignment>, DbErr> {
        self.read("assignments", |state| {
            state
                .assignments
                .iter()
                .filter(|a| grade_parameter_ids.contains(&a.grade_parameter_id))
                .cloned()
                .collect()
        })
    }

    async fn submissions_by_assignments_and_user(
        &self,
        assignment_ids: &[i64],
        user_id: i64,
    ) -> Result<Vec<Submission>, DbErr> {
        self.read("submissions", |state| {
            state
                .submissions
                .iter()
                .filter(|s| s.user_id == user_id && assignment_ids.contains(&s.assignment_id))
                .cloned()
                .collect()
        })
    }

    async fn attendance_counts(
        &self,
        user_id: i64,
        schedule_ids: &[i64],
    ) -> Result<HashMap<i64, AttendanceCount>, DbErr> {
        self.read("attendance", |state| {
            schedule_ids
                .iter()
                .map(|&schedule_id| {
                    let count = state
                        .attendance
                        .get(&(user_id, schedule_id))
                        .copied()
                        .unwrap_or(AttendanceCount {
                            schedule_id,
                            ..Default::default()
                        });
                    (schedule_id, count)
                })
                .collect()
        })
    }

    async fn enrolled_schedule_ids(&self, user_id: i64) -> Result<Vec<i64>, DbErr> {
        self.read("enrolled", |state| {
            state
                .roster
                .iter()
                .filter(|(_, user, role)| *user == user_id && *role == RosterRole::Student)
                .map(|(schedule, _, _)| *schedule)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }
}

#[async_trait]
impl AssociationStore<GradeParameters> for MemoryStore {
    async fn owner_exists(&self, txn: &MemoryTxn, owner: &i64) -> Result<bool, DbErr> {
        self.record("owner_exists")?;
        Ok(within(txn, |state| state.schedules.contains_key(owner)))
    }

    async fn existing(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
    ) -> Result<Vec<(GradeParameterType, GradeWeight)>, DbErr> {
        self.record("existing")?;
        Ok(within(txn, |state| {
            state
                .parameters
                .iter()
                .filter(|p| p.schedule_id == *owner)
                .map(|p| (p.grade_type.clone(), p.weight()))
                .collect()
        }))
    }

    async fn insert(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
        key: &GradeParameterType,
        payload: &GradeWeight,
    ) -> Result<(), DbErr> {
        self.record("insert")?;
        within(txn, |state| {
            let id = state.next_id();
            state.parameters.push(GradeParameter {
                id,
                schedule_id: *owner,
                grade_type: key.clone(),
                percentage: payload.percentage,
                status_change: payload.status_change,
            });
        });
        Ok(())
    }

    async fn update(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
        key: &GradeParameterType,
        payload: &GradeWeight,
    ) -> Result<(), DbErr> {
        self.record("update")?;
        within(txn, |state| {
            for p in state
                .parameters
                .iter_mut()
                .filter(|p| p.schedule_id == *owner && p.grade_type == *key)
            {
                p.percentage = payload.percentage;
                p.status_change = payload.status_change;
            }
        });
        Ok(())
    }

    async fn delete(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
        key: &GradeParameterType,
    ) -> Result<(), DbErr> {
        self.record("delete")?;
        within(txn, |state| {
            state
                .parameters
                .retain(|p| !(p.schedule_id == *owner && p.grade_type == *key))
        });
        Ok(())
    }

    async fn blocked_deletions(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
        keys: &[GradeParameterType],
    ) -> Result<Vec<GradeParameterType>, DbErr> {
        self.record("blocked_deletions")?;
        Ok(within(txn, |state| {
            state
                .parameters
                .iter()
                .filter(|p| p.schedule_id == *owner && keys.contains(&p.grade_type))
                .filter(|p| state.assignments.iter().any(|a| a.grade_parameter_id == p.id))
                .map(|p| p.grade_type.clone())
                .collect()
        }))
    }
}

#[async_trait]
impl AssociationStore<Assistants> for MemoryStore {
    async fn owner_exists(&self, txn: &MemoryTxn, owner: &i64) -> Result<bool, DbErr> {
        self.record("owner_exists")?;
        Ok(within(txn, |state| state.schedules.contains_key(owner)))
    }

    async fn existing(&self, txn: &MemoryTxn, owner: &i64) -> Result<Vec<(i64, ())>, DbErr> {
        self.record("existing")?;
        Ok(within(txn, |state| {
            state
                .assistants(*owner)
                .into_iter()
                .map(|id| (id, ()))
                .collect()
        }))
    }

    async fn insert(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
        key: &i64,
        _payload: &(),
    ) -> Result<(), DbErr> {
        self.record("insert")?;
        within(txn, |state| {
            state.roster.push((*owner, *key, RosterRole::Assistant))
        });
        Ok(())
    }

    async fn update(
        &self,
        _txn: &MemoryTxn,
        _owner: &i64,
        _key: &i64,
        _payload: &(),
    ) -> Result<(), DbErr> {
        self.record("update")
    }

    async fn delete(&self, txn: &MemoryTxn, owner: &i64, key: &i64) -> Result<(), DbErr> {
        self.record("delete")?;
        within(txn, |state| {
            state.roster.retain(|(schedule, user, role)| {
                !(*schedule == *owner && *user == *key && *role == RosterRole::Assistant)
            })
        });
        Ok(())
    }
}

#[async_trait]
impl AssociationStore<FileAttachments> for MemoryStore {
    async fn owner_exists(&self, txn: &MemoryTxn, owner: &Attachment) -> Result<bool, DbErr> {
        self.record("owner_exists")?;
        Ok(within(txn, |state| state.attachment_owner_exists(owner)))
    }

    async fn existing(
        &self,
        txn: &MemoryTxn,
        owner: &Attachment,
    ) -> Result<Vec<(String, ())>, DbErr> {
        self.record("existing")?;
        Ok(within(txn, |state| {
            state
                .files_of(*owner)
                .into_iter()
                .map(|id| (id, ()))
                .collect()
        }))
    }

    async fn insert(
        &self,
        txn: &MemoryTxn,
        owner: &Attachment,
        key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        self.record("insert")?;
        within(txn, |state| {
            if let Some(file) = state.files.get_mut(key) {
                file.owner = Some(*owner);
            }
        });
        Ok(())
    }

    async fn update(
        &self,
        _txn: &MemoryTxn,
        _owner: &Attachment,
        _key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        self.record("update")
    }

    async fn delete(
        &self,
        txn: &MemoryTxn,
        _owner: &Attachment,
        key: &String,
    ) -> Result<(), DbErr> {
        self.record("delete")?;
        within(txn, |state| {
            if let Some(file) = state.files.get_mut(key) {
                file.status = FileStatus::Deleted;
                file.owner = None;
            }
        });
        Ok(())
    }

    async fn unusable_insertions(
        &self,
        txn: &MemoryTxn,
        owner: &Attachment,
        keys: &[String],
    ) -> Result<Vec<String>, DbErr> {
        self.record("unusable_insertions")?;
        Ok(within(txn, |state| {
            keys.iter()
                .filter(|key| {
                    state.files.get(*key).is_none_or(|file| {
                        file.status == FileStatus::Deleted
                            || file.owner.is_some_and(|current| current != *owner)
                    })
                })
                .cloned()
                .collect()
        }))
    }
}

#[async_trait]
impl AssociationStore<AllowedFileTypes> for MemoryStore {
    async fn owner_exists(&self, txn: &MemoryTxn, owner: &i64) -> Result<bool, DbErr> {
        self.record("owner_exists")?;
        Ok(within(txn, |state| {
            state.assignments.iter().any(|a| a.id == *owner)
        }))
    }

    async fn existing(&self, txn: &MemoryTxn, owner: &i64) -> Result<Vec<(String, ())>, DbErr> {
        self.record("existing")?;
        Ok(within(txn, |state| {
            state
                .file_types
                .get(owner)
                .into_iter()
                .flatten()
                .map(|t| (t.clone(), ()))
                .collect()
        }))
    }

    async fn insert(
        &self,
        txn: &MemoryTxn,
        owner: &i64,
        key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        self.record("insert")?;
        within(txn, |state| {
            state.file_types.entry(*owner).or_default().insert(key.clone());
        });
        Ok(())
    }

    async fn update(
        &self,
        _txn: &MemoryTxn,
        _owner: &i64,
        _key: &String,
        _payload: &(),
    ) -> Result<(), DbErr> {
        self.record("update")
    }

    async fn delete(&self, txn: &MemoryTxn, owner: &i64, key: &String) -> Result<(), DbErr> {
        self.record("delete")?;
        within(txn, |state| {
            if let Some(types) = state.file_types.get_mut(owner) {
                types.remove(key);
            }
        });
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn assignment(
        &self,
        txn: &MemoryTxn,
        assignment_id: i64,
    ) -> Result<Option<ScopedAssignment>, DbErr> {
        self.record("assignment")?;
        Ok(within(txn, |state| {
            let assignment = state.assignments.iter().find(|a| a.id == assignment_id)?;
            Some(ScopedAssignment {
                assignment: assignment.clone(),
                schedule_id: state.scope_of(assignment)?,
            })
        }))
    }

    async fn is_enrolled_student(
        &self,
        txn: &MemoryTxn,
        schedule_id: i64,
        user_id: i64,
    ) -> Result<bool, DbErr> {
        self.record("is_enrolled_student")?;
        Ok(within(txn, |state| {
            state
                .roster
                .contains(&(schedule_id, user_id, RosterRole::Student))
        }))
    }

    async fn submission(
        &self,
        txn: &MemoryTxn,
        assignment_id: i64,
        user_id: i64,
    ) -> Result<Option<Submission>, DbErr> {
        self.record("submission")?;
        Ok(within(txn, |state| {
            state
                .submissions
                .iter()
                .find(|s| s.assignment_id == assignment_id && s.user_id == user_id)
                .cloned()
        }))
    }

    async fn insert_submission(
        &self,
        txn: &MemoryTxn,
        assignment_id: i64,
        user_id: i64,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Submission, DbErr> {
        self.record("insert_submission")?;
        Ok(within(txn, |state| {
            let submission = Submission {
                id: state.next_id(),
                assignment_id,
                user_id,
                description,
                score: None,
                updated_at: now,
            };
            state.submissions.push(submission.clone());
            submission
        }))
    }

    async fn touch_submission(
        &self,
        txn: &MemoryTxn,
        submission_id: i64,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), DbErr> {
        self.record("touch_submission")?;
        within(txn, |state| {
            if let Some(submission) = state.submissions.iter_mut().find(|s| s.id == submission_id)
            {
                submission.description = description;
                submission.updated_at = now;
            }
        });
        Ok(())
    }
}
