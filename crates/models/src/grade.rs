//! Weighted grade aggregation.
//!
//! Every grade parameter of a schedule contributes `score * percentage / 100` to the student's
//! total, where the score is on a 0-100 scale:
//!
//! * attendance scores the attendance rate (attended / held, zero when nothing was held)
//! * every other known category scores the mean over the *graded* assignments under the
//!   parameter; a missing submission or a submission without a score is left out entirely
//!   rather than counted as zero
//!
//! Percentages are not required to add up to 100, so a total can exceed 100 or fall short.

use crate::{
    assignment::{Assignment, Submission},
    format::{ABSENT, three_significant},
    grade_parameter::{GradeParameter, GradeParameterType},
    schedule::{AttendanceCount, ScheduleSummary},
};
use serde::Serialize;
use std::collections::HashMap;

/// Everything fetched for one student across one or more schedules
#[derive(Debug, Clone, Default)]
pub struct GradeInputs {
    pub parameters: Vec<GradeParameter>,
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<Submission>,
    pub attendance: HashMap<i64, AttendanceCount>,
}

/// Score of one category in one schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryScore {
    pub percentage: f64,
    /// Category score on a 0-100 scale
    pub score: f64,
    /// Weighted share of the total, `score * percentage / 100`
    pub contribution: f64,
    /// Meetings attended, or assignments graded
    pub counted: u32,
}

/// A student's grade in one schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleGradeReport {
    pub schedule_id: i64,
    pub course_name: String,
    pub attendance: Option<CategoryScore>,
    pub assignment: Option<CategoryScore>,
    pub quiz: Option<CategoryScore>,
    pub mid: Option<CategoryScore>,
    pub final_exam: Option<CategoryScore>,
    /// Parameters whose type is not scored
    pub ignored: Vec<GradeParameterType>,
    /// Sum of every contribution, never rounded
    pub total: f64,
}

impl ScheduleGradeReport {
    fn empty(schedule: &ScheduleSummary) -> Self {
        Self {
            schedule_id: schedule.id,
            course_name: schedule.course_name.clone(),
            attendance: None,
            assignment: None,
            quiz: None,
            mid: None,
            final_exam: None,
            ignored: Vec::new(),
            total: 0.0,
        }
    }

    pub fn category(&self, grade_type: &GradeParameterType) -> Option<&CategoryScore> {
        match grade_type {
            GradeParameterType::Attendance => self.attendance.as_ref(),
            GradeParameterType::Assignment => self.assignment.as_ref(),
            GradeParameterType::Quiz => self.quiz.as_ref(),
            GradeParameterType::Mid => self.mid.as_ref(),
            GradeParameterType::Final => self.final_exam.as_ref(),
            GradeParameterType::Unrecognized(_) => None,
        }
    }

    fn slot(&mut self, grade_type: &GradeParameterType) -> Option<&mut Option<CategoryScore>> {
        match grade_type {
            GradeParameterType::Attendance => Some(&mut self.attendance),
            GradeParameterType::Assignment => Some(&mut self.assignment),
            GradeParameterType::Quiz => Some(&mut self.quiz),
            GradeParameterType::Mid => Some(&mut self.mid),
            GradeParameterType::Final => Some(&mut self.final_exam),
            GradeParameterType::Unrecognized(_) => None,
        }
    }

    /// Display form with every value rendered to three significant digits
    pub fn row(&self) -> GradeReportRow {
        let display = |category: &Option<CategoryScore>| {
            category
                .map(|c| three_significant(c.score))
                .unwrap_or_else(|| ABSENT.to_string())
        };

        GradeReportRow {
            schedule_id: self.schedule_id,
            name: self.course_name.clone(),
            attendance: display(&self.attendance),
            attendance_contribution: self
                .attendance
                .map(|c| three_significant(c.contribution))
                .unwrap_or_else(|| ABSENT.to_string()),
            assignment: display(&self.assignment),
            quiz: display(&self.quiz),
            mid: display(&self.mid),
            final_exam: display(&self.final_exam),
            total: three_significant(self.total),
        }
    }
}

/// Rendered report line, `"-"` marking a category the schedule does not grade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReportRow {
    pub schedule_id: i64,
    pub name: String,
    /// Attendance rate, 0-100
    pub attendance: String,
    /// Weighted share of the total earned by attendance
    pub attendance_contribution: String,
    pub assignment: String,
    pub quiz: String,
    pub mid: String,
    #[serde(rename = "final")]
    pub final_exam: String,
    pub total: String,
}

enum Outcome {
    Scored(CategoryScore),
    Ignored,
}

/// Indexed grade inputs, built once and shared by every schedule in a batch
#[derive(Debug, Default)]
pub struct GradeBook {
    parameters_by_schedule: HashMap<i64, Vec<GradeParameter>>,
    assignments_by_parameter: HashMap<i64, Vec<Assignment>>,
    score_by_assignment: HashMap<i64, Option<f64>>,
    attendance: HashMap<i64, AttendanceCount>,
}

impl GradeBook {
    pub fn new(inputs: GradeInputs) -> Self {
        let mut parameters_by_schedule: HashMap<i64, Vec<GradeParameter>> = HashMap::new();
        for parameter in inputs.parameters {
            parameters_by_schedule
                .entry(parameter.schedule_id)
                .or_default()
                .push(parameter);
        }

        let mut assignments_by_parameter: HashMap<i64, Vec<Assignment>> = HashMap::new();
        for assignment in inputs.assignments {
            assignments_by_parameter
                .entry(assignment.grade_parameter_id)
                .or_default()
                .push(assignment);
        }

        // Submissions are already scoped to one student, so one per assignment
        let score_by_assignment = inputs
            .submissions
            .into_iter()
            .map(|submission| (submission.assignment_id, submission.score))
            .collect();

        Self {
            parameters_by_schedule,
            assignments_by_parameter,
            score_by_assignment,
            attendance: inputs.attendance,
        }
    }

    pub fn report(&self, schedule: &ScheduleSummary) -> ScheduleGradeReport {
        let mut report = ScheduleGradeReport::empty(schedule);

        let parameters = self
            .parameters_by_schedule
            .get(&schedule.id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for parameter in parameters {
            match self.score(parameter) {
                Outcome::Scored(category) => {
                    report.total += category.contribution;
                    if let Some(slot) = report.slot(&parameter.grade_type) {
                        *slot = Some(category);
                    }
                }
                Outcome::Ignored => report.ignored.push(parameter.grade_type.clone()),
            }
        }

        report
    }

    fn score(&self, parameter: &GradeParameter) -> Outcome {
        let (score, counted) = match &parameter.grade_type {
            GradeParameterType::Attendance => {
                let attendance = self
                    .attendance
                    .get(&parameter.schedule_id)
                    .copied()
                    .unwrap_or_default();
                (attendance.rate(), attendance.meetings_attended)
            }
            GradeParameterType::Assignment
            | GradeParameterType::Quiz
            | GradeParameterType::Mid
            | GradeParameterType::Final => self.average(parameter.id),
            GradeParameterType::Unrecognized(_) => return Outcome::Ignored,
        };

        Outcome::Scored(CategoryScore {
            percentage: parameter.percentage,
            score,
            contribution: score * parameter.percentage / 100.0,
            counted,
        })
    }

    /// Mean score over the graded assignments of a parameter
    fn average(&self, grade_parameter_id: i64) -> (f64, u32) {
        let scores = self
            .assignments_by_parameter
            .get(&grade_parameter_id)
            .into_iter()
            .flatten()
            .filter_map(|assignment| {
                self.score_by_assignment
                    .get(&assignment.id)
                    .copied()
                    .flatten()
            });

        let (sum, graded) = scores.fold((0.0, 0_u32), |(sum, n), score| (sum + score, n + 1));
        if graded == 0 {
            (0.0, 0)
        } else {
            (sum / f64::from(graded), graded)
        }
    }
}
