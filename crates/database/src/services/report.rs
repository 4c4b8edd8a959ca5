use super::Actor;
use crate::{error::CoreError, repository::GradeReader};
use log::{debug, info};
use models::{
    grade::{GradeBook, GradeInputs, ScheduleGradeReport},
    schedule::{ScheduleStatus, ScheduleSummary},
};
use serde::Serialize;

/// Result of [`ReportService::compute_report`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GradeReport {
    Single(ScheduleGradeReport),
    Many(Vec<ScheduleGradeReport>),
}

impl GradeReport {
    pub fn reports(&self) -> &[ScheduleGradeReport] {
        match self {
            GradeReport::Single(report) => std::slice::from_ref(report),
            GradeReport::Many(reports) => reports,
        }
    }
}

pub struct ReportService;

impl ReportService {
    /// Grades of the actor in one schedule, or in every active schedule they are enrolled in
    pub async fn compute_report<R: GradeReader + ?Sized>(
        reader: &R,
        actor: Actor,
        schedule_id: Option<i64>,
    ) -> Result<GradeReport, CoreError> {
        match schedule_id {
            Some(schedule_id) => {
                Self::compute_schedule_report(reader, schedule_id, actor.user_id)
                    .await
                    .map(GradeReport::Single)
            }
            None => {
                let enrolled = reader.enrolled_schedule_ids(actor.user_id).await?;
                if enrolled.is_empty() {
                    debug!("User {} is not enrolled anywhere", actor.user_id);
                    return Ok(GradeReport::Many(Vec::new()));
                }

                let active: Vec<ScheduleSummary> = reader
                    .schedules(&enrolled)
                    .await?
                    .into_iter()
                    .filter(|s| s.status == ScheduleStatus::Active)
                    .collect();

                Self::build(reader, active, actor.user_id)
                    .await
                    .map(GradeReport::Many)
            }
        }
    }

    pub async fn compute_schedule_report<R: GradeReader + ?Sized>(
        reader: &R,
        schedule_id: i64,
        user_id: i64,
    ) -> Result<ScheduleGradeReport, CoreError> {
        let schedules = reader.schedules(&[schedule_id]).await?;
        if schedules.is_empty() {
            return Err(CoreError::not_found("schedule", schedule_id));
        }

        Self::build(reader, schedules, user_id)
            .await?
            .pop()
            .ok_or_else(|| CoreError::not_found("schedule", schedule_id))
    }

    /// Reports for several schedules at once; ids that match no schedule are skipped
    pub async fn compute_bulk_report<R: GradeReader + ?Sized>(
        reader: &R,
        schedule_ids: &[i64],
        user_id: i64,
    ) -> Result<Vec<ScheduleGradeReport>, CoreError> {
        let schedules = reader.schedules(schedule_ids).await?;
        Self::build(reader, schedules, user_id).await
    }

    async fn build<R: GradeReader + ?Sized>(
        reader: &R,
        schedules: Vec<ScheduleSummary>,
        user_id: i64,
    ) -> Result<Vec<ScheduleGradeReport>, CoreError> {
        if schedules.is_empty() {
            return Ok(Vec::new());
        }

        let schedule_ids: Vec<i64> = schedules.iter().map(|s| s.id).collect();
        let (parameters, attendance) = futures::try_join!(
            reader.grade_parameters_by_schedules(&schedule_ids),
            reader.attendance_counts(user_id, &schedule_ids),
        )?;

        let parameter_ids: Vec<i64> = parameters.iter().map(|p| p.id).collect();
        let assignments = reader
            .assignments_by_grade_parameters(&parameter_ids)
            .await?;

        let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
        let submissions = reader
            .submissions_by_assignments_and_user(&assignment_ids, user_id)
            .await?;

        let book = GradeBook::new(GradeInputs {
            parameters,
            assignments,
            submissions,
            attendance,
        });

        let reports: Vec<ScheduleGradeReport> =
            schedules.iter().map(|schedule| book.report(schedule)).collect();

        for report in reports.iter().filter(|r| !r.ignored.is_empty()) {
            info!(
                "Schedule {} has grade parameters that are not scored: {:?}",
                report.schedule_id, report.ignored
            );
        }

        Ok(reports)
    }
}
