use super::{Actor, reconcile::ReconcileService};
use crate::{
    error::CoreError,
    repository::{
        AssociationKind, AssociationStore, FileAttachments, SubmissionStore, Transactional,
    },
};
use chrono::NaiveDateTime;
use log::{info, warn};
use models::{assignment::Submission, file::Attachment};
use std::collections::BTreeSet;

/// A submission as stored after a submit, with how its attachments changed
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub submission: Submission,
    pub resubmitted: bool,
    pub files_attached: usize,
    pub files_removed: usize,
}

pub struct SubmissionService;

impl SubmissionService {
    /// Hands in (or replaces) the actor's files for an assignment
    ///
    /// The submission row is created on the first submit and reused afterwards, so a student
    /// only ever has one per assignment. Its score is left untouched.
    pub async fn submit<S>(
        store: &S,
        actor: Actor,
        assignment_id: i64,
        description: Option<String>,
        file_ids: Vec<String>,
        now: NaiveDateTime,
    ) -> Result<SubmitReceipt, CoreError>
    where
        S: SubmissionStore + AssociationStore<FileAttachments>,
    {
        let file_ids: Vec<String> = file_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let desired: Vec<(String, ())> = file_ids.into_iter().map(|id| (id, ())).collect();
        FileAttachments::validate(&desired)?;

        let txn = store.begin().await?;
        let result =
            Self::submit_in(store, &txn, actor, assignment_id, description, desired, now).await;

        match result {
            Ok(receipt) => {
                store.commit(txn).await?;
                info!(
                    "User {} {} assignment {assignment_id} with {} new file(s)",
                    actor.user_id,
                    if receipt.resubmitted { "resubmitted" } else { "submitted" },
                    receipt.files_attached
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = store.rollback(txn).await {
                    warn!("Rollback of submission to {assignment_id} failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    async fn submit_in<S>(
        store: &S,
        txn: &<S as Transactional>::Txn,
        actor: Actor,
        assignment_id: i64,
        description: Option<String>,
        desired: Vec<(String, ())>,
        now: NaiveDateTime,
    ) -> Result<SubmitReceipt, CoreError>
    where
        S: SubmissionStore + AssociationStore<FileAttachments>,
    {
        let scoped = SubmissionStore::assignment(store, txn, assignment_id)
            .await?
            .ok_or_else(|| CoreError::not_found("assignment", assignment_id))?;
        let assignment = &scoped.assignment;

        if !assignment.accepts_uploads() {
            return Err(CoreError::Validation(format!(
                "assignment {assignment_id} does not take uploads"
            )));
        }
        if assignment.is_overdue(now) {
            return Err(CoreError::Validation(format!(
                "assignment {assignment_id} was due {}",
                assignment.due_date
            )));
        }
        if !store
            .is_enrolled_student(txn, scoped.schedule_id, actor.user_id)
            .await?
        {
            return Err(CoreError::Validation(format!(
                "user {} is not a student of schedule {}",
                actor.user_id, scoped.schedule_id
            )));
        }
        if desired.len() > usize::from(assignment.max_uploads) {
            return Err(CoreError::Validation(format!(
                "assignment {assignment_id} takes at most {} file(s), got {}",
                assignment.max_uploads,
                desired.len()
            )));
        }

        let (submission, resubmitted) = match store
            .submission(txn, assignment_id, actor.user_id)
            .await?
        {
            Some(mut existing) => {
                store
                    .touch_submission(txn, existing.id, description.clone(), now)
                    .await?;
                existing.description = description;
                existing.updated_at = now;
                (existing, true)
            }
            None => {
                let created = store
                    .insert_submission(txn, assignment_id, actor.user_id, description, now)
                    .await?;
                (created, false)
            }
        };

        let owner = Attachment::submission(submission.id);
        let outcome =
            ReconcileService::apply::<FileAttachments, S>(store, txn, &owner, desired).await?;

        Ok(SubmitReceipt {
            submission,
            resubmitted,
            files_attached: outcome.inserted,
            files_removed: outcome.deleted,
        })
    }
}
