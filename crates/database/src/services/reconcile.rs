//! Synchronizes a desired association set with the persisted one.
//!
//! A write runs in a single transaction: the owner is checked, the persisted set is diffed against
//! the desired one, the guards get a chance to veto, and then deletions, updates and insertions
//! are applied in that order. Any failure rolls the whole transaction back.

use crate::{
    error::CoreError,
    repository::{
        AllowedFileTypes, AssociationKind, AssociationStore, Assistants, FileAttachments,
        GradeParameters,
    },
};
use log::{debug, info, warn};
use models::{
    assignment::AssignmentStatus,
    file::Attachment,
    grade_parameter::{GradeParameterType, GradeWeight},
    reconcile::diff,
};
use serde::Serialize;

/// A desired set together with the owner it belongs to
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationSet {
    GradeParameters {
        schedule_id: i64,
        parameters: Vec<(GradeParameterType, GradeWeight)>,
    },
    Assistants {
        schedule_id: i64,
        user_ids: Vec<i64>,
    },
    FileAttachments {
        owner: Attachment,
        file_ids: Vec<String>,
    },
    AllowedFileTypes {
        assignment_id: i64,
        file_types: Vec<String>,
    },
}

/// What a reconciliation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }
}

pub struct ReconcileService;

impl ReconcileService {
    pub async fn reconcile_set<S>(
        store: &S,
        set: AssociationSet,
    ) -> Result<ReconcileOutcome, CoreError>
    where
        S: AssociationStore<GradeParameters>
            + AssociationStore<Assistants>
            + AssociationStore<FileAttachments>
            + AssociationStore<AllowedFileTypes>,
    {
        match set {
            AssociationSet::GradeParameters {
                schedule_id,
                parameters,
            } => Self::reconcile::<GradeParameters, S>(store, schedule_id, parameters).await,
            AssociationSet::Assistants {
                schedule_id,
                user_ids,
            } => {
                let desired = user_ids.into_iter().map(|id| (id, ())).collect();
                Self::reconcile::<Assistants, S>(store, schedule_id, desired).await
            }
            AssociationSet::FileAttachments { owner, file_ids } => {
                let desired = file_ids.into_iter().map(|id| (id, ())).collect();
                Self::reconcile::<FileAttachments, S>(store, owner, desired).await
            }
            AssociationSet::AllowedFileTypes {
                assignment_id,
                file_types,
            } => {
                let desired = file_types
                    .iter()
                    .map(|t| (AllowedFileTypes::normalize(t), ()))
                    .collect();
                Self::reconcile::<AllowedFileTypes, S>(store, assignment_id, desired).await
            }
        }
    }

    /// Applies an assignment's upload policy to its allowed file types
    ///
    /// An assignment that takes no uploads keeps no allowed types, whatever was asked for.
    pub async fn sync_allowed_file_types<S>(
        store: &S,
        assignment_id: i64,
        status: AssignmentStatus,
        file_types: Vec<String>,
    ) -> Result<ReconcileOutcome, CoreError>
    where
        S: AssociationStore<AllowedFileTypes>,
    {
        let desired = match status {
            AssignmentStatus::UploadNotRequired => Vec::new(),
            AssignmentStatus::UploadRequired => file_types
                .iter()
                .map(|t| (AllowedFileTypes::normalize(t), ()))
                .collect(),
        };

        Self::reconcile::<AllowedFileTypes, S>(store, assignment_id, desired).await
    }

    /// Reconciles one owner's set in its own transaction
    pub async fn reconcile<K, S>(
        store: &S,
        owner: K::Owner,
        desired: Vec<(K::Key, K::Payload)>,
    ) -> Result<ReconcileOutcome, CoreError>
    where
        K: AssociationKind,
        S: AssociationStore<K>,
    {
        K::validate(&desired)?;

        let txn = store.begin().await?;
        match Self::apply::<K, S>(store, &txn, &owner, desired).await {
            Ok(outcome) => {
                store.commit(txn).await?;
                info!(
                    "Reconciled {} set of {} {owner}: {} inserted, {} updated, {} deleted",
                    K::NAME,
                    K::OWNER,
                    outcome.inserted,
                    outcome.updated,
                    outcome.deleted
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = store.rollback(txn).await {
                    warn!("Rollback of {} set of {owner} failed: {rollback_err}", K::NAME);
                }
                Err(err)
            }
        }
    }

    /// Reconciles one owner's set inside a transaction the caller owns
    ///
    /// The desired set must already be validated. Nothing is written when a guard objects.
    pub async fn apply<K, S>(
        store: &S,
        txn: &S::Txn,
        owner: &K::Owner,
        desired: Vec<(K::Key, K::Payload)>,
    ) -> Result<ReconcileOutcome, CoreError>
    where
        K: AssociationKind,
        S: AssociationStore<K> + ?Sized,
    {
        if !store.owner_exists(txn, owner).await? {
            return Err(CoreError::not_found(K::OWNER, owner));
        }

        let existing: Vec<_> = store
            .existing(txn, owner)
            .await?
            .into_iter()
            .filter(|(key, _)| K::is_managed(key))
            .collect();
        let changes = diff(desired, existing);
        if changes.is_empty() {
            debug!("{} set of {owner} is already up to date", K::NAME);
            return Ok(ReconcileOutcome::default());
        }

        let deleted_keys: Vec<K::Key> = changes.deleted_keys().cloned().collect();
        if !deleted_keys.is_empty() {
            let blocked = store.blocked_deletions(txn, owner, &deleted_keys).await?;
            if !blocked.is_empty() {
                return Err(CoreError::ReferentialConflict {
                    kind: K::NAME,
                    keys: blocked.iter().map(ToString::to_string).collect(),
                });
            }
        }

        let inserted_keys: Vec<K::Key> = changes.inserted_keys().cloned().collect();
        if !inserted_keys.is_empty() {
            let unusable = store.unusable_insertions(txn, owner, &inserted_keys).await?;
            if !unusable.is_empty() {
                let keys: Vec<String> = unusable.iter().map(ToString::to_string).collect();
                return Err(CoreError::Validation(format!(
                    "{} not available: {}",
                    K::NAME,
                    keys.join(", ")
                )));
            }
        }

        for (key, _) in &changes.to_delete {
            store.delete(txn, owner, key).await?;
        }
        for (key, payload) in &changes.to_update {
            store.update(txn, owner, key, payload).await?;
        }
        for (key, payload) in &changes.to_insert {
            store.insert(txn, owner, key, payload).await?;
        }

        Ok(ReconcileOutcome {
            inserted: changes.to_insert.len(),
            updated: changes.to_update.len(),
            deleted: changes.to_delete.len(),
        })
    }
}
