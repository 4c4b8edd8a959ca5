use crate::error::CoreError;
use models::{
    file::Attachment,
    grade_parameter::{GradeParameterType, GradeWeight},
};
use std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
};

/// A family of associations reconciled as one set per owner
///
/// Keys are natural keys, never row ids, so the same desired set always diffs the same way.
pub trait AssociationKind: Send + Sync + 'static {
    type Owner: Display + Debug + Send + Sync + 'static;
    type Key: Ord + Clone + Display + Debug + Send + Sync + 'static;
    type Payload: PartialEq + Clone + Debug + Send + Sync + 'static;

    /// Singular name used in logs and errors
    const NAME: &'static str;
    /// Entity name reported when the owner does not exist
    const OWNER: &'static str;

    /// Rejects a desired set before any transaction is opened
    fn validate(_desired: &[(Self::Key, Self::Payload)]) -> Result<(), CoreError> {
        Ok(())
    }

    /// Whether a stored key takes part in reconciliation. Unmanaged rows are left untouched
    fn is_managed(_key: &Self::Key) -> bool {
        true
    }
}

/// Weighted scoring categories of a schedule
pub struct GradeParameters;

impl AssociationKind for GradeParameters {
    type Owner = i64;
    type Key = GradeParameterType;
    type Payload = GradeWeight;

    const NAME: &'static str = "grade parameter";
    const OWNER: &'static str = "schedule";

    fn validate(desired: &[(Self::Key, Self::Payload)]) -> Result<(), CoreError> {
        let mut seen = BTreeSet::new();

        for (grade_type, weight) in desired {
            if !grade_type.is_recognized() {
                return Err(CoreError::Validation(format!(
                    "unknown grade parameter type {grade_type}"
                )));
            }
            if !seen.insert(grade_type) {
                return Err(CoreError::Validation(format!(
                    "grade parameter type {grade_type} given more than once"
                )));
            }
            if !weight.percentage.is_finite() || !(0.0..=100.0).contains(&weight.percentage) {
                return Err(CoreError::Validation(format!(
                    "percentage of {grade_type} must be between 0 and 100, got {}",
                    weight.percentage
                )));
            }
        }

        Ok(())
    }

    fn is_managed(grade_type: &Self::Key) -> bool {
        grade_type.is_recognized()
    }
}

/// Assistant roster of a schedule
pub struct Assistants;

impl AssociationKind for Assistants {
    type Owner = i64;
    type Key = i64;
    type Payload = ();

    const NAME: &'static str = "assistant";
    const OWNER: &'static str = "schedule";

    fn validate(desired: &[(Self::Key, Self::Payload)]) -> Result<(), CoreError> {
        match desired.iter().find(|(user_id, _)| *user_id <= 0) {
            Some((user_id, _)) => Err(CoreError::Validation(format!(
                "invalid assistant user id {user_id}"
            ))),
            None => Ok(()),
        }
    }
}

/// Files attached to an assignment or a submission
pub struct FileAttachments;

impl AssociationKind for FileAttachments {
    type Owner = Attachment;
    type Key = String;
    type Payload = ();

    const NAME: &'static str = "file";
    const OWNER: &'static str = "attachment owner";

    fn validate(desired: &[(Self::Key, Self::Payload)]) -> Result<(), CoreError> {
        if desired.iter().any(|(file_id, _)| file_id.trim().is_empty()) {
            return Err(CoreError::Validation("file id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Upload extensions an assignment accepts
pub struct AllowedFileTypes;

impl AllowedFileTypes {
    /// Lower-cases and trims a type string, dropping a leading dot
    pub fn normalize(file_type: &str) -> String {
        file_type.trim().trim_start_matches('.').to_lowercase()
    }
}

impl AssociationKind for AllowedFileTypes {
    type Owner = i64;
    type Key = String;
    type Payload = ();

    const NAME: &'static str = "file type";
    const OWNER: &'static str = "assignment";

    fn validate(desired: &[(Self::Key, Self::Payload)]) -> Result<(), CoreError> {
        if desired.iter().any(|(file_type, _)| file_type.is_empty()) {
            return Err(CoreError::Validation("file type must not be empty".to_string()));
        }
        Ok(())
    }
}
