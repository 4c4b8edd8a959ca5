use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

#[cfg(feature = "database")]
use sea_orm::Value;

/// Scoring category a grade parameter weighs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GradeParameterType {
    Attendance,
    Assignment,
    Quiz,
    Mid,
    Final,
    /// A stored type string outside the known set, kept verbatim
    Unrecognized(String),
}

impl GradeParameterType {
    /// Every category the aggregator knows how to score
    pub const KNOWN: [Self; 5] = [
        Self::Attendance,
        Self::Assignment,
        Self::Quiz,
        Self::Mid,
        Self::Final,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Attendance => "ATTENDANCE",
            Self::Assignment => "ASSIGNMENT",
            Self::Quiz => "QUIZ",
            Self::Mid => "MID",
            Self::Final => "FINAL",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Human readable label, as offered in parameter pickers
    pub fn label(&self) -> &str {
        match self {
            Self::Attendance => "Attendance",
            Self::Assignment => "Assignment",
            Self::Quiz => "Quiz",
            Self::Mid => "Mid Exam",
            Self::Final => "Final Exam",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    fn known(s: &str) -> Option<Self> {
        match s {
            "ATTENDANCE" => Some(Self::Attendance),
            "ASSIGNMENT" => Some(Self::Assignment),
            "QUIZ" => Some(Self::Quiz),
            "MID" => Some(Self::Mid),
            "FINAL" => Some(Self::Final),
            _ => None,
        }
    }
}

impl FromStr for GradeParameterType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::known(s).unwrap_or_else(|| Self::Unrecognized(s.to_owned())))
    }
}

impl From<String> for GradeParameterType {
    fn from(s: String) -> Self {
        Self::known(&s).unwrap_or(Self::Unrecognized(s))
    }
}

impl From<GradeParameterType> for String {
    fn from(grade_type: GradeParameterType) -> Self {
        match grade_type {
            GradeParameterType::Unrecognized(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for GradeParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for GradeParameterType {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => Ok(Self::from(*s)),
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "GradeParameterType".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Text
    }
}

#[cfg(feature = "database")]
impl From<GradeParameterType> for Value {
    fn from(grade_type: GradeParameterType) -> Self {
        Value::String(Some(Box::new(grade_type.into())))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for GradeParameterType {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;
        Ok(Self::from(val))
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for GradeParameterType {
    fn null() -> Value {
        Value::String(None)
    }
}

/// A weighted scoring category attached to a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeParameter {
    pub id: i64,
    pub schedule_id: i64,
    pub grade_type: GradeParameterType,
    /// Weight in percent, nominally 0-100
    pub percentage: f64,
    pub status_change: bool,
}

/// Reconcilable payload of a grade parameter, keyed by its type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeWeight {
    pub percentage: f64,
    pub status_change: bool,
}

impl GradeParameter {
    pub fn weight(&self) -> GradeWeight {
        GradeWeight {
            percentage: self.percentage,
            status_change: self.status_change,
        }
    }
}
