use thiserror::Error;

use crate::tooth::ToothId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid tooth id: {0:?}")]
    InvalidToothId(String),
    #[error("invalid surface code: {0:?}")]
    InvalidSurfaceCode(String),
    #[error("unknown condition key: {0:?}")]
    UnknownCondition(String),
    #[error("invalid dentition mode: {0:?}")]
    InvalidDentitionMode(String),
    #[error("tooth {0} is not present in the chart")]
    UnknownTooth(ToothId),
    #[error("condition key {0:?} is defined more than once")]
    DuplicateConditionKey(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
