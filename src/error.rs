use thiserror::Error;

use crate::core::LayoutStage;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("no data handler registered under name `{name}`")]
    UnknownHandler { name: String },

    #[error("layout step requires stage {expected:?}, current stage is {actual:?}")]
    InvalidLayoutStage {
        expected: LayoutStage,
        actual: LayoutStage,
    },
}
