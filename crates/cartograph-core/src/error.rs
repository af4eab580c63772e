use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid entity label: {0}")]
    InvalidEntityLabel(String),

    #[error("Invalid relation label: {0}")]
    InvalidRelationLabel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
