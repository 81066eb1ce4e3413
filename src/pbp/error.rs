use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PbpError>;

#[derive(Error, Debug)]
pub enum PbpError {
    #[error("input is missing required column '{0}'")]
    MissingColumn(String),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid duration bounds '{0}', expected something like '90,180'")]
    InvalidBounds(String),
    #[error("unrecognized input layout, found columns {0:?}")]
    UnknownLayout(Vec<String>),
}
