use thiserror::Error;

pub use crate::{data::DataError, search::SearchError};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Search error: {0}")]
    Search(#[from] crate::search::SearchError),
    #[error("Data error: {0}")]
    Data(#[from] crate::data::DataError),
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
