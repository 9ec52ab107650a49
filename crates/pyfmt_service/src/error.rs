use std::path::PathBuf;

use pyfmt_core::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}: file is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
