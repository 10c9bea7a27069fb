use std::io;
use std::path::Path;

use thiserror::Error;

use crate::escape::EscapeError;

/// Classification of a [`GetterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Module or version absent from this backing store
    NotFound,
    /// Backing store content violates the expected layout
    BadModule,
    /// Any other failure, passed through with its original detail
    Other,
}

#[derive(Debug, Error)]
pub enum GetterError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad module: {0}")]
    BadModule(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid module path or version: {0}")]
    InvalidPath(#[from] EscapeError),

    #[error("operation cancelled")]
    Cancelled,
}

impl GetterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GetterError::NotFound(_) => ErrorKind::NotFound,
            GetterError::BadModule(_) => ErrorKind::BadModule,
            GetterError::Io(_)
            | GetterError::Archive(_)
            | GetterError::InvalidPath(_)
            | GetterError::Cancelled => ErrorKind::Other,
        }
    }

    /// Reports whether this failure is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    pub fn is_not_found(&self) -> bool {
        self.is(ErrorKind::NotFound)
    }

    pub fn is_bad_module(&self) -> bool {
        self.is(ErrorKind::BadModule)
    }

    /// Translates a file read failure: only "does not exist" becomes
    /// [`GetterError::NotFound`], everything else passes through unchanged.
    pub(crate) fn from_read(err: io::Error, path: &Path) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            GetterError::NotFound(path.display().to_string())
        } else {
            GetterError::Io(err)
        }
    }
}
