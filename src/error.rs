use std::path::PathBuf;

use crate::io::{FromFileError, ToFileError};

/// A failure that stops resolution of a target outright.
///
/// Problems the caller may choose to tolerate are not errors of this kind;
/// they are collected in `EffectiveOptions::errors` and `warnings` instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("could not find file {path:?}")]
    NotFound { path: PathBuf },

    #[error("invalid tsconfig setting {setting:?}")]
    InvalidSetting {
        setting: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    ProjectFile(FromFileError),

    #[error("cannot locate the directory of project file {path:?}")]
    ProjectFileLocation {
        path: PathBuf,
        #[source]
        source: crate::path::PivotError,
    },

    #[error("the tsconfig option overwriteFilesGlob is set to true, but no src glob was passed in")]
    MissingGlobs,

    #[error("error updating {path:?}")]
    UpdateProjectFile {
        path: PathBuf,
        #[source]
        source: ToFileError,
    },
}

impl Error {
    /// Whether the failure was a project file that does not exist, as
    /// opposed to one that exists but could not be used.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::ProjectFile(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// The operating system error number behind the failure, when there is one.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            Self::InvalidSetting { source, .. } => source.raw_os_error(),
            Self::ProjectFile(err) => match err.kind() {
                crate::io::FromFileErrorKind::Read(source) => source.raw_os_error(),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<FromFileError> for Error {
    fn from(err: FromFileError) -> Self {
        if err.is_not_found() {
            // avoid nesting this error to present a cleaner message
            return Self::NotFound {
                path: err.path().to_owned(),
            };
        }
        Self::ProjectFile(err)
    }
}
