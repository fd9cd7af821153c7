//! Error taxonomy shared by the whole pipeline.
//!
//! Two families of failure exist:
//!
//! - [`FilesystemError`]: a path that is missing, unreadable or uncreatable,
//!   or a copy that failed.
//! - [`ValidationError`]: input that is present but wrong: a malformed image
//!   filename, undecodable metadata, or options that break an operation's
//!   schema.
//!
//! Both fold into [`AppError`], the only error type the manager and the
//! operations return. `Manager::run` catches it at the operation boundary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("Directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("File does not exist: {0}")]
    MissingFile(PathBuf),
    #[error("No metadata file paired with image {0}")]
    MissingMetadata(PathBuf),
    #[error("Unable to {action} \"{path}\": {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error while copying \"{from}\" into \"{to}\": {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FilesystemError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Filename \"{filename}\" not valid: {reason}")]
    InvalidFilename {
        filename: String,
        reason: &'static str,
    },
    #[error("Metadata file \"{path}\" is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Metadata file \"{0}\" does not contain a JSON object")]
    NotAnObject(PathBuf),
    #[error("Metadata has no \"attributes\" list")]
    MissingAttributes,
    #[error("Option \"{name}\" is not defined for operation \"{operation}\"")]
    UnknownOption { operation: String, name: String },
    #[error("Option \"{name}\" is required by operation \"{operation}\"")]
    MissingOption { operation: String, name: String },
    #[error("Option \"{name}\" must be of type {expected}, got {found}")]
    InvalidOptionType {
        name: String,
        expected: String,
        found: String,
    },
    #[error("Option \"{name}\" has an invalid value: {reason}")]
    InvalidOptionValue { name: String, reason: String },
    #[error("Defining an option called \"{0}\" on an operation is forbidden")]
    ReservedOption(&'static str),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
