use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop an upload run or one iteration of it.
///
/// `QuotaExceeded` and `EmptySelection` only abandon the current selection;
/// every other kind ends the run. See [`UploaderError::is_fatal`].
#[derive(Debug, Error)]
pub enum UploaderError {
    #[error("token file '{}' is missing or empty, create it and store your token in it", path.display())]
    MissingCredential { path: PathBuf },

    #[error("invalid token: {0}")]
    InvalidCredential(String),

    #[error(
        "limits exceeded: {photos} photos / {bytes} bytes selected, allowed {limit_photos} photos / {limit_bytes} bytes"
    )]
    QuotaExceeded {
        photos: u64,
        bytes: u64,
        limit_photos: u64,
        limit_bytes: u64,
    },

    #[error("no images found in the selected folders")]
    EmptySelection,

    #[error("could not write archive: {0}")]
    ArchiveWriteFailed(String),

    #[error("could not create project: {0}")]
    ProjectCreationFailed(String),

    #[error("could not upload part {index}: {reason}")]
    UploadFailed { index: usize, reason: String },

    #[error("could not start processing: {0}")]
    StartFailed(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploaderError {
    /// Whether the error must end the run rather than just the iteration.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            UploaderError::QuotaExceeded { .. } | UploaderError::EmptySelection
        )
    }
}

pub type Result<T> = std::result::Result<T, UploaderError>;
