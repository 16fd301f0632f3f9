use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Submit pressed with an empty URL field.
    #[error("Paste the video URL before starting the download.")]
    Validation,

    /// Output directory missing and not creatable.
    #[error("Cannot create or access the folder:\n{}\n\n{}", .path.display(), .cause)]
    Directory { path: PathBuf, cause: String },

    /// The external downloader reported a failure.
    #[error("{0}")]
    Download(String),
}
