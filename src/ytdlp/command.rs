use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, Command};

use crate::domain::JobRequest;

const YTDLP_BIN: &str = "yt-dlp";
const PROGRESS_TEMPLATE: &str = "%(progress)j";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("yt-dlp was not found. Install it and make sure it is on PATH.")]
    MissingBinary(#[from] which::Error),

    #[error("Failed to start yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Finds the downloader executable on PATH.
pub fn locate_downloader() -> Result<PathBuf> {
    Ok(which::which(YTDLP_BIN)?)
}

/// Command line for one job. The URL always goes last.
pub fn download_args(job: &JobRequest) -> Vec<String> {
    let output_template = job
        .output_directory
        .join("%(title)s.%(ext)s")
        .to_string_lossy()
        .to_string();

    vec![
        "-f".to_string(),
        job.quality.format_spec().to_string(),
        "-o".to_string(),
        output_template,
        "--no-playlist".to_string(),
        "--quiet".to_string(),
        "--no-warnings".to_string(),
        "--progress".to_string(),
        "--newline".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "--recode-video".to_string(),
        "mp4".to_string(),
        job.url.clone(),
    ]
}

/// Spawns the downloader with piped output for progress streaming.
pub fn spawn_downloader(binary: &Path, job: &JobRequest) -> Result<Child> {
    let args = download_args(job);
    log::debug!("yt-dlp command: {} {}", binary.display(), args.join(" "));

    let child = Command::new(binary)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    Ok(child)
}
