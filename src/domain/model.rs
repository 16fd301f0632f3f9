use std::fmt;
use std::path::PathBuf;

/// One user-initiated download, immutable once dispatched.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub url: String,
    pub output_directory: PathBuf,
    pub quality: QualityPreset,
}

/// Entries of the Format/Quality dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPreset {
    BestCombined,
    BestSplit,
    AudioOnly,
    VideoOnly,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 4] = [
        QualityPreset::BestCombined,
        QualityPreset::BestSplit,
        QualityPreset::AudioOnly,
        QualityPreset::VideoOnly,
    ];

    /// Format selector handed to the downloader via `-f`.
    pub fn format_spec(self) -> &'static str {
        match self {
            QualityPreset::AudioOnly => "bestaudio",
            QualityPreset::BestCombined => "bestvideo+bestaudio/best",
            QualityPreset::VideoOnly => "bestvideo",
            QualityPreset::BestSplit => "best",
        }
    }
}

impl Default for QualityPreset {
    fn default() -> Self {
        QualityPreset::BestCombined
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityPreset::BestCombined => "bestvideo+bestaudio (best quality)",
            QualityPreset::BestSplit => "best (best single file)",
            QualityPreset::AudioOnly => "bestaudio (audio only)",
            QualityPreset::VideoOnly => "bestvideo (video only)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Starting,
    Downloading,
    Finalizing,
    Completed,
    Failed,
}

impl DownloadPhase {
    /// A job is in flight and the submit control stays disabled.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            DownloadPhase::Starting | DownloadPhase::Downloading | DownloadPhase::Finalizing
        )
    }
}
