use serde::Deserialize;

/// One progress record printed by the downloader per refresh.
///
/// The process is started with `--progress-template %(progress)j`, so each
/// record arrives as a single JSON object on its own stdout line. Byte counts
/// and the ETA may be reported as floats.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressPhase,
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes_estimate: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub eta: Option<f64>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    Downloading,
    Finished,
    Error,
}

impl ProgressEvent {
    /// Effective total, preferring the exact size over the estimate.
    /// A reported total of zero counts as absent.
    pub fn effective_total_bytes(&self) -> Option<f64> {
        self.total_bytes
            .filter(|total| *total > 0.0)
            .or(self.total_bytes_estimate)
    }

    /// Completion in percent, `None` when the byte counts cannot support it.
    pub fn completion_percent(&self) -> Option<f64> {
        let downloaded = self.downloaded_bytes?;
        let total = self.effective_total_bytes()?;
        if total <= 0.0 {
            return None;
        }
        Some((downloaded / total * 100.0).clamp(0.0, 100.0))
    }

    pub fn eta_seconds(&self) -> Option<u64> {
        self.eta.map(|eta| eta.round() as u64)
    }
}

/// Decodes one stdout line into a progress record, skipping anything else.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
