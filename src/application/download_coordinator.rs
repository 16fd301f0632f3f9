use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::ExitStatus;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::task::JoinHandle;

use crate::{
    domain::{AppError, JobRequest},
    ytdlp,
};

/// Lines of stderr kept for failure reporting.
const STDERR_TAIL_LINES: usize = 200;

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// The downloader process is up and its output is being streamed.
    Started,
    Progress(ytdlp::ProgressEvent),
    Completed(PathBuf),
    Failed(AppError),
}

#[derive(Clone, Default)]
pub struct DownloadCoordinator {
    /// Explicit downloader executable; `None` means search PATH per job.
    downloader: Option<PathBuf>,
}

impl DownloadCoordinator {
    pub fn new() -> Self {
        Self { downloader: None }
    }

    #[cfg(test)]
    pub fn with_downloader(path: PathBuf) -> Self {
        Self {
            downloader: Some(path),
        }
    }

    /// Runs one job to its terminal event.
    ///
    /// Emits `Started`, then one `Progress` per parsed output line, and ends
    /// with exactly one `Completed` or `Failed` on every path, including
    /// spawn errors. The caller relies on the terminal event to re-enable
    /// the submit control.
    pub fn download_stream(&self, job: JobRequest) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            DownloadRuntimeState::Start {
                downloader: self.downloader.clone(),
                job,
            },
            |state| async move {
                match state {
                    DownloadRuntimeState::Start { downloader, job } => {
                        let binary = match downloader {
                            Some(binary) => binary,
                            None => match ytdlp::locate_downloader() {
                                Ok(binary) => binary,
                                Err(e) => {
                                    return Some((
                                        DownloadEvent::Failed(AppError::Download(e.to_string())),
                                        DownloadRuntimeState::Finished,
                                    ));
                                }
                            },
                        };

                        let mut child = match ytdlp::spawn_downloader(&binary, &job) {
                            Ok(child) => child,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Download(e.to_string())),
                                    DownloadRuntimeState::Finished,
                                ));
                            }
                        };

                        let stdout = match child.stdout.take() {
                            Some(stdout) => stdout,
                            None => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Download(
                                        "downloader stdout unavailable".to_string(),
                                    )),
                                    DownloadRuntimeState::Finished,
                                ));
                            }
                        };

                        let stderr_task = child.stderr.take().map(collect_stderr_tail);

                        log::info!("downloader started for {}", job.url);

                        Some((
                            DownloadEvent::Started,
                            DownloadRuntimeState::Streaming {
                                lines: BufReader::new(stdout).lines(),
                                child,
                                stderr_task,
                                output_directory: job.output_directory,
                            },
                        ))
                    }
                    DownloadRuntimeState::Streaming {
                        mut lines,
                        mut child,
                        stderr_task,
                        output_directory,
                    } => loop {
                        let line = match lines.next_line().await {
                            Ok(line) => line,
                            Err(e) => {
                                log::warn!("failed to read downloader output: {}", e);
                                None
                            }
                        };

                        match line {
                            Some(line) => {
                                log::debug!("yt-dlp stdout: {}", line);
                                if let Some(event) = ytdlp::parse_progress_line(&line) {
                                    break Some((
                                        DownloadEvent::Progress(event),
                                        DownloadRuntimeState::Streaming {
                                            lines,
                                            child,
                                            stderr_task,
                                            output_directory,
                                        },
                                    ));
                                }
                            }
                            None => {
                                let status = match child.wait().await {
                                    Ok(status) => status,
                                    Err(e) => {
                                        break Some((
                                            DownloadEvent::Failed(AppError::Download(format!(
                                                "downloader process failed: {}",
                                                e
                                            ))),
                                            DownloadRuntimeState::Finished,
                                        ));
                                    }
                                };

                                let stderr_tail = match stderr_task {
                                    Some(handle) => handle.await.unwrap_or_default(),
                                    None => Vec::new(),
                                };

                                let event = if status.success() {
                                    DownloadEvent::Completed(output_directory)
                                } else {
                                    DownloadEvent::Failed(AppError::Download(condense_failure(
                                        &stderr_tail,
                                        status,
                                    )))
                                };

                                break Some((event, DownloadRuntimeState::Finished));
                            }
                        }
                    },
                    DownloadRuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

/// Drains stderr in the background, keeping the last lines for diagnostics.
fn collect_stderr_tail(stderr: ChildStderr) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut tail = VecDeque::new();
        let mut lines = BufReader::new(stderr).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            log::debug!("yt-dlp stderr: {}", line);
            tail.push_back(line);
            if tail.len() > STDERR_TAIL_LINES {
                tail.pop_front();
            }
        }

        Vec::from(tail)
    })
}

/// Picks the most telling failure message out of the stderr tail.
fn condense_failure(stderr_tail: &[String], status: ExitStatus) -> String {
    if let Some(line) = stderr_tail.iter().rev().find(|line| line.starts_with("ERROR:")) {
        return line.clone();
    }

    if let Some(line) = stderr_tail.iter().rev().find(|line| !line.trim().is_empty()) {
        return line.clone();
    }

    format!("downloader exited with status: {}", status)
}

enum DownloadRuntimeState {
    Start {
        downloader: Option<PathBuf>,
        job: JobRequest,
    },
    Streaming {
        lines: Lines<BufReader<ChildStdout>>,
        child: Child,
        stderr_task: Option<JoinHandle<Vec<String>>>,
        output_directory: PathBuf,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QualityPreset;
    use crate::ytdlp::ProgressPhase;

    fn job(output_directory: &std::path::Path) -> JobRequest {
        JobRequest {
            url: "https://www.youtube.com/watch?v=abc123".to_string(),
            output_directory: output_directory.to_path_buf(),
            quality: QualityPreset::BestCombined,
        }
    }

    fn terminal_count(events: &[DownloadEvent]) -> usize {
        events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    DownloadEvent::Completed(_) | DownloadEvent::Failed(_)
                )
            })
            .count()
    }

    #[cfg(unix)]
    fn fake_downloader(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-yt-dlp");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        write!(file, "{}", body).unwrap();
        drop(file);

        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stream_reports_progress_then_completion() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_downloader(
            dir.path(),
            concat!(
                "echo '{\"status\": \"downloading\", \"downloaded_bytes\": 512, \"total_bytes\": 1024, \"speed\": 256.0, \"eta\": 2}'\n",
                "echo '{\"status\": \"finished\", \"filename\": \"clip.mp4\"}'\n",
                "exit 0\n"
            ),
        );

        let coordinator = DownloadCoordinator::with_downloader(binary);
        let events: Vec<DownloadEvent> =
            coordinator.download_stream(job(dir.path())).collect().await;

        assert!(matches!(events[0], DownloadEvent::Started));
        assert!(matches!(
            events[1],
            DownloadEvent::Progress(ref event) if event.status == ProgressPhase::Downloading
        ));
        assert!(matches!(
            events[2],
            DownloadEvent::Progress(ref event) if event.status == ProgressPhase::Finished
        ));
        assert!(matches!(events[3], DownloadEvent::Completed(_)));
        assert_eq!(terminal_count(&events), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stream_skips_chatter_between_progress_records() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_downloader(
            dir.path(),
            concat!(
                "echo '[download] Destination: clip.mp4'\n",
                "echo '{\"status\": \"downloading\", \"downloaded_bytes\": 256, \"total_bytes\": 1024}'\n",
                "exit 0\n"
            ),
        );

        let coordinator = DownloadCoordinator::with_downloader(binary);
        let events: Vec<DownloadEvent> =
            coordinator.download_stream(job(dir.path())).collect().await;

        let progress = events
            .iter()
            .filter(|event| matches!(event, DownloadEvent::Progress(_)))
            .count();
        assert_eq!(progress, 1);
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stream_condenses_stderr_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_downloader(
            dir.path(),
            concat!(
                "echo 'WARNING: something minor' >&2\n",
                "echo 'ERROR: network timeout' >&2\n",
                "exit 1\n"
            ),
        );

        let coordinator = DownloadCoordinator::with_downloader(binary);
        let events: Vec<DownloadEvent> =
            coordinator.download_stream(job(dir.path())).collect().await;

        assert_eq!(terminal_count(&events), 1);
        match events.last() {
            Some(DownloadEvent::Failed(AppError::Download(message))) => {
                assert!(message.contains("network timeout"), "got: {}", message);
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stream_reports_exit_status_when_stderr_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_downloader(dir.path(), "exit 3\n");

        let coordinator = DownloadCoordinator::with_downloader(binary);
        let events: Vec<DownloadEvent> =
            coordinator.download_stream(job(dir.path())).collect().await;

        match events.last() {
            Some(DownloadEvent::Failed(AppError::Download(message))) => {
                assert!(message.contains("exited with status"), "got: {}", message);
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stream_fails_when_the_downloader_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator =
            DownloadCoordinator::with_downloader(dir.path().join("no-such-downloader"));

        let events: Vec<DownloadEvent> =
            coordinator.download_stream(job(dir.path())).collect().await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DownloadEvent::Failed(_)));
    }

    #[test]
    fn test_condense_failure_prefers_the_last_error_line() {
        let tail = vec![
            "ERROR: first problem".to_string(),
            "some context".to_string(),
            "ERROR: final problem".to_string(),
            "   ".to_string(),
        ];
        let message = condense_failure(&tail, fake_status(1));
        assert_eq!(message, "ERROR: final problem");
    }

    #[test]
    fn test_condense_failure_falls_back_to_the_last_text_line() {
        let tail = vec!["no error prefix here".to_string(), String::new()];
        let message = condense_failure(&tail, fake_status(1));
        assert_eq!(message, "no error prefix here");
    }

    #[test]
    fn test_condense_failure_reports_the_exit_status_when_silent() {
        let message = condense_failure(&[], fake_status(1));
        assert!(message.contains("exited with status"));
    }

    #[cfg(unix)]
    fn fake_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(not(unix))]
    fn fake_status(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}
