use crate::application::{DownloadCoordinator, DownloadEvent};
use crate::domain::{AppError, DownloadPhase, JobRequest};
use crate::ui::{DownloadMessage, DownloadView};
use crate::utils;
use crate::ytdlp::{ProgressEvent, ProgressPhase};
use futures::StreamExt;
use iced::Task;
use std::path::PathBuf;

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    // High-water mark so displayed progress never moves backwards
    peak_percent: f64,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        Self {
            view: DownloadView::default(),
            coordinator: DownloadCoordinator::new(),
            peak_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Folder chosen in the native dialog, `None` on cancel
    OutputDirectoryPicked(Option<PathBuf>),
    /// One lifecycle event from the active download
    Worker(DownloadEvent),
    /// A warning or error dialog was dismissed
    NoticeClosed,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::BrowsePressed => return browse_output_directory(app),
                DownloadMessage::DownloadPressed => return submit_job(app),
                _ => {}
            }
        }
        Message::OutputDirectoryPicked(selection) => {
            if let Some(path) = selection {
                app.view.output_directory = path.to_string_lossy().to_string();
            }
        }
        Message::Worker(event) => return handle_worker_event(app, event),
        Message::NoticeClosed => {}
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

fn browse_output_directory(app: &DownloadApp) -> Task<Message> {
    let seed = if app.view.output_directory.trim().is_empty() {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(app.view.output_directory.trim())
    };

    Task::perform(
        async move {
            rfd::AsyncFileDialog::new()
                .set_directory(&seed)
                .pick_folder()
                .await
                .map(|handle| handle.path().to_path_buf())
        },
        Message::OutputDirectoryPicked,
    )
}

fn submit_job(app: &mut DownloadApp) -> Task<Message> {
    if app.view.phase.is_busy() {
        return Task::none();
    }

    let url = app.view.url.trim().to_string();
    if url.is_empty() {
        return show_notice(
            rfd::MessageLevel::Warning,
            "Missing URL",
            &AppError::Validation.to_string(),
        );
    }

    let output_directory = if app.view.output_directory.trim().is_empty() {
        utils::default_output_directory()
    } else {
        PathBuf::from(app.view.output_directory.trim())
    };

    if let Err(e) = std::fs::create_dir_all(&output_directory) {
        let error = AppError::Directory {
            path: output_directory,
            cause: e.to_string(),
        };
        return show_notice(rfd::MessageLevel::Error, "Folder error", &error.to_string());
    }

    let job = JobRequest {
        url: url.clone(),
        output_directory,
        quality: app.view.quality,
    };

    app.view.phase = DownloadPhase::Starting;
    app.peak_percent = 0.0;
    app.view.status_message = "Starting...".to_string();
    app.view.append_log(format!(
        "Starting download from {}: {}",
        utils::source_label(&url),
        url
    ));
    log::info!("dispatching download for {}", url);

    Task::stream(app.coordinator.download_stream(job).map(Message::Worker))
}

fn handle_worker_event(app: &mut DownloadApp, event: DownloadEvent) -> Task<Message> {
    match event {
        DownloadEvent::Started => {
            log::debug!("downloader process started");
        }
        DownloadEvent::Progress(progress) => handle_progress(app, progress),
        DownloadEvent::Completed(output_directory) => {
            app.view.phase = DownloadPhase::Completed;
            app.view.status_message = "Completed".to_string();
            app.view.append_log(format!(
                "Download finished successfully. Files are in {}",
                output_directory.display()
            ));
        }
        DownloadEvent::Failed(error) => {
            app.view.phase = DownloadPhase::Failed;
            app.view.status_message = "Error".to_string();
            app.view
                .append_log(format!("Error during download: {}", error));
            log::error!("download failed: {}", error);
        }
    }
    Task::none()
}

fn handle_progress(app: &mut DownloadApp, progress: ProgressEvent) {
    match progress.status {
        ProgressPhase::Downloading => {
            app.view.phase = DownloadPhase::Downloading;

            if let Some(percent) = progress.completion_percent() {
                if percent > app.peak_percent {
                    app.peak_percent = percent;
                }
                let shown = app.peak_percent;

                let eta = match progress.eta_seconds() {
                    Some(eta) => eta.to_string(),
                    None => "?".to_string(),
                };
                app.view.status_message = format!("Downloading: {:.1}% - ETA {}s", shown, eta);

                let speed = match progress.speed {
                    Some(speed) => utils::format_speed(speed),
                    None => "-".to_string(),
                };
                let filename = progress.filename.as_deref().unwrap_or("");
                app.view
                    .append_log(format!("{} - {:.1}% - {}", filename, shown, speed));
            }
        }
        ProgressPhase::Finished => {
            app.view.phase = DownloadPhase::Finalizing;
            app.view.status_message = "Merging/Finalizing...".to_string();
            app.view.append_log("Download finished. Finalizing...");
        }
        ProgressPhase::Error => {
            app.view.status_message = "Error".to_string();
            app.view.append_log("The downloader reported an error");
        }
    }
}

fn show_notice(level: rfd::MessageLevel, title: &str, description: &str) -> Task<Message> {
    let title = title.to_string();
    let description = description.to_string();

    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(level)
                .set_title(&title)
                .set_description(&description)
                .show()
                .await;
        },
        |_| Message::NoticeClosed,
    )
}
