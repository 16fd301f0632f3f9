use iced::{
    widget::{button, column, container, pick_list, row, scrollable, text, text_input, Space},
    Alignment, Element, Length,
};

use crate::domain::{DownloadPhase, QualityPreset};
use crate::utils;

/// Main view state
pub struct DownloadView {
    pub url: String,
    pub output_directory: String,
    pub quality: QualityPreset,
    pub log_lines: Vec<String>,
    pub status_message: String,
    pub phase: DownloadPhase,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_directory: utils::default_output_directory()
                .to_string_lossy()
                .to_string(),
            quality: QualityPreset::default(),
            log_lines: Vec::new(),
            status_message: "Ready".to_string(),
            phase: DownloadPhase::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    OutputDirectoryChanged(String),
    QualitySelected(QualityPreset),
    BrowsePressed,
    DownloadPressed,
    ClearLogPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
            }
            DownloadMessage::OutputDirectoryChanged(directory) => {
                self.output_directory = directory;
            }
            DownloadMessage::QualitySelected(quality) => {
                self.quality = quality;
            }
            DownloadMessage::ClearLogPressed => {
                self.clear_log();
            }
            DownloadMessage::BrowsePressed | DownloadMessage::DownloadPressed => {
                // Handled by the app
            }
        }
    }

    pub fn append_log(&mut self, line: impl Into<String>) {
        self.log_lines.push(line.into());
    }

    pub fn clear_log(&mut self) {
        self.log_lines.clear();
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let busy = self.phase.is_busy();

        let url_row = row![
            text("Video URL:").size(14),
            text_input("Paste the video URL...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(8),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let output_row = row![
            text("Output folder:").size(14),
            text_input("Folder for downloaded files...", &self.output_directory)
                .on_input(DownloadMessage::OutputDirectoryChanged)
                .padding(8),
            button("Browse...")
                .on_press(DownloadMessage::BrowsePressed)
                .padding(8),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let options_row = row![
            text("Format/Quality:").size(14),
            pick_list(
                &QualityPreset::ALL[..],
                Some(self.quality),
                DownloadMessage::QualitySelected,
            )
            .padding(8),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let buttons_row = row![
            button("Download")
                .on_press_maybe(if busy {
                    None
                } else {
                    Some(DownloadMessage::DownloadPressed)
                })
                .padding([8, 20]),
            button("Clear log")
                .on_press(DownloadMessage::ClearLogPressed)
                .padding([8, 20]),
        ]
        .spacing(8);

        let log_lines: Vec<Element<'_, DownloadMessage>> = self
            .log_lines
            .iter()
            .map(|line| text(line).size(13).into())
            .collect();

        let log_view = scrollable(column(log_lines).spacing(2))
            .width(Length::Fill)
            .height(Length::Fill)
            .anchor_bottom();

        column![
            url_row,
            output_row,
            options_row,
            buttons_row,
            Space::new().height(Length::Fixed(4.0)),
            container(log_view).width(Length::Fill).height(Length::Fill),
            text(&self.status_message).size(14),
        ]
        .padding(16)
        .spacing(10)
        .into()
    }
}
