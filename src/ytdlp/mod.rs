pub mod command;
pub mod progress;

pub use command::{locate_downloader, spawn_downloader};
pub use progress::{parse_progress_line, ProgressEvent, ProgressPhase};
