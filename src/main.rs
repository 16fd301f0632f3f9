mod app;
mod application;
mod domain;
mod ui;
mod utils;
mod ytdlp;

use iced::{window, Size};

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let icon_data = include_bytes!("../assets/icon.png");

    let icon = match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(_) => None,
    };

    log::info!("starting simple video downloader");

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("Simple Video Downloader")
        .window(window::Settings {
            icon,
            size: Size::new(700.0, 420.0),
            resizable: false,
            ..Default::default()
        })
        .run()
}
