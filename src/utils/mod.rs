use std::path::PathBuf;

/// Where downloads land when the output field is left blank.
pub fn default_output_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Human readable transfer speed for log lines.
pub fn format_speed(bytes_per_sec: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;

    if bytes_per_sec >= MIB {
        format!("{:.2} MiB/s", bytes_per_sec / MIB)
    } else if bytes_per_sec >= KIB {
        format!("{:.1} KiB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.0} B/s", bytes_per_sec)
    }
}

/// Display name for the host a URL points at.
pub fn source_label(raw_url: &str) -> &'static str {
    let parsed = match url::Url::parse(raw_url) {
        Ok(parsed) => parsed,
        Err(_) => return "Web",
    };

    match parsed.host_str().map(|host| host.to_lowercase()).as_deref() {
        Some(host) if host.contains("youtube") || host.contains("youtu.be") => "YouTube",
        Some(host) if host.contains("vimeo") => "Vimeo",
        Some(host) if host.contains("twitch") => "Twitch",
        Some(host) if host.contains("tiktok") => "TikTok",
        Some(host) if host.contains("instagram") => "Instagram",
        _ => "Web",
    }
}
