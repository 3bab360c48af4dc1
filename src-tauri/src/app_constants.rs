pub const MAIN_WINDOW_LABEL: &str = "main";
pub const WINDOW_TITLE: &str = "FlowR";
pub const MIN_WINDOW_WIDTH: f64 = 430.0;
pub const MIN_WINDOW_HEIGHT: f64 = 270.0;

pub const LOG_DIR_NAME: &str = "logs";
pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DESKTOP_LOG_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// Origin the bundled `pages/` directory is served from.
#[cfg(target_os = "windows")]
pub const PACKAGED_PAGES_BASE_URL: &str = "http://tauri.localhost/";
#[cfg(not(target_os = "windows"))]
pub const PACKAGED_PAGES_BASE_URL: &str = "tauri://localhost/";
