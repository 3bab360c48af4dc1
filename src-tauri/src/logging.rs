use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{DESKTOP_LOG_FILE, DESKTOP_LOG_MAX_BYTES, LOG_DIR_NAME};

pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        eprintln!("logger already initialized");
    }
}

pub fn resolve_desktop_log_path(data_dir: Option<PathBuf>, log_file_name: &str) -> PathBuf {
    data_dir
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_DIR_NAME)
        .join(log_file_name)
}

fn rotate_if_oversized(path: &Path) {
    let Ok(metadata) = fs::metadata(path) else {
        return;
    };
    if metadata.len() < DESKTOP_LOG_MAX_BYTES {
        return;
    }
    let rotated = path.with_extension("log.1");
    if let Err(error) = fs::rename(path, &rotated) {
        log::warn!("failed to rotate desktop log {}: {error}", path.display());
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir)?;
    }
    rotate_if_oversized(path);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

fn format_log_line(scope: &str, message: &str) -> String {
    format!(
        "[{}] [{scope}] {message}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
    )
}

fn append_scoped_log(scope: &str, message: &str) {
    log::info!(target: "flowr_desktop", "[{scope}] {message}");
    let path = resolve_desktop_log_path(
        flowr_core::store::default_data_dir().ok(),
        DESKTOP_LOG_FILE,
    );
    if let Err(error) = append_line(&path, &format_log_line(scope, message)) {
        log::warn!("failed to write desktop log {}: {error}", path.display());
    }
}

pub fn append_desktop_log(message: &str) {
    append_scoped_log("desktop", message);
}

pub fn append_startup_log(message: &str) {
    append_scoped_log("startup", message);
}
