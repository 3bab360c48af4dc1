use flowr_core::{ShellCommand, WindowBounds};
use tauri::{AppHandle, Manager, Window};

use crate::{KioskState, WindowGeometry, MAIN_WINDOW_LABEL};

/// Which controller commands a geometry change needs. Fullscreen sizes are never stored, and a
/// maximized window keeps the last restored bounds.
fn geometry_commands(
    previous: Option<WindowGeometry>,
    current: WindowGeometry,
    fullscreen: bool,
) -> Vec<ShellCommand> {
    let mut commands = Vec::new();
    if fullscreen {
        return commands;
    }
    if previous.map(|geometry| geometry.maximized) != Some(current.maximized) {
        commands.push(ShellCommand::MaximizedChanged(current.maximized));
    }
    if !current.maximized && previous.map(|geometry| geometry.bounds) != Some(current.bounds) {
        commands.push(ShellCommand::WindowResized(current.bounds));
    }
    commands
}

pub fn remember_window_geometry<F>(window: &Window, log: F)
where
    F: Fn(&str),
{
    let app_handle = window.app_handle();
    let Some(state) = app_handle.try_state::<KioskState>() else {
        return;
    };

    let logical_size = window.inner_size().and_then(|size| {
        window
            .scale_factor()
            .map(|scale_factor| size.to_logical::<u32>(scale_factor))
    });
    let size = match logical_size {
        Ok(size) => size,
        Err(error) => {
            log(&format!("failed to read main window size: {error}"));
            return;
        }
    };
    let current = WindowGeometry {
        bounds: WindowBounds {
            width: size.width,
            height: size.height,
        },
        maximized: window.is_maximized().unwrap_or(false),
    };
    let fullscreen = window.is_fullscreen().unwrap_or(false);
    let previous = state.replace_geometry(current);

    for command in geometry_commands(previous, current, fullscreen) {
        if let Err(error) = state.controller.command(command) {
            log(&format!("failed to forward window geometry: {error}"));
        }
    }
}

pub fn focus_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("focus_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}
