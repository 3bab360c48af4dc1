#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod desktop_bridge;
mod desktop_bridge_commands;
mod logging;
mod main_window;
mod menu_actions;
mod menu_handler;
mod menu_setup;
mod process_control;
mod window_actions;

pub(crate) use app_constants::*;
pub(crate) use app_types::{BridgeResult, KioskState, WindowGeometry};
pub(crate) use logging::{append_desktop_log, append_startup_log};

fn main() {
    app_runtime::run();
}
