use flowr_core::{ConfigStore, DisplaySurface};
use tauri::{menu::Menu, App, WebviewUrl, WebviewWindow, WebviewWindowBuilder, Wry};
use url::Url;

use crate::{
    append_desktop_log, desktop_bridge::BRIDGE_SCRIPT, MAIN_WINDOW_LABEL, MIN_WINDOW_HEIGHT,
    MIN_WINDOW_WIDTH, WINDOW_TITLE,
};

/// Placeholder shown until the controller resolves the first destination.
const BOOT_PAGE: &str = "noconnection.html";

pub(crate) fn create_main_window(
    app: &App,
    store: &ConfigStore,
    menu: Menu<Wry>,
) -> Result<WebviewWindow, String> {
    let bounds = store.window_bounds();
    let kiosk = store.is_kiosk();

    let boot_url = WebviewUrl::App(BOOT_PAGE.into());
    let window = WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, boot_url)
        .title(WINDOW_TITLE)
        .inner_size(f64::from(bounds.width), f64::from(bounds.height))
        .min_inner_size(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
        .fullscreen(kiosk)
        .always_on_top(kiosk)
        .menu(menu)
        .initialization_script(BRIDGE_SCRIPT)
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))?;

    if let Err(error) = window.hide_menu() {
        append_desktop_log(&format!("failed to hide operator menu: {error}"));
    }
    if store.is_maximized() && !kiosk {
        if let Err(error) = window.maximize() {
            append_desktop_log(&format!("failed to restore maximized window: {error}"));
        }
    }

    Ok(window)
}

pub(crate) struct TauriDisplaySurface {
    window: WebviewWindow,
}

impl TauriDisplaySurface {
    pub(crate) fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

impl DisplaySurface for TauriDisplaySurface {
    fn load_url(&self, url: &Url) {
        append_desktop_log(&format!("loading {url}"));
        if let Err(error) = self.window.navigate(url.clone()) {
            append_desktop_log(&format!("failed to load {url}: {error}"));
        }
    }

    fn set_devtools_open(&self, open: bool) {
        if open {
            self.window.open_devtools();
        } else {
            self.window.close_devtools();
        }
    }

    fn set_menu_visible(&self, visible: bool) {
        let result = if visible {
            self.window.show_menu()
        } else {
            self.window.hide_menu()
        };
        if let Err(error) = result {
            append_desktop_log(&format!("failed to toggle operator menu: {error}"));
        }
    }
}
