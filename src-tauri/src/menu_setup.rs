use tauri::{
    menu::{Menu, MenuItem, Submenu},
    AppHandle, Wry,
};

use crate::menu_actions;

/// The operator menu. It is attached to the main window but stays hidden until configuration
/// mode is opened.
pub fn build_hidden_menu(app_handle: &AppHandle) -> Result<Menu<Wry>, String> {
    let config_item = MenuItem::with_id(
        app_handle,
        menu_actions::HIDDEN_MENU_CONFIG,
        "Config",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create config menu item: {error}"))?;
    let flowr_item = MenuItem::with_id(
        app_handle,
        menu_actions::HIDDEN_MENU_FLOWR,
        "Flowr",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create flowr menu item: {error}"))?;
    let hide_item = MenuItem::with_id(
        app_handle,
        menu_actions::HIDDEN_MENU_HIDE,
        "Hide Menu",
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create hide menu item: {error}"))?;

    let submenu = Submenu::with_items(
        app_handle,
        "Menu",
        true,
        &[&config_item, &flowr_item, &hide_item],
    )
    .map_err(|error| format!("Failed to build hidden submenu: {error}"))?;

    Menu::with_items(app_handle, &[&submenu])
        .map_err(|error| format!("Failed to build hidden menu: {error}"))
}
