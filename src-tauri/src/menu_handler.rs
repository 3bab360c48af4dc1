use tauri::{AppHandle, Manager};

use crate::{append_desktop_log, menu_actions, KioskState};

pub fn handle_hidden_menu_event(app_handle: &AppHandle, menu_id: &str) {
    let Some(action) = menu_actions::action_from_menu_id(menu_id) else {
        return;
    };
    let Some(state) = app_handle.try_state::<KioskState>() else {
        append_desktop_log("hidden menu event ignored: display controller not ready");
        return;
    };

    append_desktop_log(&format!("hidden menu action: {action:?}"));
    if let Err(error) = state
        .controller
        .command(menu_actions::command_for_action(action))
    {
        append_desktop_log(&format!("failed to forward hidden menu action: {error}"));
    }
}
