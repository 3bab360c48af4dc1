use std::sync::Arc;

use flowr_core::{
    default_preferences, store, ConfigStore, DisplayController, KioskTimings, PageLocator, RunMode,
    SystemNetworkProbe,
};
use tauri::{webview::PageLoadEvent, App, Manager, WindowEvent};
use url::Url;

use crate::{
    append_desktop_log, append_startup_log, logging, main_window, menu_handler, menu_setup,
    process_control::TauriProcessControl, window_actions, KioskState, DESKTOP_LOG_FILE,
    MAIN_WINDOW_LABEL, PACKAGED_PAGES_BASE_URL,
};

fn open_preferences() -> ConfigStore {
    match ConfigStore::open_default(default_preferences()) {
        Ok(store) => store,
        Err(error) => {
            let fallback = std::env::temp_dir()
                .join(store::DATA_DIR_NAME)
                .join(store::STORE_FILE_NAME);
            append_startup_log(&format!(
                "preferences unavailable ({error}), using {}",
                fallback.display()
            ));
            ConfigStore::open(fallback, default_preferences())
        }
    }
}

fn resolve_pages(run_mode: RunMode) -> Result<PageLocator, String> {
    let packaged_base = Url::parse(PACKAGED_PAGES_BASE_URL)
        .map_err(|error| format!("Invalid packaged pages URL: {error}"))?;
    PageLocator::for_mode(run_mode, packaged_base)
        .map_err(|error| format!("Invalid local pages URL: {error}"))
}

fn start_display_controller(app: &mut App) -> Result<(), String> {
    let run_mode = RunMode::from_env();
    let timings = KioskTimings::from_env();
    let pages = resolve_pages(run_mode)?;
    let store = open_preferences();
    append_startup_log(&format!(
        "run mode {run_mode:?}, pages at {}, preferences at {}",
        pages.base(),
        store.path().display()
    ));

    let app_handle = app.handle().clone();
    let menu = menu_setup::build_hidden_menu(&app_handle)?;
    let window = main_window::create_main_window(app, &store, menu)?;

    let (controller, handle) = DisplayController::new(
        store,
        pages,
        timings,
        Arc::new(SystemNetworkProbe),
        main_window::TauriDisplaySurface::new(window),
        TauriProcessControl::new(app_handle.clone()),
    );
    app.manage(KioskState::new(handle));

    let controller = controller.with_debug_mode(run_mode.is_development());
    tauri::async_runtime::spawn(async move {
        controller.run().await;
        append_desktop_log("display controller stopped");
    });
    Ok(())
}

pub(crate) fn run() {
    logging::init_logging();
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        logging::resolve_desktop_log_path(store::default_data_dir().ok(), DESKTOP_LOG_FILE)
            .display()
    ));

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app_handle, _args, _cwd| {
            window_actions::focus_main_window(app_handle, append_desktop_log);
        }))
        .plugin(tauri_plugin_process::init())
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::flowr_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::flowr_bridge_send,
        ])
        .on_menu_event(|app_handle, event| {
            menu_handler::handle_hidden_menu_event(app_handle, event.id().as_ref());
        })
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::Resized(_) = event {
                window_actions::remember_window_geometry(window, append_desktop_log);
            }
        })
        .on_page_load(|_webview, payload| match payload.event() {
            PageLoadEvent::Started => {
                append_desktop_log(&format!("page-load started: {}", payload.url()));
            }
            PageLoadEvent::Finished => {
                append_desktop_log(&format!("page-load finished: {}", payload.url()));
            }
        })
        .setup(|app| {
            start_display_controller(app)?;
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
