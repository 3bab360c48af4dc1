use flowr_core::ProcessControl;
use tauri::AppHandle;

use crate::append_desktop_log;

pub(crate) struct TauriProcessControl {
    app_handle: AppHandle,
}

impl TauriProcessControl {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl ProcessControl for TauriProcessControl {
    fn relaunch(&self) {
        append_desktop_log("relaunching to apply new preferences");
        self.app_handle.request_restart();
    }
}
