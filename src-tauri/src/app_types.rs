use std::sync::Mutex;

use flowr_core::{ControllerHandle, WindowBounds};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowGeometry {
    pub(crate) bounds: WindowBounds,
    pub(crate) maximized: bool,
}

pub(crate) struct KioskState {
    pub(crate) controller: ControllerHandle,
    pub(crate) last_geometry: Mutex<Option<WindowGeometry>>,
}

impl KioskState {
    pub(crate) fn new(controller: ControllerHandle) -> Self {
        Self {
            controller,
            last_geometry: Mutex::new(None),
        }
    }

    /// Records `geometry` and returns the previously recorded one.
    pub(crate) fn replace_geometry(&self, geometry: WindowGeometry) -> Option<WindowGeometry> {
        self.last_geometry
            .lock()
            .ok()
            .and_then(|mut guard| guard.replace(geometry))
    }
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
    pub(crate) data: Option<Value>,
}

impl BridgeResult {
    pub(crate) fn success(data: Option<Value>) -> Self {
        Self {
            ok: true,
            reason: None,
            data,
        }
    }

    pub(crate) fn failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
            data: None,
        }
    }
}
