use flowr_core::{ChannelEnvelope, ChannelError, ChannelReply};
use serde_json::Value;
use tauri::{AppHandle, Manager};

use crate::{append_desktop_log, BridgeResult, KioskState};

fn bridge_result(reply: Result<ChannelReply, ChannelError>) -> BridgeResult {
    match reply {
        Ok(reply) => BridgeResult::success(reply.into_data()),
        Err(error) => BridgeResult::failure(error.to_string()),
    }
}

#[tauri::command]
pub(crate) fn flowr_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) async fn flowr_bridge_send(
    app_handle: AppHandle,
    name: String,
    payload: Option<Value>,
) -> BridgeResult {
    let Some(controller) = app_handle
        .try_state::<KioskState>()
        .map(|state| state.controller.clone())
    else {
        return BridgeResult::failure("Display controller is not ready.");
    };

    let reply = controller
        .dispatch_envelope(ChannelEnvelope { name, payload })
        .await;
    if let Err(error) = &reply {
        append_desktop_log(&format!("bridge message rejected: {error}"));
    }
    bridge_result(reply)
}
