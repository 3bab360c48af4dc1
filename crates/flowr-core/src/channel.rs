//! Messages exchanged between the loaded page and the display controller.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{preferences::is_truthy, store::ConfigStore};

pub const INITIALIZING: &str = "FlowrIsInitializing";
pub const GET_CONFIG: &str = "getAppConfig";
pub const GET_MAC_ADDRESS: &str = "getMacAddress";
pub const UPDATE_CONFIG: &str = "updateAppConfig";
pub const SET_DEBUG_MODE: &str = "setDebugMode";
pub const SET_DEINTERLACING_MODE: &str = "setDeinterlacingMode";
pub const SET_KIOSK_MODE: &str = "setKioskMode";
pub const SET_EXT_URL: &str = "setExtUrl";
pub const OPEN_CONFIG_MODE: &str = "openConfigMode";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelEnvelope {
    pub name: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageMessage {
    Initializing,
    GetConfig,
    GetMacAddress,
    UpdateConfig(Value),
    SetDebugMode(bool),
    SetDeinterlacingMode(Value),
    SetKioskMode(bool),
    SetExtUrl(String),
    OpenConfigMode,
}

impl PageMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initializing => INITIALIZING,
            Self::GetConfig => GET_CONFIG,
            Self::GetMacAddress => GET_MAC_ADDRESS,
            Self::UpdateConfig(_) => UPDATE_CONFIG,
            Self::SetDebugMode(_) => SET_DEBUG_MODE,
            Self::SetDeinterlacingMode(_) => SET_DEINTERLACING_MODE,
            Self::SetKioskMode(_) => SET_KIOSK_MODE,
            Self::SetExtUrl(_) => SET_EXT_URL,
            Self::OpenConfigMode => OPEN_CONFIG_MODE,
        }
    }

    /// Requests wait for an answer; everything else is fire-and-forget.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Self::GetConfig | Self::GetMacAddress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("invalid payload for '{name}': {reason}")]
    InvalidPayload { name: String, reason: String },
    #[error("no Mac Address Found")]
    NoHardwareAddress,
    #[error("display controller is not running")]
    ControllerGone,
}

/// Decodes an envelope. Unknown names decode to `None`.
pub fn parse_message(envelope: ChannelEnvelope) -> Result<Option<PageMessage>, ChannelError> {
    let ChannelEnvelope { name, payload } = envelope;
    let message = match name.as_str() {
        INITIALIZING => PageMessage::Initializing,
        GET_CONFIG => PageMessage::GetConfig,
        GET_MAC_ADDRESS => PageMessage::GetMacAddress,
        OPEN_CONFIG_MODE => PageMessage::OpenConfigMode,
        UPDATE_CONFIG => {
            let patch: Value = required_payload(&name, payload)?;
            if !patch.is_object() {
                return Err(ChannelError::InvalidPayload {
                    name: name.clone(),
                    reason: "expected an object".to_string(),
                });
            }
            PageMessage::UpdateConfig(patch)
        }
        SET_DEBUG_MODE => PageMessage::SetDebugMode(required_payload(&name, payload)?),
        SET_DEINTERLACING_MODE => {
            PageMessage::SetDeinterlacingMode(payload.unwrap_or(Value::Null))
        }
        SET_KIOSK_MODE => PageMessage::SetKioskMode(required_payload(&name, payload)?),
        SET_EXT_URL => PageMessage::SetExtUrl(required_payload(&name, payload)?),
        _ => return Ok(None),
    };
    Ok(Some(message))
}

fn required_payload<T: DeserializeOwned>(
    name: &str,
    payload: Option<Value>,
) -> Result<T, ChannelError> {
    let payload = payload.ok_or_else(|| ChannelError::InvalidPayload {
        name: name.to_string(),
        reason: "missing payload".to_string(),
    })?;
    serde_json::from_value(payload).map_err(|error| ChannelError::InvalidPayload {
        name: name.to_string(),
        reason: error.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelReply {
    Accepted,
    Ignored,
    Config(Box<AppConfigView>),
    MacAddress(String),
}

impl ChannelReply {
    /// The JSON handed back to the page, if any.
    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Accepted | Self::Ignored => None,
            Self::Config(view) => serde_json::to_value(*view).ok(),
            Self::MacAddress(mac) => Some(Value::String(mac)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostProxy {
    pub host_proxy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Host {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoints {
    pub ozone_api: HostProxy,
    pub flowr_api: HostProxy,
    pub socket_api: Host,
    pub push_vod_socket_api: Host,
    pub anevia_vod_socket_api: Host,
}

/// The only view of the stored configuration a page ever receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigView {
    pub debug_mode: bool,
    pub is_launched_url_correct: bool,
    pub deinterlacing: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_config: Option<ServiceEndpoints>,
    pub ext_url: Option<String>,
    pub is_kiosk: bool,
}

impl AppConfigView {
    pub fn from_store(
        store: &ConfigStore,
        debug_mode: bool,
        is_launched_url_correct: bool,
    ) -> Self {
        Self {
            debug_mode,
            is_launched_url_correct,
            deinterlacing: store.deinterlacing().cloned(),
            app_config: store.flowr_config().and_then(service_endpoints),
            ext_url: store
                .get(crate::preferences::EXT_URL_KEY)
                .and_then(Value::as_str)
                .map(str::to_string),
            is_kiosk: store.is_kiosk(),
        }
    }
}

fn service_endpoints(flowr_config: &Value) -> Option<ServiceEndpoints> {
    if !is_truthy(flowr_config.get("ozoneApi")) {
        return None;
    }
    let field = |service: &str, key: &str| {
        flowr_config
            .get(service)
            .and_then(|entry| entry.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(ServiceEndpoints {
        ozone_api: HostProxy {
            host_proxy: field("ozoneApi", "hostProxy"),
        },
        flowr_api: HostProxy {
            host_proxy: field("flowrApi", "hostProxy"),
        },
        socket_api: Host {
            host: field("socketApi", "host"),
        },
        push_vod_socket_api: Host {
            host: field("pushVodSocketApi", "host"),
        },
        anevia_vod_socket_api: Host {
            host: field("aneviaVodSocketApi", "host"),
        },
    })
}
