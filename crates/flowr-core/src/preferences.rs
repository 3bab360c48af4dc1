use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::store::ConfigStore;

pub const WINDOW_BOUNDS_KEY: &str = "windowBounds";
pub const CHANNEL_DATA_KEY: &str = "channelData";
pub const IS_MAXIMIZED_KEY: &str = "isMaximized";
pub const IS_KIOSK_KEY: &str = "isKiosk";
pub const EXT_URL_KEY: &str = "extUrl";
pub const FLOWR_CONFIG_KEY: &str = "flowrConfig";
pub const DEINTERLACING_KEY: &str = "deinterlacing";

pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

pub fn default_preferences() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert(
        WINDOW_BOUNDS_KEY.to_string(),
        json!({ "width": DEFAULT_WINDOW_WIDTH, "height": DEFAULT_WINDOW_HEIGHT }),
    );
    defaults.insert(CHANNEL_DATA_KEY.to_string(), Value::Object(Map::new()));
    defaults.insert(IS_MAXIMIZED_KEY.to_string(), Value::Bool(false));
    defaults
}

/// Absent, `null`, `false`, `0` and `""` all read as "not set".
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

impl ConfigStore {
    pub fn window_bounds(&self) -> WindowBounds {
        self.get(WINDOW_BOUNDS_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    pub fn is_maximized(&self) -> bool {
        is_truthy(self.get(IS_MAXIMIZED_KEY))
    }

    pub fn is_kiosk(&self) -> bool {
        is_truthy(self.get(IS_KIOSK_KEY))
    }

    /// The override URL, or `None` when it is absent, not a string, or empty.
    pub fn ext_url(&self) -> Option<&str> {
        self.get(EXT_URL_KEY)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn deinterlacing(&self) -> Option<&Value> {
        self.get(DEINTERLACING_KEY)
    }

    pub fn flowr_config(&self) -> Option<&Value> {
        self.get(FLOWR_CONFIG_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(key: &str, value: Value) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = ConfigStore::open(dir.path().join("prefs.json"), default_preferences());
        store.set(key, value).expect("set");
        (dir, store)
    }

    #[test]
    fn truthiness_matches_falsy_means_absent() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!({}))));
    }

    #[test]
    fn empty_ext_url_reads_as_unset() {
        let (_dir, store) = store_with(EXT_URL_KEY, json!(""));
        assert_eq!(store.ext_url(), None);
    }

    #[test]
    fn non_string_ext_url_reads_as_unset() {
        let (_dir, store) = store_with(EXT_URL_KEY, json!(42));
        assert_eq!(store.ext_url(), None);
    }

    #[test]
    fn window_bounds_default_when_malformed() {
        let (_dir, store) = store_with(WINDOW_BOUNDS_KEY, json!({ "width": "wide" }));
        assert_eq!(store.window_bounds(), WindowBounds::default());
    }

    #[test]
    fn defaults_cover_window_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::open(dir.path().join("prefs.json"), default_preferences());
        assert_eq!(store.window_bounds(), WindowBounds::default());
        assert!(!store.is_maximized());
        assert!(!store.is_kiosk());
        assert_eq!(store.get(CHANNEL_DATA_KEY), Some(&json!({})));
    }
}
