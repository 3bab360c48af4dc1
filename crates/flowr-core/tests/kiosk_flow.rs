use std::{
    net::{IpAddr, Ipv4Addr},
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use flowr_core::{
    connectivity::{ActiveInterface, ProbeError},
    default_preferences,
    preferences::{EXT_URL_KEY, FLOWR_CONFIG_KEY},
    ConfigStore, ControllerHandle, DisplayController, DisplayMode, DisplaySurface, KioskTimings,
    NetworkProbe, PageLocator, PageMessage, ProcessControl,
};
use serde_json::json;
use url::Url;

#[derive(Clone, Default)]
struct Screen {
    loaded: Arc<Mutex<Vec<String>>>,
}

impl Screen {
    fn loaded(&self) -> Vec<String> {
        self.loaded.lock().expect("screen lock").clone()
    }
}

impl DisplaySurface for Screen {
    fn load_url(&self, url: &Url) {
        self.loaded
            .lock()
            .expect("screen lock")
            .push(url.to_string());
    }

    fn set_devtools_open(&self, _open: bool) {}

    fn set_menu_visible(&self, _visible: bool) {}
}

struct OnlineProbe;

impl NetworkProbe for OnlineProbe {
    async fn active_interface(&self) -> Result<ActiveInterface, ProbeError> {
        Ok(ActiveInterface {
            name: "eth0".to_string(),
            gateway_ip: Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 254))),
            mac_address: Some("02:42:ac:11:00:02".to_string()),
        })
    }
}

#[derive(Clone, Default)]
struct Relauncher {
    count: Arc<AtomicUsize>,
}

impl ProcessControl for Relauncher {
    fn relaunch(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

struct Boot {
    screen: Screen,
    relauncher: Relauncher,
    handle: ControllerHandle,
}

/// One process lifetime: a fresh controller over whatever the preferences file holds.
fn boot(store_path: &Path) -> Boot {
    let screen = Screen::default();
    let relauncher = Relauncher::default();
    let (controller, handle) = DisplayController::new(
        ConfigStore::open(store_path, default_preferences()),
        PageLocator::new(Url::parse("http://localhost:4444/").expect("url")),
        KioskTimings::default(),
        Arc::new(OnlineProbe),
        screen.clone(),
        relauncher.clone(),
    );
    tokio::spawn(controller.run());
    Boot {
        screen,
        relauncher,
        handle,
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn fresh_device_is_configured_then_loads_the_new_destination() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join(".flowr").join("user-preferences.json");

    let first = boot(&store_path);
    settle().await;
    assert_eq!(
        first.screen.loaded().last().map(String::as_str),
        Some("http://localhost:4444/config.html")
    );

    first
        .handle
        .dispatch(PageMessage::SetExtUrl("http://example.com".to_string()))
        .await
        .expect("dispatch");
    settle().await;

    assert_eq!(first.relauncher.count.load(Ordering::SeqCst), 1);
    let persisted = ConfigStore::open(&store_path, default_preferences());
    assert_eq!(persisted.get(EXT_URL_KEY), Some(&json!("http://example.com")));

    let second = boot(&store_path);
    settle().await;
    assert_eq!(
        second.screen.loaded(),
        vec![
            "http://localhost:4444/noconnection.html",
            "http://example.com/"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn unacknowledged_destination_falls_back_and_retries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("user-preferences.json");
    ConfigStore::open(&store_path, default_preferences())
        .set(EXT_URL_KEY, json!("https://portal.example.com/"))
        .expect("seed extUrl");

    let device = boot(&store_path);
    settle().await;
    assert_eq!(
        device.screen.loaded().last().map(String::as_str),
        Some("https://portal.example.com/")
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    let state = device.handle.snapshot().await.expect("snapshot");
    assert_eq!(state.mode, DisplayMode::Fallback);
    assert!(!state.is_launched_url_correct);
    assert_eq!(
        device.screen.loaded().last().map(String::as_str),
        Some("http://localhost:4444/noconnection.html")
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        device.screen.loaded().last().map(String::as_str),
        Some("https://portal.example.com/")
    );
}

#[tokio::test(start_paused = true)]
async fn partial_config_updates_merge_across_restarts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("user-preferences.json");

    let first = boot(&store_path);
    settle().await;
    first
        .handle
        .dispatch(PageMessage::UpdateConfig(json!({ "a": { "x": 1 } })))
        .await
        .expect("dispatch");
    settle().await;

    let second = boot(&store_path);
    settle().await;
    second
        .handle
        .dispatch(PageMessage::UpdateConfig(json!({ "a": { "y": 2 } })))
        .await
        .expect("dispatch");
    settle().await;

    assert_eq!(first.relauncher.count.load(Ordering::SeqCst), 1);
    assert_eq!(second.relauncher.count.load(Ordering::SeqCst), 1);
    let persisted = ConfigStore::open(&store_path, default_preferences());
    assert_eq!(
        persisted.get(FLOWR_CONFIG_KEY),
        Some(&json!({ "a": { "x": 1, "y": 2 } }))
    );
}

#[tokio::test(start_paused = true)]
async fn page_only_sees_redacted_endpoints() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("user-preferences.json");
    ConfigStore::open(&store_path, default_preferences())
        .set(
            FLOWR_CONFIG_KEY,
            json!({
                "ozoneApi": {
                    "hostProxy": "https://ozone.example",
                    "username": "admin",
                    "password": "pw"
                },
                "pushVodSocketApi": { "host": "wss://vod.example", "secret": "k" }
            }),
        )
        .expect("seed flowrConfig");

    let device = boot(&store_path);
    settle().await;
    let data = device
        .handle
        .dispatch(PageMessage::GetConfig)
        .await
        .expect("config")
        .into_data()
        .expect("config data");

    assert_eq!(
        data["appConfig"]["ozoneApi"],
        json!({ "hostProxy": "https://ozone.example" })
    );
    assert_eq!(
        data["appConfig"]["pushVodSocketApi"],
        json!({ "host": "wss://vod.example" })
    );
    let text = data.to_string();
    assert!(!text.contains("admin"));
    assert!(!text.contains("\"pw\""));
    assert!(!text.contains("secret"));
}
