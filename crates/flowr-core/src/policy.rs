use log::warn;
use url::Url;

use crate::{
    connectivity::ConnectivityState,
    pages::{LocalPage, PageLocator},
    store::ConfigStore,
};

/// Picks the page the display surface should show.
///
/// Offline (or not yet probed) always means the no-connection page. Online, a usable `extUrl`
/// wins over the local configuration page.
pub fn resolve(store: &ConfigStore, connectivity: &ConnectivityState, pages: &PageLocator) -> Url {
    if !connectivity.is_active() {
        return pages.url(LocalPage::NoConnection);
    }

    match store.ext_url().map(Url::parse) {
        Some(Ok(url)) => url,
        Some(Err(error)) => {
            warn!("ignoring unparsable extUrl: {error}");
            pages.url(LocalPage::Config)
        }
        None => pages.url(LocalPage::Config),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use serde_json::json;

    use super::*;
    use crate::preferences::{default_preferences, EXT_URL_KEY};

    fn pages() -> PageLocator {
        PageLocator::new(Url::parse("tauri://localhost/").expect("url"))
    }

    fn active() -> ConnectivityState {
        ConnectivityState::Active {
            gateway_ip: IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1)),
            mac_address: None,
        }
    }

    fn store(ext_url: Option<&str>) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = ConfigStore::open(dir.path().join("prefs.json"), default_preferences());
        if let Some(ext_url) = ext_url {
            store.set(EXT_URL_KEY, json!(ext_url)).expect("set");
        }
        (dir, store)
    }

    #[test]
    fn offline_states_always_resolve_to_fallback() {
        let fallback = pages().url(LocalPage::NoConnection);
        for ext_url in [None, Some(""), Some("http://example.com")] {
            let (_dir, store) = store(ext_url);
            for state in [ConnectivityState::Unknown, ConnectivityState::Inactive] {
                assert_eq!(resolve(&store, &state, &pages()), fallback);
            }
        }
    }

    #[test]
    fn online_without_ext_url_resolves_to_config_page() {
        let config_page = pages().url(LocalPage::Config);
        for ext_url in [None, Some("")] {
            let (_dir, store) = store(ext_url);
            assert_eq!(resolve(&store, &active(), &pages()), config_page);
        }
    }

    #[test]
    fn online_with_ext_url_resolves_to_it() {
        let (_dir, store) = store(Some("https://tv.example.com/lobby"));
        assert_eq!(
            resolve(&store, &active(), &pages()).as_str(),
            "https://tv.example.com/lobby"
        );
    }

    #[test]
    fn unparsable_ext_url_falls_through_to_config_page() {
        let (_dir, store) = store(Some("not a url"));
        assert_eq!(
            resolve(&store, &active(), &pages()),
            pages().url(LocalPage::Config)
        );
    }

    #[test]
    fn resolve_is_idempotent() {
        let (_dir, store) = store(Some("http://example.com"));
        let first = resolve(&store, &active(), &pages());
        let second = resolve(&store, &active(), &pages());
        assert_eq!(first, second);
    }
}
