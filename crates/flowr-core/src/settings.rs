use std::{env, time::Duration};

pub const RUN_MODE_ENV: &str = "ENV";
pub const INIT_GRACE_ENV: &str = "FLOWR_INIT_GRACE_MS";
pub const RETRY_INTERVAL_ENV: &str = "FLOWR_RETRY_INTERVAL_MS";

pub const DEFAULT_INIT_GRACE_MS: u64 = 5_000;
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Packaged,
}

impl RunMode {
    pub fn from_env() -> Self {
        Self::from_value(env::var(RUN_MODE_ENV).ok().as_deref())
    }

    pub(crate) fn from_value(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("dev") => Self::Development,
            _ => Self::Packaged,
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// How long a loaded page has to acknowledge itself, and how often an offline device re-probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KioskTimings {
    pub init_grace: Duration,
    pub retry_interval: Duration,
}

impl Default for KioskTimings {
    fn default() -> Self {
        Self {
            init_grace: Duration::from_millis(DEFAULT_INIT_GRACE_MS),
            retry_interval: Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS),
        }
    }
}

impl KioskTimings {
    pub fn from_env() -> Self {
        Self {
            init_grace: duration_from_ms(
                env::var(INIT_GRACE_ENV).ok().as_deref(),
                DEFAULT_INIT_GRACE_MS,
            ),
            retry_interval: duration_from_ms(
                env::var(RETRY_INTERVAL_ENV).ok().as_deref(),
                DEFAULT_RETRY_INTERVAL_MS,
            ),
        }
    }
}

fn duration_from_ms(raw: Option<&str>, fallback_ms: u64) -> Duration {
    let millis = raw
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(fallback_ms);
    Duration::from_millis(millis)
}
