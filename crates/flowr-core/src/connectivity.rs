use std::{future::Future, io, net::IpAddr, sync::Arc, time::Duration};

use log::{debug, info};
use thiserror::Error;

use crate::timer::TimerSlot;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no active network interface")]
    NoActiveInterface,
    #[error("failed to open netlink connection: {0}")]
    Connection(#[source] io::Error),
    #[error("netlink {operation} failed: {reason}")]
    Netlink {
        operation: &'static str,
        reason: String,
    },
    #[error("network probing is not supported on this platform")]
    Unsupported,
}

impl ProbeError {
    pub fn netlink(operation: &'static str, reason: impl ToString) -> Self {
        Self::Netlink {
            operation,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no Mac Address Found")]
pub struct NoHardwareAddress;

/// What the probe learned about the interface carrying the default route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInterface {
    pub name: String,
    pub gateway_ip: Option<IpAddr>,
    pub mac_address: Option<String>,
}

pub trait NetworkProbe: Send + Sync + 'static {
    fn active_interface(
        &self,
    ) -> impl Future<Output = Result<ActiveInterface, ProbeError>> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Active {
        gateway_ip: IpAddr,
        mac_address: Option<String>,
    },
    Inactive,
}

impl ConnectivityState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn from_interface(interface: ActiveInterface) -> Self {
        match interface.gateway_ip {
            Some(gateway_ip) => Self::Active {
                gateway_ip,
                mac_address: interface.mac_address,
            },
            None => Self::Inactive,
        }
    }
}

pub async fn try_probe_state<P: NetworkProbe>(probe: &P) -> Result<ConnectivityState, ProbeError> {
    probe
        .active_interface()
        .await
        .map(ConnectivityState::from_interface)
}

pub async fn probe_state<P: NetworkProbe>(probe: &P) -> ConnectivityState {
    match try_probe_state(probe).await {
        Ok(state) => state,
        Err(error) => {
            debug!("network probe failed, treating as inactive: {error}");
            ConnectivityState::Inactive
        }
    }
}

pub async fn probe_mac_address<P: NetworkProbe>(probe: &P) -> Result<String, NoHardwareAddress> {
    match probe.active_interface().await {
        Ok(ActiveInterface {
            mac_address: Some(mac),
            ..
        }) => Ok(mac),
        Ok(_) => Err(NoHardwareAddress),
        Err(error) => {
            debug!("hardware address lookup failed: {error}");
            Err(NoHardwareAddress)
        }
    }
}

/// Probes the network once or in a fixed-interval retry loop.
pub struct ConnectivityMonitor<P> {
    probe: Arc<P>,
    retry: TimerSlot,
    single: TimerSlot,
}

impl<P: NetworkProbe> ConnectivityMonitor<P> {
    pub fn new(probe: Arc<P>) -> Self {
        Self {
            probe,
            retry: TimerSlot::new(),
            single: TimerSlot::new(),
        }
    }

    pub async fn try_probe(&self) -> Result<ConnectivityState, ProbeError> {
        try_probe_state(self.probe.as_ref()).await
    }

    pub async fn probe(&self) -> ConnectivityState {
        probe_state(self.probe.as_ref()).await
    }

    pub async fn mac_address(&self) -> Result<String, NoHardwareAddress> {
        probe_mac_address(self.probe.as_ref()).await
    }

    /// Probes once in the background and reports `(generation, state)`.
    pub fn probe_once<F>(&mut self, on_result: F) -> u64
    where
        F: FnOnce(u64, ConnectivityState) + Send + 'static,
    {
        let probe = self.probe.clone();
        self.single.spawn(move |generation| async move {
            let state = probe_state(probe.as_ref()).await;
            on_result(generation, state);
        })
    }

    /// Looks up the active interface's hardware address in the background. Lookups are
    /// independent of each other and of the probe timers.
    pub fn lookup_mac_address<F>(&self, on_result: F)
    where
        F: FnOnce(Result<String, NoHardwareAddress>) + Send + 'static,
    {
        let probe = self.probe.clone();
        tokio::spawn(async move {
            on_result(probe_mac_address(probe.as_ref()).await);
        });
    }

    /// Probes every `interval` until the network is active, then reports `(generation, state)`
    /// once and stops. Replaces any loop already running.
    pub fn start_retry_loop<F>(&mut self, interval: Duration, on_recovered: F) -> u64
    where
        F: FnOnce(u64, ConnectivityState) + Send + 'static,
    {
        let probe = self.probe.clone();
        self.retry.spawn(move |generation| async move {
            let mut attempt: u64 = 0;
            loop {
                tokio::time::sleep(interval).await;
                attempt += 1;
                let state = probe_state(probe.as_ref()).await;
                if state.is_active() {
                    info!("connectivity recovered after {attempt} retry probe(s)");
                    on_recovered(generation, state);
                    return;
                }
                debug!("retry probe {attempt}: still offline");
            }
        })
    }

    pub fn claim_probe(&mut self, generation: u64) -> bool {
        self.single.claim(generation)
    }

    pub fn claim_recovery(&mut self, generation: u64) -> bool {
        self.retry.claim(generation)
    }

    pub fn is_retrying(&self) -> bool {
        self.retry.is_pending()
    }

    pub fn stop(&mut self) {
        if self.retry.cancel() {
            debug!("retry loop cancelled");
        }
    }

    pub fn stop_all(&mut self) {
        self.stop();
        self.single.cancel();
    }
}

/// One IPv4 routing table entry, reduced to the fields default-route selection needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteCandidate {
    pub prefix_len: u8,
    pub destination: Option<IpAddr>,
    pub gateway: Option<IpAddr>,
    pub interface_index: Option<u32>,
    /// The kernel omits the priority attribute for metric 0.
    pub metric: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRoute {
    pub interface_index: u32,
    pub gateway: IpAddr,
}

/// Picks the default route with a gateway and the lowest metric.
pub fn select_default_route(routes: &[RouteCandidate]) -> Option<DefaultRoute> {
    routes
        .iter()
        .filter(|route| {
            route.prefix_len == 0
                && route
                    .destination
                    .map_or(true, |destination| destination.is_unspecified())
        })
        .filter_map(|route| {
            let gateway = route.gateway.filter(|gateway| !gateway.is_unspecified())?;
            let interface_index = route.interface_index?;
            Some((
                route.metric.unwrap_or(0),
                DefaultRoute {
                    interface_index,
                    gateway,
                },
            ))
        })
        .min_by_key(|(metric, _)| *metric)
        .map(|(_, route)| route)
}

/// Formats a link-layer address as lower-case colon-separated hex. Anything other than six
/// bytes, and the all-zero address, counts as none.
pub fn format_mac(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 6 || bytes.iter().all(|byte| *byte == 0) {
        return None;
    }
    Some(
        bytes
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(":"),
    )
}

/// Asks the kernel for the default route and the link it leaves through.
#[derive(Debug, Clone, Default)]
pub struct SystemNetworkProbe;

impl NetworkProbe for SystemNetworkProbe {
    async fn active_interface(&self) -> Result<ActiveInterface, ProbeError> {
        #[cfg(target_os = "linux")]
        {
            crate::netlink::active_interface().await
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unsupported)
        }
    }
}
