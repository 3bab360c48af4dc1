//! Connectivity-aware URL loading for the FlowR kiosk shell.
//!
//! The [`controller::DisplayController`] decides which page the kiosk window shows: the
//! configured destination when the network is up, the bundled no-connection page when it is not,
//! and the local configuration page on request. Pages talk back through the typed
//! [`channel`] contract. Nothing here depends on the webview toolkit; the shell plugs in through
//! [`controller::DisplaySurface`] and [`controller::ProcessControl`].

pub mod channel;
pub mod connectivity;
pub mod controller;
#[cfg(target_os = "linux")]
mod netlink;
pub mod pages;
pub mod policy;
pub mod preferences;
pub mod settings;
pub mod store;
pub mod timer;

pub use channel::{ChannelEnvelope, ChannelError, ChannelReply, PageMessage};
pub use connectivity::{ConnectivityState, NetworkProbe, SystemNetworkProbe};
pub use controller::{
    ControllerHandle, ControllerState, DisplayController, DisplayMode, DisplaySurface,
    ProcessControl, ShellCommand,
};
pub use pages::{LocalPage, PageLocator};
pub use preferences::{default_preferences, WindowBounds};
pub use settings::{KioskTimings, RunMode};
pub use store::ConfigStore;
