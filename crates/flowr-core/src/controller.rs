use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::{
    channel::{
        parse_message, AppConfigView, ChannelEnvelope, ChannelError, ChannelReply, PageMessage,
    },
    connectivity::{ConnectivityMonitor, ConnectivityState, NetworkProbe},
    pages::{LocalPage, PageLocator},
    policy::resolve,
    preferences::{
        WindowBounds, DEINTERLACING_KEY, EXT_URL_KEY, FLOWR_CONFIG_KEY, IS_KIOSK_KEY,
        IS_MAXIMIZED_KEY, WINDOW_BOUNDS_KEY,
    },
    settings::KioskTimings,
    store::{ConfigStore, StoreError},
    timer::TimerSlot,
};

/// The single visible web surface.
pub trait DisplaySurface: Send + 'static {
    fn load_url(&self, url: &Url);
    fn set_devtools_open(&self, open: bool);
    fn set_menu_visible(&self, visible: bool);
}

pub trait ProcessControl: Send + 'static {
    /// Starts a fresh copy of the process and exits this one.
    fn relaunch(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// A page was requested and has not acknowledged itself yet.
    Loading,
    Normal,
    Fallback,
    ConfigMenu,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub mode: DisplayMode,
    pub connectivity: ConnectivityState,
    pub debug_mode: bool,
    pub is_launched_url_correct: bool,
    pub menu_visible: bool,
    pub restart_requested: bool,
}

impl ControllerState {
    fn new(debug_mode: bool) -> Self {
        Self {
            mode: DisplayMode::Loading,
            connectivity: ConnectivityState::Unknown,
            debug_mode,
            is_launched_url_correct: true,
            menu_visible: false,
            restart_requested: false,
        }
    }
}

/// Signals from the window shell rather than from the loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    EnterConfigMenu,
    LeaveConfigMenu,
    HideMenu,
    WindowResized(WindowBounds),
    MaximizedChanged(bool),
}

type Reply = oneshot::Sender<Result<ChannelReply, ChannelError>>;

enum ControllerEvent {
    Page {
        message: PageMessage,
        reply: Option<Reply>,
    },
    Shell(ShellCommand),
    Snapshot(oneshot::Sender<ControllerState>),
    ProbeCompleted {
        generation: u64,
        state: ConnectivityState,
    },
    WatchdogExpired {
        generation: u64,
    },
    Recovered {
        generation: u64,
        state: ConnectivityState,
    },
}

/// Cheap, cloneable entry point into a running [`DisplayController`].
#[derive(Clone)]
pub struct ControllerHandle {
    mailbox: mpsc::UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    /// Decodes and delivers a raw page envelope. Unknown names are answered with
    /// [`ChannelReply::Ignored`].
    pub async fn dispatch_envelope(
        &self,
        envelope: ChannelEnvelope,
    ) -> Result<ChannelReply, ChannelError> {
        match parse_message(envelope)? {
            Some(message) => self.dispatch(message).await,
            None => Ok(ChannelReply::Ignored),
        }
    }

    /// Requests wait for the controller's answer. Fire-and-forget messages return
    /// [`ChannelReply::Accepted`] once queued.
    pub async fn dispatch(&self, message: PageMessage) -> Result<ChannelReply, ChannelError> {
        if !message.expects_reply() {
            self.send(ControllerEvent::Page {
                message,
                reply: None,
            })?;
            return Ok(ChannelReply::Accepted);
        }

        let (reply, response) = oneshot::channel();
        self.send(ControllerEvent::Page {
            message,
            reply: Some(reply),
        })?;
        response.await.map_err(|_| ChannelError::ControllerGone)?
    }

    pub fn command(&self, command: ShellCommand) -> Result<(), ChannelError> {
        self.send(ControllerEvent::Shell(command))
    }

    pub async fn snapshot(&self) -> Result<ControllerState, ChannelError> {
        let (reply, response) = oneshot::channel();
        self.send(ControllerEvent::Snapshot(reply))?;
        response.await.map_err(|_| ChannelError::ControllerGone)
    }

    fn send(&self, event: ControllerEvent) -> Result<(), ChannelError> {
        self.mailbox
            .send(event)
            .map_err(|_| ChannelError::ControllerGone)
    }
}

/// Owns the preferences, the display surface and every pending timer.
///
/// All state changes happen inside [`DisplayController::run`], one event at a time.
pub struct DisplayController<S, P, R> {
    store: ConfigStore,
    pages: PageLocator,
    timings: KioskTimings,
    surface: S,
    process: R,
    monitor: ConnectivityMonitor<P>,
    watchdog: TimerSlot,
    state: ControllerState,
    mailbox: mpsc::UnboundedSender<ControllerEvent>,
    inbox: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl<S, P, R> DisplayController<S, P, R>
where
    S: DisplaySurface,
    P: NetworkProbe,
    R: ProcessControl,
{
    pub fn new(
        store: ConfigStore,
        pages: PageLocator,
        timings: KioskTimings,
        probe: Arc<P>,
        surface: S,
        process: R,
    ) -> (Self, ControllerHandle) {
        let (mailbox, inbox) = mpsc::unbounded_channel();
        let handle = ControllerHandle {
            mailbox: mailbox.clone(),
        };
        let controller = Self {
            store,
            pages,
            timings,
            surface,
            process,
            monitor: ConnectivityMonitor::new(probe),
            watchdog: TimerSlot::new(),
            state: ControllerState::new(false),
            mailbox,
            inbox,
        };
        (controller, handle)
    }

    /// Starts with developer tools open.
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.state.debug_mode = debug_mode;
        self
    }

    /// Drives the state machine until a relaunch is requested.
    pub async fn run(mut self) {
        self.start();
        while let Some(event) = self.inbox.recv().await {
            self.handle_event(event);
            if self.state.restart_requested {
                break;
            }
        }
        debug!("display controller stopped");
    }

    fn start(&mut self) {
        if self.state.debug_mode {
            self.surface.set_devtools_open(true);
        }

        let url = resolve(&self.store, &ConnectivityState::Unknown, &self.pages);
        info!("startup: showing {url} while probing the network");
        self.surface.load_url(&url);
        self.state.mode = DisplayMode::Loading;

        let mailbox = self.mailbox.clone();
        self.monitor.probe_once(move |generation, state| {
            let _ = mailbox.send(ControllerEvent::ProbeCompleted { generation, state });
        });
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Page { message, reply } => self.handle_page_message(message, reply),
            ControllerEvent::Shell(command) => self.handle_shell_command(command),
            ControllerEvent::Snapshot(reply) => {
                let _ = reply.send(self.state.clone());
            }
            ControllerEvent::ProbeCompleted { generation, state } => {
                if !self.monitor.claim_probe(generation) {
                    return;
                }
                self.state.connectivity = state;
                if self.state.mode == DisplayMode::ConfigMenu {
                    return;
                }
                if self.state.connectivity.is_active() {
                    self.navigate_to_target();
                } else {
                    info!("startup probe found no active network");
                    self.state.is_launched_url_correct = false;
                    self.enter_fallback();
                }
            }
            ControllerEvent::WatchdogExpired { generation } => {
                if !self.watchdog.claim(generation) {
                    return;
                }
                warn!(
                    "page did not acknowledge within {:?}; showing the no-connection page",
                    self.timings.init_grace
                );
                self.state.is_launched_url_correct = false;
                self.enter_fallback();
            }
            ControllerEvent::Recovered { generation, state } => {
                if !self.monitor.claim_recovery(generation) {
                    return;
                }
                self.state.connectivity = state;
                if self.state.mode != DisplayMode::ConfigMenu {
                    self.navigate_to_target();
                }
            }
        }
    }

    fn handle_page_message(&mut self, message: PageMessage, reply: Option<Reply>) {
        debug!("page message: {}", message.name());
        let result = match message {
            PageMessage::Initializing => {
                self.acknowledge();
                Ok(ChannelReply::Accepted)
            }
            PageMessage::GetConfig => Ok(ChannelReply::Config(Box::new(
                AppConfigView::from_store(
                    &self.store,
                    self.state.debug_mode,
                    self.state.is_launched_url_correct,
                ),
            ))),
            PageMessage::GetMacAddress => {
                self.lookup_mac_address(reply);
                return;
            }
            PageMessage::UpdateConfig(patch) => {
                let persisted = self.store.merge(FLOWR_CONFIG_KEY, patch).map(|_| ());
                self.restart_after(persisted, FLOWR_CONFIG_KEY);
                Ok(ChannelReply::Accepted)
            }
            PageMessage::SetDebugMode(debug_mode) => {
                self.state.debug_mode = debug_mode;
                self.surface.set_devtools_open(debug_mode);
                Ok(ChannelReply::Accepted)
            }
            PageMessage::SetDeinterlacingMode(mode) => {
                self.persist(DEINTERLACING_KEY, mode);
                Ok(ChannelReply::Accepted)
            }
            PageMessage::SetKioskMode(is_kiosk) => {
                let persisted = self.store.set(IS_KIOSK_KEY, Value::Bool(is_kiosk));
                self.restart_after(persisted, IS_KIOSK_KEY);
                Ok(ChannelReply::Accepted)
            }
            PageMessage::SetExtUrl(ext_url) => {
                info!("new extUrl: {ext_url}");
                let persisted = self.store.set(EXT_URL_KEY, Value::String(ext_url));
                self.restart_after(persisted, EXT_URL_KEY);
                Ok(ChannelReply::Accepted)
            }
            PageMessage::OpenConfigMode => {
                self.enter_config_menu();
                Ok(ChannelReply::Accepted)
            }
        };

        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn handle_shell_command(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::EnterConfigMenu => self.enter_config_menu(),
            ShellCommand::LeaveConfigMenu => self.navigate_to_target(),
            ShellCommand::HideMenu => {
                self.state.menu_visible = false;
                self.surface.set_menu_visible(false);
                if self.state.mode == DisplayMode::ConfigMenu {
                    self.navigate_to_target();
                }
            }
            ShellCommand::WindowResized(bounds) => match serde_json::to_value(bounds) {
                Ok(value) => self.persist(WINDOW_BOUNDS_KEY, value),
                Err(error) => warn!("failed to encode window bounds: {error}"),
            },
            ShellCommand::MaximizedChanged(maximized) => {
                self.persist(IS_MAXIMIZED_KEY, Value::Bool(maximized))
            }
        }
    }

    fn acknowledge(&mut self) {
        if self.watchdog.cancel() {
            debug!("page acknowledged before the watchdog fired");
        }
        self.state.is_launched_url_correct = true;
        if self.state.mode == DisplayMode::Loading {
            self.state.mode = DisplayMode::Normal;
        }
    }

    fn navigate_to_target(&mut self) {
        self.monitor.stop();
        let url = resolve(&self.store, &self.state.connectivity, &self.pages);
        info!("loading {url}");
        self.surface.load_url(&url);
        self.state.mode = DisplayMode::Loading;

        let mailbox = self.mailbox.clone();
        self.watchdog.arm(self.timings.init_grace, move |generation| {
            let _ = mailbox.send(ControllerEvent::WatchdogExpired { generation });
        });
    }

    fn enter_fallback(&mut self) {
        self.watchdog.cancel();
        self.surface.load_url(&self.pages.url(LocalPage::NoConnection));
        self.state.mode = DisplayMode::Fallback;

        let mailbox = self.mailbox.clone();
        self.monitor
            .start_retry_loop(self.timings.retry_interval, move |generation, state| {
                let _ = mailbox.send(ControllerEvent::Recovered { generation, state });
            });
        info!(
            "retrying connectivity every {:?}",
            self.timings.retry_interval
        );
    }

    fn enter_config_menu(&mut self) {
        self.watchdog.cancel();
        self.monitor.stop();
        self.surface.load_url(&self.pages.url(LocalPage::Config));
        self.state.mode = DisplayMode::ConfigMenu;
        self.state.menu_visible = true;
        self.surface.set_menu_visible(true);
        info!("entered configuration mode");
    }

    fn lookup_mac_address(&self, reply: Option<Reply>) {
        let Some(reply) = reply else {
            return;
        };
        self.monitor.lookup_mac_address(move |result| {
            let result = result
                .map(ChannelReply::MacAddress)
                .map_err(|_| ChannelError::NoHardwareAddress);
            let _ = reply.send(result);
        });
    }

    fn persist(&mut self, key: &str, value: Value) {
        if let Err(error) = self.store.set(key, value) {
            warn!("failed to persist {key}: {error}");
        }
    }

    fn restart_after(&mut self, persisted: Result<(), StoreError>, key: &str) {
        if let Err(error) = persisted {
            warn!("failed to persist {key}, not restarting: {error}");
            return;
        }

        info!("{key} changed; relaunching");
        self.watchdog.cancel();
        self.monitor.stop_all();
        self.state.restart_requested = true;
        self.process.relaunch();
    }
}
