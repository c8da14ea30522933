// Load lifecycle controller - pure logic, no Tauri imports.
//
// The controller runs as a single task that owns the LoadState. Every public
// operation and every surface callback is posted to that task as a command,
// so commits are serialized no matter which thread the signal came from.
// Readers get snapshots through a watch channel and never touch the state.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use url::Url;

use super::load_state::{LoadError, LoadErrorKind, LoadState};
use super::surface::{BrowserSurface, EventListener, LoadRequest, Subscription, SurfaceEvent, LOAD_TIMEOUT};

/// How long `Completed` must hold before the overlay is hidden.
pub const OVERLAY_HIDE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub target: Url,
    pub load_timeout: Duration,
    pub overlay_hide_delay: Duration,
}

impl ControllerConfig {
    pub fn new(target: Url) -> Self {
        Self {
            target,
            load_timeout: LOAD_TIMEOUT,
            overlay_hide_delay: OVERLAY_HIDE_DELAY,
        }
    }
}

/// What the presentation layer reads: the current state and whether an
/// overlay covers the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellSnapshot {
    pub state: LoadState,
    pub overlay_visible: bool,
}

impl Default for ShellSnapshot {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            overlay_visible: true,
        }
    }
}

enum Command {
    Attach(Arc<dyn BrowserSurface>),
    LoadContent,
    SetConnectivity(bool),
    Commit(LoadState),
    Signal(LoadState),
    HideOverlay { generation: u64 },
    Settle(oneshot::Sender<()>),
}

/// Cloneable entry point to a running controller. All methods are
/// non-blocking and may be called from any thread.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ShellSnapshot>,
}

impl ControllerHandle {
    /// Binds `surface`, replacing any previous one, and starts a load.
    pub fn attach<S: BrowserSurface + 'static>(&self, surface: S) {
        self.attach_shared(Arc::new(surface));
    }

    pub fn attach_shared(&self, surface: Arc<dyn BrowserSurface>) {
        self.send(Command::Attach(surface));
    }

    /// Loads the configured target. Ignored until a surface is attached.
    pub fn load_content(&self) {
        self.send(Command::LoadContent);
    }

    pub fn set_connectivity(&self, online: bool) {
        self.send(Command::SetConnectivity(online));
    }

    pub fn update_state(&self, state: LoadState) {
        self.send(Command::Commit(state));
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn state(&self) -> LoadState {
        self.snapshots.borrow().state.clone()
    }

    pub fn overlay_visible(&self) -> bool {
        self.snapshots.borrow().overlay_visible
    }

    pub fn subscribe(&self) -> watch::Receiver<ShellSnapshot> {
        self.snapshots.clone()
    }

    /// Resolves once every command posted before this call has been applied.
    pub async fn settle(&self) {
        let (done, wait) = oneshot::channel();
        if self.send(Command::Settle(done)) {
            let _ = wait.await;
        }
    }

    fn send(&self, command: Command) -> bool {
        if self.commands.send(command).is_err() {
            debug!("[LoadController] Controller stopped, dropping command");
            return false;
        }
        true
    }
}

pub struct LoadController {
    config: ControllerConfig,
    inbox: mpsc::UnboundedReceiver<Command>,
    // Weak so that callbacks and timers do not keep the task alive.
    outbox: mpsc::WeakUnboundedSender<Command>,
    snapshots: watch::Sender<ShellSnapshot>,
    surface: Option<Arc<dyn BrowserSurface>>,
    subscription: Option<Subscription>,
    pending_hide: Option<JoinHandle<()>>,
    generation: u64,
    state: LoadState,
    overlay_visible: bool,
}

impl LoadController {
    /// Creates the controller and its handle. The controller does nothing
    /// until [`LoadController::run`] is polled on some executor.
    pub fn new(config: ControllerConfig) -> (Self, ControllerHandle) {
        let (commands, inbox) = mpsc::unbounded_channel();
        let initial = ShellSnapshot::default();
        let (snapshots, snapshot_rx) = watch::channel(initial.clone());

        let controller = Self {
            config,
            inbox,
            outbox: commands.downgrade(),
            snapshots,
            surface: None,
            subscription: None,
            pending_hide: None,
            generation: 0,
            state: initial.state,
            overlay_visible: initial.overlay_visible,
        };
        let handle = ControllerHandle {
            commands,
            snapshots: snapshot_rx,
        };
        (controller, handle)
    }

    /// Creates the controller and runs it on the current tokio runtime.
    pub fn spawn(config: ControllerConfig) -> ControllerHandle {
        let (controller, handle) = Self::new(config);
        tokio::spawn(controller.run());
        handle
    }

    /// Processes commands until every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            self.handle(command);
        }
        self.teardown();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Attach(surface) => self.attach(surface),
            Command::LoadContent => self.load_content(),
            Command::SetConnectivity(online) => self.set_connectivity(online),
            Command::Commit(state) => self.commit(state),
            Command::Signal(state) => self.signal(state),
            Command::HideOverlay { generation } => self.hide_overlay(generation),
            Command::Settle(done) => {
                let _ = done.send(());
            }
        }
    }

    fn attach(&mut self, surface: Arc<dyn BrowserSurface>) {
        if let Some(mut previous) = self.subscription.take() {
            info!("[LoadController] Replacing attached surface");
            previous.cancel();
        }
        self.subscription = Some(surface.subscribe(self.listener()));
        self.surface = Some(surface);
        info!("[LoadController] Surface attached, target {}", self.config.target);
        self.load_content();
    }

    fn listener(&self) -> EventListener {
        let outbox = self.outbox.clone();
        Arc::new(move |event: SurfaceEvent| {
            if let Some(commands) = outbox.upgrade() {
                let _ = commands.send(Command::Signal(event.into_state()));
            }
        })
    }

    fn load_content(&mut self) {
        let Some(surface) = self.surface.clone() else {
            debug!("[LoadController] No surface attached, ignoring load request");
            return;
        };

        let request = LoadRequest::new(self.config.target.clone()).with_timeout(self.config.load_timeout);
        self.commit(LoadState::Loading(0.0));
        if let Err(e) = surface.load(&request) {
            warn!("[LoadController] Surface refused load of {}: {}", request.url, e);
            self.commit(LoadState::Failed(LoadError::with_kind(e.to_string(), LoadErrorKind::Surface)));
        }
    }

    fn set_connectivity(&mut self, online: bool) {
        info!("[LoadController] Connectivity changed: online={}", online);
        if online {
            if self.state.is_offline() {
                self.load_content();
            }
        } else {
            self.commit(LoadState::Offline);
        }
    }

    fn signal(&mut self, state: LoadState) {
        // Whatever was in flight when connectivity dropped is stale.
        if self.state.is_offline() {
            debug!("[LoadController] Offline, ignoring surface signal {:?}", state);
            return;
        }
        self.commit(state);
    }

    fn commit(&mut self, state: LoadState) {
        // Progress is stored clamped, and a full reading is a completion.
        let state = match state {
            LoadState::Loading(progress) => LoadState::loading(progress),
            other => other,
        };
        // Offline is only left through a new load attempt.
        if self.state.is_offline() && !matches!(state, LoadState::Loading(_) | LoadState::Offline) {
            debug!("[LoadController] Offline, rejecting {:?}", state);
            return;
        }
        // A repeated Completed (progress 1.0 and the finish callback) keeps
        // the original hide deadline.
        if state.is_completed() && self.state.is_completed() {
            return;
        }

        self.generation = self.generation.wrapping_add(1);
        if let Some(pending) = self.pending_hide.take() {
            pending.abort();
        }

        debug!("[LoadController] {:?} -> {:?}", self.state, state);
        match state {
            LoadState::Completed => self.schedule_hide(),
            LoadState::Loading(_) | LoadState::Failed(_) | LoadState::Offline => {
                self.overlay_visible = true;
            }
            LoadState::Idle => {}
        }
        self.state = state;
        self.publish();
    }

    fn schedule_hide(&mut self) {
        let generation = self.generation;
        let delay = self.config.overlay_hide_delay;
        let outbox = self.outbox.clone();
        self.pending_hide = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(commands) = outbox.upgrade() {
                let _ = commands.send(Command::HideOverlay { generation });
            }
        }));
    }

    fn hide_overlay(&mut self, generation: u64) {
        // Abort can lose the race with an already-queued command.
        if generation != self.generation || !self.state.is_completed() {
            debug!("[LoadController] Ignoring stale overlay hide");
            return;
        }
        self.pending_hide = None;
        self.overlay_visible = false;
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(ShellSnapshot {
            state: self.state.clone(),
            overlay_visible: self.overlay_visible,
        });
    }

    fn teardown(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        if let Some(pending) = self.pending_hide.take() {
            pending.abort();
        }
        debug!("[LoadController] Stopped");
    }
}
