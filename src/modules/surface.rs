// Browser surface capability - pure logic, no Tauri imports.
// The controller only needs "load this request" and "tell me what happened";
// anything else the renderer can do stays behind the implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use url::Url;

use super::load_state::{LoadError, LoadState};

/// Client-side timeout applied to every load request.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// A plain GET navigation to `url`. No headers, no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub url: Url,
    pub timeout: Duration,
}

impl LoadRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: LOAD_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Lifecycle signals emitted by a surface. May arrive on any thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    NavigationStarted,
    Progress(f64),
    NavigationFinished,
    /// Provisional and committed failures are not distinguished.
    NavigationFailed(LoadError),
}

impl SurfaceEvent {
    pub fn into_state(self) -> LoadState {
        match self {
            Self::NavigationStarted => LoadState::Loading(0.0),
            Self::Progress(progress) => LoadState::loading(progress),
            Self::NavigationFinished => LoadState::Completed,
            Self::NavigationFailed(error) => LoadState::Failed(error),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("navigation could not be started: {0}")]
    Navigation(String),
    #[error("browser surface is no longer available")]
    Detached,
}

pub type EventListener = Arc<dyn Fn(SurfaceEvent) + Send + Sync>;

/// The narrow slice of an embedded renderer the load controller depends on.
pub trait BrowserSurface: Send + Sync {
    /// Starts navigating to `request`. Returns once the request is issued;
    /// the outcome arrives later as events.
    fn load(&self, request: &LoadRequest) -> Result<(), SurfaceError>;

    /// Registers `listener` for lifecycle events until the returned handle is
    /// cancelled or dropped.
    fn subscribe(&self, listener: EventListener) -> Subscription;
}

impl<T: BrowserSurface + ?Sized> BrowserSurface for Arc<T> {
    fn load(&self, request: &LoadRequest) -> Result<(), SurfaceError> {
        (**self).load(request)
    }

    fn subscribe(&self, listener: EventListener) -> Subscription {
        (**self).subscribe(listener)
    }
}

/// Cancellable registration handle. Dropping it cancels.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Fan-out of surface events to registered listeners.
///
/// Cloning shares the same listener set, so a registry can be handed to the
/// renderer callbacks while the surface keeps its own copy.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, EventListener>>,
}

impl RegistryInner {
    fn listeners(&self) -> MutexGuard<'_, BTreeMap<u64, EventListener>> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: EventListener) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().insert(id, listener);

        let registry: Weak<RegistryInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = registry.upgrade() {
                inner.listeners().remove(&id);
            }
        })
    }

    /// Delivers `event` to every listener, in registration order.
    pub fn emit(&self, event: SurfaceEvent) {
        // Listeners run outside the lock so they may subscribe or cancel.
        let listeners: Vec<EventListener> = self.inner.listeners().values().cloned().collect();
        if listeners.is_empty() {
            log::debug!("[Surface] Dropping {:?}: no listeners", event);
            return;
        }
        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.listeners().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::load_state::LoadErrorKind;
    use rstest::rstest;

    fn recording_listener() -> (EventListener, Arc<Mutex<Vec<SurfaceEvent>>>) {
        let seen: Arc<Mutex<Vec<SurfaceEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: EventListener = Arc::new(move |event: SurfaceEvent| sink.lock().unwrap().push(event));
        (listener, seen)
    }

    #[rstest]
    #[case(SurfaceEvent::NavigationStarted, LoadState::Loading(0.0))]
    #[case(SurfaceEvent::Progress(0.42), LoadState::Loading(0.42))]
    #[case(SurfaceEvent::Progress(-1.0), LoadState::Loading(0.0))]
    #[case(SurfaceEvent::Progress(1.0), LoadState::Completed)]
    #[case(SurfaceEvent::Progress(3.0), LoadState::Completed)]
    #[case(SurfaceEvent::NavigationFinished, LoadState::Completed)]
    #[case(
        SurfaceEvent::NavigationFailed(LoadError::new("timed out")),
        LoadState::Failed(LoadError::new("timed out"))
    )]
    fn test_event_to_state(#[case] event: SurfaceEvent, #[case] expected: LoadState) {
        assert_eq!(event.into_state(), expected);
    }

    #[test]
    fn test_failed_event_keeps_error_verbatim() {
        let error = LoadError::with_kind("ssl handshake failed", LoadErrorKind::Navigation);
        match SurfaceEvent::NavigationFailed(error).into_state() {
            LoadState::Failed(stored) => {
                assert_eq!(stored.description(), "ssl handshake failed");
                assert_eq!(stored.kind(), LoadErrorKind::Navigation);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_request_defaults_to_ten_second_timeout() {
        let request = LoadRequest::new(Url::parse("https://example.test/").unwrap());
        assert_eq!(request.timeout, Duration::from_secs(10));
        assert_eq!(request.url.as_str(), "https://example.test/");
    }

    #[test]
    fn test_registry_delivers_until_cancelled() {
        let registry = ListenerRegistry::new();
        let (listener, seen) = recording_listener();

        let mut subscription = registry.subscribe(listener);
        registry.emit(SurfaceEvent::NavigationStarted);
        subscription.cancel();
        registry.emit(SurfaceEvent::NavigationFinished);

        assert_eq!(*seen.lock().unwrap(), vec![SurfaceEvent::NavigationStarted]);
        assert!(registry.is_empty());
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let registry = ListenerRegistry::new();
        let (listener, seen) = recording_listener();

        {
            let _subscription = registry.subscribe(listener);
            assert_eq!(registry.len(), 1);
        }
        registry.emit(SurfaceEvent::Progress(0.5));

        assert!(seen.lock().unwrap().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let registry = ListenerRegistry::new();
        let (first, _) = recording_listener();
        let (second, seen) = recording_listener();

        let mut a = registry.subscribe(first);
        let _b = registry.subscribe(second);
        a.cancel();
        a.cancel();
        registry.emit(SurfaceEvent::NavigationFinished);

        assert_eq!(registry.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![SurfaceEvent::NavigationFinished]);
    }

    #[test]
    fn test_subscription_outliving_registry_is_harmless() {
        let registry = ListenerRegistry::new();
        let (listener, _) = recording_listener();
        let mut subscription = registry.subscribe(listener);
        drop(registry);
        subscription.cancel();
    }
}
