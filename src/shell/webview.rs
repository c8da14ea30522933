// BrowserSurface over a Tauri child webview.
//
// wry reports page-load start and finish only. Progress comes from the
// injected progress.js script, and the request timeout is enforced here with
// a per-navigation deadline.

use std::sync::Arc;

use log::{debug, warn};
use tauri::webview::{PageLoadEvent, PageLoadPayload};
use tauri::{PhysicalPosition, Runtime, Webview, WebviewBuilder, WebviewUrl, Window};
use url::Url;

use super::ShellError;
use crate::modules::deadline::NavigationDeadline;
use crate::modules::load_state::LoadError;
use crate::modules::surface::{
    BrowserSurface, EventListener, ListenerRegistry, LoadRequest, Subscription, SurfaceError, SurfaceEvent,
};

pub const CONTENT_LABEL: &str = "content";

const PROGRESS_SCRIPT: &str = include_str!("progress.js");

pub struct WebviewSurface<R: Runtime> {
    webview: Webview<R>,
    events: ListenerRegistry,
    deadline: Arc<NavigationDeadline>,
}

impl<R: Runtime> WebviewSurface<R> {
    /// Adds the content webview to `window`, covering its whole client area.
    /// It starts on about:blank; nothing is fetched until the first load.
    pub fn build(window: &Window<R>) -> Result<Self, ShellError> {
        let events = ListenerRegistry::new();
        let deadline = Arc::new(NavigationDeadline::new());

        let blank = Url::parse("about:blank")?;
        let builder = WebviewBuilder::new(CONTENT_LABEL, WebviewUrl::External(blank))
            .initialization_script(PROGRESS_SCRIPT)
            .on_page_load({
                let events = events.clone();
                let deadline = deadline.clone();
                move |_webview, payload| on_page_load(&events, &deadline, &payload)
            });

        let size = window.inner_size()?;
        let webview = window.add_child(builder, PhysicalPosition::new(0, 0), size)?;

        Ok(Self {
            webview,
            events,
            deadline,
        })
    }

    pub fn webview(&self) -> &Webview<R> {
        &self.webview
    }

    /// Shared with the `report_progress` command.
    pub fn events(&self) -> ListenerRegistry {
        self.events.clone()
    }
}

fn on_page_load(events: &ListenerRegistry, deadline: &NavigationDeadline, payload: &PageLoadPayload<'_>) {
    // The placeholder page is not a navigation anyone asked for.
    if payload.url().scheme() == "about" {
        return;
    }
    match payload.event() {
        PageLoadEvent::Started => {
            debug!("[Webview] Started {}", payload.url());
            events.emit(SurfaceEvent::NavigationStarted);
        }
        PageLoadEvent::Finished => {
            debug!("[Webview] Finished {}", payload.url());
            deadline.settle();
            events.emit(SurfaceEvent::NavigationFinished);
        }
    }
}

impl<R: Runtime> BrowserSurface for WebviewSurface<R> {
    fn load(&self, request: &LoadRequest) -> Result<(), SurfaceError> {
        let ticket = self.deadline.arm_with(|| {
            self.webview
                .navigate(request.url.clone())
                .map_err(|e| SurfaceError::Navigation(e.to_string()))
        })?;

        let deadline = self.deadline.clone();
        let events = self.events.clone();
        let timeout = request.timeout;
        let url = request.url.clone();
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(timeout).await;
            if deadline.expire(ticket) {
                warn!("[Webview] Load of {} timed out after {:?}", url, timeout);
                events.emit(SurfaceEvent::NavigationFailed(LoadError::timed_out()));
            }
        });
        Ok(())
    }

    fn subscribe(&self, listener: EventListener) -> Subscription {
        self.events.subscribe(listener)
    }
}
