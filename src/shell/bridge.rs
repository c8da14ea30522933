// Pushes every controller snapshot to the overlay page and keeps the content
// webview's visibility and bounds in step with it.

use log::warn;
use tauri::{AppHandle, Emitter, PhysicalPosition, Runtime, Webview, Window};
use tokio::sync::watch;

use super::MAIN_LABEL;
use crate::modules::controller::ShellSnapshot;
use crate::modules::overlay::ShellView;

pub const VIEW_EVENT: &str = "shell-view";

pub fn spawn_view_bridge<R: Runtime>(
    app: AppHandle<R>,
    content: Webview<R>,
    mut snapshots: watch::Receiver<ShellSnapshot>,
) {
    tauri::async_runtime::spawn(async move {
        loop {
            let view = ShellView::from(&*snapshots.borrow_and_update());
            apply_view(&app, &content, &view);
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    });
}

fn apply_view<R: Runtime>(app: &AppHandle<R>, content: &Webview<R>, view: &ShellView) {
    let toggled = if view.content_visible {
        content.show()
    } else {
        content.hide()
    };
    if let Err(e) = toggled {
        warn!("[Bridge] Failed to toggle content webview: {}", e);
    }

    if let Err(e) = app.emit_to(MAIN_LABEL, VIEW_EVENT, view) {
        warn!("[Bridge] Failed to emit {}: {}", VIEW_EVENT, e);
    }
}

/// The content webview always covers the whole window.
pub fn track_window_size<R: Runtime>(window: &Window<R>, content: Webview<R>) {
    window.on_window_event(move |event| {
        if let tauri::WindowEvent::Resized(size) = event {
            let bounds = tauri::Rect {
                position: tauri::Position::Physical(PhysicalPosition::new(0, 0)),
                size: tauri::Size::Physical(*size),
            };
            if let Err(e) = content.set_bounds(bounds) {
                warn!("[Bridge] Failed to resize content webview: {}", e);
            }
        }
    });
}
