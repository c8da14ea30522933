// Commands invoked from the overlay page and the injected progress script.

use tauri::State;

use super::ShellState;
use crate::modules::overlay::ShellView;
use crate::modules::surface::SurfaceEvent;

/// Retry button on the error and offline cards.
#[tauri::command]
pub fn retry(state: State<'_, ShellState>) {
    log::info!("[Commands] Retry requested");
    state.controller.load_content();
}

/// Driven by the overlay page's `online`/`offline` browser events.
#[tauri::command]
pub fn set_connectivity(state: State<'_, ShellState>, online: bool) {
    state.controller.set_connectivity(online);
}

/// Lets the overlay page render before the first `shell-view` event arrives.
#[tauri::command]
pub fn current_view(state: State<'_, ShellState>) -> ShellView {
    ShellView::from(&state.controller.snapshot())
}

#[tauri::command]
pub fn report_progress(state: State<'_, ShellState>, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("progress must be a finite number, got {}", value));
    }
    state.surface_events.emit(SurfaceEvent::Progress(value));
    Ok(())
}
