// Tauri glue: wires the pure controller to a real window.
//
// Layout: the `main` webview hosts the overlay page (ui/index.html); the
// `content` child webview sits on top of it and is only shown once the page
// has loaded and the overlay is gone.

use log::info;
use tauri::{AppHandle, Manager, Runtime};

use crate::config::{ConfigError, ShellConfig};
use crate::modules::controller::{ControllerHandle, LoadController};
use crate::modules::surface::ListenerRegistry;

pub mod bridge;
pub mod commands;
pub mod webview;

use webview::WebviewSurface;

pub const MAIN_LABEL: &str = "main";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tauri(#[from] tauri::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("window {0:?} not found")]
    MissingWindow(&'static str),
}

/// Managed state shared with the commands.
pub struct ShellState {
    pub controller: ControllerHandle,
    pub surface_events: ListenerRegistry,
}

/// Starts the controller, builds the content webview and binds the two.
pub fn install<R: Runtime>(app: &AppHandle<R>, config: &ShellConfig) -> Result<(), ShellError> {
    let window = app
        .get_window(MAIN_LABEL)
        .ok_or(ShellError::MissingWindow(MAIN_LABEL))?;
    window.set_title(&config.window_title)?;

    let (controller, handle) = LoadController::new(config.controller_config()?);
    tauri::async_runtime::spawn(controller.run());

    let surface = WebviewSurface::build(&window)?;
    let content = surface.webview().clone();
    bridge::spawn_view_bridge(app.clone(), content.clone(), handle.subscribe());
    bridge::track_window_size(&window, content);

    app.manage(ShellState {
        controller: handle.clone(),
        surface_events: surface.events(),
    });

    info!("[Shell] Loading {}", config.target_url);
    handle.attach(surface);
    Ok(())
}
