// Golden Egg Library Entry Point
// This file exposes all modules so they can be imported by main.rs
// and tested independently.

// Configuration
pub mod config;

// Pure logic modules (no Tauri imports)
pub mod modules;

// Tauri glue
pub mod shell;

use shell::commands;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_log::Builder::default().level(level).build())
        .setup(|app| {
            let config = config::ShellConfig::bundled()?;
            shell::install(app.handle(), &config)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::retry,
            commands::set_connectivity,
            commands::current_view,
            commands::report_progress
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
