// Declaring the app commands gives each one an allow-* permission, so the
// capabilities decide which webview may call what.
const COMMANDS: &[&str] = &["retry", "set_connectivity", "current_view", "report_progress"];

fn main() {
    tauri_build::try_build(
        tauri_build::Attributes::new()
            .app_manifest(tauri_build::AppManifest::new().commands(COMMANDS)),
    )
    .expect("failed to run tauri-build");
}
