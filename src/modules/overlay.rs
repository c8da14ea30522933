// Derived presentation model - pure logic, no Tauri imports.
// The shell UI renders exactly what ShellView says; it never inspects
// LoadState itself.

use serde::Serialize;

use super::controller::ShellSnapshot;
use super::load_state::{clamp_progress, LoadState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Overlay {
    Hidden,
    Progress { percent: u8 },
    Error { description: String },
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub overlay: Overlay,
    /// The page itself is only revealed once the overlay has gone.
    pub content_visible: bool,
}

impl ShellView {
    pub fn from_snapshot(snapshot: &ShellSnapshot) -> Self {
        let overlay = if snapshot.overlay_visible {
            match &snapshot.state {
                LoadState::Loading(progress) => Overlay::Progress {
                    percent: progress_percent(*progress),
                },
                LoadState::Failed(error) => Overlay::Error {
                    description: error.description().to_string(),
                },
                LoadState::Offline => Overlay::Offline,
                LoadState::Idle | LoadState::Completed => Overlay::Hidden,
            }
        } else {
            Overlay::Hidden
        };

        Self {
            overlay,
            content_visible: snapshot.state.is_completed() && !snapshot.overlay_visible,
        }
    }
}

impl From<&ShellSnapshot> for ShellView {
    fn from(snapshot: &ShellSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

/// Whole percent shown next to the progress bar, rounded down.
pub fn progress_percent(progress: f64) -> u8 {
    (clamp_progress(progress) * 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::load_state::LoadError;
    use rstest::rstest;

    fn snapshot(state: LoadState, overlay_visible: bool) -> ShellSnapshot {
        ShellSnapshot {
            state,
            overlay_visible,
        }
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(0.299, 29)]
    #[case(0.5, 50)]
    #[case(0.999, 99)]
    #[case(1.0, 100)]
    #[case(-2.0, 0)]
    fn test_progress_percent(#[case] progress: f64, #[case] expected: u8) {
        assert_eq!(progress_percent(progress), expected);
    }

    #[test]
    fn test_loading_shows_progress() {
        let view = ShellView::from(&snapshot(LoadState::Loading(0.375), true));
        assert_eq!(view.overlay, Overlay::Progress { percent: 37 });
        assert!(!view.content_visible);
    }

    #[test]
    fn test_failure_shows_error_card() {
        let view = ShellView::from(&snapshot(LoadState::Failed(LoadError::new("timed out")), true));
        assert_eq!(
            view.overlay,
            Overlay::Error {
                description: "timed out".to_string()
            }
        );
    }

    #[test]
    fn test_offline_shows_offline_card() {
        let view = ShellView::from(&snapshot(LoadState::Offline, true));
        assert_eq!(view.overlay, Overlay::Offline);
        assert!(!view.content_visible);
    }

    #[rstest]
    #[case(LoadState::Idle, true, false)]
    #[case(LoadState::Completed, true, false)]
    #[case(LoadState::Completed, false, true)]
    fn test_content_revealed_only_after_overlay_hides(
        #[case] state: LoadState,
        #[case] overlay_visible: bool,
        #[case] content_visible: bool,
    ) {
        let view = ShellView::from(&snapshot(state, overlay_visible));
        assert_eq!(view.overlay, Overlay::Hidden);
        assert_eq!(view.content_visible, content_visible);
    }

    #[test]
    fn test_serialized_for_ui() {
        let view = ShellView::from(&snapshot(LoadState::Loading(0.5), true));
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({
                "overlay": { "kind": "progress", "percent": 50 },
                "contentVisible": false
            })
        );
    }
}
