// Page-load lifecycle state - pure logic, no Tauri imports.
// The controller is the only writer; everything else reads snapshots.

use serde::Serialize;

/// Progress readings closer together than this are the same reading.
pub const PROGRESS_EPSILON: f64 = 0.001;

/// Coarse origin of a load failure. Not part of error identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadErrorKind {
    Timeout,
    Navigation,
    Surface,
}

/// A failure reported by the browser surface.
///
/// Two errors are equal when their descriptions are equal; `kind` is carried
/// for logging and display only.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{description}")]
pub struct LoadError {
    description: String,
    kind: LoadErrorKind,
}

impl LoadError {
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_kind(description, LoadErrorKind::Navigation)
    }

    pub fn with_kind(description: impl Into<String>, kind: LoadErrorKind) -> Self {
        Self {
            description: description.into(),
            kind,
        }
    }

    pub fn timed_out() -> Self {
        Self::with_kind("timed out", LoadErrorKind::Timeout)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> LoadErrorKind {
        self.kind
    }
}

impl PartialEq for LoadError {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

impl Eq for LoadError {}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// In flight; progress is always in `[0, 1)`.
    Loading(f64),
    Completed,
    Failed(LoadError),
    Offline,
}

impl LoadState {
    /// Builds the state for a raw progress reading.
    ///
    /// The reading is clamped into `[0, 1]`; a full reading is `Completed`,
    /// never `Loading(1.0)`.
    pub fn loading(progress: f64) -> Self {
        let progress = clamp_progress(progress);
        if progress >= 1.0 {
            Self::Completed
        } else {
            Self::Loading(progress)
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline)
    }
}

impl PartialEq for LoadState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle)
            | (Self::Completed, Self::Completed)
            | (Self::Offline, Self::Offline) => true,
            (Self::Loading(lhs), Self::Loading(rhs)) => (lhs - rhs).abs() < PROGRESS_EPSILON,
            (Self::Failed(lhs), Self::Failed(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

/// Clamps a progress reading into `[0, 1]`. NaN reads as no progress.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, LoadState::Loading(0.0))]
    #[case(0.3, LoadState::Loading(0.3))]
    #[case(0.999, LoadState::Loading(0.999))]
    #[case(-0.5, LoadState::Loading(0.0))]
    #[case(f64::NAN, LoadState::Loading(0.0))]
    #[case(1.0, LoadState::Completed)]
    #[case(1.7, LoadState::Completed)]
    #[case(f64::INFINITY, LoadState::Completed)]
    fn test_loading_clamps_and_completes(#[case] raw: f64, #[case] expected: LoadState) {
        assert_eq!(LoadState::loading(raw), expected);
    }

    #[test]
    fn test_loading_never_stores_full_progress() {
        for raw in [0.9999, 1.0, 1.0001, 25.0] {
            if let LoadState::Loading(p) = LoadState::loading(raw) {
                assert!(p < 1.0, "stored {p} for {raw}");
            }
        }
    }

    #[rstest]
    #[case(0.5, 0.5, true)]
    #[case(0.5, 0.5009, true)]
    #[case(0.5009, 0.5, true)]
    #[case(0.5, 0.502, false)]
    #[case(0.1, 0.9, false)]
    fn test_loading_equality_tolerance(#[case] lhs: f64, #[case] rhs: f64, #[case] equal: bool) {
        assert_eq!(LoadState::Loading(lhs) == LoadState::Loading(rhs), equal);
    }

    #[test]
    fn test_failed_equality_uses_description_only() {
        let timeout = LoadState::Failed(LoadError::with_kind("timed out", LoadErrorKind::Timeout));
        let navigation = LoadState::Failed(LoadError::with_kind("timed out", LoadErrorKind::Navigation));
        let other = LoadState::Failed(LoadError::new("host not found"));

        assert_eq!(timeout, navigation);
        assert_ne!(timeout, other);
    }

    #[test]
    fn test_distinct_variants_never_equal() {
        let states = [
            LoadState::Idle,
            LoadState::Loading(0.0),
            LoadState::Completed,
            LoadState::Failed(LoadError::new("x")),
            LoadState::Offline,
        ];
        for (i, lhs) in states.iter().enumerate() {
            for (j, rhs) in states.iter().enumerate() {
                assert_eq!(lhs == rhs, i == j, "{lhs:?} vs {rhs:?}");
            }
        }
    }

    #[test]
    fn test_error_display_is_description() {
        let error = LoadError::timed_out();
        assert_eq!(error.to_string(), "timed out");
        assert_eq!(error.kind(), LoadErrorKind::Timeout);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(LoadState::Loading(0.25)).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "loading", "detail": 0.25 }));

        let json = serde_json::to_value(LoadState::Offline).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "offline" }));
    }
}
