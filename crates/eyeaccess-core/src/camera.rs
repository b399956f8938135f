use serde::{Deserialize, Serialize};

/// Front camera permission as reported by the platform.
///
/// The preview is contextual only; frames are never processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPermission {
    /// Not answered yet.
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl CameraPermission {
    pub fn is_granted(&self) -> bool {
        matches!(self, CameraPermission::Granted)
    }
}
