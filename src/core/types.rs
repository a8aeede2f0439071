//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Network-assigned identifier for a connected player (the socket id the
/// server handed out). Also used to key transient animation state for
/// non-player entities such as emotes and the server shadow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Milliseconds on the client's logical clock. All timers in the engine are
/// deadlines against this clock; tests drive it manually.
pub type Millis = u64;
