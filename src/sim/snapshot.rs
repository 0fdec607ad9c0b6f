//! Session snapshots
//!
//! A snapshot is a versioned JSON envelope around the whole `GameState`,
//! both RNG streams included, so a restored session continues exactly where
//! the saved one left off. The per-tick event feed is not part of it.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::state::GameState;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u32 },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed snapshot: {err}"),
            Self::UnsupportedVersion { found } => write!(
                f,
                "unsupported snapshot version: {found} (expected {SNAPSHOT_VERSION})"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct Envelope {
    state: GameState,
}

/// Only the version, so a future format is rejected before its body is parsed
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl GameState {
    /// Serialize the full session
    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_string(&EnvelopeRef {
            version: SNAPSHOT_VERSION,
            state: self,
        })?;
        Ok(json)
    }

    /// Rebuild a session from `to_snapshot` output
    pub fn from_snapshot(json: &str) -> Result<Self, SnapshotError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: probe.version,
            });
        }

        let envelope: Envelope = serde_json::from_str(json)?;
        log::debug!(
            "Restored session seed={} at frame {}",
            envelope.state.seed,
            envelope.state.frame
        );
        Ok(envelope.state)
    }
}
