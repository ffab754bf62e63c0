//! System status models

use serde::{Deserialize, Serialize};

/// Processor state reported by `/api/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemState {
    Running,
    Warning,
    Error,
    Stopped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl SystemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemState::Running => "RUNNING",
            SystemState::Warning => "WARNING",
            SystemState::Error => "ERROR",
            SystemState::Stopped => "STOPPED",
            SystemState::Unknown => "UNKNOWN",
        }
    }
}

/// Top-level connectivity badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Warning,
    Offline,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Online => "Online",
            Connectivity::Warning => "Warning",
            Connectivity::Offline => "Offline",
        }
    }
}

impl From<SystemState> for Connectivity {
    fn from(state: SystemState) -> Self {
        match state {
            SystemState::Running => Connectivity::Online,
            SystemState::Warning => Connectivity::Warning,
            _ => Connectivity::Offline,
        }
    }
}

/// Response of `/api/status`, replaced wholesale on every poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    #[serde(default, deserialize_with = "lenient_state")]
    pub status: SystemState,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub transactions_processed: u64,
    /// Set by the processor when its own status lookup failed
    #[serde(default)]
    pub error: Option<String>,
}

fn lenient_state<'de, D>(deserializer: D) -> Result<SystemState, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => match s.trim().to_uppercase().as_str() {
            "RUNNING" => SystemState::Running,
            "WARNING" => SystemState::Warning,
            "ERROR" => SystemState::Error,
            "STOPPED" => SystemState::Stopped,
            _ => SystemState::Unknown,
        },
        _ => SystemState::Unknown,
    })
}
