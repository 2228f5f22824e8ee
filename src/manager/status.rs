//! Manager display status and capability flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display obligation of a representation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerStatus {
    /// No pending display obligation.
    Idle,
    /// A display or hide request has been issued but not yet satisfied by the
    /// consuming view.
    PendingDisplay,
}

impl ManagerStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingDisplay)
    }
}

impl Default for ManagerStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for ManagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::PendingDisplay => write!(f, "pending_display"),
        }
    }
}

impl std::str::FromStr for ManagerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "pending_display" => Ok(Self::PendingDisplay),
            _ => Err(format!("Invalid manager status: {s}")),
        }
    }
}

/// Capability record replacing a specialization hierarchy: what a manager's
/// pools can deliver, flat flags instead of virtual dispatch.
///
/// `has_actors` gates whether `display` pulls from pools at all and
/// `needs_actors` whether the manager waits for pool publications before
/// settling to idle. `exports_volume_data` is queried by frontends (like the
/// name and icon) to decide whether to offer volume export for this
/// representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerFlags {
    /// The manager sources renderable actors from its pools.
    pub has_actors: bool,
    /// The manager requires actors to be computed before display.
    pub needs_actors: bool,
    /// The manager can export raw volume data alongside actors.
    pub exports_volume_data: bool,
}

impl ManagerFlags {
    /// Flags of a plain actor-displaying manager.
    pub fn actors() -> Self {
        Self {
            has_actors: true,
            needs_actors: true,
            exports_volume_data: false,
        }
    }

    /// Flags of a volumetric manager whose data can also be exported raw.
    pub fn volumetric() -> Self {
        Self {
            has_actors: true,
            needs_actors: true,
            exports_volume_data: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(ManagerStatus::Idle.is_idle());
        assert!(!ManagerStatus::Idle.is_pending());
        assert!(ManagerStatus::PendingDisplay.is_pending());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(ManagerStatus::PendingDisplay.to_string(), "pending_display");
        assert_eq!(
            "idle".parse::<ManagerStatus>().unwrap(),
            ManagerStatus::Idle
        );
        assert!("busy".parse::<ManagerStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_idle() {
        assert_eq!(ManagerStatus::default(), ManagerStatus::Idle);
    }

    #[test]
    fn test_flag_presets() {
        let plain = ManagerFlags::actors();
        assert!(plain.has_actors && plain.needs_actors);
        assert!(!plain.exports_volume_data);

        let volumetric = ManagerFlags::volumetric();
        assert!(volumetric.has_actors && volumetric.needs_actors);
        assert!(volumetric.exports_volume_data);

        let widget = ManagerFlags::default();
        assert!(!widget.has_actors && !widget.needs_actors);
    }
}
