//! Advisory output types: Severity, Alert, Priority, Recommendation

use serde::{Deserialize, Serialize};

use super::ZoneStatus;

/// Alert severity. Ordered so that `Critical` is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl From<ZoneStatus> for Severity {
    fn from(status: ZoneStatus) -> Self {
        match status {
            ZoneStatus::Normal => Severity::Info,
            ZoneStatus::Warning => Severity::Warning,
            ZoneStatus::Critical => Severity::Critical,
        }
    }
}

/// A human-actionable alert. Generated fresh per call, never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    /// Entity the alert is about (zone, vessel IMO, facility, "network", ...)
    pub entity: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// Expected lead time, when the finding has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    /// Simulation hour the finding refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
}

/// Recommendation priority. Declared most-urgent first, so sorting ascending
/// puts critical actions at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// A prioritized recommended action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: String,
    pub icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_tracks_zone_tier() {
        assert_eq!(Severity::from(ZoneStatus::Critical), Severity::Critical);
        assert_eq!(Severity::from(ZoneStatus::Warning), Severity::Warning);
        assert!(Severity::Critical > Severity::Warning);
    }

    #[test]
    fn test_priority_sorts_critical_first() {
        let mut p = vec![Priority::Low, Priority::Critical, Priority::Medium, Priority::High];
        p.sort();
        assert_eq!(p, vec![Priority::Critical, Priority::High, Priority::Medium, Priority::Low]);
    }
}
