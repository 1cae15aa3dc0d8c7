//! Deterministic message templates.
//!
//! Every alert and recommendation string is built here from the finding's
//! identifying fields only (names, scores, hours, distances), so the same
//! input always yields byte-identical text.

use crate::types::{AnomalyRecord, Severity, Zone, ZoneStatus};

/// `12345` → `"12,345"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}

// ============================================================================
// Fragility
// ============================================================================

/// Per-zone alert text, for warning and critical zones.
pub fn zone_alert(zone: &Zone) -> Option<String> {
    match zone.status {
        ZoneStatus::Critical => Some(format!(
            "{}: fragility {:.1}/100 (critical). Supply failure likely without intervention.",
            zone.name, zone.score
        )),
        ZoneStatus::Warning => Some(format!(
            "{}: fragility {:.1}/100 (warning). Elevated stress on local supply.",
            zone.name, zone.score
        )),
        ZoneStatus::Normal => None,
    }
}

/// Network-wide outlook from the highest zone score:
/// (severity, message, timeframe).
pub fn network_outlook(max_score: f64) -> Option<(Severity, &'static str, &'static str)> {
    if max_score > 80.0 {
        Some((
            Severity::Critical,
            "System collapse imminent in next 2-6 hours. Immediate intervention required.",
            "2-6 hours",
        ))
    } else if max_score > 60.0 {
        Some((
            Severity::Warning,
            "System instability expected in next 6-24 hours. Preventive measures recommended.",
            "6-24 hours",
        ))
    } else if max_score > 40.0 {
        Some((
            Severity::Info,
            "Moderate stress detected. Monitor conditions closely.",
            "24-48 hours",
        ))
    } else {
        None
    }
}

pub fn tanker_deployment(critical: &[&Zone]) -> String {
    format!(
        "Increase tanker deployment to critical zones immediately: {}",
        join_names(critical.iter().map(|z| z.name.as_str()))
    )
}

pub fn backup_pumps(critical: &[&Zone]) -> String {
    format!(
        "Activate backup pumps in affected areas: {}",
        join_names(critical.iter().map(|z| z.name.as_str()))
    )
}

pub fn external_supply(zone_names: &[&str]) -> String {
    format!(
        "Arrange external tanker supply for zones with no reachable depot: {}",
        join_names(zone_names.iter().copied())
    )
}

pub const CONSERVATION_NOTICE: &str = "Issue conservation alerts to residents in stressed zones";

pub fn maintenance(warning: &[&Zone]) -> String {
    format!(
        "Prioritize maintenance on high-risk zone infrastructure: {}",
        join_names(warning.iter().map(|z| z.name.as_str()))
    )
}

pub const ALL_CLEAR: &str = "All systems operating within normal parameters";

// ============================================================================
// Marine
// ============================================================================

pub const DISTRESS_ACTIONS: [&str; 3] = [
    "Notify Coast Guard",
    "Dispatch inspection vessel",
    "Activate containment protocol",
];

pub const SUSPICIOUS_ACTIONS: [&str; 3] = [
    "Monitor vessel closely",
    "Request position report",
    "Alert patrol vessels in area",
];

fn anomaly_list(anomalies: &[AnomalyRecord]) -> String {
    anomalies
        .iter()
        .map(|a| a.kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn distress(name: &str, imo: &str, anomalies: &[AnomalyRecord]) -> String {
    format!(
        "DISTRESS: {} ({}) - {}. Immediate inspection required",
        name,
        imo,
        anomaly_list(anomalies)
    )
}

pub fn suspicious(name: &str, imo: &str, anomalies: &[AnomalyRecord]) -> String {
    format!(
        "SUSPICIOUS: {} ({}) - {}. Anomalous behavior detected near coast",
        name,
        imo,
        anomaly_list(anomalies)
    )
}

// ============================================================================
// Cascade
// ============================================================================

pub fn facility_reach(name: &str, hour: u32, distance_km: f64) -> String {
    if hour == 0 {
        format!("Contamination source is {distance_km:.2} km from {name}, within risk radius now")
    } else {
        format!("Contamination expected to reach {name} in {hour} hours (closest approach {distance_km:.2} km)")
    }
}

pub fn population_exposure(people: u64, hour: u32) -> String {
    format!(
        "High-risk exposure zone: ~{} people at risk at hour {}",
        format_thousands(people),
        hour
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_outlook_bands() {
        assert_eq!(network_outlook(85.0).unwrap().0, Severity::Critical);
        assert_eq!(network_outlook(80.0).unwrap().0, Severity::Warning);
        assert_eq!(network_outlook(60.5).unwrap().2, "6-24 hours");
        assert_eq!(network_outlook(41.0).unwrap().0, Severity::Info);
        assert!(network_outlook(40.0).is_none());
    }

    #[test]
    fn test_facility_message_mentions_hour() {
        let m = facility_reach("Panjrapur Intake", 5, 1.234);
        assert_eq!(
            m,
            "Contamination expected to reach Panjrapur Intake in 5 hours (closest approach 1.23 km)"
        );
    }
}
