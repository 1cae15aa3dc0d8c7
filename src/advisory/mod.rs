//! Alert & Recommendation Generator
//!
//! Shared by the fragility, marine and plume engines. Findings come in as
//! already-tiered structures (zone status, vessel class, exposure level) and
//! leave as [`Alert`]s whose severity is the finding's tier, deduplicated per
//! entity, plus priority-ordered [`Recommendation`]s.
//!
//! All text comes from [`templates`], so identical input always produces
//! identical output.

pub mod templates;

use std::collections::HashMap;

use tracing::debug;

use crate::config::PlumeConfig;
use crate::types::{
    Alert, DispatchUnavailable, ExposureLevel, PlumeTimeStep, Priority, Recommendation,
    RiskSummary, Severity, VesselClass, VesselStatus, Zone, ZoneStatus,
};

// ============================================================================
// AlertBook
// ============================================================================

/// Ordered alert collection with one alert per entity.
///
/// A later alert for an entity already present replaces it only when its
/// severity is strictly higher; the slot keeps its original position.
#[derive(Debug, Default)]
pub struct AlertBook {
    alerts: Vec<Alert>,
    index: HashMap<String, usize>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alert: Alert) {
        match self.index.get(&alert.entity) {
            Some(&slot) => {
                if alert.severity > self.alerts[slot].severity {
                    self.alerts[slot] = alert;
                }
            }
            None => {
                self.index.insert(alert.entity.clone(), self.alerts.len());
                self.alerts.push(alert);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Consume the book, keeping at most `cap` alerts.
    pub fn finish(self, cap: Option<usize>) -> Vec<Alert> {
        let mut alerts = self.alerts;
        if let Some(cap) = cap {
            if alerts.len() > cap {
                debug!(dropped = alerts.len() - cap, cap, "Alert cap reached");
                alerts.truncate(cap);
            }
        }
        alerts
    }
}

impl Extend<Alert> for AlertBook {
    fn extend<T: IntoIterator<Item = Alert>>(&mut self, iter: T) {
        for alert in iter {
            self.push(alert);
        }
    }
}

fn alert(severity: Severity, entity: impl Into<String>, message: String) -> Alert {
    Alert {
        severity,
        entity: entity.into(),
        message,
        actions: Vec::new(),
        timeframe: None,
        hour: None,
    }
}

fn recommendation(priority: Priority, action: impl Into<String>, icon: &str) -> Recommendation {
    Recommendation {
        priority,
        action: action.into(),
        icon: icon.to_string(),
    }
}

// ============================================================================
// Fragility
// ============================================================================

/// Network outlook entity name in fragility alerts.
pub const NETWORK_ENTITY: &str = "network";

/// Early warnings for a scored zone set: the network outlook first (if any),
/// then critical zones, then warning zones, each group in zone order.
pub fn fragility_alerts(zones: &[Zone]) -> Vec<Alert> {
    let mut book = AlertBook::new();

    let max_score = zones.iter().map(|z| z.score).fold(0.0_f64, f64::max);
    if let Some((severity, message, timeframe)) = templates::network_outlook(max_score) {
        let mut outlook = alert(severity, NETWORK_ENTITY, message.to_string());
        outlook.timeframe = Some(timeframe.to_string());
        book.push(outlook);
    }

    for tier in [ZoneStatus::Critical, ZoneStatus::Warning] {
        for zone in zones.iter().filter(|z| z.status == tier) {
            if let Some(message) = templates::zone_alert(zone) {
                book.push(alert(Severity::from(tier), zone.name.clone(), message));
            }
        }
    }

    book.finish(None)
}

/// Recommendations for a scored zone set and its dispatch outcome, sorted
/// critical → low (stable within a priority).
pub fn fragility_recommendations(
    zones: &[Zone],
    unavailable: &[DispatchUnavailable],
) -> Vec<Recommendation> {
    let critical: Vec<&Zone> = zones.iter().filter(|z| z.status == ZoneStatus::Critical).collect();
    let warning: Vec<&Zone> = zones.iter().filter(|z| z.status == ZoneStatus::Warning).collect();
    let max_score = zones.iter().map(|z| z.score).fold(0.0_f64, f64::max);

    let mut recs = Vec::new();
    if !critical.is_empty() {
        recs.push(recommendation(Priority::Critical, templates::tanker_deployment(&critical), "truck"));
        recs.push(recommendation(Priority::Critical, templates::backup_pumps(&critical), "settings"));
    }
    if !unavailable.is_empty() {
        let names: Vec<&str> = unavailable.iter().map(|u| u.zone_name.as_str()).collect();
        recs.push(recommendation(Priority::High, templates::external_supply(&names), "truck"));
    }
    if max_score > 60.0 {
        recs.push(recommendation(Priority::High, templates::CONSERVATION_NOTICE, "alert"));
    }
    if !warning.is_empty() {
        recs.push(recommendation(Priority::Medium, templates::maintenance(&warning), "tool"));
    }
    if critical.is_empty() && warning.is_empty() {
        recs.push(recommendation(Priority::Low, templates::ALL_CLEAR, "check"));
    }

    recs.sort_by_key(|r| r.priority);
    recs
}

// ============================================================================
// Marine
// ============================================================================

/// One alert per distress or suspicious vessel, distress first, each group
/// in batch order.
pub fn marine_alerts(statuses: &[VesselStatus]) -> Vec<Alert> {
    let mut book = AlertBook::new();

    for class in [VesselClass::Distress, VesselClass::Suspicious] {
        for s in statuses.iter().filter(|s| s.status == class) {
            let name = s.vessel.label();
            let (severity, message, actions) = match class {
                VesselClass::Distress => (
                    Severity::Critical,
                    templates::distress(name, &s.imo, &s.anomalies),
                    &templates::DISTRESS_ACTIONS,
                ),
                _ => (
                    Severity::Warning,
                    templates::suspicious(name, &s.imo, &s.anomalies),
                    &templates::SUSPICIOUS_ACTIONS,
                ),
            };
            let mut a = alert(severity, s.imo.clone(), message);
            a.actions = actions.iter().map(|s| s.to_string()).collect();
            book.push(a);
        }
    }

    book.finish(None)
}

// ============================================================================
// Cascade (plume)
// ============================================================================

/// Population alert entity name in cascade alerts.
pub const POPULATION_ENTITY: &str = "population";

/// Cascade alerts for a plume run: one per affected facility (time to
/// impact) and one critical alert for the first hour population exposure
/// crosses the threshold. Ordered by hour, then severity descending, with
/// facilities ahead of the population alert on ties; capped.
pub fn cascade_alerts(
    summary: &RiskSummary,
    steps: &[PlumeTimeStep],
    config: &PlumeConfig,
) -> Vec<Alert> {
    let mut candidates: Vec<Alert> = summary
        .facilities
        .iter()
        .map(|f| {
            let severity = match f.worst_level {
                ExposureLevel::Critical => Severity::Critical,
                ExposureLevel::Warning => Severity::Warning,
            };
            let mut a = alert(
                severity,
                f.name.clone(),
                templates::facility_reach(&f.name, f.first_hour, f.min_distance_km),
            );
            a.hour = Some(f.first_hour);
            a.timeframe = Some(format!("{} hours", f.first_hour));
            a
        })
        .collect();

    if let Some(step) = steps
        .iter()
        .find(|s| s.estimated_population_exposure > config.exposure_alert_threshold)
    {
        let mut a = alert(
            Severity::Critical,
            POPULATION_ENTITY,
            templates::population_exposure(step.estimated_population_exposure, step.hour),
        );
        a.hour = Some(step.hour);
        candidates.push(a);
    }

    candidates.sort_by(|a, b| {
        a.hour
            .cmp(&b.hour)
            .then_with(|| b.severity.cmp(&a.severity))
    });

    let mut book = AlertBook::new();
    book.extend(candidates);
    book.finish(Some(config.max_alerts))
}
