//! Vessel Anomaly Detector
//!
//! Three independent rules compare current telemetry against the vessel's
//! recent observation window:
//!
//! | Rule              | Fires when                                                        | Severity     | Risk |
//! |-------------------|-------------------------------------------------------------------|--------------|------|
//! | speed_drop        | mean window speed > min baseline and current < mean * (1 - frac)  | high         | 40   |
//! | course_deviation  | underway and |current - circular mean course| > threshold         | medium/high  | 30/50|
//! | unexpected_stop   | stopped longer than min duration after averaging underway speed   | critical     | 60   |
//!
//! Status: no anomaly → normal, one → suspicious, two or more (or any
//! unexpected_stop) → distress.

use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::defaults::MAX_AIS_TIMESTAMP_SECS;
use crate::config::{FleetConfig, VesselConfig};
use crate::error::ValidationError;
use crate::geo::{angular_difference, circular_mean_deg};
use crate::types::{
    AnomalyKind, AnomalyRecord, AnomalySeverity, BaselineSource, Observation, Vessel, VesselClass,
    VesselStatus,
};

use super::fleet::{base_track, steady_history};

/// Risk points contributed by each finding; the total is capped at 100.
fn risk_points(record: &AnomalyRecord) -> u32 {
    match (record.kind, record.severity) {
        (AnomalyKind::SpeedDrop, _) => 40,
        (AnomalyKind::CourseDeviation, AnomalySeverity::Medium) => 30,
        (AnomalyKind::CourseDeviation, _) => 50,
        (AnomalyKind::UnexpectedStop, _) => 60,
    }
}

/// Status as a pure function of the anomaly set.
pub fn classify_anomalies(anomalies: &[AnomalyRecord]) -> VesselClass {
    let has_stop = anomalies.iter().any(|a| a.kind == AnomalyKind::UnexpectedStop);
    match anomalies.len() {
        0 => VesselClass::Normal,
        1 if !has_stop => VesselClass::Suspicious,
        _ => VesselClass::Distress,
    }
}

/// Rule-based kinematic anomaly detector.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    rules: VesselConfig,
    fleet: FleetConfig,
}

impl AnomalyDetector {
    pub fn new(rules: VesselConfig, fleet: FleetConfig) -> Self {
        Self { rules, fleet }
    }

    /// Reject telemetry the rules cannot reason about.
    pub fn validate(&self, vessel: &Vessel) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidTelemetry {
            imo: vessel.imo.clone(),
            reason,
        };
        if vessel.imo.trim().is_empty() {
            return Err(invalid("missing IMO number".to_string()));
        }
        if !vessel.position().is_valid() {
            return Err(invalid(format!("position ({}, {}) out of range", vessel.lat, vessel.lon)));
        }
        if !vessel.sog.is_finite() || vessel.sog < 0.0 {
            return Err(invalid(format!("sog {} must be a finite non-negative speed", vessel.sog)));
        }
        if !vessel.cog.is_finite() || !(0.0..=360.0).contains(&vessel.cog) {
            return Err(invalid(format!("cog {} outside 0-360", vessel.cog)));
        }
        let in_epoch = |t: i64| (0..=MAX_AIS_TIMESTAMP_SECS).contains(&t);
        if !in_epoch(vessel.timestamp) {
            return Err(invalid(format!(
                "timestamp {} outside 0-{MAX_AIS_TIMESTAMP_SECS}",
                vessel.timestamp
            )));
        }
        for obs in &vessel.history {
            if !in_epoch(obs.timestamp) {
                return Err(invalid(format!(
                    "history timestamp {} outside 0-{MAX_AIS_TIMESTAMP_SECS}",
                    obs.timestamp
                )));
            }
            if !obs.sog.is_finite() || obs.sog < 0.0 || !obs.cog.is_finite() {
                return Err(invalid(format!("history observation at {} is malformed", obs.timestamp)));
            }
        }
        if vessel.history.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            return Err(invalid("history timestamps must be in ascending order".to_string()));
        }
        if let Some(last) = vessel.history.last() {
            if last.timestamp > vessel.timestamp {
                return Err(invalid(format!(
                    "current timestamp {} precedes history timestamp {}",
                    vessel.timestamp, last.timestamp
                )));
            }
        }
        Ok(())
    }

    /// Comparison window: supplied history, else the fleet base track for a
    /// known IMO, else nothing.
    pub fn resolve_history(&self, vessel: &Vessel) -> (Vec<Observation>, BaselineSource) {
        if !vessel.history.is_empty() {
            return (vessel.history.clone(), BaselineSource::Supplied);
        }
        match base_track(&vessel.imo) {
            Some(base) => (
                steady_history(base, &self.fleet, vessel.timestamp),
                BaselineSource::Fleet,
            ),
            None => (Vec::new(), BaselineSource::Unavailable),
        }
    }

    fn speed_drop(&self, vessel: &Vessel, history: &[Observation]) -> Option<AnomalyRecord> {
        let mean = history.iter().map(|o| o.sog).mean();
        if mean.is_nan() || mean <= self.rules.speed_drop_min_baseline_knots {
            return None;
        }
        if vessel.sog >= mean * (1.0 - self.rules.speed_drop_fraction) {
            return None;
        }
        let drop = 1.0 - vessel.sog / mean;
        Some(AnomalyRecord {
            kind: AnomalyKind::SpeedDrop,
            magnitude: (drop * 1000.0).round() / 1000.0,
            description: format!(
                "Speed dropped {:.0}% from {:.1} to {:.1} knots",
                drop * 100.0,
                mean,
                vessel.sog
            ),
            severity: AnomalySeverity::High,
        })
    }

    fn course_deviation(&self, vessel: &Vessel, history: &[Observation]) -> Option<AnomalyRecord> {
        // Course over ground is noise while stationary
        if vessel.sog < self.rules.stop_speed_knots {
            return None;
        }
        let mean = circular_mean_deg(
            history
                .iter()
                .filter(|o| o.sog >= self.rules.stop_speed_knots)
                .map(|o| o.cog),
        )?;
        let diff = angular_difference(vessel.cog, mean);
        if diff <= self.rules.course_deviation_deg {
            return None;
        }
        let severity = if diff < self.rules.course_deviation_high_deg {
            AnomalySeverity::Medium
        } else {
            AnomalySeverity::High
        };
        Some(AnomalyRecord {
            kind: AnomalyKind::CourseDeviation,
            magnitude: (diff * 10.0).round() / 10.0,
            description: format!(
                "Course deviated {:.0}° from recent average {:.0}°",
                diff, mean
            ),
            severity,
        })
    }

    fn unexpected_stop(&self, vessel: &Vessel, history: &[Observation]) -> Option<AnomalyRecord> {
        let stop = self.rules.stop_speed_knots;
        if vessel.sog >= stop {
            return None;
        }
        let moving = history.iter().rposition(|o| o.sog >= stop)?;
        let (before, stopped) = history.split_at(moving + 1);
        let stopped_since = stopped.first().map_or(vessel.timestamp, |o| o.timestamp);
        let duration = vessel.timestamp.saturating_sub(stopped_since);
        if duration <= self.rules.min_stop_duration_secs {
            return None;
        }
        let prior = before.iter().map(|o| o.sog).mean();
        if prior.is_nan() || prior < self.rules.underway_speed_knots {
            return None;
        }
        let minutes = duration as f64 / 60.0;
        Some(AnomalyRecord {
            kind: AnomalyKind::UnexpectedStop,
            magnitude: (minutes * 10.0).round() / 10.0,
            description: format!(
                "Stopped in open water for {:.0} min after averaging {:.1} knots",
                minutes, prior
            ),
            severity: AnomalySeverity::Critical,
        })
    }

    /// Apply every rule to one vessel.
    pub fn detect(&self, vessel: &Vessel, history: &[Observation]) -> Vec<AnomalyRecord> {
        if history.is_empty() {
            return Vec::new();
        }
        [
            self.speed_drop(vessel, history),
            self.course_deviation(vessel, history),
            self.unexpected_stop(vessel, history),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Validate and classify one vessel.
    pub fn classify(&self, vessel: &Vessel) -> Result<VesselStatus, ValidationError> {
        self.validate(vessel)?;
        Ok(self.classify_valid(vessel))
    }

    fn classify_valid(&self, vessel: &Vessel) -> VesselStatus {
        let (history, baseline) = self.resolve_history(vessel);
        let anomalies = self.detect(vessel, &history);
        let status = classify_anomalies(&anomalies);
        let risk_score = anomalies.iter().map(risk_points).sum::<u32>().min(100);
        if status != VesselClass::Normal {
            debug!(imo = %vessel.imo, %status, anomalies = anomalies.len(), "Vessel anomaly detected");
        }
        VesselStatus {
            imo: vessel.imo.clone(),
            name: vessel.label().to_string(),
            status,
            anomalies,
            risk_score,
            baseline,
            vessel: vessel.clone(),
        }
    }

    /// Classify a batch. All telemetry is validated (in order) before any
    /// vessel is classified; output order matches input order.
    pub fn classify_batch(&self, vessels: &[Vessel]) -> Result<Vec<VesselStatus>, ValidationError> {
        for v in vessels {
            self.validate(v)?;
        }
        Ok(vessels.par_iter().map(|v| self.classify_valid(v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VesselType;

    const NOW: i64 = 100_000;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(VesselConfig::default(), FleetConfig::default())
    }

    fn vessel(sog: f64, cog: f64, history: Vec<(i64, f64, f64)>) -> Vessel {
        Vessel {
            imo: "IMO0000001".into(),
            name: "Test".into(),
            vessel_type: VesselType::Tanker,
            lat: 19.0,
            lon: 72.8,
            sog,
            cog,
            heading: cog,
            timestamp: NOW,
            history: history
                .into_iter()
                .map(|(dt, sog, cog)| Observation { timestamp: NOW - dt, sog, cog })
                .collect(),
        }
    }

    fn steady(sog: f64, cog: f64) -> Vec<(i64, f64, f64)> {
        (1..=6).rev().map(|i| (i * 300, sog, cog)).collect()
    }

    #[test]
    fn test_steady_vessel_is_normal() {
        let s = detector().classify(&vessel(12.0, 92.0, steady(12.0, 90.0))).unwrap();
        assert_eq!(s.status, VesselClass::Normal);
        assert!(s.anomalies.is_empty());
        assert_eq!(s.risk_score, 0);
        assert_eq!(s.baseline, BaselineSource::Supplied);
    }

    #[test]
    fn test_speed_drop_boundary() {
        let d = detector();
        // exactly half the average is not "more than" half below
        assert!(d.classify(&vessel(5.0, 90.0, steady(10.0, 90.0))).unwrap().anomalies.is_empty());
        let s = d.classify(&vessel(4.9, 90.0, steady(10.0, 90.0))).unwrap();
        assert_eq!(s.status, VesselClass::Suspicious);
        assert_eq!(s.anomalies[0].kind, AnomalyKind::SpeedDrop);
        assert_eq!(s.risk_score, 40);
    }

    #[test]
    fn test_course_deviation_wraps_north() {
        let d = detector();
        let s = d.classify(&vessel(10.0, 29.0, steady(10.0, 350.0))).unwrap();
        assert!(s.anomalies.is_empty(), "39° is within threshold");

        let s = d.classify(&vessel(10.0, 41.0, steady(10.0, 350.0))).unwrap();
        assert_eq!(s.anomalies[0].kind, AnomalyKind::CourseDeviation);
        assert_eq!(s.anomalies[0].severity, AnomalySeverity::Medium);
        assert_eq!(s.risk_score, 30);

        let s = d.classify(&vessel(10.0, 180.0, steady(10.0, 350.0))).unwrap();
        assert_eq!(s.anomalies[0].severity, AnomalySeverity::High);
        assert_eq!(s.risk_score, 50);
    }

    #[test]
    fn test_unexpected_stop_alone_is_distress() {
        // underway 5 kn, then stopped for the last 3 observations (900 s)
        let history = vec![
            (1800, 5.0, 90.0),
            (1500, 5.0, 90.0),
            (1200, 5.0, 90.0),
            (900, 0.2, 90.0),
            (600, 0.1, 90.0),
            (300, 0.3, 90.0),
        ];
        let rules = VesselConfig {
            // keep the speed-drop rule out of the way
            speed_drop_min_baseline_knots: 10.0,
            ..VesselConfig::default()
        };
        let d = AnomalyDetector::new(rules, FleetConfig::default());
        let s = d.classify(&vessel(0.2, 90.0, history)).unwrap();
        assert_eq!(s.anomalies.len(), 1);
        assert_eq!(s.anomalies[0].kind, AnomalyKind::UnexpectedStop);
        assert_eq!(s.anomalies[0].magnitude, 15.0);
        assert_eq!(s.status, VesselClass::Distress);
    }

    #[test]
    fn test_short_stop_not_flagged() {
        let mut history = steady(5.0, 90.0);
        history.last_mut().unwrap().1 = 0.1; // stopped only since 300 s ago
        let s = detector().classify(&vessel(0.1, 90.0, history)).unwrap();
        assert!(!s.has_anomaly(AnomalyKind::UnexpectedStop));
    }

    #[test]
    fn test_unknown_vessel_without_history_is_normal() {
        let s = detector().classify(&vessel(0.0, 0.0, vec![])).unwrap();
        assert_eq!(s.baseline, BaselineSource::Unavailable);
        assert_eq!(s.status, VesselClass::Normal);
    }

    #[test]
    fn test_fleet_vessel_uses_base_track() {
        let mut v = vessel(3.0, 90.0, vec![]);
        v.imo = "IMO9456789".into(); // MV Samudra, 14 kn
        let s = detector().classify(&v).unwrap();
        assert_eq!(s.baseline, BaselineSource::Fleet);
        assert!(s.has_anomaly(AnomalyKind::SpeedDrop));
    }

    #[test]
    fn test_two_anomalies_distress() {
        let s = detector().classify(&vessel(3.0, 200.0, steady(12.0, 90.0))).unwrap();
        assert_eq!(s.anomalies.len(), 2);
        assert_eq!(s.status, VesselClass::Distress);
        assert_eq!(s.risk_score, 90);
    }

    #[test]
    fn test_invalid_telemetry_rejected() {
        let d = detector();
        assert!(d.classify(&vessel(-1.0, 90.0, vec![])).is_err());
        assert!(d.classify(&vessel(5.0, 400.0, vec![])).is_err());
        let mut v = vessel(5.0, 90.0, steady(5.0, 90.0));
        v.timestamp = 0;
        assert!(matches!(d.classify(&v), Err(ValidationError::InvalidTelemetry { .. })));

        let batch = vec![vessel(5.0, 90.0, vec![]), vessel(f64::NAN, 90.0, vec![])];
        assert!(d.classify_batch(&batch).is_err());
    }

    #[test]
    fn test_out_of_epoch_timestamps_rejected() {
        let d = detector();
        // Fleet IMO with no history: the baseline is synthesized from the timestamp
        for ts in [i64::MIN, -1, MAX_AIS_TIMESTAMP_SECS + 1, i64::MAX] {
            let mut v = vessel(12.0, 45.0, vec![]);
            v.imo = "IMO9456789".into();
            v.timestamp = ts;
            assert!(
                matches!(d.classify(&v), Err(ValidationError::InvalidTelemetry { .. })),
                "timestamp {ts}"
            );
            assert!(d.classify_batch(&[v]).is_err());
        }

        let mut v = vessel(0.2, 90.0, steady(12.0, 90.0));
        v.history[0].timestamp = i64::MIN;
        assert!(matches!(d.classify(&v), Err(ValidationError::InvalidTelemetry { .. })));
    }

    #[test]
    fn test_epoch_start_is_accepted() {
        let mut v = vessel(14.0, 90.0, vec![]);
        v.imo = "IMO9456789".into();
        v.timestamp = 0;
        let s = detector().classify(&v).unwrap();
        assert_eq!(s.baseline, BaselineSource::Fleet);
        assert_eq!(s.status, VesselClass::Normal);
    }

    #[test]
    fn test_batch_preserves_order() {
        let mut a = vessel(5.0, 90.0, vec![]);
        a.imo = "A".into();
        let mut b = vessel(5.0, 90.0, vec![]);
        b.imo = "B".into();
        let out = detector().classify_batch(&[b, a]).unwrap();
        assert_eq!(out[0].imo, "B");
        assert_eq!(out[1].imo, "A");
    }
}
