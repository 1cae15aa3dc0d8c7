//! Plume Propagation Simulator
//!
//! Per hour `h` (elapsed `t = 3600 h` seconds):
//!
//! ```text
//! centroid  = source + flow_bearing * (flow_speed * advection_factor * t)
//! radius    = source_radius + sqrt(4 * K * t)          K = source diffusivity
//! ring      = ellipse(a = radius * (1 + elongation), b = radius) along the flow
//! intensity = intensity_base * persistence^(h / persistence_period)
//! ```
//!
//! Radius grows with sqrt(time) and the ring shape is fixed, so the area
//! (π·a·b) never decreases within a run. Grid intensity is `intensity` at
//! the centroid, falling linearly to 0 at the ring. Grid values are absolute,
//! not normalised per step: the heat map peaks at `intensity_base` at hour 0
//! and fades with persistence, so maps from different hours share one scale.

use std::sync::Arc;
use tracing::debug;

use crate::config::PlumeConfig;
use crate::geo::{ellipse_area_m2, ellipse_ring, offset_bearing, project, to_bearing_frame};
use crate::types::{ContaminationSource, GeoPoint, PlumeTimeStep, RiskGridPoint, RiskSummary};

use super::infrastructure::{facilities_at_risk, population_exposure, summarize, InfrastructureRegistry};

fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}

/// Deterministic advection/diffusion plume model.
pub struct PlumeSimulator {
    config: PlumeConfig,
    infrastructure: Arc<InfrastructureRegistry>,
}

impl PlumeSimulator {
    pub fn new(config: PlumeConfig, infrastructure: Arc<InfrastructureRegistry>) -> Self {
        Self {
            config,
            infrastructure,
        }
    }

    pub fn config(&self) -> &PlumeConfig {
        &self.config
    }

    /// Plume centroid after `hour` hours.
    pub fn centroid(&self, source: &ContaminationSource, hour: u32) -> GeoPoint {
        let drift_m = source.flow_speed * self.config.advection_factor * hour as f64 * 3600.0;
        offset_bearing(source.position(), source.flow_direction, drift_m)
    }

    /// Plume radius (m) after `hour` hours.
    pub fn radius_m(&self, source: &ContaminationSource, hour: u32) -> f64 {
        let k = self.config.params(source.source_type).diffusivity_m2_s;
        self.config.source_radius_m + (4.0 * k * hour as f64 * 3600.0).sqrt()
    }

    /// Peak (centroid) intensity after `hour` hours, in [0, 1]. This is also
    /// the largest value the step's risk grid can hold.
    pub fn intensity(&self, source: &ContaminationSource, hour: u32) -> f64 {
        let p = self.config.params(source.source_type);
        let decay = p.persistence.powf(hour as f64 / self.config.persistence_period_hours);
        (p.intensity_base * decay).clamp(0.0, 1.0)
    }

    /// Fixed-pitch samples over the ring's bounding box, kept when inside
    /// the ellipse. Intensity falls linearly from `peak` at the centroid to
    /// 0 at the boundary; samples under the floor are dropped.
    fn risk_grid(
        &self,
        center: GeoPoint,
        ring: &[GeoPoint],
        semi_major: f64,
        semi_minor: f64,
        bearing: f64,
        peak: f64,
    ) -> Vec<RiskGridPoint> {
        let n = self.config.grid_resolution;
        if ring.is_empty() || n < 2 || semi_major <= 0.0 || semi_minor <= 0.0 {
            return Vec::new();
        }
        let (min_lat, max_lat) = ring
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.lat), hi.max(p.lat)));
        let (min_lon, max_lon) = ring
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.lon), hi.max(p.lon)));

        let mut grid = Vec::new();
        for i in 0..n {
            let lat = min_lat + (max_lat - min_lat) * i as f64 / (n - 1) as f64;
            for j in 0..n {
                let lon = min_lon + (max_lon - min_lon) * j as f64 / (n - 1) as f64;
                let p = GeoPoint::new(lat, lon);
                let (x, y) = project(center, p);
                let (along, across) = to_bearing_frame(x, y, bearing);
                let d = ((along / semi_major).powi(2) + (across / semi_minor).powi(2)).sqrt();
                if d >= 1.0 {
                    continue;
                }
                let intensity = round_to(peak * (1.0 - d), 3);
                if intensity < self.config.grid_intensity_floor {
                    continue;
                }
                grid.push(RiskGridPoint {
                    lat: round_to(lat, 6),
                    lon: round_to(lon, 6),
                    intensity,
                });
            }
        }
        grid
    }

    /// Full plume state at `hour`.
    pub fn step(&self, source: &ContaminationSource, hour: u32) -> PlumeTimeStep {
        let center = self.centroid(source, hour);
        let radius_m = self.radius_m(source, hour);
        let semi_major = radius_m * (1.0 + self.config.elongation);
        let ring = ellipse_ring(
            center,
            semi_major,
            radius_m,
            source.flow_direction,
            self.config.ring_points,
        );
        let area_km2 = round_to(ellipse_area_m2(semi_major, radius_m) / 1e6, 4);
        let intensity = round_to(self.intensity(source, hour), 4);
        let risk_grid = self.risk_grid(center, &ring, semi_major, radius_m, source.flow_direction, intensity);
        let infrastructure_at_risk = facilities_at_risk(&self.infrastructure, center, radius_m, &self.config);

        PlumeTimeStep {
            hour,
            center,
            radius_m: round_to(radius_m, 1),
            radius_km: round_to(radius_m / 1000.0, 3),
            plume_polygon: ring,
            intensity,
            risk_grid,
            area_km2,
            estimated_population_exposure: population_exposure(area_km2, &self.config),
            infrastructure_at_risk,
        }
    }

    /// Hours 0 through `hours` inclusive, computed eagerly, plus the run summary.
    pub fn run(&self, source: &ContaminationSource, hours: u32) -> (Vec<PlumeTimeStep>, RiskSummary) {
        let steps: Vec<PlumeTimeStep> = (0..=hours).map(|h| self.step(source, h)).collect();
        let summary = summarize(source.source_type, &steps);
        debug!(
            source = %source.source_type,
            steps = steps.len(),
            max_area_km2 = summary.max_area_km2,
            facilities = summary.facilities.len(),
            "Plume run complete"
        );
        (steps, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::haversine_m;
    use crate::types::SourceType;

    fn sim() -> PlumeSimulator {
        PlumeSimulator::new(PlumeConfig::default(), Arc::new(InfrastructureRegistry::default()))
    }

    fn source(source_type: SourceType, dir: f64, speed: f64) -> ContaminationSource {
        ContaminationSource {
            lat: 19.0,
            lon: 72.8,
            source_type,
            flow_direction: dir,
            flow_speed: speed,
        }
    }

    #[test]
    fn test_centroid_follows_flow() {
        let s = sim();
        let src = source(SourceType::OilSpill, 90.0, 2.0);
        let c = s.centroid(&src, 2);
        assert!(c.lon > src.lon);
        assert!((c.lat - src.lat).abs() < 1e-9);
        // 2 m/s * 0.25 * 7200 s
        assert!((haversine_m(src.position(), c) - 3600.0).abs() < 1.0);
    }

    #[test]
    fn test_oil_spreads_faster_than_industrial() {
        let s = sim();
        for h in 1..=24 {
            let oil = s.radius_m(&source(SourceType::OilSpill, 0.0, 1.0), h);
            let ind = s.radius_m(&source(SourceType::IndustrialDischarge, 0.0, 1.0), h);
            assert!(oil > ind);
        }
    }

    #[test]
    fn test_area_non_decreasing_and_ring_closed() {
        let s = sim();
        let (steps, _) = s.run(&source(SourceType::SewageOverflow, 45.0, 3.0), 24);
        assert_eq!(steps.len(), 25);
        for w in steps.windows(2) {
            assert!(w[1].area_km2 >= w[0].area_km2);
            assert!(w[1].radius_m > w[0].radius_m);
        }
        for st in &steps {
            assert_eq!(st.plume_polygon.first(), st.plume_polygon.last());
            assert!(st.intensity >= 0.0 && st.intensity <= 1.0);
        }
    }

    #[test]
    fn test_high_latitude_area_grows_from_source_disc() {
        let s = sim();
        let src = ContaminationSource {
            lat: 85.0,
            ..source(SourceType::OilSpill, 0.0, 10.0)
        };
        let (steps, _) = s.run(&src, 24);
        // hour 0: semi-axes 130 m x 100 m
        let expected = std::f64::consts::PI * 130.0 * 100.0 / 1e6;
        assert!((steps[0].area_km2 - expected).abs() < 1e-4, "{}", steps[0].area_km2);
        for w in steps.windows(2) {
            assert!(w[1].area_km2 >= w[0].area_km2);
            assert!(w[1].center.lat > w[0].center.lat);
        }
        assert!(steps.iter().all(|st| st.center.lat <= 90.0 && st.center.is_valid()));
    }

    #[test]
    fn test_risk_grid_peaks_inside_plume() {
        let s = sim();
        let st = s.step(&source(SourceType::OilSpill, 180.0, 2.0), 6);
        assert!(!st.risk_grid.is_empty());
        let peak = st.risk_grid.iter().map(|g| g.intensity).fold(0.0, f64::max);
        assert!(peak <= st.intensity + 0.001);
        assert!(peak > 0.8 * st.intensity);
        assert!(st.risk_grid.iter().all(|g| g.intensity >= 0.05));
    }

    #[test]
    fn test_risk_grid_shares_absolute_scale_across_hours() {
        let s = sim();
        let src = source(SourceType::OilSpill, 90.0, 1.0);
        let peak = |hour| {
            s.step(&src, hour)
                .risk_grid
                .iter()
                .map(|g| g.intensity)
                .fold(0.0, f64::max)
        };
        let early = peak(0);
        let late = peak(24);
        assert!(early <= 0.95 + 1e-9);
        assert!(early < 1.0);
        assert!(late <= s.intensity(&src, 24) + 1e-9);
        assert!(late < early);
    }

    #[test]
    fn test_intensity_decays_by_persistence() {
        let s = sim();
        let src = source(SourceType::OilSpill, 0.0, 1.0);
        assert!((s.intensity(&src, 0) - 0.95).abs() < 1e-12);
        assert!((s.intensity(&src, 6) - 0.95 * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_zero_radius_has_zero_exposure() {
        let config = PlumeConfig {
            source_radius_m: 0.0,
            ..PlumeConfig::default()
        };
        let s = PlumeSimulator::new(config, Arc::new(InfrastructureRegistry::default()));
        let st = s.step(&source(SourceType::OilSpill, 0.0, 1.0), 0);
        assert_eq!(st.area_km2, 0.0);
        assert_eq!(st.estimated_population_exposure, 0);
        assert!(st.risk_grid.is_empty());
    }
}
