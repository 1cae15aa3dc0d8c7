//! Simulated AIS fleet.
//!
//! A pure function from a seed to a vessel batch: eight base tracks off the
//! Mumbai coast, jittered, with a rolling observation history and an
//! occasional injected anomaly. Nothing is cached between calls.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::config::FleetConfig;
use crate::types::{Observation, Vessel, VesselType};

/// Nominal track of one fleet vessel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseTrack {
    pub imo: &'static str,
    pub name: &'static str,
    pub vessel_type: VesselType,
    pub lat: f64,
    pub lon: f64,
    pub sog: f64,
    pub cog: f64,
    pub heading: f64,
}

pub const BASE_FLEET: [BaseTrack; 8] = [
    BaseTrack { imo: "IMO9181786", name: "MV Sagarmala", vessel_type: VesselType::Tanker, lat: 18.92, lon: 72.83, sog: 12.5, cog: 45.0, heading: 47.0 },
    BaseTrack { imo: "IMO9234567", name: "MV Prithvi", vessel_type: VesselType::Cargo, lat: 19.05, lon: 72.75, sog: 8.2, cog: 120.0, heading: 118.0 },
    BaseTrack { imo: "IMO9345678", name: "FV Matsya", vessel_type: VesselType::Fishing, lat: 18.88, lon: 72.90, sog: 5.1, cog: 200.0, heading: 195.0 },
    BaseTrack { imo: "IMO9456789", name: "MV Samudra", vessel_type: VesselType::Tanker, lat: 19.10, lon: 72.70, sog: 14.0, cog: 90.0, heading: 92.0 },
    BaseTrack { imo: "IMO9567890", name: "FV Jaldhara", vessel_type: VesselType::Fishing, lat: 18.95, lon: 72.95, sog: 3.5, cog: 310.0, heading: 305.0 },
    BaseTrack { imo: "IMO9678901", name: "MV Naukri", vessel_type: VesselType::Cargo, lat: 18.80, lon: 72.80, sog: 10.8, cog: 170.0, heading: 172.0 },
    BaseTrack { imo: "IMO9789012", name: "PS Disha", vessel_type: VesselType::Passenger, lat: 19.00, lon: 72.85, sog: 18.0, cog: 60.0, heading: 58.0 },
    BaseTrack { imo: "IMO9890123", name: "MV Rakshak", vessel_type: VesselType::Military, lat: 19.15, lon: 72.65, sog: 22.0, cog: 270.0, heading: 268.0 },
];

/// Observations in a stopped run injected at the tail of the history.
const STOPPED_TAIL: usize = 3;

/// Base track for an IMO number, if it belongs to the simulated fleet.
pub fn base_track(imo: &str) -> Option<&'static BaseTrack> {
    BASE_FLEET.iter().find(|b| b.imo == imo)
}

/// Steady history along a base track, ending one interval before `now`.
pub fn steady_history(base: &BaseTrack, config: &FleetConfig, now: i64) -> Vec<Observation> {
    let n = config.history_len;
    (0..n)
        .map(|i| Observation {
            timestamp: now.saturating_sub(config.observation_interval_secs.saturating_mul((n - i) as i64)),
            sog: base.sog,
            cog: base.cog,
        })
        .collect()
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}

/// The simulated fleet for `seed`. Same seed, same batch.
pub fn simulated_fleet(seed: u64, config: &FleetConfig) -> Vec<Vessel> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = config.reference_epoch;

    BASE_FLEET
        .iter()
        .map(|base| {
            let mut history: Vec<Observation> = (0..config.history_len)
                .map(|i| {
                    let jitter: f64 = rng.sample(StandardNormal);
                    Observation {
                        timestamp: now.saturating_sub(
                            config
                                .observation_interval_secs
                                .saturating_mul((config.history_len - i) as i64),
                        ),
                        sog: round_to((base.sog + 0.3 * jitter).max(0.0), 1),
                        cog: round_to(base.cog + rng.gen_range(-3.0..3.0), 1).rem_euclid(360.0),
                    }
                })
                .collect();

            let mut sog = base.sog + rng.gen_range(-1.0..1.0);
            let mut cog = base.cog + rng.gen_range(-5.0..5.0);
            let heading = base.heading + rng.gen_range(-3.0..3.0);
            let lat = base.lat + rng.gen_range(-0.02..0.02);
            let lon = base.lon + rng.gen_range(-0.02..0.02);

            if rng.gen::<f64>() < config.anomaly_rate {
                match rng.gen_range(0..3) {
                    0 => sog = base.sog * rng.gen_range(0.1..0.4),
                    1 => {
                        let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
                        cog = base.cog + sign * rng.gen_range(50.0..120.0);
                    }
                    _ => {
                        sog = rng.gen_range(0.0..0.5);
                        let tail = history.len().saturating_sub(STOPPED_TAIL);
                        for obs in &mut history[tail..] {
                            obs.sog = round_to(rng.gen_range(0.0..0.5), 1);
                        }
                    }
                }
            }

            Vessel {
                imo: base.imo.to_string(),
                name: base.name.to_string(),
                vessel_type: base.vessel_type,
                lat: round_to(lat, 4),
                lon: round_to(lon, 4),
                sog: round_to(sog.max(0.0), 1),
                cog: round_to(cog, 1).rem_euclid(360.0),
                heading: round_to(heading, 1).rem_euclid(360.0),
                timestamp: now,
                history,
            }
        })
        .collect()
}
