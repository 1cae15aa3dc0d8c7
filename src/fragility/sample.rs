//! Synthetic zone feature rows for demos and dashboards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};

use crate::types::{FeatureVector, SampleRow};

use super::registry::ZoneRegistry;
use super::scenario::PARAM_RANGES;

/// `hours` rows per zone, deterministic for `seed`.
///
/// Rainfall is exponential (mean 2 mm/hr), power uniform 0.5-1.0, tankers
/// 3-15, groundwater uniform 2-8 m, demand ~N(1, 0.3), price ~N(1, 0.1).
/// Every value is clamped to its manual-parameter range.
pub fn sample_data(registry: &ZoneRegistry, seed: u64, hours: u32) -> Vec<SampleRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(registry.len() * hours as usize);

    for site in registry.sites() {
        for hour in 0..hours {
            let exp: f64 = rng.sample(Exp1);
            let demand_z: f64 = rng.sample(StandardNormal);
            let price_z: f64 = rng.sample(StandardNormal);
            let raw = [
                2.0 * exp,
                rng.gen_range(0.5..1.0),
                rng.gen_range(3..=15) as f64,
                rng.gen_range(2.0..8.0),
                1.0 + 0.3 * demand_z,
                1.0 + 0.1 * price_z,
            ];
            let mut clamped = [0.0; FeatureVector::LEN];
            for (i, (&value, (_, min, max))) in raw.iter().zip(PARAM_RANGES).enumerate() {
                clamped[i] = value.clamp(min, max);
            }
            rows.push(SampleRow {
                zone_id: site.id,
                hour,
                features: FeatureVector::from_array(clamped),
            });
        }
    }
    rows
}
