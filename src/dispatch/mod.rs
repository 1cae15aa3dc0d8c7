//! Dispatch Router - tanker routes from stable zones to critical ones.
//!
//! The zone adjacency graph is undirected. Edge cost is the haversine
//! distance between the endpoints inflated by a BPR-style congestion term
//! driven by how fragile the endpoints are:
//!
//! ```text
//! cost = distance * (1 + alpha * (mean_endpoint_score / 100)^beta)
//! ```
//!
//! Costs are integer metres so shortest-path comparisons are exact. For each
//! critical zone, one Dijkstra pass from that zone reaches every candidate
//! origin at once; the cheapest non-critical origin wins, ties broken by
//! lower fragility score and then lower zone id.

use pathfinding::prelude::{build_path, dijkstra_all};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::fragility::{round2, ZoneRegistry};
use crate::geo::haversine_m;
use crate::types::{DispatchPlan, DispatchRoute, DispatchUnavailable, Zone, ZoneStatus};

/// Congestion-weighted edge cost (m).
///
/// `fragility` is the mean endpoint score on the 0-100 scale.
pub fn congested_cost(distance_m: f64, fragility: f64, alpha: f64, beta: f64) -> f64 {
    let load = (fragility / 100.0).clamp(0.0, 1.0);
    distance_m * (1.0 + alpha * load.powf(beta))
}

/// Shortest-path tanker router over the zone graph.
pub struct DispatchRouter {
    config: DispatchConfig,
    registry: Arc<ZoneRegistry>,
}

impl DispatchRouter {
    pub fn new(config: DispatchConfig, registry: Arc<ZoneRegistry>) -> Self {
        Self { config, registry }
    }

    /// Weighted adjacency over the scored zones. Edges touching a zone that
    /// was not scored in this call are left out.
    fn adjacency(&self, zones: &BTreeMap<u32, &Zone>) -> BTreeMap<u32, Vec<(u32, u64)>> {
        let mut adj: BTreeMap<u32, Vec<(u32, u64)>> = BTreeMap::new();
        for &(a, b) in self.registry.edges() {
            let (Some(za), Some(zb)) = (zones.get(&a), zones.get(&b)) else {
                continue;
            };
            let cost = congested_cost(
                haversine_m(za.position(), zb.position()),
                (za.score + zb.score) / 2.0,
                self.config.congestion_alpha,
                self.config.congestion_beta,
            )
            .round() as u64;
            adj.entry(a).or_default().push((b, cost));
            adj.entry(b).or_default().push((a, cost));
        }
        adj
    }

    /// One route per critical zone, or a dispatch-unavailable entry when no
    /// non-critical zone can reach it. No critical zones → empty plan.
    pub fn plan(&self, zones: &[Zone]) -> DispatchPlan {
        let by_id: BTreeMap<u32, &Zone> = zones.iter().map(|z| (z.id, z)).collect();
        let adj = self.adjacency(&by_id);
        let mut plan = DispatchPlan::default();

        for target in zones.iter().filter(|z| z.status == ZoneStatus::Critical) {
            let parents = dijkstra_all(&target.id, |id| {
                adj.get(id).cloned().unwrap_or_default()
            });

            let best = parents
                .iter()
                .filter_map(|(id, &(_, cost))| {
                    let zone = by_id.get(id)?;
                    (zone.status != ZoneStatus::Critical).then_some((cost, *zone))
                })
                .min_by(|(ca, za), (cb, zb)| {
                    ca.cmp(cb)
                        .then(za.score.total_cmp(&zb.score))
                        .then(za.id.cmp(&zb.id))
                });

            match best {
                Some((cost, origin)) => {
                    let mut route = build_path(&origin.id, &parents);
                    route.reverse();
                    let path_cost_km = cost as f64 / 1000.0;
                    let lag_minutes = path_cost_km / self.config.tanker_speed_kmh * 60.0;
                    debug!(
                        from = %origin.name,
                        to = %target.name,
                        cost_km = path_cost_km,
                        "Dispatch route selected"
                    );
                    plan.routes.push(DispatchRoute {
                        from: origin.id,
                        to: target.id,
                        from_name: origin.name.clone(),
                        to_name: target.name.clone(),
                        route,
                        path_cost_km: round2(path_cost_km),
                        lag_minutes: round2(lag_minutes),
                    });
                }
                None => {
                    warn!(zone = %target.name, "No non-critical zone can reach critical zone, dispatch unavailable");
                    plan.unavailable.push(DispatchUnavailable {
                        zone: target.id,
                        zone_name: target.name.clone(),
                        reason: "no reachable non-critical origin zone".to_string(),
                    });
                }
            }
        }
        plan
    }
}
