//! Zone registry: the fixed set of monitored zones and their adjacency.

use crate::error::ComputationError;
use crate::types::GeoPoint;

use super::scenario::Scenario;

/// A monitored zone's static description.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSite {
    pub id: u32,
    pub name: String,
    pub position: GeoPoint,
    /// Baseline fragility per scenario, indexed by [`Scenario::index`]
    pub baselines: [f64; 4],
}

impl ZoneSite {
    pub fn baseline(&self, scenario: Scenario) -> f64 {
        self.baselines[scenario.index()]
    }
}

/// Read-only zone set plus undirected adjacency edges.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    sites: Vec<ZoneSite>,
    edges: Vec<(u32, u32)>,
}

impl ZoneRegistry {
    /// Build a registry, checking that it is non-empty and every edge
    /// endpoint names a known zone.
    pub fn new(sites: Vec<ZoneSite>, edges: Vec<(u32, u32)>) -> Result<Self, ComputationError> {
        if sites.is_empty() {
            return Err(ComputationError::EmptyRegistry);
        }
        for &(a, b) in &edges {
            for id in [a, b] {
                if !sites.iter().any(|s| s.id == id) {
                    return Err(ComputationError::UnknownGraphNode(id));
                }
            }
        }
        Ok(Self { sites, edges })
    }

    /// The five Dharavi-area zones monitored by default.
    pub fn mumbai() -> Self {
        // Baselines: [Normal, Flood Event, Power Failure, High Demand Crisis]
        let site = |id: u32, name: &str, lat: f64, lon: f64, baselines: [f64; 4]| ZoneSite {
            id,
            name: name.to_string(),
            position: GeoPoint::new(lat, lon),
            baselines,
        };
        Self {
            sites: vec![
                site(0, "Dharavi West", 19.07, 72.87, [4.0, 30.0, 20.0, 25.0]),
                site(1, "Dharavi East", 19.08, 72.88, [6.0, 25.0, 80.0, 30.0]),
                site(2, "Mahim Creek", 19.06, 72.86, [3.0, 85.0, 55.0, 35.0]),
                site(3, "Sion South", 19.05, 72.88, [5.0, 65.0, 30.0, 75.0]),
                site(4, "Matunga", 19.07, 72.89, [2.0, 20.0, 25.0, 50.0]),
            ],
            edges: vec![(0, 1), (1, 2), (2, 3), (3, 4), (0, 4), (1, 3)],
        }
    }

    pub fn sites(&self) -> &[ZoneSite] {
        &self.sites
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&ZoneSite> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// Zones sharing an edge with `id`.
    pub fn neighbors(&self, id: u32) -> impl Iterator<Item = u32> + '_ {
        self.edges.iter().filter_map(move |&(a, b)| {
            if a == id {
                Some(b)
            } else if b == id {
                Some(a)
            } else {
                None
            }
        })
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::mumbai()
    }
}
