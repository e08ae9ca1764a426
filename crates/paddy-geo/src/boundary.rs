// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GeoJSON boundary parsing and point-in-polygon tests.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A GeoJSON `FeatureCollection`, reduced to what region lookup needs.
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    pub geometry: Option<Geometry>,
}

/// Positions are `[lon, lat]` with an optional trailing altitude.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// A polygon with holes, stored as closed rings of `(lon, lat)` points.
#[derive(Debug, Clone)]
pub(crate) struct Polygon {
    rings: Vec<Vec<(f64, f64)>>,
    min: (f64, f64),
    max: (f64, f64),
}

impl Polygon {
    pub fn from_rings(raw: &[Vec<Vec<f64>>]) -> Option<Self> {
        let rings: Vec<Vec<(f64, f64)>> = raw
            .iter()
            .map(|ring| {
                ring.iter()
                    .filter(|pos| pos.len() >= 2)
                    .map(|pos| (pos[0], pos[1]))
                    .collect::<Vec<_>>()
            })
            .filter(|ring| ring.len() >= 3)
            .collect();

        let outer = rings.first()?;
        let mut min = outer[0];
        let mut max = outer[0];
        for &(x, y) in outer {
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }

        Some(Self { rings, min, max })
    }

    /// Even-odd ray casting across all rings, so holes are excluded.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if lon < self.min.0 || lon > self.max.0 || lat < self.min.1 || lat > self.max.1 {
            return false;
        }

        let mut inside = false;
        for ring in &self.rings {
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

impl Geometry {
    pub fn into_polygons(self) -> Vec<Polygon> {
        match self {
            Geometry::Polygon { coordinates } => {
                Polygon::from_rings(&coordinates).into_iter().collect()
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .filter_map(|rings| Polygon::from_rings(rings))
                .collect(),
            Geometry::Unsupported => Vec::new(),
        }
    }
}
