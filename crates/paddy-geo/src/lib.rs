// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Region lookup for shared locations.
//!
//! [`RegionResolver`] holds province boundaries parsed from a GeoJSON
//! `FeatureCollection` and answers point-in-polygon queries.
//! [`LazyRegionResolver`] defers reading the boundary file until the first
//! lookup and then keeps the parsed boundaries for the process lifetime.

mod boundary;
pub mod codes;

use std::path::{Path, PathBuf};

use paddy_core::PaddyError;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::boundary::{FeatureCollection, Polygon};
pub use crate::codes::{UNKNOWN_CODE, region_code};

/// Region name recorded when a point falls outside every boundary.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Default feature property holding the region name.
pub const DEFAULT_NAME_PROPERTY: &str = "ADM1_EN";

#[derive(Debug, Clone)]
struct Region {
    name: String,
    polygons: Vec<Polygon>,
}

/// Read-only set of named region boundaries.
#[derive(Debug, Clone, Default)]
pub struct RegionResolver {
    regions: Vec<Region>,
}

impl RegionResolver {
    /// Parses a GeoJSON `FeatureCollection`. Features without a string
    /// `name_property` or without polygon geometry are skipped.
    pub fn from_geojson(source: &[u8], name_property: &str) -> Result<Self, PaddyError> {
        let collection: FeatureCollection = serde_json::from_slice(source)
            .map_err(|e| PaddyError::Config(format!("invalid boundary GeoJSON: {e}")))?;

        let mut regions = Vec::new();
        for feature in collection.features {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(name_property))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let (Some(name), Some(geometry)) = (name, feature.geometry) else {
                debug!("skipping boundary feature without name or geometry");
                continue;
            };
            let polygons = geometry.into_polygons();
            if polygons.is_empty() {
                continue;
            }
            regions.push(Region { name, polygons });
        }

        Ok(Self { regions })
    }

    /// Reads and parses a GeoJSON file.
    pub async fn from_path(path: &Path, name_property: &str) -> Result<Self, PaddyError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PaddyError::io(path, e))?;
        let resolver = Self::from_geojson(&bytes, name_property)?;
        info!(
            path = %path.display(),
            regions = resolver.len(),
            "loaded region boundaries"
        );
        Ok(resolver)
    }

    /// Returns the name of the first region containing the point.
    pub fn resolve(&self, latitude: f64, longitude: f64) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.polygons.iter().any(|p| p.contains(longitude, latitude)))
            .map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// A [`RegionResolver`] loaded from disk on first use.
#[derive(Debug)]
pub struct LazyRegionResolver {
    path: PathBuf,
    name_property: String,
    loaded: OnceCell<RegionResolver>,
}

impl LazyRegionResolver {
    pub fn new(path: impl Into<PathBuf>, name_property: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name_property: name_property.into(),
            loaded: OnceCell::new(),
        }
    }

    /// Wraps an already parsed resolver.
    pub fn preloaded(resolver: RegionResolver) -> Self {
        Self {
            path: PathBuf::new(),
            name_property: DEFAULT_NAME_PROPERTY.to_string(),
            loaded: OnceCell::new_with(Some(resolver)),
        }
    }

    /// Loads the boundaries if not loaded yet. Concurrent callers share one load.
    pub async fn get(&self) -> Result<&RegionResolver, PaddyError> {
        self.loaded
            .get_or_try_init(|| RegionResolver::from_path(&self.path, &self.name_property))
            .await
    }

    /// Resolves a point, loading boundaries on first use.
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> Result<Option<String>, PaddyError> {
        Ok(self.get().await?.resolve(latitude, longitude).map(str::to_string))
    }
}
