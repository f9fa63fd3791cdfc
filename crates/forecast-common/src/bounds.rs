//! Geographic coordinate and bounds types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.lat, self.lng)
    }
}

/// An axis-aligned lat/lon bounding box.
///
/// Edges are inclusive, so a coordinate lying exactly on the outer edge of a
/// raster still counts as inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    /// Create bounds, rejecting degenerate or non-finite extents.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self, BoundsError> {
        let all_finite = [lat_min, lat_max, lon_min, lon_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(BoundsError::NotFinite);
        }
        if lat_min >= lat_max {
            return Err(BoundsError::Degenerate {
                axis: "latitude",
                min: lat_min,
                max: lat_max,
            });
        }
        if lon_min >= lon_max {
            return Err(BoundsError::Degenerate {
                axis: "longitude",
                min: lon_min,
                max: lon_max,
            });
        }

        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Check if a coordinate falls within these bounds.
    pub fn contains(&self, at: LatLng) -> bool {
        at.lat >= self.lat_min
            && at.lat <= self.lat_max
            && at.lng >= self.lon_min
            && at.lng <= self.lon_max
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.3}, {:.3}] x [{:.3}, {:.3}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundsError {
    #[error("bounds contain a non-finite coordinate")]
    NotFinite,

    #[error("degenerate {axis} extent: min {min} is not below max {max}")]
    Degenerate {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_edge_inclusive() {
        let bounds = GeoBounds::new(25.0, 49.0, -125.0, -66.0).unwrap();
        assert!(bounds.contains(LatLng::new(40.0, -100.0)));
        assert!(bounds.contains(LatLng::new(25.0, -125.0)));
        assert!(bounds.contains(LatLng::new(49.0, -66.0)));
        assert!(!bounds.contains(LatLng::new(50.0, -100.0)));
        assert!(!bounds.contains(LatLng::new(40.0, -60.0)));
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        assert!(matches!(
            GeoBounds::new(10.0, 10.0, 0.0, 1.0),
            Err(BoundsError::Degenerate { axis: "latitude", .. })
        ));
        assert!(matches!(
            GeoBounds::new(0.0, 1.0, 5.0, -5.0),
            Err(BoundsError::Degenerate { axis: "longitude", .. })
        ));
        assert_eq!(
            GeoBounds::new(0.0, f64::NAN, 0.0, 1.0),
            Err(BoundsError::NotFinite)
        );
    }

    #[test]
    fn test_center() {
        let bounds = GeoBounds::new(20.0, 40.0, -120.0, -80.0).unwrap();
        assert_eq!(bounds.center(), LatLng::new(30.0, -100.0));
        assert_eq!(bounds.lat_span(), 20.0);
        assert_eq!(bounds.lon_span(), 40.0);
    }
}
