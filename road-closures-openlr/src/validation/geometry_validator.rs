use crate::{accuracy, error::GeospatialError, model::geometry_ops};
use geo::{Coord, Geometry, LineString};
use serde::{Deserialize, Serialize};

pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;

/// a pair of consecutive points closer together than the configured minimum distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortSegment {
    /// index of the first point of the pair
    pub index: usize,
    pub distance_meters: f64,
    pub min_distance_meters: f64,
}

impl std::fmt::Display for ShortSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "points {} and {} are {:.2}m apart, below the minimum of {:.2}m",
            self.index,
            self.index + 1,
            self.distance_meters,
            self.min_distance_meters
        )
    }
}

/// checks that a geometry can be encoded as a location reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryValidator {
    /// consecutive points closer than this produce a warning. 0 disables the check.
    pub min_distance_meters: f64,
}

impl GeometryValidator {
    pub fn new(min_distance_meters: f64) -> GeometryValidator {
        GeometryValidator {
            min_distance_meters,
        }
    }

    /// validates the geometry, returning the LineString it holds.
    ///
    /// # Errors
    ///
    /// * `GeospatialError::UnsupportedGeometryType` for anything other than a LineString
    /// * `GeospatialError::InsufficientCoordinates` for fewer than 2 points
    /// * `GeospatialError::CoordinateOutOfRange` for a longitude outside [-180, 180],
    ///   a latitude outside [-90, 90], or a non-finite value
    ///
    /// consecutive points that are too close together are logged as warnings
    /// and do not fail validation.
    pub fn validate<'a>(
        &self,
        geometry: &'a Geometry<f64>,
    ) -> Result<&'a LineString<f64>, GeospatialError> {
        let linestring = match geometry {
            Geometry::LineString(ls) => ls,
            other => {
                return Err(GeospatialError::UnsupportedGeometryType(
                    geometry_ops::geometry_type_name(other).to_string(),
                ))
            }
        };
        self.validate_linestring(linestring)?;
        Ok(linestring)
    }

    /// validates the points of a LineString.
    pub fn validate_linestring(&self, linestring: &LineString<f64>) -> Result<(), GeospatialError> {
        if linestring.0.len() < 2 {
            return Err(GeospatialError::InsufficientCoordinates(linestring.0.len()));
        }
        if let Some(coord) = linestring.coords().find(|c| !coordinate_in_range(c)) {
            return Err(GeospatialError::CoordinateOutOfRange {
                lon: coord.x,
                lat: coord.y,
            });
        }
        for short in self.short_segments(linestring) {
            log::warn!("OpenLR geometry data quality: {short}");
        }
        Ok(())
    }

    /// finds consecutive point pairs closer together than the minimum distance.
    pub fn short_segments(&self, linestring: &LineString<f64>) -> Vec<ShortSegment> {
        if self.min_distance_meters <= 0.0 {
            return vec![];
        }
        linestring
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let distance_meters = accuracy::haversine_distance_meters(line.start, line.end);
                if distance_meters < self.min_distance_meters {
                    Some(ShortSegment {
                        index,
                        distance_meters,
                        min_distance_meters: self.min_distance_meters,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// true if the coordinate is a finite WGS84 longitude/latitude pair.
pub fn coordinate_in_range(coord: &Coord<f64>) -> bool {
    (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&coord.x)
        && (MIN_LATITUDE..=MAX_LATITUDE).contains(&coord.y)
}
