use crate::error::GeospatialError;
use geo::{Coord, Geometry, LineString, Point};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serializer};
use wkt::ToWkt;

/// name of a geometry variant as it appears in GeoJSON.
pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// rounds a coordinate value to `precision` decimal places.
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// parses a GeoJSON geometry object, e.g. `{"type": "LineString", "coordinates": [[lon, lat], ...]}`.
pub fn geometry_from_geojson_str(s: &str) -> Result<Geometry<f64>, GeospatialError> {
    let geojson: geojson::Geometry =
        serde_json::from_str(s).map_err(|e| GeospatialError::InvalidGeoJson(e.to_string()))?;
    geometry_from_geojson(&geojson.value)
}

/// converts a GeoJSON geometry value into a geo geometry. positions must have
/// at least a longitude and a latitude.
pub fn geometry_from_geojson(value: &geojson::Value) -> Result<Geometry<f64>, GeospatialError> {
    match value {
        geojson::Value::Point(position) => Ok(Geometry::Point(Point(position_to_coord(position)?))),
        geojson::Value::LineString(positions) => {
            let coords = positions
                .iter()
                .map(|p| position_to_coord(p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::LineString(LineString(coords)))
        }
        other => {
            check_positions(other)?;
            Geometry::<f64>::try_from(other.clone())
                .map_err(|e| GeospatialError::InvalidGeoJson(e.to_string()))
        }
    }
}

/// converts a geometry into GeoJSON, rounding coordinates to `precision` decimal places.
pub fn geometry_to_geojson(geometry: &Geometry<f64>, precision: u32) -> geojson::Geometry {
    let rounded = match geometry {
        Geometry::LineString(linestring) => Geometry::LineString(round_linestring(linestring, precision)),
        Geometry::Point(point) => Geometry::Point(Point(round_coord(point.0, precision))),
        other => other.clone(),
    };
    geojson::Geometry::new(geojson::Value::from(&rounded))
}

/// converts a LineString into GeoJSON, rounding coordinates to `precision` decimal places.
pub fn linestring_to_geojson(linestring: &LineString<f64>, precision: u32) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::from(&round_linestring(linestring, precision)))
}

/// writes a LineString as WKT, rounding coordinates to `precision` decimal places.
pub fn linestring_to_wkt(linestring: &LineString<f64>, precision: u32) -> String {
    round_linestring(linestring, precision).to_wkt().to_string()
}

/// parses a flat, comma-separated coordinate list `lon1,lat1,lon2,lat2,...` into a LineString.
pub fn linestring_from_coordinate_list(s: &str) -> Result<LineString<f64>, GeospatialError> {
    let values = s
        .split(',')
        .map(|v| {
            v.trim().parse::<f64>().map_err(|e| {
                GeospatialError::InvalidCoordinateList(format!("'{}' is not a number: {e}", v.trim()))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() % 2 != 0 || values.len() < 4 {
        return Err(GeospatialError::InvalidCoordinateList(format!(
            "must provide an even number of values (at least 4), found {}",
            values.len()
        )));
    }
    let coords = values
        .into_iter()
        .tuples::<(f64, f64)>()
        .map(|(x, y)| Coord { x, y })
        .collect_vec();
    Ok(LineString(coords))
}

fn round_coord(coord: Coord<f64>, precision: u32) -> Coord<f64> {
    Coord {
        x: round_to_precision(coord.x, precision),
        y: round_to_precision(coord.y, precision),
    }
}

fn round_linestring(linestring: &LineString<f64>, precision: u32) -> LineString<f64> {
    LineString(
        linestring
            .coords()
            .map(|c| round_coord(*c, precision))
            .collect_vec(),
    )
}

fn position_to_coord(position: &[f64]) -> Result<Coord<f64>, GeospatialError> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(GeospatialError::InvalidGeoJson(format!(
            "each coordinate must be [longitude, latitude], found {position:?}"
        ))),
    }
}

fn check_positions(value: &geojson::Value) -> Result<(), GeospatialError> {
    let check_all = |positions: &[Vec<f64>]| {
        positions
            .iter()
            .try_for_each(|p| position_to_coord(p).map(|_| ()))
    };
    match value {
        geojson::Value::Point(p) => position_to_coord(p).map(|_| ()),
        geojson::Value::MultiPoint(ps) | geojson::Value::LineString(ps) => check_all(ps),
        geojson::Value::MultiLineString(rings) | geojson::Value::Polygon(rings) => {
            rings.iter().try_for_each(|r| check_all(r))
        }
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .try_for_each(|rings| rings.iter().try_for_each(|r| check_all(r))),
        geojson::Value::GeometryCollection(geometries) => geometries
            .iter()
            .try_for_each(|g| check_positions(&g.value)),
    }
}

/// serde helpers that read and write an optional geometry as a GeoJSON object.
pub mod geojson_option {
    use super::*;

    pub fn serialize<S>(geometry: &Option<Geometry<f64>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match geometry {
            None => s.serialize_none(),
            Some(g) => s.serialize_some(&geojson::Geometry::new(geojson::Value::from(g))),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Geometry<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let geojson = Option::<geojson::Geometry>::deserialize(d)?;
        geojson
            .map(|g| geometry_from_geojson(&g.value))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
