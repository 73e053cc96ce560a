use clap::Args;
use geo::Geometry;
use road_closures_openlr::{error::GeospatialError, model::geometry_ops};

/// a geometry given either as GeoJSON or as a flat coordinate list.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct GeometryArgs {
    /// GeoJSON geometry, e.g. '{"type":"LineString","coordinates":[[-87.6298,41.8781],[-87.629,41.8785]]}'
    #[arg(long)]
    pub geometry: Option<String>,
    /// comma-separated coordinates lon1,lat1,lon2,lat2,...
    #[arg(long, allow_hyphen_values = true)]
    pub coordinates: Option<String>,
}

impl GeometryArgs {
    pub fn to_geometry(&self) -> Result<Geometry<f64>, GeospatialError> {
        match (&self.geometry, &self.coordinates) {
            (Some(geojson), _) => geometry_ops::geometry_from_geojson_str(geojson),
            (None, Some(list)) => {
                geometry_ops::linestring_from_coordinate_list(list).map(Geometry::LineString)
            }
            (None, None) => Err(GeospatialError::InvalidGeoJson(String::from(
                "no geometry provided",
            ))),
        }
    }
}
