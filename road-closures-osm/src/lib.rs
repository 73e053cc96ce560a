pub mod model;
pub mod osm_way_ops;
pub mod overpass;
