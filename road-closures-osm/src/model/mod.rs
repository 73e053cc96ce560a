mod osm_node_id;
mod osm_way_id;
mod overpass_response;

pub use osm_node_id::OsmNodeId;
pub use osm_way_id::OsmWayId;
pub use overpass_response::{OverpassElement, OverpassResponse};
