mod overpass_query;
mod overpass_way_provider;

pub use overpass_query::way_query;
pub use overpass_way_provider::{OverpassWayProvider, OVERPASS_SERVICE};
