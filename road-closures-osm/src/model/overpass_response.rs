use super::{OsmNodeId, OsmWayId};
use geo::Coord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// body of an Overpass API `[out:json]` response. only the `elements`
/// array is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    Node {
        id: OsmNodeId,
        lat: f64,
        lon: f64,
    },
    Way {
        id: OsmWayId,
        #[serde(default)]
        nodes: Vec<OsmNodeId>,
    },
    /// relations, areas and anything else the query did not ask for
    #[serde(other)]
    Other,
}

impl OverpassResponse {
    /// ordered node list of the way, if the response contains it.
    pub fn way_nodes(&self, way_id: OsmWayId) -> Option<&[OsmNodeId]> {
        self.elements.iter().find_map(|e| match e {
            OverpassElement::Way { id, nodes } if *id == way_id => Some(nodes.as_slice()),
            _ => None,
        })
    }

    /// node coordinates keyed by id (x = longitude, y = latitude).
    pub fn node_coordinates(&self) -> HashMap<OsmNodeId, Coord<f64>> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                OverpassElement::Node { id, lat, lon } => Some((*id, Coord { x: *lon, y: *lat })),
                _ => None,
            })
            .collect()
    }
}
