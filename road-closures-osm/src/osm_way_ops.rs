use crate::model::{OsmNodeId, OsmWayId, OverpassResponse};
use geo::{Coord, LineString};
use itertools::Itertools;
use road_closures_openlr::error::OpenLrError;

/// takes all node ids found between src and dst in a list of nodes, inclusive.
/// node list is not required to start with src or end with dst.
pub fn extract_between_nodes<'a>(
    src: &OsmNodeId,
    dst: &OsmNodeId,
    nodes: &'a [OsmNodeId],
) -> Option<&'a [OsmNodeId]> {
    let start = nodes.iter().position(|x| x == src)?;
    let end = nodes[start..].iter().position(|x| x == dst)?;
    Some(&nodes[start..=start + end])
}

/// the section of a way between an optional start and end node.
///
/// a bound that is not found on the way (or an end that comes before the
/// start) selects the full way, with a warning.
pub fn select_node_range<'a>(
    way_id: OsmWayId,
    nodes: &'a [OsmNodeId],
    start_node: Option<OsmNodeId>,
    end_node: Option<OsmNodeId>,
) -> &'a [OsmNodeId] {
    let selected = match (start_node, end_node) {
        (None, None) => return nodes,
        (Some(src), Some(dst)) => extract_between_nodes(&src, &dst, nodes),
        (Some(src), None) => nodes.iter().position(|x| *x == src).map(|i| &nodes[i..]),
        (None, Some(dst)) => nodes.iter().position(|x| *x == dst).map(|i| &nodes[..=i]),
    };
    match selected {
        Some(range) => range,
        None => {
            let bounds = [start_node, end_node].iter().flatten().join(", ");
            log::warn!("{bounds} not found in order on {way_id}, using the full way");
            nodes
        }
    }
}

/// rebuilds a way's LineString from an Overpass response, following the way's
/// node order. node references without coordinates in the response are skipped.
///
/// # Errors
///
/// * `OpenLrError::WayNotFound` when the response does not contain the way
/// * `OpenLrError::InsufficientWayCoordinates` when fewer than 2 points remain
pub fn way_linestring(
    response: &OverpassResponse,
    way_id: OsmWayId,
    start_node: Option<OsmNodeId>,
    end_node: Option<OsmNodeId>,
) -> Result<LineString<f64>, OpenLrError> {
    let nodes = response
        .way_nodes(way_id)
        .ok_or(OpenLrError::WayNotFound(way_id.0))?;
    let lookup = response.node_coordinates();
    let coords: Vec<Coord<f64>> = select_node_range(way_id, nodes, start_node, end_node)
        .iter()
        .filter_map(|id| lookup.get(id).copied())
        .collect();
    if coords.len() < 2 {
        return Err(OpenLrError::InsufficientWayCoordinates {
            way_id: way_id.0,
            count: coords.len(),
        });
    }
    Ok(LineString(coords))
}
