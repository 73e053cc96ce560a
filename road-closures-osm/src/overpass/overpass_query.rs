use crate::model::OsmWayId;

/// Overpass QL that returns a way along with every node it references.
pub fn way_query(way_id: OsmWayId) -> String {
    format!(
        r#"
[out:json];
(
  way({});
);
(._;>;);
out geom;
"#,
        way_id.0
    )
}
