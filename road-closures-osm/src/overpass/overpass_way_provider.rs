use super::way_query;
use crate::{
    model::{OsmNodeId, OsmWayId, OverpassResponse},
    osm_way_ops,
};
use geo::LineString;
use reqwest::blocking::Client;
use road_closures_openlr::{
    config::OpenLrConfig, error::OpenLrError, provider::WayGeometryProvider,
};
use std::time::Duration;

pub const OVERPASS_SERVICE: &str = "Overpass";

/// fetches way geometries from an Overpass API interpreter endpoint.
///
/// requests block the calling thread for up to the configured timeout.
#[derive(Debug, Clone)]
pub struct OverpassWayProvider {
    client: Client,
    url: String,
}

impl OverpassWayProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<OverpassWayProvider, OpenLrError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenLrError::external_service(OVERPASS_SERVICE, e))?;
        Ok(OverpassWayProvider {
            client,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &OpenLrConfig) -> Result<OverpassWayProvider, OpenLrError> {
        OverpassWayProvider::new(&config.overpass_url, config.timeout_duration())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn query(&self, way_id: OsmWayId) -> Result<OverpassResponse, OpenLrError> {
        log::debug!("requesting {way_id} from {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .body(way_query(way_id))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                OpenLrError::external_service(OVERPASS_SERVICE, format!("request failed: {e}"))
            })?;
        response.json::<OverpassResponse>().map_err(|e| {
            OpenLrError::external_service(OVERPASS_SERVICE, format!("parsing response failed: {e}"))
        })
    }
}

impl WayGeometryProvider for OverpassWayProvider {
    fn fetch(
        &self,
        way_id: i64,
        start_node: Option<i64>,
        end_node: Option<i64>,
    ) -> Result<LineString<f64>, OpenLrError> {
        let way_id = OsmWayId(way_id);
        let response = self.query(way_id)?;
        osm_way_ops::way_linestring(
            &response,
            way_id,
            start_node.map(OsmNodeId),
            end_node.map(OsmNodeId),
        )
    }
}
