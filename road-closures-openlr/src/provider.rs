use crate::error::OpenLrError;
use geo::LineString;

/// source of road way geometries from an external map-data service.
///
/// implementations block on the network for at most their configured timeout
/// and should be called from a dedicated worker thread.
pub trait WayGeometryProvider: Send + Sync {
    /// fetches the ordered geometry of a way. when both `start_node` and
    /// `end_node` are given and found on the way, only the inclusive section
    /// between them is returned; otherwise the full way is returned.
    ///
    /// # Errors
    ///
    /// * `OpenLrError::ExternalService` for network or HTTP failures
    /// * `OpenLrError::WayNotFound` when the service has no such way
    /// * `OpenLrError::InsufficientWayCoordinates` when fewer than 2 points are found
    fn fetch(
        &self,
        way_id: i64,
        start_node: Option<i64>,
        end_node: Option<i64>,
    ) -> Result<LineString<f64>, OpenLrError>;
}
