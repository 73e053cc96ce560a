use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// an OpenStreetMap node id. ids are shared across node versions, so a way
/// lists them in order and geometry is looked up separately.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
#[serde(transparent)]
pub struct OsmNodeId(pub i64);

impl Display for OsmNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node/{}", self.0)
    }
}
