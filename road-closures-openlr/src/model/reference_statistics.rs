use super::ClosureRecord;
use serde::{Deserialize, Serialize};

/// how many closures in a collection carry a location reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStatistics {
    pub total_closures: usize,
    pub total_encoded: usize,
    /// percentage of closures with a reference, 0.0 for an empty collection
    pub encoding_success_rate: f64,
}

impl ReferenceStatistics {
    pub fn from_closures(closures: &[ClosureRecord]) -> ReferenceStatistics {
        let total_closures = closures.len();
        let total_encoded = closures.iter().filter(|c| c.has_reference()).count();
        let encoding_success_rate = if total_closures == 0 {
            0.0
        } else {
            (total_encoded as f64 / total_closures as f64) * 100.0
        };
        ReferenceStatistics {
            total_closures,
            total_encoded,
            encoding_success_rate,
        }
    }
}
