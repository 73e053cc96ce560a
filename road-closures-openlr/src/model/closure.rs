use super::{geometry_ops, EncodedReference};
use crate::error::ClosureStoreError;
use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
pub struct ClosureId(pub i64);

impl Display for ClosureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// the attributes of a road closure that location referencing reads and writes.
/// the closure entity owns its reference: it is overwritten when the geometry
/// changes and discarded with the closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub id: ClosureId,
    #[serde(default, with = "geometry_ops::geojson_option")]
    pub geometry: Option<Geometry<f64>>,
    #[serde(default)]
    pub openlr_code: Option<EncodedReference>,
}

impl ClosureRecord {
    pub fn new(id: i64, geometry: Option<Geometry<f64>>) -> ClosureRecord {
        ClosureRecord {
            id: ClosureId(id),
            geometry,
            openlr_code: None,
        }
    }

    pub fn has_reference(&self) -> bool {
        self.openlr_code
            .as_ref()
            .map(|c| !c.as_str().is_empty())
            .unwrap_or(false)
    }
}

/// persistence seam for regenerated references. each call to `commit` is one
/// transaction: either every update in the slice is stored or none is.
pub trait ClosureStore {
    fn commit(&mut self, updates: &[(ClosureId, EncodedReference)]) -> Result<(), ClosureStoreError>;
}

/// a closure store held in memory, keyed by closure id.
#[derive(Debug, Default, Clone)]
pub struct MemoryClosureStore {
    records: HashMap<ClosureId, ClosureRecord>,
    order: Vec<ClosureId>,
}

impl MemoryClosureStore {
    pub fn new(records: Vec<ClosureRecord>) -> MemoryClosureStore {
        let order = records.iter().map(|r| r.id).collect();
        let records = records.into_iter().map(|r| (r.id, r)).collect();
        MemoryClosureStore { records, order }
    }

    pub fn get(&self, id: &ClosureId) -> Option<&ClosureRecord> {
        self.records.get(id)
    }

    /// the stored records in their original order.
    pub fn records(&self) -> Vec<ClosureRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }
}

impl ClosureStore for MemoryClosureStore {
    fn commit(&mut self, updates: &[(ClosureId, EncodedReference)]) -> Result<(), ClosureStoreError> {
        if let Some((missing, _)) = updates.iter().find(|(id, _)| !self.records.contains_key(id)) {
            return Err(ClosureStoreError::ClosureNotFound(missing.0));
        }
        for (id, reference) in updates {
            if let Some(record) = self.records.get_mut(id) {
                record.openlr_code = Some(reference.clone());
            }
        }
        Ok(())
    }
}
