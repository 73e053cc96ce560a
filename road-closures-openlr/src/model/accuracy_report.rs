use super::{geometry_ops, EncodedReference};
use geo::{Geometry, LineString};
use serde::{Deserialize, Serialize};

/// outcome of scoring a decoded reference against the geometry it should represent.
///
/// `accuracy_meters` is the mean per-point geodesic drift, or +∞ when the two
/// geometries cannot be compared. `valid` holds when the drift does not exceed
/// `tolerance_meters`. An infinite drift is written as `null` and read back as +∞.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub success: bool,
    pub reference: Option<EncodedReference>,
    #[serde(with = "unbounded_meters")]
    pub accuracy_meters: f64,
    pub tolerance_meters: f64,
    pub valid: bool,
    #[serde(with = "geometry_ops::geojson_option")]
    pub decoded_geometry: Option<Geometry<f64>>,
    #[serde(with = "geometry_ops::geojson_option")]
    pub original_geometry: Option<Geometry<f64>>,
    pub error: Option<String>,
}

impl AccuracyReport {
    /// report for a decode that completed and was scored.
    pub fn scored(
        reference: EncodedReference,
        original: &Geometry<f64>,
        decoded: LineString<f64>,
        accuracy_meters: f64,
        tolerance_meters: f64,
    ) -> AccuracyReport {
        AccuracyReport {
            success: true,
            reference: Some(reference),
            accuracy_meters,
            tolerance_meters,
            valid: accuracy_meters <= tolerance_meters,
            decoded_geometry: Some(Geometry::LineString(decoded)),
            original_geometry: Some(original.clone()),
            error: None,
        }
    }

    /// report for an encode or decode that failed before any scoring happened.
    pub fn failed(
        reference: Option<EncodedReference>,
        original: Option<&Geometry<f64>>,
        tolerance_meters: f64,
        error: String,
    ) -> AccuracyReport {
        AccuracyReport {
            success: false,
            reference,
            accuracy_meters: f64::INFINITY,
            tolerance_meters,
            valid: false,
            decoded_geometry: None,
            original_geometry: original.cloned(),
            error: Some(error),
        }
    }
}

/// stores a distance as `Option<f64>`, with `None` standing for +∞.
mod unbounded_meters {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(meters: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let value = if meters.is_finite() { Some(*meters) } else { None };
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.unwrap_or(f64::INFINITY))
    }
}
