use crate::{
    accuracy,
    codec::Codec,
    model::{AccuracyReport, EncodedReference, Format},
};
use geo::{Geometry, LineString};

/// encodes a geometry as base64, decodes it again and scores the drift.
pub fn test_roundtrip(codec: &Codec, geometry: &Geometry<f64>, tolerance_meters: f64) -> AccuracyReport {
    test_roundtrip_as(codec, Format::Base64, geometry, tolerance_meters)
}

/// encodes a geometry in the given format, decodes it again and scores the
/// decoded points against the originals. failures are reported in the
/// `error` field and never propagated.
pub fn test_roundtrip_as(
    codec: &Codec,
    format: Format,
    geometry: &Geometry<f64>,
    tolerance_meters: f64,
) -> AccuracyReport {
    let reference = match codec.encode(geometry, format) {
        Ok(reference) => reference,
        Err(e) => {
            log::debug!("round trip encode failed: {e}");
            return AccuracyReport::failed(None, Some(geometry), tolerance_meters, e.to_string());
        }
    };
    score_reference(codec, reference, geometry, tolerance_meters)
}

/// decodes a stored reference and scores it against the geometry it was
/// produced from.
pub fn score_reference(
    codec: &Codec,
    reference: EncodedReference,
    original: &Geometry<f64>,
    tolerance_meters: f64,
) -> AccuracyReport {
    let decoded = match codec.decode(reference.as_str()) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("reference decode failed: {e}");
            return AccuracyReport::failed(
                Some(reference),
                Some(original),
                tolerance_meters,
                e.to_string(),
            );
        }
    };
    let accuracy_meters = match original {
        Geometry::LineString(ls) => accuracy::geometry_accuracy_meters(ls, &decoded),
        other => accuracy::geometry_accuracy_meters(&LineString(coords_of(other)), &decoded),
    };
    AccuracyReport::scored(reference, original, decoded, accuracy_meters, tolerance_meters)
}

/// flattened coordinates of point-like geometries. anything else cannot be
/// paired with a decoded reference and yields none, which scores +∞.
fn coords_of(geometry: &Geometry<f64>) -> Vec<geo::Coord<f64>> {
    match geometry {
        Geometry::Point(p) => vec![p.0],
        Geometry::Line(l) => vec![l.start, l.end],
        Geometry::MultiPoint(mp) => mp.iter().map(|p| p.0).collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeospatialError, OpenLrError};
    use geo::{line_string, point, Coord};

    fn chicago() -> Geometry<f64> {
        Geometry::LineString(line_string![(x: -87.6298, y: 41.8781), (x: -87.6290, y: 41.8785)])
    }

    fn line_of(n: usize) -> Geometry<f64> {
        Geometry::LineString(LineString(
            (0..n)
                .map(|i| Coord {
                    x: -87.6298 + i as f64 * 0.001,
                    y: 41.8781 + i as f64 * 0.0005,
                })
                .collect(),
        ))
    }

    #[test]
    fn test_chicago_scenario() {
        let report = test_roundtrip(&Codec::default(), &chicago(), 50.0);
        assert!(report.success);
        assert!(report.valid);
        assert!(report.accuracy_meters < 1.0);
        assert!(report.error.is_none());
        assert!(report.reference.is_some());
        match report.decoded_geometry {
            Some(Geometry::LineString(ls)) => {
                let expected = [(-87.6298, 41.8781), (-87.6290, 41.8785)];
                for (c, (x, y)) in ls.coords().zip(expected) {
                    assert!((c.x - x).abs() <= 1e-6);
                    assert!((c.y - y).abs() <= 1e-6);
                }
            }
            other => panic!("expected decoded LineString, found {other:?}"),
        }
    }

    #[test]
    fn test_all_formats_valid_at_one_meter() {
        let codec = Codec::default();
        for n in [2, 3, 50, 255] {
            for format in Format::ALL {
                let report = test_roundtrip_as(&codec, format, &line_of(n), 1.0);
                assert!(report.valid, "{n} points as {format}: {report:?}");
                assert!(report.accuracy_meters <= 0.11);
            }
        }
    }

    #[test]
    fn test_point_count_boundaries() {
        let codec = Codec::default();
        for n in [0, 1] {
            let report = test_roundtrip(&codec, &line_of(n), 50.0);
            assert!(!report.success);
            assert!(!report.valid);
            assert!(report.accuracy_meters.is_infinite());
            assert!(report.error.unwrap().contains("at least 2"));
        }
        let report = test_roundtrip(&codec, &line_of(256), 50.0);
        assert!(!report.valid);
        assert!(report.error.unwrap().contains("256"));
    }

    #[test]
    fn test_out_of_range_reported() {
        let geometry = Geometry::LineString(line_string![(x: 200.0, y: 10.0), (x: 0.0, y: 0.0)]);
        let report = test_roundtrip(&Codec::default(), &geometry, 50.0);
        assert!(!report.valid);
        assert!(report.reference.is_none());
        assert_eq!(
            report.error,
            Some(
                OpenLrError::from(GeospatialError::CoordinateOutOfRange { lon: 200.0, lat: 10.0 })
                    .to_string()
            )
        );
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let codec = Codec::default();
        let exact = test_roundtrip(&codec, &chicago(), 50.0);
        let at_boundary = test_roundtrip(&codec, &chicago(), exact.accuracy_meters);
        assert!(at_boundary.valid);
    }

    #[test]
    fn test_score_malformed_reference() {
        let report = score_reference(
            &Codec::default(),
            EncodedReference::from("not-valid!!"),
            &chicago(),
            50.0,
        );
        assert!(!report.success);
        assert!(!report.valid);
        assert_eq!(report.error, Some(OpenLrError::UnknownFormat.to_string()));
        assert_eq!(report.reference, Some(EncodedReference::from("not-valid!!")));
    }

    #[test]
    fn test_score_against_point_is_unmatched() {
        let codec = Codec::default();
        let reference = codec.encode(&chicago(), Format::Base64).unwrap();
        let report = score_reference(&codec, reference, &Geometry::Point(point!(x: -87.6298, y: 41.8781)), 50.0);
        assert!(report.success);
        assert!(report.accuracy_meters.is_infinite());
        assert!(!report.valid);
    }
}
