//! conversion between LineString geometries and OpenLR-style location reference strings.
pub mod binary;
pub mod detect;
pub mod xml;

use crate::{
    config::OpenLrConfig,
    error::OpenLrError,
    model::{EncodedReference, Format},
    validation::GeometryValidator,
};
use base64::{engine::general_purpose, Engine as _};
use detect::DetectedFormat;
use geo::{Geometry, LineString};

/// encodes and decodes location references. holds only immutable settings
/// and is safe to share across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Codec {
    validator: GeometryValidator,
}

impl Codec {
    pub fn new(validator: GeometryValidator) -> Codec {
        Codec { validator }
    }

    pub fn from_config(config: &OpenLrConfig) -> Codec {
        Codec::new(GeometryValidator::new(config.min_distance))
    }

    pub fn validator(&self) -> &GeometryValidator {
        &self.validator
    }

    /// encodes a LineString geometry into a reference string of the requested format.
    ///
    /// # Errors
    ///
    /// * `OpenLrError::Geospatial` when validation fails, before any bytes are produced
    /// * `OpenLrError::Overflow` when the LineString has more than 255 points
    pub fn encode(
        &self,
        geometry: &Geometry<f64>,
        format: Format,
    ) -> Result<EncodedReference, OpenLrError> {
        let linestring = self.validator.validate(geometry)?;
        let encoded = match format {
            Format::Xml => {
                if linestring.0.len() > binary::MAX_POINTS {
                    return Err(OpenLrError::Overflow(linestring.0.len()));
                }
                xml::encode_xml(linestring)?
            }
            Format::Base64 => general_purpose::STANDARD.encode(binary::encode_payload(linestring)?),
            Format::Hex | Format::Binary => hex::encode(binary::encode_payload(linestring)?),
        };
        log::debug!(
            "encoded {} point LineString as {format} ({} chars)",
            linestring.0.len(),
            encoded.len()
        );
        Ok(EncodedReference(encoded))
    }

    /// decodes a reference string of any supported format into a LineString.
    ///
    /// # Errors
    ///
    /// * `OpenLrError::UnknownFormat` when the text matches no supported form
    /// * `OpenLrError::InvalidFormat` or `OpenLrError::LengthMismatch` for a
    ///   malformed binary payload
    /// * `OpenLrError::InvalidXml` for a malformed XML document
    pub fn decode(&self, reference: &str) -> Result<LineString<f64>, OpenLrError> {
        match detect::classify(reference) {
            DetectedFormat::Base64(payload) | DetectedFormat::Hex(payload) => {
                binary::decode_payload(&payload)
            }
            DetectedFormat::Xml => xml::decode_xml(reference.trim()),
            DetectedFormat::Unknown => Err(OpenLrError::UnknownFormat),
        }
    }

    /// true if the reference decodes. the decode error is logged and dropped.
    pub fn validate_code(&self, reference: &str) -> bool {
        match self.decode(reference) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("reference failed validation: {e}");
                false
            }
        }
    }
}

/// decodes a reference with a default codec. decoding is independent of the
/// validator settings.
pub fn decode(reference: &str) -> Result<LineString<f64>, OpenLrError> {
    Codec::default().decode(reference)
}

pub fn validate_code(reference: &str) -> bool {
    Codec::default().validate_code(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeospatialError;
    use geo::{line_string, point, Coord};

    fn chicago() -> Geometry<f64> {
        Geometry::LineString(line_string![(x: -87.6298, y: 41.8781), (x: -87.6290, y: 41.8785)])
    }

    fn assert_close(a: &LineString<f64>, b: &LineString<f64>, tol: f64) {
        assert_eq!(a.0.len(), b.0.len());
        for (p, q) in a.coords().zip(b.coords()) {
            assert!((p.x - q.x).abs() <= tol, "{p:?} vs {q:?}");
            assert!((p.y - q.y).abs() <= tol, "{p:?} vs {q:?}");
        }
    }

    #[test]
    fn test_every_format_decodes() {
        let codec = Codec::default();
        let original = match chicago() {
            Geometry::LineString(ls) => ls,
            _ => panic!("fixture is a LineString"),
        };
        for format in Format::ALL {
            let code = codec.encode(&chicago(), format).unwrap();
            let decoded = codec.decode(code.as_str()).unwrap();
            assert_close(&original, &decoded, 1e-6);
        }
    }

    #[test]
    fn test_base64_and_hex_agree() {
        let codec = Codec::default();
        let b64 = codec.encode(&chicago(), Format::Base64).unwrap();
        let hex = codec.encode(&chicago(), Format::Hex).unwrap();
        assert!(b64.as_str().starts_with('Q'));
        assert!(hex.as_str().starts_with("4202"));
        assert_eq!(codec.decode(b64.as_str()).unwrap(), codec.decode(hex.as_str()).unwrap());
    }

    #[test]
    fn test_binary_renders_as_hex() {
        let codec = Codec::default();
        let binary = codec.encode(&chicago(), Format::Binary).unwrap();
        let hex = codec.encode(&chicago(), Format::Hex).unwrap();
        assert_eq!(binary, hex);
        assert_eq!(binary.as_str().len(), 2 * binary::payload_len(2));
    }

    #[test]
    fn test_rejects_non_linestring() {
        let codec = Codec::default();
        match codec.encode(&Geometry::Point(point!(x: 1.0, y: 2.0)), Format::Base64) {
            Err(OpenLrError::Geospatial {
                source: GeospatialError::UnsupportedGeometryType(t),
            }) => assert_eq!(t, "Point"),
            other => panic!("expected unsupported geometry type, found {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_fails_before_encoding() {
        let codec = Codec::default();
        for (x, y) in [(200.0, 10.0), (10.0, 95.0)] {
            let geometry = Geometry::LineString(LineString(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x, y },
            ]));
            for format in Format::ALL {
                match codec.encode(&geometry, format) {
                    Err(OpenLrError::Geospatial {
                        source: GeospatialError::CoordinateOutOfRange { .. },
                    }) => {}
                    other => panic!("expected out of range, found {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_xml_overflow() {
        let ls = LineString((0..256).map(|i| Coord { x: i as f64 * 0.001, y: 0.0 }).collect());
        match Codec::default().encode(&Geometry::LineString(ls), Format::Xml) {
            Err(OpenLrError::Overflow(256)) => {}
            other => panic!("expected overflow, found {other:?}"),
        }
    }

    #[test]
    fn test_malformed_references() {
        match decode("not-valid!!") {
            Err(OpenLrError::UnknownFormat) => {}
            other => panic!("expected unknown format, found {other:?}"),
        }
        match decode("QUJD") {
            Err(OpenLrError::InvalidFormat(_)) => {}
            other => panic!("expected invalid format, found {other:?}"),
        }
        match decode("42020000") {
            Err(OpenLrError::LengthMismatch { expected: 18, actual: 4 }) => {}
            other => panic!("expected length mismatch, found {other:?}"),
        }
        assert!(!validate_code("not-valid!!"));
        assert!(!validate_code(""));
        assert!(validate_code("QgA="));
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let code = Codec::default().encode(&chicago(), Format::Xml).unwrap();
        let padded = format!("\n  {}  \n", code.as_str());
        assert!(validate_code(&padded));
    }
}
