//! the binary payload shared by the base64, hex and binary forms.
//!
//! ```text
//! byte 0      marker 0x42
//! byte 1      point count (0-255)
//! per point   u32 big-endian round((lon + 180) * 1e6) mod 2^32
//!             u32 big-endian round((lat + 90) * 1e6) mod 2^32
//! ```
use crate::error::OpenLrError;
use geo::{Coord, LineString};
use itertools::Itertools;

pub const MARKER: u8 = 0x42;
pub const HEADER_LEN: usize = 2;
pub const POINT_LEN: usize = 8;
pub const MAX_POINTS: usize = u8::MAX as usize;
pub const COORDINATE_FACTOR: f64 = 1_000_000.0;
pub const LONGITUDE_OFFSET: f64 = 180.0;
pub const LATITUDE_OFFSET: f64 = 90.0;

/// expected payload length for a point count.
pub fn payload_len(point_count: usize) -> usize {
    HEADER_LEN + POINT_LEN * point_count
}

/// packs a LineString into the binary payload.
pub fn encode_payload(linestring: &LineString<f64>) -> Result<Vec<u8>, OpenLrError> {
    let point_count = linestring.0.len();
    if point_count > MAX_POINTS {
        return Err(OpenLrError::Overflow(point_count));
    }
    let mut data = Vec::with_capacity(payload_len(point_count));
    data.push(MARKER);
    data.push(point_count as u8);
    for coord in linestring.coords() {
        data.extend_from_slice(&scale(coord.x, LONGITUDE_OFFSET).to_be_bytes());
        data.extend_from_slice(&scale(coord.y, LATITUDE_OFFSET).to_be_bytes());
    }
    Ok(data)
}

/// unpacks a binary payload into a LineString.
pub fn decode_payload(data: &[u8]) -> Result<LineString<f64>, OpenLrError> {
    let (point_count, body) = match data {
        [] => return Err(OpenLrError::InvalidFormat(String::from("empty payload"))),
        [marker, ..] if *marker != MARKER => {
            return Err(OpenLrError::InvalidFormat(format!(
                "expected marker byte 0x{MARKER:02x}, found 0x{marker:02x}"
            )))
        }
        [_] => {
            return Err(OpenLrError::LengthMismatch {
                expected: HEADER_LEN,
                actual: 1,
            })
        }
        [_, count, body @ ..] => (*count as usize, body),
    };
    let expected = payload_len(point_count);
    if data.len() != expected {
        return Err(OpenLrError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }
    let coords = body
        .chunks_exact(POINT_LEN)
        .map(|block| {
            let (lon_bytes, lat_bytes) = block.split_at(4);
            Ok(Coord {
                x: unscale(read_u32(lon_bytes)?, LONGITUDE_OFFSET),
                y: unscale(read_u32(lat_bytes)?, LATITUDE_OFFSET),
            })
        })
        .collect::<Result<Vec<_>, OpenLrError>>()?;
    Ok(LineString(coords))
}

/// shifts a degree value into the positive range and quantizes it to micro-degrees.
fn scale(value: f64, offset: f64) -> u32 {
    let scaled = ((value + offset) * COORDINATE_FACTOR).round() as i64;
    scaled.rem_euclid(1_i64 << 32) as u32
}

fn unscale(value: u32, offset: f64) -> f64 {
    value as f64 / COORDINATE_FACTOR - offset
}

fn read_u32(bytes: &[u8]) -> Result<u32, OpenLrError> {
    let array: [u8; 4] = bytes.try_into().map_err(|_| {
        OpenLrError::InternalError(format!(
            "expected 4 bytes for a coordinate, found {}",
            bytes.iter().map(|b| format!("{b:02x}")).join("")
        ))
    })?;
    Ok(u32::from_be_bytes(array))
}
