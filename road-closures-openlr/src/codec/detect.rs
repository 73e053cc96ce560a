use super::binary::MARKER;
use base64::{engine::general_purpose, Engine as _};

/// the textual form a reference was recognized as, with the payload when it
/// carries a binary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedFormat {
    Base64(Vec<u8>),
    Hex(Vec<u8>),
    Xml,
    Unknown,
}

/// classifies a reference by trying each textual form in a fixed order.
///
/// base64 and hex share an alphabet, so every hex reference of a whole number
/// of points is also well-formed base64. the base64 reading only wins outright
/// when it yields a payload that starts with the marker byte; a base64 form
/// starts with `Q` and a hex form with `42`, so neither can be mistaken for
/// the other. after that:
///
/// 1. hex
/// 2. base64 without the marker, which fails later with a format error
/// 3. XML when the text starts with `<`
/// 4. unknown
pub fn classify(reference: &str) -> DetectedFormat {
    let text = reference.trim();
    if text.is_empty() {
        return DetectedFormat::Unknown;
    }
    let base64_payload = general_purpose::STANDARD.decode(text).ok();
    match base64_payload {
        Some(payload) if payload.first() == Some(&MARKER) => DetectedFormat::Base64(payload),
        base64_payload => {
            if let Ok(payload) = hex::decode(text) {
                DetectedFormat::Hex(payload)
            } else if let Some(payload) = base64_payload {
                DetectedFormat::Base64(payload)
            } else if text.starts_with('<') {
                DetectedFormat::Xml
            } else {
                DetectedFormat::Unknown
            }
        }
    }
}
