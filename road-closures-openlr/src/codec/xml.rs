//! the XML form, a decimal-text serialization independent of the binary payload:
//!
//! ```xml
//! <OpenLR>
//!   <LocationReference>
//!     <Point id="0">
//!       <Longitude>-87.6298</Longitude>
//!       <Latitude>41.8781</Latitude>
//!     </Point>
//!   </LocationReference>
//! </OpenLR>
//! ```
use crate::error::OpenLrError;
use geo::{Coord, LineString};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

const ROOT: &str = "OpenLR";
const LOCATION_REFERENCE: &str = "LocationReference";
const POINT: &str = "Point";
const LONGITUDE: &str = "Longitude";
const LATITUDE: &str = "Latitude";

/// writes one `Point` element per coordinate, in order, with a zero-based `id`.
pub fn encode_xml(linestring: &LineString<f64>) -> Result<String, OpenLrError> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut xml, linestring).map_err(|e| OpenLrError::InvalidXml(e.to_string()))?;
    String::from_utf8(xml.into_inner()).map_err(|e| OpenLrError::InvalidXml(e.to_string()))
}

fn write_document(
    xml: &mut Writer<Vec<u8>>,
    linestring: &LineString<f64>,
) -> Result<(), std::io::Error> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new(ROOT)))?;
    xml.write_event(Event::Start(BytesStart::new(LOCATION_REFERENCE)))?;
    for (id, coord) in linestring.coords().enumerate() {
        let mut point = BytesStart::new(POINT);
        point.push_attribute(("id", id.to_string().as_str()));
        xml.write_event(Event::Start(point))?;
        xml.create_element(LONGITUDE)
            .write_text_content(BytesText::new(&coord.x.to_string()))?;
        xml.create_element(LATITUDE)
            .write_text_content(BytesText::new(&coord.y.to_string()))?;
        xml.write_event(Event::End(BytesEnd::new(POINT)))?;
    }
    xml.write_event(Event::End(BytesEnd::new(LOCATION_REFERENCE)))?;
    xml.write_event(Event::End(BytesEnd::new(ROOT)))?;
    Ok(())
}

#[derive(Clone, Copy)]
enum Field {
    Longitude,
    Latitude,
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Field::Longitude => LONGITUDE,
            Field::Latitude => LATITUDE,
        }
    }
}

/// reads every `Point` element in document order.
///
/// the text of a `Longitude` or `Latitude` is gathered across text, CDATA and
/// entity reference events and parsed once its element closes.
///
/// # Errors
///
/// * malformed XML
/// * an unknown entity reference inside a coordinate
/// * a `Point` without a numeric `Longitude` and `Latitude`
/// * a document with no `Point` elements
pub fn decode_xml(text: &str) -> Result<LineString<f64>, OpenLrError> {
    let mut reader = Reader::from_str(text);
    let mut coords: Vec<Coord<f64>> = vec![];
    let mut point: Option<(Option<f64>, Option<f64>)> = None;
    let mut field: Option<(Field, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"Point" => point = Some((None, None)),
                b"Longitude" => field = Some((Field::Longitude, String::new())),
                b"Latitude" => field = Some((Field::Latitude, String::new())),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some((f, buffer)) = field.as_mut() {
                    buffer.push_str(&t.decode().map_err(|e| not_utf8(*f, e))?);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((f, buffer)) = field.as_mut() {
                    buffer.push_str(&c.decode().map_err(|e| not_utf8(*f, e))?);
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some((f, buffer)) = field.as_mut() {
                    resolve_reference(&r, *f, buffer)?;
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"Point" => {
                    let index = coords.len();
                    match point.take() {
                        Some((Some(x), Some(y))) => coords.push(Coord { x, y }),
                        _ => {
                            return Err(OpenLrError::InvalidXml(format!(
                                "Point {index} is missing a {LONGITUDE} or {LATITUDE}"
                            )))
                        }
                    }
                }
                b"Longitude" | b"Latitude" => {
                    if let (Some((f, buffer)), Some((lon, lat))) = (field.take(), point.as_mut()) {
                        let value = parse_value(&buffer, f)?;
                        match f {
                            Field::Longitude => *lon = Some(value),
                            Field::Latitude => *lat = Some(value),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OpenLrError::InvalidXml(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    if coords.is_empty() {
        return Err(OpenLrError::InvalidXml(format!(
            "document has no {POINT} elements"
        )));
    }
    Ok(LineString(coords))
}

/// appends a character reference (`&#45;`) or predefined entity (`&amp;`).
fn resolve_reference(
    reference: &BytesRef,
    field: Field,
    buffer: &mut String,
) -> Result<(), OpenLrError> {
    let invalid = |detail: String| {
        OpenLrError::InvalidXml(format!("{} has an invalid reference: {detail}", field.name()))
    };
    if let Some(ch) = reference.resolve_char_ref().map_err(|e| invalid(e.to_string()))? {
        buffer.push(ch);
        return Ok(());
    }
    let name = reference.decode().map_err(|e| invalid(e.to_string()))?;
    let resolved = resolve_predefined_entity(&name).ok_or_else(|| invalid(format!("&{name};")))?;
    buffer.push_str(resolved);
    Ok(())
}

fn not_utf8(field: Field, error: impl std::fmt::Display) -> OpenLrError {
    OpenLrError::InvalidXml(format!("{} is not valid UTF-8: {error}", field.name()))
}

fn parse_value(text: &str, field: Field) -> Result<f64, OpenLrError> {
    text.trim().parse::<f64>().map_err(|e| {
        OpenLrError::InvalidXml(format!(
            "{} '{}' is not a number: {e}",
            field.name(),
            text.trim()
        ))
    })
}
