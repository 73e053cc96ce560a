use thiserror::Error;

/// failures validating a geometry before it can be referenced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeospatialError {
    #[error("only LineString geometries are supported, found {0}")]
    UnsupportedGeometryType(String),
    #[error("LineString must have at least 2 coordinates, found {0}")]
    InsufficientCoordinates(usize),
    #[error("invalid coordinates: [{lon}, {lat}]")]
    CoordinateOutOfRange { lon: f64, lat: f64 },
    #[error("invalid GeoJSON geometry: {0}")]
    InvalidGeoJson(String),
    #[error("invalid coordinate list: {0}")]
    InvalidCoordinateList(String),
}

/// failures encoding, decoding or sourcing an OpenLR location reference.
#[derive(Error, Debug)]
pub enum OpenLrError {
    #[error("geometry cannot be encoded: {source}")]
    Geospatial {
        #[from]
        source: GeospatialError,
    },
    #[error("LineString has {0} points but the point count must fit in a single byte (max 255)")]
    Overflow(usize),
    #[error("invalid encoding format: {0}")]
    InvalidFormat(String),
    #[error("invalid data length: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("unknown OpenLR format")]
    UnknownFormat,
    #[error("invalid XML format: {0}")]
    InvalidXml(String),
    #[error("{service} service error: {message}")]
    ExternalService { service: String, message: String },
    #[error("OSM way {0} not found")]
    WayNotFound(i64),
    #[error("insufficient coordinates for way {way_id}: found {count}")]
    InsufficientWayCoordinates { way_id: i64, count: usize },
    #[error("no way geometry provider is configured")]
    ProviderNotConfigured,
    #[error("failure committing closure references: {source}")]
    Store {
        #[from]
        source: ClosureStoreError,
    },
    #[error("{0}")]
    InternalError(String),
}

impl OpenLrError {
    pub fn external_service(service: &str, message: impl ToString) -> OpenLrError {
        OpenLrError::ExternalService {
            service: service.to_string(),
            message: message.to_string(),
        }
    }
}

/// failures from the persistence layer that stores closure references.
#[derive(Error, Debug, Clone)]
pub enum ClosureStoreError {
    #[error("closure {0} not found")]
    ClosureNotFound(i64),
    #[error("commit failed: {0}")]
    CommitFailed(String),
}
