mod geometry_validator;

pub use geometry_validator::{coordinate_in_range, GeometryValidator, ShortSegment};
