use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// textual representations of an encoded location reference.
///
/// `Binary` is the raw payload. references are stored in a text column, so
/// its textual rendering is lowercase hex, matching references already
/// persisted under that name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Binary,
    #[default]
    Base64,
    Hex,
    Xml,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Binary, Format::Base64, Format::Hex, Format::Xml];

    pub fn name(&self) -> &'static str {
        match self {
            Format::Binary => "binary",
            Format::Base64 => "base64",
            Format::Hex => "hex",
            Format::Xml => "xml",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binary" => Ok(Format::Binary),
            "base64" => Ok(Format::Base64),
            "hex" => Ok(Format::Hex),
            "xml" => Ok(Format::Xml),
            other => Err(format!(
                "unknown OpenLR format '{other}', expected one of: {}",
                Format::ALL.iter().map(Format::name).collect::<Vec<_>>().join(", ")
            )),
        }
    }
}
