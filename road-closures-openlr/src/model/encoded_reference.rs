use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// an opaque OpenLR location reference as stored on a closure record.
/// the format is not tagged, it is inferred when the reference is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedReference(pub String);

impl EncodedReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EncodedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EncodedReference {
    fn from(value: String) -> Self {
        EncodedReference(value)
    }
}

impl From<&str> for EncodedReference {
    fn from(value: &str) -> Self {
        EncodedReference(value.to_string())
    }
}

impl AsRef<str> for EncodedReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
