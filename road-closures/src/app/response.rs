use super::CliError;
use road_closures_openlr::model::EncodedReference;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// result of an encode, decode or way encoding operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenLrResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openlr_code: Option<EncodedReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// result of checking a reference string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub accuracy_meters: Option<f64>,
    pub tolerance_meters: f64,
    pub decoded_geometry: Option<Value>,
    pub openlr_code: String,
    pub error: Option<String>,
}

/// `{"success": false, "error": ...}` for a failed command.
pub fn error_response(error: &CliError) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_closures_openlr::error::OpenLrError;

    #[test]
    fn test_error_response() {
        let error = CliError::from(OpenLrError::UnknownFormat);
        let response = error_response(&error);
        assert_eq!(response["success"], json!(false));
        assert_eq!(response["error"], json!("unknown OpenLR format"));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let response = OpenLrResponse {
            success: true,
            openlr_code: Some(EncodedReference::from("QgA=")),
            ..Default::default()
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"success": true, "openlr_code": "QgA="}));
    }
}
