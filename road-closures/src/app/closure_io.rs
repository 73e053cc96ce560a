use super::CliError;
use road_closures_openlr::model::ClosureRecord;
use std::path::Path;

/// reads a JSON array of closure records with GeoJSON geometries.
pub fn read_closures(path: &Path) -> Result<Vec<ClosureRecord>, CliError> {
    let name = path.to_string_lossy().to_string();
    let contents =
        std::fs::read_to_string(path).map_err(|e| CliError::ReadError(name.clone(), e))?;
    serde_json::from_str(&contents).map_err(|e| CliError::ClosureDecodeError(name, e))
}

pub fn write_closures(path: &Path, closures: &[ClosureRecord]) -> Result<(), CliError> {
    let contents = serde_json::to_string_pretty(closures)?;
    std::fs::write(path, contents)
        .map_err(|e| CliError::WriteError(path.to_string_lossy().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_closures() {
        let path = std::env::temp_dir().join("road_closures_read_closures_test.json");
        let body = r#"[
            {"id": 1, "geometry": {"type": "LineString", "coordinates": [[-87.6298, 41.8781], [-87.629, 41.8785]]}},
            {"id": 2, "geometry": null, "openlr_code": "QgA="},
            {"id": 3}
        ]"#;
        std::fs::write(&path, body).unwrap();
        let closures = read_closures(&path).unwrap();
        assert_eq!(closures.len(), 3);
        assert!(closures[0].geometry.is_some());
        assert!(closures[1].has_reference());
        assert!(closures[2].geometry.is_none());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        match read_closures(Path::new("does/not/exist.json")) {
            Err(CliError::ReadError(name, _)) => assert_eq!(name, "does/not/exist.json"),
            other => panic!("expected read error, found {other:?}"),
        }
    }
}
