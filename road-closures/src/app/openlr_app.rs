use super::{read_closures, write_closures, CliError, GeometryArgs, OpenLrResponse, ValidationResponse};
use clap::{Parser, Subcommand, ValueEnum};
use geo::{Geometry, LineString};
use road_closures_openlr::{
    config::OpenLrConfig,
    coordinator::{ReferenceCoordinator, RegenerationOptions},
    model::{geometry_ops, EncodedReference, Format, MemoryClosureStore},
    roundtrip,
};
use road_closures_osm::overpass::OverpassWayProvider;
use serde_json::{json, Value};
use std::{
    path::Path,
    sync::{atomic::AtomicBool, Arc},
};

/// command line tool for encoding, decoding and maintaining OpenLR location
/// references on road closures
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct OpenLrApp {
    /// TOML or JSON file with OpenLR settings. OPENLR_* environment variables
    /// take precedence over it.
    #[arg(long, global = true)]
    pub config_file: Option<String>,
    #[command(subcommand)]
    pub op: OpenLrOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodeOutput {
    Geojson,
    Wkt,
}

#[derive(Debug, Clone, Subcommand)]
pub enum OpenLrOperation {
    /// print the OpenLR configuration
    Info,
    /// encode a LineString into a location reference
    Encode {
        #[command(flatten)]
        geometry: GeometryArgs,
        /// overrides the configured format
        #[arg(long)]
        format: Option<Format>,
        /// decode the new reference and report its accuracy
        #[arg(long)]
        validate_roundtrip: bool,
    },
    /// decode a base64, hex or XML location reference
    Decode {
        code: String,
        #[arg(long, value_enum, default_value_t = DecodeOutput::Geojson)]
        output: DecodeOutput,
    },
    /// check that a reference decodes, optionally scoring it against the
    /// geometry it was encoded from
    Validate {
        code: String,
        /// GeoJSON geometry the reference should represent
        #[arg(long)]
        geometry: Option<String>,
        /// accuracy tolerance in meters, defaults to the configured tolerance
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// encode, decode and score a geometry
    Roundtrip {
        #[command(flatten)]
        geometry: GeometryArgs,
        #[arg(long)]
        format: Option<Format>,
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// fetch an OpenStreetMap way and encode it
    EncodeWay {
        way_id: i64,
        #[arg(long)]
        start_node: Option<i64>,
        #[arg(long)]
        end_node: Option<i64>,
    },
    /// regenerate references for a JSON file of closures
    Regenerate {
        /// JSON array of closures with `id`, `geometry` and `openlr_code`
        #[arg(long)]
        input: String,
        /// where the updated closures are written
        #[arg(long)]
        output: String,
        /// re-encode closures that already have a reference
        #[arg(long)]
        force: bool,
        /// overrides the configured regeneration chunk size
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// count the closures in a JSON file that carry a reference
    Statistics {
        #[arg(long)]
        input: String,
    },
}

impl OpenLrApp {
    /// runs the selected operation, returning its JSON response.
    pub fn run(&self) -> Result<String, CliError> {
        let config = load_config(self.config_file.as_ref())?;
        let provider = OverpassWayProvider::from_config(&config)?;
        let coordinator = ReferenceCoordinator::new(config).with_way_provider(Arc::new(provider));
        let response = self.op.run(&coordinator)?;
        Ok(serde_json::to_string_pretty(&response)?)
    }
}

/// default configuration, or the given file, with environment overrides applied.
pub fn load_config(config_file: Option<&String>) -> Result<OpenLrConfig, CliError> {
    let conf = match config_file {
        None => OpenLrConfig::default(),
        Some(f) => {
            log::info!("reading OpenLR configuration from {f}");
            OpenLrConfig::try_from(f)?
        }
    };
    Ok(conf.with_env_overrides()?)
}

impl OpenLrOperation {
    pub fn run(&self, coordinator: &ReferenceCoordinator) -> Result<Value, CliError> {
        let config = coordinator.config();
        match self {
            OpenLrOperation::Info => Ok(serde_json::to_value(coordinator.info())?),
            OpenLrOperation::Encode {
                geometry,
                format,
                validate_roundtrip,
            } => {
                let geometry = geometry.to_geometry()?;
                let format = format.unwrap_or(config.format);
                if *validate_roundtrip {
                    require_enabled(config, "OpenLR encoding")?;
                    let report = roundtrip::test_roundtrip_as(
                        coordinator.codec(),
                        format,
                        &geometry,
                        config.accuracy_tolerance,
                    );
                    let response = OpenLrResponse {
                        success: report.success,
                        openlr_code: report.reference.clone(),
                        geometry: report
                            .decoded_geometry
                            .as_ref()
                            .map(|g| geojson_value(g, config.coordinate_precision))
                            .transpose()?,
                        accuracy_meters: finite(report.accuracy_meters),
                        valid: Some(report.valid),
                        error: report.error.clone(),
                        warning: short_segment_warning(coordinator, &geometry),
                        metadata: Some(json!({
                            "original_geometry": geojson_value(&geometry, config.coordinate_precision)?,
                            "tolerance_meters": report.tolerance_meters,
                            "format": format,
                        })),
                    };
                    return Ok(serde_json::to_value(response)?);
                }
                let code = coordinator
                    .encode_as(&geometry, format)?
                    .ok_or_else(|| CliError::Disabled(String::from("OpenLR encoding")))?;
                let response = OpenLrResponse {
                    success: true,
                    openlr_code: Some(code),
                    warning: short_segment_warning(coordinator, &geometry),
                    metadata: Some(json!({ "format": format })),
                    ..Default::default()
                };
                Ok(serde_json::to_value(response)?)
            }
            OpenLrOperation::Decode { code, output } => {
                let linestring = coordinator
                    .decode(code)?
                    .ok_or_else(|| CliError::Disabled(String::from("OpenLR decoding")))?;
                let response = OpenLrResponse {
                    success: true,
                    geometry: Some(render(&linestring, *output, config.coordinate_precision)?),
                    metadata: Some(json!({
                        "openlr_code": code,
                        "point_count": linestring.0.len(),
                    })),
                    ..Default::default()
                };
                Ok(serde_json::to_value(response)?)
            }
            OpenLrOperation::Validate {
                code,
                geometry,
                tolerance,
            } => {
                require_enabled(config, "OpenLR validation")?;
                let tolerance_meters = tolerance.unwrap_or(config.accuracy_tolerance);
                let response = match geometry {
                    Some(geojson) => {
                        let stored_geometry = geometry_ops::geometry_from_geojson_str(geojson)?;
                        let report = coordinator.validate(
                            &stored_geometry,
                            &EncodedReference::from(code.as_str()),
                            tolerance_meters,
                        );
                        ValidationResponse {
                            valid: report.valid,
                            accuracy_meters: finite(report.accuracy_meters),
                            tolerance_meters,
                            decoded_geometry: report
                                .decoded_geometry
                                .as_ref()
                                .map(|g| geojson_value(g, config.coordinate_precision))
                                .transpose()?,
                            openlr_code: code.clone(),
                            error: report.error,
                        }
                    }
                    None => {
                        let (decoded_geometry, error) = match coordinator.codec().decode(code) {
                            Ok(ls) => (
                                Some(render(&ls, DecodeOutput::Geojson, config.coordinate_precision)?),
                                None,
                            ),
                            Err(e) => (None, Some(format!("Decoding failed: {e}"))),
                        };
                        ValidationResponse {
                            valid: error.is_none(),
                            accuracy_meters: None,
                            tolerance_meters,
                            decoded_geometry,
                            openlr_code: code.clone(),
                            error,
                        }
                    }
                };
                Ok(serde_json::to_value(response)?)
            }
            OpenLrOperation::Roundtrip {
                geometry,
                format,
                tolerance,
            } => {
                let geometry = geometry.to_geometry()?;
                let report = roundtrip::test_roundtrip_as(
                    coordinator.codec(),
                    format.unwrap_or(config.format),
                    &geometry,
                    tolerance.unwrap_or(config.accuracy_tolerance),
                );
                Ok(serde_json::to_value(report)?)
            }
            OpenLrOperation::EncodeWay {
                way_id,
                start_node,
                end_node,
            } => {
                let encoded = coordinator
                    .encode_way(*way_id, *start_node, *end_node)?
                    .ok_or_else(|| CliError::Disabled(String::from("OpenLR encoding")))?;
                let response = OpenLrResponse {
                    success: true,
                    openlr_code: Some(encoded.reference),
                    geometry: Some(render(
                        &encoded.geometry,
                        DecodeOutput::Geojson,
                        config.coordinate_precision,
                    )?),
                    metadata: Some(json!({
                        "way_id": way_id,
                        "start_node": start_node,
                        "end_node": end_node,
                        "source": "OpenStreetMap",
                    })),
                    ..Default::default()
                };
                Ok(serde_json::to_value(response)?)
            }
            OpenLrOperation::Regenerate {
                input,
                output,
                force,
                chunk_size,
            } => {
                let closures = read_closures(Path::new(input))?;
                let mut store = MemoryClosureStore::new(closures.clone());
                let options = RegenerationOptions {
                    force: *force,
                    chunk_size: chunk_size.unwrap_or(config.regeneration_chunk_size),
                    show_progress: true,
                };
                let report = coordinator.regenerate_batch_with(
                    &closures,
                    &options,
                    &mut store,
                    &AtomicBool::new(false),
                );
                write_closures(Path::new(output), &store.records())?;
                log::info!("wrote {} closures to {output}", closures.len());
                Ok(serde_json::to_value(report)?)
            }
            OpenLrOperation::Statistics { input } => {
                let closures = read_closures(Path::new(input))?;
                let stats = coordinator.statistics(&closures);
                let mut value = serde_json::to_value(stats)?;
                value["enabled"] = json!(config.enabled);
                value["format"] = json!(config.enabled.then_some(config.format));
                Ok(value)
            }
        }
    }
}

fn require_enabled(config: &OpenLrConfig, operation: &str) -> Result<(), CliError> {
    if config.enabled {
        Ok(())
    } else {
        Err(CliError::Disabled(operation.to_string()))
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn geojson_value(geometry: &Geometry<f64>, precision: u32) -> Result<Value, CliError> {
    Ok(serde_json::to_value(geometry_ops::geometry_to_geojson(geometry, precision))?)
}

fn render(linestring: &LineString<f64>, output: DecodeOutput, precision: u32) -> Result<Value, CliError> {
    match output {
        DecodeOutput::Geojson => Ok(serde_json::to_value(geometry_ops::linestring_to_geojson(
            linestring, precision,
        ))?),
        DecodeOutput::Wkt => Ok(Value::String(geometry_ops::linestring_to_wkt(linestring, precision))),
    }
}

/// data quality warnings for consecutive points that are too close together.
fn short_segment_warning(coordinator: &ReferenceCoordinator, geometry: &Geometry<f64>) -> Option<String> {
    let Geometry::LineString(linestring) = geometry else {
        return None;
    };
    let warnings: Vec<String> = coordinator
        .codec()
        .validator()
        .short_segments(linestring)
        .iter()
        .map(|s| s.to_string())
        .collect();
    (!warnings.is_empty()).then(|| warnings.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_closures_openlr::{error::OpenLrError, model::ClosureRecord};

    const CHICAGO: &str = r#"{"type":"LineString","coordinates":[[-87.6298,41.8781],[-87.629,41.8785]]}"#;

    fn parse(args: &[&str]) -> OpenLrOperation {
        let mut argv = vec!["road-closures"];
        argv.extend_from_slice(args);
        match OpenLrApp::try_parse_from(argv) {
            Ok(app) => app.op,
            Err(e) => panic!("failed to parse {args:?}: {e}"),
        }
    }

    fn coordinator() -> ReferenceCoordinator {
        ReferenceCoordinator::new(OpenLrConfig::default())
    }

    #[test]
    fn test_parse_arguments() {
        match parse(&["encode", "--coordinates", "-87.6298,41.8781,-87.629,41.8785", "--format", "hex"]) {
            OpenLrOperation::Encode {
                format: Some(Format::Hex),
                validate_roundtrip: false,
                ..
            } => {}
            other => panic!("unexpected {other:?}"),
        }
        match parse(&["decode", "QgA=", "--output", "wkt"]) {
            OpenLrOperation::Decode { code, output: DecodeOutput::Wkt } => assert_eq!(code, "QgA="),
            other => panic!("unexpected {other:?}"),
        }
        match parse(&["encode-way", "123", "--start-node", "1", "--end-node", "2"]) {
            OpenLrOperation::EncodeWay {
                way_id: 123,
                start_node: Some(1),
                end_node: Some(2),
            } => {}
            other => panic!("unexpected {other:?}"),
        }
        assert!(OpenLrApp::try_parse_from(["road-closures", "encode"]).is_err());
        assert!(OpenLrApp::try_parse_from([
            "road-closures",
            "encode",
            "--geometry",
            CHICAGO,
            "--coordinates",
            "0,0,1,1"
        ])
        .is_err());
    }

    #[test]
    fn test_encode_then_decode() {
        let coordinator = coordinator();
        let encoded = parse(&["encode", "--geometry", CHICAGO, "--validate-roundtrip"])
            .run(&coordinator)
            .unwrap();
        assert_eq!(encoded["success"], json!(true));
        assert_eq!(encoded["valid"], json!(true));
        assert!(encoded["accuracy_meters"].as_f64().unwrap() < 1.0);
        let code = encoded["openlr_code"].as_str().unwrap().to_string();

        let decoded = parse(&["decode", code.as_str()]).run(&coordinator).unwrap();
        assert_eq!(decoded["geometry"]["type"], json!("LineString"));
        assert_eq!(decoded["geometry"]["coordinates"][0], json!([-87.6298, 41.8781]));
        assert_eq!(decoded["metadata"]["point_count"], json!(2));

        let wkt = parse(&["decode", code.as_str(), "--output", "wkt"]).run(&coordinator).unwrap();
        assert!(wkt["geometry"].as_str().unwrap().starts_with("LINESTRING"));
    }

    #[test]
    fn test_decode_failure_is_an_error() {
        match parse(&["decode", "not-valid!!"]).run(&coordinator()) {
            Err(CliError::OpenLr {
                source: OpenLrError::UnknownFormat,
            }) => {}
            other => panic!("expected unknown format, found {other:?}"),
        }
    }

    #[test]
    fn test_validate() {
        let coordinator = coordinator();
        let invalid = parse(&["validate", "not-valid!!"]).run(&coordinator).unwrap();
        assert_eq!(invalid["valid"], json!(false));
        assert_eq!(invalid["tolerance_meters"], json!(50.0));

        let code = coordinator
            .encode(&geometry_ops::geometry_from_geojson_str(CHICAGO).unwrap())
            .unwrap()
            .unwrap();
        let scored = parse(&["validate", code.as_str(), "--geometry", CHICAGO, "--tolerance", "1.0"])
            .run(&coordinator)
            .unwrap();
        assert_eq!(scored["valid"], json!(true));
        assert_eq!(scored["tolerance_meters"], json!(1.0));
    }

    #[test]
    fn test_roundtrip_failure_reported() {
        let report = parse(&["roundtrip", "--geometry", r#"{"type":"Point","coordinates":[1.0,2.0]}"#])
            .run(&coordinator())
            .unwrap();
        assert_eq!(report["success"], json!(false));
        assert_eq!(report["valid"], json!(false));
        assert!(report["error"].as_str().unwrap().contains("Point"));
    }

    #[test]
    fn test_disabled() {
        let coordinator = ReferenceCoordinator::new(OpenLrConfig {
            enabled: false,
            ..Default::default()
        });
        match parse(&["encode", "--geometry", CHICAGO]).run(&coordinator) {
            Err(CliError::Disabled(_)) => {}
            other => panic!("expected disabled, found {other:?}"),
        }
        let info = OpenLrOperation::Info.run(&coordinator).unwrap();
        assert_eq!(info["enabled"], json!(false));
        assert_eq!(info["format"], Value::Null);
    }

    #[test]
    fn test_encode_way_without_provider() {
        match parse(&["encode-way", "1"]).run(&coordinator()) {
            Err(CliError::OpenLr {
                source: OpenLrError::ProviderNotConfigured,
            }) => {}
            other => panic!("expected missing provider, found {other:?}"),
        }
    }

    #[test]
    fn test_regenerate_and_statistics() {
        let dir = std::env::temp_dir();
        let input = dir.join("road_closures_regenerate_in.json");
        let output = dir.join("road_closures_regenerate_out.json");
        let closures = vec![
            ClosureRecord::new(1, Some(geometry_ops::geometry_from_geojson_str(CHICAGO).unwrap())),
            ClosureRecord::new(2, None),
        ];
        write_closures(&input, &closures).unwrap();
        let input_arg = input.to_string_lossy().to_string();
        let output_arg = output.to_string_lossy().to_string();

        let report = parse(&[
            "regenerate",
            "--input",
            input_arg.as_str(),
            "--output",
            output_arg.as_str(),
            "--force",
        ])
            .run(&coordinator())
            .unwrap();
        assert_eq!(report["total_processed"], json!(2));
        assert_eq!(report["successful"], json!(1));
        assert_eq!(report["failed"], json!(1));

        let stats = parse(&["statistics", "--input", output_arg.as_str()]).run(&coordinator()).unwrap();
        assert_eq!(stats["total_closures"], json!(2));
        assert_eq!(stats["total_encoded"], json!(1));
        assert_eq!(stats["encoding_success_rate"], json!(50.0));
        assert_eq!(stats["format"], json!("base64"));

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
    }
}
