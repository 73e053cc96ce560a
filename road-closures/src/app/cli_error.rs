use road_closures_openlr::{
    config::ConfigError,
    error::{GeospatialError, OpenLrError},
};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config {
        #[from]
        source: ConfigError,
    },
    #[error(transparent)]
    OpenLr {
        #[from]
        source: OpenLrError,
    },
    #[error(transparent)]
    Geospatial {
        #[from]
        source: GeospatialError,
    },
    #[error("failure reading {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("failure writing {0}: {1}")]
    WriteError(String, std::io::Error),
    #[error("failure decoding closures from {0}: {1}")]
    ClosureDecodeError(String, serde_json::Error),
    #[error("failure serializing response: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("{0} is disabled")]
    Disabled(String),
}
