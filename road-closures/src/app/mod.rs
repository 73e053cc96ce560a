mod cli_error;
mod closure_io;
mod geometry_args;
mod openlr_app;
mod response;

pub use cli_error::CliError;
pub use closure_io::{read_closures, write_closures};
pub use geometry_args::GeometryArgs;
pub use openlr_app::{load_config, DecodeOutput, OpenLrApp, OpenLrOperation};
pub use response::{error_response, OpenLrResponse, ValidationResponse};
