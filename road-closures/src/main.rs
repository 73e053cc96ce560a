use clap::Parser;
use road_closures::app::{error_response, OpenLrApp};

fn main() {
    env_logger::init();
    let args = OpenLrApp::parse();
    match args.run() {
        Ok(response) => println!("{response}"),
        Err(e) => {
            log::error!("road-closures failed: {e}");
            println!("{}", error_response(&e));
            std::process::exit(1);
        }
    }
}
