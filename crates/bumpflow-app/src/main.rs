//! bumpflow command-line entry point.

fn main() {
    env_logger::init();
    log::info!("Starting bumpflow");

    if let Err(err) = bumpflow_app::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
