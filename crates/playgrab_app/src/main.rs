mod app;
mod cli;

use clap::Parser;

use crate::app::Exit;
use crate::cli::Args;

#[tokio::main]
async fn main() {
    // A missing --url is rejected here, before any browser is started.
    let args = Args::parse();
    engine_logging::initialize(args.log_destination(), args.log_level());

    match app::run(args).await {
        Ok(Exit::Completed) => {}
        Ok(Exit::Interrupted) => std::process::exit(130),
        Err(err) => {
            eprintln!("playgrab error: {:#}", err);
            std::process::exit(1);
        }
    }
}
