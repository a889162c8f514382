use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use weft::cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    match cli::run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
