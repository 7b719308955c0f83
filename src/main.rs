mod cli;

use ascii_generator::config::Config;
use clap::Parser;
use cli::{Args, Command};

/// Load .env file so FAL_API_KEY can live next to the project.
///
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Default log filter for a `-v` count; RUST_LOG takes precedence.
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() {
    // Load .env file before anything else
    load_env();

    let args = Args::parse();

    let env = env_logger::Env::default().default_filter_or(log_level(args.verbose));
    env_logger::Builder::from_env(env).init();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Convert(convert) => match cli::run_convert(&convert, &config) {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Command::Ramps => cli::list_ramps(),
        Command::Config { action } => {
            cli::handle_config_action(action, &config, args.config.as_deref())
        }
    }
}
