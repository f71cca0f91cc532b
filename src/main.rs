use log::error;
use methane_reactors::Studies::configured_log_level;
use methane_reactors::Utils::logger::{LOG_FILE, init_logging};
use methane_reactors::cli::cli_main::{Command, USAGE, execute, parse_args};
use std::path::Path;

pub fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    let level = match &command {
        Command::Run { config, .. } => configured_log_level(config.as_deref().map(Path::new)),
        _ => "info".to_owned(),
    };
    if let Err(e) = init_logging(&level, LOG_FILE) {
        eprintln!("{}", e);
    }
    if let Err(e) = execute(command) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
