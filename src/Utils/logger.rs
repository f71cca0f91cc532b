use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

pub const LOG_FILE: &str = "methane_reactors.log";

/// `"info"`, `"debug"`, ...; unknown names fall back to `Info`
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Terminal logger at `level` plus a debug-level log file. Calling it twice is harmless:
/// the second call reports that a logger is already installed.
pub fn init_logging(level: &str, log_file: impl AsRef<Path>) -> Result<(), String> {
    let file = File::create(log_file.as_ref())
        .map_err(|e| format!("cannot create log file {}: {}", log_file.as_ref().display(), e))?;
    CombinedLogger::init(vec![
        TermLogger::new(parse_level(level), Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, Config::default(), file),
    ])
    .map_err(|e| format!("logger already initialised: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }
}
