/// argument parsing and the main interactive menu
pub mod cli_main;
/// interactive study selection, config files and default configs
pub mod cli_studies;
