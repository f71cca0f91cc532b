use super::cli_studies::{studies_menu, write_config_menu};
use crate::Studies::{StudyError, StudyKind, run_study, write_default_config};
use log::error;
use std::io::{self, Write};
use std::path::Path;

/// What the command line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Interactive,
    Run { studies: Vec<StudyKind>, config: Option<String> },
    WriteDefaultConfig { study: StudyKind, path: String },
    Help,
}

pub const USAGE: &str = "usage:
  methane_reactors                                   interactive menu
  methane_reactors <cstr|pfr|ignition|oxidizer|all> [config.json]
  methane_reactors --write-default-config <study> <path>
  methane_reactors --help";

/// Parse the arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<Command, StudyError> {
    let args: Vec<&str> = args.iter().map(|a| a.as_str()).collect();
    match args.as_slice() {
        [] => Ok(Command::Interactive),
        ["--help"] | ["-h"] => Ok(Command::Help),
        ["--write-default-config", study, path] => Ok(Command::WriteDefaultConfig {
            study: study.parse()?,
            path: (*path).to_owned(),
        }),
        ["--write-default-config", ..] => Err(StudyError::InvalidConfig(
            "--write-default-config needs a study and a path".to_owned(),
        )),
        ["all"] => Ok(Command::Run {
            studies: StudyKind::ALL.to_vec(),
            config: None,
        }),
        ["all", _] => Err(StudyError::InvalidConfig(
            "a config file applies to a single study, not to 'all'".to_owned(),
        )),
        [study] => Ok(Command::Run {
            studies: vec![study.parse()?],
            config: None,
        }),
        [study, config] => Ok(Command::Run {
            studies: vec![study.parse()?],
            config: Some((*config).to_owned()),
        }),
        _ => Err(StudyError::InvalidConfig(format!("too many arguments\n{}", USAGE))),
    }
}

pub fn execute(command: Command) -> Result<(), StudyError> {
    match command {
        Command::Interactive => {
            run_interactive_menu();
            Ok(())
        }
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::WriteDefaultConfig { study, path } => write_default_config(study, Path::new(&path)),
        Command::Run { studies, config } => {
            for study in studies {
                run_study(study, config.as_deref().map(Path::new))?;
            }
            Ok(())
        }
    }
}

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = match get_user_input() {
            Ok(choice) => choice,
            Err(e) => {
                error!("cannot read from stdin: {}", e);
                break;
            }
        };

        match choice.trim() {
            "1" => studies_menu(),
            "2" => {
                for study in StudyKind::ALL {
                    if let Err(e) = run_study(study, None) {
                        println!("Error in the {} study: {}", study, e);
                    }
                }
            }
            "3" => write_config_menu(),
            "0" | "" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - header
Yellow (\x1b[33m) - menu options
Cyan (\x1b[36m) - prompt
Reset (\x1b[0m)
*/
fn show_main_menu() {
    println!("\x1b[34m\n Methane combustion studies: stirred and plug-flow reactors, autoignition\n \x1b[0m");
    println!("\x1b[33m1. Run a study\x1b[0m");
    println!("\x1b[33m2. Run all studies with default settings\x1b[0m");
    println!("\x1b[33m3. Write a default config file\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}

/// One line from stdin; an empty string at end of input.
pub(crate) fn get_user_input() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_line() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Interactive);
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
        assert_eq!(
            parse_args(&args(&["pfr"])).unwrap(),
            Command::Run {
                studies: vec![StudyKind::Pfr],
                config: None
            }
        );
        assert_eq!(
            parse_args(&args(&["ignition", "configs/ignition.json"])).unwrap(),
            Command::Run {
                studies: vec![StudyKind::Ignition],
                config: Some("configs/ignition.json".to_owned())
            }
        );
        match parse_args(&args(&["all"])).unwrap() {
            Command::Run { studies, config } => {
                assert_eq!(studies.len(), 4);
                assert!(config.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            parse_args(&args(&["--write-default-config", "cstr", "cstr.json"])).unwrap(),
            Command::WriteDefaultConfig {
                study: StudyKind::Cstr,
                path: "cstr.json".to_owned()
            }
        );
        assert!(parse_args(&args(&["--write-default-config", "cstr"])).is_err());
        assert!(parse_args(&args(&["all", "x.json"])).is_err());
        assert!(parse_args(&args(&["flame"])).is_err());
        assert!(parse_args(&args(&["cstr", "a.json", "b.json"])).is_err());
    }

    #[test]
    fn default_config_command_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oxidizer.json");
        let command = Command::WriteDefaultConfig {
            study: StudyKind::Oxidizer,
            path: path.to_string_lossy().into_owned(),
        };
        execute(command).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("OH radicals"));
    }
}
