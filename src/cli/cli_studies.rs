use super::cli_main::get_user_input;
use crate::Studies::{StudyKind, run_study, write_default_config};
use std::io::{self, Write};
use std::path::Path;

fn prompt(text: &str) -> Result<String, String> {
    print!("{}", text);
    io::stdout().flush().map_err(|e| e.to_string())?;
    get_user_input()
        .map(|s| s.trim().to_owned())
        .map_err(|e| format!("cannot read input: {}", e))
}

fn choose_study() -> Result<Option<StudyKind>, String> {
    println!("\nAvailable studies:");
    for (i, study) in StudyKind::ALL.iter().enumerate() {
        println!("{}. {:<9} {}", i + 1, study.to_string(), study.description());
    }
    println!("0. Back");
    let choice = prompt("Enter choice: ")?;
    if choice == "0" || choice.is_empty() {
        return Ok(None);
    }
    let index: usize = choice.parse().map_err(|_| "Invalid study choice".to_string())?;
    StudyKind::ALL
        .get(index.wrapping_sub(1))
        .copied()
        .map(Some)
        .ok_or_else(|| "Invalid study choice".to_string())
}

pub fn studies_menu() {
    loop {
        println!("\n=== Methane Combustion Studies ===");
        let study = match choose_study() {
            Ok(Some(study)) => study,
            Ok(None) => break,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        let config = match prompt("Config file (empty for defaults): ") {
            Ok(path) => path,
            Err(e) => {
                println!("Error: {}", e);
                break;
            }
        };
        let config = (!config.is_empty()).then_some(config);
        println!("Running the {} study...", study);
        match run_study(study, config.as_deref().map(Path::new)) {
            Ok(()) => println!("Done."),
            Err(e) => println!("Error: {}", e),
        }
    }
}

pub fn write_config_menu() {
    let result = choose_study().and_then(|study| match study {
        Some(study) => {
            let path = prompt("Write to (e.g. configs/cstr.json): ")?;
            if path.is_empty() {
                return Err("no path given".to_string());
            }
            write_default_config(study, Path::new(&path)).map_err(|e| e.to_string())?;
            println!("Default {} configuration written to {}", study, path);
            Ok(())
        }
        None => Ok(()),
    });
    if let Err(e) = result {
        println!("Error: {}", e);
    }
}
