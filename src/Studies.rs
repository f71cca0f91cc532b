/// eng
/// Methane combustion studies driven through the reactor models:
/// - a stirred-reactor sweep over residence time, with NO and CO normalised by the
///   adiabatic equilibrium of the feed;
/// - the profile of a plug-flow reactor marched in time, with the time-to-space transform;
/// - autoignition delays over temperature, pressure and equivalence ratio;
/// - autoignition delays for oxidizers of different diluent and radical content.
///
/// Every study is a plain `run(&config)` returning a result struct; printing, CSV export
/// and figures are separate methods of the result.
/// # Examples
/// ```no_run
/// use methane_reactors::Studies::ignition_sweep;
/// use methane_reactors::Studies::study_config::IgnitionStudyConfig;
/// let mut config = IgnitionStudyConfig::default();
/// config.pressures_atm = vec![1.0];
/// let result = ignition_sweep::run(&config).unwrap();
/// result.pretty_print();
/// result.plot(&config).unwrap();
/// ```
pub mod study_config;
/// ignition delay of one constant-pressure reactor
pub mod ignition;
pub mod cstr_residence;
pub mod pfr_profile;
pub mod ignition_sweep;
pub mod oxidizer_study;

use crate::Mechanism::{Mechanism, MechanismError};
use crate::ReactorsIVP::ReactorError;
use crate::Thermodynamics::ThermoError;
use crate::Utils::plots::{LineChart, PlotError, Series, render_line_chart};
use log::{Level, info, log_enabled, warn};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use study_config::{CstrStudyConfig, IgnitionStudyConfig, OxidizerStudyConfig, PfrStudyConfig, StudyConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Mechanism(#[from] MechanismError),
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error(transparent)]
    Reactor(#[from] ReactorError),
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StudyError {
    /// the integrator gave up on one grid point
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, StudyError::Reactor(ReactorError::Solver(_)))
    }
}

/// Solver failures of a single grid point become `None`; every other error is passed on.
pub(crate) fn tolerate_solver_failure<T>(
    result: Result<T, StudyError>,
    context: &str,
) -> Result<Option<T>, StudyError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_solver_failure() => {
            warn!("{}: {}; point skipped", context, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn load_mechanism(path: &str) -> Result<Arc<Mechanism>, StudyError> {
    let mechanism = Mechanism::from_file(path)?;
    info!(
        "mechanism {}: {} species, {} reactions",
        path,
        mechanism.n_species(),
        mechanism.n_reactions()
    );
    if log_enabled!(Level::Debug) {
        mechanism.pretty_print();
    }
    Ok(Arc::new(mechanism))
}

/// Line series from optional values; missing points are left out.
pub(crate) fn series_from_options(label: &str, x: &[f64], y: &[Option<f64>], color: plotters::style::RGBColor) -> Series {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(x, y)| y.map(|y| (*x, y)))
        .unzip();
    if xs.len() < x.len() {
        warn!("{}: {} of {} points missing from the figure", label, x.len() - xs.len(), x.len());
    }
    Series::new(label, xs, ys, color)
}

/// Render a line chart; charts without drawable points are skipped with a warning.
pub(crate) fn save_line_chart(chart: &LineChart, path: &Path) -> Result<(), StudyError> {
    match render_line_chart(chart, path) {
        Ok(()) => Ok(()),
        Err(PlotError::Empty(title)) => {
            warn!("figure '{}' has nothing to draw, {} not written", title, path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:e}", v)).unwrap_or_default()
}

/// Comma-separated table with a header row; cells holding commas or quotes are quoted
pub(crate) fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<(), StudyError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut out = csv::Writer::from_path(path)?;
    out.write_record(header)?;
    for row in rows {
        out.write_record(row)?;
    }
    out.flush()?;
    info!("{} rows written to {}", rows.len(), path.display());
    Ok(())
}

/// The studies the binary can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyKind {
    Cstr,
    Pfr,
    Ignition,
    Oxidizer,
}

impl StudyKind {
    pub const ALL: [StudyKind; 4] = [StudyKind::Cstr, StudyKind::Pfr, StudyKind::Ignition, StudyKind::Oxidizer];

    pub fn description(&self) -> &'static str {
        match self {
            StudyKind::Cstr => "stirred reactor: NO and CO against residence time",
            StudyKind::Pfr => "plug-flow reactor: temperature and species profiles",
            StudyKind::Ignition => "autoignition delay over temperature, pressure and equivalence ratio",
            StudyKind::Oxidizer => "autoignition delay for different oxidizers",
        }
    }
}

impl fmt::Display for StudyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StudyKind::Cstr => "cstr",
            StudyKind::Pfr => "pfr",
            StudyKind::Ignition => "ignition",
            StudyKind::Oxidizer => "oxidizer",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for StudyKind {
    type Err = StudyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cstr" => Ok(StudyKind::Cstr),
            "pfr" => Ok(StudyKind::Pfr),
            "ignition" => Ok(StudyKind::Ignition),
            "oxidizer" | "oxidiser" => Ok(StudyKind::Oxidizer),
            other => Err(StudyError::InvalidConfig(format!(
                "unknown study '{}', expected cstr, pfr, ignition or oxidizer",
                other
            ))),
        }
    }
}

fn load_or_default<C: StudyConfig>(config: Option<&Path>) -> Result<C, StudyError> {
    match config {
        Some(path) => C::from_file(path),
        None => {
            let config = C::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Run one study end to end: simulation, console summary, CSV table and figures.
pub fn run_study(kind: StudyKind, config: Option<&Path>) -> Result<(), StudyError> {
    info!("running the {} study", kind);
    match kind {
        StudyKind::Cstr => {
            let config: CstrStudyConfig = load_or_default(config)?;
            let result = cstr_residence::run(&config)?;
            result.pretty_print();
            result.write_csv(&config.run.output_dir.join("cstr_residence.csv"))?;
            result.plot(&config)?;
        }
        StudyKind::Pfr => {
            let config: PfrStudyConfig = load_or_default(config)?;
            let result = pfr_profile::run(&config)?;
            result.pretty_print();
            result.states.write_csv(config.run.output_dir.join("pfr_profile.csv"))?;
            result.plot(&config)?;
        }
        StudyKind::Ignition => {
            let config: IgnitionStudyConfig = load_or_default(config)?;
            let result = ignition_sweep::run(&config)?;
            result.pretty_print();
            result.write_csv(&config.run.output_dir.join("ignition_sweep.csv"))?;
            result.plot(&config)?;
        }
        StudyKind::Oxidizer => {
            let config: OxidizerStudyConfig = load_or_default(config)?;
            let result = oxidizer_study::run(&config)?;
            result.pretty_print();
            result.write_csv(&config.run.output_dir.join("oxidizer_study.csv"))?;
            result.plot(&config)?;
        }
    }
    info!("{} study finished", kind);
    Ok(())
}

/// Write the default configuration of a study as JSON.
pub fn write_default_config(kind: StudyKind, path: &Path) -> Result<(), StudyError> {
    match kind {
        StudyKind::Cstr => CstrStudyConfig::default().to_file(path),
        StudyKind::Pfr => PfrStudyConfig::default().to_file(path),
        StudyKind::Ignition => IgnitionStudyConfig::default().to_file(path),
        StudyKind::Oxidizer => OxidizerStudyConfig::default().to_file(path),
    }
}

/// Log level requested by a config file; `info` when there is no file or no entry.
pub fn configured_log_level(config: Option<&Path>) -> String {
    config
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|value| value["run"]["log_level"].as_str().map(str::to_owned))
        .unwrap_or_else(|| "info".to_owned())
}
