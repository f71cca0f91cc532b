//! JSON configurations of the studies. Every field has a default, so a config file only
//! needs the entries that differ from the reference runs.
use super::StudyError;
use crate::ReactorsIVP::reactor_net::IntegratorSettings;
use crate::Thermodynamics::mixture::MixtureRule;
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// skeletal GRI-Mech 3.0 subset with H/O radicals and thermal NO
pub const DEFAULT_MECHANISM: &str = "data/ch4_skeletal.yaml";

/// Settings shared by all studies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Cantera YAML/JSON mechanism file
    pub mechanism: String,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    pub integrator: IntegratorSettings,
    /// figures and CSV tables go here
    pub output_dir: PathBuf,
}

impl RunSettings {
    fn with_output(output_dir: &str) -> Self {
        Self {
            mechanism: DEFAULT_MECHANISM.to_owned(),
            log_level: "info".to_owned(),
            integrator: IntegratorSettings::default(),
            output_dir: PathBuf::from(output_dir),
        }
    }

    pub fn validate(&self) -> Result<(), StudyError> {
        if self.mechanism.trim().is_empty() {
            return Err(StudyError::InvalidConfig("mechanism path is empty".to_owned()));
        }
        self.integrator.validate()?;
        Ok(())
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::with_output("Figures")
    }
}

/// Species drawn in a figure, with a color name (`red`, `blue`, `green`, `orange`, `magenta`...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpecies {
    pub name: String,
    pub color: String,
}

impl PlotSpecies {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_owned(),
            color: color.to_owned(),
        }
    }
}

/// A species tracked by the stirred-reactor sweep and the y range of its figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSpecies {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub y_limits: Option<(f64, f64)>,
}

/// Loading, saving and validation common to the study configs
pub trait StudyConfig: Serialize + DeserializeOwned + Default {
    fn run_settings(&self) -> &RunSettings;

    fn validate(&self) -> Result<(), StudyError>;

    fn from_json_str(text: &str) -> Result<Self, StudyError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, StudyError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        info!("configuration read from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    fn to_file(&self, path: impl AsRef<Path>) -> Result<(), StudyError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("configuration written to {}", path.display());
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), StudyError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StudyError::InvalidConfig(format!("{} must be positive, got {}", name, value)))
    }
}

fn all_positive(name: &str, values: &[f64]) -> Result<(), StudyError> {
    if values.is_empty() {
        return Err(StudyError::InvalidConfig(format!("{} is empty", name)));
    }
    values.iter().try_for_each(|v| positive(name, *v))
}

fn window(name: &str, limits: Option<(f64, f64)>) -> Result<(), StudyError> {
    match limits {
        Some((lo, hi)) if !(lo.is_finite() && hi.is_finite() && lo < hi) => Err(StudyError::InvalidConfig(
            format!("{} must be an increasing pair, got ({}, {})", name, lo, hi),
        )),
        _ => Ok(()),
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                         STIRRED REACTOR RESIDENCE-TIME SWEEP
////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CstrStudyConfig {
    pub run: RunSettings,
    pub phi: f64,
    pub mixture_rule: MixtureRule,
    pub pressure_atm: f64,
    /// K, temperature of the feed
    pub inlet_temperature: f64,
    /// K, initial temperature of the reactor contents (same composition as the feed)
    pub reactor_temperature: f64,
    /// m^3
    pub volume: f64,
    /// s
    pub residence_times: Vec<f64>,
    /// s, integration time of every grid point
    pub horizon: f64,
    pub species: Vec<TrackedSpecies>,
}

impl Default for CstrStudyConfig {
    fn default() -> Self {
        Self {
            run: RunSettings::with_output("Figures/Sim3"),
            phi: 0.85,
            mixture_rule: MixtureRule::default(),
            pressure_atm: 1.0,
            inlet_temperature: 650.0,
            reactor_temperature: 2000.0,
            volume: 1000.0 * 1.0e-6,
            residence_times: (0..500).map(|x| (x as f64 + 0.01) / 40.0).collect(),
            horizon: 2500.0,
            species: vec![
                TrackedSpecies {
                    name: "NO".to_owned(),
                    color: "red".to_owned(),
                    y_limits: Some((0.0, 1.0)),
                },
                TrackedSpecies {
                    name: "CO".to_owned(),
                    color: "blue".to_owned(),
                    y_limits: None,
                },
            ],
        }
    }
}

impl StudyConfig for CstrStudyConfig {
    fn run_settings(&self) -> &RunSettings {
        &self.run
    }

    fn validate(&self) -> Result<(), StudyError> {
        self.run.validate()?;
        positive("phi", self.phi)?;
        positive("pressure_atm", self.pressure_atm)?;
        positive("inlet_temperature", self.inlet_temperature)?;
        positive("reactor_temperature", self.reactor_temperature)?;
        positive("volume", self.volume)?;
        positive("horizon", self.horizon)?;
        all_positive("residence_times", &self.residence_times)?;
        if self.species.is_empty() {
            return Err(StudyError::InvalidConfig("no species to track".to_owned()));
        }
        for s in &self.species {
            window(&format!("y_limits of {}", s.name), s.y_limits)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                PLUG-FLOW PROFILE
////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PfrStudyConfig {
    pub run: RunSettings,
    /// K, inlet temperature
    pub temperature: f64,
    pub pressure_atm: f64,
    pub phi: f64,
    pub mixture_rule: MixtureRule,
    /// m/s
    pub inlet_velocity: f64,
    /// m^2
    pub area: f64,
    /// s, total residence time
    pub t_total: f64,
    /// number of output steps of length t_total / n_steps
    pub n_steps: usize,
    /// s, time window of the zoomed temperature, major and log-minor figures
    pub zoom: (f64, f64),
    /// s, time window of the zoomed linear minor-species figure
    pub minor_zoom: (f64, f64),
    pub major_species: Vec<PlotSpecies>,
    pub minor_species: Vec<PlotSpecies>,
}

impl Default for PfrStudyConfig {
    fn default() -> Self {
        Self {
            run: RunSettings::with_output("Figures/Sim1"),
            temperature: 1100.0,
            pressure_atm: 1.0,
            phi: 1.0,
            mixture_rule: MixtureRule::default(),
            inlet_velocity: 0.001,
            area: 1.0e-4,
            t_total: 0.08,
            n_steps: 200000,
            zoom: (0.055, 0.06),
            minor_zoom: (0.0565, 0.05775),
            major_species: vec![
                PlotSpecies::new("H2O", "green"),
                PlotSpecies::new("CH4", "red"),
                PlotSpecies::new("CO2", "blue"),
                PlotSpecies::new("O2", "magenta"),
            ],
            minor_species: vec![
                PlotSpecies::new("H", "red"),
                PlotSpecies::new("OH", "blue"),
                PlotSpecies::new("O", "magenta"),
            ],
        }
    }
}

impl StudyConfig for PfrStudyConfig {
    fn run_settings(&self) -> &RunSettings {
        &self.run
    }

    fn validate(&self) -> Result<(), StudyError> {
        self.run.validate()?;
        positive("temperature", self.temperature)?;
        positive("pressure_atm", self.pressure_atm)?;
        positive("phi", self.phi)?;
        positive("inlet_velocity", self.inlet_velocity)?;
        positive("area", self.area)?;
        positive("t_total", self.t_total)?;
        if self.n_steps == 0 {
            return Err(StudyError::InvalidConfig("n_steps must be at least 1".to_owned()));
        }
        window("zoom", Some(self.zoom))?;
        window("minor_zoom", Some(self.minor_zoom))?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                              AUTOIGNITION-DELAY SWEEP
////////////////////////////////////////////////////////////////////////////////////////

/// Adiabatic flame temperature reported after the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameCheck {
    pub phi: f64,
    pub temperature: f64,
    pub pressure_atm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnitionStudyConfig {
    pub run: RunSettings,
    /// K
    pub temperatures: Vec<f64>,
    pub pressures_atm: Vec<f64>,
    pub phis: Vec<f64>,
    pub mixture_rule: MixtureRule,
    /// s
    pub horizon: f64,
    /// K above the initial temperature that marks ignition
    pub temperature_rise: f64,
    /// s, y range of the delay figures (log axis)
    pub y_limits: Option<(f64, f64)>,
    pub flame_check: Option<FlameCheck>,
}

impl Default for IgnitionStudyConfig {
    fn default() -> Self {
        Self {
            run: RunSettings::with_output("Figures/Sim1"),
            temperatures: vec![1100.0, 1200.0, 1300.0, 1400.0, 1500.0],
            pressures_atm: vec![1.0, 5.0, 10.0],
            phis: vec![0.3, 0.5, 1.0, 1.5],
            mixture_rule: MixtureRule::default(),
            horizon: 1.0,
            temperature_rise: 150.0,
            y_limits: Some((0.9e-4, 2.5e-1)),
            flame_check: Some(FlameCheck {
                phi: 0.3,
                temperature: 1300.0,
                pressure_atm: 1.0,
            }),
        }
    }
}

impl StudyConfig for IgnitionStudyConfig {
    fn run_settings(&self) -> &RunSettings {
        &self.run
    }

    fn validate(&self) -> Result<(), StudyError> {
        self.run.validate()?;
        all_positive("temperatures", &self.temperatures)?;
        all_positive("pressures_atm", &self.pressures_atm)?;
        all_positive("phis", &self.phis)?;
        positive("horizon", self.horizon)?;
        positive("temperature_rise", self.temperature_rise)?;
        window("y_limits", self.y_limits)?;
        if let Some((lo, _)) = self.y_limits {
            positive("lower y limit of a log axis", lo)?;
        }
        if let Some(check) = &self.flame_check {
            positive("flame_check.phi", check.phi)?;
            positive("flame_check.temperature", check.temperature)?;
            positive("flame_check.pressure_atm", check.pressure_atm)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                 OXIDIZER STUDY
////////////////////////////////////////////////////////////////////////////////////////

/// An oxidizer given per mole of O2, e.g. `"O2:1, N2:3.76"` for air
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxidizerCase {
    pub label: String,
    pub composition: String,
    pub color: String,
}

impl OxidizerCase {
    fn new(label: &str, composition: String, color: &str) -> Self {
        Self {
            label: label.to_owned(),
            composition,
            color: color.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OxidizerStudyConfig {
    pub run: RunSettings,
    pub phi: f64,
    /// K
    pub temperature: f64,
    pub pressure_atm: f64,
    /// s
    pub horizon: f64,
    pub temperature_rise: f64,
    pub fuel: String,
    pub oxidizers: Vec<OxidizerCase>,
}

impl Default for OxidizerStudyConfig {
    fn default() -> Self {
        // radical-doped oxidizers: 20.7 % O2, 79 % N2 and 0.3 % radical
        let n2 = 0.79 / 0.207;
        let radical = 0.003 / 0.207;
        Self {
            run: RunSettings::with_output("Figures/Sim2"),
            phi: 0.5,
            temperature: 1300.0,
            pressure_atm: 1.0,
            horizon: 1.0,
            temperature_rise: 150.0,
            fuel: "CH4:1".to_owned(),
            oxidizers: vec![
                OxidizerCase::new("air", "O2:1, N2:3.76".to_owned(), "red"),
                OxidizerCase::new("oxygen", "O2:1".to_owned(), "blue"),
                OxidizerCase::new("O radicals", format!("O2:1, N2:{}, O:{}", n2, radical), "green"),
                OxidizerCase::new("OH radicals", format!("O2:1, N2:{}, OH:{}", n2, radical), "orange"),
            ],
        }
    }
}

impl StudyConfig for OxidizerStudyConfig {
    fn run_settings(&self) -> &RunSettings {
        &self.run
    }

    fn validate(&self) -> Result<(), StudyError> {
        self.run.validate()?;
        positive("phi", self.phi)?;
        positive("temperature", self.temperature)?;
        positive("pressure_atm", self.pressure_atm)?;
        positive("horizon", self.horizon)?;
        positive("temperature_rise", self.temperature_rise)?;
        if self.oxidizers.is_empty() {
            return Err(StudyError::InvalidConfig("no oxidizers given".to_owned()));
        }
        if self.fuel.trim().is_empty() {
            return Err(StudyError::InvalidConfig("fuel composition is empty".to_owned()));
        }
        Ok(())
    }
}
