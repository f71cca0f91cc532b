//! # Oxidizer study
//!
//! Autoignition delay of one fuel with oxidizers of different diluent and radical
//! content. Each oxidizer is given per mole of O2 and is added in the amount that gives
//! the requested equivalence ratio: `fuel + (z_fuel / phi) * oxidizer`, `z_fuel` being the
//! O2 the fuel needs for complete combustion.
use super::ignition::{IgnitionCase, ignition_delay, missing_species};
use super::study_config::{OxidizerStudyConfig, StudyConfig};
use super::{StudyError, load_mechanism, optional_cell, tolerate_solver_failure, write_table};
use crate::Mechanism::Mechanism;
use crate::Thermodynamics::ONE_ATM;
use crate::Thermodynamics::mixture::{oxygen_demand, parse_composition};
use crate::Utils::plots::{BarChart, named_color, render_bar_chart};
use log::{info, warn};
use prettytable::{Table, row};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct OxidizerResult {
    pub labels: Vec<String>,
    /// s, `None` without ignition or when the mechanism lacks a species of the mixture
    pub delays: Vec<Option<f64>>,
    pub pressure_atm: f64,
}

impl OxidizerResult {
    pub fn pretty_print(&self) {
        println!("\nAutoignition delay by oxidizer at P = {} atm", self.pressure_atm);
        let mut table = Table::new();
        table.add_row(row!["Oxidizer", "Delay [s]"]);
        for (label, delay) in self.labels.iter().zip(&self.delays) {
            table.add_row(row![
                label,
                delay.map(|t| format!("{:.4e}", t)).unwrap_or_else(|| "-".to_owned())
            ]);
        }
        table.printstd();
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), StudyError> {
        let header = ["oxidizer", "delay"].map(str::to_owned);
        let rows: Vec<Vec<String>> = self
            .labels
            .iter()
            .zip(&self.delays)
            .map(|(label, delay)| vec![label.clone(), optional_cell(*delay)])
            .collect();
        write_table(path, &header, &rows)
    }

    /// Bar chart `P<p>atm.png` in the output directory.
    pub fn plot(&self, config: &OxidizerStudyConfig) -> Result<(), StudyError> {
        let chart = BarChart {
            title: "Auto-Ignition Times of Different Oxidizer Compositions".to_owned(),
            x_label: "Oxidizer Species".to_owned(),
            y_label: "Autoignition Delay t [s]".to_owned(),
            categories: self.labels.clone(),
            values: self.delays.clone(),
            colors: config.oxidizers.iter().map(|o| named_color(&o.color)).collect(),
        };
        render_bar_chart(&chart, config.run.output_dir.join(format!("P{}atm.png", self.pressure_atm)))?;
        Ok(())
    }
}

/// `fuel + (z_fuel / phi) * oxidizer / x_O2`, with `z_fuel` the O2 demand of the fuel as given
/// and `x_O2` the O2 amount of the oxidizer.
pub fn oxidizer_mixture(
    mechanism: &Mechanism,
    phi: f64,
    fuel: &HashMap<String, f64>,
    oxidizer: &HashMap<String, f64>,
) -> Result<HashMap<String, f64>, StudyError> {
    if !(phi.is_finite() && phi > 0.0) {
        return Err(StudyError::InvalidConfig(format!("phi must be positive, got {}", phi)));
    }
    let o2 = oxidizer.get("O2").copied().unwrap_or(0.0);
    if o2 <= 0.0 {
        return Err(StudyError::InvalidConfig("oxidizer contains no O2".to_owned()));
    }
    let fuel_total: f64 = fuel.values().sum();
    let demand = oxygen_demand(mechanism, fuel)? * fuel_total;
    let scale = demand / phi / o2;
    let mut mixture = fuel.clone();
    for (name, amount) in oxidizer {
        *mixture.entry(name.clone()).or_insert(0.0) += scale * amount;
    }
    Ok(mixture)
}

pub fn run(config: &OxidizerStudyConfig) -> Result<OxidizerResult, StudyError> {
    config.validate()?;
    let mechanism = load_mechanism(&config.run.mechanism)?;
    let fuel = parse_composition(&config.fuel)?;
    let mut labels = Vec::with_capacity(config.oxidizers.len());
    let mut delays = Vec::with_capacity(config.oxidizers.len());
    for case in &config.oxidizers {
        labels.push(case.label.clone());
        let oxidizer = parse_composition(&case.composition)?;
        let mut all: HashMap<String, f64> = fuel.clone();
        all.extend(oxidizer.clone());
        let missing = missing_species(&mechanism, &all);
        if !missing.is_empty() {
            warn!(
                "oxidizer '{}' skipped: mechanism lacks {}",
                case.label,
                missing.join(", ")
            );
            delays.push(None);
            continue;
        }
        let composition = oxidizer_mixture(&mechanism, config.phi, &fuel, &oxidizer)?;
        info!("oxidizer '{}': {:?}", case.label, composition);
        let ignition = IgnitionCase {
            temperature: config.temperature,
            pressure: config.pressure_atm * ONE_ATM,
            composition,
            horizon: config.horizon,
            temperature_rise: config.temperature_rise,
        };
        let delay = tolerate_solver_failure(
            ignition_delay(&mechanism, &ignition, &config.run.integrator),
            &format!("oxidizer '{}'", case.label),
        )?;
        delays.push(delay.flatten());
    }
    Ok(OxidizerResult {
        labels,
        delays,
        pressure_atm: config.pressure_atm,
    })
}
