//! # Autoignition-delay sweep
//!
//! A constant-pressure reactor per grid point (initial temperature x pressure x
//! equivalence ratio); the delay is the first time the temperature exceeds
//! `T0 + temperature_rise`. One figure per pressure, one curve per equivalence ratio.
use super::ignition::{IgnitionCase, ignition_delay};
use super::study_config::{IgnitionStudyConfig, StudyConfig};
use super::{StudyError, load_mechanism, optional_cell, save_line_chart, series_from_options, tolerate_solver_failure, write_table};
use crate::Mechanism::Mechanism;
use crate::Thermodynamics::ONE_ATM;
use crate::Thermodynamics::equilibrium::Constraint;
use crate::Thermodynamics::mixture::{MixtureRule, methane_air};
use crate::Thermodynamics::solution::Solution;
use crate::Utils::plots::{LineChart, palette};
use log::info;
use prettytable::{Cell, Row, Table};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct IgnitionSweepResult {
    pub temperatures: Vec<f64>,
    pub pressures_atm: Vec<f64>,
    pub phis: Vec<f64>,
    /// s, indexed [pressure][phi][temperature]; `None` without ignition
    pub delays: Vec<Vec<Vec<Option<f64>>>>,
    /// K, adiabatic flame temperature of the configured check mixture
    pub flame_temperature: Option<f64>,
}

impl IgnitionSweepResult {
    pub fn delay(&self, pressure: usize, phi: usize, temperature: usize) -> Option<f64> {
        self.delays[pressure][phi][temperature]
    }

    pub fn pretty_print(&self) {
        for (ip, p) in self.pressures_atm.iter().enumerate() {
            println!("\nAutoignition delay [s] at P = {} atm", p);
            let mut table = Table::new();
            let mut header = vec![Cell::new("T0 [K]")];
            header.extend(self.phis.iter().map(|phi| Cell::new(&format!("phi={}", phi))));
            table.add_row(Row::new(header));
            for (iT, T) in self.temperatures.iter().enumerate() {
                let mut cells = vec![Cell::new(&format!("{}", T))];
                cells.extend((0..self.phis.len()).map(|iphi| {
                    Cell::new(
                        &self
                            .delay(ip, iphi, iT)
                            .map(|t| format!("{:.4e}", t))
                            .unwrap_or_else(|| "-".to_owned()),
                    )
                }));
                table.add_row(Row::new(cells));
            }
            table.printstd();
        }
        if let Some(T) = self.flame_temperature {
            println!("adiabatic flame temperature of the check mixture: {:.2} K", T);
        }
    }

    /// Long format: P_atm, phi, T0, delay (empty without ignition).
    pub fn write_csv(&self, path: &Path) -> Result<(), StudyError> {
        let header = ["P_atm", "phi", "T0", "delay"].map(str::to_owned);
        let mut rows = Vec::new();
        for (ip, p) in self.pressures_atm.iter().enumerate() {
            for (iphi, phi) in self.phis.iter().enumerate() {
                for (iT, T) in self.temperatures.iter().enumerate() {
                    rows.push(vec![
                        p.to_string(),
                        phi.to_string(),
                        T.to_string(),
                        optional_cell(self.delay(ip, iphi, iT)),
                    ]);
                }
            }
        }
        write_table(path, &header, &rows)
    }

    /// `P<p>atm.png` per pressure in the output directory.
    pub fn plot(&self, config: &IgnitionStudyConfig) -> Result<(), StudyError> {
        for (ip, p) in self.pressures_atm.iter().enumerate() {
            let mut chart = LineChart::new(
                &format!("Auto-Ignition Times at P = {} atm", p),
                "T [K]",
                "Autoignition Delay t [s]",
            )
            .log_y()
            .markers();
            for (iphi, phi) in self.phis.iter().enumerate() {
                chart.series.push(series_from_options(
                    &format!("phi={}", phi),
                    &self.temperatures,
                    &self.delays[ip][iphi],
                    palette(iphi),
                ));
            }
            chart.y_limits = config.y_limits;
            save_line_chart(&chart, &config.run.output_dir.join(format!("P{}atm.png", p)))?;
        }
        Ok(())
    }
}

/// Adiabatic flame temperature (HP equilibrium) of methane/air at `phi`, `T`, `pressure_atm`.
pub fn flame_temperature(
    mechanism: &Arc<Mechanism>,
    rule: MixtureRule,
    phi: f64,
    T: f64,
    pressure_atm: f64,
) -> Result<f64, StudyError> {
    let mut gas = Solution::new(mechanism.clone());
    gas.set_TPX(T, pressure_atm * ONE_ATM, &methane_air(phi, rule)?)?;
    gas.equilibrate(Constraint::HP)?;
    Ok(gas.T())
}

pub fn run(config: &IgnitionStudyConfig) -> Result<IgnitionSweepResult, StudyError> {
    config.validate()?;
    let mechanism = load_mechanism(&config.run.mechanism)?;
    let total = config.pressures_atm.len() * config.phis.len() * config.temperatures.len();
    let mut done = 0;
    let mut delays = Vec::with_capacity(config.pressures_atm.len());
    for &p in &config.pressures_atm {
        let mut per_phi = Vec::with_capacity(config.phis.len());
        for &phi in &config.phis {
            let composition = methane_air(phi, config.mixture_rule)?;
            let mut per_T = Vec::with_capacity(config.temperatures.len());
            for &T in &config.temperatures {
                done += 1;
                info!("ignition {}/{}: P = {} atm, phi = {}, T0 = {} K", done, total, p, phi, T);
                let case = IgnitionCase {
                    temperature: T,
                    pressure: p * ONE_ATM,
                    composition: composition.clone(),
                    horizon: config.horizon,
                    temperature_rise: config.temperature_rise,
                };
                let delay = tolerate_solver_failure(
                    ignition_delay(&mechanism, &case, &config.run.integrator),
                    &format!("P = {} atm, phi = {}, T0 = {} K", p, phi, T),
                )?;
                per_T.push(delay.flatten());
            }
            per_phi.push(per_T);
        }
        delays.push(per_phi);
    }

    let flame_temperature = match &config.flame_check {
        Some(check) => {
            let T = flame_temperature(
                &mechanism,
                config.mixture_rule,
                check.phi,
                check.temperature,
                check.pressure_atm,
            )?;
            info!(
                "adiabatic flame temperature at phi = {}, T0 = {} K, P = {} atm: {:.2} K",
                check.phi, check.temperature, check.pressure_atm, T
            );
            Some(T)
        }
        None => None,
    };

    Ok(IgnitionSweepResult {
        temperatures: config.temperatures.clone(),
        pressures_atm: config.pressures_atm.clone(),
        phis: config.phis.clone(),
        delays,
        flame_temperature,
    })
}
