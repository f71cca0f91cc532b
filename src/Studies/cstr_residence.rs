//! # Stirred-reactor residence-time sweep
//!
//! A constant-volume reactor is fed from a reservoir through a mass flow controller and
//! drained at the same rate into a downstream reservoir. For each residence time
//! `tau` the inflow is `mdot = V rho_in / tau`; the reactor starts hot with the feed
//! composition and is integrated to the horizon. The mole fractions of the tracked
//! species at the end are divided by their values in the adiabatic (HP) equilibrium of
//! the feed.
use super::study_config::{CstrStudyConfig, StudyConfig};
use super::{StudyError, load_mechanism, optional_cell, save_line_chart, series_from_options, tolerate_solver_failure, write_table};
use crate::ReactorsIVP::flow_devices::{MassFlowController, Reservoir};
use crate::ReactorsIVP::reactor_net::ReactorNet;
use crate::ReactorsIVP::reactors::{IdealGasReactor, Reactor, ReactorModel};
use crate::Thermodynamics::ONE_ATM;
use crate::Thermodynamics::equilibrium::Constraint;
use crate::Thermodynamics::mixture::methane_air;
use crate::Thermodynamics::solution::Solution;
use crate::Utils::plots::{LineChart, named_color};
use log::{Level, info, log_enabled, warn};
use prettytable::{Table, row};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct CstrResult {
    /// s
    pub residence_times: Vec<f64>,
    /// tracked species present in the mechanism
    pub species: Vec<String>,
    /// [species][residence time], mole fraction at the end of the run
    pub mole_fractions: Vec<Vec<Option<f64>>>,
    /// K, reactor temperature at the end of the run
    pub temperatures: Vec<Option<f64>>,
    /// mole fractions in the HP equilibrium of the feed
    pub equilibrium: Vec<f64>,
    /// K
    pub equilibrium_temperature: f64,
}

impl CstrResult {
    /// `X / X_eq` of species `k`; `None` where the run failed or the equilibrium value is zero
    pub fn normalised(&self, k: usize) -> Vec<Option<f64>> {
        let eq = self.equilibrium[k];
        if eq <= 0.0 {
            warn!("{} is absent from the equilibrium state, cannot normalise", self.species[k]);
            return vec![None; self.residence_times.len()];
        }
        self.mole_fractions[k].iter().map(|x| x.map(|x| x / eq)).collect()
    }

    /// mole fraction of species `k` at the longest residence time
    pub fn longest_residence(&self, k: usize) -> Option<f64> {
        self.mole_fractions[k].last().copied().flatten()
    }

    pub fn pretty_print(&self) {
        println!("\n=== STIRRED REACTOR SWEEP ===");
        println!(
            "{} residence times from {:.4e} s to {:.4e} s, equilibrium T = {:.2} K",
            self.residence_times.len(),
            self.residence_times.first().copied().unwrap_or(f64::NAN),
            self.residence_times.last().copied().unwrap_or(f64::NAN),
            self.equilibrium_temperature
        );
        let mut table = Table::new();
        table.add_row(row!["Species", "X at longest residence", "X equilibrium", "ratio"]);
        for (k, name) in self.species.iter().enumerate() {
            let x = self.longest_residence(k);
            let eq = self.equilibrium[k];
            let ratio = x.filter(|_| eq > 0.0).map(|x| x / eq);
            table.add_row(row![
                name,
                x.map(|x| format!("{:.4e}", x)).unwrap_or_else(|| "-".to_owned()),
                format!("{:.4e}", eq),
                ratio.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "-".to_owned())
            ]);
        }
        table.printstd();
    }

    /// Columns: tau, T, then X and X/X_eq of every tracked species.
    pub fn write_csv(&self, path: &Path) -> Result<(), StudyError> {
        let mut header = vec!["tau".to_owned(), "T".to_owned()];
        for name in &self.species {
            header.push(format!("X_{}", name));
            header.push(format!("X_{}/X_{}_eq", name, name));
        }
        let normalised: Vec<Vec<Option<f64>>> = (0..self.species.len()).map(|k| self.normalised(k)).collect();
        let rows: Vec<Vec<String>> = self
            .residence_times
            .iter()
            .enumerate()
            .map(|(i, tau)| {
                let mut row = vec![format!("{:e}", tau), optional_cell(self.temperatures[i])];
                for k in 0..self.species.len() {
                    row.push(optional_cell(self.mole_fractions[k][i]));
                    row.push(optional_cell(normalised[k][i]));
                }
                row
            })
            .collect();
        write_table(path, &header, &rows)
    }

    /// One figure per tracked species, `<species>Prod.png` in the output directory.
    pub fn plot(&self, config: &CstrStudyConfig) -> Result<(), StudyError> {
        for (k, name) in self.species.iter().enumerate() {
            let Some(style) = config.species.iter().find(|s| &s.name == name) else {
                continue;
            };
            let series = series_from_options(
                &format!("[{}]_SS", name),
                &self.residence_times,
                &self.normalised(k),
                named_color(&style.color),
            );
            let mut chart = LineChart::new(
                &format!("{} Production as a Function of Residence Time", name),
                "time [s]",
                &format!("Normalized {} Concentration ([{}]/[{}]_eq)", name, name, name),
            )
            .with_series(series);
            chart.y_limits = style.y_limits;
            save_line_chart(&chart, &config.run.output_dir.join(format!("{}Prod.png", name)))?;
        }
        Ok(())
    }
}

/// Integrate one stirred reactor with residence time `tau` to the horizon and return its contents.
fn steady_state(config: &CstrStudyConfig, feed: &Solution, tau: f64) -> Result<Solution, StudyError> {
    let mut contents = feed.clone();
    contents.set_TP(config.reactor_temperature, feed.P())?;
    let mut reactor = IdealGasReactor::new("cstr", contents, config.volume)?;
    let mdot = config.volume * feed.density() / tau;
    reactor.add_inlet(Reservoir::new("upstream", feed), MassFlowController::new(mdot)?);
    reactor.add_outlet(MassFlowController::new(mdot)?, Some(Reservoir::new("downstream", feed)));
    let mut net = ReactorNet::new(Reactor::from(reactor), config.run.integrator.clone())?;
    if log_enabled!(Level::Trace) {
        net.pretty_print_task();
    }
    net.advance(config.horizon)?;
    Ok(net.reactor().contents().clone())
}

pub fn run(config: &CstrStudyConfig) -> Result<CstrResult, StudyError> {
    config.validate()?;
    let mechanism = load_mechanism(&config.run.mechanism)?;
    let mut feed = Solution::new(mechanism.clone());
    feed.set_TPX(
        config.inlet_temperature,
        config.pressure_atm * ONE_ATM,
        &methane_air(config.phi, config.mixture_rule)?,
    )?;

    let species: Vec<String> = config
        .species
        .iter()
        .filter(|s| {
            let known = mechanism.species_index(&s.name).is_some();
            if !known {
                warn!("species {} is not in the mechanism and is not tracked", s.name);
            }
            known
        })
        .map(|s| s.name.clone())
        .collect();

    let mut equilibrium_gas = feed.clone();
    equilibrium_gas.equilibrate(Constraint::HP)?;
    let equilibrium = species
        .iter()
        .map(|name| equilibrium_gas.mole_fraction(name))
        .collect::<Result<Vec<f64>, _>>()?;
    info!("HP equilibrium of the feed: T = {:.2} K", equilibrium_gas.T());
    if log_enabled!(Level::Debug) {
        equilibrium_gas.pretty_print();
    }

    let n = config.residence_times.len();
    let mut mole_fractions = vec![Vec::with_capacity(n); species.len()];
    let mut temperatures = Vec::with_capacity(n);
    for (i, &tau) in config.residence_times.iter().enumerate() {
        info!("residence time {}/{}: {:.4e} s", i + 1, n, tau);
        let state = tolerate_solver_failure(
            steady_state(config, &feed, tau),
            &format!("residence time {:.4e} s", tau),
        )?;
        temperatures.push(state.as_ref().map(|gas| gas.T()));
        for (k, name) in species.iter().enumerate() {
            let x = match &state {
                Some(gas) => Some(gas.mole_fraction(name)?),
                None => None,
            };
            mole_fractions[k].push(x);
        }
    }

    Ok(CstrResult {
        residence_times: config.residence_times.clone(),
        species,
        mole_fractions,
        temperatures,
        equilibrium,
        equilibrium_temperature: equilibrium_gas.T(),
    })
}
