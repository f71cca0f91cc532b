use super::StudyError;
use crate::Mechanism::Mechanism;
use crate::ReactorsIVP::reactor_net::{IntegratorSettings, ReactorNet, StopCondition};
use crate::ReactorsIVP::reactors::{IdealGasConstPressureReactor, Reactor};
use crate::Thermodynamics::solution::Solution;
use log::{Level, debug, log_enabled, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Initial state and criterion of one autoignition run
#[derive(Debug, Clone)]
pub struct IgnitionCase {
    /// K
    pub temperature: f64,
    /// Pa
    pub pressure: f64,
    /// mole amounts, normalised on use
    pub composition: HashMap<String, f64>,
    /// s
    pub horizon: f64,
    /// K above the initial temperature
    pub temperature_rise: f64,
}

/// Species of the composition that the mechanism lacks
pub fn missing_species(mechanism: &Mechanism, composition: &HashMap<String, f64>) -> Vec<String> {
    let mut missing: Vec<String> = composition
        .keys()
        .filter(|name| mechanism.species_index(name).is_none())
        .cloned()
        .collect();
    missing.sort();
    missing
}

/// Time at which a constant-pressure reactor started from `case` first exceeds
/// `T0 + temperature_rise`; `None` when it stays below up to the horizon.
pub fn ignition_delay(
    mechanism: &Arc<Mechanism>,
    case: &IgnitionCase,
    integrator: &IntegratorSettings,
) -> Result<Option<f64>, StudyError> {
    let mut gas = Solution::new(mechanism.clone());
    gas.set_TPX(case.temperature, case.pressure, &case.composition)?;
    let reactor = IdealGasConstPressureReactor::new("autoignition", gas, 1.0)?;
    let mut net = ReactorNet::new(Reactor::from(reactor), integrator.clone())?;
    if log_enabled!(Level::Trace) {
        net.pretty_print_task();
        net.pretty_print_equations();
    }
    let threshold = case.temperature + case.temperature_rise;
    let outcome = net.integrate_until(case.horizon, StopCondition::TemperatureAbove(threshold))?;
    match outcome.stop_time {
        Some(t) => debug!(
            "T0 = {} K, P = {} Pa: ignition after {:.4e} s",
            case.temperature, case.pressure, t
        ),
        None => warn!(
            "T0 = {} K, P = {} Pa: no ignition within {} s",
            case.temperature, case.pressure, case.horizon
        ),
    }
    Ok(outcome.stop_time)
}
