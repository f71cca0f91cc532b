/// eng
/// Reservoirs (frozen upstream/downstream gas states) and mass flow controllers
pub mod flow_devices;
/// eng
/// Zero-dimensional ideal-gas reactors: constant volume (`IdealGasReactor`) and constant
/// pressure (`IdealGasConstPressureReactor`), dispatched through the `Reactor` enum
pub mod reactors;
/// eng
/// Governing equations of a reactor with state [m, T, Y0..YK-1], written once over
/// `Scalar` so the symbolic right-hand side and its numeric check come from the same code
pub mod reactor_equations;
/// eng
/// Time integration of a reactor with the RustedSciThe IVP solvers:
/// ```no_run
/// use methane_reactors::Mechanism::Mechanism;
/// use methane_reactors::Thermodynamics::{ONE_ATM, solution::Solution};
/// use methane_reactors::ReactorsIVP::reactors::{IdealGasConstPressureReactor, Reactor};
/// use methane_reactors::ReactorsIVP::reactor_net::{IntegratorSettings, ReactorNet, StopCondition};
/// use std::sync::Arc;
/// let mech = Arc::new(Mechanism::from_file("data/ch4_bfer.yaml").unwrap());
/// let mut gas = Solution::new(mech);
/// gas.set_TPX_str(1300.0, ONE_ATM, "CH4:1, O2:2, N2:7.52").unwrap();
/// let reactor = IdealGasConstPressureReactor::new("r1", gas, 1e-3).unwrap();
/// let mut net = ReactorNet::new(Reactor::from(reactor), IntegratorSettings::default()).unwrap();
/// let outcome = net.integrate_until(1.0, StopCondition::TemperatureAbove(1450.0)).unwrap();
/// println!("ignition delay {:?}", outcome.stop_time);
/// ```
pub mod reactor_net;
/// tables of the reactor network and its equations
pub mod reactor_net_print;
/// time series of reactor states, resampling and CSV export
pub mod solution_array;
#[cfg(test)]
mod reactor_tests;

use crate::Thermodynamics::ThermoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("invalid reactor parameter: {0}")]
    InvalidParameter(String),
    #[error("ODE solver failure: {0}")]
    Solver(String),
    #[error("unknown column or species: {0}")]
    UnknownColumn(String),
    #[error("time outside the recorded states: {0}")]
    OutOfRange(String),
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
