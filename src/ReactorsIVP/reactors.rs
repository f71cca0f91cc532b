use super::ReactorError;
use super::flow_devices::{Inlet, MassFlowController, Outlet, Reservoir};
use crate::Thermodynamics::R_G;
use crate::Thermodynamics::solution::Solution;
use enum_dispatch::enum_dispatch;
use prettytable::{Table, row};

/// Which property the reactor holds fixed; selects the energy equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyClosure {
    /// m^3
    ConstantVolume { volume: f64 },
    /// Pa
    ConstantPressure { pressure: f64 },
}

#[enum_dispatch]
pub trait ReactorModel {
    fn name(&self) -> &str;
    fn kind(&self) -> &'static str;
    /// gas currently inside the reactor
    fn contents(&self) -> &Solution;
    /// m^3
    fn volume(&self) -> f64;
    fn inlets(&self) -> &[Inlet];
    fn outlets(&self) -> &[Outlet];
    fn energy_closure(&self) -> EnergyClosure;
    fn add_inlet(&mut self, upstream: Reservoir, controller: MassFlowController);
    fn add_outlet(&mut self, controller: MassFlowController, downstream: Option<Reservoir>);
    /// Gas state that corresponds to the integrator state (m, T, Y).
    fn gas_at(&self, m: f64, T: f64, Y: &[f64]) -> Result<Solution, ReactorError>;
    /// Replace the reactor state by the integrator state (m, T, Y).
    fn sync_state(&mut self, m: f64, T: f64, Y: &[f64]) -> Result<(), ReactorError>;

    /// kg
    fn mass(&self) -> f64 {
        self.contents().density() * self.volume()
    }
    /// kg/s
    fn mass_inflow(&self) -> f64 {
        self.inlets().iter().map(|i| i.controller.mass_flow_rate()).sum()
    }
    /// kg/s
    fn mass_outflow(&self) -> f64 {
        self.outlets().iter().map(|o| o.controller.mass_flow_rate()).sum()
    }
    fn pretty_print(&self) {
        let gas = self.contents();
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row!["Reactor", format!("{} ({})", self.name(), self.kind()), "-"]);
        table.add_row(row!["Temperature", format!("{:.3}", gas.T()), "K"]);
        table.add_row(row!["Pressure", format!("{:.2}", gas.P()), "Pa"]);
        table.add_row(row!["Volume", format!("{:.4e}", self.volume()), "m3"]);
        table.add_row(row!["Mass", format!("{:.4e}", self.mass()), "kg"]);
        table.add_row(row!["Inflow", format!("{:.4e}", self.mass_inflow()), "kg/s"]);
        table.add_row(row!["Outflow", format!("{:.4e}", self.mass_outflow()), "kg/s"]);
        table.printstd();
    }
}

fn check_volume(volume: f64) -> Result<(), ReactorError> {
    if !(volume.is_finite() && volume > 0.0) {
        return Err(ReactorError::InvalidParameter(format!(
            "reactor volume must be positive, got {}",
            volume
        )));
    }
    Ok(())
}

fn check_mass(m: f64) -> Result<(), ReactorError> {
    if !(m.is_finite() && m > 0.0) {
        return Err(ReactorError::Solver(format!("non-physical reactor mass {}", m)));
    }
    Ok(())
}

/// Well-stirred reactor of fixed volume; pressure follows from the ideal-gas law.
#[derive(Debug, Clone)]
pub struct IdealGasReactor {
    name: String,
    gas: Solution,
    volume: f64,
    inlets: Vec<Inlet>,
    outlets: Vec<Outlet>,
}

impl IdealGasReactor {
    pub fn new(name: &str, gas: Solution, volume: f64) -> Result<Self, ReactorError> {
        check_volume(volume)?;
        Ok(Self {
            name: name.to_owned(),
            gas,
            volume,
            inlets: Vec::new(),
            outlets: Vec::new(),
        })
    }
}

impl ReactorModel for IdealGasReactor {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &'static str {
        "IdealGasReactor"
    }
    fn contents(&self) -> &Solution {
        &self.gas
    }
    fn volume(&self) -> f64 {
        self.volume
    }
    fn inlets(&self) -> &[Inlet] {
        &self.inlets
    }
    fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }
    fn energy_closure(&self) -> EnergyClosure {
        EnergyClosure::ConstantVolume {
            volume: self.volume,
        }
    }
    fn add_inlet(&mut self, upstream: Reservoir, controller: MassFlowController) {
        self.inlets.push(Inlet {
            upstream,
            controller,
        });
    }
    fn add_outlet(&mut self, controller: MassFlowController, downstream: Option<Reservoir>) {
        self.outlets.push(Outlet {
            controller,
            downstream,
        });
    }
    fn gas_at(&self, m: f64, T: f64, Y: &[f64]) -> Result<Solution, ReactorError> {
        check_mass(m)?;
        let mut gas = self.gas.clone();
        gas.set_TPY_vec(T, self.gas.P(), Y)?;
        let P = m / self.volume * R_G * T / gas.mean_molar_mass();
        gas.set_TP(T, P)?;
        Ok(gas)
    }
    fn sync_state(&mut self, m: f64, T: f64, Y: &[f64]) -> Result<(), ReactorError> {
        self.gas = self.gas_at(m, T, Y)?;
        Ok(())
    }
}

/// Well-stirred reactor at fixed pressure; the volume follows the mass and density.
#[derive(Debug, Clone)]
pub struct IdealGasConstPressureReactor {
    name: String,
    gas: Solution,
    volume: f64,
    inlets: Vec<Inlet>,
    outlets: Vec<Outlet>,
}

impl IdealGasConstPressureReactor {
    pub fn new(name: &str, gas: Solution, volume: f64) -> Result<Self, ReactorError> {
        check_volume(volume)?;
        Ok(Self {
            name: name.to_owned(),
            gas,
            volume,
            inlets: Vec::new(),
            outlets: Vec::new(),
        })
    }
}

impl ReactorModel for IdealGasConstPressureReactor {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &'static str {
        "IdealGasConstPressureReactor"
    }
    fn contents(&self) -> &Solution {
        &self.gas
    }
    fn volume(&self) -> f64 {
        self.volume
    }
    fn inlets(&self) -> &[Inlet] {
        &self.inlets
    }
    fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }
    fn energy_closure(&self) -> EnergyClosure {
        EnergyClosure::ConstantPressure {
            pressure: self.gas.P(),
        }
    }
    fn add_inlet(&mut self, upstream: Reservoir, controller: MassFlowController) {
        self.inlets.push(Inlet {
            upstream,
            controller,
        });
    }
    fn add_outlet(&mut self, controller: MassFlowController, downstream: Option<Reservoir>) {
        self.outlets.push(Outlet {
            controller,
            downstream,
        });
    }
    fn gas_at(&self, m: f64, T: f64, Y: &[f64]) -> Result<Solution, ReactorError> {
        check_mass(m)?;
        let mut gas = self.gas.clone();
        gas.set_TPY_vec(T, self.gas.P(), Y)?;
        Ok(gas)
    }
    fn sync_state(&mut self, m: f64, T: f64, Y: &[f64]) -> Result<(), ReactorError> {
        let gas = self.gas_at(m, T, Y)?;
        self.volume = m / gas.density();
        self.gas = gas;
        Ok(())
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(ReactorModel)]
pub enum Reactor {
    IdealGas(IdealGasReactor),
    ConstPressure(IdealGasConstPressureReactor),
}
