//! # Plug-flow reactor profile
//!
//! The plug-flow reactor is modelled as a constant-pressure reactor marched in time: a
//! fluid parcel entering with velocity `u0` carries `mdot = u0 rho0 A`, and at every output
//! step its velocity is `u = mdot / (A rho)` and its position `z += u dt`.
use super::study_config::{PfrStudyConfig, PlotSpecies, StudyConfig};
use super::{StudyError, load_mechanism, save_line_chart};
use crate::ReactorsIVP::reactor_net::ReactorNet;
use crate::ReactorsIVP::reactors::{IdealGasConstPressureReactor, Reactor};
use crate::ReactorsIVP::solution_array::SolutionArray;
use crate::Thermodynamics::ONE_ATM;
use crate::Thermodynamics::mixture::methane_air;
use crate::Thermodynamics::solution::Solution;
use crate::Utils::plots::{LineChart, Series, named_color};
use log::{info, warn};
use prettytable::{Table, row};

pub struct PfrResult {
    /// states at t_i = (i + 1) dt with the extra columns `u` (m/s) and `z` (m)
    pub states: SolutionArray,
    /// kg/s
    pub mass_flow_rate: f64,
    /// s, output step
    pub dt: f64,
}

impl PfrResult {
    pub fn velocity(&self) -> &[f64] {
        self.states.column("u").unwrap_or(&[])
    }

    pub fn position(&self) -> &[f64] {
        self.states.column("z").unwrap_or(&[])
    }

    /// time of the steepest temperature rise
    pub fn steepest_rise(&self) -> Option<f64> {
        let t = self.states.time();
        let T = self.states.T();
        (1..t.len())
            .map(|i| (i, (T[i] - T[i - 1]) / (t[i] - t[i - 1])))
            .filter(|(_, slope)| slope.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| 0.5 * (t[i] + t[i - 1]))
    }

    pub fn pretty_print(&self) {
        let n = self.states.len();
        if n == 0 {
            println!("empty plug-flow profile");
            return;
        }
        println!("\n=== PLUG-FLOW REACTOR PROFILE ===");
        let mut table = Table::new();
        table.add_row(row!["Quantity", "Inlet", "Outlet", "Units"]);
        table.add_row(row![
            "t",
            format!("{:.4e}", self.states.time()[0]),
            format!("{:.4e}", self.states.time()[n - 1]),
            "s"
        ]);
        table.add_row(row![
            "T",
            format!("{:.2}", self.states.T()[0]),
            format!("{:.2}", self.states.T()[n - 1]),
            "K"
        ]);
        table.add_row(row![
            "u",
            format!("{:.4e}", self.velocity()[0]),
            format!("{:.4e}", self.velocity()[n - 1]),
            "m/s"
        ]);
        table.add_row(row![
            "z",
            format!("{:.4e}", self.position()[0]),
            format!("{:.4e}", self.position()[n - 1]),
            "m"
        ]);
        table.printstd();
        println!("mass flow rate: {:.4e} kg/s", self.mass_flow_rate);
        if let Some(t) = self.steepest_rise() {
            println!("steepest temperature rise at t = {:.6e} s", t);
        }
    }

    fn species_series(&self, species: &[PlotSpecies]) -> Vec<Series> {
        species
            .iter()
            .filter_map(|s| match self.states.X(&s.name) {
                Ok(x) => Some(Series::new(&s.name, self.states.time().to_vec(), x, named_color(&s.color))),
                Err(_) => {
                    warn!("species {} is not in the mechanism, left out of the figures", s.name);
                    None
                }
            })
            .collect()
    }

    /// Temperature, major and minor species figures in the output directory.
    pub fn plot(&self, config: &PfrStudyConfig) -> Result<(), StudyError> {
        let dir = &config.run.output_dir;
        let temperature = LineChart::new("Temperature with Respect to Time", "t [s]", "T [K]").with_series(
            Series::new("Temperature", self.states.time().to_vec(), self.states.T().to_vec(), named_color("blue")),
        );
        let major = "Major Species Concentrations with Respect to Time";
        let minor = "Minor Species Concentrations with Respect to Time";
        let x_label = "Residence Time t [s]";
        let mut major_chart = LineChart::new(major, x_label, "X [-]");
        major_chart.series = self.species_series(&config.major_species);
        let mut minor_chart = LineChart::new(minor, x_label, "X [-]");
        minor_chart.series = self.species_series(&config.minor_species);
        let (z0, z1) = config.zoom;
        let (m0, m1) = config.minor_zoom;

        let figures = [
            ("TemperatureZoomOut.png", temperature.clone()),
            ("TemperatureZoomIn.png", temperature.x_limits(z0, z1)),
            ("MajorZoomOut.png", major_chart.clone()),
            ("MajorZoomIn.png", major_chart.x_limits(z0, z1)),
            ("MinorZoomIn.png", minor_chart.clone().x_limits(m0, m1)),
            ("MinorZoomInLog.png", minor_chart.clone().x_limits(z0, z1).log_y()),
            ("MinorZoomOutLog.png", minor_chart.clone().log_y()),
            ("MinorZoomOut.png", minor_chart),
        ];
        for (file, chart) in figures {
            save_line_chart(&chart, &dir.join(file))?;
        }
        Ok(())
    }
}

pub fn run(config: &PfrStudyConfig) -> Result<PfrResult, StudyError> {
    config.validate()?;
    let mechanism = load_mechanism(&config.run.mechanism)?;
    let mut gas = Solution::new(mechanism.clone());
    gas.set_TPX(
        config.temperature,
        config.pressure_atm * ONE_ATM,
        &methane_air(config.phi, config.mixture_rule)?,
    )?;
    let mass_flow_rate = config.inlet_velocity * gas.density() * config.area;

    let reactor = IdealGasConstPressureReactor::new("pfr", gas, 1.0)?;
    let mut net = ReactorNet::new(Reactor::from(reactor), config.run.integrator.clone())?;
    let trajectory = net.integrate(config.t_total)?;

    let dt = config.t_total / config.n_steps as f64;
    let times: Vec<f64> = (1..=config.n_steps).map(|i| i as f64 * dt).collect();
    let mut states = trajectory.resample(&times)?;

    let velocity: Vec<f64> = states
        .density()
        .iter()
        .map(|rho| mass_flow_rate / config.area / rho)
        .collect();
    let position: Vec<f64> = velocity
        .iter()
        .scan(0.0, |z, u| {
            *z += u * dt;
            Some(*z)
        })
        .collect();
    info!(
        "plug flow: {} steps of {:.3e} s, reactor length {:.4e} m",
        config.n_steps,
        dt,
        position.last().copied().unwrap_or(0.0)
    );
    states.add_column("u", velocity)?;
    states.add_column("z", position)?;
    Ok(PfrResult {
        states,
        mass_flow_rate,
        dt,
    })
}
