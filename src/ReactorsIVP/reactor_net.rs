//! # Reactor network integrator
//!
//! `ReactorNet` owns one reactor, builds its symbolic right-hand side once and marches it in
//! time with `UniversalODESolver` from RustedSciThe.
//!
//! - `advance(t)`: integrate to `t` and keep only the final state
//! - `integrate(t_end)`: integrate and return the solver trajectory as a [`SolutionArray`]
//! - `integrate_until(t_end, stop)`: as `integrate`, then the trajectory is cut at the first
//!   solver point where the stop condition holds; the crossing time is found by linear
//!   interpolation between the solver points that bracket it
//!
//! The solver always runs to `t_end`. A trajectory that ends early is logged as a warning.
use super::ReactorError;
use super::reactor_equations::{TIME, state_vector, symbolic_system};
use super::reactors::{Reactor, ReactorModel};
use super::solution_array::SolutionArray;
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::numerical::Radau::Radau_main::RadauOrder;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// ODE method handed to `UniversalODESolver`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum SolverKind {
    #[default]
    BDF,
    Radau,
    BackwardEuler,
    /// explicit Runge-Kutta 4(5), only for non-stiff runs
    RK45,
}

impl SolverKind {
    pub fn solver_type(&self) -> SolverType {
        match self {
            SolverKind::BDF => SolverType::BDF,
            SolverKind::Radau => SolverType::Radau(RadauOrder::Order7),
            SolverKind::BackwardEuler => SolverType::BackwardEuler,
            SolverKind::RK45 => SolverType::NonStiff("RK45".to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    pub solver: SolverKind,
    pub rtol: f64,
    pub atol: f64,
    /// s; `None` lets the step grow up to the integration interval
    pub max_step: Option<f64>,
    /// s, fixed step of BackwardEuler and the first step of the others
    pub step_size: f64,
    /// Newton tolerance of the implicit methods
    pub tolerance: f64,
    pub max_iterations: usize,
    pub parallel: bool,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            solver: SolverKind::BDF,
            rtol: 1e-6,
            atol: 1e-10,
            max_step: None,
            step_size: 1e-6,
            tolerance: 1e-6,
            max_iterations: 100000,
            parallel: true,
        }
    }
}

impl IntegratorSettings {
    pub fn validate(&self) -> Result<(), ReactorError> {
        let positive = [
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("step_size", self.step_size),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ReactorError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if let Some(max_step) = self.max_step {
            if !(max_step.is_finite() && max_step > 0.0) {
                return Err(ReactorError::InvalidParameter(format!(
                    "max_step must be positive, got {}",
                    max_step
                )));
            }
        }
        if self.max_iterations == 0 {
            return Err(ReactorError::InvalidParameter(
                "max_iterations must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Parameter map for an interval of length `span`
    pub fn solver_params(&self, span: f64) -> HashMap<String, SolverParam> {
        let max_step = self.max_step.unwrap_or(span).min(span);
        HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(self.step_size.min(span))),
            ("tolerance".to_owned(), SolverParam::Float(self.tolerance)),
            ("max_iterations".to_owned(), SolverParam::Int(self.max_iterations as _)),
            ("rtol".to_owned(), SolverParam::Float(self.rtol)),
            ("atol".to_owned(), SolverParam::Float(self.atol)),
            ("max_step".to_owned(), SolverParam::Float(max_step)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(None)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            ("parallel".to_owned(), SolverParam::Bool(self.parallel)),
        ])
    }
}

/// Condition that ends `integrate_until`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// reactor temperature rises above the value, K
    TemperatureAbove(f64),
}

impl StopCondition {
    fn threshold(&self) -> f64 {
        match self {
            StopCondition::TemperatureAbove(T) => *T,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegrationOutcome {
    pub states: SolutionArray,
    /// time at which the stop condition was first met, `None` if it never was
    pub stop_time: Option<f64>,
}

/// `true` when the last solver time falls short of `t_end` beyond round-off
pub(crate) fn stopped_short(t_last: f64, t_end: f64) -> bool {
    t_end - t_last > 1e-9 * t_end.abs().max(1.0)
}

/// Solver trajectory: times and a (time x variable) matrix
struct Trajectory {
    t: DVector<f64>,
    y: DMatrix<f64>,
}

pub struct ReactorNet {
    reactor: Reactor,
    settings: IntegratorSettings,
    time: f64,
    equations: Vec<Expr>,
    unknowns: Vec<String>,
}

impl ReactorNet {
    pub fn new(reactor: Reactor, settings: IntegratorSettings) -> Result<Self, ReactorError> {
        settings.validate()?;
        let now = Instant::now();
        let (equations, unknowns) = symbolic_system(&reactor);
        debug!(
            "symbolic system of {} equations for {} built in {} ms",
            equations.len(),
            reactor.name(),
            now.elapsed().as_millis()
        );
        Ok(Self {
            reactor,
            settings,
            time: 0.0,
            equations,
            unknowns,
        })
    }

    /// s
    pub fn time(&self) -> f64 {
        self.time
    }
    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }
    pub fn settings(&self) -> &IntegratorSettings {
        &self.settings
    }
    pub fn equations(&self) -> &[Expr] {
        &self.equations
    }
    pub fn unknowns(&self) -> &[String] {
        &self.unknowns
    }

    fn check_target(&self, t_end: f64) -> Result<(), ReactorError> {
        if !(t_end.is_finite() && t_end > self.time) {
            return Err(ReactorError::InvalidParameter(format!(
                "target time {} must lie after the current time {}",
                t_end, self.time
            )));
        }
        Ok(())
    }

    fn solve_interval(&self, t_end: f64) -> Result<Trajectory, ReactorError> {
        let y0 = DVector::from_vec(state_vector(&self.reactor));
        let n = y0.len();
        let mut ode = UniversalODESolver::new(
            self.equations.clone(),
            self.unknowns.clone(),
            TIME.to_owned(),
            self.settings.solver.solver_type(),
            self.time,
            y0,
            t_end,
        );
        ode.set_parameters(self.settings.solver_params(t_end - self.time));
        let now = Instant::now();
        ode.initialize();
        ode.solve();
        let (t, y) = ode.get_result();
        let (t, y) = match (t, y) {
            (Some(t), Some(y)) => (t, y),
            _ => return Err(ReactorError::Solver("solver returned no result".to_owned())),
        };
        let y = if y.nrows() == t.len() && y.ncols() == n {
            y
        } else if y.ncols() == t.len() && y.nrows() == n {
            y.transpose()
        } else {
            return Err(ReactorError::Solver(format!(
                "result of shape {}x{} does not match {} time points of {} variables",
                y.nrows(),
                y.ncols(),
                t.len(),
                n
            )));
        };
        if t.is_empty() || y.iter().any(|v| !v.is_finite()) {
            return Err(ReactorError::Solver(format!(
                "non-finite or empty solution between t = {} and t = {}",
                self.time, t_end
            )));
        }
        info!(
            "{:?} integrated {} from t = {:.4e} to t = {:.4e} s in {} points ({} ms)",
            self.settings.solver,
            self.reactor.name(),
            self.time,
            t[t.len() - 1],
            t.len(),
            now.elapsed().as_millis()
        );
        let t_last = t[t.len() - 1];
        if stopped_short(t_last, t_end) {
            warn!(
                "solver stopped at t = {} before the requested t = {}",
                t_last, t_end
            );
        }
        Ok(Trajectory { t, y })
    }

    fn sync_to_row(&mut self, trajectory: &Trajectory, row: usize) -> Result<(), ReactorError> {
        let state: Vec<f64> = trajectory.y.row(row).iter().copied().collect();
        self.reactor.sync_state(state[0], state[1], &state[2..])?;
        self.time = trajectory.t[row];
        Ok(())
    }

    fn to_array(&self, trajectory: &Trajectory, rows: usize) -> Result<SolutionArray, ReactorError> {
        let mut states = SolutionArray::new(self.reactor.contents().mechanism());
        for i in 0..rows {
            let state: Vec<f64> = trajectory.y.row(i).iter().copied().collect();
            let gas = self.reactor.gas_at(state[0], state[1], &state[2..])?;
            states.push(trajectory.t[i], &gas)?;
        }
        Ok(states)
    }

    /// Integrate to `t_end` keeping only the final state.
    pub fn advance(&mut self, t_end: f64) -> Result<(), ReactorError> {
        self.check_target(t_end)?;
        let trajectory = self.solve_interval(t_end)?;
        self.sync_to_row(&trajectory, trajectory.t.len() - 1)
    }

    /// Integrate to `t_end` and return every solver point, the initial state included.
    pub fn integrate(&mut self, t_end: f64) -> Result<SolutionArray, ReactorError> {
        self.check_target(t_end)?;
        let trajectory = self.solve_interval(t_end)?;
        let states = self.to_array(&trajectory, trajectory.t.len())?;
        self.sync_to_row(&trajectory, trajectory.t.len() - 1)?;
        Ok(states)
    }

    /// Integrate to `t_end` and keep the trajectory up to the first point where `stop`
    /// holds. On a stop the reactor is left at that point, so a later call resumes from it.
    pub fn integrate_until(
        &mut self,
        t_end: f64,
        stop: StopCondition,
    ) -> Result<IntegrationOutcome, ReactorError> {
        self.check_target(t_end)?;
        let trajectory = self.solve_interval(t_end)?;
        let T = trajectory.y.column(1);
        let threshold = stop.threshold();
        let crossing = (0..T.len()).find(|&i| T[i] > threshold);
        let (rows, stop_time) = match crossing {
            Some(0) => (1, Some(trajectory.t[0])),
            Some(i) => {
                let (t0, t1) = (trajectory.t[i - 1], trajectory.t[i]);
                let (T0, T1) = (T[i - 1], T[i]);
                let t_cross = t0 + (threshold - T0) * (t1 - t0) / (T1 - T0);
                (i + 1, Some(t_cross))
            }
            None => (T.len(), None),
        };
        match stop_time {
            Some(t) => info!("{} reached {:.2} K at t = {:.6e} s", self.reactor.name(), threshold, t),
            None => info!(
                "{} stayed below {:.2} K up to t = {:.4e} s",
                self.reactor.name(),
                threshold,
                trajectory.t[T.len() - 1]
            ),
        }
        let states = self.to_array(&trajectory, rows)?;
        self.sync_to_row(&trajectory, rows - 1)?;
        Ok(IntegrationOutcome { states, stop_time })
    }
}
