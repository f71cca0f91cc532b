//! Balance equations of a well-stirred ideal-gas reactor.
//!
//! State: mass m [kg], temperature T [K], mass fractions Y_k.
//!
//! dm/dt = sum(mdot_in) - sum(mdot_out)
//!
//! m dY_k/dt = V w_k W_k + sum_in mdot_in (Y_k,in - Y_k)
//!
//! constant volume:
//! m c_v dT/dt = sum_in mdot_in (h_in - sum_k u_k Y_k,in / W_k) - (R T / W) sum(mdot_out) - V sum_k u_k w_k
//!
//! constant pressure:
//! m c_p dT/dt = sum_in mdot_in (h_in - sum_k h_k Y_k,in / W_k) - V sum_k h_k w_k
//!
//! h_k, u_k are molar, h_in is the specific enthalpy of the inlet reservoir, W the mean molar mass.
use super::reactors::{EnergyClosure, Reactor, ReactorModel};
use crate::Kinetics::rates::net_production_rates;
use crate::Kinetics::scalar::{Scalar, sum};
use crate::Thermodynamics::R_G;
use RustedSciThe::symbolic::symbolic_engine::Expr;

pub const TIME: &str = "t";
pub const MASS: &str = "m";
pub const TEMPERATURE: &str = "T";
pub const MASS_FRACTION: &str = "Y";

/// Right-hand side of the reactor ODE at (m, T, Y).
pub fn reactor_rhs<S: Scalar>(reactor: &Reactor, m: &S, T: &S, Y: &[S]) -> Vec<S> {
    let mechanism = reactor.contents().mechanism();
    let W = mechanism.molar_masses();
    let K = W.len();

    let inv_W_mean = sum(Y.iter().zip(&W).map(|(y, w)| y.clone() * S::cst(1.0 / w)));
    let closure = reactor.energy_closure();
    let (rho, V) = match closure {
        EnergyClosure::ConstantVolume { volume } => (m.clone() / S::cst(volume), S::cst(volume)),
        EnergyClosure::ConstantPressure { pressure } => {
            let rho = S::cst(pressure / R_G) / (T.clone() * inv_W_mean.clone());
            (rho.clone(), m.clone() / rho)
        }
    };
    let C: Vec<S> = Y
        .iter()
        .zip(&W)
        .map(|(y, w)| rho.clone() * y.clone() * S::cst(1.0 / w))
        .collect();
    let wdot = net_production_rates(mechanism, T, &C);

    // molar enthalpies, J/mol
    let RT = S::cst(R_G) * T.clone();
    let h: Vec<S> = mechanism
        .species
        .iter()
        .map(|s| s.thermo.h_RT(T) * RT.clone())
        .collect();
    let cp_mass = sum(mechanism
        .species
        .iter()
        .zip(Y)
        .zip(&W)
        .map(|((s, y), w)| s.thermo.cp_R(T) * y.clone() * S::cst(R_G / w)));

    let mdot_out = reactor.mass_outflow();
    let mdot_in = reactor.mass_inflow();
    let dm = S::cst(mdot_in - mdot_out);

    let mut dY = Vec::with_capacity(K);
    for k in 0..K {
        let mut terms = vec![V.clone() * wdot[k].clone() * S::cst(W[k])];
        for inlet in reactor.inlets() {
            let mdot = inlet.controller.mass_flow_rate();
            if mdot > 0.0 {
                terms.push(S::cst(mdot) * (S::cst(inlet.upstream.Y()[k]) - Y[k].clone()));
            }
        }
        dY.push(sum(terms) / m.clone());
    }

    // per-species energy carried by reactions and inflow: h_k or u_k = h_k - RT
    let e: Vec<S> = match closure {
        EnergyClosure::ConstantVolume { .. } => h.iter().map(|h| h.clone() - RT.clone()).collect(),
        EnergyClosure::ConstantPressure { .. } => h,
    };
    let mut energy = vec![-(V * sum(e.iter().zip(&wdot).map(|(e, w)| e.clone() * w.clone())))];
    for inlet in reactor.inlets() {
        let mdot = inlet.controller.mass_flow_rate();
        if mdot == 0.0 {
            continue;
        }
        let carried = sum(e
            .iter()
            .zip(inlet.upstream.Y())
            .zip(&W)
            .filter(|((_, y_in), _)| **y_in > 0.0)
            .map(|((e, y_in), w)| e.clone() * S::cst(y_in / w)));
        energy.push(S::cst(mdot) * (S::cst(inlet.upstream.enthalpy_mass()) - carried));
    }
    let heat_capacity = match closure {
        EnergyClosure::ConstantVolume { .. } => {
            if mdot_out > 0.0 {
                energy.push(-(S::cst(mdot_out) * RT.clone() * inv_W_mean.clone()));
            }
            cp_mass - S::cst(R_G) * inv_W_mean
        }
        EnergyClosure::ConstantPressure { .. } => cp_mass,
    };
    let dT = sum(energy) / (m.clone() * heat_capacity);

    let mut rhs = Vec::with_capacity(K + 2);
    rhs.push(dm);
    rhs.push(dT);
    rhs.extend(dY);
    rhs
}

/// Symbolic right-hand side and the names of the unknowns, in state order.
pub fn symbolic_system(reactor: &Reactor) -> (Vec<Expr>, Vec<String>) {
    let K = reactor.contents().n_species();
    let Y_names: Vec<String> = (0..K).map(|k| format!("{}{}", MASS_FRACTION, k)).collect();
    let Y: Vec<Expr> = Y_names.iter().map(|name| Expr::Var(name.clone())).collect();
    let m = Expr::Var(MASS.to_owned());
    let T = Expr::Var(TEMPERATURE.to_owned());
    let equations = reactor_rhs(reactor, &m, &T, &Y)
        .into_iter()
        .map(|e| e.simplified())
        .collect();
    let mut unknowns = vec![MASS.to_owned(), TEMPERATURE.to_owned()];
    unknowns.extend(Y_names);
    (equations, unknowns)
}

/// Numeric right-hand side at the state vector [m, T, Y..].
pub fn numeric_rhs(reactor: &Reactor, state: &[f64]) -> Vec<f64> {
    reactor_rhs(reactor, &state[0], &state[1], &state[2..])
}

/// Current state vector [m, T, Y..] of the reactor.
pub fn state_vector(reactor: &Reactor) -> Vec<f64> {
    let gas = reactor.contents();
    let mut state = vec![reactor.mass(), gas.T()];
    state.extend_from_slice(gas.Y());
    state
}
