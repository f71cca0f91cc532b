/// NASA 7-coefficient polynomials, numeric and symbolic evaluation
pub mod nasa7;
/// gas state: temperature, pressure and composition of an ideal-gas mixture bound to a mechanism,
/// with the usual mixture properties (density, heat capacities, enthalpy, internal energy, entropy)
/// and the production rates at that state
pub mod solution;
/// composition strings, equivalence-ratio mixtures and the methane/air recipes used by the studies
pub mod mixture;
/// chemical equilibrium of the ideal-gas mixture at fixed (T, P) or (H, P) by the element
/// potential method
pub mod equilibrium;
#[cfg(test)]
mod thermo_tests;

use thiserror::Error;

/// Universal gas constant in J/(mol·K)
pub const R_G: f64 = 8.314462618;
/// Pa
pub const ONE_ATM: f64 = 101325.0;
/// reference pressure of the standard-state properties, Pa
pub const P_REF: f64 = ONE_ATM;

#[derive(Debug, Error)]
pub enum ThermoError {
    #[error("invalid thermodynamic data: {0}")]
    InvalidThermo(String),
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid composition: {0}")]
    InvalidComposition(String),
    #[error("equilibrium did not converge after {iterations} iterations ({reason})")]
    EquilibriumFailed { iterations: usize, reason: String },
}
