/// eng
/// Reaction mechanisms: species with their elemental composition and NASA7 thermodynamics,
/// and reactions with elementary, three-body and falloff rate laws.
/// Mechanisms are read from Cantera-format YAML files (or the same schema written as JSON);
/// all rate parameters are converted to SI-mol units on load.
/// # Examples
/// ```no_run
/// use methane_reactors::Mechanism::Mechanism;
/// let mech = Mechanism::from_file("data/ch4_bfer.yaml").unwrap();
/// println!("{} species, {} reactions", mech.n_species(), mech.n_reactions());
/// ```
pub mod gas_mechanism;
/// atomic masses, molar masses and the element composition matrix
pub mod elements;
/// unit systems of mechanism files and conversion to SI-mol
pub mod units;
pub mod species;
/// reaction equations and rate-constant models (Arrhenius, three-body, Lindemann/Troe falloff)
pub mod reactions;
/// serde schema of Cantera YAML/JSON input and its conversion into a [`Mechanism`]
pub mod mechanism_loader;

pub use gas_mechanism::Mechanism;

use crate::Thermodynamics::ThermoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MechanismError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported mechanism format '{0}', expected .yaml, .yml or .json")]
    UnsupportedFormat(String),
    #[error("unsupported unit: {0}")]
    UnsupportedUnit(String),
    #[error("unknown element: {0}")]
    UnknownElement(String),
    #[error("unknown species '{species}' in {context}")]
    UnknownSpecies { species: String, context: String },
    #[error("invalid species: {0}")]
    InvalidSpecies(String),
    #[error("invalid equation '{equation}': {reason}")]
    InvalidEquation { equation: String, reason: String },
    #[error("reaction '{equation}' is not balanced in element {element}")]
    UnbalancedReaction { equation: String, element: String },
    #[error("unsupported reaction type '{kind}' in '{equation}'")]
    UnsupportedReaction { kind: String, equation: String },
    #[error("missing field '{field}' in {context}")]
    MissingField { field: String, context: String },
    #[error("no phase '{0}' in mechanism")]
    UnknownPhase(String),
    #[error(transparent)]
    Thermo(#[from] ThermoError),
}
