use super::MechanismError;
use super::elements::molar_mass;
use crate::Thermodynamics::nasa7::Nasa7;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A gas-phase species: elemental composition, molar mass and NASA7 thermo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub composition: BTreeMap<String, f64>,
    /// kg/mol
    pub molar_mass: f64,
    pub thermo: Nasa7,
}

impl Species {
    pub fn new(
        name: &str,
        composition: BTreeMap<String, f64>,
        thermo: Nasa7,
    ) -> Result<Self, MechanismError> {
        if composition.is_empty() {
            return Err(MechanismError::InvalidSpecies(format!(
                "{}: empty composition",
                name
            )));
        }
        if composition.values().any(|&n| n < 0.0) {
            return Err(MechanismError::InvalidSpecies(format!(
                "{}: negative atom count",
                name
            )));
        }
        let molar_mass = molar_mass(&composition)?;
        Ok(Self {
            name: name.to_owned(),
            composition,
            molar_mass,
            thermo,
        })
    }

    /// number of atoms of `element` in one molecule
    pub fn atoms(&self, element: &str) -> f64 {
        self.composition.get(element).copied().unwrap_or(0.0)
    }
}
