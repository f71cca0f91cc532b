use super::MechanismError;
use super::elements::create_elem_composition_matrix;
use super::mechanism_loader::{CanteraInput, build_mechanism};
use super::reactions::Reaction;
use super::species::Species;
use log::info;
use nalgebra::DMatrix;
use prettytable::{Table, row};
use std::collections::HashMap;
use std::path::Path;

/// Species and reactions of one gas phase
#[derive(Debug, Clone)]
pub struct Mechanism {
    pub name: String,
    pub elements: Vec<String>,
    pub species: Vec<Species>,
    pub reactions: Vec<Reaction>,
    species_map: HashMap<String, usize>,
}

impl Mechanism {
    pub fn new(
        name: &str,
        elements: Vec<String>,
        species: Vec<Species>,
        reactions: Vec<Reaction>,
    ) -> Result<Self, MechanismError> {
        let mut species_map = HashMap::new();
        for (i, s) in species.iter().enumerate() {
            if species_map.insert(s.name.clone(), i).is_some() {
                return Err(MechanismError::InvalidSpecies(format!(
                    "{} declared twice",
                    s.name
                )));
            }
            for element in s.composition.keys() {
                if !elements.contains(element) {
                    return Err(MechanismError::UnknownElement(format!(
                        "{} (species {}) is not declared in the phase",
                        element, s.name
                    )));
                }
            }
        }
        let mechanism = Self {
            name: name.to_owned(),
            elements,
            species,
            reactions,
            species_map,
        };
        mechanism.check_balance()?;
        Ok(mechanism)
    }

    /// Read a Cantera mechanism. `.yaml`/`.yml` files are parsed as YAML, `.json` as JSON;
    /// the legacy XML and CTI formats are not supported.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MechanismError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let mechanism = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&std::fs::read_to_string(path)?)?,
            "json" => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            other => return Err(MechanismError::UnsupportedFormat(other.to_owned())),
        };
        info!(
            "loaded mechanism {} from {}: {} species, {} reactions",
            mechanism.name,
            path.display(),
            mechanism.n_species(),
            mechanism.n_reactions()
        );
        Ok(mechanism)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, MechanismError> {
        let value: serde_json::Value = serde_yaml::from_str(text)?;
        Self::from_value(value, None)
    }

    pub fn from_json_str(text: &str) -> Result<Self, MechanismError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(value, None)
    }

    /// Build the named phase of a parsed input document (first phase if `phase` is `None`).
    pub fn from_value(value: serde_json::Value, phase: Option<&str>) -> Result<Self, MechanismError> {
        let input: CanteraInput = serde_json::from_value(value)?;
        build_mechanism(input, phase)
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }
    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }
    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species_map.get(name).copied()
    }
    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }
    /// kg/mol
    pub fn molar_masses(&self) -> Vec<f64> {
        self.species.iter().map(|s| s.molar_mass).collect()
    }

    /// element composition matrix, species x elements
    pub fn element_matrix(&self) -> DMatrix<f64> {
        let compositions: Vec<_> = self.species.iter().map(|s| &s.composition).collect();
        create_elem_composition_matrix(&compositions, &self.elements)
    }

    fn check_balance(&self) -> Result<(), MechanismError> {
        for reaction in &self.reactions {
            for element in &self.elements {
                let atoms = |side: &[(usize, f64)]| -> f64 {
                    side.iter()
                        .map(|(k, nu)| nu * self.species[*k].atoms(element))
                        .sum()
                };
                let imbalance = atoms(&reaction.products) - atoms(&reaction.reactants);
                if imbalance.abs() > 1e-6 {
                    return Err(MechanismError::UnbalancedReaction {
                        equation: reaction.equation.clone(),
                        element: element.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(row!["#", "Equation", "Type", "Reversible"]);
        for (i, r) in self.reactions.iter().enumerate() {
            table.add_row(row![i, r.equation, r.rate.kind(), r.reversible]);
        }
        println!(
            "mechanism {}: elements {:?}, species {:?}",
            self.name,
            self.elements,
            self.species_names()
        );
        table.printstd();
    }
}
