//! Serde schema of Cantera mechanism input and its conversion into a [`Mechanism`].
//!
//! Supported subset:
//! - `units` block (length, quantity, activation-energy, time, energy)
//! - `phases` with `elements` and `species` given as a list of names, `all`, or
//!   `{section: all | [names]}` references to species sections
//! - species with `composition` and `thermo: {model: NASA7}`
//! - reactions of type `elementary`, `three-body` and `falloff` (Lindemann or Troe),
//!   with `efficiencies`, `default-efficiency`, `duplicate` and `orders`
use super::MechanismError;
use super::elements::canonical_symbol;
use super::gas_mechanism::Mechanism;
use super::reactions::{Arrhenius, Collider, RateModel, Reaction, ThirdBodyMark, Troe, parse_equation};
use super::species::Species;
use super::units::{UnitSystem, UnitsInput};
use crate::Thermodynamics::nasa7::Nasa7;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanteraInput {
    #[serde(default)]
    pub units: UnitsInput,
    pub phases: Vec<PhaseInput>,
    #[serde(default)]
    pub species: Vec<SpeciesInput>,
    #[serde(default)]
    pub reactions: Vec<ReactionInput>,
    /// other top-level keys: named species or reaction sections, metadata
    #[serde(flatten)]
    pub sections: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseInput {
    pub name: String,
    #[serde(default)]
    pub thermo: Option<String>,
    pub elements: Vec<String>,
    pub species: SpeciesSelection,
    #[serde(default)]
    pub kinetics: Option<String>,
    #[serde(default)]
    pub reactions: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeciesSelection {
    /// `species: all`
    All(String),
    List(Vec<SpeciesEntry>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeciesEntry {
    Name(String),
    /// `{section-name: all}` or `{section-name: [A, B]}`
    Section(HashMap<String, Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesInput {
    pub name: String,
    pub composition: BTreeMap<String, f64>,
    pub thermo: ThermoInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermoInput {
    pub model: String,
    #[serde(rename = "temperature-ranges", default)]
    pub temperature_ranges: Vec<f64>,
    #[serde(default)]
    pub data: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrheniusInput {
    pub A: f64,
    pub b: f64,
    pub Ea: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TroeInput {
    pub A: f64,
    pub T3: f64,
    pub T1: f64,
    #[serde(default)]
    pub T2: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionInput {
    pub equation: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "rate-constant", default)]
    pub rate_constant: Option<ArrheniusInput>,
    #[serde(rename = "low-P-rate-constant", default)]
    pub low_p_rate_constant: Option<ArrheniusInput>,
    #[serde(rename = "high-P-rate-constant", default)]
    pub high_p_rate_constant: Option<ArrheniusInput>,
    #[serde(rename = "Troe", default)]
    pub troe: Option<TroeInput>,
    #[serde(rename = "SRI", default)]
    pub sri: Option<Value>,
    #[serde(default)]
    pub efficiencies: Option<BTreeMap<String, f64>>,
    #[serde(rename = "default-efficiency", default)]
    pub default_efficiency: Option<f64>,
    #[serde(default)]
    pub duplicate: Option<bool>,
    #[serde(default)]
    pub orders: Option<BTreeMap<String, f64>>,
    #[serde(rename = "negative-orders", default)]
    pub negative_orders: Option<bool>,
    #[serde(rename = "nonreactant-orders", default)]
    pub nonreactant_orders: Option<bool>,
}

pub fn build_mechanism(input: CanteraInput, phase: Option<&str>) -> Result<Mechanism, MechanismError> {
    let units = UnitSystem::from_input(&input.units)?;
    let phase_input = match phase {
        Some(name) => input
            .phases
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| MechanismError::UnknownPhase(name.to_owned()))?,
        None => input
            .phases
            .first()
            .ok_or_else(|| MechanismError::UnknownPhase("<first>".to_owned()))?,
    };
    if let Some(thermo) = &phase_input.thermo {
        if thermo != "ideal-gas" {
            warn!("phase {} declares thermo model '{}', treated as ideal gas", phase_input.name, thermo);
        }
    }
    let elements = phase_input
        .elements
        .iter()
        .map(|e| {
            canonical_symbol(e)
                .map(str::to_owned)
                .ok_or_else(|| MechanismError::UnknownElement(e.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let species_inputs = select_species(&input, phase_input)?;
    let mut species = Vec::with_capacity(species_inputs.len());
    for s in species_inputs {
        species.push(convert_species(&s)?);
    }
    let index: HashMap<String, usize> = species
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.clone(), i))
        .collect();

    let reaction_inputs = select_reactions(&input, phase_input)?;
    let mut reactions = Vec::with_capacity(reaction_inputs.len());
    for r in &reaction_inputs {
        reactions.push(convert_reaction(r, &index, &units)?);
    }
    debug!(
        "phase {}: {} elements, {} species, {} reactions",
        phase_input.name,
        elements.len(),
        species.len(),
        reactions.len()
    );
    Mechanism::new(&phase_input.name, elements, species, reactions)
}

fn section_species(input: &CanteraInput, section: &str) -> Result<Vec<SpeciesInput>, MechanismError> {
    if section == "species" {
        return Ok(input.species.clone());
    }
    let value = input.sections.get(section).ok_or_else(|| MechanismError::MissingField {
        field: section.to_owned(),
        context: "species sections".to_owned(),
    })?;
    Ok(serde_json::from_value(value.clone())?)
}

fn select_species(input: &CanteraInput, phase: &PhaseInput) -> Result<Vec<SpeciesInput>, MechanismError> {
    let pick = |pool: &[SpeciesInput], name: &str| -> Result<SpeciesInput, MechanismError> {
        pool.iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| MechanismError::UnknownSpecies {
                species: name.to_owned(),
                context: format!("phase {}", phase.name),
            })
    };
    let mut selected = Vec::new();
    match &phase.species {
        SpeciesSelection::All(all) if all == "all" => selected = input.species.clone(),
        SpeciesSelection::All(other) => {
            return Err(MechanismError::MissingField {
                field: format!("species '{}'", other),
                context: format!("phase {}", phase.name),
            });
        }
        SpeciesSelection::List(entries) => {
            for entry in entries {
                match entry {
                    SpeciesEntry::Name(name) => selected.push(pick(&input.species, name)?),
                    SpeciesEntry::Section(map) => {
                        for (section, which) in map {
                            let pool = section_species(input, section)?;
                            match which {
                                Value::String(s) if s == "all" => selected.extend(pool),
                                Value::Array(names) => {
                                    for name in names.iter().filter_map(|n| n.as_str()) {
                                        selected.push(pick(&pool, name)?);
                                    }
                                }
                                other => {
                                    return Err(MechanismError::MissingField {
                                        field: format!("species list, got {}", other),
                                        context: format!("section {}", section),
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(selected)
}

fn select_reactions(input: &CanteraInput, phase: &PhaseInput) -> Result<Vec<ReactionInput>, MechanismError> {
    if let Some(kinetics) = &phase.kinetics {
        if kinetics == "none" {
            return Ok(Vec::new());
        }
    }
    match &phase.reactions {
        None => Ok(input.reactions.clone()),
        Some(Value::String(s)) if s == "all" || s == "declared-species" => Ok(input.reactions.clone()),
        Some(Value::String(s)) if s == "none" => Ok(Vec::new()),
        Some(Value::Array(sections)) => {
            let mut all = Vec::new();
            for section in sections.iter().filter_map(|s| s.as_str()) {
                if section == "reactions" {
                    all.extend(input.reactions.iter().cloned());
                } else {
                    let value = input.sections.get(section).ok_or_else(|| MechanismError::MissingField {
                        field: section.to_owned(),
                        context: "reaction sections".to_owned(),
                    })?;
                    let list: Vec<ReactionInput> = serde_json::from_value(value.clone())?;
                    all.extend(list);
                }
            }
            Ok(all)
        }
        Some(other) => Err(MechanismError::MissingField {
            field: format!("reactions, got {}", other),
            context: format!("phase {}", phase.name),
        }),
    }
}

fn convert_species(input: &SpeciesInput) -> Result<Species, MechanismError> {
    if input.thermo.model != "NASA7" {
        return Err(MechanismError::InvalidSpecies(format!(
            "{}: thermo model '{}' is not supported, only NASA7",
            input.name, input.thermo.model
        )));
    }
    let thermo = Nasa7::new(input.thermo.temperature_ranges.clone(), input.thermo.data.clone())?;
    let mut composition = BTreeMap::new();
    for (element, count) in &input.composition {
        let symbol = canonical_symbol(element).ok_or_else(|| MechanismError::UnknownElement(element.clone()))?;
        composition.insert(symbol.to_owned(), *count);
    }
    Species::new(&input.name, composition, thermo)
}

fn arrhenius(input: &ArrheniusInput, units: &UnitSystem, order: f64) -> Arrhenius {
    Arrhenius::new(
        input.A * units.pre_exponential_factor(order),
        input.b,
        input.Ea * units.activation_energy,
    )
}

fn lookup(index: &HashMap<String, usize>, name: &str, equation: &str) -> Result<usize, MechanismError> {
    index.get(name).copied().ok_or_else(|| MechanismError::UnknownSpecies {
        species: name.to_owned(),
        context: format!("reaction '{}'", equation),
    })
}

fn convert_reaction(
    input: &ReactionInput,
    index: &HashMap<String, usize>,
    units: &UnitSystem,
) -> Result<Reaction, MechanismError> {
    let equation = input.equation.as_str();
    let parsed = parse_equation(equation)?;
    let kind = input.kind.clone().unwrap_or_else(|| match parsed.third_body {
        ThirdBodyMark::ThreeBody => "three-body".to_owned(),
        ThirdBodyMark::Falloff(_) => "falloff".to_owned(),
        ThirdBodyMark::None => "elementary".to_owned(),
    });
    let unsupported = || MechanismError::UnsupportedReaction {
        kind: kind.clone(),
        equation: equation.to_owned(),
    };

    let side = |terms: &[(String, f64)]| -> Result<Vec<(usize, f64)>, MechanismError> {
        terms.iter().map(|(name, nu)| Ok((lookup(index, name, equation)?, *nu))).collect()
    };
    let reactants = side(&parsed.reactants)?;
    let products = side(&parsed.products)?;

    let mut orders = reactants.clone();
    if let Some(explicit) = &input.orders {
        for (name, order) in explicit {
            let k = lookup(index, name, equation)?;
            if *order < 0.0 && !input.negative_orders.unwrap_or(false) {
                return Err(MechanismError::InvalidEquation {
                    equation: equation.to_owned(),
                    reason: format!("negative order for {} without negative-orders", name),
                });
            }
            match orders.iter_mut().find(|(i, _)| *i == k) {
                Some((_, o)) => *o = *order,
                None if input.nonreactant_orders.unwrap_or(false) => orders.push((k, *order)),
                None => {
                    return Err(MechanismError::InvalidEquation {
                        equation: equation.to_owned(),
                        reason: format!("order for non-reactant {} without nonreactant-orders", name),
                    });
                }
            }
        }
    }
    let order: f64 = orders.iter().map(|(_, o)| o).sum();

    let collider = |mark: &ThirdBodyMark| -> Result<Collider, MechanismError> {
        if let ThirdBodyMark::Falloff(Some(name)) = mark {
            return Ok(Collider::Species(lookup(index, name, equation)?));
        }
        let mut efficiencies = Vec::new();
        if let Some(effs) = &input.efficiencies {
            for (name, eff) in effs {
                match index.get(name) {
                    Some(&k) => efficiencies.push((k, *eff)),
                    None => debug!("efficiency of undeclared species {} skipped in '{}'", name, equation),
                }
            }
        }
        Ok(Collider::Mixture {
            default_efficiency: input.default_efficiency.unwrap_or(1.0),
            efficiencies,
        })
    };

    let missing = |field: &str| MechanismError::MissingField {
        field: field.to_owned(),
        context: format!("reaction '{}'", equation),
    };
    let rate = match kind.as_str() {
        "elementary" => {
            if parsed.third_body != ThirdBodyMark::None {
                return Err(MechanismError::InvalidEquation {
                    equation: equation.to_owned(),
                    reason: "elementary reaction with a third body".to_owned(),
                });
            }
            let k = input.rate_constant.as_ref().ok_or_else(|| missing("rate-constant"))?;
            RateModel::Elementary(arrhenius(k, units, order))
        }
        "three-body" => {
            let k = input.rate_constant.as_ref().ok_or_else(|| missing("rate-constant"))?;
            match parsed.third_body {
                ThirdBodyMark::ThreeBody => RateModel::ThreeBody {
                    rate: arrhenius(k, units, order + 1.0),
                    collider: collider(&parsed.third_body)?,
                },
                // explicit collider written as a species, e.g. `2 O + AR <=> O2 + AR`
                ThirdBodyMark::None => RateModel::Elementary(arrhenius(k, units, order)),
                ThirdBodyMark::Falloff(_) => {
                    return Err(MechanismError::InvalidEquation {
                        equation: equation.to_owned(),
                        reason: "three-body reaction written with (+M)".to_owned(),
                    });
                }
            }
        }
        "falloff" => {
            if !matches!(parsed.third_body, ThirdBodyMark::Falloff(_)) {
                return Err(MechanismError::InvalidEquation {
                    equation: equation.to_owned(),
                    reason: "falloff reaction without (+M)".to_owned(),
                });
            }
            if input.sri.is_some() {
                return Err(unsupported());
            }
            let low = input.low_p_rate_constant.as_ref().ok_or_else(|| missing("low-P-rate-constant"))?;
            let high = input.high_p_rate_constant.as_ref().ok_or_else(|| missing("high-P-rate-constant"))?;
            RateModel::Falloff {
                low: arrhenius(low, units, order + 1.0),
                high: arrhenius(high, units, order),
                troe: input.troe.as_ref().map(|t| Troe {
                    A: t.A,
                    T3: t.T3,
                    T1: t.T1,
                    T2: t.T2,
                }),
                collider: collider(&parsed.third_body)?,
            }
        }
        _ => return Err(unsupported()),
    };

    Ok(Reaction {
        equation: equation.to_owned(),
        reactants,
        products,
        orders,
        reversible: parsed.reversible,
        duplicate: input.duplicate.unwrap_or(false),
        rate,
    })
}
