//! Composition helpers: `"CH4:1, O2:2"` strings, oxygen demand of a mixture and the
//! methane/air recipes used by the studies.
use super::ThermoError;
use crate::Mechanism::Mechanism;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// molar N2/O2 ratio of air
pub const AIR_N2_O2: f64 = 3.76;

fn item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([^\s:,]+)\s*:\s*([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)\s*$")
            .expect("valid composition regex")
    })
}

/// Parse `"CH4:1, O2:2, N2:7.52"` into a species -> amount map.
pub fn parse_composition(text: &str) -> Result<HashMap<String, f64>, ThermoError> {
    let mut composition = HashMap::new();
    for item in text.split(',').filter(|s| !s.trim().is_empty()) {
        let caps = item_regex()
            .captures(item)
            .ok_or_else(|| ThermoError::InvalidComposition(format!("cannot parse '{}'", item.trim())))?;
        let value: f64 = caps[2]
            .parse()
            .map_err(|_| ThermoError::InvalidComposition(format!("bad number in '{}'", item.trim())))?;
        *composition.entry(caps[1].to_owned()).or_insert(0.0) += value;
    }
    if composition.is_empty() {
        return Err(ThermoError::InvalidComposition("empty composition".to_owned()));
    }
    Ok(composition)
}

/// O2 molecules needed to burn one mole of the (normalised) mixture to CO2 and H2O;
/// negative for oxidizers.
pub fn oxygen_demand(mechanism: &Mechanism, composition: &HashMap<String, f64>) -> Result<f64, ThermoError> {
    let total: f64 = composition.values().sum();
    if total <= 0.0 {
        return Err(ThermoError::InvalidComposition("amounts sum to zero".to_owned()));
    }
    let mut demand = 0.0;
    for (name, amount) in composition {
        let k = mechanism
            .species_index(name)
            .ok_or_else(|| ThermoError::UnknownSpecies(name.clone()))?;
        let s = &mechanism.species[k];
        let per_molecule = s.atoms("C") + 0.25 * s.atoms("H") + s.atoms("S") - 0.5 * s.atoms("O");
        demand += amount / total * per_molecule;
    }
    Ok(demand)
}

/// Moles of fuel per mole of oxidizer at equivalence ratio `phi`, and the resulting mixture
pub fn equivalence_ratio_mixture(
    mechanism: &Mechanism,
    phi: f64,
    fuel: &HashMap<String, f64>,
    oxidizer: &HashMap<String, f64>,
) -> Result<HashMap<String, f64>, ThermoError> {
    if !(phi.is_finite() && phi > 0.0) {
        return Err(ThermoError::InvalidComposition(format!(
            "equivalence ratio must be positive, got {}",
            phi
        )));
    }
    let z_fuel = oxygen_demand(mechanism, fuel)?;
    let z_ox = oxygen_demand(mechanism, oxidizer)?;
    if z_fuel <= 0.0 {
        return Err(ThermoError::InvalidComposition("fuel has no oxygen demand".to_owned()));
    }
    if z_ox >= 0.0 {
        return Err(ThermoError::InvalidComposition("oxidizer carries no free oxygen".to_owned()));
    }
    let fuel_per_oxidizer = phi * (-z_ox / z_fuel);
    let fuel_total: f64 = fuel.values().sum();
    let ox_total: f64 = oxidizer.values().sum();
    let mut mixture: HashMap<String, f64> = HashMap::new();
    for (name, amount) in fuel {
        *mixture.entry(name.clone()).or_insert(0.0) += fuel_per_oxidizer * amount / fuel_total;
    }
    for (name, amount) in oxidizer {
        *mixture.entry(name.clone()).or_insert(0.0) += amount / ox_total;
    }
    Ok(mixture)
}

/// How the methane/air mixture of a given equivalence ratio is composed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MixtureRule {
    /// CH4 : O2 : N2 = phi : 2 : 7.52
    Stoichiometric,
    /// CH4 : O2 : N2 = phi : 2/phi : 7.52/phi, the recipe of the reference runs
    /// (its actual equivalence ratio is phi^2)
    #[default]
    Legacy,
}

pub fn methane_air(phi: f64, rule: MixtureRule) -> Result<HashMap<String, f64>, ThermoError> {
    if !(phi.is_finite() && phi > 0.0) {
        return Err(ThermoError::InvalidComposition(format!(
            "equivalence ratio must be positive, got {}",
            phi
        )));
    }
    let (o2, n2) = match rule {
        MixtureRule::Stoichiometric => (2.0, 2.0 * AIR_N2_O2),
        MixtureRule::Legacy => (2.0 / phi, 2.0 * AIR_N2_O2 / phi),
    };
    Ok(HashMap::from([
        ("CH4".to_owned(), phi),
        ("O2".to_owned(), o2),
        ("N2".to_owned(), n2),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mechanism::mechanism_tests::bundled_bfer;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_composition() {
        let c = parse_composition("CH4:1, O2:2,N2: 7.52").unwrap();
        assert_eq!(c.len(), 3);
        assert_relative_eq!(c["N2"], 7.52);
        let c = parse_composition("O:2.5e-3, O:1e-3").unwrap();
        assert_relative_eq!(c["O"], 3.5e-3);
        assert!(parse_composition("CH4=1").is_err());
        assert!(parse_composition("").is_err());
    }

    #[test]
    fn test_oxygen_demand() {
        let mech = bundled_bfer();
        let fuel = HashMap::from([("CH4".to_owned(), 1.0)]);
        assert_relative_eq!(oxygen_demand(&mech, &fuel).unwrap(), 2.0);
        let air = HashMap::from([("O2".to_owned(), 1.0), ("N2".to_owned(), 3.76)]);
        assert_relative_eq!(oxygen_demand(&mech, &air).unwrap(), -1.0 / 4.76, max_relative = 1e-12);
        let bogus = HashMap::from([("C8H18".to_owned(), 1.0)]);
        assert!(matches!(oxygen_demand(&mech, &bogus), Err(ThermoError::UnknownSpecies(_))));
    }

    #[test]
    fn test_equivalence_ratio_mixture_matches_recipe() {
        let mech = bundled_bfer();
        let fuel = HashMap::from([("CH4".to_owned(), 1.0)]);
        let air = HashMap::from([("O2".to_owned(), 1.0), ("N2".to_owned(), 3.76)]);
        for phi in [0.3, 1.0, 1.5] {
            let mix = equivalence_ratio_mixture(&mech, phi, &fuel, &air).unwrap();
            let recipe = methane_air(phi, MixtureRule::Stoichiometric).unwrap();
            // same ratios
            assert_relative_eq!(mix["CH4"] / mix["O2"], recipe["CH4"] / recipe["O2"], max_relative = 1e-12);
            assert_relative_eq!(mix["N2"] / mix["O2"], recipe["N2"] / recipe["O2"], max_relative = 1e-12);
        }
        assert!(equivalence_ratio_mixture(&mech, 0.0, &fuel, &air).is_err());
        assert!(equivalence_ratio_mixture(&mech, 1.0, &air, &fuel).is_err());
    }

    #[test]
    fn test_legacy_recipe() {
        let legacy = methane_air(0.5, MixtureRule::Legacy).unwrap();
        assert_relative_eq!(legacy["O2"], 4.0);
        assert_relative_eq!(legacy["N2"], 15.04);
        assert!(methane_air(-1.0, MixtureRule::Legacy).is_err());
        assert!(methane_air(f64::NAN, MixtureRule::Stoichiometric).is_err());
    }
}
