/// Unit system of a mechanism file and conversion of rate parameters to SI-mol
/// (m, mol, s, J/mol).
use super::MechanismError;
use crate::Thermodynamics::R_G;
use serde::{Deserialize, Serialize};

/// Avogadro constant, 1/mol
const N_A: f64 = 6.02214076e23;
/// Faraday constant, C/mol
const FARADAY: f64 = 96485.33212;

/// `units:` block as written in the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitsInput {
    pub length: Option<String>,
    pub quantity: Option<String>,
    #[serde(rename = "activation-energy")]
    pub activation_energy: Option<String>,
    pub time: Option<String>,
    pub pressure: Option<String>,
    pub energy: Option<String>,
    pub mass: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSystem {
    /// metres per length unit
    pub length: f64,
    /// moles per quantity unit
    pub quantity: f64,
    /// J/mol per activation-energy unit
    pub activation_energy: f64,
    /// seconds per time unit
    pub time: f64,
}

impl Default for UnitSystem {
    /// defaults of Cantera input files: m, kmol, s, J/kmol
    fn default() -> Self {
        Self {
            length: 1.0,
            quantity: 1000.0,
            activation_energy: 1e-3,
            time: 1.0,
        }
    }
}

impl UnitSystem {
    pub fn from_input(input: &UnitsInput) -> Result<Self, MechanismError> {
        let mut units = UnitSystem::default();
        if let Some(length) = &input.length {
            units.length = length_factor(length)?;
        }
        if let Some(quantity) = &input.quantity {
            units.quantity = quantity_factor(quantity)?;
        }
        if let Some(time) = &input.time {
            units.time = match time.trim() {
                "s" => 1.0,
                "ms" => 1e-3,
                "us" => 1e-6,
                "min" => 60.0,
                "h" | "hr" => 3600.0,
                other => return Err(MechanismError::UnsupportedUnit(other.to_owned())),
            };
        }
        match &input.activation_energy {
            Some(ea) => units.activation_energy = activation_energy_factor(ea)?,
            None => {
                // without an explicit unit Ea follows energy/quantity
                let energy = match input.energy.as_deref().map(str::trim) {
                    None | Some("J") => 1.0,
                    Some("kJ") => 1e3,
                    Some("cal") => 4.184,
                    Some("kcal") => 4184.0,
                    Some(other) => return Err(MechanismError::UnsupportedUnit(other.to_owned())),
                };
                units.activation_energy = energy / units.quantity;
            }
        }
        Ok(units)
    }

    /// Factor taking a pre-exponential factor of a reaction of overall concentration order
    /// `order` to SI-mol units, (m^3/mol)^(order-1)/s.
    pub fn pre_exponential_factor(&self, order: f64) -> f64 {
        (self.length.powi(3) / self.quantity).powf(order - 1.0) / self.time
    }
}

fn length_factor(unit: &str) -> Result<f64, MechanismError> {
    match unit.trim() {
        "m" => Ok(1.0),
        "cm" => Ok(1e-2),
        "mm" => Ok(1e-3),
        other => Err(MechanismError::UnsupportedUnit(other.to_owned())),
    }
}

fn quantity_factor(unit: &str) -> Result<f64, MechanismError> {
    match unit.trim() {
        "mol" => Ok(1.0),
        "kmol" => Ok(1000.0),
        "molec" | "molecule" => Ok(1.0 / N_A),
        other => Err(MechanismError::UnsupportedUnit(other.to_owned())),
    }
}

fn activation_energy_factor(unit: &str) -> Result<f64, MechanismError> {
    match unit.trim().replace(' ', "").as_str() {
        "J/mol" => Ok(1.0),
        "kJ/mol" => Ok(1e3),
        "J/kmol" => Ok(1e-3),
        "kJ/kmol" => Ok(1.0),
        "cal/mol" => Ok(4.184),
        "kcal/mol" => Ok(4184.0),
        "cal/kmol" => Ok(4.184e-3),
        "K" => Ok(R_G),
        "eV" => Ok(FARADAY),
        other => Err(MechanismError::UnsupportedUnit(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_units() {
        let units = UnitSystem::from_input(&UnitsInput::default()).unwrap();
        assert_eq!(units, UnitSystem::default());
        // second order: m^3/kmol/s -> m^3/mol/s
        assert_relative_eq!(units.pre_exponential_factor(2.0), 1e-3);
    }

    #[test]
    fn test_cgs_units() {
        let input = UnitsInput {
            length: Some("cm".to_owned()),
            quantity: Some("mol".to_owned()),
            activation_energy: Some("cal/mol".to_owned()),
            ..Default::default()
        };
        let units = UnitSystem::from_input(&input).unwrap();
        assert_relative_eq!(units.activation_energy, 4.184);
        assert_relative_eq!(units.pre_exponential_factor(1.0), 1.0);
        assert_relative_eq!(units.pre_exponential_factor(2.0), 1e-6, max_relative = 1e-12);
        assert_relative_eq!(units.pre_exponential_factor(3.0), 1e-12, max_relative = 1e-12);
        // fractional global orders
        assert_relative_eq!(units.pre_exponential_factor(1.15), 1e-6_f64.powf(0.15), max_relative = 1e-12);
    }

    #[test]
    fn test_unsupported_unit() {
        let input = UnitsInput {
            length: Some("furlong".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            UnitSystem::from_input(&input),
            Err(MechanismError::UnsupportedUnit(_))
        ));
    }
}
