use super::equilibrium::{Constraint, EquilibriumReport, EquilibriumSettings, equilibrate};
use super::mixture::{equivalence_ratio_mixture, parse_composition};
use super::{P_REF, R_G, ThermoError};
use crate::Kinetics::rates;
use crate::Mechanism::Mechanism;
use prettytable::{Table, row};
use std::collections::HashMap;
use std::sync::Arc;

/// Ideal-gas mixture state (T, P, mass fractions) bound to a mechanism
#[derive(Debug, Clone)]
pub struct Solution {
    mechanism: Arc<Mechanism>,
    T: f64,
    P: f64,
    Y: Vec<f64>,
}

impl Solution {
    /// 300 K, one atmosphere, pure first species
    pub fn new(mechanism: Arc<Mechanism>) -> Self {
        let mut Y = vec![0.0; mechanism.n_species()];
        if let Some(first) = Y.first_mut() {
            *first = 1.0;
        }
        Self {
            mechanism,
            T: 300.0,
            P: super::ONE_ATM,
            Y,
        }
    }

    pub fn mechanism(&self) -> &Arc<Mechanism> {
        &self.mechanism
    }
    pub fn n_species(&self) -> usize {
        self.mechanism.n_species()
    }
    pub fn species_index(&self, name: &str) -> Result<usize, ThermoError> {
        self.mechanism
            .species_index(name)
            .ok_or_else(|| ThermoError::UnknownSpecies(name.to_owned()))
    }

    /// K
    pub fn T(&self) -> f64 {
        self.T
    }
    /// Pa
    pub fn P(&self) -> f64 {
        self.P
    }
    pub fn Y(&self) -> &[f64] {
        &self.Y
    }

    pub fn set_TP(&mut self, T: f64, P: f64) -> Result<(), ThermoError> {
        if !(T.is_finite() && T > 0.0) {
            return Err(ThermoError::InvalidState(format!("temperature must be positive, got {}", T)));
        }
        if !(P.is_finite() && P > 0.0) {
            return Err(ThermoError::InvalidState(format!("pressure must be positive, got {}", P)));
        }
        self.T = T;
        self.P = P;
        Ok(())
    }

    fn dense(&self, amounts: &HashMap<String, f64>) -> Result<Vec<f64>, ThermoError> {
        let mut v = vec![0.0; self.n_species()];
        for (name, amount) in amounts {
            if !(amount.is_finite() && *amount >= 0.0) {
                return Err(ThermoError::InvalidComposition(format!("{}: {}", name, amount)));
            }
            v[self.species_index(name)?] += amount;
        }
        Ok(v)
    }

    /// Set temperature, pressure and mole fractions; amounts are normalised.
    pub fn set_TPX(&mut self, T: f64, P: f64, X: &HashMap<String, f64>) -> Result<(), ThermoError> {
        let X = self.dense(X)?;
        let W = self.mechanism.molar_masses();
        let mass: Vec<f64> = X.iter().zip(&W).map(|(x, w)| x * w).collect();
        let Y = normalised(mass)?;
        self.set_TP(T, P)?;
        self.Y = Y;
        Ok(())
    }

    /// `gas.set_TPX_str(1300.0, ONE_ATM, "CH4:1, O2:2, N2:7.52")`
    pub fn set_TPX_str(&mut self, T: f64, P: f64, X: &str) -> Result<(), ThermoError> {
        let X = parse_composition(X)?;
        self.set_TPX(T, P, &X)
    }

    /// Set temperature, pressure and mass fractions; amounts are normalised.
    pub fn set_TPY(&mut self, T: f64, P: f64, Y: &HashMap<String, f64>) -> Result<(), ThermoError> {
        let Y = normalised(self.dense(Y)?)?;
        self.set_TP(T, P)?;
        self.Y = Y;
        Ok(())
    }

    /// Set the state from a full mass-fraction vector, e.g. an integrator state. Small negative
    /// values from the integrator are clipped before normalisation.
    pub fn set_TPY_vec(&mut self, T: f64, P: f64, Y: &[f64]) -> Result<(), ThermoError> {
        if Y.len() != self.n_species() {
            return Err(ThermoError::InvalidComposition(format!(
                "{} mass fractions for {} species",
                Y.len(),
                self.n_species()
            )));
        }
        if Y.iter().any(|y| !y.is_finite()) {
            return Err(ThermoError::InvalidComposition("non-finite mass fraction".to_owned()));
        }
        let Y = normalised(Y.iter().map(|y| y.max(0.0)).collect())?;
        self.set_TP(T, P)?;
        self.Y = Y;
        Ok(())
    }

    /// Mixture of `fuel` and `oxidizer` at equivalence ratio `phi`, keeping T and P.
    pub fn set_equivalence_ratio(
        &mut self,
        phi: f64,
        fuel: &HashMap<String, f64>,
        oxidizer: &HashMap<String, f64>,
    ) -> Result<(), ThermoError> {
        let X = equivalence_ratio_mixture(&self.mechanism, phi, fuel, oxidizer)?;
        self.set_TPX(self.T, self.P, &X)
    }

    pub fn X(&self) -> Vec<f64> {
        let W = self.mechanism.molar_masses();
        let W_mean = self.mean_molar_mass();
        self.Y.iter().zip(&W).map(|(y, w)| y * W_mean / w).collect()
    }

    pub fn mole_fraction(&self, name: &str) -> Result<f64, ThermoError> {
        let k = self.species_index(name)?;
        Ok(self.X()[k])
    }

    pub fn mass_fraction(&self, name: &str) -> Result<f64, ThermoError> {
        Ok(self.Y[self.species_index(name)?])
    }

    /// kg/mol
    pub fn mean_molar_mass(&self) -> f64 {
        let W = self.mechanism.molar_masses();
        1.0 / self.Y.iter().zip(&W).map(|(y, w)| y / w).sum::<f64>()
    }

    /// kg/m^3
    pub fn density(&self) -> f64 {
        self.P * self.mean_molar_mass() / (R_G * self.T)
    }

    /// mol/m^3
    pub fn concentrations(&self) -> Vec<f64> {
        let rho = self.density();
        let W = self.mechanism.molar_masses();
        self.Y.iter().zip(&W).map(|(y, w)| rho * y / w).collect()
    }

    /// J/mol, standard-state enthalpies of the species at T
    pub fn partial_molar_enthalpies(&self) -> Vec<f64> {
        let T = self.T;
        self.mechanism
            .species
            .iter()
            .map(|s| s.thermo.h_RT(&T) * R_G * T)
            .collect()
    }

    /// J/(mol K)
    pub fn cp_mole(&self) -> f64 {
        let T = self.T;
        let X = self.X();
        self.mechanism
            .species
            .iter()
            .zip(&X)
            .map(|(s, x)| x * s.thermo.cp_R(&T))
            .sum::<f64>()
            * R_G
    }
    /// J/(kg K)
    pub fn cp_mass(&self) -> f64 {
        self.cp_mole() / self.mean_molar_mass()
    }
    /// J/(kg K)
    pub fn cv_mass(&self) -> f64 {
        (self.cp_mole() - R_G) / self.mean_molar_mass()
    }
    /// J/mol
    pub fn enthalpy_mole(&self) -> f64 {
        let h = self.partial_molar_enthalpies();
        self.X().iter().zip(&h).map(|(x, h)| x * h).sum()
    }
    /// J/kg
    pub fn enthalpy_mass(&self) -> f64 {
        self.enthalpy_mole() / self.mean_molar_mass()
    }
    /// J/kg
    pub fn int_energy_mass(&self) -> f64 {
        (self.enthalpy_mole() - R_G * self.T) / self.mean_molar_mass()
    }
    /// J/(kg K), ideal mixing included
    pub fn entropy_mass(&self) -> f64 {
        let T = self.T;
        let ln_p = (self.P / P_REF).ln();
        let s_mole: f64 = self
            .mechanism
            .species
            .iter()
            .zip(self.X())
            .filter(|(_, x)| *x > 0.0)
            .map(|(s, x)| x * R_G * (s.thermo.s_R(&T) - x.ln() - ln_p))
            .sum();
        s_mole / self.mean_molar_mass()
    }

    /// mol/(m^3 s)
    pub fn net_production_rates(&self) -> Vec<f64> {
        rates::net_production_rates(&self.mechanism, &self.T, &self.concentrations())
    }

    /// Bring the mixture to chemical equilibrium holding the given pair of properties.
    pub fn equilibrate(&mut self, constraint: Constraint) -> Result<EquilibriumReport, ThermoError> {
        equilibrate(self, constraint, &EquilibriumSettings::default())
    }

    pub fn pretty_print(&self) {
        println!(
            "T = {:.2} K, P = {:.1} Pa, density = {:.5} kg/m3, mean molar mass = {:.5} kg/mol",
            self.T,
            self.P,
            self.density(),
            self.mean_molar_mass()
        );
        let mut table = Table::new();
        table.add_row(row!["Species", "X", "Y"]);
        for ((name, x), y) in self.mechanism.species_names().iter().zip(self.X()).zip(&self.Y) {
            if *y > 1e-14 {
                table.add_row(row![name, format!("{:.6e}", x), format!("{:.6e}", y)]);
            }
        }
        table.printstd();
    }
}

fn normalised(v: Vec<f64>) -> Result<Vec<f64>, ThermoError> {
    let total: f64 = v.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(ThermoError::InvalidComposition("amounts sum to zero".to_owned()));
    }
    Ok(v.into_iter().map(|x| x / total).collect())
}
