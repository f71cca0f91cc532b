use super::equilibrium::{Constraint, EquilibriumSettings, equilibrate};
use super::mixture::{MixtureRule, methane_air};
use super::solution::Solution;
use super::{ONE_ATM, R_G, ThermoError};
use crate::Kinetics::rates::rates_of_progress;
use crate::Mechanism::mechanism_tests::{bundled_bfer, h2o2};
use approx::assert_relative_eq;
use std::collections::HashMap;

fn methane_air_gas(T: f64, phi: f64) -> Solution {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX(T, ONE_ATM, &methane_air(phi, MixtureRule::Stoichiometric).unwrap())
        .unwrap();
    gas
}

fn element_totals(gas: &Solution) -> Vec<f64> {
    // mol of each element per kg
    let mech = gas.mechanism();
    let a = mech.element_matrix();
    let W = mech.molar_masses();
    (0..mech.elements.len())
        .map(|i| (0..mech.n_species()).map(|j| a[(j, i)] * gas.Y()[j] / W[j]).sum())
        .collect()
}

#[test]
fn air_density_and_mole_fractions() {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX_str(300.0, ONE_ATM, "O2:1, N2:3.76").unwrap();
    let W = gas.mean_molar_mass();
    assert_relative_eq!(W, 0.028851, max_relative = 1e-3);
    assert_relative_eq!(gas.density(), ONE_ATM * W / (R_G * 300.0), max_relative = 1e-12);
    assert_relative_eq!(gas.density(), 1.172, max_relative = 2e-3);
    assert_relative_eq!(gas.mole_fraction("O2").unwrap(), 1.0 / 4.76, max_relative = 1e-12);
    assert_relative_eq!(gas.X().iter().sum::<f64>(), 1.0, max_relative = 1e-12);
    assert_relative_eq!(gas.Y().iter().sum::<f64>(), 1.0, max_relative = 1e-12);
    let C: f64 = gas.concentrations().iter().sum();
    assert_relative_eq!(C, ONE_ATM / (R_G * 300.0), max_relative = 1e-12);
}

#[test]
fn mass_fraction_setters_normalise() {
    let mut gas = Solution::new(bundled_bfer());
    let Y = HashMap::from([("CH4".to_owned(), 2.0), ("N2".to_owned(), 6.0)]);
    gas.set_TPY(500.0, 2.0 * ONE_ATM, &Y).unwrap();
    assert_relative_eq!(gas.mass_fraction("CH4").unwrap(), 0.25);
    assert_relative_eq!(gas.P(), 2.0 * ONE_ATM);

    let mut raw = vec![0.0; gas.n_species()];
    raw[0] = 0.5;
    raw[1] = -1e-12;
    raw[5] = 0.5;
    gas.set_TPY_vec(800.0, ONE_ATM, &raw).unwrap();
    assert_eq!(gas.Y()[1], 0.0);
    assert_relative_eq!(gas.Y()[0], 0.5, max_relative = 1e-12);
}

#[test]
fn invalid_states_are_rejected() {
    let mut gas = Solution::new(bundled_bfer());
    assert!(matches!(gas.set_TP(-1.0, ONE_ATM), Err(ThermoError::InvalidState(_))));
    assert!(matches!(gas.set_TP(300.0, 0.0), Err(ThermoError::InvalidState(_))));
    assert!(matches!(
        gas.set_TPX_str(300.0, ONE_ATM, "XE2:1"),
        Err(ThermoError::UnknownSpecies(_))
    ));
    assert!(matches!(
        gas.set_TPX_str(300.0, ONE_ATM, "O2:0"),
        Err(ThermoError::InvalidComposition(_))
    ));
    assert!(gas.set_TPY_vec(300.0, ONE_ATM, &[1.0]).is_err());
    assert!(gas.mole_fraction("C8H18").is_err());
    // failed setters leave the state alone
    assert_relative_eq!(gas.T(), 300.0);
    assert_relative_eq!(gas.Y()[0], 1.0);
}

#[test]
fn caloric_properties_are_consistent() {
    let mut gas = methane_air_gas(1200.0, 0.8);
    let h1 = gas.enthalpy_mass();
    let cp = gas.cp_mass();
    let Y = gas.Y().to_vec();
    gas.set_TPY_vec(1201.0, ONE_ATM, &Y).unwrap();
    let h2 = gas.enthalpy_mass();
    assert_relative_eq!(h2 - h1, cp, max_relative = 1e-3);
    assert_relative_eq!(
        gas.int_energy_mass(),
        gas.enthalpy_mass() - R_G * 1201.0 / gas.mean_molar_mass(),
        max_relative = 1e-12
    );
    assert_relative_eq!(gas.cp_mass() - gas.cv_mass(), R_G / gas.mean_molar_mass(), max_relative = 1e-12);
    assert!(gas.entropy_mass() > 0.0);
}

#[test]
fn equivalence_ratio_setter() {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TP(1000.0, ONE_ATM).unwrap();
    let fuel = HashMap::from([("CH4".to_owned(), 1.0)]);
    let air = HashMap::from([("O2".to_owned(), 1.0), ("N2".to_owned(), 3.76)]);
    gas.set_equivalence_ratio(1.0, &fuel, &air).unwrap();
    let x_ch4 = gas.mole_fraction("CH4").unwrap();
    let x_o2 = gas.mole_fraction("O2").unwrap();
    assert_relative_eq!(x_o2 / x_ch4, 2.0, max_relative = 1e-10);
    assert_relative_eq!(gas.T(), 1000.0);
}

#[test]
fn tp_equilibrium_conserves_elements_and_balances_co_oxidation() {
    let mut gas = methane_air_gas(2500.0, 1.0);
    let before = element_totals(&gas);
    let report = gas.equilibrate(Constraint::TP).unwrap();
    assert!(report.iterations > 1);
    assert_relative_eq!(gas.T(), 2500.0);
    let after = element_totals(&gas);
    for (b0, b) in before.iter().zip(&after) {
        assert_relative_eq!(b0, b, max_relative = 1e-5, epsilon = 1e-12);
    }
    // methane is gone, CO2 and water formed, some CO from dissociation
    assert!(gas.mole_fraction("CH4").unwrap() < 1e-10);
    assert!(gas.mole_fraction("CO2").unwrap() > 0.03);
    assert!(gas.mole_fraction("CO").unwrap() > 1e-3);

    // the reversible CO oxidation step sits at zero net rate
    let mech = gas.mechanism().clone();
    let C = gas.concentrations();
    let q = rates_of_progress(&mech, &gas.T(), &C);
    let co = mech.species_index("CO").unwrap();
    let o2 = mech.species_index("O2").unwrap();
    let k = match &mech.reactions[1].rate {
        crate::Mechanism::reactions::RateModel::Elementary(k) => k.K(&gas.T()),
        other => panic!("unexpected rate model {:?}", other),
    };
    let forward = k * C[co] * C[o2].sqrt();
    assert!(q[1].abs() < 1e-3 * forward, "q = {}, forward = {}", q[1], forward);
}

#[test]
fn tp_equilibrium_lowers_gibbs_energy() {
    let mut gas = methane_air_gas(1800.0, 0.7);
    let g = |gas: &Solution| gas.enthalpy_mass() - gas.T() * gas.entropy_mass();
    let g0 = g(&gas);
    gas.equilibrate(Constraint::TP).unwrap();
    assert!(g(&gas) < g0);
}

#[test]
fn adiabatic_flame_temperature_of_stoichiometric_methane_air() {
    let mut gas = methane_air_gas(300.0, 1.0);
    let h0 = gas.enthalpy_mass();
    let report = gas.equilibrate(Constraint::HP).unwrap();
    assert!(
        (2100.0..2350.0).contains(&gas.T()),
        "adiabatic flame temperature {}",
        gas.T()
    );
    assert_relative_eq!(report.T, gas.T());
    // enthalpy kept within a fraction of a kelvin worth of cp
    assert!((gas.enthalpy_mass() - h0).abs() < gas.cp_mass());
    assert!(gas.mole_fraction("NO").unwrap() > 1e-4);
}

#[test]
fn lean_hot_mixture_heats_up() {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX(1300.0, ONE_ATM, &methane_air(0.3, MixtureRule::Legacy).unwrap())
        .unwrap();
    gas.equilibrate(Constraint::HP).unwrap();
    assert!(gas.T() > 1300.0 && gas.T() < 2300.0, "T = {}", gas.T());
}

#[test]
fn nitrogen_free_oxidizer_forms_no_nitrogen_species() {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX_str(300.0, ONE_ATM, "CH4:1, O2:2").unwrap();
    gas.equilibrate(Constraint::HP).unwrap();
    assert_eq!(gas.mass_fraction("N2").unwrap(), 0.0);
    assert_eq!(gas.mass_fraction("NO").unwrap(), 0.0);
    // pure oxygen burns hotter than air
    assert!(gas.T() > 2800.0);
}

#[test]
fn inert_gas_stays_put() {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX_str(600.0, ONE_ATM, "N2:1").unwrap();
    let h0 = gas.enthalpy_mass();
    gas.equilibrate(Constraint::HP).unwrap();
    assert_relative_eq!(gas.T(), 600.0, max_relative = 1e-3);
    assert_relative_eq!(gas.mass_fraction("N2").unwrap(), 1.0, max_relative = 1e-9);
    assert!((gas.enthalpy_mass() - h0).abs() < gas.cp_mass());
}

#[test]
fn hydrogen_oxygen_equilibrium_with_argon_diluent() {
    let mut gas = Solution::new(h2o2());
    gas.set_TPX_str(3000.0, ONE_ATM, "H2:2, O2:1, AR:3").unwrap();
    let before = element_totals(&gas);
    gas.equilibrate(Constraint::TP).unwrap();
    let after = element_totals(&gas);
    for (b0, b) in before.iter().zip(&after) {
        assert_relative_eq!(b0, b, max_relative = 1e-5, epsilon = 1e-12);
    }
    // strong dissociation at 3000 K
    assert!(gas.mole_fraction("OH").unwrap() > 1e-2);
    assert!(gas.mole_fraction("H2O").unwrap() > 0.1);
}

#[test]
fn iteration_limit_is_reported() {
    let mut gas = methane_air_gas(300.0, 1.0);
    let settings = EquilibriumSettings {
        max_iterations: 2,
        ..Default::default()
    };
    let result = equilibrate(&mut gas, Constraint::HP, &settings);
    assert!(matches!(result, Err(ThermoError::EquilibriumFailed { iterations: 2, .. })));
    // state untouched on failure
    assert_relative_eq!(gas.T(), 300.0);
}
