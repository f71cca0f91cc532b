use super::rates::*;
use crate::Mechanism::Mechanism;
use crate::Mechanism::mechanism_tests::{bundled_bfer, bundled_skeletal, h2o2};
use crate::Mechanism::reactions::RateModel;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use approx::assert_relative_eq;

fn element_residuals(mech: &Mechanism, wdot: &[f64]) -> Vec<f64> {
    let a = mech.element_matrix();
    (0..mech.elements.len())
        .map(|j| (0..mech.n_species()).map(|k| a[(k, j)] * wdot[k]).sum())
        .collect()
}

#[test]
fn production_rates_conserve_elements() {
    for mech in [bundled_bfer(), h2o2(), bundled_skeletal()] {
        let C: Vec<f64> = (0..mech.n_species()).map(|k| 0.5 + 0.3 * k as f64).collect();
        for T in [900.0, 1500.0, 2400.0] {
            let wdot = net_production_rates(&mech, &T, &C);
            let scale = wdot.iter().fold(0.0_f64, |m, w| m.max(w.abs()));
            assert!(scale > 0.0);
            for r in element_residuals(&mech, &wdot) {
                assert!(r.abs() <= 1e-9 * scale, "element residual {} at {} K", r, T);
            }
        }
    }
}

#[test]
fn irreversible_global_step() {
    let mech = bundled_bfer();
    let ch4 = mech.species_index("CH4").unwrap();
    let o2 = mech.species_index("O2").unwrap();
    let mut C = vec![0.0; mech.n_species()];
    C[ch4] = 1.2;
    C[o2] = 2.3;
    let T = 1400.0;
    let q = rates_of_progress(&mech, &T, &C);
    let k = match &mech.reactions[0].rate {
        RateModel::Elementary(k) => k.K(&T),
        other => panic!("unexpected rate model {:?}", other),
    };
    assert_relative_eq!(q[0], k * 1.2_f64.powf(0.5) * 2.3_f64.powf(0.65), max_relative = 1e-9);
    // CO oxidation runs backwards with no CO and no CO2 only through smoothing, which is negligible
    assert!(q[1].abs() < 1e-6 * q[0]);
}

#[test]
fn reversible_step_vanishes_at_equilibrium() {
    let mech = bundled_bfer();
    let co = mech.species_index("CO").unwrap();
    let o2 = mech.species_index("O2").unwrap();
    let co2 = mech.species_index("CO2").unwrap();
    let T = 2000.0;
    let kc = equilibrium_constants(&mech, &T)[1];
    let mut C = vec![0.0; mech.n_species()];
    C[co] = 0.4;
    C[o2] = 0.9;
    C[co2] = kc * 0.4 * 0.9_f64.sqrt();
    let q = rates_of_progress(&mech, &T, &C);
    let forward = match &mech.reactions[1].rate {
        RateModel::Elementary(k) => k.K(&T) * 0.4 * 0.9_f64.sqrt(),
        other => panic!("unexpected rate model {:?}", other),
    };
    assert!(q[1].abs() < 1e-8 * forward);
}

#[test]
fn co_oxidation_equilibrium_constant_from_gibbs_energies() {
    let mech = bundled_bfer();
    let T = 2000.0;
    let g = standard_gibbs_RT(&mech, &T);
    let co = mech.species_index("CO").unwrap();
    let o2 = mech.species_index("O2").unwrap();
    let co2 = mech.species_index("CO2").unwrap();
    let kp = (-(g[co2] - g[co] - 0.5 * g[o2])).exp();
    // Kc = Kp (P_ref / RT)^dnu with dnu = -1/2
    let expected = kp * (crate::Thermodynamics::P_REF / (crate::Thermodynamics::R_G * T)).powf(-0.5);
    assert_relative_eq!(equilibrium_constants(&mech, &T)[1], expected, max_relative = 1e-10);
    // CO2 is strongly favoured at 2000 K
    assert!(kp > 10.0);
}

#[test]
fn symbolic_rates_match_numeric() {
    for mech in [bundled_bfer(), h2o2()] {
        let n = mech.n_species();
        let names: Vec<String> = (0..n).map(|k| format!("C{}", k)).collect();
        let C_sym: Vec<Expr> = names.iter().map(|name| Expr::Var(name.clone())).collect();
        let T_sym = Expr::Var("T".to_owned());
        let wdot_sym = net_production_rates(&mech, &T_sym, &C_sym);

        let T = 1700.0;
        let C: Vec<f64> = (0..n).map(|k| 0.2 + 0.1 * k as f64).collect();
        let wdot = net_production_rates(&mech, &T, &C);

        let mut vars: Vec<&str> = vec!["T"];
        vars.extend(names.iter().map(|s| s.as_str()));
        let mut args = vec![T];
        args.extend(C.iter().copied());
        for (k, expr) in wdot_sym.iter().enumerate() {
            let f = expr.lambdify_owned(vars.clone());
            let value = f(args.clone());
            assert_relative_eq!(value, wdot[k], max_relative = 1e-8, epsilon = 1e-12);
        }
    }
}

#[test]
fn falloff_rate_between_limits() {
    let mech = h2o2();
    let ar = mech.species_index("AR").unwrap();
    let T = 1200.0;
    let (low, high) = match &mech.reactions[3].rate {
        RateModel::Falloff { low, high, .. } => (low.K(&T), high.K(&T)),
        other => panic!("unexpected rate model {:?}", other),
    };
    let mut C = vec![0.0; mech.n_species()];
    C[ar] = 10.0;
    let k = forward_rate_constants(&mech, &T, &C)[3];
    assert!(k < high);
    assert!(k < low * 10.0);
    assert!(k > 0.0);
}
