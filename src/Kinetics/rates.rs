use super::scalar::{Scalar, concentration_power, sum};
use crate::Mechanism::Mechanism;
use crate::Mechanism::reactions::Reaction;
use crate::Thermodynamics::{P_REF, R_G};

/// Smoothing concentration of fractional reaction orders, mol/m^3
pub const CONCENTRATION_EPS: f64 = 1e-10;

/// Standard Gibbs energies g/RT of all species
pub fn standard_gibbs_RT<S: Scalar>(mechanism: &Mechanism, T: &S) -> Vec<S> {
    mechanism.species.iter().map(|s| s.thermo.g_RT(T)).collect()
}

/// Forward rate constants with the third-body/falloff factor included, SI-mol units
pub fn forward_rate_constants<S: Scalar>(mechanism: &Mechanism, T: &S, C: &[S]) -> Vec<S> {
    mechanism.reactions.iter().map(|r| r.rate.K(T, C)).collect()
}

/// 1/Kc of one reaction, Kc = exp(-sum(nu g/RT)) (P_ref/RT)^dnu in concentration units
fn inverse_equilibrium_constant<S: Scalar>(reaction: &Reaction, T: &S, g_RT: &[S]) -> S {
    let mut terms = Vec::new();
    for (k, nu) in &reaction.products {
        terms.push(scaled(g_RT[*k].clone(), *nu));
    }
    for (k, nu) in &reaction.reactants {
        terms.push(scaled(g_RT[*k].clone(), -*nu));
    }
    let mut inv_kc = sum(terms).exp_();
    let dnu = reaction.delta_nu();
    if dnu != 0.0 {
        inv_kc = inv_kc * (S::cst(R_G / P_REF) * T.clone()).powf_(dnu);
    }
    inv_kc
}

/// Equilibrium constants in concentration units, one per reaction
pub fn equilibrium_constants<S: Scalar>(mechanism: &Mechanism, T: &S) -> Vec<S> {
    let g_RT = standard_gibbs_RT(mechanism, T);
    mechanism
        .reactions
        .iter()
        .map(|r| S::one() / inverse_equilibrium_constant(r, T, &g_RT))
        .collect()
}

/// Net rates of progress q = kf prod(C^order) - kr prod(C^nu''), mol/(m^3 s)
pub fn rates_of_progress<S: Scalar>(mechanism: &Mechanism, T: &S, C: &[S]) -> Vec<S> {
    let g_RT = standard_gibbs_RT(mechanism, T);
    mechanism
        .reactions
        .iter()
        .map(|reaction| {
            let kf = reaction.rate.K(T, C);
            let mut forward = kf.clone();
            for (k, order) in &reaction.orders {
                forward = forward * concentration_power(C[*k].clone(), *order, CONCENTRATION_EPS);
            }
            if !reaction.reversible {
                return forward;
            }
            let mut reverse = kf * inverse_equilibrium_constant(reaction, T, &g_RT);
            for (k, nu) in &reaction.products {
                reverse = reverse * concentration_power(C[*k].clone(), *nu, CONCENTRATION_EPS);
            }
            forward - reverse
        })
        .collect()
}

/// Net molar production rates of all species, mol/(m^3 s)
pub fn net_production_rates<S: Scalar>(mechanism: &Mechanism, T: &S, C: &[S]) -> Vec<S> {
    let q = rates_of_progress(mechanism, T, C);
    let mut terms: Vec<Vec<S>> = vec![Vec::new(); mechanism.n_species()];
    for (reaction, q_r) in mechanism.reactions.iter().zip(q) {
        for (k, nu) in &reaction.products {
            terms[*k].push(scaled(q_r.clone(), *nu));
        }
        for (k, nu) in &reaction.reactants {
            terms[*k].push(scaled(q_r.clone(), -*nu));
        }
    }
    terms.into_iter().map(sum).collect()
}

fn scaled<S: Scalar>(x: S, factor: f64) -> S {
    if factor == 1.0 {
        x
    } else if factor == -1.0 {
        -x
    } else {
        S::cst(factor) * x
    }
}
