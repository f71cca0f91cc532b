//! Gibbs-energy minimisation for ideal-gas mixtures by the reduced element-potential iteration
//! of Gordon and McBride (NASA RP-1311). Amounts are kept per kilogram of mixture, so the
//! element totals b0 are fixed by the incoming mass fractions.
//!
//! Unknowns of one Newton step are the Lagrange multipliers pi_i of the element balances,
//! the correction of the total moles (dln n) and, for the (H, P) problem, the correction
//! of ln T. The species corrections follow from them:
//!
//! dln n_j = -mu_j/RT + sum_i a_ij pi_i + dln n + (h_j/RT) dln T
use super::solution::Solution;
use super::{P_REF, R_G, ThermoError};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// ln(1e-8): species below this fraction of the total moles count as trace
const SIZE: f64 = 18.420681;
/// ln(1e-4): trace species may not grow above this fraction in one step
const TRACE_LIMIT: f64 = 9.2103404;
/// floor of ln(n_j / n), keeps exp() out of underflow
const LOG_FLOOR: f64 = 690.0;
const INITIAL_MOLES: f64 = 100.0;
const T_LOWER: f64 = 200.0;
const T_UPPER: f64 = 6000.0;

/// Pair of properties held fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// temperature and pressure
    TP,
    /// enthalpy and pressure (adiabatic, isobaric)
    HP,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EquilibriumSettings {
    pub max_iterations: usize,
    /// bound of n_j |dln n_j| / sum(n_j)
    pub tolerance: f64,
    /// bound of |dln T|
    pub temperature_tolerance: f64,
    /// bound of |b0_i - b_i| relative to the largest element total
    pub element_tolerance: f64,
    /// starting temperature of the (H, P) iteration, K
    pub initial_temperature: f64,
}

impl Default for EquilibriumSettings {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 0.5e-5,
            temperature_tolerance: 1e-4,
            element_tolerance: 1e-6,
            initial_temperature: 3000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EquilibriumReport {
    pub constraint: Constraint,
    pub iterations: usize,
    /// final temperature, K
    pub T: f64,
    /// largest element imbalance relative to the largest element total
    pub element_residual: f64,
}

/// Species and elements that take part in the equilibrium: elements absent from the mixture
/// are dropped together with every species containing them.
struct ReducedSystem {
    species: Vec<usize>,
    /// a[i][jj], atoms of active element i in active species jj
    a: Vec<Vec<f64>>,
    b0: Vec<f64>,
}

impl ReducedSystem {
    fn new(gas: &Solution) -> Result<Self, ThermoError> {
        let mechanism = gas.mechanism();
        let ns = mechanism.n_species();
        let ne = mechanism.elements.len();
        let W = mechanism.molar_masses();
        let A = mechanism.element_matrix();
        let n0: Vec<f64> = gas.Y().iter().zip(&W).map(|(y, w)| y / w).collect();
        let b0_all: Vec<f64> = (0..ne)
            .map(|i| (0..ns).map(|j| A[(j, i)] * n0[j]).sum())
            .collect();
        let b_max = b0_all.iter().cloned().fold(0.0, f64::max);
        if b_max <= 0.0 {
            return Err(ThermoError::InvalidComposition(
                "mixture contains no elements".to_owned(),
            ));
        }
        let elements: Vec<usize> = (0..ne).filter(|&i| b0_all[i] > 1e-12 * b_max).collect();
        let species: Vec<usize> = (0..ns)
            .filter(|&j| {
                (0..ne).all(|i| A[(j, i)] == 0.0 || elements.contains(&i))
                    && (0..ne).any(|i| A[(j, i)] != 0.0)
            })
            .collect();
        let a = elements
            .iter()
            .map(|&i| species.iter().map(|&j| A[(j, i)]).collect())
            .collect();
        let b0 = elements.iter().map(|&i| b0_all[i]).collect();
        Ok(Self { species, a, b0 })
    }

    fn element_totals(&self, nj: &[f64]) -> Vec<f64> {
        self.a
            .iter()
            .map(|row| row.iter().zip(nj).map(|(a, n)| a * n).sum())
            .collect()
    }
}

/// Equilibrate `gas` in place. Pressure is always kept; temperature is kept for
/// [`Constraint::TP`] and found from the enthalpy balance for [`Constraint::HP`].
pub fn equilibrate(
    gas: &mut Solution,
    constraint: Constraint,
    settings: &EquilibriumSettings,
) -> Result<EquilibriumReport, ThermoError> {
    let mechanism = gas.mechanism().clone();
    let system = ReducedSystem::new(gas)?;
    let m = system.b0.len();
    let na = system.species.len();
    let b_max = system.b0.iter().cloned().fold(0.0, f64::max);
    let energy = constraint == Constraint::HP;
    let size = m + 1 + usize::from(energy);
    let P = gas.P();
    let ln_p = (P / P_REF).ln();
    let h0 = gas.enthalpy_mass();

    let mut T = match constraint {
        Constraint::TP => gas.T(),
        Constraint::HP => settings.initial_temperature.clamp(T_LOWER, T_UPPER),
    };
    let mut ln_n = INITIAL_MOLES.ln();
    let mut ln_nj = vec![(INITIAL_MOLES / na as f64).ln(); na];

    for iteration in 1..=settings.max_iterations {
        let n = ln_n.exp();
        let nj: Vec<f64> = ln_nj.iter().map(|x| x.exp()).collect();
        let thermo: Vec<_> = system.species.iter().map(|&j| &mechanism.species[j].thermo).collect();
        let H: Vec<f64> = thermo.iter().map(|t| t.h_RT(&T)).collect();
        let cp: Vec<f64> = thermo.iter().map(|t| t.cp_R(&T)).collect();
        let mu: Vec<f64> = thermo
            .iter()
            .zip(&ln_nj)
            .map(|(t, ln)| t.g_RT(&T) + ln - ln_n + ln_p)
            .collect();
        let b = system.element_totals(&nj);
        let sum_nj: f64 = nj.iter().sum();

        let mut G = DMatrix::<f64>::zeros(size, size);
        let mut r = DVector::<f64>::zeros(size);
        for i in 0..m {
            let ai = &system.a[i];
            for k in 0..m {
                G[(i, k)] = (0..na).map(|j| ai[j] * system.a[k][j] * nj[j]).sum();
            }
            G[(i, m)] = b[i];
            G[(m, i)] = b[i];
            r[i] = system.b0[i] - b[i] + (0..na).map(|j| ai[j] * nj[j] * mu[j]).sum::<f64>();
            if energy {
                let aHn: f64 = (0..na).map(|j| ai[j] * nj[j] * H[j]).sum();
                G[(i, m + 1)] = aHn;
                G[(m + 1, i)] = aHn;
            }
        }
        G[(m, m)] = sum_nj - n;
        r[m] = n - sum_nj + (0..na).map(|j| nj[j] * mu[j]).sum::<f64>();
        if energy {
            let nH: f64 = (0..na).map(|j| nj[j] * H[j]).sum();
            G[(m, m + 1)] = nH;
            G[(m + 1, m)] = nH;
            G[(m + 1, m + 1)] = (0..na).map(|j| nj[j] * (cp[j] + H[j] * H[j])).sum();
            r[m + 1] = h0 / (R_G * T) - nH + (0..na).map(|j| nj[j] * H[j] * mu[j]).sum::<f64>();
        }

        let x = G.lu().solve(&r).ok_or_else(|| ThermoError::EquilibriumFailed {
            iterations: iteration,
            reason: "singular element-potential matrix".to_owned(),
        })?;
        let dln_n = x[m];
        let dln_T = if energy { x[m + 1] } else { 0.0 };
        let dln_nj: Vec<f64> = (0..na)
            .map(|j| {
                -mu[j] + (0..m).map(|i| system.a[i][j] * x[i]).sum::<f64>() + dln_n + H[j] * dln_T
            })
            .collect();
        if dln_nj.iter().any(|d| !d.is_finite()) || !dln_n.is_finite() || !dln_T.is_finite() {
            return Err(ThermoError::EquilibriumFailed {
                iterations: iteration,
                reason: "non-finite correction".to_owned(),
            });
        }

        let element_residual = system
            .b0
            .iter()
            .zip(&b)
            .map(|(b0, b)| (b0 - b).abs())
            .fold(0.0, f64::max)
            / b_max;
        let converged = (0..na).all(|j| nj[j] * dln_nj[j].abs() <= settings.tolerance * sum_nj)
            && n * dln_n.abs() <= settings.tolerance * sum_nj
            && dln_T.abs() <= settings.temperature_tolerance
            && element_residual <= settings.element_tolerance;

        let mut largest = (5.0 * dln_T.abs()).max(5.0 * dln_n.abs());
        let mut lambda: f64 = 1.0;
        for j in 0..na {
            let ln_ratio = ln_nj[j] - ln_n;
            if ln_ratio > -SIZE {
                largest = largest.max(dln_nj[j].abs());
            } else if dln_nj[j] >= 0.0 && dln_nj[j] != dln_n {
                lambda = lambda.min(((-ln_ratio - TRACE_LIMIT) / (dln_nj[j] - dln_n)).abs());
            }
        }
        if largest > 2.0 {
            lambda = lambda.min(2.0 / largest);
        }
        debug!(
            "equilibrium iteration {}: T = {:.3}, dln n = {:.3e}, dln T = {:.3e}, lambda = {:.3}",
            iteration, T, dln_n, dln_T, lambda
        );

        ln_n += lambda * dln_n;
        for j in 0..na {
            ln_nj[j] = (ln_nj[j] + lambda * dln_nj[j]).max(ln_n - LOG_FLOOR);
        }
        if energy {
            T = (T.ln() + lambda * dln_T).exp().clamp(T_LOWER, T_UPPER);
        }

        if converged {
            let W = mechanism.molar_masses();
            let mut Y = vec![0.0; mechanism.n_species()];
            for (jj, &j) in system.species.iter().enumerate() {
                Y[j] = ln_nj[jj].exp() * W[j];
            }
            gas.set_TPY_vec(T, P, &Y)?;
            info!(
                "{:?} equilibrium reached in {} iterations at T = {:.2} K",
                constraint, iteration, T
            );
            return Ok(EquilibriumReport {
                constraint,
                iterations: iteration,
                T,
                element_residual,
            });
        }
    }
    Err(ThermoError::EquilibriumFailed {
        iterations: settings.max_iterations,
        reason: format!("corrections still above tolerance at T = {:.2} K", T),
    })
}
