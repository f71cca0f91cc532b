//! NASA 7-coefficient polynomials.
//!
//! cp/R = a0 + a1 T + a2 T^2 + a3 T^3 + a4 T^4
//! h/RT = a0 + a1 T/2 + a2 T^2/3 + a3 T^3/4 + a4 T^4/5 + a5/T
//! s/R  = a0 ln T + a1 T + a2 T^2/2 + a3 T^3/3 + a4 T^4/4 + a6
//!
//! Adjacent temperature ranges are joined by a logistic blend of width [`BLEND_WIDTH`]
//! centred on the common boundary. Away from the boundary the blend reproduces the piecewise
//! polynomial; near it the property stays differentiable, which the symbolic Jacobian needs.
use super::ThermoError;
use crate::Kinetics::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// K
pub const BLEND_WIDTH: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nasa7 {
    /// range boundaries, ascending: [Tmin, Tmid.., Tmax]
    pub temperature_ranges: Vec<f64>,
    /// one set of seven coefficients per range
    pub data: Vec<[f64; 7]>,
}

impl Nasa7 {
    pub fn new(temperature_ranges: Vec<f64>, data: Vec<Vec<f64>>) -> Result<Self, ThermoError> {
        if data.is_empty() || temperature_ranges.len() != data.len() + 1 {
            return Err(ThermoError::InvalidThermo(format!(
                "{} temperature boundaries for {} coefficient sets",
                temperature_ranges.len(),
                data.len()
            )));
        }
        if temperature_ranges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ThermoError::InvalidThermo(
                "temperature ranges must be strictly ascending".to_owned(),
            ));
        }
        let mut sets = Vec::with_capacity(data.len());
        for coeffs in data {
            let set: [f64; 7] = coeffs.as_slice().try_into().map_err(|_| {
                ThermoError::InvalidThermo(format!(
                    "NASA7 needs 7 coefficients per range, got {}",
                    coeffs.len()
                ))
            })?;
            sets.push(set);
        }
        Ok(Self {
            temperature_ranges,
            data: sets,
        })
    }

    pub fn t_min(&self) -> f64 {
        self.temperature_ranges[0]
    }
    pub fn t_max(&self) -> f64 {
        self.temperature_ranges[self.temperature_ranges.len() - 1]
    }

    fn blend<S: Scalar>(&self, T: &S, f: impl Fn(&[f64; 7], &S) -> S) -> S {
        let mut value = f(&self.data[0], T);
        for (i, coeffs) in self.data.iter().enumerate().skip(1) {
            let t_mid = self.temperature_ranges[i];
            let s = S::one()
                / (S::one() + ((S::cst(t_mid) - T.clone()) / S::cst(BLEND_WIDTH)).exp_());
            value = value * (S::one() - s.clone()) + f(coeffs, T) * s;
        }
        value
    }

    /// dimensionless heat capacity cp/R
    pub fn cp_R<S: Scalar>(&self, T: &S) -> S {
        self.blend(T, cp_R_poly)
    }
    /// dimensionless enthalpy h/RT
    pub fn h_RT<S: Scalar>(&self, T: &S) -> S {
        self.blend(T, h_RT_poly)
    }
    /// dimensionless entropy s/R at the reference pressure
    pub fn s_R<S: Scalar>(&self, T: &S) -> S {
        self.blend(T, s_R_poly)
    }
    /// dimensionless Gibbs energy g/RT at the reference pressure
    pub fn g_RT<S: Scalar>(&self, T: &S) -> S {
        self.h_RT(T) - self.s_R(T)
    }

    /// Plain piecewise evaluation, for checks against the blend.
    pub fn cp_R_piecewise(&self, T: f64) -> f64 {
        cp_R_poly(&self.data[self.range_index(T)], &T)
    }
    pub fn h_RT_piecewise(&self, T: f64) -> f64 {
        h_RT_poly(&self.data[self.range_index(T)], &T)
    }

    fn range_index(&self, T: f64) -> usize {
        let inner = &self.temperature_ranges[1..self.temperature_ranges.len() - 1];
        inner.iter().take_while(|&&t_mid| T > t_mid).count()
    }
}

fn cp_R_poly<S: Scalar>(a: &[f64; 7], T: &S) -> S {
    let t = T.clone();
    let t2 = t.clone() * t.clone();
    let t3 = t2.clone() * t.clone();
    let t4 = t3.clone() * t.clone();
    S::cst(a[0]) + S::cst(a[1]) * t + S::cst(a[2]) * t2 + S::cst(a[3]) * t3 + S::cst(a[4]) * t4
}

fn h_RT_poly<S: Scalar>(a: &[f64; 7], T: &S) -> S {
    let t = T.clone();
    let t2 = t.clone() * t.clone();
    let t3 = t2.clone() * t.clone();
    let t4 = t3.clone() * t.clone();
    S::cst(a[0])
        + S::cst(a[1] / 2.0) * t.clone()
        + S::cst(a[2] / 3.0) * t2
        + S::cst(a[3] / 4.0) * t3
        + S::cst(a[4] / 5.0) * t4
        + S::cst(a[5]) / t
}

fn s_R_poly<S: Scalar>(a: &[f64; 7], T: &S) -> S {
    let t = T.clone();
    let t2 = t.clone() * t.clone();
    let t3 = t2.clone() * t.clone();
    let t4 = t3.clone() * t.clone();
    S::cst(a[0]) * t.clone().ln_()
        + S::cst(a[1]) * t
        + S::cst(a[2] / 2.0) * t2
        + S::cst(a[3] / 3.0) * t3
        + S::cst(a[4] / 4.0) * t4
        + S::cst(a[6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thermodynamics::R_G;
    use RustedSciThe::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;

    fn n2() -> Nasa7 {
        Nasa7::new(
            vec![300.0, 1000.0, 5000.0],
            vec![
                vec![3.298677, 1.4082404e-03, -3.963222e-06, 5.641515e-09, -2.444854e-12, -1020.8999, 3.950372],
                vec![2.92664, 1.4879768e-03, -5.68476e-07, 1.0097038e-10, -6.753351e-15, -922.7977, 5.980528],
            ],
        )
        .unwrap()
    }

    fn co2() -> Nasa7 {
        Nasa7::new(
            vec![200.0, 1000.0, 3500.0],
            vec![
                vec![2.35677352, 8.98459677e-03, -7.12356269e-06, 2.45919022e-09, -1.43699548e-13, -4.83719697e+04, 9.90105222],
                vec![3.85746029, 4.41437026e-03, -2.21481404e-06, 5.23490188e-10, -4.72084164e-14, -4.8759166e+04, 2.27163806],
            ],
        )
        .unwrap()
    }

    #[test]
    fn n2_heat_capacity_near_room_temperature() {
        let cp = n2().cp_R(&300.0) * R_G;
        assert_relative_eq!(cp, 29.1, epsilon = 0.2);
    }

    #[test]
    fn co2_heat_of_formation() {
        let h = co2().h_RT(&298.15) * R_G * 298.15;
        assert_relative_eq!(h / 1000.0, -393.5, epsilon = 0.5);
    }

    #[test]
    fn blend_matches_piecewise_away_from_boundary() {
        let th = co2();
        for T in [300.0, 700.0, 1300.0, 2500.0] {
            assert_relative_eq!(th.cp_R(&T), th.cp_R_piecewise(T), max_relative = 1e-6);
            assert_relative_eq!(th.h_RT(&T), th.h_RT_piecewise(T), max_relative = 1e-6);
        }
    }

    #[test]
    fn blend_is_continuous_at_boundary() {
        let th = co2();
        let below = th.cp_R(&(1000.0 - 1e-6));
        let above = th.cp_R(&(1000.0 + 1e-6));
        assert_relative_eq!(below, above, max_relative = 1e-8);
    }

    #[test]
    fn symbolic_matches_numeric() {
        let th = n2();
        let T = Expr::Var("T".to_owned());
        let cp = th.cp_R(&T).lambdify1D();
        let g = th.g_RT(&T).lambdify1D();
        for t in [400.0, 999.0, 1800.0] {
            assert_relative_eq!(cp(t), th.cp_R(&t), max_relative = 1e-9);
            assert_relative_eq!(g(t), th.g_RT(&t), max_relative = 1e-9);
        }
    }

    #[test]
    fn rejects_malformed_data() {
        assert!(Nasa7::new(vec![300.0, 1000.0], vec![vec![1.0; 7], vec![1.0; 7]]).is_err());
        assert!(Nasa7::new(vec![300.0, 1000.0], vec![vec![1.0; 6]]).is_err());
        assert!(Nasa7::new(vec![1000.0, 300.0], vec![vec![1.0; 7]]).is_err());
    }
}
