//! Arithmetic shared by the numeric (`f64`) and symbolic (`Expr`) evaluation paths.
//!
//! Rate constants, equilibrium constants and NASA polynomials are written once against
//! [`Scalar`]. The numeric instantiation feeds diagnostics and equilibrium, the symbolic one
//! builds the right-hand side handed to the IVP solvers, so both always describe the same model.
use RustedSciThe::symbolic::symbolic_engine::Expr;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub trait Scalar:
    Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn cst(value: f64) -> Self;
    fn exp_(self) -> Self;
    fn ln_(self) -> Self;
    fn log10_(self) -> Self;
    fn powf_(self, p: f64) -> Self;
    /// algebraic simplification, identity for numbers
    fn simplified(self) -> Self;

    fn zero() -> Self {
        Self::cst(0.0)
    }
    fn one() -> Self {
        Self::cst(1.0)
    }
    /// x^n by repeated multiplication, n >= 1
    fn powi_(self, n: u32) -> Self {
        let mut acc = self.clone();
        for _ in 1..n {
            acc = acc * self.clone();
        }
        acc
    }
}

impl Scalar for f64 {
    fn cst(value: f64) -> Self {
        value
    }
    fn exp_(self) -> Self {
        self.exp()
    }
    fn ln_(self) -> Self {
        self.ln()
    }
    fn log10_(self) -> Self {
        self.log10()
    }
    fn powf_(self, p: f64) -> Self {
        self.powf(p)
    }
    fn simplified(self) -> Self {
        self
    }
}

impl Scalar for Expr {
    fn cst(value: f64) -> Self {
        Expr::Const(value)
    }
    fn exp_(self) -> Self {
        self.exp()
    }
    fn ln_(self) -> Self {
        self.ln()
    }
    fn log10_(self) -> Self {
        self.log10()
    }
    fn powf_(self, p: f64) -> Self {
        self.pow(Expr::Const(p))
    }
    fn simplified(self) -> Self {
        self.symplify()
    }
}

/// Sum of a sequence, `0` for an empty one.
pub fn sum<S: Scalar>(items: impl IntoIterator<Item = S>) -> S {
    let mut iter = items.into_iter();
    match iter.next() {
        Some(first) => iter.fold(first, |acc, x| acc + x),
        None => S::zero(),
    }
}

/// Concentration raised to a reaction order.
///
/// Integer orders are plain products. Fractional and negative orders go through
/// `(C^2 + eps^2)^(order/2)`, which stays finite when the integrator drives a concentration
/// slightly below zero.
pub fn concentration_power<S: Scalar>(c: S, order: f64, eps: f64) -> S {
    if order == 0.0 {
        return S::one();
    }
    if order > 0.0 && order.fract() == 0.0 && order <= 6.0 {
        return c.powi_(order as u32);
    }
    (c.clone() * c + S::cst(eps * eps)).powf_(0.5 * order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn integer_orders_are_products() {
        assert_relative_eq!(concentration_power(3.0_f64, 2.0, 1e-10), 9.0);
        assert_relative_eq!(concentration_power(-2.0_f64, 1.0, 1e-10), -2.0);
        assert_relative_eq!(concentration_power(5.0_f64, 0.0, 1e-10), 1.0);
    }

    #[test]
    fn fractional_orders_are_smoothed() {
        let v = concentration_power(4.0_f64, 0.5, 1e-10);
        assert_relative_eq!(v, 2.0, epsilon = 1e-9);
        // stays real for small negative concentrations
        let v = concentration_power(-1e-14_f64, 0.65, 1e-10);
        assert!(v.is_finite() && v > 0.0);
    }

    #[test]
    fn symbolic_and_numeric_agree() {
        let x = Expr::Var("x".to_owned());
        let e = concentration_power(x.clone(), 0.65, 1e-10) * x.clone().exp_() + Expr::cst(2.0);
        let f = e.lambdify1D();
        let x0 = 0.37;
        let expected = concentration_power(x0, 0.65, 1e-10) * x0.exp() + 2.0;
        assert_relative_eq!(f(x0), expected, max_relative = 1e-10);
    }

    #[test]
    fn sum_of_empty_is_zero() {
        let v: Vec<f64> = vec![];
        assert_eq!(sum(v), 0.0);
        assert_eq!(sum(vec![1.0, 2.0, 3.5]), 6.5);
    }
}
