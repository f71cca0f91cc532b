//! Reactions of a gas mechanism: equation parsing and rate-constant models.
//!
//! All rate parameters stored here are already converted to SI-mol units
//! (m, mol, s, J/mol); see [`super::units`].
use super::MechanismError;
use crate::Kinetics::scalar::{Scalar, sum};
use crate::Thermodynamics::R_G;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Modified Arrhenius expression k = A T^b exp(-Ea/RT)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrhenius {
    pub A: f64,
    pub b: f64,
    /// J/mol
    pub Ea: f64,
}

impl Arrhenius {
    pub fn new(A: f64, b: f64, Ea: f64) -> Self {
        Self { A, b, Ea }
    }

    pub fn K<S: Scalar>(&self, T: &S) -> S {
        let mut k = S::cst(self.A);
        if self.b != 0.0 {
            k = k * T.clone().powf_(self.b);
        }
        if self.Ea != 0.0 {
            k = k * (S::cst(-self.Ea / R_G) / T.clone()).exp_();
        }
        k
    }
}

/// Troe broadening parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Troe {
    pub A: f64,
    pub T3: f64,
    pub T1: f64,
    pub T2: Option<f64>,
}

impl Troe {
    pub fn F_cent<S: Scalar>(&self, T: &S) -> S {
        let mut terms = Vec::new();
        if self.T3.abs() > 1e-300 {
            terms.push(S::cst(1.0 - self.A) * (-T.clone() / S::cst(self.T3)).exp_());
        }
        if self.T1.abs() > 1e-300 {
            terms.push(S::cst(self.A) * (-T.clone() / S::cst(self.T1)).exp_());
        }
        if let Some(T2) = self.T2 {
            terms.push((S::cst(-T2) / T.clone()).exp_());
        }
        sum(terms)
    }

    /// broadening factor F for reduced pressure `Pr`
    pub fn F<S: Scalar>(&self, T: &S, Pr: &S) -> S {
        let log_fc = self.F_cent(T).log10_();
        let log_pr = (Pr.clone() + S::cst(1e-300)).log10_();
        let c = S::cst(-0.4) - S::cst(0.67) * log_fc.clone();
        let n = S::cst(0.75) - S::cst(1.27) * log_fc.clone();
        let x = log_pr + c;
        let f1 = x.clone() / (n - S::cst(0.14) * x);
        let log_f = log_fc / (S::one() + f1.clone() * f1);
        (S::cst(std::f64::consts::LN_10) * log_f).exp_()
    }
}

/// Collision partner of a three-body or falloff reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    /// whole mixture with enhanced efficiencies (species index, efficiency)
    Mixture {
        default_efficiency: f64,
        efficiencies: Vec<(usize, f64)>,
    },
    /// a single species, `(+AR)`
    Species(usize),
}

impl Collider {
    /// effective third-body concentration [M], mol/m^3
    pub fn concentration<S: Scalar>(&self, C: &[S]) -> S {
        match self {
            Collider::Species(k) => C[*k].clone(),
            Collider::Mixture {
                default_efficiency,
                efficiencies,
            } => {
                let mut total = sum(C.iter().cloned());
                if *default_efficiency != 1.0 {
                    total = S::cst(*default_efficiency) * total;
                }
                let corrections = efficiencies
                    .iter()
                    .filter(|(_, eff)| *eff != *default_efficiency)
                    .map(|(k, eff)| S::cst(eff - default_efficiency) * C[*k].clone());
                total + sum(corrections)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateModel {
    Elementary(Arrhenius),
    ThreeBody {
        rate: Arrhenius,
        collider: Collider,
    },
    Falloff {
        low: Arrhenius,
        high: Arrhenius,
        troe: Option<Troe>,
        collider: Collider,
    },
}

impl RateModel {
    /// Forward rate constant including the third-body concentration, so that the rate of
    /// progress is always `K * prod(C^order)`.
    pub fn K<S: Scalar>(&self, T: &S, C: &[S]) -> S {
        match self {
            RateModel::Elementary(rate) => rate.K(T),
            RateModel::ThreeBody { rate, collider } => rate.K(T) * collider.concentration(C),
            RateModel::Falloff {
                low,
                high,
                troe,
                collider,
            } => {
                let k0 = low.K(T);
                let k_inf = high.K(T);
                let Pr = k0 * collider.concentration(C) / k_inf.clone();
                let lindemann = k_inf * Pr.clone() / (S::one() + Pr.clone());
                match troe {
                    Some(troe) => lindemann * troe.F(T, &Pr),
                    None => lindemann,
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RateModel::Elementary(_) => "elementary",
            RateModel::ThreeBody { .. } => "three-body",
            RateModel::Falloff { troe: Some(_), .. } => "falloff (Troe)",
            RateModel::Falloff { troe: None, .. } => "falloff (Lindemann)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub equation: String,
    /// (species index, stoichiometric coefficient)
    pub reactants: Vec<(usize, f64)>,
    pub products: Vec<(usize, f64)>,
    /// (species index, order) of the forward rate
    pub orders: Vec<(usize, f64)>,
    pub reversible: bool,
    pub duplicate: bool,
    pub rate: RateModel,
}

impl Reaction {
    /// change in moles of gas, products minus reactants
    pub fn delta_nu(&self) -> f64 {
        self.products.iter().map(|(_, nu)| nu).sum::<f64>()
            - self.reactants.iter().map(|(_, nu)| nu).sum::<f64>()
    }

    /// net stoichiometric coefficient of species `k`
    pub fn net_stoich(&self, k: usize) -> f64 {
        let produced: f64 = self.products.iter().filter(|(i, _)| *i == k).map(|(_, nu)| nu).sum();
        let consumed: f64 = self.reactants.iter().filter(|(i, _)| *i == k).map(|(_, nu)| nu).sum();
        produced - consumed
    }

    /// overall concentration order of the forward rate, third body excluded
    pub fn overall_order(&self) -> f64 {
        self.orders.iter().map(|(_, o)| o).sum()
    }
}

/// Third-body marker found in an equation string
#[derive(Debug, Clone, PartialEq)]
pub enum ThirdBodyMark {
    None,
    /// `+ M`
    ThreeBody,
    /// `(+M)` or `(+AR)`; `None` stands for the generic collider
    Falloff(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEquation {
    pub reactants: Vec<(String, f64)>,
    pub products: Vec<(String, f64)>,
    pub reversible: bool,
    pub third_body: ThirdBodyMark,
}

fn falloff_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s*\+\s*([^\s()]+)\s*\)").expect("valid falloff regex"))
}

/// Parse a Cantera-style equation such as `CH4 + 1.5 O2 => CO + 2 H2O`,
/// `H + O2 + M <=> HO2 + M` or `H + CH3 (+M) <=> CH4 (+M)`.
pub fn parse_equation(equation: &str) -> Result<ParsedEquation, MechanismError> {
    let bad = |why: &str| MechanismError::InvalidEquation {
        equation: equation.to_owned(),
        reason: why.to_owned(),
    };
    let (lhs, rhs, reversible) = if let Some((l, r)) = equation.split_once("<=>") {
        (l, r, true)
    } else if let Some((l, r)) = equation.split_once("=>") {
        (l, r, false)
    } else if let Some((l, r)) = equation.split_once('=') {
        (l, r, true)
    } else {
        return Err(bad("no reaction arrow"));
    };

    let (lhs, falloff_l) = strip_falloff(lhs);
    let (rhs, falloff_r) = strip_falloff(rhs);
    if falloff_l != falloff_r {
        return Err(bad("falloff collider differs between sides"));
    }
    let (reactants, m_left) = parse_side(&lhs).map_err(|why| bad(&why))?;
    let (products, m_right) = parse_side(&rhs).map_err(|why| bad(&why))?;
    if m_left != m_right {
        return Err(bad("third body M must appear on both sides"));
    }
    if reactants.is_empty() || products.is_empty() {
        return Err(bad("empty side"));
    }
    let third_body = match (falloff_l, m_left) {
        (Some(_), true) => return Err(bad("both (+M) and + M given")),
        (Some(collider), false) => {
            if collider == "M" {
                ThirdBodyMark::Falloff(None)
            } else {
                ThirdBodyMark::Falloff(Some(collider))
            }
        }
        (None, true) => ThirdBodyMark::ThreeBody,
        (None, false) => ThirdBodyMark::None,
    };
    Ok(ParsedEquation {
        reactants,
        products,
        reversible,
        third_body,
    })
}

fn strip_falloff(side: &str) -> (String, Option<String>) {
    let re = falloff_regex();
    let collider = re.captures(side).map(|cap| cap[1].to_owned());
    (re.replace_all(side, " ").into_owned(), collider)
}

fn parse_side(side: &str) -> Result<(Vec<(String, f64)>, bool), String> {
    let mut terms: Vec<Vec<&str>> = vec![Vec::new()];
    for token in side.split_whitespace() {
        if token == "+" {
            terms.push(Vec::new());
        } else if let Some(last) = terms.last_mut() {
            last.push(token);
        }
    }
    let mut species: Vec<(String, f64)> = Vec::new();
    let mut third_body = false;
    for term in terms {
        let (name, coeff) = match term.as_slice() {
            [name] => (*name, 1.0),
            [coeff, name] => {
                let coeff: f64 = coeff
                    .parse()
                    .map_err(|_| format!("bad stoichiometric coefficient '{}'", coeff))?;
                (*name, coeff)
            }
            [] => return Err("dangling '+'".to_owned()),
            _ => return Err(format!("cannot parse term '{}'", term.join(" "))),
        };
        if name == "M" {
            if coeff != 1.0 {
                return Err("third body M with a coefficient".to_owned());
            }
            third_body = true;
            continue;
        }
        if coeff <= 0.0 {
            return Err(format!("non-positive coefficient for {}", name));
        }
        match species.iter_mut().find(|(s, _)| s == name) {
            Some((_, nu)) => *nu += coeff,
            None => species.push((name.to_owned(), coeff)),
        }
    }
    Ok((species, third_body))
}
