/// eng
/// Arithmetic trait shared by numeric (`f64`) and symbolic (`Expr`) evaluation, so that
/// the same rate and thermo code yields both the numbers used for diagnostics and the
/// symbolic right-hand side passed to the IVP solvers
pub mod scalar;
/// eng
/// Gas-phase kinetics of a mechanism: forward rate constants, equilibrium constants from the
/// standard Gibbs energies, reverse rate constants, rates of progress and net molar production
/// rates of every species.
/// Every function is generic over [`scalar::Scalar`]:
/// ```
/// use methane_reactors::Kinetics::rates::net_production_rates;
/// use methane_reactors::Mechanism::Mechanism;
/// use RustedSciThe::symbolic::symbolic_engine::Expr;
/// let mech = Mechanism::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/data/ch4_bfer.yaml")).unwrap();
/// let n = mech.n_species();
/// // numeric
/// let C = vec![1.0; n];
/// let wdot: Vec<f64> = net_production_rates(&mech, &1500.0, &C);
/// // symbolic
/// let C_sym: Vec<Expr> = (0..n).map(|k| Expr::Var(format!("C{}", k))).collect();
/// let wdot_sym: Vec<Expr> = net_production_rates(&mech, &Expr::Var("T".to_owned()), &C_sym);
/// assert_eq!(wdot.len(), wdot_sym.len());
/// ```
pub mod rates;
#[cfg(test)]
mod kinetics_tests;
