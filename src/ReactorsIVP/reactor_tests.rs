use super::ReactorError;
use super::flow_devices::{MassFlowController, Reservoir};
use super::reactor_equations::{numeric_rhs, state_vector, symbolic_system};
use super::reactor_net::{IntegratorSettings, ReactorNet, SolverKind, StopCondition, stopped_short};
use super::reactors::{IdealGasConstPressureReactor, IdealGasReactor, Reactor, ReactorModel};
use super::solution_array::SolutionArray;
use crate::Mechanism::mechanism_tests::{bundled_bfer, bundled_skeletal};
use crate::Thermodynamics::solution::Solution;
use crate::Thermodynamics::{ONE_ATM, R_G};
use approx::assert_relative_eq;

fn methane_air(T: f64) -> Solution {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX_str(T, ONE_ATM, "CH4:1, O2:2, N2:7.52").unwrap();
    gas
}

/// partially burnt state, every species present
fn burning_gas(T: f64) -> Solution {
    let mut gas = Solution::new(bundled_bfer());
    gas.set_TPX_str(
        T,
        ONE_ATM,
        "CH4:0.5, O2:1.2, H2O:0.6, CO:0.2, CO2:0.2, N2:7.52, H:0.01, O:0.01, OH:0.02, NO:0.001",
    )
    .unwrap();
    gas
}

fn cstr(volume: f64, inlet_T: f64, reactor_T: f64, residence_time: f64) -> Reactor {
    let inlet = methane_air(inlet_T);
    let mut reactor = IdealGasReactor::new("cstr", burning_gas(reactor_T), volume).unwrap();
    let mdot = volume * inlet.density() / residence_time;
    let upstream = Reservoir::new("upstream", &inlet);
    reactor.add_inlet(upstream.clone(), MassFlowController::new(mdot).unwrap());
    reactor.add_outlet(MassFlowController::new(mdot).unwrap(), Some(upstream));
    Reactor::from(reactor)
}

#[test]
fn symbolic_rhs_matches_numeric() {
    let reactors = vec![
        cstr(1e-3, 650.0, 1800.0, 0.05),
        Reactor::from(IdealGasConstPressureReactor::new("pfr", burning_gas(1500.0), 2e-3).unwrap()),
    ];
    for reactor in reactors {
        let (equations, unknowns) = symbolic_system(&reactor);
        assert_eq!(equations.len(), unknowns.len());
        assert_eq!(&unknowns[..3], &["m".to_owned(), "T".to_owned(), "Y0".to_owned()]);
        let state = state_vector(&reactor);
        let numeric = numeric_rhs(&reactor, &state);
        let vars: Vec<&str> = unknowns.iter().map(|s| s.as_str()).collect();
        for (i, eq) in equations.iter().enumerate() {
            let f = eq.lambdify_owned(vars.clone());
            assert_relative_eq!(f(state.clone()), numeric[i], max_relative = 1e-8, epsilon = 1e-10);
        }
    }
}

#[test]
fn closed_constant_volume_reactor_keeps_internal_energy() {
    let reactor = Reactor::from(IdealGasReactor::new("r", burning_gas(1600.0), 1e-3).unwrap());
    let state = state_vector(&reactor);
    let rhs = numeric_rhs(&reactor, &state);
    assert_eq!(rhs[0], 0.0);
    let dY: f64 = rhs[2..].iter().sum();
    assert!(dY.abs() < 1e-9 * rhs[2..].iter().fold(0.0_f64, |m, x| m.max(x.abs())));

    // du/dt = cv dT/dt + sum(u_k/W_k dY_k/dt) = 0
    let gas = reactor.contents();
    let T = gas.T();
    let mech = gas.mechanism();
    let W = mech.molar_masses();
    let du_species: f64 = mech
        .species
        .iter()
        .zip(&W)
        .zip(&rhs[2..])
        .map(|((s, w), dy)| (s.thermo.h_RT(&T) - 1.0) * R_G * T / w * dy)
        .sum();
    let du = gas.cv_mass() * rhs[1] + du_species;
    assert!(du.abs() < 1e-8 * du_species.abs(), "du/dt = {}", du);
}

#[test]
fn closed_constant_pressure_reactor_keeps_enthalpy() {
    let reactor = Reactor::from(IdealGasConstPressureReactor::new("r", burning_gas(1600.0), 1e-3).unwrap());
    let state = state_vector(&reactor);
    let rhs = numeric_rhs(&reactor, &state);
    let gas = reactor.contents();
    let T = gas.T();
    let mech = gas.mechanism();
    let W = mech.molar_masses();
    let dh_species: f64 = mech
        .species
        .iter()
        .zip(&W)
        .zip(&rhs[2..])
        .map(|((s, w), dy)| s.thermo.h_RT(&T) * R_G * T / w * dy)
        .sum();
    let dh = gas.cp_mass() * rhs[1] + dh_species;
    assert!(dh.abs() < 1e-8 * dh_species.abs(), "dh/dt = {}", dh);
    // heat release of burning methane
    assert!(rhs[1] > 0.0);
}

#[test]
fn inert_stirred_reactor_relaxes_toward_inlet() {
    let mech = bundled_bfer();
    let mut inlet = Solution::new(mech.clone());
    inlet.set_TPX_str(300.0, ONE_ATM, "N2:1").unwrap();
    let mut hot = Solution::new(mech);
    hot.set_TPX_str(300.0, ONE_ATM, "N2:1").unwrap();
    let volume = 1e-3;
    let mdot = volume * inlet.density() / 0.1;

    let build = |gas: &Solution| {
        let mut reactor = IdealGasReactor::new("cstr", gas.clone(), volume).unwrap();
        reactor.add_inlet(Reservoir::new("in", &inlet), MassFlowController::new(mdot).unwrap());
        reactor.add_outlet(MassFlowController::new(mdot).unwrap(), None);
        Reactor::from(reactor)
    };
    // same state as the inlet: steady
    let steady = build(&hot);
    let rhs = numeric_rhs(&steady, &state_vector(&steady));
    for r in &rhs {
        assert!(r.abs() < 1e-9, "rhs {:?}", rhs);
    }
    // hotter reactor cools down
    hot.set_TPX_str(1000.0, ONE_ATM, "N2:1").unwrap();
    let cooling = build(&hot);
    let rhs = numeric_rhs(&cooling, &state_vector(&cooling));
    assert!(rhs[1] < 0.0);
    assert_eq!(rhs[0], 0.0);
}

#[test]
fn integrator_settings_validation_and_json() {
    let settings = IntegratorSettings::default();
    assert!(settings.validate().is_ok());
    let json = serde_json::to_string(&settings).unwrap();
    let back: IntegratorSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
    let partial: IntegratorSettings = serde_json::from_str(r#"{"solver": "Radau", "rtol": 1e-5}"#).unwrap();
    assert_eq!(partial.solver, SolverKind::Radau);
    assert_relative_eq!(partial.atol, settings.atol);
    let bad = IntegratorSettings {
        rtol: -1.0,
        ..Default::default()
    };
    assert!(matches!(bad.validate(), Err(ReactorError::InvalidParameter(_))));
    let bad = IntegratorSettings {
        max_step: Some(0.0),
        ..Default::default()
    };
    assert!(bad.validate().is_err());
    let params = settings.solver_params(0.5);
    assert_eq!(params.len(), 10);
}

#[test]
fn invalid_reactor_parameters() {
    assert!(IdealGasReactor::new("r", methane_air(300.0), 0.0).is_err());
    assert!(IdealGasConstPressureReactor::new("r", methane_air(300.0), -1.0).is_err());
    let reactor = IdealGasReactor::new("r", methane_air(300.0), 1e-3).unwrap();
    assert!(matches!(
        reactor.gas_at(-1.0, 300.0, methane_air(300.0).Y()),
        Err(ReactorError::Solver(_))
    ));
}

#[test]
fn constant_volume_pressure_follows_mass_and_temperature() {
    let gas = methane_air(1000.0);
    let rho = gas.density();
    let mut reactor = IdealGasReactor::new("r", gas.clone(), 2e-3).unwrap();
    assert_relative_eq!(reactor.mass(), rho * 2e-3, max_relative = 1e-12);
    let Y = gas.Y().to_vec();
    reactor.sync_state(rho * 2e-3, 2000.0, &Y).unwrap();
    assert_relative_eq!(reactor.contents().P(), 2.0 * ONE_ATM, max_relative = 1e-10);

    let mut cp_reactor = IdealGasConstPressureReactor::new("r", gas, 2e-3).unwrap();
    cp_reactor.sync_state(rho * 2e-3, 2000.0, &Y).unwrap();
    assert_relative_eq!(cp_reactor.contents().P(), ONE_ATM);
    assert_relative_eq!(cp_reactor.volume(), 4e-3, max_relative = 1e-10);
}

fn sample_array() -> SolutionArray {
    let mut states = SolutionArray::new(&bundled_bfer());
    for (t, T) in [(0.0, 1000.0), (1.0, 1200.0), (3.0, 1600.0)] {
        states.push(t, &methane_air(T)).unwrap();
    }
    states
}

#[test]
fn solution_array_resample_and_columns() {
    let mut states = sample_array();
    assert_eq!(states.len(), 3);
    states.add_column("z", vec![0.0, 1.0, 2.0]).unwrap();
    assert!(states.add_column("u", vec![1.0]).is_err());
    assert!(states.push(4.0, &methane_air(1000.0)).is_err());

    let fine = states.resample(&[0.0, 0.5, 2.0, 3.0, 3.0 + 1e-12]).unwrap();
    assert_eq!(fine.T()[..4], [1000.0, 1100.0, 1400.0, 1600.0]);
    assert_relative_eq!(fine.T()[4], 1600.0, max_relative = 1e-9);
    assert_eq!(fine.column("z").unwrap()[..4], [0.0, 0.5, 1.5, 2.0]);
    assert_relative_eq!(
        fine.X("CH4").unwrap()[1],
        states.X("CH4").unwrap()[0],
        max_relative = 1e-12
    );
    assert!(matches!(fine.X("C2H2"), Err(ReactorError::UnknownColumn(_))));
    assert!(fine.column("velocity").is_err());
    assert_relative_eq!(fine.column("t").unwrap()[2], 2.0);

    // a trajectory that ended early is not padded with its last state
    assert!(matches!(states.resample(&[0.5, 10.0]), Err(ReactorError::OutOfRange(_))));
    assert!(matches!(states.resample(&[-1.0]), Err(ReactorError::OutOfRange(_))));
    assert!(matches!(states.resample(&[f64::NAN]), Err(ReactorError::OutOfRange(_))));
}

#[test]
fn early_solver_stop_is_detected() {
    assert!(!stopped_short(0.5, 0.5));
    assert!(!stopped_short(0.5 - 1e-14, 0.5));
    assert!(!stopped_short(0.6, 0.5));
    assert!(stopped_short(0.3, 0.5));
    assert!(stopped_short(99.0, 100.0));
}

#[test]
fn solution_array_csv_export() {
    let mut states = sample_array();
    states.add_column("z", vec![0.0, 1.0, 2.0]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("states.csv");
    states.write_csv(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("t,T,P,density,z,X_CH4,X_O2"));
    let first: Vec<f64> = lines[1].split(',').map(|v| v.parse().unwrap()).collect();
    assert_eq!(first.len(), 5 + states.species_names().len());
    assert_relative_eq!(first[1], 1000.0);
    assert_relative_eq!(first[5], 1.0 / 10.52, max_relative = 1e-10);

    // column names with a comma stay one field
    states.add_column("u, m/s", vec![0.1, 0.2, 0.3]).unwrap();
    states.write_csv(&path).unwrap();
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.len(), 6 + states.species_names().len());
    assert_eq!(&header[5], "u, m/s");
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(row.len(), header.len());
    assert_relative_eq!(row[5].parse::<f64>().unwrap(), 0.1);
}

#[test]
fn advance_rejects_past_targets() {
    let reactor = IdealGasConstPressureReactor::new("r", methane_air(300.0), 1e-3).unwrap();
    let mut net = ReactorNet::new(Reactor::from(reactor), IntegratorSettings::default()).unwrap();
    assert!(matches!(net.advance(0.0), Err(ReactorError::InvalidParameter(_))));
    assert!(net.integrate(f64::NAN).is_err());
    assert_eq!(net.unknowns().len(), 12);
}

#[test]
fn constant_pressure_ignition_conserves_enthalpy() {
    let gas = methane_air(1500.0);
    let h0 = gas.enthalpy_mass();
    let reactor = IdealGasConstPressureReactor::new("r", gas, 1e-3).unwrap();
    let mut net = ReactorNet::new(Reactor::from(reactor), IntegratorSettings::default()).unwrap();
    let outcome = net.integrate_until(0.5, StopCondition::TemperatureAbove(1650.0)).unwrap();
    let t_ign = outcome.stop_time.expect("stoichiometric methane/air ignites at 1500 K");
    assert!(t_ign > 0.0 && t_ign < 0.5);
    assert_relative_eq!(net.time(), outcome.states.time()[outcome.states.len() - 1]);
    assert!(net.reactor().contents().T() > 1650.0);
    // the run continues to the horizon from where it stopped
    let rest = net.integrate(0.5).unwrap();
    let gas = net.reactor().contents();
    assert!(gas.T() > 2000.0, "final T {}", gas.T());
    assert!(rest.len() > 1);
    assert!((gas.enthalpy_mass() - h0).abs() < 1e-3 * gas.cp_mass() * gas.T());
    assert_relative_eq!(gas.P(), ONE_ATM);
}

#[test]
fn hydrogen_ignition_through_three_body_and_falloff_steps() {
    let mut gas = Solution::new(bundled_skeletal());
    gas.set_TPX_str(1200.0, ONE_ATM, "H2:2, O2:1, AR:7").unwrap();
    let h0 = gas.enthalpy_mass();
    let reactor = IdealGasConstPressureReactor::new("r", gas, 1e-3).unwrap();
    let mut net = ReactorNet::new(Reactor::from(reactor), IntegratorSettings::default()).unwrap();
    let outcome = net.integrate_until(0.01, StopCondition::TemperatureAbove(1400.0)).unwrap();
    let t_ign = outcome.stop_time.expect("hydrogen/oxygen ignites at 1200 K");
    assert!(t_ign > 1e-6 && t_ign < 0.01, "delay {}", t_ign);

    let states = &outcome.states;
    let T = states.T();
    // the recorded run ends on the first state past the threshold
    let crossing = T.iter().position(|&T| T > 1400.0).unwrap();
    assert_eq!(crossing, states.len() - 1);
    assert!(crossing > 0);
    assert!(t_ign > states.time()[crossing - 1] && t_ign <= states.time()[crossing]);
    // HO2 is formed by H + O2 + M before the runaway
    assert!(states.X("HO2").unwrap()[crossing] > 0.0);

    net.integrate(0.01).unwrap();
    let gas = net.reactor().contents();
    assert!(gas.T() > 1800.0, "final T {}", gas.T());
    assert!(gas.mole_fraction("H2O").unwrap() > 0.1);
    assert!((gas.enthalpy_mass() - h0).abs() < 1e-3 * gas.cp_mass() * gas.T());
    assert_relative_eq!(gas.P(), ONE_ATM);
}

#[test]
fn network_tables_print() {
    let net = ReactorNet::new(cstr(1e-3, 650.0, 2000.0, 0.1), IntegratorSettings::default()).unwrap();
    net.pretty_print_task();
    net.pretty_print_equations();
    assert_eq!(net.unknowns()[0], "m");
    assert_eq!(net.unknowns()[1], "T");
    net.reactor().contents().pretty_print();
    net.reactor().contents().mechanism().pretty_print();
}
