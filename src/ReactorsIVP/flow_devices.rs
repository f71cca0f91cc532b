use super::ReactorError;
use crate::Thermodynamics::solution::Solution;

/// Gas source or sink whose state never changes
#[derive(Debug, Clone)]
pub struct Reservoir {
    pub name: String,
    gas: Solution,
    enthalpy_mass: f64,
}

impl Reservoir {
    /// Freezes a copy of `gas`; later changes to `gas` do not reach the reservoir.
    pub fn new(name: &str, gas: &Solution) -> Self {
        Self {
            name: name.to_owned(),
            gas: gas.clone(),
            enthalpy_mass: gas.enthalpy_mass(),
        }
    }
    pub fn gas(&self) -> &Solution {
        &self.gas
    }
    pub fn Y(&self) -> &[f64] {
        self.gas.Y()
    }
    /// J/kg
    pub fn enthalpy_mass(&self) -> f64 {
        self.enthalpy_mass
    }
}

/// Constant mass flow rate between two components, kg/s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassFlowController {
    mdot: f64,
}

impl MassFlowController {
    pub fn new(mdot: f64) -> Result<Self, ReactorError> {
        if !(mdot.is_finite() && mdot >= 0.0) {
            return Err(ReactorError::InvalidParameter(format!(
                "mass flow rate must be non-negative, got {}",
                mdot
            )));
        }
        Ok(Self { mdot })
    }
    pub fn mass_flow_rate(&self) -> f64 {
        self.mdot
    }
    pub fn set_mass_flow_rate(&mut self, mdot: f64) -> Result<(), ReactorError> {
        *self = Self::new(mdot)?;
        Ok(())
    }
}

/// Reservoir feeding a reactor through a controller
#[derive(Debug, Clone)]
pub struct Inlet {
    pub upstream: Reservoir,
    pub controller: MassFlowController,
}

/// Controller draining a reactor, optionally into a reservoir
#[derive(Debug, Clone)]
pub struct Outlet {
    pub controller: MassFlowController,
    pub downstream: Option<Reservoir>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mechanism::mechanism_tests::bundled_bfer;
    use crate::Thermodynamics::ONE_ATM;
    use approx::assert_relative_eq;

    #[test]
    fn reservoir_keeps_its_own_copy() {
        let mut gas = Solution::new(bundled_bfer());
        gas.set_TPX_str(650.0, ONE_ATM, "CH4:1, O2:2, N2:7.52").unwrap();
        let reservoir = Reservoir::new("upstream", &gas);
        let h = gas.enthalpy_mass();
        gas.set_TPX_str(2000.0, ONE_ATM, "N2:1").unwrap();
        assert_relative_eq!(reservoir.gas().T(), 650.0);
        assert_relative_eq!(reservoir.enthalpy_mass(), h);
        assert!(reservoir.Y()[0] > 0.0);
    }

    #[test]
    fn mass_flow_controller_validation() {
        assert!(MassFlowController::new(0.0).is_ok());
        assert!(MassFlowController::new(-1e-3).is_err());
        assert!(MassFlowController::new(f64::INFINITY).is_err());
        let mut mfc = MassFlowController::new(1e-3).unwrap();
        assert!(mfc.set_mass_flow_rate(-2.0).is_err());
        assert_relative_eq!(mfc.mass_flow_rate(), 1e-3);
        mfc.set_mass_flow_rate(2e-3).unwrap();
        assert_relative_eq!(mfc.mass_flow_rate(), 2e-3);
    }
}
