use super::ReactorError;
use crate::Mechanism::Mechanism;
use crate::Thermodynamics::solution::Solution;
use log::info;
use std::path::Path;

/// Ordered reactor states (t, T, P, density, Y) with optional extra columns
#[derive(Debug, Clone)]
pub struct SolutionArray {
    species: Vec<String>,
    molar_masses: Vec<f64>,
    t: Vec<f64>,
    T: Vec<f64>,
    P: Vec<f64>,
    density: Vec<f64>,
    Y: Vec<Vec<f64>>,
    extra: Vec<(String, Vec<f64>)>,
}

impl SolutionArray {
    pub fn new(mechanism: &Mechanism) -> Self {
        Self {
            species: mechanism.species_names(),
            molar_masses: mechanism.molar_masses(),
            t: Vec::new(),
            T: Vec::new(),
            P: Vec::new(),
            density: Vec::new(),
            Y: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Append the state of `gas` at time `t`. Extra columns must be added after the last push.
    pub fn push(&mut self, t: f64, gas: &Solution) -> Result<(), ReactorError> {
        if gas.n_species() != self.species.len() {
            return Err(ReactorError::InvalidParameter(format!(
                "state with {} species pushed to an array of {}",
                gas.n_species(),
                self.species.len()
            )));
        }
        if !self.extra.is_empty() {
            return Err(ReactorError::InvalidParameter(
                "cannot append states once extra columns are set".to_owned(),
            ));
        }
        self.t.push(t);
        self.T.push(gas.T());
        self.P.push(gas.P());
        self.density.push(gas.density());
        self.Y.push(gas.Y().to_vec());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
    pub fn species_names(&self) -> &[String] {
        &self.species
    }
    pub fn time(&self) -> &[f64] {
        &self.t
    }
    pub fn T(&self) -> &[f64] {
        &self.T
    }
    pub fn P(&self) -> &[f64] {
        &self.P
    }
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    fn species_index(&self, name: &str) -> Result<usize, ReactorError> {
        self.species
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| ReactorError::UnknownColumn(name.to_owned()))
    }

    /// mass fraction history of one species
    pub fn Y(&self, species: &str) -> Result<Vec<f64>, ReactorError> {
        let k = self.species_index(species)?;
        Ok(self.Y.iter().map(|y| y[k]).collect())
    }

    fn mole_fractions(&self, Y: &[f64]) -> Vec<f64> {
        let moles: Vec<f64> = Y.iter().zip(&self.molar_masses).map(|(y, w)| y / w).collect();
        let total: f64 = moles.iter().sum();
        moles.into_iter().map(|n| n / total).collect()
    }

    /// mole fraction history of one species
    pub fn X(&self, species: &str) -> Result<Vec<f64>, ReactorError> {
        let k = self.species_index(species)?;
        Ok(self.Y.iter().map(|y| self.mole_fractions(y)[k]).collect())
    }

    /// Add a derived column such as velocity or position; one value per state.
    pub fn add_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), ReactorError> {
        if values.len() != self.len() {
            return Err(ReactorError::InvalidParameter(format!(
                "column {} has {} values for {} states",
                name,
                values.len(),
                self.len()
            )));
        }
        self.extra.retain(|(n, _)| n != name);
        self.extra.push((name.to_owned(), values));
        Ok(())
    }

    /// `t`, `T`, `P`, `density` or an extra column
    pub fn column(&self, name: &str) -> Result<&[f64], ReactorError> {
        match name {
            "t" => Ok(&self.t),
            "T" => Ok(&self.T),
            "P" => Ok(&self.P),
            "density" => Ok(&self.density),
            _ => self
                .extra
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_slice())
                .ok_or_else(|| ReactorError::UnknownColumn(name.to_owned())),
        }
    }

    /// Linear interpolation of every column onto `times`. Every time must lie within the
    /// recorded range up to round-off; a run that ended early is not extrapolated.
    pub fn resample(&self, times: &[f64]) -> Result<SolutionArray, ReactorError> {
        if self.is_empty() {
            return Err(ReactorError::InvalidParameter("cannot resample an empty array".to_owned()));
        }
        let (first, last) = (self.t[0], self.t[self.len() - 1]);
        let slack = 1e-9 * first.abs().max(last.abs()).max(last - first).max(f64::MIN_POSITIVE);
        if let Some(tau) = times
            .iter()
            .find(|&&tau| !(tau >= first - slack && tau <= last + slack))
        {
            return Err(ReactorError::OutOfRange(format!(
                "t = {} requested, states recorded from t = {} to t = {}",
                tau, first, last
            )));
        }
        let weights: Vec<(usize, usize, f64)> = times.iter().map(|&tau| self.bracket(tau)).collect();
        let lerp = |v: &[f64], (i0, i1, w): (usize, usize, f64)| v[i0] + w * (v[i1] - v[i0]);
        let column = |v: &[f64]| weights.iter().map(|&b| lerp(v, b)).collect::<Vec<f64>>();
        let Y: Vec<Vec<f64>> = weights
            .iter()
            .map(|&(i0, i1, w)| {
                self.Y[i0]
                    .iter()
                    .zip(&self.Y[i1])
                    .map(|(a, b)| a + w * (b - a))
                    .collect()
            })
            .collect();
        Ok(SolutionArray {
            species: self.species.clone(),
            molar_masses: self.molar_masses.clone(),
            t: times.to_vec(),
            T: column(&self.T[..]),
            P: column(&self.P[..]),
            density: column(&self.density[..]),
            Y,
            extra: self
                .extra
                .iter()
                .map(|(name, v)| (name.clone(), column(v.as_slice())))
                .collect(),
        })
    }

    fn bracket(&self, tau: f64) -> (usize, usize, f64) {
        let last = self.len() - 1;
        let idx = self.t.partition_point(|&x| x <= tau);
        if idx == 0 {
            (0, 0, 0.0)
        } else if idx > last {
            (last, last, 0.0)
        } else {
            let (t0, t1) = (self.t[idx - 1], self.t[idx]);
            let w = if t1 > t0 { (tau - t0) / (t1 - t0) } else { 1.0 };
            (idx - 1, idx, w)
        }
    }

    /// Columns: t, T, P, density, extra columns, then the mole fraction of every species.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ReactorError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut out = csv::Writer::from_path(path)?;
        let mut header = vec!["t".to_owned(), "T".to_owned(), "P".to_owned(), "density".to_owned()];
        header.extend(self.extra.iter().map(|(n, _)| n.clone()));
        header.extend(self.species.iter().map(|s| format!("X_{}", s)));
        out.write_record(&header)?;
        for i in 0..self.len() {
            let mut row = vec![self.t[i], self.T[i], self.P[i], self.density[i]];
            row.extend(self.extra.iter().map(|(_, v)| v[i]));
            row.extend(self.mole_fractions(&self.Y[i]));
            out.write_record(row.iter().map(|v| format!("{:e}", v)))?;
        }
        out.flush()?;
        info!("{} states written to {}", self.len(), path.display());
        Ok(())
    }
}
