/// Atomic masses and element bookkeeping for species compositions
use super::MechanismError;
use nalgebra::DMatrix;
use std::collections::BTreeMap;

pub struct Element {
    name: &'static str,
    /// g/mol
    atomic_mass: f64,
}

const ELEMENTS: &[Element] = &[
    Element { name: "E", atomic_mass: 5.48579909e-4 },
    Element { name: "H", atomic_mass: 1.008 },
    Element { name: "D", atomic_mass: 2.014 },
    Element { name: "He", atomic_mass: 4.002602 },
    Element { name: "Li", atomic_mass: 6.94 },
    Element { name: "Be", atomic_mass: 9.0121831 },
    Element { name: "B", atomic_mass: 10.81 },
    Element { name: "C", atomic_mass: 12.011 },
    Element { name: "N", atomic_mass: 14.007 },
    Element { name: "O", atomic_mass: 15.999 },
    Element { name: "F", atomic_mass: 18.998403163 },
    Element { name: "Ne", atomic_mass: 20.1797 },
    Element { name: "Na", atomic_mass: 22.98976928 },
    Element { name: "Mg", atomic_mass: 24.305 },
    Element { name: "Al", atomic_mass: 26.9815385 },
    Element { name: "Si", atomic_mass: 28.085 },
    Element { name: "P", atomic_mass: 30.973761998 },
    Element { name: "S", atomic_mass: 32.06 },
    Element { name: "Cl", atomic_mass: 35.45 },
    Element { name: "Ar", atomic_mass: 39.95 },
    Element { name: "K", atomic_mass: 39.0983 },
    Element { name: "Ca", atomic_mass: 40.078 },
    Element { name: "Ti", atomic_mass: 47.867 },
    Element { name: "Cr", atomic_mass: 51.9961 },
    Element { name: "Fe", atomic_mass: 55.845 },
    Element { name: "Ni", atomic_mass: 58.6934 },
    Element { name: "Cu", atomic_mass: 63.546 },
    Element { name: "Zn", atomic_mass: 65.38 },
    Element { name: "Br", atomic_mass: 79.904 },
    Element { name: "Kr", atomic_mass: 83.798 },
    Element { name: "I", atomic_mass: 126.90447 },
    Element { name: "Xe", atomic_mass: 131.293 },
];

/// Atomic mass in g/mol. Element symbols are matched case-insensitively, mechanism files
/// write argon as both `Ar` and `AR`.
pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(symbol))
        .map(|e| e.atomic_mass)
}

/// Canonical spelling of an element symbol (`AR` -> `Ar`).
pub fn canonical_symbol(symbol: &str) -> Option<&'static str> {
    ELEMENTS
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(symbol))
        .map(|e| e.name)
}

/// Molar mass of a composition in kg/mol
pub fn molar_mass(composition: &BTreeMap<String, f64>) -> Result<f64, MechanismError> {
    let mut mass = 0.0;
    for (element, count) in composition {
        let m = atomic_mass(element).ok_or_else(|| MechanismError::UnknownElement(element.clone()))?;
        mass += m * count;
    }
    Ok(mass * 1e-3)
}

/// Element composition matrix: one row per composition, one column per element.
pub fn create_elem_composition_matrix(
    compositions: &[&BTreeMap<String, f64>],
    elements: &[String],
) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(compositions.len(), elements.len());
    for (i, composition) in compositions.iter().enumerate() {
        for (j, element) in elements.iter().enumerate() {
            if let Some(count) = composition.get(element) {
                matrix[(i, j)] = *count;
            }
        }
    }
    matrix
}
