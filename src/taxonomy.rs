// Fuel taxonomy: the canonical set of fuel names the viewer understands, and
// the subset each planning year's template offers.
use crate::types::Year;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;

const FUELS_2030: [&str; 7] = [
    "VLSFO",
    "Bio-methanol",
    "Biodiesel",
    "B24",
    "Blue Ammonia",
    "B30",
    "HVO",
];

const FUELS_2040: [&str; 14] = [
    "VLSFO",
    "Bio-methanol",
    "Biodiesel",
    "B24",
    "Blue Ammonia",
    "B30",
    "HVO",
    "E-Methanol",
    "E-Diesel",
    "Bio-ethanol",
    "B50",
    "Bio-methane",
    "E-methane",
    "E-Ammonia",
];

const FUELS_2050: [&str; 14] = [
    "VLSFO",
    "Bio-methanol",
    "Biodiesel",
    "Bio-methane",
    "E-methane",
    "E-Ammonia",
    "Blue Ammonia",
    "Green Hydrogen",
    "Blue Hydrogen",
    "E-Methanol",
    "E-Diesel",
    "Bio-ethanol",
    "B30",
    "B50",
];

/// Every fuel any year can carry, sorted and deduplicated.
pub static MASTER_FUELS: Lazy<Taxonomy> = Lazy::new(|| {
    Taxonomy::new(
        FUELS_2030
            .iter()
            .chain(FUELS_2040.iter())
            .chain(FUELS_2050.iter())
            .copied(),
    )
});

/// Fuels offered by the template for `year`, in template column order.
pub fn fuels_for_year(year: Year) -> &'static [&'static str] {
    match year {
        Year::Y2030 => &FUELS_2030,
        Year::Y2040 => &FUELS_2040,
        Year::Y2050 => &FUELS_2050,
    }
}

/// Ordered, duplicate-free list of fuel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    fuels: Vec<String>,
}

impl Taxonomy {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Taxonomy { fuels: set.into_iter().collect() }
    }

    pub fn fuels(&self) -> &[String] {
        &self.fuels
    }

    pub fn len(&self) -> usize {
        self.fuels.len()
    }

    pub fn position(&self, fuel: &str) -> Option<usize> {
        self.fuels.binary_search_by(|f| f.as_str().cmp(fuel)).ok()
    }
}
