use serde::{Deserialize, Serialize};

use crate::commodity::K;
use crate::ids::{CountryId, RegionId};

/// Per-commodity sector record within a region. Small value type, copied
/// freely rather than referenced, per §3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub capacity: f64,
    pub labor_employed: f64,
    pub labor_coefficient: f64,
    pub output: f64,
    pub inventory: f64,
    pub price: f64,
    pub initial_price: f64,
    pub efficiency: f64,
    pub value_added: f64,
    pub wage_cents: f64,
}

impl Sector {
    pub fn new(capacity: f64, labor_coefficient: f64) -> Self {
        Self {
            capacity,
            labor_employed: 0.0,
            labor_coefficient,
            output: 0.0,
            inventory: 0.0,
            price: 1.0,
            initial_price: 1.0,
            efficiency: 1.0,
            value_added: 0.0,
            wage_cents: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub country_id: CountryId,
    pub name: String,

    pub sectors: [Sector; K],

    pub infrastructure_factor: f64,
    pub population: f64,
    pub labor_force: f64,
    pub employed: f64,
    pub average_wage_cents: f64,

    pub unrest: f64,
    pub food_insecurity: f64,
    pub inequality: f64,

    pub inventory: [f64; K],
    pub demand: [f64; K],
    pub supply: [f64; K],

    pub deposit_ids: Vec<crate::ids::DepositId>,
    pub extraction_facility_ids: Vec<crate::ids::ExtractionFacilityId>,
    pub manufacturing_facility_ids: Vec<crate::ids::ManufacturingFacilityId>,
    pub cohort_ids: Vec<crate::ids::CohortId>,
}

impl Region {
    pub fn unemployment_rate(&self) -> f64 {
        if self.labor_force > 0.0 {
            1.0 - self.employed / self.labor_force
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commodity::Commodity;

    #[test]
    fn sector_new_has_sane_defaults() {
        let s = Sector::new(100.0, 0.5);
        assert_eq!(s.capacity, 100.0);
        assert_eq!(s.output, 0.0);
        assert_eq!(s.efficiency, 1.0);
    }

    #[test]
    fn region_sector_indexing_matches_commodity_order() {
        let sectors = std::array::from_fn(|_| Sector::new(10.0, 0.2));
        let region = Region {
            id: RegionId::new(0),
            country_id: CountryId::new(0),
            name: "Heartland".into(),
            sectors,
            infrastructure_factor: 1.0,
            population: 1000.0,
            labor_force: 500.0,
            employed: 450.0,
            average_wage_cents: 100.0,
            unrest: 0.0,
            food_insecurity: 0.0,
            inequality: 0.0,
            inventory: [0.0; K],
            demand: [0.0; K],
            supply: [0.0; K],
            deposit_ids: Vec::new(),
            extraction_facility_ids: Vec::new(),
            manufacturing_facility_ids: Vec::new(),
            cohort_ids: Vec::new(),
        };
        assert_eq!(region.sectors[Commodity::Ore.index()].capacity, 10.0);
        assert!((region.unemployment_rate() - 0.1).abs() < 1e-9);
    }
}
