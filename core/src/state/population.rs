use serde::{Deserialize, Serialize};

use crate::commodity::{Commodity, K};
use crate::ids::CohortId;
use crate::ids::RegionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WealthLevel {
    Subsistence,
    Poor,
    Middle,
    Wealthy,
    Rich,
}

impl WealthLevel {
    pub const ALL: [WealthLevel; 5] = [
        WealthLevel::Subsistence,
        WealthLevel::Poor,
        WealthLevel::Middle,
        WealthLevel::Wealthy,
        WealthLevel::Rich,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Fixed lookup table of base consumption per capita keyed by (wealth,
/// commodity), per §3. Richer cohorts consume proportionally more of every
/// good, with the curve steepest for consumer goods and services.
pub struct BaseConsumptionTable {
    rows: [[f64; K]; 5],
}

impl BaseConsumptionTable {
    pub fn get(&self, wealth: WealthLevel, commodity: Commodity) -> f64 {
        self.rows[wealth.index()][commodity.index()]
    }
}

impl Default for BaseConsumptionTable {
    fn default() -> Self {
        // Row order matches `WealthLevel::ALL`; column order matches
        // `Commodity::ALL`. Values are per-capita units per tick.
        let mut rows = [[0.02_f64; K]; 5];
        let multipliers = [0.6, 1.0, 1.6, 2.4, 3.2];
        for (row, mult) in rows.iter_mut().zip(multipliers) {
            for (col, commodity) in row.iter_mut().zip(Commodity::ALL) {
                let base = match commodity {
                    Commodity::Agriculture => 0.30,
                    Commodity::Electricity => 0.20,
                    Commodity::Services => 0.15,
                    Commodity::ConsumerGoods => 0.10,
                    Commodity::Petroleum => 0.05,
                    _ => 0.02,
                };
                *col = base * mult;
            }
        }
        Self { rows }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationCohort {
    pub id: CohortId,
    pub region_id: RegionId,
    pub primary_sector: Commodity,
    pub wealth: WealthLevel,

    pub population: f64,
    pub accumulated_wealth_cents: f64,
    pub income_cents: f64,
    pub cost_of_living_cents: f64,
    pub savings_rate: f64,
    pub consumption_multipliers: [f64; K],
}

impl PopulationCohort {
    pub fn new(id: CohortId, region_id: RegionId, primary_sector: Commodity, wealth: WealthLevel, population: f64) -> Self {
        Self {
            id,
            region_id,
            primary_sector,
            wealth,
            population,
            accumulated_wealth_cents: 0.0,
            income_cents: 0.0,
            cost_of_living_cents: 0.0,
            savings_rate: 0.1,
            consumption_multipliers: [1.0; K],
        }
    }

    pub fn base_consumption(&self, table: &BaseConsumptionTable, commodity: Commodity) -> f64 {
        self.population * table.get(self.wealth, commodity) * self.consumption_multipliers[commodity.index()]
    }
}
