use serde::{Deserialize, Serialize};

use crate::commodity::Commodity;
use crate::ids::{ManufacturingFacilityId, RegionId};
use crate::state::deposit::CostBundle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingFacility {
    pub id: ManufacturingFacilityId,
    pub region_id: RegionId,
    pub output_commodity: Commodity,
    pub base_capacity_per_level: f64,

    pub level: u8,
    pub condition: f64,
    pub workers: f64,
    pub workers_required: f64,
    pub under_construction: bool,
    pub construction_progress: f64,
    pub base_build_time: f64,
    pub degradation_rate: f64,
    pub maintenance_cost: CostBundle,
    pub build_cost: CostBundle,
    pub output_this_tick: f64,
    pub tech_modifier: f64,
}

impl ManufacturingFacility {
    pub fn new(id: ManufacturingFacilityId, region_id: RegionId, output_commodity: Commodity, base_capacity_per_level: f64) -> Self {
        Self {
            id,
            region_id,
            output_commodity,
            base_capacity_per_level,
            level: 0,
            condition: 1.0,
            workers: 0.0,
            workers_required: 0.0,
            under_construction: false,
            construction_progress: 0.0,
            base_build_time: 4.0,
            degradation_rate: 0.01,
            maintenance_cost: CostBundle::zero(),
            build_cost: CostBundle::zero(),
            output_this_tick: 0.0,
            tech_modifier: 1.0,
        }
    }

    pub fn is_operational(&self) -> bool {
        self.level > 0 && !self.under_construction && self.condition > 0.0
    }

    pub fn base_capacity(&self) -> f64 {
        self.base_capacity_per_level * self.level as f64
    }
}
