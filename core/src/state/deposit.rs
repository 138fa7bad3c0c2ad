use serde::{Deserialize, Serialize};

use crate::commodity::Commodity;
use crate::ids::{DepositId, ExtractionFacilityId, RegionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryState {
    Unknown,
    Surveyed,
    Proven,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    pub id: DepositId,
    pub hex_id: u32,
    pub region_id: RegionId,
    pub resource: Commodity,
    pub subtype: String,

    pub total_reserves: f64,
    pub remaining_reserves: f64,
    pub base_yield: f64,
    pub difficulty: f64,
    pub discovery_state: DiscoveryState,
    pub estimated_reserves: f64,
}

impl ResourceDeposit {
    pub fn new(id: DepositId, region_id: RegionId, resource: Commodity, subtype: impl Into<String>, total_reserves: f64, base_yield: f64) -> Self {
        Self {
            id,
            hex_id: 0,
            region_id,
            resource,
            subtype: subtype.into(),
            total_reserves,
            remaining_reserves: total_reserves,
            base_yield,
            difficulty: 1.0,
            discovery_state: DiscoveryState::Unknown,
            estimated_reserves: 0.0,
        }
    }

    /// Extraction consumes `amount` from remaining reserves, never driving it
    /// negative (§3 global invariant).
    pub fn extract(&mut self, amount: f64) -> f64 {
        let extracted = amount.min(self.remaining_reserves).max(0.0);
        self.remaining_reserves -= extracted;
        self.remaining_reserves = self.remaining_reserves.max(0.0);
        extracted
    }
}

/// Facility cost/maintenance bundle: per-commodity quantities plus a money
/// cost, per §3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBundle {
    pub commodities: [f64; crate::commodity::K],
    pub money_cents: f64,
}

impl CostBundle {
    pub fn zero() -> Self {
        Self { commodities: [0.0; crate::commodity::K], money_cents: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFacility {
    pub id: ExtractionFacilityId,
    pub deposit_id: DepositId,
    pub region_id: RegionId,

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

impl ExtractionFacility {
    pub fn new(id: ExtractionFacilityId, deposit_id: DepositId, region_id: RegionId) -> Self {
        Self {
            id,
            deposit_id,
            region_id,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_never_exceeds_remaining_and_never_goes_negative() {
        let mut d = ResourceDeposit::new(DepositId::new(0), RegionId::new(0), Commodity::Petroleum, "shale", 100.0, 10.0);
        assert_eq!(d.extract(40.0), 40.0);
        assert_eq!(d.remaining_reserves, 60.0);
        assert_eq!(d.extract(1000.0), 60.0);
        assert_eq!(d.remaining_reserves, 0.0);
        assert_eq!(d.extract(5.0), 0.0);
    }

    #[test]
    fn operational_requires_level_and_condition() {
        let mut f = ExtractionFacility::new(ExtractionFacilityId::new(0), DepositId::new(0), RegionId::new(0));
        assert!(!f.is_operational());
        f.level = 1;
        assert!(f.is_operational());
        f.under_construction = true;
        assert!(!f.is_operational());
        f.under_construction = false;
        f.condition = 0.0;
        assert!(!f.is_operational());
    }
}
