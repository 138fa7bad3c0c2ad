use serde::{Deserialize, Serialize};

use crate::ids::FormationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormationType {
    Infantry,
    Armor,
    Artillery,
    AirWing,
    NavalSurface,
    Logistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SupplyStatus {
    FullySupplied,
    Constrained,
    Cutoff,
}

/// Military state is carried and degrades over time (equipment age/quality,
/// per §4.1), but no combat resolution is implemented — this subsystem is an
/// explicit placeholder per §1/§3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryFormation {
    pub id: FormationId,
    pub formation_type: FormationType,

    pub base_strength: f64,
    pub current_strength: f64,
    pub personnel: f64,

    pub training: f64,
    pub maintenance: f64,
    pub morale: f64,

    pub equipment_quality: f64,
    pub equipment_age: f64,
    pub equipment_base_quality: f64,
    pub depreciation_rate: f64,

    pub maintenance_cost_cents: f64,
    pub combat_supply_cost_cents: f64,
    pub supply_status: SupplyStatus,

    pub deployed: bool,
    pub hex_id: u32,
    pub in_combat: bool,
}

impl MilitaryFormation {
    pub fn new(id: FormationId, formation_type: FormationType, base_strength: f64, personnel: f64) -> Self {
        Self {
            id,
            formation_type,
            base_strength,
            current_strength: base_strength,
            personnel,
            training: 0.5,
            maintenance: 0.5,
            morale: 0.5,
            equipment_quality: 1.0,
            equipment_age: 0.0,
            equipment_base_quality: 1.0,
            depreciation_rate: 0.01,
            maintenance_cost_cents: 0.0,
            combat_supply_cost_cents: 0.0,
            supply_status: SupplyStatus::FullySupplied,
            deployed: false,
            hex_id: 0,
            in_combat: false,
        }
    }

    /// Advances equipment age by one tick and recomputes quality:
    /// `quality = base · max(0, 1 − depreciation_rate · age)`, per §4.1.
    pub fn advance_equipment_age(&mut self) {
        self.equipment_age += 1.0;
        self.equipment_quality = (self.equipment_base_quality * (1.0 - self.depreciation_rate * self.equipment_age)).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_quality_decays_linearly_with_age_then_floors_at_zero() {
        let mut f = MilitaryFormation::new(FormationId::new(0), FormationType::Armor, 100.0, 500.0);
        f.depreciation_rate = 0.1;
        for _ in 0..5 {
            f.advance_equipment_age();
        }
        assert!((f.equipment_quality - 0.5).abs() < 1e-9);
        for _ in 0..20 {
            f.advance_equipment_age();
        }
        assert_eq!(f.equipment_quality, 0.0);
    }
}
