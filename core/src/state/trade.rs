use serde::{Deserialize, Serialize};

use crate::commodity::K;
use crate::ids::{CountryId, TradeRelationId};

/// A directed trade relation `(from, to)`: exporter `from`, importer `to`.
/// Tariffs are imposed by `to` on imports from `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRelation {
    pub id: TradeRelationId,
    pub from: CountryId,
    pub to: CountryId,

    pub tariff_rate: [f64; K],
    pub base_volume: [f64; K],
    pub current_volume: [f64; K],

    pub diplomatic_score: f64,
    pub reliability: f64,
    pub distance_penalty: f64,
    pub treaty_bonus: f64,
    pub sanction_severity: f64,
    pub transport_cost_per_unit: f64,
}

impl TradeRelation {
    pub fn new(id: TradeRelationId, from: CountryId, to: CountryId) -> Self {
        Self {
            id,
            from,
            to,
            tariff_rate: [0.0; K],
            base_volume: [0.0; K],
            current_volume: [0.0; K],
            diplomatic_score: 0.0,
            reliability: 1.0,
            distance_penalty: 0.0,
            treaty_bonus: 0.0,
            sanction_severity: 0.0,
            transport_cost_per_unit: 0.0,
        }
    }
}
