use serde::{Deserialize, Serialize};

use crate::commodity::K;
use crate::ids::{CountryId, FactionId, RegionId};
use crate::matrix::TechnicalCoefficientMatrix;

/// Policy knobs on government spending. Shares are not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendingShares {
    pub welfare: f64,
    pub education: f64,
    pub defense: f64,
    pub infrastructure: f64,
    pub healthcare: f64,
}

impl Default for SpendingShares {
    fn default() -> Self {
        Self {
            welfare: 0.25,
            education: 0.15,
            defense: 0.2,
            infrastructure: 0.25,
            healthcare: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    pub income: i64,
    pub corporate: i64,
    pub vat: i64,
}

impl TaxRates {
    pub fn income_rate(&self) -> f64 {
        self.income as f64 / 10_000.0
    }
    pub fn corporate_rate(&self) -> f64 {
        self.corporate as f64 / 10_000.0
    }
    pub fn vat_rate(&self) -> f64 {
        self.vat as f64 / 10_000.0
    }
}

/// A single sovereign economy: identity, fiscal ledger, political and trade
/// aggregates, and market state. Regions and factions are referenced by id,
/// never embedded, so the arena never has to resolve a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub code: String,
    pub name: String,

    pub gdp: f64,
    pub previous_gdp: f64,
    pub cpi: f64,
    pub cpi_year_ago: f64,

    pub labor_force: f64,
    pub employed: f64,
    pub total_wages_cents: f64,

    pub debt_cents: f64,
    pub base_interest_rate: f64,
    pub effective_interest_rate: f64,
    pub fx_reserves_cents: f64,
    pub tax_rates: TaxRates,
    pub tax_revenue_cents: f64,
    /// Tariff revenue accrued by the trade subsystem since the last fiscal
    /// run; consumed and reset to 0 each time the fiscal subsystem runs.
    pub tariff_accrual_cents: f64,
    pub spending_cents: f64,
    pub spending_shares: SpendingShares,

    pub trade_balance_cents: f64,
    pub import_propensity: [f64; K],
    pub export_propensity: [f64; K],

    pub legitimacy: f64,
    pub corruption: f64,
    pub average_unrest: f64,
    pub war_weariness: f64,
    pub at_war: bool,

    pub military_power: f64,
    pub military_goods_required: f64,
    pub procurement_satisfaction: f64,

    pub region_ids: Vec<RegionId>,
    pub faction_ids: Vec<FactionId>,

    pub prices: [f64; K],
    pub display_prices: [f64; K],
    pub initial_prices: [f64; K],
    pub consumption_weights: [f64; K],
}

impl Country {
    pub fn debt_to_gdp(&self) -> f64 {
        if self.gdp > 0.0 {
            self.debt_cents / self.gdp
        } else {
            0.0
        }
    }

    /// `sustainable ⟺ D/GDP < 1.5` per §4.5.
    pub fn debt_sustainable(&self, ceiling: f64) -> bool {
        self.debt_to_gdp() < ceiling
    }

    pub fn unemployment_rate(&self) -> f64 {
        if self.labor_force > 0.0 {
            1.0 - self.employed / self.labor_force
        } else {
            0.0
        }
    }

    pub fn annual_inflation(&self) -> f64 {
        if self.cpi_year_ago > 0.0 {
            self.cpi / self.cpi_year_ago - 1.0
        } else {
            0.0
        }
    }
}

/// Parallel-to-countries per-country coefficient matrix store, keyed by
/// `CountryId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoefficientMatrices {
    pub matrices: Vec<TechnicalCoefficientMatrix>,
}

impl CoefficientMatrices {
    pub fn get(&self, id: CountryId) -> &TechnicalCoefficientMatrix {
        &self.matrices[id.index()]
    }

    pub fn get_mut(&mut self, id: CountryId) -> &mut TechnicalCoefficientMatrix {
        &mut self.matrices[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_country() -> Country {
        Country {
            id: CountryId::new(0),
            code: "ZZ".into(),
            name: "Test".into(),
            gdp: 1000.0,
            previous_gdp: 950.0,
            cpi: 1.1,
            cpi_year_ago: 1.0,
            labor_force: 100.0,
            employed: 90.0,
            total_wages_cents: 0.0,
            debt_cents: 800.0,
            base_interest_rate: 0.02,
            effective_interest_rate: 0.02,
            fx_reserves_cents: 0.0,
            tax_rates: TaxRates { income: 1500, corporate: 2000, vat: 1000 },
            tax_revenue_cents: 0.0,
            tariff_accrual_cents: 0.0,
            spending_cents: 0.0,
            spending_shares: SpendingShares::default(),
            trade_balance_cents: 0.0,
            import_propensity: [0.0; K],
            export_propensity: [0.0; K],
            legitimacy: 50.0,
            corruption: 0.1,
            average_unrest: 10.0,
            war_weariness: 0.0,
            at_war: false,
            military_power: 1.0,
            military_goods_required: 0.0,
            procurement_satisfaction: 1.0,
            region_ids: Vec::new(),
            faction_ids: Vec::new(),
            prices: [1.0; K],
            display_prices: [1.0; K],
            initial_prices: [1.0; K],
            consumption_weights: [1.0; K],
        }
    }

    #[test]
    fn debt_to_gdp_and_sustainability() {
        let c = sample_country();
        assert!((c.debt_to_gdp() - 0.8).abs() < 1e-9);
        assert!(c.debt_sustainable(1.5));
        assert!(!c.debt_sustainable(0.5));
    }

    #[test]
    fn unemployment_rate_from_labor_force() {
        let c = sample_country();
        assert!((c.unemployment_rate() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn annual_inflation_from_cpi_history() {
        let c = sample_country();
        assert!((c.annual_inflation() - 0.1).abs() < 1e-9);
    }
}
