use crate::commodity::Commodity;
use crate::error::{SimResult, require_finite};
use crate::ids::CountryId;
use crate::state::SimulationState;

/// Excess-demand price adjustment, display smoothing, and CPI (§4.2). Demand
/// and supply are aggregated across the country's regions: supply from
/// `region.supply` (set by the production subsystem this tick), demand from
/// `region.demand` (set by `production::aggregate_consumption_demand`
/// earlier in the same tick — the caller is responsible for populating it
/// before invoking this phase).
pub fn run(state: &mut SimulationState, country_id: CountryId) -> SimResult<()> {
    let delta_max = state.config.delta_max;
    let beta = state.config.beta;
    let sensitivities = state.price_sensitivities;

    let region_ids: Vec<_> = state.country(country_id)?.region_ids.clone();
    let mut demand = [0.0_f64; crate::commodity::K];
    let mut supply = [0.0_f64; crate::commodity::K];
    for region_id in &region_ids {
        let region = state.region(*region_id)?;
        for c in 0..crate::commodity::K {
            demand[c] += region.demand[c];
            supply[c] += region.supply[c];
        }
    }

    let country = state.country_mut(country_id)?;
    for commodity in Commodity::ALL {
        let c = commodity.index();
        let excess = (demand[c] - supply[c]) / supply[c].max(1e-4);
        let excess = excess.clamp(-delta_max, delta_max);
        let mut price = country.prices[c] * (1.0 + sensitivities[c] * excess);
        if country.initial_prices[c] > 0.0 {
            price = price.clamp(0.1 * country.initial_prices[c], 10.0 * country.initial_prices[c]);
        }
        country.prices[c] = require_finite(price, "price adjustment")?;
        country.display_prices[c] = beta * country.prices[c] + (1.0 - beta) * country.display_prices[c];
    }

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for commodity in Commodity::ALL {
        let c = commodity.index();
        let weight = country.consumption_weights[c];
        if weight <= 0.0 || country.initial_prices[c] <= 0.0 {
            continue;
        }
        weighted += weight * (country.prices[c] / country.initial_prices[c]);
        total_weight += weight;
    }
    country.cpi = if total_weight > 0.0 { weighted / total_weight } else { 1.0 };
    require_finite(country.cpi, "CPI")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ids::RegionId;
    use crate::state::{Country, Region, SpendingShares, TaxRates};

    fn country_with_one_region(demand: f64, supply: f64, sensitivity: f64) -> SimulationState {
        let mut state = SimulationState::new(1, 2025, EngineConfig::default());
        state.price_sensitivities = [sensitivity; crate::commodity::K];
        let country_id = CountryId::new(0);
        let region_id = RegionId::new(0);

        let mut country = Country {
            id: country_id,
            code: "ZZ".into(),
            name: "Test".into(),
            gdp: 1000.0,
            previous_gdp: 1000.0,
            cpi: 1.0,
            cpi_year_ago: 1.0,
            labor_force: 100.0,
            employed: 90.0,
            total_wages_cents: 0.0,
            debt_cents: 0.0,
            base_interest_rate: 0.02,
            effective_interest_rate: 0.02,
            fx_reserves_cents: 0.0,
            tax_rates: TaxRates { income: 1500, corporate: 2000, vat: 1000 },
            tax_revenue_cents: 0.0,
            tariff_accrual_cents: 0.0,
            spending_cents: 0.0,
            spending_shares: SpendingShares::default(),
            trade_balance_cents: 0.0,
            import_propensity: [0.0; crate::commodity::K],
            export_propensity: [0.0; crate::commodity::K],
            legitimacy: 50.0,
            corruption: 0.1,
            average_unrest: 10.0,
            war_weariness: 0.0,
            at_war: false,
            military_power: 1.0,
            military_goods_required: 0.0,
            procurement_satisfaction: 1.0,
            region_ids: vec![region_id],
            faction_ids: Vec::new(),
            prices: [100.0; crate::commodity::K],
            display_prices: [100.0; crate::commodity::K],
            initial_prices: [100.0; crate::commodity::K],
            consumption_weights: [1.0; crate::commodity::K],
        };
        country.prices = [100.0; crate::commodity::K];
        state.countries.push(country);
        state.coefficients.matrices.push(crate::matrix::TechnicalCoefficientMatrix::zero());

        let mut region = Region {
            id: region_id,
            country_id,
            name: "Heartland".into(),
            sectors: std::array::from_fn(|_| crate::state::Sector::new(0.0, 0.0)),
            infrastructure_factor: 1.0,
            population: 100.0,
            labor_force: 100.0,
            employed: 90.0,
            average_wage_cents: 100.0,
            unrest: 0.0,
            food_insecurity: 0.0,
            inequality: 0.0,
            inventory: [0.0; crate::commodity::K],
            demand: [demand; crate::commodity::K],
            supply: [supply; crate::commodity::K],
            deposit_ids: Vec::new(),
            extraction_facility_ids: Vec::new(),
            manufacturing_facility_ids: Vec::new(),
            cohort_ids: Vec::new(),
        };
        region.demand = [demand; crate::commodity::K];
        region.supply = [supply; crate::commodity::K];
        state.regions.push(region);
        state
    }

    /// §8 scenario 3: P=100, D=150, S=100, sigma=0.15 -> excess=0.5, new
    /// price 107.5.
    #[test]
    fn price_adjustment_scenario_three() {
        let mut state = country_with_one_region(150.0, 100.0, 0.15);
        run(&mut state, CountryId::new(0)).unwrap();
        let price = state.countries[0].prices[0];
        assert!((price - 107.5).abs() < 1e-9, "expected 107.5, got {price}");
    }

    #[test]
    fn pure_equilibrium_leaves_price_unchanged() {
        let mut state = country_with_one_region(100.0, 100.0, 0.15);
        run(&mut state, CountryId::new(0)).unwrap();
        let price = state.countries[0].prices[0];
        assert!((price - 100.0).abs() < 1e-12);
    }

    #[test]
    fn price_clamped_to_bounds() {
        let mut state = country_with_one_region(100_000.0, 1.0, 1.0);
        state.config.delta_max = 20.0;
        run(&mut state, CountryId::new(0)).unwrap();
        let price = state.countries[0].prices[0];
        assert!((price - 1000.0).abs() < 1e-6, "expected ceiling 1000, got {price}");
    }
}
