use crate::commodity::{Commodity, K};
use crate::error::{SimResult, require_finite};
use crate::ids::CountryId;
use crate::state::{BaseConsumptionTable, SimulationState};

/// Runs the soft-Leontief production pipeline for one country: sector
/// output, input consumption, value added, facility output, and supply
/// aggregation (§4.1). Regions are processed in id order; within a region,
/// every sector's output is computed from the *opening* inventory before
/// any sector consumes inputs, so results do not depend on commodity order.
pub fn run(state: &mut SimulationState, country_id: CountryId) -> SimResult<()> {
    let alpha = state.config.alpha;
    let region_ids: Vec<_> = state.country(country_id)?.region_ids.clone();

    for region_id in region_ids {
        let matrix = state.coefficients.get(country_id).clone();
        let country_prices = state.country(country_id)?.prices;

        let region = state.region_mut(region_id)?;
        let infrastructure_factor = region.infrastructure_factor;
        let opening_inventory = region.inventory;

        let mut sector_output = [0.0; K];
        for commodity in Commodity::ALL {
            let sector = region.sectors[commodity.index()];
            let q_cap = sector.capacity;
            let q_lab = if sector.labor_coefficient > 0.0 {
                sector.labor_employed / sector.labor_coefficient
            } else {
                f64::INFINITY
            };

            let mut required = matrix.required_inputs(commodity).peekable();
            let q_in = if required.peek().is_none() {
                q_cap
            } else {
                let mut min_sigma = f64::INFINITY;
                let mut sum_sigma = 0.0;
                let mut count = 0.0;
                for (input, coeff) in required {
                    let needed = coeff * q_cap;
                    let sigma = if needed > 0.0 { (opening_inventory[input.index()] / needed).min(1.0) } else { 1.0 };
                    min_sigma = min_sigma.min(sigma);
                    sum_sigma += sigma;
                    count += 1.0;
                }
                let sigma_avg = sum_sigma / count;
                q_cap * (alpha * min_sigma + (1.0 - alpha) * sigma_avg)
            };

            let q = q_cap.min(q_lab).min(q_in);
            let output = (q * infrastructure_factor * sector.efficiency).max(0.0);
            sector_output[commodity.index()] = require_finite(output, "production output")?;
        }

        // Input consumption: single deterministic pass over the outputs
        // just computed, sector order by commodity index.
        let mut carried = opening_inventory;
        for commodity in Commodity::ALL {
            let output = sector_output[commodity.index()];
            if output <= 0.0 {
                continue;
            }
            for (input, coeff) in matrix.required_inputs(commodity) {
                let consume = (coeff * output).min(carried[input.index()]);
                carried[input.index()] -= consume;
            }
        }

        // Facility output (extraction + manufacturing) accumulates into its
        // own per-commodity totals; reserve caps and degradation are
        // resolved against the deposit/facility arenas directly.
        let extraction_ids = region.extraction_facility_ids.clone();
        let manufacturing_ids = region.manufacturing_facility_ids.clone();
        drop(region);

        let mut extraction_out = [0.0; K];
        for facility_id in extraction_ids {
            let deposit_id = state.extraction_facilities[facility_id.index()].deposit_id;
            let (operational, workforce, condition_factor, level, tech_modifier) = {
                let facility = &state.extraction_facilities[facility_id.index()];
                (
                    facility.is_operational(),
                    if facility.workers_required > 0.0 { (facility.workers / facility.workers_required).min(1.0) } else { 1.0 },
                    facility.condition.max(0.0).sqrt(),
                    facility.level as f64,
                    facility.tech_modifier,
                )
            };
            if !operational {
                state.extraction_facilities[facility_id.index()].output_this_tick = 0.0;
                continue;
            }
            let (extracted, resource) = {
                let deposit = state.deposit_mut(deposit_id)?;
                let raw = deposit.base_yield * level * workforce * condition_factor * infrastructure_factor * tech_modifier;
                let raw = require_finite(raw.max(0.0), "extraction output")?;
                let extracted = deposit.extract(raw);
                (extracted, deposit.resource)
            };
            state.extraction_facilities[facility_id.index()].output_this_tick = extracted;
            extraction_out[resource.index()] += extracted;
        }

        let mut manufacturing_out = [0.0; K];
        for facility_id in manufacturing_ids {
            let facility = &mut state.manufacturing_facilities[facility_id.index()];
            if !facility.is_operational() {
                facility.output_this_tick = 0.0;
                continue;
            }
            let workforce = if facility.workers_required > 0.0 {
                (facility.workers / facility.workers_required).min(1.0)
            } else {
                1.0
            };
            let condition_factor = facility.condition.max(0.0).sqrt();
            let base_capacity = facility.base_capacity();
            let output_commodity = facility.output_commodity;

            let mut min_sigma = 1.0;
            let mut sum_sigma = 0.0;
            let mut count = 0.0;
            for (input, coeff) in matrix.required_inputs(output_commodity) {
                let needed = coeff * base_capacity;
                let sigma = if needed > 0.0 { (carried[input.index()] / needed).min(1.0) } else { 1.0 };
                min_sigma = min_sigma.min(sigma);
                sum_sigma += sigma;
                count += 1.0;
            }
            let input_factor = if count > 0.0 {
                alpha * min_sigma + (1.0 - alpha) * (sum_sigma / count)
            } else {
                1.0
            };

            let facility = &mut state.manufacturing_facilities[facility_id.index()];
            let raw = base_capacity * workforce * condition_factor * infrastructure_factor * facility.tech_modifier * input_factor;
            let output = require_finite(raw.max(0.0), "manufacturing output")?;
            facility.output_this_tick = output;
            manufacturing_out[output_commodity.index()] += output;
        }

        let region = state.region_mut(region_id)?;
        for commodity in Commodity::ALL {
            let idx = commodity.index();
            let produced = sector_output[idx] + extraction_out[idx] + manufacturing_out[idx];
            region.supply[idx] = produced + carried[idx];
            carried[idx] += produced;

            let price = country_prices[idx];
            let sector = &mut region.sectors[idx];
            sector.output = sector_output[idx];
            sector.price = price;

            let mut input_cost = 0.0;
            for (input, coeff) in matrix.required_inputs(commodity) {
                input_cost += coeff * sector_output[idx] * country_prices[input.index()];
            }
            sector.value_added = require_finite(sector_output[idx] * price - input_cost, "value added")?;
        }
        region.inventory = carried;
        for commodity in Commodity::ALL {
            region.sectors[commodity.index()].inventory = carried[commodity.index()];
        }
    }

    Ok(())
}

/// Facility condition decay and equipment age increment (§4.1, scheduler
/// phase 7). Maintenance satisfaction is read from the same workforce ratio
/// used for output; a fully-staffed facility roughly holds condition
/// steady, an understaffed one decays.
pub fn decay_facilities(state: &mut SimulationState) -> SimResult<()> {
    for facility in &mut state.extraction_facilities {
        let maintenance_satisfaction = if facility.workers_required > 0.0 {
            (facility.workers / facility.workers_required).min(1.0)
        } else {
            1.0
        };
        let repair_rate = facility.degradation_rate;
        facility.condition = (facility.condition - facility.degradation_rate + maintenance_satisfaction * repair_rate).max(0.0);
    }
    for facility in &mut state.manufacturing_facilities {
        let maintenance_satisfaction = if facility.workers_required > 0.0 {
            (facility.workers / facility.workers_required).min(1.0)
        } else {
            1.0
        };
        let repair_rate = facility.degradation_rate;
        facility.condition = (facility.condition - facility.degradation_rate + maintenance_satisfaction * repair_rate).max(0.0);
    }
    for formation in &mut state.formations {
        formation.advance_equipment_age();
    }
    Ok(())
}

/// Aggregates per-commodity consumption demand for one country's regions
/// from their population cohorts (§3's fixed wealth/commodity lookup table)
/// and overwrites `region.demand`, so the price subsystem reads this tick's
/// realized demand rather than the zero it is initialized to. Must run
/// after production (so cohorts' consumption doesn't depend on stale output)
/// and before price (§4.2's `D[·]` input).
pub fn aggregate_consumption_demand(state: &mut SimulationState, country_id: CountryId) -> SimResult<()> {
    let table = BaseConsumptionTable::default();
    let region_ids: Vec<_> = state.country(country_id)?.region_ids.clone();

    for region_id in region_ids {
        let cohort_ids = state.region(region_id)?.cohort_ids.clone();

        let mut demand = [0.0_f64; K];
        for cohort_id in &cohort_ids {
            let cohort = state.cohort(*cohort_id)?;
            for commodity in Commodity::ALL {
                demand[commodity.index()] += cohort.base_consumption(&table, commodity);
            }
        }
        for value in &mut demand {
            *value = require_finite(*value, "consumption demand")?;
        }

        state.region_mut(region_id)?.demand = demand;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ids::{CountryId, RegionId};
    use crate::state::{Country, Region, SpendingShares, TaxRates};

    fn single_region_state() -> (SimulationState, CountryId, RegionId) {
        let mut state = SimulationState::new(1, 2025, EngineConfig::default());
        let country_id = CountryId::new(0);
        let region_id = RegionId::new(0);

        let mut country = test_country(country_id);
        country.region_ids.push(region_id);
        state.countries.push(country);
        state.coefficients.matrices.push(crate::matrix::TechnicalCoefficientMatrix::zero());

        let mut region = test_region(region_id, country_id);
        region.sectors[Commodity::Electricity.index()].capacity = 100.0;
        region.sectors[Commodity::Electricity.index()].labor_coefficient = 0.5;
        region.sectors[Commodity::Electricity.index()].labor_employed = 50.0;

        state.coefficients.get_mut(country_id).set(Commodity::Petroleum, Commodity::Electricity, 0.10);
        state.coefficients.get_mut(country_id).set(Commodity::Ore, Commodity::Electricity, 0.15);
        region.inventory[Commodity::Petroleum.index()] = 5.0;
        region.inventory[Commodity::Ore.index()] = 1000.0;

        state.regions.push(region);
        (state, country_id, region_id)
    }

    fn test_country(id: CountryId) -> Country {
        Country {
            id,
            code: "ZZ".into(),
            name: "Test".into(),
            gdp: 1000.0,
            previous_gdp: 1000.0,
            cpi: 1.0,
            cpi_year_ago: 1.0,
            labor_force: 1000.0,
            employed: 900.0,
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
            import_propensity: [0.1; K],
            export_propensity: [0.1; K],
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

    fn test_region(id: RegionId, country_id: CountryId) -> Region {
        Region {
            id,
            country_id,
            name: "Heartland".into(),
            sectors: std::array::from_fn(|_| crate::state::Sector::new(0.0, 0.0)),
            infrastructure_factor: 1.0,
            population: 1000.0,
            labor_force: 1000.0,
            employed: 900.0,
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
        }
    }

    /// §8 scenario 1: capacity 100, labor 50/0.5, Petroleum inventory 5 (need
    /// 10), Ore inventory 1000 (need 150, satisfied) — expected output 60.
    #[test]
    fn soft_leontief_scenario_one_output_is_sixty() {
        let (mut state, country_id, region_id) = single_region_state();
        run(&mut state, country_id).unwrap();
        let output = state.region(region_id).unwrap().sectors[Commodity::Electricity.index()].output;
        assert!((output - 60.0).abs() < 1e-9, "expected 60, got {output}");
    }

    /// §8 scenario 2: same as above but Petroleum inventory = 0 — softened
    /// output of 20, not zero.
    #[test]
    fn soft_leontief_scenario_two_zero_petroleum_still_outputs_twenty() {
        let (mut state, country_id, region_id) = single_region_state();
        state.region_mut(region_id).unwrap().inventory[Commodity::Petroleum.index()] = 0.0;
        run(&mut state, country_id).unwrap();
        let output = state.region(region_id).unwrap().sectors[Commodity::Electricity.index()].output;
        assert!((output - 20.0).abs() < 1e-9, "expected 20, got {output}");
    }

    #[test]
    fn input_consumption_never_drives_inventory_negative() {
        let (mut state, country_id, region_id) = single_region_state();
        state.region_mut(region_id).unwrap().inventory[Commodity::Petroleum.index()] = 0.001;
        run(&mut state, country_id).unwrap();
        assert!(state.region(region_id).unwrap().inventory[Commodity::Petroleum.index()] >= 0.0);
    }

    #[test]
    fn aggregate_consumption_demand_sums_cohort_consumption_into_region_demand() {
        use crate::state::WealthLevel;

        let (mut state, country_id, region_id) = single_region_state();
        let cohort_id = crate::ids::CohortId::new(0);
        let cohort = crate::state::PopulationCohort::new(cohort_id, region_id, Commodity::Agriculture, WealthLevel::Middle, 100.0);
        state.cohorts.push(cohort);
        state.region_mut(region_id).unwrap().cohort_ids.push(cohort_id);

        aggregate_consumption_demand(&mut state, country_id).unwrap();

        let table = BaseConsumptionTable::default();
        let expected = 100.0 * table.get(WealthLevel::Middle, Commodity::Agriculture);
        let demand = state.region(region_id).unwrap().demand[Commodity::Agriculture.index()];
        assert!((demand - expected).abs() < 1e-9, "expected {expected}, got {demand}");
    }

    #[test]
    fn aggregate_consumption_demand_overwrites_stale_values() {
        let (mut state, country_id, region_id) = single_region_state();
        state.region_mut(region_id).unwrap().demand[Commodity::Ore.index()] = 999.0;
        aggregate_consumption_demand(&mut state, country_id).unwrap();
        assert_eq!(state.region(region_id).unwrap().demand[Commodity::Ore.index()], 0.0);
    }
}
