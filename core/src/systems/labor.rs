use crate::commodity::{Commodity, K};
use crate::error::{SimResult, require_finite};
use crate::ids::CountryId;
use crate::state::SimulationState;

/// Labor allocation and wage update for one country (§4.4). Regions are
/// processed in id order; within a region, sectors are indexed by commodity
/// order, matching every other subsystem's iteration discipline.
pub fn run(state: &mut SimulationState, country_id: CountryId) -> SimResult<()> {
    let omega = state.config.omega;
    let wage_floor = state.config.wage_floor_cents;
    let mobility_rate = state.config.labor_mobility_rate;

    let region_ids: Vec<_> = state.country(country_id)?.region_ids.clone();
    let mut total_wages = 0.0;
    let mut total_employed = 0.0;

    for region_id in region_ids {
        let region = state.region_mut(region_id)?;

        let mut demand = [0.0_f64; K];
        for commodity in Commodity::ALL {
            let sector = &region.sectors[commodity.index()];
            demand[commodity.index()] = sector.labor_coefficient * sector.capacity;
        }
        let total_demand: f64 = demand.iter().sum();
        let allocation_factor = if total_demand > 0.0 { (region.labor_force / total_demand).min(1.0) } else { 0.0 };

        let mut employed = [0.0_f64; K];
        for commodity in Commodity::ALL {
            let c = commodity.index();
            employed[c] = demand[c] * allocation_factor;
            region.sectors[c].labor_employed = employed[c];
        }

        for commodity in Commodity::ALL {
            let c = commodity.index();
            let sector = &mut region.sectors[c];
            let d = demand[c];
            let e = employed[c];
            let wage = sector.wage_cents;
            let new_wage = if e <= 0.0 && d > 0.0 {
                wage * (1.0 + 0.5 * omega)
            } else if e > 0.0 {
                let tightness = d / e;
                let adj = (omega * (tightness - 1.0)).clamp(-0.1, 0.1);
                (wage * (1.0 + adj)).max(wage_floor)
            } else {
                wage
            };
            sector.wage_cents = require_finite(new_wage, "wage update")?;
        }

        if mobility_rate > 0.0 {
            apply_mobility(region, mobility_rate);
        }

        region.employed = employed.iter().sum();
        let wage_sum: f64 = Commodity::ALL.iter().map(|c| region.sectors[c.index()].wage_cents).sum();
        region.average_wage_cents = wage_sum / K as f64;

        total_employed += region.employed;
        total_wages += Commodity::ALL
            .iter()
            .map(|c| region.sectors[c.index()].wage_cents * region.sectors[c.index()].labor_employed)
            .sum::<f64>();
    }

    let country = state.country_mut(country_id)?;
    country.employed = total_employed;
    country.total_wages_cents = total_wages;

    Ok(())
}

/// Optional worker mobility toward above-average-wage sectors, at rate
/// `mu ∈ [0, 0.1]`, with a conservation correction so total employment is
/// preserved to within 0.01 worker (§4.4).
fn apply_mobility(region: &mut crate::state::Region, mu: f64) {
    let wages: [f64; K] = std::array::from_fn(|i| region.sectors[i].wage_cents);
    let average_wage = wages.iter().sum::<f64>() / K as f64;

    let mut deltas = [0.0_f64; K];
    for commodity in Commodity::ALL {
        let c = commodity.index();
        deltas[c] = mu * region.sectors[c].labor_employed * (wages[c] - average_wage) / average_wage.max(1e-4);
    }

    let drift: f64 = deltas.iter().sum();
    let correction = drift / K as f64;
    for commodity in Commodity::ALL {
        let c = commodity.index();
        let adjusted = (region.sectors[c].labor_employed + deltas[c] - correction).max(0.0);
        region.sectors[c].labor_employed = adjusted;
    }
}
