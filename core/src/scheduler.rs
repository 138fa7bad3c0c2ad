use tracing::debug;

use crate::commodity::Commodity;
use crate::error::SimResult;
use crate::state::SimulationState;
use crate::systems::{fiscal, labor, political, price, production, trade};

const CPI_ROTATION_INTERVAL: u64 = 52;
const FISCAL_POLITICAL_INTERVAL: u64 = 4;

/// Runs `n` ticks against `state` in the fixed subsystem order (§4.7):
/// production, trade, labor, consumption demand aggregation, price, then
/// every 4th tick fiscal and political, then spoilage and facility decay,
/// then every 52nd tick a CPI history rotation, then the tick counter
/// advances and the per-phase RNG reseeds implicitly from the new tick.
/// Consumes `state` and returns the advanced state so a caller cannot
/// accidentally reuse a stale snapshot.
pub fn advance(mut state: SimulationState, n: u64) -> SimResult<SimulationState> {
    for _ in 0..n {
        run_one_tick(&mut state)?;
    }
    Ok(state)
}

fn run_one_tick(state: &mut SimulationState) -> SimResult<()> {
    state.reports.clear();

    let country_ids: Vec<_> = state.countries.iter().map(|c| c.id).collect();

    for country_id in &country_ids {
        production::run(state, *country_id)?;
    }

    trade::run(state)?;

    for country_id in &country_ids {
        labor::run(state, *country_id)?;
    }

    for country_id in &country_ids {
        production::aggregate_consumption_demand(state, *country_id)?;
    }

    for country_id in &country_ids {
        price::run(state, *country_id)?;
    }

    if state.tick % FISCAL_POLITICAL_INTERVAL == 0 {
        for country_id in &country_ids {
            fiscal::run(state, *country_id)?;
        }
        for country_id in &country_ids {
            political::run(state, *country_id)?;
        }
    }

    apply_spoilage(state);
    production::decay_facilities(state)?;

    if state.tick > 0 && state.tick % CPI_ROTATION_INTERVAL == 0 {
        rotate_cpi_history(state);
    }

    state.check_invariants()?;
    state.tick += 1;

    debug!(tick = state.tick, reports = state.reports.len(), "tick complete");
    Ok(())
}

/// End-of-tick spoilage (§4.1): stockpileable commodities decay by their
/// configured rate, non-stockpileable commodities (electricity, services)
/// never carry a remainder into the next tick.
fn apply_spoilage(state: &mut SimulationState) {
    let spoilage_rates = state.spoilage_rates;
    for region in &mut state.regions {
        for commodity in Commodity::ALL {
            let c = commodity.index();
            if commodity.is_stockpileable() {
                region.inventory[c] *= 1.0 - spoilage_rates[c];
            } else {
                region.inventory[c] = 0.0;
            }
        }
    }
}

/// Rolls the trailing CPI reference forward once a year so
/// `Country::annual_inflation` always measures a trailing 52-tick window.
fn rotate_cpi_history(state: &mut SimulationState) {
    for country in &mut state.countries {
        country.cpi_year_ago = country.cpi;
    }
}
