use crate::commodity::Commodity;
use crate::error::SimResult;
use crate::ids::CountryId;
use crate::state::{Country, RedLine};

/// Faction satisfaction, red lines, legitimacy convergence, and power
/// dynamics for one country (§4.6). Runs only on `tick mod 4 == 0`, gated by
/// the scheduler.
pub fn run(state: &mut crate::state::SimulationState, country_id: CountryId) -> SimResult<()> {
    let lambda = state.config.lambda;
    let mu_power = state.config.mu_power;

    let faction_ids: Vec<_> = state.country(country_id)?.faction_ids.clone();
    let region_ids: Vec<_> = state.country(country_id)?.region_ids.clone();

    update_regional_unrest(state, &region_ids)?;
    let food_import_ratio = realized_food_import_ratio(state, country_id, &region_ids)?;

    let mut legitimacy_penalty = 0.0;
    for faction_id in &faction_ids {
        let satisfaction = compute_satisfaction(state.country(country_id)?, state.faction(*faction_id)?);
        let faction = state.faction_mut(*faction_id)?;
        faction.satisfaction = satisfaction.clamp(0.0, 100.0);

        let now_violated = red_line_violated(state.country(country_id)?, state.faction(*faction_id)?, food_import_ratio);
        let faction = state.faction_mut(*faction_id)?;
        if now_violated && !faction.red_line_violated {
            faction.satisfaction = (faction.satisfaction - faction.red_line_penalty).max(0.0);
            legitimacy_penalty += if faction.power >= 0.5 {
                20.0
            } else if faction.power >= 0.3 {
                10.0
            } else {
                0.0
            };
        }
        faction.red_line_violated = now_violated;
    }

    let mut total_power = 0.0;
    let mut weighted_satisfaction = 0.0;
    for faction_id in &faction_ids {
        let faction = state.faction(*faction_id)?;
        total_power += faction.power;
        weighted_satisfaction += faction.power * faction.satisfaction;
    }
    let mean_satisfaction = if total_power > 0.0 { weighted_satisfaction / total_power } else { 50.0 };

    for faction_id in &faction_ids {
        let faction = state.faction_mut(*faction_id)?;
        let new_power = (faction.power + mu_power * faction.power * (faction.satisfaction - mean_satisfaction) / 100.0).max(0.01);
        faction.power = new_power;
    }
    let mut power_sum = 0.0;
    for faction_id in &faction_ids {
        power_sum += state.faction(*faction_id)?.power;
    }
    if power_sum > 0.0 {
        for faction_id in &faction_ids {
            let faction = state.faction_mut(*faction_id)?;
            faction.power /= power_sum;
        }
    }

    let average_unrest = {
        let mut sum = 0.0;
        for region_id in &region_ids {
            sum += state.region(*region_id)?.unrest;
        }
        if region_ids.is_empty() { 0.0 } else { sum / region_ids.len() as f64 }
    };

    let country = state.country_mut(country_id)?;
    country.average_unrest = average_unrest;
    country.legitimacy = (country.legitimacy + lambda * (mean_satisfaction - country.legitimacy) - legitimacy_penalty).clamp(0.0, 100.0);

    Ok(())
}

fn compute_satisfaction(country: &Country, faction: &crate::state::Faction) -> f64 {
    let w = &faction.weights;
    let mut satisfaction = faction.base_satisfaction;

    satisfaction += w.corporate_tax * (0.20 - country.tax_rates.corporate_rate()) * 100.0;
    satisfaction += w.income_tax * (0.20 - country.tax_rates.income_rate()) * 100.0;
    satisfaction += w.welfare_spending * (country.spending_shares.welfare - 0.10) * 100.0;
    satisfaction += w.military_spending * (country.spending_shares.defense - 0.10) * 100.0;
    satisfaction += w.low_unemployment * (0.05 - country.unemployment_rate()) * 200.0;
    satisfaction += w.low_corruption * (0.2 - country.corruption) * 100.0;

    satisfaction
}

fn red_line_violated(country: &Country, faction: &crate::state::Faction, food_import_ratio: f64) -> bool {
    match faction.red_line {
        RedLine::None => false,
        RedLine::CorporateTaxAbove => country.tax_rates.corporate_rate() > faction.red_line_threshold,
        RedLine::UnemploymentAbove => country.unemployment_rate() > faction.red_line_threshold,
        RedLine::DefenseSpendingBelow => country.spending_shares.defense < faction.red_line_threshold,
        RedLine::CorruptionAbove => country.corruption > faction.red_line_threshold,
        RedLine::FoodImportsAbove => food_import_ratio > faction.red_line_threshold,
        RedLine::DefenseBudgetCutAbove => {
            let cut = (country.previous_gdp - country.gdp) / country.previous_gdp.max(1e-4);
            cut > faction.red_line_threshold
        }
    }
}

/// Share of this tick's agricultural supply that arrived as imports, i.e.
/// `imported / (imported + domestic)`, read from the trade subsystem's
/// realized `current_volume` and the regions' realized `supply` rather than
/// the load-time import/export propensity knobs, so the red line can trip or
/// clear in response to an actual famine or embargo this tick produced.
fn realized_food_import_ratio(state: &crate::state::SimulationState, country_id: CountryId, region_ids: &[crate::ids::RegionId]) -> SimResult<f64> {
    let agriculture = Commodity::Agriculture.index();

    let imported: f64 = state
        .trade_relations
        .iter()
        .filter(|relation| relation.to == country_id)
        .map(|relation| relation.current_volume[agriculture])
        .sum();

    let mut domestic = 0.0;
    for region_id in region_ids {
        domestic += state.region(*region_id)?.supply[agriculture];
    }

    let total = imported + domestic;
    Ok(if total > 0.0 { imported / total } else { 0.0 })
}

fn update_regional_unrest(state: &mut crate::state::SimulationState, region_ids: &[crate::ids::RegionId]) -> SimResult<()> {
    for region_id in region_ids {
        let region = state.region_mut(*region_id)?;
        let unemployment = region.unemployment_rate();
        let unrest = (100.0 * unemployment + 150.0 * region.food_insecurity + 50.0 * region.inequality).clamp(0.0, 100.0);
        region.unrest = unrest;
    }
    Ok(())
}

/// `stability = 0.6 · legitimacy + 0.4 · (100 − unrest)`; `at_risk` per §4.6.
pub fn stability(country: &Country) -> f64 {
    0.6 * country.legitimacy + 0.4 * (100.0 - country.average_unrest)
}

pub fn at_risk(country: &Country) -> bool {
    country.legitimacy < 30.0 || country.average_unrest > 70.0
}
