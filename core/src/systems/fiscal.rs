use crate::commodity::Commodity;
use crate::error::{SimResult, require_finite};
use crate::ids::CountryId;
use crate::state::SimulationState;

const TICKS_PER_YEAR: f64 = 52.0;

/// Tax collection, spending, debt, and risk-premium interest (§4.5). Runs
/// only on ticks where `tick mod 4 == 0`; the scheduler is responsible for
/// the gate, this function always executes unconditionally when called.
pub fn run(state: &mut SimulationState, country_id: CountryId) -> SimResult<()> {
    let kappa = state.config.kappa;
    let debt_threshold = state.config.debt_threshold;
    let delta_t = 1.0 / TICKS_PER_YEAR;

    let region_ids: Vec<_> = state.country(country_id)?.region_ids.clone();
    let cohort_ids: Vec<_> = region_ids
        .iter()
        .flat_map(|r| state.region(*r).map(|r| r.cohort_ids.clone()).unwrap_or_default())
        .collect();

    let mut gdp_annualized = 0.0;
    let mut corporate_base = 0.0;
    for region_id in &region_ids {
        let region = state.region(*region_id)?;
        for commodity in Commodity::ALL {
            let sector = &region.sectors[commodity.index()];
            gdp_annualized += sector.value_added;
            let wage_bill = sector.wage_cents * sector.labor_employed;
            corporate_base += (sector.value_added - wage_bill).max(0.0);
        }
    }
    gdp_annualized *= TICKS_PER_YEAR;

    let mut vat_base = 0.0;
    for cohort_id in &cohort_ids {
        let cohort = state.cohort(*cohort_id)?;
        vat_base += cohort.income_cents * (1.0 - cohort.savings_rate);
    }

    let country = state.country_mut(country_id)?;
    country.previous_gdp = country.gdp;
    country.gdp = require_finite(gdp_annualized, "GDP")?;

    let income_tax = country.tax_rates.income_rate() * country.total_wages_cents;
    let corporate_tax = country.tax_rates.corporate_rate() * corporate_base;
    let vat = country.tax_rates.vat_rate() * vat_base;
    let tariff_revenue = country.tariff_accrual_cents;
    country.tariff_accrual_cents = 0.0;
    let revenue = income_tax + corporate_tax + vat + tariff_revenue;

    let base_spending = 0.35 * country.gdp * delta_t;
    let interest_payment = country.effective_interest_rate * country.debt_cents * delta_t;
    let total_spending = base_spending + interest_payment;

    let balance = revenue - total_spending;
    country.debt_cents = (country.debt_cents - balance).max(0.0);

    let debt_to_gdp = country.debt_to_gdp();
    country.effective_interest_rate = country.base_interest_rate + (kappa * (debt_to_gdp - debt_threshold)).max(0.0);

    country.tax_revenue_cents = require_finite(revenue, "tax revenue")?;
    country.spending_cents = require_finite(total_spending, "spending")?;

    Ok(())
}
