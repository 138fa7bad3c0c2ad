use crate::commodity::Commodity;
use crate::error::{SimResult, require_finite};
use crate::ids::TradeRelationId;
use crate::state::SimulationState;

/// Per-commodity bilateral flow for one directed relation (§4.3). Pulled out
/// so `run` and tests can both exercise the pure formula.
pub fn flow(base_volume: f64, exporter_price: f64, importer_price: f64, tariff: f64, sanction: f64, gamma: f64) -> f64 {
    if sanction >= 1.0 {
        return 0.0;
    }
    let effective_exporter = (exporter_price * (1.0 + tariff)).max(1e-4);
    let ratio = importer_price / effective_exporter;
    let multiplier = ratio.powf(gamma).clamp(0.01, 10.0);
    base_volume * multiplier * (1.0 - sanction)
}

/// Runs every directed trade relation in insertion (id) order, updating both
/// countries' trade balance, FX reserves are updated once per tick after all
/// relations are processed, and the importer's tariff revenue (§4.3).
pub fn run(state: &mut SimulationState) -> SimResult<()> {
    let gamma = state.config.gamma;

    for country in &mut state.countries {
        country.trade_balance_cents = 0.0;
    }

    let relation_ids: Vec<_> = state.trade_relations.iter().map(|r| r.id).collect();
    for relation_id in relation_ids {
        update_relation(state, relation_id, gamma)?;
    }

    let delta_t = 1.0 / 52.0;
    for country in &mut state.countries {
        country.fx_reserves_cents += country.trade_balance_cents * delta_t;
    }

    Ok(())
}

fn update_relation(state: &mut SimulationState, relation_id: TradeRelationId, gamma: f64) -> SimResult<()> {
    let relation = state.trade_relation(relation_id)?.clone();
    let exporter_prices = state.country(relation.from)?.prices;
    let importer_prices = state.country(relation.to)?.prices;

    let mut new_volumes = relation.current_volume;
    let mut exporter_gain = 0.0;
    let mut importer_cost = 0.0;
    let mut tariff_revenue = 0.0;

    for commodity in Commodity::ALL {
        let c = commodity.index();
        let tariff = relation.tariff_rate[c];
        let computed = flow(
            relation.base_volume[c],
            exporter_prices[c],
            importer_prices[c],
            tariff,
            relation.sanction_severity,
            gamma,
        );
        let computed = require_finite(computed.max(0.0), "trade flow")?;
        new_volumes[c] = computed;

        exporter_gain += exporter_prices[c] * computed;
        importer_cost += exporter_prices[c] * (1.0 + tariff) * computed;
        tariff_revenue += tariff * exporter_prices[c] * computed;
    }

    state.trade_relations[relation_id.index()].current_volume = new_volumes;

    let exporter = state.country_mut(relation.from)?;
    exporter.trade_balance_cents += exporter_gain;

    let importer = state.country_mut(relation.to)?;
    importer.trade_balance_cents -= importer_cost;
    importer.tariff_accrual_cents += tariff_revenue;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario 4: base 100, Px=Pm=10, tau=0.20, gamma=2 -> effective
    /// exporter price 12, ratio 10/12, multiplier ~=0.694, flow ~=69.4.
    #[test]
    fn trade_flow_scenario_four() {
        let f = flow(100.0, 10.0, 10.0, 0.20, 0.0, 2.0);
        assert!((f - 69.444444444).abs() < 1e-6, "got {f}");
    }

    #[test]
    fn full_sanction_zeroes_flow_regardless_of_price() {
        let f = flow(100.0, 10.0, 1000.0, 0.0, 1.0, 2.0);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn multiplier_is_clamped_to_ten() {
        let f = flow(100.0, 1.0, 1000.0, 0.0, 0.0, 2.0);
        assert!((f - 1000.0).abs() < 1e-9);
    }

    fn minimal_country(id: crate::ids::CountryId, price: f64) -> crate::state::Country {
        use crate::commodity::K;
        use crate::state::{SpendingShares, TaxRates};
        crate::state::Country {
            id,
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
            prices: [price; K],
            display_prices: [price; K],
            initial_prices: [price; K],
            consumption_weights: [1.0; K],
        }
    }

    /// §8 law: importer's accrued tariff revenue equals
    /// `sum_c tau_c * P_export,c * flow_c` for the tick just run.
    #[test]
    fn tariff_revenue_identity() {
        use crate::commodity::K;
        use crate::config::EngineConfig;
        use crate::ids::CountryId;
        use crate::state::TradeRelation;

        let mut state = SimulationState::new(1, 2025, EngineConfig::default());
        let exporter_id = CountryId::new(0);
        let importer_id = CountryId::new(1);
        state.countries.push(minimal_country(exporter_id, 10.0));
        state.countries.push(minimal_country(importer_id, 10.0));

        let mut relation = TradeRelation::new(crate::ids::TradeRelationId::new(0), exporter_id, importer_id);
        relation.base_volume = [100.0; K];
        relation.tariff_rate = [0.20; K];
        state.trade_relations.push(relation);

        run(&mut state).unwrap();

        let exporter_prices = state.country(exporter_id).unwrap().prices;
        let relation = state.trade_relation(crate::ids::TradeRelationId::new(0)).unwrap();
        let expected: f64 = Commodity::ALL
            .iter()
            .map(|c| {
                let i = c.index();
                relation.tariff_rate[i] * exporter_prices[i] * relation.current_volume[i]
            })
            .sum();

        let actual = state.country(importer_id).unwrap().tariff_accrual_cents;
        assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
    }
}
