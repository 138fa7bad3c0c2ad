use serde::{Deserialize, Serialize};

use crate::commodity::{Commodity, K};
use crate::config::EngineConfig;
use crate::error::{SimError, SimResult};
use crate::ids::{
    CohortId, CountryId, DepositId, ExtractionFacilityId, FactionId, ManufacturingFacilityId, RegionId,
    TradeRelationId,
};
use crate::matrix::TechnicalCoefficientMatrix;
use crate::state::{
    CoefficientMatrices, Country, DiscoveryState, ExtractionFacility, Faction, ManufacturingFacility,
    PopulationCohort, PreferenceWeights, RedLine, Region, ResourceDeposit, Sector, SimulationState,
    SpendingShares, TaxRates, TradeRelation, WealthLevel,
};

/// Top-level scenario document (§6). Unknown fields are rejected, mirroring
/// the teacher's strict `CountryDefinition` deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    pub start_year: u16,
    pub random_seed: u64,
    pub price_sensitivities: Vec<f64>,
    pub labor_coefficients: Vec<f64>,
    pub spoilage_rates: Vec<f64>,
    #[serde(default)]
    pub base_interest_rate: f64,
    #[serde(default)]
    pub engine_config: EngineConfig,
    pub countries: Vec<CountryDef>,
    #[serde(default)]
    pub trade_relations: Vec<TradeRelationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TradeRelationDef {
    pub from: String,
    pub to: String,
    pub tariff_rate: Vec<f64>,
    pub base_volume: Vec<f64>,
    #[serde(default = "default_reliability")]
    pub reliability: f64,
    #[serde(default)]
    pub diplomatic_score: f64,
    #[serde(default)]
    pub distance_penalty: f64,
    #[serde(default)]
    pub treaty_bonus: f64,
    #[serde(default)]
    pub sanction_severity: f64,
    #[serde(default)]
    pub transport_cost_per_unit: f64,
}

fn default_reliability() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CountryDef {
    pub code: String,
    pub name: String,
    pub gdp: f64,
    #[serde(default)]
    pub debt_cents: f64,
    pub labor_force: f64,
    #[serde(default)]
    pub employed: f64,
    pub tax_rates: TaxRatesDef,
    pub import_propensity: Vec<f64>,
    pub export_propensity: Vec<f64>,
    pub initial_prices: Vec<f64>,
    pub consumption_weights: Vec<f64>,
    /// Flattened K×K technical coefficient matrix, row-major (`[i*K + j]`).
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub spending_shares: SpendingShares,
    pub regions: Vec<RegionDef>,
    #[serde(default)]
    pub factions: Vec<FactionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TaxRatesDef {
    pub income: i64,
    pub corporate: i64,
    pub vat: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegionDef {
    pub name: String,
    pub population: f64,
    pub labor_force: f64,
    #[serde(default)]
    pub employed: f64,
    #[serde(default = "default_infrastructure_factor")]
    pub infrastructure_factor: f64,
    /// Initial per-commodity sector capacity, length K; missing entries default to 0.
    #[serde(default)]
    pub sector_capacities: Vec<f64>,
    #[serde(default)]
    pub deposits: Vec<DepositDef>,
    #[serde(default)]
    pub manufacturing_facilities: Vec<ManufacturingFacilityDef>,
    #[serde(default)]
    pub cohorts: Vec<CohortDef>,
}

fn default_infrastructure_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DepositDef {
    pub resource: String,
    #[serde(default)]
    pub subtype: String,
    pub total_reserves: f64,
    pub base_yield: f64,
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,
    #[serde(default)]
    pub discovery_state: DiscoveryStateDef,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub workers: f64,
    #[serde(default)]
    pub workers_required: f64,
}

fn default_difficulty() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryStateDef {
    #[default]
    Proven,
    Surveyed,
    Unknown,
}

impl From<DiscoveryStateDef> for DiscoveryState {
    fn from(value: DiscoveryStateDef) -> Self {
        match value {
            DiscoveryStateDef::Proven => DiscoveryState::Proven,
            DiscoveryStateDef::Surveyed => DiscoveryState::Surveyed,
            DiscoveryStateDef::Unknown => DiscoveryState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ManufacturingFacilityDef {
    pub output_commodity: String,
    pub base_capacity_per_level: f64,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub workers: f64,
    #[serde(default)]
    pub workers_required: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CohortDef {
    pub primary_sector: String,
    pub wealth: WealthLevelDef,
    pub population: f64,
    #[serde(default = "default_savings_rate")]
    pub savings_rate: f64,
}

fn default_savings_rate() -> f64 {
    0.1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WealthLevelDef {
    Subsistence,
    Poor,
    Middle,
    Wealthy,
    Rich,
}

impl From<WealthLevelDef> for WealthLevel {
    fn from(value: WealthLevelDef) -> Self {
        match value {
            WealthLevelDef::Subsistence => WealthLevel::Subsistence,
            WealthLevelDef::Poor => WealthLevel::Poor,
            WealthLevelDef::Middle => WealthLevel::Middle,
            WealthLevelDef::Wealthy => WealthLevel::Wealthy,
            WealthLevelDef::Rich => WealthLevel::Rich,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FactionDef {
    pub name: String,
    pub power: f64,
    #[serde(default = "default_base_satisfaction")]
    pub base_satisfaction: f64,
    #[serde(default)]
    pub red_line: RedLineDef,
    #[serde(default)]
    pub red_line_threshold: f64,
    #[serde(default)]
    pub red_line_penalty: f64,
    #[serde(default)]
    pub weights: PreferenceWeights,
}

fn default_base_satisfaction() -> f64 {
    50.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedLineDef {
    #[default]
    None,
    CorporateTaxAbove,
    UnemploymentAbove,
    DefenseSpendingBelow,
    CorruptionAbove,
    FoodImportsAbove,
    DefenseBudgetCutAbove,
}

impl From<RedLineDef> for RedLine {
    fn from(value: RedLineDef) -> Self {
        match value {
            RedLineDef::None => RedLine::None,
            RedLineDef::CorporateTaxAbove => RedLine::CorporateTaxAbove,
            RedLineDef::UnemploymentAbove => RedLine::UnemploymentAbove,
            RedLineDef::DefenseSpendingBelow => RedLine::DefenseSpendingBelow,
            RedLineDef::CorruptionAbove => RedLine::CorruptionAbove,
            RedLineDef::FoodImportsAbove => RedLine::FoodImportsAbove,
            RedLineDef::DefenseBudgetCutAbove => RedLine::DefenseBudgetCutAbove,
        }
    }
}

/// Parses and builds a `SimulationState` from scenario JSON text (§6).
/// Rejects malformed or undersized arrays as `SimError::SchemaError` before
/// any arena is populated.
pub fn load_scenario(json: &str) -> SimResult<SimulationState> {
    let file: ScenarioFile = serde_json::from_str(json).map_err(|e| SimError::schema(format!("malformed scenario JSON: {e}")))?;
    build_state(file)
}

fn fixed_array(values: &[f64], label: &str) -> SimResult<[f64; K]> {
    if values.len() != K {
        return Err(SimError::schema(format!("{label} must have {K} entries, got {}", values.len())));
    }
    let mut out = [0.0; K];
    out.copy_from_slice(values);
    Ok(out)
}

fn resolve_commodity(tag: &str) -> SimResult<Commodity> {
    Commodity::from_key(tag).ok_or_else(|| SimError::schema(format!("unknown commodity tag: {tag}")))
}

fn build_state(file: ScenarioFile) -> SimResult<SimulationState> {
    let mut state = SimulationState::new(file.random_seed, file.start_year, file.engine_config);
    state.price_sensitivities = fixed_array(&file.price_sensitivities, "priceSensitivities")?;
    state.labor_coefficients = fixed_array(&file.labor_coefficients, "laborCoefficients")?;
    state.spoilage_rates = fixed_array(&file.spoilage_rates, "spoilageRates")?;

    let mut seen_codes = std::collections::HashSet::new();

    for (country_index, country_def) in file.countries.into_iter().enumerate() {
        if !seen_codes.insert(country_def.code.clone()) {
            return Err(SimError::schema(format!("duplicate country code: {}", country_def.code)));
        }
        let country_id = CountryId::new(country_index);

        let matrix = TechnicalCoefficientMatrix::from_row_major(country_def.coefficients)?;
        matrix.validate()?;
        push_matrix(&mut state.coefficients, country_id, matrix);

        let initial_prices = fixed_array(&country_def.initial_prices, "initialPrices")?;
        let mut country = Country {
            id: country_id,
            code: country_def.code,
            name: country_def.name,
            gdp: country_def.gdp,
            previous_gdp: country_def.gdp,
            cpi: 1.0,
            cpi_year_ago: 1.0,
            labor_force: country_def.labor_force,
            employed: country_def.employed,
            total_wages_cents: 0.0,
            debt_cents: country_def.debt_cents,
            base_interest_rate: file.base_interest_rate,
            effective_interest_rate: file.base_interest_rate,
            fx_reserves_cents: 0.0,
            tax_rates: TaxRates { income: country_def.tax_rates.income, corporate: country_def.tax_rates.corporate, vat: country_def.tax_rates.vat },
            tax_revenue_cents: 0.0,
            tariff_accrual_cents: 0.0,
            spending_cents: 0.0,
            spending_shares: country_def.spending_shares,
            trade_balance_cents: 0.0,
            import_propensity: fixed_array(&country_def.import_propensity, "importPropensity")?,
            export_propensity: fixed_array(&country_def.export_propensity, "exportPropensity")?,
            legitimacy: 50.0,
            corruption: 0.1,
            average_unrest: 0.0,
            war_weariness: 0.0,
            at_war: false,
            military_power: 1.0,
            military_goods_required: 0.0,
            procurement_satisfaction: 1.0,
            region_ids: Vec::new(),
            faction_ids: Vec::new(),
            prices: initial_prices,
            display_prices: initial_prices,
            initial_prices,
            consumption_weights: fixed_array(&country_def.consumption_weights, "consumptionWeights")?,
        };

        for region_def in country_def.regions {
            let region_id = RegionId::new(state.regions.len());
            country.region_ids.push(region_id);

            let mut sectors: [Sector; K] = std::array::from_fn(|_| Sector::new(0.0, 0.0));
            for (idx, capacity) in region_def.sector_capacities.iter().enumerate() {
                if idx >= K {
                    return Err(SimError::schema("sectorCapacities must not exceed K entries".to_string()));
                }
                sectors[idx].capacity = *capacity;
            }
            for commodity in Commodity::ALL {
                sectors[commodity.index()].labor_coefficient = state.labor_coefficients[commodity.index()];
                sectors[commodity.index()].price = initial_prices[commodity.index()];
                sectors[commodity.index()].initial_price = initial_prices[commodity.index()];
            }

            let mut region = Region {
                id: region_id,
                country_id,
                name: region_def.name,
                sectors,
                infrastructure_factor: region_def.infrastructure_factor,
                population: region_def.population,
                labor_force: region_def.labor_force,
                employed: region_def.employed,
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
            };

            for deposit_def in region_def.deposits {
                let deposit_id = DepositId::new(state.deposits.len());
                let resource = resolve_commodity(&deposit_def.resource)?;
                let mut deposit = ResourceDeposit::new(deposit_id, region_id, resource, deposit_def.subtype, deposit_def.total_reserves, deposit_def.base_yield);
                deposit.difficulty = deposit_def.difficulty;
                deposit.discovery_state = deposit_def.discovery_state.into();
                state.deposits.push(deposit);
                region.deposit_ids.push(deposit_id);

                let facility_id = ExtractionFacilityId::new(state.extraction_facilities.len());
                let mut facility = ExtractionFacility::new(facility_id, deposit_id, region_id);
                facility.level = deposit_def.level;
                facility.workers = deposit_def.workers;
                facility.workers_required = deposit_def.workers_required;
                state.extraction_facilities.push(facility);
                region.extraction_facility_ids.push(facility_id);
            }

            for facility_def in region_def.manufacturing_facilities {
                let facility_id = ManufacturingFacilityId::new(state.manufacturing_facilities.len());
                let output_commodity = resolve_commodity(&facility_def.output_commodity)?;
                let mut facility = ManufacturingFacility::new(facility_id, region_id, output_commodity, facility_def.base_capacity_per_level);
                facility.level = facility_def.level;
                facility.workers = facility_def.workers;
                facility.workers_required = facility_def.workers_required;
                state.manufacturing_facilities.push(facility);
                region.manufacturing_facility_ids.push(facility_id);
            }

            for cohort_def in region_def.cohorts {
                let cohort_id = CohortId::new(state.cohorts.len());
                let primary_sector = resolve_commodity(&cohort_def.primary_sector)?;
                let mut cohort = PopulationCohort::new(cohort_id, region_id, primary_sector, cohort_def.wealth.into(), cohort_def.population);
                cohort.savings_rate = cohort_def.savings_rate;
                state.cohorts.push(cohort);
                region.cohort_ids.push(cohort_id);
            }

            state.regions.push(region);
        }

        for faction_def in country_def.factions {
            let faction_id = FactionId::new(state.factions.len());
            let mut faction = Faction::new(faction_id, country_id, faction_def.name, faction_def.power, faction_def.base_satisfaction);
            faction.weights = faction_def.weights;
            faction.red_line = faction_def.red_line.into();
            faction.red_line_threshold = faction_def.red_line_threshold;
            faction.red_line_penalty = faction_def.red_line_penalty;
            state.factions.push(faction);
            country.faction_ids.push(faction_id);
        }

        state.countries.push(country);
    }

    for country in &state.countries {
        let power_sum: f64 = country.faction_ids.iter().map(|id| state.factions[id.index()].power).sum();
        if !country.faction_ids.is_empty() && (power_sum - 1.0).abs() > 1e-6 {
            return Err(SimError::schema(format!("country {} faction powers sum to {power_sum}, expected 1", country.code)));
        }
    }

    for relation_def in file.trade_relations {
        let from = resolve_country_id(&state, &relation_def.from)?;
        let to = resolve_country_id(&state, &relation_def.to)?;
        let relation_id = TradeRelationId::new(state.trade_relations.len());

        let mut relation = TradeRelation::new(relation_id, from, to);
        relation.tariff_rate = fixed_array(&relation_def.tariff_rate, "tradeRelations[].tariffRate")?;
        relation.base_volume = fixed_array(&relation_def.base_volume, "tradeRelations[].baseVolume")?;
        relation.current_volume = relation.base_volume;
        relation.reliability = relation_def.reliability;
        relation.diplomatic_score = relation_def.diplomatic_score;
        relation.distance_penalty = relation_def.distance_penalty;
        relation.treaty_bonus = relation_def.treaty_bonus;
        relation.sanction_severity = relation_def.sanction_severity;
        relation.transport_cost_per_unit = relation_def.transport_cost_per_unit;

        state.trade_relations.push(relation);
    }

    Ok(state)
}

fn resolve_country_id(state: &SimulationState, code: &str) -> SimResult<CountryId> {
    state
        .countries
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.id)
        .ok_or_else(|| SimError::schema(format!("trade relation references unknown country code: {code}")))
}

fn push_matrix(matrices: &mut CoefficientMatrices, id: CountryId, matrix: TechnicalCoefficientMatrix) {
    debug_assert_eq!(id.index(), matrices.matrices.len());
    matrices.matrices.push(matrix);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> String {
        r#"{
            "name": "Test World",
            "startYear": 2025,
            "randomSeed": 1,
            "priceSensitivities": [0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15],
            "laborCoefficients": [0.3,0.3,0.3,0.3,0.3,0.3,0.3,0.3,0.3,0.3,0.3,0.3],
            "spoilageRates": [0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0],
            "baseInterestRate": 0.02,
            "countries": [{
                "code": "ZZ",
                "name": "Testland",
                "gdp": 1000.0,
                "laborForce": 100.0,
                "taxRates": {"income": 1500, "corporate": 2000, "vat": 1000},
                "importPropensity": [0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1],
                "exportPropensity": [0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1,0.1],
                "initialPrices": [100.0,100.0,100.0,100.0,100.0,100.0,100.0,100.0,100.0,100.0,100.0,100.0],
                "consumptionWeights": [1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0],
                "coefficients": [0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0],
                "regions": [{
                    "name": "Heartland",
                    "population": 1000.0,
                    "laborForce": 1000.0,
                    "sectorCapacities": [100.0,10.0,10.0,10.0,10.0,10.0,100.0,50.0,50.0,10.0,10.0,50.0]
                }]
            }]
        }"#
        .to_string()
    }

    #[test]
    fn loads_minimal_scenario() {
        let state = load_scenario(&minimal_json()).unwrap();
        assert_eq!(state.countries.len(), 1);
        assert_eq!(state.regions.len(), 1);
        assert_eq!(state.countries[0].code, "ZZ");
        assert_eq!(state.regions[0].sectors[Commodity::Agriculture.index()].capacity, 100.0);
    }

    #[test]
    fn rejects_unknown_fields() {
        let bad = minimal_json().replace(r#""laborForce": 100.0,"#, r#""laborForce": 100.0, "extra": 1,"#);
        let err = load_scenario(&bad).unwrap_err();
        assert!(matches!(err, SimError::SchemaError(_)));
    }

    #[test]
    fn rejects_wrong_length_arrays() {
        let bad = minimal_json().replace(
            r#""priceSensitivities": [0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15,0.15],"#,
            r#""priceSensitivities": [0.15,0.15],"#,
        );
        let err = load_scenario(&bad).unwrap_err();
        assert!(matches!(err, SimError::SchemaError(_)));
    }

    #[test]
    fn faction_red_line_penalty_overrides_the_zero_default() {
        let mut file: serde_json::Value = serde_json::from_str(&minimal_json()).unwrap();
        file["countries"][0]["factions"] = serde_json::json!([{
            "name": "Labor Congress",
            "power": 1.0,
            "baseSatisfaction": 50.0,
            "redLine": "unemploymentAbove",
            "redLineThreshold": 0.1,
            "redLinePenalty": 12.5,
        }]);
        let state = load_scenario(&file.to_string()).unwrap();
        assert_eq!(state.factions.len(), 1);
        assert_eq!(state.factions[0].red_line_penalty, 12.5);
    }

    #[test]
    fn rejects_duplicate_country_codes() {
        let mut file: serde_json::Value = serde_json::from_str(&minimal_json()).unwrap();
        let countries = file["countries"].as_array().unwrap().clone();
        let mut doubled = countries.clone();
        doubled.extend(countries);
        file["countries"] = serde_json::Value::Array(doubled);
        let err = load_scenario(&file.to_string()).unwrap_err();
        assert!(matches!(err, SimError::SchemaError(_)));
    }
}
