pub mod country;
pub mod deposit;
pub mod facility;
pub mod faction;
pub mod military;
pub mod population;
pub mod region;
pub mod trade;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::commodity::K;
use crate::config::EngineConfig;
use crate::error::{SimError, SimResult};
use crate::ids::{
    CohortId, CountryId, DepositId, ExtractionFacilityId, FactionId, FormationId,
    ManufacturingFacilityId, RegionId, TradeRelationId,
};

pub use country::{CoefficientMatrices, Country, SpendingShares, TaxRates};
pub use deposit::{CostBundle, DiscoveryState, ExtractionFacility, ResourceDeposit};
pub use facility::ManufacturingFacility;
pub use faction::{Faction, PreferenceWeights, RedLine};
pub use military::{FormationType, MilitaryFormation, SupplyStatus};
pub use population::{BaseConsumptionTable, PopulationCohort, WealthLevel};
pub use region::{Region, Sector};
pub use trade::TradeRelation;

/// The single mutable world. All entities live in dense, id-indexed arenas;
/// references between entity kinds are ids, never pointers (§9 "cyclic
/// ownership" note).
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub tick: u64,
    pub ticks_per_year: u64,
    pub start_year: u16,
    pub seed: u64,

    pub config: EngineConfig,

    pub countries: Vec<Country>,
    pub regions: Vec<Region>,
    pub factions: Vec<Faction>,
    pub trade_relations: Vec<TradeRelation>,
    pub deposits: Vec<ResourceDeposit>,
    pub extraction_facilities: Vec<ExtractionFacility>,
    pub manufacturing_facilities: Vec<ManufacturingFacility>,
    pub cohorts: Vec<PopulationCohort>,
    pub formations: Vec<MilitaryFormation>,

    pub coefficients: CoefficientMatrices,

    pub labor_coefficients: [f64; K],
    pub price_sensitivities: [f64; K],
    pub spoilage_rates: [f64; K],

    /// Diagnostics collected during the most recently completed tick, in the
    /// teacher's "reports" idiom. Cleared at the start of each tick.
    pub reports: Vec<String>,
}

impl SimulationState {
    pub fn new(seed: u64, start_year: u16, config: EngineConfig) -> Self {
        Self {
            tick: 0,
            ticks_per_year: 52,
            start_year,
            seed,
            config,
            countries: Vec::new(),
            regions: Vec::new(),
            factions: Vec::new(),
            trade_relations: Vec::new(),
            deposits: Vec::new(),
            extraction_facilities: Vec::new(),
            manufacturing_facilities: Vec::new(),
            cohorts: Vec::new(),
            formations: Vec::new(),
            coefficients: CoefficientMatrices::default(),
            labor_coefficients: [0.3; K],
            price_sensitivities: [0.15; K],
            spoilage_rates: [0.0; K],
            reports: Vec::new(),
        }
    }

    /// Deterministic per-phase RNG, seeded from `(seed, tick, phase)` per §5/§9.
    pub fn phase_rng(&self, phase: &str) -> StdRng {
        let mut mixed = self.seed ^ self.tick;
        for byte in phase.bytes() {
            mixed = mixed.rotate_left(5) ^ (byte as u64);
        }
        StdRng::seed_from_u64(mixed)
    }

    pub fn country(&self, id: CountryId) -> SimResult<&Country> {
        self.countries
            .get(id.index())
            .ok_or_else(|| SimError::lookup(format!("country id {id} out of range")))
    }

    pub fn country_mut(&mut self, id: CountryId) -> SimResult<&mut Country> {
        self.countries
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("country id {id} out of range")))
    }

    pub fn region(&self, id: RegionId) -> SimResult<&Region> {
        self.regions
            .get(id.index())
            .ok_or_else(|| SimError::lookup(format!("region id {id} out of range")))
    }

    pub fn region_mut(&mut self, id: RegionId) -> SimResult<&mut Region> {
        self.regions
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("region id {id} out of range")))
    }

    pub fn faction(&self, id: FactionId) -> SimResult<&Faction> {
        self.factions
            .get(id.index())
            .ok_or_else(|| SimError::lookup(format!("faction id {id} out of range")))
    }

    pub fn faction_mut(&mut self, id: FactionId) -> SimResult<&mut Faction> {
        self.factions
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("faction id {id} out of range")))
    }

    pub fn trade_relation(&self, id: TradeRelationId) -> SimResult<&TradeRelation> {
        self.trade_relations
            .get(id.index())
            .ok_or_else(|| SimError::lookup(format!("trade relation id {id} out of range")))
    }

    pub fn deposit_mut(&mut self, id: DepositId) -> SimResult<&mut ResourceDeposit> {
        self.deposits
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("deposit id {id} out of range")))
    }

    pub fn extraction_facility_mut(&mut self, id: ExtractionFacilityId) -> SimResult<&mut ExtractionFacility> {
        self.extraction_facilities
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("extraction facility id {id} out of range")))
    }

    pub fn manufacturing_facility_mut(&mut self, id: ManufacturingFacilityId) -> SimResult<&mut ManufacturingFacility> {
        self.manufacturing_facilities
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("manufacturing facility id {id} out of range")))
    }

    pub fn cohort(&self, id: CohortId) -> SimResult<&PopulationCohort> {
        self.cohorts
            .get(id.index())
            .ok_or_else(|| SimError::lookup(format!("cohort id {id} out of range")))
    }

    pub fn formation_mut(&mut self, id: FormationId) -> SimResult<&mut MilitaryFormation> {
        self.formations
            .get_mut(id.index())
            .ok_or_else(|| SimError::lookup(format!("formation id {id} out of range")))
    }

    /// Checks the quantified invariants of §8 across the whole state. In
    /// debug builds any failure is fatal (`InvariantViolation`); in release
    /// the offending value is clamped in place and a diagnostic is recorded.
    pub fn check_invariants(&mut self) -> SimResult<()> {
        let fatal = cfg!(debug_assertions);
        let mut problems = Vec::new();

        for region in &mut self.regions {
            for c in 0..K {
                if region.inventory[c] < 0.0 {
                    problems.push(format!("region {} inventory[{c}] negative: {}", region.id, region.inventory[c]));
                    region.inventory[c] = 0.0;
                }
            }
        }

        for country in &mut self.countries {
            for c in 0..K {
                let lo = 0.1 * country.initial_prices[c];
                let hi = 10.0 * country.initial_prices[c];
                if country.initial_prices[c] > 0.0 && !(lo..=hi).contains(&country.prices[c]) {
                    problems.push(format!(
                        "country {} price[{c}] {} out of bounds [{lo}, {hi}]",
                        country.id, country.prices[c]
                    ));
                    country.prices[c] = country.prices[c].clamp(lo, hi);
                }
            }
            if country.debt_cents < 0.0 {
                problems.push(format!("country {} debt negative: {}", country.id, country.debt_cents));
                country.debt_cents = 0.0;
            }
        }

        for deposit in &self.deposits {
            if deposit.remaining_reserves < 0.0 || deposit.remaining_reserves > deposit.total_reserves + 1e-6 {
                problems.push(format!(
                    "deposit {} remaining {} out of [0, total={}]",
                    deposit.id, deposit.remaining_reserves, deposit.total_reserves
                ));
            }
        }

        let mut by_country: std::collections::HashMap<CountryId, f64> = std::collections::HashMap::new();
        for faction in &self.factions {
            *by_country.entry(faction.country_id).or_insert(0.0) += faction.power;
        }
        for (country_id, total) in by_country {
            if (total - 1.0).abs() > 1e-9 {
                problems.push(format!("country {country_id} faction powers sum to {total}, expected 1"));
            }
        }

        if problems.is_empty() {
            return Ok(());
        }
        if fatal {
            return Err(SimError::invariant(problems.join("; ")));
        }
        for problem in problems {
            self.reports.push(format!("invariant clamped: {problem}"));
        }
        Ok(())
    }
}
