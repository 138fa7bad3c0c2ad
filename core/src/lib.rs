//! Deterministic, tick-driven Leontief input-output national-economy
//! simulation engine. One `SimulationState` owns every entity arena; the
//! `systems` module implements each subsystem as a pure function of that
//! state, and `scheduler::advance` runs them in the fixed per-tick order.

mod commodity;
mod config;
mod error;
mod ids;
mod loader;
mod matrix;
mod scheduler;
mod state;
mod systems;

pub use commodity::{Commodity, K};
pub use config::EngineConfig;
pub use error::{SimError, SimResult, check_invariant, require_finite};
pub use ids::{
    CohortId, CountryId, DepositId, ExtractionFacilityId, FactionId, FormationId,
    ManufacturingFacilityId, RegionId, TradeRelationId,
};
pub use loader::{SECTOR_MAP, load_country_matrix, load_scenario};
pub use matrix::TechnicalCoefficientMatrix;
pub use scheduler::advance;
pub use state::{
    BaseConsumptionTable, CoefficientMatrices, CostBundle, Country, DiscoveryState,
    ExtractionFacility, Faction, FormationType, ManufacturingFacility, MilitaryFormation,
    PopulationCohort, PreferenceWeights, RedLine, Region, ResourceDeposit, Sector,
    SimulationState, SpendingShares, SupplyStatus, TaxRates, TradeRelation, WealthLevel,
};
pub use systems::{fiscal, labor, political, price, production, trade};
