use serde::{Deserialize, Serialize};

/// Process-wide tunable constants threaded through the state rather than
/// hard-coded, so either reading of an open §9 question is reachable without
/// recompiling. Every field is optional in scenario JSON and falls back to
/// its spec default via `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weight of the bottleneck (min) term in the soft-Leontief blend.
    pub alpha: f64,
    /// Display-price smoothing factor.
    pub beta: f64,
    /// Legitimacy convergence rate toward weighted faction satisfaction.
    pub lambda: f64,
    /// Faction power reallocation rate.
    pub mu_power: f64,
    /// Optional labor mobility rate between sectors; 0 disables it.
    pub labor_mobility_rate: f64,
    /// Wage adjustment sensitivity to labor market tightness.
    pub omega: f64,
    /// Trade flow price elasticity.
    pub gamma: f64,
    /// Maximum fractional price change per tick (see §9 open question).
    pub delta_max: f64,
    /// Minimum nominal wage, in cents.
    pub wage_floor_cents: f64,
    /// Interest-rate risk premium coefficient.
    pub kappa: f64,
    /// Debt/GDP ratio above which the risk premium kicks in.
    pub debt_threshold: f64,
    /// Debt/GDP ratio above which `Country::debt_sustainable` is false.
    pub debt_sustainable_ceiling: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            beta: 0.7,
            lambda: 0.1,
            mu_power: 0.02,
            labor_mobility_rate: 0.0,
            omega: 0.02,
            gamma: 2.0,
            delta_max: 0.5,
            wage_floor_cents: 100.0,
            kappa: 0.02,
            debt_threshold: 0.6,
            debt_sustainable_ceiling: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.alpha, 0.6);
        assert_eq!(cfg.delta_max, 0.5);
        assert_eq!(cfg.gamma, 2.0);
    }

    #[test]
    fn missing_fields_fall_back_to_default() {
        let cfg: EngineConfig = serde_json::from_str("{\"alpha\": 0.75}").unwrap();
        assert_eq!(cfg.alpha, 0.75);
        assert_eq!(cfg.beta, 0.7);
    }
}
