use serde::{Deserialize, Serialize};

use crate::ids::{CountryId, FactionId};

/// A faction's veto policy threshold. Violating it imposes a legitimacy
/// penalty on the rising edge (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedLine {
    None,
    CorporateTaxAbove,
    UnemploymentAbove,
    DefenseSpendingBelow,
    CorruptionAbove,
    FoodImportsAbove,
    DefenseBudgetCutAbove,
}

/// Signed preference weights: positive means the faction prefers higher
/// utility on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceWeights {
    pub corporate_tax: f64,
    pub income_tax: f64,
    pub welfare_spending: f64,
    pub military_spending: f64,
    pub trade_openness: f64,
    pub gdp_growth: f64,
    pub low_unemployment: f64,
    pub wage_growth: f64,
    pub low_corruption: f64,
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            corporate_tax: 0.0,
            income_tax: 0.0,
            welfare_spending: 0.0,
            military_spending: 0.0,
            trade_openness: 0.0,
            gdp_growth: 0.0,
            low_unemployment: 0.0,
            wage_growth: 0.0,
            low_corruption: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub country_id: CountryId,
    pub name: String,

    pub power: f64,
    pub base_satisfaction: f64,
    pub satisfaction: f64,
    pub weights: PreferenceWeights,

    pub red_line: RedLine,
    pub red_line_threshold: f64,
    pub red_line_violated: bool,
    pub red_line_penalty: f64,
}

impl Faction {
    pub fn new(id: FactionId, country_id: CountryId, name: impl Into<String>, power: f64, base_satisfaction: f64) -> Self {
        Self {
            id,
            country_id,
            name: name.into(),
            power,
            base_satisfaction,
            satisfaction: base_satisfaction,
            weights: PreferenceWeights::default(),
            red_line: RedLine::None,
            red_line_threshold: 0.0,
            red_line_violated: false,
            red_line_penalty: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_faction_starts_at_base_satisfaction() {
        let f = Faction::new(FactionId::new(0), CountryId::new(0), "Industrialists", 0.4, 55.0);
        assert_eq!(f.satisfaction, 55.0);
        assert_eq!(f.red_line, RedLine::None);
        assert!(!f.red_line_violated);
    }
}
