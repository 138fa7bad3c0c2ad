use serde::{Deserialize, Serialize};

/// The fixed K = 12 commodity tags. Order is frozen for the simulation's
/// lifetime: every K-sized array in the state is indexed by `Commodity::index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Commodity {
    Agriculture,
    RareEarths,
    Petroleum,
    Coal,
    Ore,
    Uranium,
    Electricity,
    ConsumerGoods,
    IndustrialGoods,
    MilitaryGoods,
    Electronics,
    Services,
}

/// Number of simulation commodities. Fixed at compile time per §3/§9.
pub const K: usize = 12;

impl Commodity {
    pub const ALL: [Commodity; K] = [
        Commodity::Agriculture,
        Commodity::RareEarths,
        Commodity::Petroleum,
        Commodity::Coal,
        Commodity::Ore,
        Commodity::Uranium,
        Commodity::Electricity,
        Commodity::ConsumerGoods,
        Commodity::IndustrialGoods,
        Commodity::MilitaryGoods,
        Commodity::Electronics,
        Commodity::Services,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Raw, extractable resources (deposit-backed).
    pub const fn is_raw(self) -> bool {
        matches!(
            self,
            Commodity::Agriculture
                | Commodity::RareEarths
                | Commodity::Petroleum
                | Commodity::Coal
                | Commodity::Ore
                | Commodity::Uranium
        )
    }

    /// Non-stockpileable commodities: any positive remainder at tick end is
    /// discarded rather than carried into next tick's inventory.
    pub const fn is_stockpileable(self) -> bool {
        !matches!(self, Commodity::Electricity | Commodity::Services)
    }

    pub fn key(self) -> &'static str {
        match self {
            Commodity::Agriculture => "agriculture",
            Commodity::RareEarths => "rareEarths",
            Commodity::Petroleum => "petroleum",
            Commodity::Coal => "coal",
            Commodity::Ore => "ore",
            Commodity::Uranium => "uranium",
            Commodity::Electricity => "electricity",
            Commodity::ConsumerGoods => "consumerGoods",
            Commodity::IndustrialGoods => "industrialGoods",
            Commodity::MilitaryGoods => "militaryGoods",
            Commodity::Electronics => "electronics",
            Commodity::Services => "services",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_has_k_entries_in_index_order() {
        assert_eq!(Commodity::ALL.len(), K);
        for (i, c) in Commodity::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn electricity_and_services_are_not_stockpileable() {
        assert!(!Commodity::Electricity.is_stockpileable());
        assert!(!Commodity::Services.is_stockpileable());
        assert!(Commodity::Ore.is_stockpileable());
    }

    #[test]
    fn key_round_trips() {
        for c in Commodity::ALL {
            assert_eq!(Commodity::from_key(c.key()), Some(c));
        }
    }
}
