//! Dense integer ids for every entity arena in `SimulationState`.
//!
//! Entities are never referenced by pointer; a newtype wrapper around
//! `usize` keeps lookups O(1) while preventing one id kind from being used
//! to index the wrong arena.

macro_rules! dense_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dense_id!(CountryId);
dense_id!(RegionId);
dense_id!(FactionId);
dense_id!(TradeRelationId);
dense_id!(DepositId);
dense_id!(ExtractionFacilityId);
dense_id!(ManufacturingFacilityId);
dense_id!(CohortId);
dense_id!(FormationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_index() {
        let id = CountryId::new(3);
        assert_eq!(id.index(), 3);
        assert_eq!(id, CountryId(3));
    }
}
