use serde::{Deserialize, Serialize};

use crate::commodity::{Commodity, K};
use crate::error::{SimError, SimResult};

/// Dense K×K Leontief technical coefficient matrix for a single country.
/// `A[i, j]` is the quantity of input commodity `i` required per unit of
/// output commodity `j`. Stored flat, row-major (`[i * K + j]`), to avoid
/// per-tick allocation in the production hot loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalCoefficientMatrix {
    entries: Vec<f64>,
}

impl TechnicalCoefficientMatrix {
    pub fn zero() -> Self {
        Self { entries: vec![0.0; K * K] }
    }

    pub fn from_row_major(entries: Vec<f64>) -> SimResult<Self> {
        if entries.len() != K * K {
            return Err(SimError::schema(format!(
                "technical coefficient matrix must have {} entries, got {}",
                K * K,
                entries.len()
            )));
        }
        for (idx, value) in entries.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 {
                return Err(SimError::schema(format!(
                    "technical coefficient at flat index {idx} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(Self { entries })
    }

    #[inline]
    pub fn get(&self, input: Commodity, output: Commodity) -> f64 {
        self.entries[input.index() * K + output.index()]
    }

    #[inline]
    pub fn set(&mut self, input: Commodity, output: Commodity, value: f64) {
        self.entries[input.index() * K + output.index()] = value;
    }

    /// Column sum for an output commodity: total input requirement per unit
    /// of output. Must be in `[0, 1)` for the economy to be profitable by
    /// construction.
    pub fn column_sum(&self, output: Commodity) -> f64 {
        Commodity::ALL.iter().map(|input| self.get(*input, output)).sum()
    }

    pub fn validate(&self) -> SimResult<()> {
        for output in Commodity::ALL {
            let sum = self.column_sum(output);
            if !(0.0..1.0).contains(&sum) {
                return Err(SimError::schema(format!(
                    "technical coefficient column sum for {:?} must be in [0, 1), got {sum}",
                    output
                )));
            }
        }
        Ok(())
    }

    /// Inputs required by `output` with a strictly positive coefficient, in
    /// commodity-index order (deterministic iteration, per §4.1).
    pub fn required_inputs(&self, output: Commodity) -> impl Iterator<Item = (Commodity, f64)> + '_ {
        Commodity::ALL.into_iter().filter_map(move |input| {
            let coeff = self.get(input, output);
            (coeff > 0.0).then_some((input, coeff))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = TechnicalCoefficientMatrix::from_row_major(vec![0.0; 10]).unwrap_err();
        assert!(matches!(err, SimError::SchemaError(_)));
    }

    #[test]
    fn get_set_round_trip() {
        let mut m = TechnicalCoefficientMatrix::zero();
        m.set(Commodity::Petroleum, Commodity::Electricity, 0.1);
        assert_eq!(m.get(Commodity::Petroleum, Commodity::Electricity), 0.1);
        assert_eq!(m.get(Commodity::Ore, Commodity::Electricity), 0.0);
    }

    #[test]
    fn required_inputs_is_ordered_by_commodity_index() {
        let mut m = TechnicalCoefficientMatrix::zero();
        m.set(Commodity::Ore, Commodity::Electricity, 0.15);
        m.set(Commodity::Petroleum, Commodity::Electricity, 0.10);
        let inputs: Vec<_> = m.required_inputs(Commodity::Electricity).collect();
        assert_eq!(inputs, vec![(Commodity::Petroleum, 0.10), (Commodity::Ore, 0.15)]);
    }

    #[test]
    fn validate_rejects_column_sum_at_or_above_one() {
        let mut m = TechnicalCoefficientMatrix::zero();
        for input in Commodity::ALL {
            m.set(input, Commodity::Electricity, 1.0 / K as f64);
        }
        assert!(m.validate().is_ok());
        m.set(Commodity::Ore, Commodity::Electricity, 1.0);
        assert!(m.validate().is_err());
    }
}
