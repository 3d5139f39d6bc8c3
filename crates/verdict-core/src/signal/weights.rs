use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{values_from_map, SignalKind};
use crate::constants::{SIGNAL_COUNT, WEIGHT_SUM_TOLERANCE};
use crate::errors::{VerdictError, VerdictResult};

/// Non-negative per-signal weights that always sum to 1.0.
///
/// Every constructor renormalizes, so a value of this type upholds the
/// invariant the scorer's output range depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightVector([f64; SIGNAL_COUNT]);

impl WeightVector {
    /// Equal weight for every signal. The fallback whenever tuning history is unusable.
    pub fn uniform() -> Self {
        Self([1.0 / SIGNAL_COUNT as f64; SIGNAL_COUNT])
    }

    /// Strict constructor: every raw weight must be finite and non-negative
    /// with a positive total. The result is renormalized.
    pub fn from_raw(values: [f64; SIGNAL_COUNT]) -> VerdictResult<Self> {
        if let Some(bad) = values.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(VerdictError::InvalidInput {
                reason: format!("weight {bad} is not a finite non-negative number"),
            });
        }
        let (values, total) = with_finite_total(values);
        if !(total > 0.0 && total.is_finite()) {
            return Err(VerdictError::InvalidInput {
                reason: format!("weights sum to {total}"),
            });
        }
        Ok(Self(values.map(|w| w / total)))
    }

    /// Lenient constructor: clips negatives and NaN to 0 and renormalizes,
    /// falling back to uniform when nothing positive remains.
    pub fn normalized(values: [f64; SIGNAL_COUNT]) -> Self {
        let clipped = values.map(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 });
        let (clipped, total) = with_finite_total(clipped);
        if total <= 0.0 || !total.is_finite() {
            return Self::uniform();
        }
        Self(clipped.map(|w| w / total))
    }

    pub fn get(&self, kind: SignalKind) -> f64 {
        self.0[kind.index()]
    }

    pub fn values(&self) -> [f64; SIGNAL_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalKind, f64)> + '_ {
        SignalKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Whether the invariant holds within tolerance.
    pub fn is_normalized(&self) -> bool {
        self.0.iter().all(|w| *w >= 0.0) && (self.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE * 10.0
    }

    /// Parse a persisted `{name: weight}` map. A key-set difference is a
    /// [`VerdictError::SchemaMismatch`]; invalid magnitudes are rejected.
    pub fn from_map(map: &BTreeMap<String, f64>) -> VerdictResult<Self> {
        let values = values_from_map(map)?;
        let stored = Self(values);
        // Already-normalized values are kept bit-exact across a round trip.
        if stored.0.iter().all(|w| w.is_finite() && *w >= 0.0)
            && (stored.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE
        {
            return Ok(stored);
        }
        Self::from_raw(values)
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter()
            .map(|(kind, weight)| (kind.name().to_string(), weight))
            .collect()
    }
}

/// Sum of finite non-negative weights. A sum that overflows is recomputed
/// after scaling every weight by the largest one.
fn with_finite_total(values: [f64; SIGNAL_COUNT]) -> ([f64; SIGNAL_COUNT], f64) {
    let total: f64 = values.iter().sum();
    if total.is_finite() {
        return (values, total);
    }
    let max = values.iter().copied().fold(0.0, f64::max);
    let scaled = values.map(|w| w / max);
    (scaled, scaled.iter().sum())
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::uniform()
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightVector {
    type Error = VerdictError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_map(&map)
    }
}

impl From<WeightVector> for BTreeMap<String, f64> {
    fn from(weights: WeightVector) -> Self {
        weights.to_map()
    }
}
