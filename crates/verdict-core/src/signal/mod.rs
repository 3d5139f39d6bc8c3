//! The fixed signal schema and the bounded score vector built from it.

mod weights;

pub use weights::WeightVector;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::SIGNAL_COUNT;
use crate::errors::{VerdictError, VerdictResult};

/// One named input of the scorer. The set and order are fixed across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Risk implied by the size of the diff.
    Diff,
    /// Base risk of the PR's category and touched-file categories.
    Category,
    /// Severity reported by the AI review generator.
    Severity,
    /// Historical mean risk of the category.
    History,
}

impl SignalKind {
    /// All signals in schema order.
    pub const ALL: [SignalKind; SIGNAL_COUNT] = [
        SignalKind::Diff,
        SignalKind::Category,
        SignalKind::Severity,
        SignalKind::History,
    ];

    /// Key used in persisted maps.
    pub fn name(self) -> &'static str {
        match self {
            Self::Diff => "diff",
            Self::Category => "category",
            Self::Severity => "severity",
            Self::History => "history",
        }
    }

    /// Parse a persisted key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Position in the schema.
    pub fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn schema_keys() -> String {
        Self::ALL.map(Self::name).join(", ")
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Saturate a raw value into [0, 1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Ordered scores, one per [`SignalKind`], each in [0, 1].
///
/// Serialized as a `{name: score}` map; deserialization rejects any key set
/// other than the current schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct SignalVector([f64; SIGNAL_COUNT]);

impl SignalVector {
    /// Build from raw values in schema order, saturating each into [0, 1].
    pub fn new(values: [f64; SIGNAL_COUNT]) -> Self {
        Self(values.map(clamp_unit))
    }

    /// Every signal set to the same value.
    pub fn splat(value: f64) -> Self {
        Self::new([value; SIGNAL_COUNT])
    }

    pub fn get(&self, kind: SignalKind) -> f64 {
        self.0[kind.index()]
    }

    /// Set one signal, saturating into [0, 1].
    pub fn set(&mut self, kind: SignalKind, value: f64) {
        self.0[kind.index()] = clamp_unit(value);
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

    /// The largest signal. Ties resolve to the earliest in schema order.
    pub fn dominant(&self) -> SignalKind {
        let mut best = SignalKind::Diff;
        for kind in SignalKind::ALL {
            if self.get(kind) > self.get(best) {
                best = kind;
            }
        }
        best
    }

    /// Component-wise mean, or `None` for an empty input.
    pub fn mean<'a, I>(vectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a SignalVector>,
    {
        let mut sums = [0.0; SIGNAL_COUNT];
        let mut count = 0usize;
        for vector in vectors {
            for (sum, value) in sums.iter_mut().zip(vector.0) {
                *sum += value;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self::new(sums.map(|s| s / count as f64)))
    }

    /// Parse a `{name: score}` map, requiring exactly the schema keys.
    pub fn from_map(map: &BTreeMap<String, f64>) -> VerdictResult<Self> {
        let values = values_from_map(map)?;
        Ok(Self::new(values))
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter()
            .map(|(kind, value)| (kind.name().to_string(), value))
            .collect()
    }
}

impl Default for SignalVector {
    fn default() -> Self {
        Self::splat(crate::constants::NEUTRAL_SIGNAL)
    }
}

impl TryFrom<BTreeMap<String, f64>> for SignalVector {
    type Error = VerdictError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_map(&map)
    }
}

impl From<SignalVector> for BTreeMap<String, f64> {
    fn from(vector: SignalVector) -> Self {
        vector.to_map()
    }
}

/// Extract schema-ordered values from a map, failing on any key-set difference.
pub(crate) fn values_from_map(map: &BTreeMap<String, f64>) -> VerdictResult<[f64; SIGNAL_COUNT]> {
    let schema_matches = map.len() == SIGNAL_COUNT
        && map.keys().all(|key| SignalKind::from_name(key).is_some());
    if !schema_matches {
        return Err(VerdictError::SchemaMismatch {
            expected: SignalKind::schema_keys(),
            found: map.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }
    let mut values = [0.0; SIGNAL_COUNT];
    for (key, value) in map {
        if let Some(kind) = SignalKind::from_name(key) {
            values[kind.index()] = *value;
        }
    }
    Ok(values)
}
