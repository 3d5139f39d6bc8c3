//! Predictive Trend Model: per-category mean signal vectors.
//!
//! `fit` is a plain mean over history. `refit` folds new history into an
//! existing model: a category whose sample count has not changed keeps its
//! prior exactly, and an established category (at least `abundant_samples`
//! records) moves by at most `max_prior_shift` per signal per refit.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use verdict_core::config::PredictionConfig;
use verdict_core::constants::NEUTRAL_SIGNAL;
use verdict_core::{CategoryPrior, IPriorSource, PriorSnapshot, ReviewRecord, SignalVector};

#[derive(Debug, Clone, PartialEq)]
pub struct TrendModel {
    priors: BTreeMap<String, CategoryPrior>,
    global: SignalVector,
    fitted_at: Option<chrono::DateTime<Utc>>,
    max_prior_shift: f64,
    abundant_samples: u64,
}

impl TrendModel {
    /// A model with no history: every prior is the neutral vector.
    pub fn empty(config: &PredictionConfig) -> Self {
        Self {
            priors: BTreeMap::new(),
            global: SignalVector::splat(NEUTRAL_SIGNAL),
            fitted_at: None,
            max_prior_shift: config.max_prior_shift,
            abundant_samples: config.abundant_samples as u64,
        }
    }

    /// Fit from scratch.
    pub fn fit(records: &[ReviewRecord], config: &PredictionConfig) -> Self {
        let mut model = Self::empty(config);
        model.priors = category_means(records);
        model.global = global_mean(&model.priors);
        model.fitted_at = Some(Utc::now());
        info!(
            categories = model.priors.len(),
            records = records.len(),
            "trend model fitted"
        );
        model
    }

    /// Fold the full current history into this model with bounded movement.
    pub fn refit(&self, records: &[ReviewRecord]) -> Self {
        let fresh = category_means(records);
        let mut priors = self.priors.clone();
        for (category, candidate) in fresh {
            let next = match self.priors.get(&category) {
                Some(current) if current.samples == candidate.samples => *current,
                Some(current) if current.samples >= self.abundant_samples => {
                    let moved = self.bounded_move(&current.mean, &candidate.mean);
                    debug!(%category, samples = candidate.samples, "established prior moved");
                    CategoryPrior {
                        mean: moved,
                        samples: candidate.samples,
                    }
                }
                _ => candidate,
            };
            priors.insert(category, next);
        }
        let global = global_mean(&priors);
        info!(categories = priors.len(), records = records.len(), "trend model refitted");
        Self {
            priors,
            global,
            fitted_at: Some(Utc::now()),
            max_prior_shift: self.max_prior_shift,
            abundant_samples: self.abundant_samples,
        }
    }

    fn bounded_move(&self, from: &SignalVector, to: &SignalVector) -> SignalVector {
        let mut moved = *from;
        for (kind, target) in to.iter() {
            let delta = (target - from.get(kind)).clamp(-self.max_prior_shift, self.max_prior_shift);
            moved.set(kind, from.get(kind) + delta);
        }
        moved
    }

    /// Prior for a category; unseen categories get the global mean.
    pub fn prior(&self, category: &str) -> SignalVector {
        self.priors
            .get(category)
            .map(|p| p.mean)
            .unwrap_or(self.global)
    }

    /// Mean of the per-category means; neutral with no history.
    pub fn global_mean(&self) -> SignalVector {
        self.global
    }

    pub fn category_prior(&self, category: &str) -> Option<&CategoryPrior> {
        self.priors.get(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.priors.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }

    /// Persistable form, stored with the weight state.
    pub fn to_snapshot(&self) -> PriorSnapshot {
        PriorSnapshot {
            categories: self.priors.clone(),
            fitted_at: self.fitted_at,
        }
    }

    /// Rebuild from a persisted snapshot.
    pub fn from_snapshot(snapshot: &PriorSnapshot, config: &PredictionConfig) -> Self {
        let mut model = Self::empty(config);
        model.priors = snapshot.categories.clone();
        model.global = global_mean(&model.priors);
        model.fitted_at = snapshot.fitted_at;
        model
    }
}

impl IPriorSource for TrendModel {
    fn prior(&self, category: &str) -> SignalVector {
        TrendModel::prior(self, category)
    }
}

fn category_means(records: &[ReviewRecord]) -> BTreeMap<String, CategoryPrior> {
    let mut grouped: BTreeMap<&str, Vec<&SignalVector>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.category.as_str())
            .or_default()
            .push(&record.signals);
    }
    grouped
        .into_iter()
        .filter_map(|(category, vectors)| {
            let samples = vectors.len() as u64;
            SignalVector::mean(vectors).map(|mean| (category.to_string(), CategoryPrior { mean, samples }))
        })
        .collect()
}

fn global_mean(priors: &BTreeMap<String, CategoryPrior>) -> SignalVector {
    SignalVector::mean(priors.values().map(|p| &p.mean))
        .unwrap_or_else(|| SignalVector::splat(NEUTRAL_SIGNAL))
}
