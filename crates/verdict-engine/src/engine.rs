//! ReviewEngine: owns the store, scorer, tuner, and trend model, and runs
//! each operation with graceful degradation.

use std::path::Path;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use tracing::{debug, info, warn};

use verdict_core::config::VerdictConfig;
use verdict_core::constants::{POSTURE_WINDOW, SCORE_SCALE};
use verdict_core::errors::{VerdictError, VerdictResult};
use verdict_core::{
    CategoryStats, Degradation, IReviewMemory, Outcome, RecordId, ReviewRecord, WeightState,
    WeightVector,
};
use verdict_learning::{derive_reward, AdaptiveTuner, Calibration};
use verdict_mesh::{MeshState, MeshTransport, RepoSnapshot};
use verdict_prediction::{ReviewPosture, TrendModel};
use verdict_scoring::{normalize_category, RawSignals, Scorer, SignalBuilder};
use verdict_storage::StorageEngine;

use crate::review::{RawReview, ReconcileStatus, RunSummary};

/// The scoring engine. Share it across threads behind an `Arc`.
pub struct ReviewEngine {
    config: VerdictConfig,
    store: StorageEngine,
    scorer: Scorer,
    tuner: AdaptiveTuner,
    trend: RwLock<TrendModel>,
    /// Weights from the last successful read; the fallback on lock timeouts.
    last_weights: Mutex<WeightVector>,
    /// Degradations from opening the store or from background operations,
    /// reported on the next run.
    carried: Mutex<Vec<Degradation>>,
}

impl ReviewEngine {
    /// Open the engine on the configured database file.
    pub fn open(config: VerdictConfig) -> VerdictResult<Self> {
        config.validate()?;
        let store = StorageEngine::open(Path::new(&config.storage.db_path), &config.storage)?;
        Self::with_store(config, store)
    }

    /// Open the engine on an in-memory store (for testing).
    pub fn open_in_memory(config: VerdictConfig) -> VerdictResult<Self> {
        config.validate()?;
        let store = StorageEngine::open_in_memory(&config.storage)?;
        Self::with_store(config, store)
    }

    fn with_store(config: VerdictConfig, store: StorageEngine) -> VerdictResult<Self> {
        let mut carried = Vec::new();
        if let Some(quarantined) = store.recovered_corruption() {
            carried.push(Degradation::new(
                "review_memory",
                VerdictError::StoreCorruption {
                    details: format!("moved to {}", quarantined.display()),
                }
                .to_string(),
                "fresh store segment",
            ));
        }

        let (weights, trend) = match store.weight_state() {
            Ok(state) => (
                state.weights,
                TrendModel::from_snapshot(&state.priors, &config.prediction),
            ),
            Err(e) => {
                warn!(error = %e, "weight state unreadable at startup");
                carried.push(Degradation::new("weights", e.to_string(), "uniform weights"));
                (WeightVector::uniform(), TrendModel::empty(&config.prediction))
            }
        };

        Ok(Self {
            scorer: Scorer::from_config(&config.scoring),
            tuner: AdaptiveTuner::from_config(&config.learning)?,
            trend: RwLock::new(trend),
            last_weights: Mutex::new(weights),
            carried: Mutex::new(carried),
            config,
            store,
        })
    }

    pub fn config(&self) -> &VerdictConfig {
        &self.config
    }

    pub fn store(&self) -> &StorageEngine {
        &self.store
    }

    /// Score one pull request. Never fails: recoverable errors are
    /// absorbed and listed in `degradations`.
    pub fn assess(&self, review: &RawReview) -> RunSummary {
        let repository = review
            .repository_id
            .clone()
            .unwrap_or_else(|| self.config.mesh.repository_id.clone());
        let span = crate::assess_span!(repository, review.pr_id);
        let _guard = span.enter();

        let mut degradations = self.take_carried_degradations();
        let weights = self.current_weights(&mut degradations);

        let signals = self.with_stored_history(&review.signals, &mut degradations);
        let built = {
            let trend = self.trend_snapshot();
            SignalBuilder::new(&self.config.scoring).build(&signals, &trend)
        };
        for signal in &built.substituted {
            degradations.push(Degradation::new(
                "signals",
                VerdictError::MissingSignal {
                    signal: *signal,
                    category: built.category.clone(),
                }
                .to_string(),
                "trend prior",
            ));
        }

        let assessment = self.scorer.score(&built.vector, &weights);
        let id = RecordId::new(repository, review.pr_id, review.run_at.unwrap_or_else(Utc::now));
        let record = ReviewRecord::new(
            id.clone(),
            built.category.clone(),
            built.vector,
            assessment.confidence,
            assessment.risk,
        );
        let recorded = match self.store.append(&record) {
            Ok(inserted) => inserted,
            Err(e) => {
                warn!(error = %e, id = %id, "record not stored");
                degradations.push(Degradation::new(
                    "review_memory",
                    e.to_string(),
                    "score returned without being remembered",
                ));
                false
            }
        };

        self.report_skipped_records(&mut degradations);

        info!(
            id = %id,
            category = %built.category,
            confidence = assessment.confidence,
            risk = assessment.risk,
            high_risk = assessment.high_risk,
            degraded = !degradations.is_empty(),
            "review assessed"
        );
        RunSummary {
            record_id: id,
            category: built.category,
            confidence: assessment.confidence,
            risk: assessment.risk,
            high_risk: assessment.high_risk,
            weights,
            substituted: built.substituted,
            recorded,
            degradations,
        }
    }

    /// Fill a missing historical risk from the category's stored runs. The
    /// trend prior covers it only when the category has no history yet.
    fn with_stored_history(
        &self,
        raw: &RawSignals,
        degradations: &mut Vec<Degradation>,
    ) -> RawSignals {
        let mut signals = raw.clone();
        if signals.historical_risk.is_some() {
            return signals;
        }
        let category = normalize_category(raw.category.as_deref());
        match self
            .store
            .category_stats(&category, self.config.prediction.stats_window)
        {
            Ok(stats) if stats.count > 0 => {
                debug!(
                    category = %category,
                    mean_risk = stats.mean_risk,
                    samples = stats.count,
                    "historical risk taken from review memory"
                );
                signals.historical_risk = Some(stats.mean_risk / SCORE_SCALE);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, category = %category, "category history unreadable");
                degradations.push(Degradation::new(
                    "review_memory",
                    e.to_string(),
                    "trend prior for historical risk",
                ));
            }
        }
        signals
    }

    /// Turn unreadable rows skipped by recent reads into a degradation.
    fn report_skipped_records(&self, degradations: &mut Vec<Degradation>) {
        let skipped = self.store.take_skipped_records();
        if skipped == 0 {
            return;
        }
        warn!(skipped, "unreadable review records skipped");
        degradations.push(Degradation::new(
            "review_memory",
            VerdictError::StoreCorruption {
                details: format!("{skipped} unreadable review records skipped"),
            }
            .to_string(),
            "remaining readable records",
        ));
    }

    /// Apply pending rewards and return the weights to score with.
    fn current_weights(&self, degradations: &mut Vec<Degradation>) -> WeightVector {
        let tuner = self.tuner;
        let applied = self
            .store
            .apply_pending_rewards(|weights, record| tuner.update(weights, record, record.reward));
        match applied {
            Ok(applied) => {
                if applied.schema_reset {
                    degradations.push(Degradation::new(
                        "weights",
                        VerdictError::SchemaMismatch {
                            expected: "current signal schema".to_string(),
                            found: "stale persisted weights".to_string(),
                        }
                        .to_string(),
                        "uniform weights",
                    ));
                }
                self.remember_weights(applied.state.weights);
                applied.state.weights
            }
            Err(e) => {
                let fallback = self.last_known_weights();
                warn!(error = %e, "weight update deferred; scoring with last known weights");
                degradations.push(Degradation::new(
                    "weights",
                    e.to_string(),
                    "last known weights; pending rewards deferred",
                ));
                fallback
            }
        }
    }

    /// Attach a ground-truth outcome to a past run and tune the weights.
    ///
    /// `NotFound` for an unknown record and `OutcomeConflict` for a different
    /// outcome on an already reconciled record are returned to the caller.
    /// A busy weight lock defers the tuning to the next run.
    pub fn reconcile(&self, id: &RecordId, outcome: Outcome) -> VerdictResult<ReconcileStatus> {
        let span = crate::reconcile_span!(id);
        let _guard = span.enter();

        let record = self
            .store
            .get(id)?
            .ok_or_else(|| VerdictError::NotFound { id: id.to_string() })?;
        let reward = derive_reward(&record, &outcome);
        if !self.store.record_outcome(id, reward)? {
            debug!(id = %id, "outcome already recorded");
            return Ok(ReconcileStatus::AlreadyRecorded);
        }

        let tuner = self.tuner;
        match self
            .store
            .apply_pending_rewards(|weights, record| tuner.update(weights, record, record.reward))
        {
            Ok(applied) => {
                self.remember_weights(applied.state.weights);
                Ok(ReconcileStatus::Applied {
                    weights: applied.state.weights,
                    clock: applied.state.clock,
                })
            }
            Err(e) if e.is_recoverable() => {
                warn!(id = %id, error = %e, "reward recorded; weight update deferred");
                Ok(ReconcileStatus::Deferred)
            }
            Err(e) => Err(e),
        }
    }

    /// Refit the trend model from a snapshot of the whole memory and
    /// commit the new priors.
    pub fn refit_trend_model(&self) -> VerdictResult<TrendModel> {
        let span = crate::refit_span!();
        let _guard = span.enter();

        let records = self.store.snapshot()?;
        let mut unreadable = Vec::new();
        self.report_skipped_records(&mut unreadable);
        self.carry(unreadable);
        let next = self.trend_snapshot().refit(&records);
        self.store.update_priors(next.to_snapshot())?;
        match self.trend.write() {
            Ok(mut trend) => *trend = next.clone(),
            Err(poisoned) => *poisoned.into_inner() = next.clone(),
        }
        Ok(next)
    }

    /// Exchange state with the mesh: fetch the remote snapshot with no lock
    /// held, then merge it with the stored and local state and commit in one
    /// locked read-modify-write, then publish.
    pub fn sync_mesh(&self, transport: &dyn MeshTransport) -> VerdictResult<MeshState> {
        let repository = self.config.mesh.repository_id.clone();
        let span = crate::mesh_sync_span!(repository);
        let _guard = span.enter();

        let remote = transport.fetch()?.unwrap_or_default();
        let remote_digest = remote.digest();
        let local = self.local_snapshot(repository)?;

        let commit = self.store.merge_mesh_state(|stored: Option<MeshState>| {
            let mut merged = stored.unwrap_or_default().merge(&remote);
            merged.observe(local);
            let digest = merged.digest();
            Ok((merged, digest))
        })?;

        if commit.digest != remote_digest {
            transport.publish(&commit.state)?;
        }
        info!(
            members = commit.state.len(),
            samples = commit.state.total_samples(),
            committed = commit.changed,
            "mesh synced"
        );
        Ok(commit.state)
    }

    fn local_snapshot(&self, repository: String) -> VerdictResult<RepoSnapshot> {
        let state = self.store.weight_state()?;
        let categories = self.store.category_tallies(self.config.prediction.stats_window)?;
        let sample_count = self.store.record_count()?;
        Ok(RepoSnapshot::new(
            repository,
            state.weights,
            state.clock,
            sample_count,
            categories,
        ))
    }

    /// Adopt the mesh's shared weights locally. Without a stored mesh state
    /// the local weights are left as they are.
    pub fn pull_shared_weights(&self) -> VerdictResult<WeightState> {
        let Some((mesh, _)) = self.store.mesh_state::<MeshState>()? else {
            return self.store.weight_state();
        };
        let state = self.store.set_weights(mesh.shared_weights())?;
        self.remember_weights(state.weights);
        info!(clock = state.clock, weights = ?state.weights.values(), "shared weights pulled");
        Ok(state)
    }

    /// Rolling statistics of one category. The label is matched the way
    /// `assess` stores it: trimmed and lowercased.
    pub fn category_stats(&self, category: &str) -> VerdictResult<CategoryStats> {
        self.store.category_stats(
            &normalize_category(Some(category)),
            self.config.prediction.stats_window,
        )
    }

    /// Suggested review posture from the latest runs.
    pub fn posture(&self) -> VerdictResult<ReviewPosture> {
        let recent = self.store.recent(POSTURE_WINDOW)?;
        Ok(ReviewPosture::from_recent(
            &recent,
            self.config.scoring.high_risk_threshold,
        ))
    }

    /// Calibration of the latest confidence scores.
    pub fn calibration(&self) -> VerdictResult<Calibration> {
        let recent = self.store.recent(self.config.prediction.stats_window)?;
        Ok(Calibration::from_records(&recent))
    }

    /// Persisted tuning state, as dashboards read it.
    pub fn weight_state(&self) -> VerdictResult<WeightState> {
        self.store.weight_state()
    }

    /// The trend model currently used for priors.
    pub fn trend_snapshot(&self) -> TrendModel {
        match self.trend.read() {
            Ok(trend) => trend.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn remember_weights(&self, weights: WeightVector) {
        match self.last_weights.lock() {
            Ok(mut last) => *last = weights,
            Err(poisoned) => *poisoned.into_inner() = weights,
        }
    }

    fn last_known_weights(&self) -> WeightVector {
        match self.last_weights.lock() {
            Ok(last) => *last,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn take_carried_degradations(&self) -> Vec<Degradation> {
        match self.carried.lock() {
            Ok(mut carried) => std::mem::take(&mut *carried),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn carry(&self, degradations: Vec<Degradation>) {
        if degradations.is_empty() {
            return;
        }
        match self.carried.lock() {
            Ok(mut carried) => carried.extend(degradations),
            Err(poisoned) => poisoned.into_inner().extend(degradations),
        }
    }
}
