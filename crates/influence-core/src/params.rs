//! Tunable constants of the scoring engine
//!
//! Defaults reproduce the production weighting. Every field can be overridden
//! from configuration; missing fields fall back to the default.

use serde::{Deserialize, Serialize};

use crate::error::{InfluenceError, InfluenceResult};
use crate::models::EntityKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Decay weight halves every `half_life_days`
    pub half_life_days: f64,
    /// Mentions older than this contribute exactly `stale_floor`
    pub max_decay_days: f64,
    /// Minimum decay weight
    pub stale_floor: f64,

    /// Volume term: `min(total_weight * volume_multiplier, volume_cap)`
    pub volume_multiplier: f64,
    pub volume_cap: f64,
    /// Intensity term: `min(sentiment_sum * sentiment_multiplier, sentiment_cap)`
    pub sentiment_multiplier: f64,
    pub sentiment_cap: f64,
    /// Diversity term: `min(article_count * diversity_multiplier, diversity_cap)`
    pub diversity_multiplier: f64,
    pub diversity_cap: f64,

    /// Jaccard similarity must exceed this to form an asset edge
    pub similarity_threshold: f64,
    /// Existing relationships at or above this correlation seed propagation
    pub propagation_seed_threshold: f64,
    /// Damping applied to second-order weight
    pub propagation_damping: f64,

    /// Stored relationships at or above both thresholds are never rewritten
    pub permanent_min_correlation: f64,
    pub permanent_min_co_mentions: u32,

    /// Pairs with no direct co-mention need more than this weight to persist
    pub min_persist_weight: f64,
    /// Person score used for edges whose person was not scored this run
    pub default_person_score: u8,

    pub baseline: BaselinePolicy,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            half_life_days: 7.0,
            max_decay_days: 30.0,
            stale_floor: 0.1,
            volume_multiplier: 5.0,
            volume_cap: 50.0,
            sentiment_multiplier: 15.0,
            sentiment_cap: 30.0,
            diversity_multiplier: 2.0,
            diversity_cap: 20.0,
            similarity_threshold: 0.1,
            propagation_seed_threshold: 0.5,
            propagation_damping: 0.3,
            permanent_min_correlation: 0.9,
            permanent_min_co_mentions: 50,
            min_persist_weight: 0.1,
            default_person_score: 50,
            baseline: BaselinePolicy::default(),
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> InfluenceResult<()> {
        if !(self.half_life_days > 0.0) {
            return Err(InfluenceError::InvalidParameter(format!(
                "half_life_days must be positive, got {}",
                self.half_life_days
            )));
        }
        if self.max_decay_days < 0.0 {
            return Err(InfluenceError::InvalidParameter(format!(
                "max_decay_days cannot be negative, got {}",
                self.max_decay_days
            )));
        }
        if !(self.stale_floor > 0.0 && self.stale_floor <= 1.0) {
            return Err(InfluenceError::InvalidParameter(format!(
                "stale_floor must be in (0, 1], got {}",
                self.stale_floor
            )));
        }

        let unit_fields = [
            ("similarity_threshold", self.similarity_threshold),
            ("propagation_seed_threshold", self.propagation_seed_threshold),
            ("propagation_damping", self.propagation_damping),
            ("permanent_min_correlation", self.permanent_min_correlation),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(InfluenceError::InvalidParameter(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("volume_multiplier", self.volume_multiplier),
            ("volume_cap", self.volume_cap),
            ("sentiment_multiplier", self.sentiment_multiplier),
            ("sentiment_cap", self.sentiment_cap),
            ("diversity_multiplier", self.diversity_multiplier),
            ("diversity_cap", self.diversity_cap),
            ("min_persist_weight", self.min_persist_weight),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(InfluenceError::InvalidParameter(format!(
                    "{} cannot be negative, got {}",
                    name, value
                )));
            }
        }

        if self.default_person_score > 100 {
            return Err(InfluenceError::InvalidParameter(format!(
                "default_person_score must be at most 100, got {}",
                self.default_person_score
            )));
        }

        self.baseline.validate()
    }
}

/// Score handed to an entity whose normalized score came out as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Same score for every unscored entity of a kind
    Fixed { person: u8, asset: u8 },
    /// Uniform draw: people 30..=50, assets 20..=35. Seeded runs are reproducible.
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl Default for BaselinePolicy {
    fn default() -> Self {
        BaselinePolicy::Fixed {
            person: 40,
            asset: 28,
        }
    }
}

impl BaselinePolicy {
    pub fn random_range(kind: EntityKind) -> (u8, u8) {
        match kind {
            EntityKind::Person => (30, 50),
            EntityKind::Asset => (20, 35),
        }
    }

    fn validate(&self) -> InfluenceResult<()> {
        if let BaselinePolicy::Fixed { person, asset } = self {
            if *person > 100 || *asset > 100 {
                return Err(InfluenceError::InvalidParameter(format!(
                    "fixed baseline must be at most 100, got person={} asset={}",
                    person, asset
                )));
            }
        }
        Ok(())
    }
}
