//! Time decay of mentions
//!
//! A mention's contribution halves every `half_life_days`. It never drops
//! below `stale_floor`, and past `max_decay_days` it is pinned to exactly
//! `stale_floor`, so old coverage keeps a small flat weight instead of
//! vanishing. The resulting curve is non-increasing in age.

use chrono::{DateTime, Utc};

use crate::models::Mention;
use crate::params::ScoringParams;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Age in fractional days. Dates in the future count as age zero.
pub fn age_days(effective: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - effective).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).max(0.0)
}

/// Decay weight in `(0, 1]` for a mention of the given age.
pub fn decay_for_age(age_days: f64, params: &ScoringParams) -> f64 {
    let age = age_days.max(0.0);
    if age > params.max_decay_days {
        return params.stale_floor;
    }
    0.5_f64
        .powf(age / params.half_life_days)
        .max(params.stale_floor)
}

pub fn decay_weight(effective: DateTime<Utc>, now: DateTime<Utc>, params: &ScoringParams) -> f64 {
    decay_for_age(age_days(effective, now), params)
}

/// Decay weight of a mention, dated by [`Mention::effective_date`].
pub fn mention_decay(mention: &Mention, now: DateTime<Utc>, params: &ScoringParams) -> f64 {
    decay_weight(mention.effective_date(), now, params)
}
