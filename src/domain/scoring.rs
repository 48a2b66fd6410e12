//! Risk scoring, importance decomposition and scenario timelines.
//!
//! All functions here are pure: they read a [`FeatureVector`] and a
//! [`DiseaseModel`], never mutate either, and return fresh values. They are
//! deterministic and safe to call concurrently or to memoize by
//! `(features, disease)`.
//!
//! # Attribution model
//!
//! [`importance`] is a *local linear attribution*: each feature's share is the
//! magnitude of its `weight * value` term relative to the sum of all term
//! magnitudes. It ignores the bias, the non-linearity of the logistic
//! transform and any baseline, so it is neither causal nor a Shapley value.
//! Treat it as "what dominates the linear score for this scenario".

use super::features::{DerivedVector, FeatureVector, DERIVED_FEATURES, FEATURE_COUNT};
use super::{DiseaseModel, ImportanceEntry, RiskError, RiskResult, TimelinePoint};

/// Minimum number of points in a timeline (both endpoints).
pub const MIN_TIMELINE_STEPS: usize = 2;

/// Signed `weight * value` terms in canonical order.
#[must_use]
pub fn contributions(derived: &DerivedVector, model: &DiseaseModel) -> [f64; FEATURE_COUNT] {
    let mut terms = [0.0; FEATURE_COUNT];
    for (i, term) in terms.iter_mut().enumerate() {
        *term = model.weights()[i] * derived.values()[i];
    }
    terms
}

/// Score an already-derived vector.
///
/// `z = bias + Σ wᵢ·vᵢ`, accumulated left to right from the bias.
#[must_use]
pub fn evaluate_derived(derived: &DerivedVector, model: &DiseaseModel) -> RiskResult {
    let z = contributions(derived, model)
        .iter()
        .fold(model.bias(), |acc, term| acc + term);
    RiskResult::from_raw_score(z)
}

/// Score a scenario, keeping the raw linear score alongside the probability.
///
/// # Errors
/// Returns `RiskError::InvalidArgument` if the vector breaks its invariants
/// (e.g. a non-finite field).
pub fn evaluate(features: &FeatureVector, model: &DiseaseModel) -> Result<RiskResult, RiskError> {
    features.validate()?;
    Ok(evaluate_derived(&features.derive(), model))
}

/// Risk probability in `[0, 1]` for a scenario.
///
/// # Errors
/// Returns `RiskError::InvalidArgument` for invalid feature vectors.
pub fn score(features: &FeatureVector, model: &DiseaseModel) -> Result<f64, RiskError> {
    evaluate(features, model).map(|r| r.probability)
}

/// Per-feature attribution, one entry per derived feature in canonical order.
///
/// The order never depends on the values; use [`ranked`] for a sorted view.
/// When every term is zero the total is treated as 1 and all shares are 0.
/// Shares are rounded independently, so they can sum to slightly more or
/// less than 100.
///
/// Magnitudes are measured relative to the largest term so that huge but
/// finite inputs cannot overflow the total. If some terms overflow to
/// infinity, those terms split the shares evenly.
///
/// # Errors
/// Returns `RiskError::InvalidArgument` for invalid feature vectors.
pub fn importance(
    features: &FeatureVector,
    model: &DiseaseModel,
) -> Result<Vec<ImportanceEntry>, RiskError> {
    features.validate()?;
    let terms = contributions(&features.derive(), model);
    let magnitudes = relative_magnitudes(&terms);

    let total: f64 = magnitudes.iter().sum();
    let total = if total == 0.0 { 1.0 } else { total };

    Ok(DERIVED_FEATURES
        .iter()
        .zip(terms)
        .zip(magnitudes)
        .map(|((feature, raw), magnitude)| ImportanceEntry {
            feature: feature.name.to_string(),
            raw_contribution: raw,
            share_percent: (100.0 * (magnitude / total)).round().clamp(0.0, 100.0) as u8,
        })
        .collect())
}

/// `|term| / max |term|` for every term, each in `[0, 1]`.
///
/// All zeros when every term is zero. When the largest term is infinite,
/// infinite terms map to 1 and finite ones to 0.
fn relative_magnitudes(terms: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
    let largest = terms.iter().fold(0.0_f64, |acc, t| acc.max(t.abs()));
    let mut magnitudes = [0.0; FEATURE_COUNT];
    if largest == 0.0 {
        return magnitudes;
    }

    for (slot, term) in magnitudes.iter_mut().zip(terms) {
        let abs = term.abs();
        *slot = if largest.is_infinite() {
            if abs.is_infinite() {
                1.0
            } else {
                0.0
            }
        } else {
            abs / largest
        };
    }
    magnitudes
}

/// Copy of `entries` sorted by descending share, ties broken by the
/// magnitude of the raw term. The sort is stable, so remaining ties keep
/// canonical order.
#[must_use]
pub fn ranked(entries: &[ImportanceEntry]) -> Vec<ImportanceEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.share_percent.cmp(&a.share_percent).then_with(|| {
            b.raw_contribution
                .abs()
                .total_cmp(&a.raw_contribution.abs())
        })
    });
    sorted
}

/// Risk along a linear blend from `from` to `to`, `steps` points inclusive.
///
/// Every derived feature is blended as a number, including `sexIsMale`,
/// `smoker` and `familyHx`. Intermediate points therefore describe "virtual"
/// scenarios with fractional flags; only their scores are meaningful. This
/// keeps the curve smooth and is a known approximation. The curve is not
/// assumed to be monotonic since weights can have mixed signs.
///
/// # Errors
/// Returns `RiskError::InvalidArgument` if `steps < 2` or either vector is
/// invalid.
pub fn timeline(
    from: &FeatureVector,
    to: &FeatureVector,
    model: &DiseaseModel,
    steps: usize,
) -> Result<Vec<TimelinePoint>, RiskError> {
    if steps < MIN_TIMELINE_STEPS {
        return Err(RiskError::InvalidArgument(format!(
            "timeline needs at least {MIN_TIMELINE_STEPS} steps, got {steps}"
        )));
    }
    from.validate()?;
    to.validate()?;

    let start = from.derive();
    let end = to.derive();
    let last = (steps - 1) as f64;

    Ok((0..steps)
        .map(|step| {
            let t = step as f64 / last;
            let blended = DerivedVector::lerp(&start, &end, t);
            TimelinePoint {
                step,
                risk: evaluate_derived(&blended, model).probability,
            }
        })
        .collect())
}
