//! Profile distance measures
//!
//! The clusterer and the nearest-cluster lookup only depend on the
//! [`DistanceMeasure`] trait, so alternate measures can be swapped in.

use recsys_common::{Dimension, Error, Result, UserProfile};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Non-negative dissimilarity between two profiles
///
/// Callers always pass the cluster center first. Implementations are expected
/// to be symmetric and deterministic, and must not have side effects.
pub trait DistanceMeasure: Send + Sync {
    /// Distance between `center` and `candidate` over `dimensions`
    ///
    /// # Errors
    /// `Error::MalformedProfile` when either profile cannot be measured.
    fn distance(
        &self,
        center: &UserProfile,
        candidate: &UserProfile,
        dimensions: &[Dimension],
    ) -> Result<f64>;
}

impl<T: DistanceMeasure + ?Sized> DistanceMeasure for Arc<T> {
    fn distance(
        &self,
        center: &UserProfile,
        candidate: &UserProfile,
        dimensions: &[Dimension],
    ) -> Result<f64> {
        (**self).distance(center, candidate, dimensions)
    }
}

/// Manhattan distance between subject interest weights
///
/// A subject the user did not declare weighs 0. With an empty dimension list
/// the union of both profiles' subjects is compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectDistance;

impl SubjectDistance {
    pub fn new() -> Self {
        Self
    }
}

impl DistanceMeasure for SubjectDistance {
    fn distance(
        &self,
        center: &UserProfile,
        candidate: &UserProfile,
        dimensions: &[Dimension],
    ) -> Result<f64> {
        if dimensions.is_empty() {
            let union: BTreeSet<&str> = center
                .subjects
                .keys()
                .chain(candidate.subjects.keys())
                .map(String::as_str)
                .collect();
            return manhattan(center, candidate, union.into_iter());
        }

        manhattan(center, candidate, dimensions.iter().map(String::as_str))
    }
}

fn manhattan<'a>(
    a: &UserProfile,
    b: &UserProfile,
    subjects: impl Iterator<Item = &'a str>,
) -> Result<f64> {
    let mut total = 0.0;
    for subject in subjects {
        total += (interest(a, subject)? - interest(b, subject)?).abs();
    }
    Ok(total)
}

fn interest(profile: &UserProfile, subject: &str) -> Result<f64> {
    match profile.weight(subject) {
        None => Ok(0.0),
        Some(weight) if weight.is_finite() && weight >= 0.0 => Ok(weight),
        Some(weight) => Err(Error::MalformedProfile {
            user_id: profile.id,
            reason: format!("invalid weight {} for subject '{}'", weight, subject),
        }),
    }
}
