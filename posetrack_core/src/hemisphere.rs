// posetrack_core/src/hemisphere.rs

//! Keeps quaternions on one side of the double cover.
//!
//! `q` and `-q` describe the same rotation, but averaging or regressing across
//! the two produces a snap or a near-zero quaternion. Samples are flipped into
//! the hemisphere of a reference before they are stored, and anything read
//! back out of a linear combination is renormalized.

use crate::error::TrackingError;
use crate::types::Orientation;

/// Below this magnitude a quaternion cannot be renormalized.
pub const MIN_QUATERNION_NORM: f64 = 1e-9;

/// Returns `sample`, negated if it lies in the opposite hemisphere to `reference`.
pub fn align_to(sample: &Orientation, reference: &Orientation) -> Orientation {
    if sample.dot(reference) < 0.0 {
        -*sample
    } else {
        *sample
    }
}

/// Divides all four components by the quaternion's magnitude.
///
/// # Errors
/// `TrackingError::NumericalFault` if the magnitude is numerically zero.
pub fn renormalize(q: &Orientation) -> Result<Orientation, TrackingError> {
    let norm = q.norm();
    if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
        return Err(TrackingError::NumericalFault(format!(
            "cannot renormalize quaternion with magnitude {:e}",
            norm
        )));
    }
    Ok(Orientation::from(q.coords / norm))
}

/// Renormalizes `q`, falling back to `fallback` when that is impossible.
///
/// A zero-magnitude quaternion here means an invariant upstream is broken:
/// debug builds panic, release builds keep `fallback` and log the fault.
pub fn renormalize_or(q: &Orientation, fallback: &Orientation) -> Orientation {
    match renormalize(q) {
        Ok(unit) => unit,
        Err(err) => {
            if cfg!(debug_assertions) {
                panic!("{}", err);
            }
            tracing::error!("{}; keeping the previous orientation", err);
            *fallback
        }
    }
}
