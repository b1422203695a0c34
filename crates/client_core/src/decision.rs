//! Release-time classification of a swipe.

use shared::domain::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Vote(Side),
    Cancel,
}

/// Maps the final displacement of a released gesture to an outcome. The
/// threshold itself cancels; only displacements strictly beyond it vote.
pub fn decide(delta: f64, threshold: f64) -> Decision {
    if !delta.is_finite() {
        return Decision::Cancel;
    }
    if delta < -threshold {
        Decision::Vote(Side::Left)
    } else if delta > threshold {
        Decision::Vote(Side::Right)
    } else {
        Decision::Cancel
    }
}
