//! Deterministic fault injection for testing
//!
//! A [`FaultPolicy`] tells the simulated platform which call in the load
//! pipeline should fail. There is no randomness here; tests that want
//! random coverage seed their own generator and pick a [`FaultPoint`]
//! per trial.

use serde::{Deserialize, Serialize};

/// A call in the load pipeline that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultPoint {
    /// Opening the image file
    Open,
    /// Querying the open image's size
    SizeQuery,
    /// Mapping the staging region
    Map,
    /// Creating the codeset from the staged region
    CreateCodeset,
}

impl FaultPoint {
    /// Every injectable point, in pipeline order
    pub const ALL: [FaultPoint; 4] = [
        FaultPoint::Open,
        FaultPoint::SizeQuery,
        FaultPoint::Map,
        FaultPoint::CreateCodeset,
    ];
}

/// Which calls the simulated platform should fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Every call succeeds
    #[default]
    Never,
    /// Every call at the given point fails
    At(FaultPoint),
}

impl FaultPolicy {
    /// True when `point` should fail under this policy
    pub fn trips_at(&self, point: FaultPoint) -> bool {
        matches!(self, FaultPolicy::At(p) if *p == point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_trips_nothing() {
        for point in FaultPoint::ALL {
            assert!(!FaultPolicy::Never.trips_at(point));
        }
    }

    #[test]
    fn test_at_trips_only_its_point() {
        let policy = FaultPolicy::At(FaultPoint::Map);
        assert!(policy.trips_at(FaultPoint::Map));
        assert!(!policy.trips_at(FaultPoint::Open));
        assert!(!policy.trips_at(FaultPoint::CreateCodeset));
    }
}
