//! Accumulated bonus score.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-negative accumulated loyalty score.
///
/// The persisted representation is a string-encoded integer - the record
/// store keeps it as text, and older clients expect to read it back that
/// way - so the serde impls go through strings rather than JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BonusScore(u64);

impl BonusScore {
    /// The zero score.
    pub const ZERO: Self = Self(0);

    /// Create a score from a raw point count.
    #[must_use]
    pub const fn new(points: u64) -> Self {
        Self(points)
    }

    /// Get the raw point count.
    #[must_use]
    pub const fn points(&self) -> u64 {
        self.0
    }

    /// Whether no points have been accrued.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add points, saturating at `u64::MAX`.
    #[must_use]
    pub const fn plus(&self, points: u64) -> Self {
        Self(self.0.saturating_add(points))
    }
}

impl fmt::Display for BonusScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BonusScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BonusScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>()
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid bonus score {raw:?}: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert!(BonusScore::ZERO.is_zero());
        assert!(!BonusScore::new(1).is_zero());
    }

    #[test]
    fn test_plus_accumulates() {
        let score = BonusScore::ZERO.plus(120).plus(80);
        assert_eq!(score.points(), 200);
    }

    #[test]
    fn test_plus_saturates() {
        let score = BonusScore::new(u64::MAX).plus(10);
        assert_eq!(score.points(), u64::MAX);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&BonusScore::new(450)).unwrap();
        assert_eq!(json, "\"450\"");
    }

    #[test]
    fn test_deserializes_from_string() {
        let score: BonusScore = serde_json::from_str("\"450\"").unwrap();
        assert_eq!(score, BonusScore::new(450));
    }

    #[test]
    fn test_rejects_non_numeric_strings() {
        assert!(serde_json::from_str::<BonusScore>("\"many\"").is_err());
        assert!(serde_json::from_str::<BonusScore>("\"-3\"").is_err());
    }
}
