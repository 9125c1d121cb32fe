//! Priority levels and their two score tables.
//!
//! A level owns two DISTINCT numeric mappings that must not be conflated:
//!
//! - the per-signal score band, used when classifying one raw signal
//!   (score = band min + band width x confidence);
//! - the aggregation tables, used when averaging many signals: a coarse
//!   level score that normalizes signals from different scoring paths,
//!   and thresholds that re-derive a level from an averaged score.
//!
//! The band edges and the aggregation thresholds happen to line up, which
//! keeps the stored-score-inside-stored-level-band invariant true by
//! construction, but the tables are separate on purpose.

use serde::{Deserialize, Serialize};

/// Discrete priority level, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    P0,
    P1,
    P2,
    P3,
}

/// Inclusive score range owned by one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBand {
    pub min: i64,
    pub max: i64,
}

impl ScoreBand {
    pub fn contains(&self, score: i64) -> bool {
        score >= self.min && score <= self.max
    }
}

impl PriorityLevel {
    pub const ALL: [PriorityLevel; 4] = [
        PriorityLevel::P0,
        PriorityLevel::P1,
        PriorityLevel::P2,
        PriorityLevel::P3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::P0 => "P0",
            PriorityLevel::P1 => "P1",
            PriorityLevel::P2 => "P2",
            PriorityLevel::P3 => "P3",
        }
    }

    /// Strict parse, case-insensitive. Returns None for anything that is
    /// not one of the four levels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "P0" => Some(PriorityLevel::P0),
            "P1" => Some(PriorityLevel::P1),
            "P2" => Some(PriorityLevel::P2),
            "P3" => Some(PriorityLevel::P3),
            _ => None,
        }
    }

    /// Lossy parse for stored strings: unknown values fall back to P2.
    pub fn from_str_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(PriorityLevel::P2)
    }

    /// Per-signal score band (classification path).
    pub fn score_band(&self) -> ScoreBand {
        match self {
            PriorityLevel::P0 => ScoreBand { min: 90, max: 100 },
            PriorityLevel::P1 => ScoreBand { min: 70, max: 89 },
            PriorityLevel::P2 => ScoreBand { min: 40, max: 69 },
            PriorityLevel::P3 => ScoreBand { min: 0, max: 39 },
        }
    }

    /// Place a confidence inside this level's band. Confidence is clamped
    /// to [0, 1], so the result always lands inside the band.
    pub fn score_for_confidence(&self, confidence: f64) -> i64 {
        let band = self.score_band();
        let conf = confidence.clamp(0.0, 1.0);
        band.min + ((band.max - band.min) as f64 * conf).round() as i64
    }

    /// Coarse level score used by the aggregation average. NOT the band
    /// midpoint; see the module docs.
    pub fn aggregate_score(&self) -> i64 {
        match self {
            PriorityLevel::P0 => 95,
            PriorityLevel::P1 => 75,
            PriorityLevel::P2 => 50,
            PriorityLevel::P3 => 25,
        }
    }

    /// Re-derive a level from an aggregated score (aggregation thresholds,
    /// not the per-signal bands).
    pub fn from_aggregate_score(score: i64) -> Self {
        if score >= 90 {
            PriorityLevel::P0
        } else if score >= 70 {
            PriorityLevel::P1
        } else if score >= 40 {
            PriorityLevel::P2
        } else {
            PriorityLevel::P3
        }
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_score_stays_inside_band() {
        for level in PriorityLevel::ALL {
            let band = level.score_band();
            for conf in [0.0, 0.1, 0.5, 0.9, 0.95, 1.0] {
                let score = level.score_for_confidence(conf);
                assert!(
                    band.contains(score),
                    "{level} conf {conf} gave {score}, outside [{}, {}]",
                    band.min,
                    band.max
                );
            }
        }
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        assert_eq!(
            PriorityLevel::P0.score_for_confidence(1.7),
            PriorityLevel::P0.score_band().max
        );
        assert_eq!(
            PriorityLevel::P3.score_for_confidence(-0.5),
            PriorityLevel::P3.score_band().min
        );
    }

    #[test]
    fn aggregation_thresholds_at_band_boundaries() {
        assert_eq!(PriorityLevel::from_aggregate_score(95), PriorityLevel::P0);
        assert_eq!(PriorityLevel::from_aggregate_score(90), PriorityLevel::P0);
        assert_eq!(PriorityLevel::from_aggregate_score(89), PriorityLevel::P1);
        assert_eq!(PriorityLevel::from_aggregate_score(70), PriorityLevel::P1);
        assert_eq!(PriorityLevel::from_aggregate_score(69), PriorityLevel::P2);
        assert_eq!(PriorityLevel::from_aggregate_score(40), PriorityLevel::P2);
        assert_eq!(PriorityLevel::from_aggregate_score(39), PriorityLevel::P3);
        assert_eq!(PriorityLevel::from_aggregate_score(0), PriorityLevel::P3);
    }

    #[test]
    fn coarse_aggregate_scores_round_trip_to_their_level() {
        // Keeps the stored score-inside-band invariant true by construction.
        for level in PriorityLevel::ALL {
            let coarse = level.aggregate_score();
            assert_eq!(PriorityLevel::from_aggregate_score(coarse), level);
            assert!(level.score_band().contains(coarse));
        }
    }

    #[test]
    fn parse_is_strict_and_lossy_defaults_to_p2() {
        assert_eq!(PriorityLevel::parse("p1"), Some(PriorityLevel::P1));
        assert_eq!(PriorityLevel::parse(" P3 "), Some(PriorityLevel::P3));
        assert_eq!(PriorityLevel::parse("critical"), None);
        assert_eq!(PriorityLevel::from_str_lossy("??"), PriorityLevel::P2);
    }
}
