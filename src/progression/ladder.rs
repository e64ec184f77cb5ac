//! Level ladder: experience thresholds and progress computation.

use serde::{Deserialize, Serialize};

/// A level tier with an experience threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    /// Tier index, 1-based.
    pub index: u32,
    /// Minimum experience required to hold this tier.
    pub min_xp: u32,
    /// Display name
    pub name: String,
    /// Display icon
    pub icon: String,
    /// Display color (hex)
    pub color: String,
}

impl LevelTier {
    /// Create a new level tier.
    pub fn new(
        index: u32,
        min_xp: u32,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            index,
            min_xp,
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
        }
    }
}

/// Progress from the current tier towards the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgress<'a> {
    /// Fraction of the way to the next tier, in [0, 1]. 1 at the top tier.
    pub fraction: f64,
    /// Experience still needed to reach the next tier. 0 at the top tier.
    pub xp_to_next: u32,
    /// The next tier, if any.
    pub next: Option<&'a LevelTier>,
}

/// An ordered ladder of level tiers.
///
/// Tier 1 starts at 0 XP and thresholds increase strictly, so every
/// experience value maps to exactly one tier.
#[derive(Debug, Clone)]
pub struct LevelLadder {
    tiers: Vec<LevelTier>,
}

impl LevelLadder {
    /// The standard cooking ladder.
    pub fn standard() -> Self {
        Self {
            tiers: super::definitions::standard_tiers(),
        }
    }

    /// Build a ladder from custom tiers, validating the ladder invariants.
    pub fn from_tiers(tiers: Vec<LevelTier>) -> Result<Self, LadderError> {
        let first = tiers.first().ok_or(LadderError::Empty)?;
        if first.min_xp != 0 {
            return Err(LadderError::FirstTierNotZero(first.min_xp));
        }

        for (i, tier) in tiers.iter().enumerate() {
            let expected = (i + 1) as u32;
            if tier.index != expected {
                return Err(LadderError::BadIndex {
                    expected,
                    found: tier.index,
                });
            }
            if i > 0 && tier.min_xp <= tiers[i - 1].min_xp {
                return Err(LadderError::NonIncreasingThreshold(tier.min_xp));
            }
        }

        Ok(Self { tiers })
    }

    /// All tiers, lowest first.
    pub fn tiers(&self) -> &[LevelTier] {
        &self.tiers
    }

    /// The tier held at the given experience: the highest tier whose
    /// threshold is at or below it.
    pub fn level_of(&self, experience: u32) -> &LevelTier {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.min_xp <= experience)
            .unwrap_or(&self.tiers[0])
    }

    /// Progress from the tier held at the given experience towards the next.
    pub fn progress_to_next(&self, experience: u32) -> LevelProgress<'_> {
        let current = self.level_of(experience);
        let next = self.tiers.get(current.index as usize);

        match next {
            Some(next_tier) => {
                // Thresholds increase strictly, so the span is never zero.
                let span = (next_tier.min_xp - current.min_xp) as f64;
                let gained = (experience - current.min_xp) as f64;
                LevelProgress {
                    fraction: gained / span,
                    xp_to_next: next_tier.min_xp - experience,
                    next: Some(next_tier),
                }
            }
            None => LevelProgress {
                fraction: 1.0,
                xp_to_next: 0,
                next: None,
            },
        }
    }
}

impl Default for LevelLadder {
    fn default() -> Self {
        Self::standard()
    }
}

/// Ladder validation errors.
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Ladder has no tiers")]
    Empty,

    #[error("First tier must start at 0 XP, found {0}")]
    FirstTierNotZero(u32),

    #[error("Tier index out of order: expected {expected}, found {found}")]
    BadIndex { expected: u32, found: u32 },

    #[error("Tier threshold {0} does not increase over the previous tier")]
    NonIncreasingThreshold(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_ladder() -> LevelLadder {
        LevelLadder::from_tiers(vec![
            LevelTier::new(1, 0, "First", "a", "#111111"),
            LevelTier::new(2, 100, "Second", "b", "#222222"),
            LevelTier::new(3, 300, "Third", "c", "#333333"),
        ])
        .expect("valid ladder")
    }

    #[test]
    fn test_level_of_thresholds() {
        let ladder = small_ladder();

        assert_eq!(ladder.level_of(0).index, 1);
        assert_eq!(ladder.level_of(99).index, 1);
        assert_eq!(ladder.level_of(100).index, 2);
        assert_eq!(ladder.level_of(299).index, 2);
        assert_eq!(ladder.level_of(300).index, 3);
        assert_eq!(ladder.level_of(u32::MAX).index, 3);
    }

    #[test]
    fn test_level_of_is_monotonic() {
        let ladder = small_ladder();

        let mut last_index = 0;
        for xp in 0..400 {
            let index = ladder.level_of(xp).index;
            assert!(index >= last_index, "level dropped at {} XP", xp);
            last_index = index;
        }
    }

    #[test]
    fn test_each_threshold_maps_to_its_tier() {
        let ladder = small_ladder();

        for tier in ladder.tiers() {
            assert_eq!(ladder.level_of(tier.min_xp), tier);
        }
    }

    #[test]
    fn test_progress_mid_tier() {
        let ladder = small_ladder();

        let progress = ladder.progress_to_next(150);
        assert_eq!(progress.next.unwrap().index, 3);
        assert_eq!(progress.xp_to_next, 150);
        assert!((progress.fraction - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_progress_at_threshold_is_zero() {
        let ladder = small_ladder();

        let progress = ladder.progress_to_next(100);
        assert_eq!(progress.fraction, 0.0);
        assert_eq!(progress.xp_to_next, 200);
    }

    #[test]
    fn test_progress_at_top_tier() {
        let ladder = small_ladder();

        let progress = ladder.progress_to_next(300);
        assert_eq!(progress.fraction, 1.0);
        assert_eq!(progress.xp_to_next, 0);
        assert!(progress.next.is_none());

        let beyond = ladder.progress_to_next(10_000);
        assert_eq!(beyond.fraction, 1.0);
        assert!(beyond.next.is_none());
    }

    #[test]
    fn test_from_tiers_rejects_empty() {
        assert!(matches!(
            LevelLadder::from_tiers(vec![]),
            Err(LadderError::Empty)
        ));
    }

    #[test]
    fn test_from_tiers_rejects_nonzero_start() {
        let result = LevelLadder::from_tiers(vec![LevelTier::new(1, 50, "First", "a", "#111111")]);
        assert!(matches!(result, Err(LadderError::FirstTierNotZero(50))));
    }

    #[test]
    fn test_from_tiers_rejects_flat_thresholds() {
        let result = LevelLadder::from_tiers(vec![
            LevelTier::new(1, 0, "First", "a", "#111111"),
            LevelTier::new(2, 0, "Second", "b", "#222222"),
        ]);
        assert!(matches!(
            result,
            Err(LadderError::NonIncreasingThreshold(0))
        ));
    }

    #[test]
    fn test_from_tiers_rejects_bad_indices() {
        let result = LevelLadder::from_tiers(vec![
            LevelTier::new(1, 0, "First", "a", "#111111"),
            LevelTier::new(3, 100, "Third", "c", "#333333"),
        ]);
        assert!(matches!(
            result,
            Err(LadderError::BadIndex {
                expected: 2,
                found: 3
            })
        ));
    }
}
