//! Standard tier definitions.

use super::ladder::LevelTier;

/// The standard cooking tiers, lowest first.
pub fn standard_tiers() -> Vec<LevelTier> {
    vec![
        LevelTier::new(1, 0, "Novice Cook", "🍳", "#9E9E9E"),
        LevelTier::new(2, 100, "Home Cook", "🥄", "#8D6E63"),
        LevelTier::new(3, 250, "Line Cook", "🔪", "#CD7F32"),
        LevelTier::new(4, 500, "Sous Chef", "🍲", "#C0C0C0"),
        LevelTier::new(5, 1000, "Chef de Partie", "🥘", "#FFD700"),
        LevelTier::new(6, 2000, "Head Chef", "👨‍🍳", "#50C878"),
        LevelTier::new(7, 3500, "Executive Chef", "⭐", "#B9F2FF"),
        LevelTier::new(8, 5500, "Master Chef", "🏆", "#FF4500"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::ladder::LevelLadder;

    #[test]
    fn test_standard_tiers_form_a_valid_ladder() {
        let ladder = LevelLadder::from_tiers(standard_tiers());
        assert!(ladder.is_ok());
    }

    #[test]
    fn test_standard_tiers_shape() {
        let tiers = standard_tiers();

        assert_eq!(tiers.first().unwrap().min_xp, 0);
        assert_eq!(tiers.get(1).unwrap().min_xp, 100);

        // All names unique
        let mut names: Vec<_> = tiers.iter().map(|t| &t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tiers.len());
    }
}
