//! Tests for the standard progression ladder.

use toque::progression::LevelLadder;

#[test]
fn test_zero_experience_is_first_tier() {
    let ladder = LevelLadder::standard();

    let tier = ladder.level_of(0);
    assert_eq!(tier.index, 1);
    assert_eq!(tier.name, "Novice Cook");
    assert_eq!(tier.min_xp, 0);
}

#[test]
fn test_hundred_experience_reaches_second_tier() {
    let ladder = LevelLadder::standard();

    assert_eq!(ladder.level_of(99).index, 1);

    let tier = ladder.level_of(100);
    assert_eq!(tier.index, 2);
    assert_eq!(tier.name, "Home Cook");

    // Progress at exactly 100 XP is measured against the second tier span.
    let progress = ladder.progress_to_next(100);
    assert_eq!(progress.fraction, 0.0);
    assert_eq!(progress.xp_to_next, 150);
    assert_eq!(progress.next.unwrap().index, 3);
}

#[test]
fn test_level_never_decreases_with_experience() {
    let ladder = LevelLadder::standard();

    let mut last_index = 0;
    for xp in (0..6000).step_by(7) {
        let index = ladder.level_of(xp).index;
        assert!(index >= last_index, "level dropped at {} XP", xp);
        last_index = index;
    }
}

#[test]
fn test_every_threshold_maps_to_its_own_tier() {
    let ladder = LevelLadder::standard();

    for tier in ladder.tiers() {
        assert_eq!(ladder.level_of(tier.min_xp).index, tier.index);
        if tier.min_xp > 0 {
            assert_eq!(ladder.level_of(tier.min_xp - 1).index, tier.index - 1);
        }
    }
}

#[test]
fn test_top_tier_progress_is_complete() {
    let ladder = LevelLadder::standard();
    let top = ladder.tiers().last().unwrap();

    let progress = ladder.progress_to_next(top.min_xp);
    assert_eq!(progress.fraction, 1.0);
    assert_eq!(progress.xp_to_next, 0);
    assert!(progress.next.is_none());

    let far_beyond = ladder.progress_to_next(top.min_xp + 100_000);
    assert_eq!(far_beyond.fraction, 1.0);
    assert!(far_beyond.next.is_none());
}

#[test]
fn test_fraction_stays_within_bounds() {
    let ladder = LevelLadder::standard();

    for xp in (0..6000).step_by(13) {
        let progress = ladder.progress_to_next(xp);
        assert!(progress.fraction >= 0.0);
        assert!(progress.fraction <= 1.0);
    }
}
