//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL seeds and levels:
//! - Generation: protected regions stay empty, obstacles stay in their region
//! - Generation: the final level and beyond are empty and unwinnable
//! - Upgrades: tiers never pass their cap, dash lines stay exclusive

use proptest::prelude::*;

use platformer_without_platforms::consts::{FINAL_LEVEL, PLAYFIELD_WIDTH, REGION_SIZE, START_REGION};
use platformer_without_platforms::region_index;
use platformer_without_platforms::sim::rng::RngState;
use platformer_without_platforms::sim::{Rect, generate_level};
use platformer_without_platforms::tuning::GenerationTuning;
use platformer_without_platforms::{UpgradeLedger, UpgradePath};

fn region_rect(col: usize, row: usize) -> Rect {
    Rect::new(
        col as i32 * REGION_SIZE,
        row as i32 * REGION_SIZE,
        REGION_SIZE,
        REGION_SIZE,
    )
}

fn path_strategy() -> impl Strategy<Value = UpgradePath> {
    (0..UpgradePath::ALL.len()).prop_map(|i| UpgradePath::ALL[i])
}

// ============================================================
// Level Generation Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_protected_regions_stay_empty(seed in any::<u64>(), level in 1u32..FINAL_LEVEL) {
        let mut rng = RngState::new(seed).to_rng();
        let layout = generate_level(level, &GenerationTuning::default(), &mut rng);
        let goal_region = (region_index(layout.goal.x), region_index(layout.goal.y));

        for obstacle in &layout.obstacles {
            let region = (region_index(obstacle.x), region_index(obstacle.y));
            prop_assert_ne!(region, START_REGION, "obstacle {:?} in start region", obstacle);
            prop_assert_ne!(region, goal_region, "obstacle {:?} in goal region", obstacle);
        }
    }

    #[test]
    fn prop_obstacles_stay_in_their_region(seed in any::<u64>(), level in 1u32..FINAL_LEVEL) {
        let mut rng = RngState::new(seed).to_rng();
        let layout = generate_level(level, &GenerationTuning::default(), &mut rng);
        for obstacle in &layout.obstacles {
            prop_assert!(!obstacle.is_empty());
            let home = region_rect(region_index(obstacle.x), region_index(obstacle.y));
            prop_assert!(home.contains_rect(obstacle), "{:?} leaves {:?}", obstacle, home);
        }
    }

    #[test]
    fn prop_goal_in_rightmost_column(seed in any::<u64>(), level in 1u32..FINAL_LEVEL) {
        let mut rng = RngState::new(seed).to_rng();
        let layout = generate_level(level, &GenerationTuning::default(), &mut rng);
        prop_assert_eq!(region_index(layout.goal.x), 3);
        prop_assert!(layout.goal.right() <= PLAYFIELD_WIDTH);
        prop_assert!(layout.goal.y >= 0);
    }

    #[test]
    fn prop_generation_is_deterministic(seed in any::<u64>(), level in 1u32..FINAL_LEVEL) {
        let tuning = GenerationTuning::default();
        let a = generate_level(level, &tuning, &mut RngState::new(seed).to_rng());
        let b = generate_level(level, &tuning, &mut RngState::new(seed).to_rng());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_final_levels_are_empty(seed in any::<u64>(), level in FINAL_LEVEL..200) {
        let mut rng = RngState::new(seed).to_rng();
        let layout = generate_level(level, &GenerationTuning::default(), &mut rng);
        prop_assert!(layout.obstacles.is_empty());
        prop_assert!(layout.is_terminal());
    }
}

// ============================================================
// Upgrade Ledger Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_tiers_never_exceed_cap(choices in prop::collection::vec(path_strategy(), 0..60)) {
        let mut ledger = UpgradeLedger::new();
        for path in choices {
            let _ = ledger.upgrade(path);
        }
        for path in UpgradePath::ALL {
            prop_assert!(ledger.tier(path) <= path.cap());
        }
    }

    #[test]
    fn prop_dash_lines_exclusive(choices in prop::collection::vec(path_strategy(), 0..60)) {
        let mut ledger = UpgradeLedger::new();
        for path in choices {
            let dash = ledger.tier(UpgradePath::Dash);
            let special = ledger.tier(UpgradePath::SpecialDash);
            let accepted = ledger.upgrade(path).is_ok();
            match path {
                UpgradePath::SpecialDash if accepted => prop_assert_eq!(dash, 1),
                UpgradePath::Dash if accepted => prop_assert_eq!(special, 0),
                _ => {}
            }
            // Once the special line is taken, the standard line stays at one
            if ledger.tier(UpgradePath::SpecialDash) > 0 {
                prop_assert_eq!(ledger.tier(UpgradePath::Dash), 1);
            }
        }
    }

    #[test]
    fn prop_available_matches_eligibility(choices in prop::collection::vec(path_strategy(), 0..30)) {
        let mut ledger = UpgradeLedger::new();
        for path in choices {
            let _ = ledger.upgrade(path);
        }
        let offered: Vec<UpgradePath> = ledger.available().iter().map(|o| o.path).collect();
        for path in UpgradePath::ALL {
            prop_assert_eq!(offered.contains(&path), ledger.is_eligible(path));
        }
    }
}
