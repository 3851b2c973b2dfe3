//! Ability upgrade ledger
//!
//! Nine independent upgrade paths, each with a fixed number of named tiers.
//! The two dash paths form a branch: the special line can only be entered
//! from exactly one tier of the standard line, and once entered the
//! standard line is frozen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the nine ability paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradePath {
    MidairJumps,
    SpeedBoost,
    JumpBoost,
    SlowFall,
    Dash,
    SpecialDash,
    Pogo,
    PortableWaypoint,
    AlignmentColumn,
}

impl UpgradePath {
    pub const ALL: [UpgradePath; 9] = [
        UpgradePath::MidairJumps,
        UpgradePath::SpeedBoost,
        UpgradePath::JumpBoost,
        UpgradePath::SlowFall,
        UpgradePath::Dash,
        UpgradePath::SpecialDash,
        UpgradePath::Pogo,
        UpgradePath::PortableWaypoint,
        UpgradePath::AlignmentColumn,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradePath::MidairJumps => "Midair Jumps",
            UpgradePath::SpeedBoost => "Speed Boost",
            UpgradePath::JumpBoost => "Jump Boost",
            UpgradePath::SlowFall => "Slow Fall",
            UpgradePath::Dash => "Dash",
            UpgradePath::SpecialDash => "Special Dash",
            UpgradePath::Pogo => "Pogo",
            UpgradePath::PortableWaypoint => "Portable Waypoint",
            UpgradePath::AlignmentColumn => "Alignment Column",
        }
    }

    /// Display names of each tier, in purchase order
    pub fn tier_names(&self) -> &'static [&'static str] {
        match self {
            UpgradePath::MidairJumps => &[
                "Double Jump",
                "Triple Jump",
                "Quadruple Jump",
                "Quintuple Jump",
                "Sextuple Jump",
            ],
            UpgradePath::SpeedBoost => &["Run", "Sprint"],
            UpgradePath::JumpBoost => &["High Jump", "Super High Jump"],
            UpgradePath::SlowFall => &["Slow Fall", "Glide"],
            UpgradePath::Dash => &["Horizontal Dash", "Double Dash", "Triple Dash"],
            UpgradePath::SpecialDash => &[
                "Omnidirectional Dash",
                "Teleport",
                "Dash with Invincibility",
            ],
            UpgradePath::Pogo => &["Pogo Jump", "Pogo Release"],
            UpgradePath::PortableWaypoint => &["Portable Waypoint"],
            UpgradePath::AlignmentColumn => &["Alignment Column", "UFO Beam"],
        }
    }

    /// How to use each tier
    pub fn tier_descriptions(&self) -> &'static [&'static str] {
        match self {
            UpgradePath::MidairJumps => &[
                "Jump once midair. Press jump while midair.",
                "Jump twice midair. Press jump while midair.",
                "Jump three times midair. Press jump while midair.",
                "Jump four times midair. Press jump while midair.",
                "Jump five times midair. Press jump while midair.",
            ],
            UpgradePath::SpeedBoost => &[
                "Optionally run faster. Hold boost while moving.",
                "Optionally run much faster. Hold boost while moving.",
            ],
            UpgradePath::JumpBoost => &[
                "Optionally jump higher. Hold boost while jumping.",
                "Optionally jump a lot higher. Hold boost while jumping.",
            ],
            UpgradePath::SlowFall => &[
                "Optionally fall slower. Hold boost while midair.",
                "Optionally fall a lot slower. Hold boost while midair.",
            ],
            UpgradePath::Dash => &[
                "Dash horizontally on the ground or once midair. Jumping cancels the dash.",
                "Dash horizontally on the ground or twice midair. Jumping cancels the dash.",
                "Dash horizontally on the ground or three times midair. Jumping cancels the dash.",
            ],
            UpgradePath::SpecialDash => &[
                "Dash in any direction on the ground or once midair. Jumping cancels the dash.",
                "Teleport a short distance in any direction on the ground or once midair.",
                "Dash in any direction, invincible while dashing. Jumping cancels the dash.",
            ],
            UpgradePath::Pogo => &[
                "Attack below yourself; hitting an obstacle bounces you. Hold attack and down.",
                "Releasing attack after a pogo hit grants one more jump.",
            ],
            UpgradePath::PortableWaypoint => &[
                "Place a waypoint, then use again to return to it. Once per life. Attack with no vertical tilt.",
            ],
            UpgradePath::AlignmentColumn => &[
                "Raise columns that keep you near your x position. Once per life. Attack while holding up.",
                "Columns also make you fall slower.",
            ],
        }
    }

    /// Number of tiers on this path
    #[inline]
    pub fn cap(&self) -> u8 {
        self.tier_names().len() as u8
    }
}

impl std::fmt::Display for UpgradePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an upgrade choice is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("{path} is already at its final tier ({cap})")]
    Capped { path: UpgradePath, cap: u8 },
    #[error("the standard dash line is closed once the special dash line is taken")]
    DashBranchTaken,
    #[error("the special dash line requires exactly the first standard dash tier")]
    SpecialDashLocked,
    #[error("upgrades can only be chosen between levels")]
    NotUpgrading,
}

/// An upgrade that can be bought right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeOffer {
    pub path: UpgradePath,
    pub name: &'static str,
    pub description: &'static str,
}

/// Current tier of every path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeLedger {
    tiers: [u8; 9],
}

impl UpgradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tier(&self, path: UpgradePath) -> u8 {
        self.tiers[path.index()]
    }

    /// Check whether `path` may be upgraded one more tier
    pub fn check(&self, path: UpgradePath) -> Result<(), UpgradeError> {
        let cap = path.cap();
        if self.tier(path) >= cap {
            return Err(UpgradeError::Capped { path, cap });
        }
        match path {
            UpgradePath::Dash if self.tier(UpgradePath::SpecialDash) != 0 => {
                Err(UpgradeError::DashBranchTaken)
            }
            UpgradePath::SpecialDash if self.tier(UpgradePath::Dash) != 1 => {
                Err(UpgradeError::SpecialDashLocked)
            }
            _ => Ok(()),
        }
    }

    pub fn is_eligible(&self, path: UpgradePath) -> bool {
        self.check(path).is_ok()
    }

    /// Advance `path` one tier, returning the new tier
    pub fn upgrade(&mut self, path: UpgradePath) -> Result<u8, UpgradeError> {
        self.check(path)?;
        let tier = &mut self.tiers[path.index()];
        *tier += 1;
        Ok(*tier)
    }

    /// Paths that can be bought now, with the name of their next tier
    pub fn available(&self) -> Vec<UpgradeOffer> {
        UpgradePath::ALL
            .iter()
            .filter(|path| self.is_eligible(**path))
            .map(|&path| {
                let next = self.tier(path) as usize;
                UpgradeOffer {
                    path,
                    name: path.tier_names()[next],
                    description: path.tier_descriptions()[next],
                }
            })
            .collect()
    }

    /// Ledger with preset tiers, ignoring eligibility but clamping to caps
    pub fn with_tiers(tiers: [u8; 9]) -> Self {
        let mut ledger = Self { tiers };
        for path in UpgradePath::ALL {
            let slot = &mut ledger.tiers[path.index()];
            *slot = (*slot).min(path.cap());
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_match_catalogue() {
        let caps: Vec<u8> = UpgradePath::ALL.iter().map(|p| p.cap()).collect();
        assert_eq!(caps, vec![5, 2, 2, 2, 3, 3, 2, 1, 2]);
        for path in UpgradePath::ALL {
            assert_eq!(path.tier_names().len(), path.tier_descriptions().len());
        }
    }

    #[test]
    fn test_capped_path_refused() {
        let mut ledger = UpgradeLedger::new();
        assert_eq!(ledger.upgrade(UpgradePath::PortableWaypoint), Ok(1));
        assert_eq!(
            ledger.upgrade(UpgradePath::PortableWaypoint),
            Err(UpgradeError::Capped {
                path: UpgradePath::PortableWaypoint,
                cap: 1
            })
        );
        assert_eq!(ledger.tier(UpgradePath::PortableWaypoint), 1);
    }

    #[test]
    fn test_special_dash_needs_exactly_first_dash_tier() {
        let mut ledger = UpgradeLedger::new();
        assert_eq!(
            ledger.upgrade(UpgradePath::SpecialDash),
            Err(UpgradeError::SpecialDashLocked)
        );
        ledger.upgrade(UpgradePath::Dash).unwrap();
        assert!(ledger.is_eligible(UpgradePath::SpecialDash));
        ledger.upgrade(UpgradePath::Dash).unwrap();
        assert_eq!(
            ledger.upgrade(UpgradePath::SpecialDash),
            Err(UpgradeError::SpecialDashLocked)
        );
    }

    #[test]
    fn test_special_dash_freezes_standard_line() {
        let mut ledger = UpgradeLedger::new();
        ledger.upgrade(UpgradePath::Dash).unwrap();
        ledger.upgrade(UpgradePath::SpecialDash).unwrap();
        assert_eq!(
            ledger.upgrade(UpgradePath::Dash),
            Err(UpgradeError::DashBranchTaken)
        );
        // Special line keeps going on its own
        assert_eq!(ledger.upgrade(UpgradePath::SpecialDash), Ok(2));
        assert_eq!(ledger.upgrade(UpgradePath::SpecialDash), Ok(3));
        assert_eq!(ledger.tier(UpgradePath::Dash), 1);
    }

    #[test]
    fn test_available_offers_next_tier_name() {
        let mut ledger = UpgradeLedger::new();
        let offers = ledger.available();
        assert_eq!(offers.len(), 8); // everything but the special dash line
        assert!(offers.iter().all(|o| o.path != UpgradePath::SpecialDash));

        ledger.upgrade(UpgradePath::MidairJumps).unwrap();
        let jump = ledger
            .available()
            .into_iter()
            .find(|o| o.path == UpgradePath::MidairJumps)
            .unwrap();
        assert_eq!(jump.name, "Triple Jump");
    }

    #[test]
    fn test_with_tiers_clamps() {
        let ledger = UpgradeLedger::with_tiers([9; 9]);
        for path in UpgradePath::ALL {
            assert_eq!(ledger.tier(path), path.cap());
        }
    }
}
