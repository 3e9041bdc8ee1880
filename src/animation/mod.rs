//! Presentation bridge.
//!
//! Each game turns an already drawn outcome into a [`Timeline`] whose final
//! pose shows that outcome. The renderer only ever reads poses.

pub mod coin_flip;
pub mod easing;
pub mod roulette;
pub mod slots;
pub mod timeline;

use serde::{Deserialize, Serialize};

pub use coin_flip::{landed_face, CoinPose, CoinTimeline};
pub use easing::Easing;
pub use roulette::{landed_number, RoulettePose, RouletteTimeline};
pub use slots::{landed_symbols, ReelsPose, ReelsTimeline};
pub use timeline::{Progress, Timeline};

/// Pose of any game, as published in snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pose {
    Roulette(RoulettePose),
    Coin(CoinPose),
    Reels(ReelsPose),
}

impl Pose {
    /// Speed for the wheel, remaining share of the animation otherwise
    pub fn energy(&self) -> f64 {
        match self {
            Pose::Roulette(p) => p.speed,
            Pose::Coin(p) => p.energy,
            Pose::Reels(p) => p.energy,
        }
    }
}

impl From<RoulettePose> for Pose {
    fn from(pose: RoulettePose) -> Self {
        Pose::Roulette(pose)
    }
}

impl From<CoinPose> for Pose {
    fn from(pose: CoinPose) -> Self {
        Pose::Coin(pose)
    }
}

impl From<ReelsPose> for Pose {
    fn from(pose: ReelsPose) -> Self {
        Pose::Reels(pose)
    }
}
