//! Reel strips that spin down one after another onto the drawn symbols.

use serde::{Deserialize, Serialize};

use crate::animation::easing::Easing;
use crate::animation::timeline::{Progress, Timeline};
use crate::config::SlotsConfig;
use crate::games::types::{ReelStops, SlotSymbol};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelsPose {
    /// Strip position of each reel, in symbols
    pub offsets: Vec<f64>,
    pub spinning: Vec<bool>,
    /// Mean share of reel travel still ahead
    pub energy: f64,
}

impl ReelsPose {
    pub fn rest(config: &SlotsConfig) -> Self {
        Self {
            offsets: vec![0.0; config.reel_count],
            spinning: vec![false; config.reel_count],
            energy: 0.0,
        }
    }
}

/// Symbols on the pay line for `pose`
pub fn landed_symbols(pose: &ReelsPose) -> ReelStops {
    ReelStops(
        pose.offsets
            .iter()
            .map(|offset| {
                let slot = offset.round().rem_euclid(SlotSymbol::COUNT as f64) as usize;
                SlotSymbol::from_index(slot)
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq)]
struct ReelPlan {
    start: f64,
    travel: f64,
    stop_at: f64,
}

#[derive(Debug, Clone)]
pub struct ReelsTimeline {
    stops: ReelStops,
    reels: Vec<ReelPlan>,
    progress: Progress,
}

impl ReelsTimeline {
    /// Reel `j` stops at `reel_spin_duration + j * reel_stagger` after
    /// `min_reel_laps + j` full laps plus whatever lines it up on its symbol.
    pub fn new(stops: ReelStops, config: &SlotsConfig, from: &ReelsPose) -> Self {
        let count = SlotSymbol::COUNT as i64;
        let reels: Vec<ReelPlan> = stops
            .symbols()
            .iter()
            .enumerate()
            .map(|(j, symbol)| {
                let start = from.offsets.get(j).copied().unwrap_or(0.0).round();
                let laps = (config.min_reel_laps as i64 + j as i64) * count;
                let align = (symbol.index() as i64 - start as i64).rem_euclid(count);
                ReelPlan {
                    start,
                    travel: (laps + align) as f64,
                    stop_at: config.reel_spin_duration + j as f64 * config.reel_stagger,
                }
            })
            .collect();

        let duration = reels.iter().map(|r| r.stop_at).fold(0.0, f64::max);

        Self {
            stops,
            reels,
            progress: Progress::new(duration),
        }
    }

    pub fn stops(&self) -> &ReelStops {
        &self.stops
    }
}

impl Timeline for ReelsTimeline {
    type Pose = ReelsPose;

    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn pose(&self) -> ReelsPose {
        let t = self.progress.elapsed();
        let done = self.progress.is_complete();

        let mut offsets = Vec::with_capacity(self.reels.len());
        let mut spinning = Vec::with_capacity(self.reels.len());
        let mut remaining = 0.0;

        for reel in &self.reels {
            let stopped = done || t >= reel.stop_at || reel.stop_at <= 0.0;
            let eased = if stopped {
                1.0
            } else {
                Easing::EaseOutCubic.apply(t / reel.stop_at)
            };
            offsets.push(reel.start + reel.travel * eased);
            spinning.push(!stopped);
            remaining += 1.0 - eased;
        }

        let energy = if self.reels.is_empty() {
            0.0
        } else {
            remaining / self.reels.len() as f64
        };

        ReelsPose {
            offsets,
            spinning,
            energy,
        }
    }
}
