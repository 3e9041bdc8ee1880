//! Coin toss: a run of half-turns while the coin rises and falls, then a
//! bounce onto the drawn face.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::animation::easing::{lerp, Easing};
use crate::animation::timeline::{Progress, Timeline};
use crate::config::CoinFlipConfig;
use crate::games::types::CoinFace;
use crate::games::wheel::wrap_angle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinPose {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub rotation_z: f64,
    pub height: f64,
    /// Share of the toss still to play, 1 at launch and 0 at rest
    pub energy: f64,
}

impl CoinPose {
    /// Coin hovering at rest height and turning slowly
    pub fn rest(config: &CoinFlipConfig, clock: f64) -> Self {
        Self {
            rotation_x: wrap_angle(config.idle_spin_rate * clock),
            rotation_y: 0.0,
            rotation_z: 0.0,
            height: config.rest_height,
            energy: 0.0,
        }
    }
}

/// Face showing for a coin lying in `pose`
pub fn landed_face(pose: &CoinPose) -> CoinFace {
    let x = wrap_angle(pose.rotation_x);
    if (FRAC_PI_2..3.0 * FRAC_PI_2).contains(&x) {
        CoinFace::Croce
    } else {
        CoinFace::Testa
    }
}

/// Resting x rotation of each face, modulo a full turn
fn face_angle(face: CoinFace) -> f64 {
    match face {
        CoinFace::Testa => 0.0,
        CoinFace::Croce => PI,
    }
}

#[derive(Debug, Clone)]
pub struct CoinTimeline {
    face: CoinFace,
    half_turns: u32,
    half_turn_duration: f64,
    settle_duration: f64,
    rest_height: f64,
    peak_height: f64,
    /// Extra rotation during the settle so the drawn face ends up on top
    settle_delta: f64,
    progress: Progress,
}

impl CoinTimeline {
    /// `unit` picks the number of half-turns and never the face
    pub fn new(face: CoinFace, config: &CoinFlipConfig, unit: f64) -> Self {
        let span = config.max_half_turns.saturating_sub(config.min_half_turns) + 1;
        let extra = ((unit.clamp(0.0, 1.0) * span as f64).floor() as u32).min(span - 1);
        let half_turns = config.min_half_turns + extra;

        let spun = half_turns as f64 * PI;
        // Either ~0 or ~π; a value just under 2π is rounding noise around 0
        let settle_delta = match wrap_angle(face_angle(face) - spun) {
            d if d > 3.0 * FRAC_PI_2 => d - 2.0 * PI,
            d => d,
        };

        let duration = half_turns as f64 * config.half_turn_duration + config.settle_duration;

        Self {
            face,
            half_turns,
            half_turn_duration: config.half_turn_duration,
            settle_duration: config.settle_duration,
            rest_height: config.rest_height,
            peak_height: config.peak_height,
            settle_delta,
            progress: Progress::new(duration),
        }
    }

    pub fn face(&self) -> CoinFace {
        self.face
    }

    pub fn half_turns(&self) -> u32 {
        self.half_turns
    }

    fn flip_duration(&self) -> f64 {
        self.half_turns as f64 * self.half_turn_duration
    }

    fn height_at(&self, t: f64) -> f64 {
        let flight = self.flip_duration();
        let apex = flight / 2.0;
        if t >= flight || apex <= 0.0 {
            self.rest_height
        } else if t < apex {
            lerp(self.rest_height, self.peak_height, Easing::EaseOutCubic.apply(t / apex))
        } else {
            lerp(self.peak_height, self.rest_height, Easing::EaseInCubic.apply((t - apex) / apex))
        }
    }
}

impl Timeline for CoinTimeline {
    type Pose = CoinPose;

    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn pose(&self) -> CoinPose {
        let t = self.progress.elapsed();
        let flight = self.flip_duration();
        let spun = self.half_turns as f64 * PI;

        let (rotation_x, tilt) = if self.progress.is_complete() {
            (spun + self.settle_delta, FRAC_PI_2)
        } else if t < flight {
            let turn = (t / self.half_turn_duration).floor();
            let within = (t - turn * self.half_turn_duration) / self.half_turn_duration;
            ((turn + Easing::EaseInOutQuad.apply(within)) * PI, 0.0)
        } else {
            let e = Easing::EaseOutBounce.apply((t - flight) / self.settle_duration);
            (spun + self.settle_delta * e, FRAC_PI_2 * e)
        };

        CoinPose {
            rotation_x,
            rotation_y: tilt,
            rotation_z: tilt,
            height: self.height_at(t),
            energy: 1.0 - self.progress.fraction(),
        }
    }
}
