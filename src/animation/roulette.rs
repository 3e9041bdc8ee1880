//! Wheel and ball motion for one roulette spin.
//!
//! The wheel decelerates by a constant factor per simulation step, so its
//! travel after `k` steps has the closed form `D(k) = s0 (1 - d^k) / (1 - d)`.
//! The ball runs at `ball_speed_ratio` times the wheel plus a small correction
//! spread over the spin in proportion to `D(k)`. The correction is chosen when
//! the spin starts so that the ball comes to rest over the centre of the
//! pocket that was already drawn.

use serde::{Deserialize, Serialize};

use crate::animation::timeline::{Progress, Timeline};
use crate::config::RouletteConfig;
use crate::games::wheel::{pocket_at, wrap_angle, Pocket};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoulettePose {
    /// Absolute wheel rotation (radians, unwrapped)
    pub wheel_rotation: f64,
    /// Absolute ball angle (radians, unwrapped)
    pub ball_angle: f64,
    pub ball_radius: f64,
    /// Wheel speed in radians per simulation step
    pub speed: f64,
}

impl RoulettePose {
    /// Idle wheel turning slowly with the ball parked on the outer track
    pub fn rest(config: &RouletteConfig, clock: f64) -> Self {
        Self {
            wheel_rotation: wrap_angle(config.idle_spin_rate * clock),
            ball_angle: 0.0,
            ball_radius: config.ball_start_radius,
            speed: 0.0,
        }
    }

    /// Ball angle measured from the wheel's zero mark
    pub fn relative_ball_angle(&self) -> f64 {
        wrap_angle(self.ball_angle - self.wheel_rotation)
    }

    /// Ball position in the wheel's horizontal plane
    pub fn ball_position(&self) -> (f64, f64) {
        (
            self.ball_angle.cos() * self.ball_radius,
            self.ball_angle.sin() * self.ball_radius,
        )
    }
}

/// Pocket the ball is sitting over in `pose`
pub fn landed_number(pose: &RoulettePose) -> Pocket {
    pocket_at(pose.ball_angle - pose.wheel_rotation)
}

#[derive(Debug, Clone)]
pub struct RouletteTimeline {
    pocket: Pocket,
    wheel_start: f64,
    ball_start: f64,
    initial_speed: f64,
    damping: f64,
    radius_damping: f64,
    ball_start_radius: f64,
    ball_speed_ratio: f64,
    tick_rate: f64,
    /// Steps until the wheel drops below the stop speed
    steps: f64,
    /// Wheel travel over the whole spin, `D(steps)`
    total_travel: f64,
    /// Extra ball travel, in `[0, 2π)`
    correction: f64,
    progress: Progress,
}

impl RouletteTimeline {
    /// Plan a spin from `from` that ends on `pocket`. `unit` picks the
    /// initial wheel speed and has no say in the result.
    pub fn new(pocket: Pocket, config: &RouletteConfig, from: &RoulettePose, unit: f64) -> Self {
        let initial_speed = config.min_initial_speed
            + (config.max_initial_speed - config.min_initial_speed) * unit.clamp(0.0, 1.0);
        let damping = config.speed_damping;

        let steps = if initial_speed > config.stop_speed {
            ((config.stop_speed / initial_speed).ln() / damping.ln()).ceil().max(1.0)
        } else {
            1.0
        };
        let total_travel = travel(initial_speed, damping, steps);

        let wheel_start = from.wheel_rotation;
        let ball_start = from.ball_angle;
        let natural_offset =
            ball_start + config.ball_speed_ratio * total_travel - (wheel_start + total_travel);
        let correction = wrap_angle(pocket.center_angle() - natural_offset);

        log::trace!(
            "Roulette spin planned: pocket {} speed {:.3} steps {} correction {:.3}",
            pocket,
            initial_speed,
            steps,
            correction
        );

        Self {
            pocket,
            wheel_start,
            ball_start,
            initial_speed,
            damping,
            radius_damping: config.radius_damping,
            ball_start_radius: config.ball_start_radius,
            ball_speed_ratio: config.ball_speed_ratio,
            tick_rate: config.tick_rate_hz,
            steps,
            total_travel,
            correction,
            progress: Progress::new(steps / config.tick_rate_hz),
        }
    }

    pub fn pocket(&self) -> Pocket {
        self.pocket
    }

    pub fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    /// Total simulation steps in this spin
    pub fn steps(&self) -> u64 {
        self.steps as u64
    }

    fn step_at(&self) -> f64 {
        if self.progress.is_complete() {
            self.steps
        } else {
            (self.progress.elapsed() * self.tick_rate).min(self.steps)
        }
    }
}

/// Accumulated rotation after `k` damped steps
fn travel(initial_speed: f64, damping: f64, k: f64) -> f64 {
    initial_speed * (1.0 - damping.powf(k)) / (1.0 - damping)
}

impl Timeline for RouletteTimeline {
    type Pose = RoulettePose;

    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn pose(&self) -> RoulettePose {
        let k = self.step_at();
        let wheel_travel = if k >= self.steps {
            self.total_travel
        } else {
            travel(self.initial_speed, self.damping, k)
        };
        let share = wheel_travel / self.total_travel;

        RoulettePose {
            wheel_rotation: self.wheel_start + wheel_travel,
            ball_angle: self.ball_start
                + self.ball_speed_ratio * wheel_travel
                + self.correction * share,
            ball_radius: self.ball_start_radius * self.radius_damping.powf(k),
            speed: if k >= self.steps {
                0.0
            } else {
                self.initial_speed * self.damping.powf(k)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest() -> RoulettePose {
        RoulettePose::rest(&RouletteConfig::default(), 12.5)
    }

    #[test]
    fn test_terminal_pose_matches_every_pocket() {
        let config = RouletteConfig::default();
        for pocket in Pocket::all() {
            for unit in [0.0, 0.37, 0.999] {
                let mut timeline = RouletteTimeline::new(pocket, &config, &rest(), unit);
                timeline.finish();
                assert_eq!(landed_number(&timeline.pose()), pocket);
            }
        }
    }

    #[test]
    fn test_frame_stepping_reaches_same_pocket() {
        let config = RouletteConfig::default();
        let pocket = Pocket::new(17).unwrap();
        let mut timeline = RouletteTimeline::new(pocket, &config, &rest(), 0.5);

        let mut frames = 0;
        while !timeline.advance(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 10_000, "spin never terminated");
        }
        assert_eq!(landed_number(&timeline.pose()), pocket);
    }

    #[test]
    fn test_speed_only_decreases() {
        let config = RouletteConfig::default();
        let mut timeline = RouletteTimeline::new(Pocket::ZERO, &config, &rest(), 0.8);
        let mut last = timeline.pose().speed;
        while !timeline.advance(1.0 / 30.0) {
            let speed = timeline.pose().speed;
            assert!(speed <= last);
            last = speed;
        }
        assert_eq!(timeline.pose().speed, 0.0);
    }

    #[test]
    fn test_duration_matches_closed_form() {
        let config = RouletteConfig::default();
        let timeline = RouletteTimeline::new(Pocket::ZERO, &config, &rest(), 0.0);
        // 0.2 * 0.99^k < 0.001 first holds at k = 528
        assert_eq!(timeline.steps(), 528);
        assert!((timeline.duration() - 528.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_restart_replays_same_spin() {
        let config = RouletteConfig::default();
        let mut timeline = RouletteTimeline::new(Pocket::new(5).unwrap(), &config, &rest(), 0.2);
        timeline.advance(2.0);
        let mid = timeline.pose();
        timeline.restart();
        assert_eq!(timeline.elapsed(), 0.0);
        timeline.advance(2.0);
        assert_eq!(timeline.pose(), mid);
    }
}
