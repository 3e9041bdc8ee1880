//! Single-zero roulette wheel layout.
//!
//! `WHEEL_ORDER` and the colour rule are the only source of truth for both
//! the wheel decoration and bet resolution.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

pub const POCKET_COUNT: usize = 37;

/// Angular width of one pocket (radians)
pub const POCKET_ANGLE: f64 = TAU / POCKET_COUNT as f64;

/// Numbers in the order they appear around the wheel
pub const WHEEL_ORDER: [u8; POCKET_COUNT] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Black,
    Red,
}

impl PocketColor {
    pub fn hex(self) -> &'static str {
        match self {
            PocketColor::Green => "#00ff00",
            PocketColor::Black => "#000000",
            PocketColor::Red => "#ff0000",
        }
    }
}

/// A wheel number, 0 through 36
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pocket(u8);

impl Pocket {
    pub const ZERO: Pocket = Pocket(0);

    pub fn new(number: u8) -> Option<Self> {
        if (number as usize) < POCKET_COUNT {
            Some(Pocket(number))
        } else {
            None
        }
    }

    /// Pocket at `index` positions clockwise from zero
    pub fn from_wheel_index(index: usize) -> Self {
        Pocket(WHEEL_ORDER[index % POCKET_COUNT])
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Position of this number around the wheel
    pub fn wheel_index(self) -> usize {
        WHEEL_ORDER
            .iter()
            .position(|n| *n == self.0)
            .unwrap_or(0)
    }

    /// Zero is green; otherwise even numbers are black and odd numbers red
    pub fn color(self) -> PocketColor {
        if self.0 == 0 {
            PocketColor::Green
        } else if self.0 % 2 == 0 {
            PocketColor::Black
        } else {
            PocketColor::Red
        }
    }

    /// Angle of the pocket centre, relative to the wheel
    pub fn center_angle(self) -> f64 {
        (self.wheel_index() as f64 + 0.5) * POCKET_ANGLE
    }

    pub fn all() -> impl Iterator<Item = Pocket> {
        WHEEL_ORDER.iter().map(|n| Pocket(*n))
    }
}

impl TryFrom<u8> for Pocket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Pocket::new(value).ok_or_else(|| format!("{} is not on the wheel", value))
    }
}

impl From<Pocket> for u8 {
    fn from(pocket: Pocket) -> u8 {
        pocket.0
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalise an angle into `[0, 2π)`
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Pocket under a ball sitting at `relative_angle` from the wheel's zero mark
pub fn pocket_at(relative_angle: f64) -> Pocket {
    let index = (wrap_angle(relative_angle) / POCKET_ANGLE).floor() as usize;
    Pocket::from_wheel_index(index.min(POCKET_COUNT - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wheel_order_is_a_permutation() {
        let unique: HashSet<u8> = WHEEL_ORDER.iter().copied().collect();
        assert_eq!(unique.len(), POCKET_COUNT);
        assert!(WHEEL_ORDER.iter().all(|n| *n <= 36));
    }

    #[test]
    fn test_color_rule() {
        assert_eq!(Pocket::ZERO.color(), PocketColor::Green);
        assert_eq!(Pocket::new(17).unwrap().color(), PocketColor::Red);
        assert_eq!(Pocket::new(36).unwrap().color(), PocketColor::Black);

        let greens = Pocket::all().filter(|p| p.color() == PocketColor::Green).count();
        let reds = Pocket::all().filter(|p| p.color() == PocketColor::Red).count();
        assert_eq!(greens, 1);
        assert_eq!(reds, 18);
    }

    #[test]
    fn test_out_of_range_number() {
        assert!(Pocket::new(37).is_none());
        assert!(serde_json::from_str::<Pocket>("40").is_err());
        assert_eq!(serde_json::from_str::<Pocket>("17").unwrap().number(), 17);
    }

    #[test]
    fn test_pocket_at_centre_angles() {
        for pocket in Pocket::all() {
            assert_eq!(pocket_at(pocket.center_angle()), pocket);
            assert_eq!(pocket_at(pocket.center_angle() + 5.0 * TAU), pocket);
            assert_eq!(pocket_at(pocket.center_angle() - 3.0 * TAU), pocket);
        }
    }

    #[test]
    fn test_wheel_index_round_trip() {
        for index in 0..POCKET_COUNT {
            assert_eq!(Pocket::from_wheel_index(index).wheel_index(), index);
        }
        assert_eq!(Pocket::new(17).unwrap().wheel_index(), 8);
    }
}
