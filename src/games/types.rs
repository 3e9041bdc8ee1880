use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::games::wheel::Pocket;

/// Supported mini-games
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Roulette,
    CoinFlip,
    Slots,
}

impl GameType {
    pub const ALL: [GameType; 3] = [GameType::Roulette, GameType::CoinFlip, GameType::Slots];
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Roulette => write!(f, "roulette"),
            GameType::CoinFlip => write!(f, "coinflip"),
            GameType::Slots => write!(f, "slots"),
        }
    }
}

/// Phase of a round.
///
/// Roulette and slots walk `Idle -> Committed -> Resolving -> Settled`; the
/// coin flip collapses the two middle phases into `Flipping`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    Idle,
    /// Outcome drawn, presentation not yet advanced
    Committed,
    /// Presentation running towards the drawn outcome
    Resolving,
    Flipping,
    Settled,
}

impl RoundState {
    /// True while an outcome is fixed but not yet paid out
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            RoundState::Committed | RoundState::Resolving | RoundState::Flipping
        )
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundState::Idle => "idle",
            RoundState::Committed => "committed",
            RoundState::Resolving => "resolving",
            RoundState::Flipping => "flipping",
            RoundState::Settled => "settled",
        };
        f.write_str(name)
    }
}

/// Coin faces, named as printed on the coin
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoinFace {
    Testa,
    Croce,
}

impl CoinFace {
    pub const ALL: [CoinFace; 2] = [CoinFace::Testa, CoinFace::Croce];

    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            CoinFace::Testa
        } else {
            CoinFace::Croce
        }
    }

    pub fn index(self) -> usize {
        match self {
            CoinFace::Testa => 0,
            CoinFace::Croce => 1,
        }
    }
}

impl fmt::Display for CoinFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinFace::Testa => write!(f, "TESTA"),
            CoinFace::Croce => write!(f, "CROCE"),
        }
    }
}

/// Fruit symbols printed on the slot reels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Grape,
    Orange,
    Watermelon,
}

impl SlotSymbol {
    pub const ALL: [SlotSymbol; 5] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Grape,
        SlotSymbol::Orange,
        SlotSymbol::Watermelon,
    ];

    pub const COUNT: usize = 5;

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn glyph(self) -> &'static str {
        match self {
            SlotSymbol::Cherry => "🍒",
            SlotSymbol::Lemon => "🍋",
            SlotSymbol::Grape => "🍇",
            SlotSymbol::Orange => "🍊",
            SlotSymbol::Watermelon => "🍉",
        }
    }
}

impl fmt::Display for SlotSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// The symbols showing on the pay line once the reels stop
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReelStops(pub Vec<SlotSymbol>);

impl ReelStops {
    pub fn symbols(&self) -> &[SlotSymbol] {
        &self.0
    }

    /// Size of the largest group of equal symbols
    pub fn longest_match(&self) -> usize {
        SlotSymbol::ALL
            .iter()
            .map(|s| self.0.iter().filter(|r| *r == s).count())
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for ReelStops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// Slot bets always ride the single centre line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PayLine {
    Center,
}

impl fmt::Display for PayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("center")
    }
}

/// Authoritative result of a settled round, across all games
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Outcome {
    Pocket(Pocket),
    Face(CoinFace),
    Reels(ReelStops),
}

impl From<Pocket> for Outcome {
    fn from(pocket: Pocket) -> Self {
        Outcome::Pocket(pocket)
    }
}

impl From<CoinFace> for Outcome {
    fn from(face: CoinFace) -> Self {
        Outcome::Face(face)
    }
}

impl From<ReelStops> for Outcome {
    fn from(stops: ReelStops) -> Self {
        Outcome::Reels(stops)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pocket(p) => write!(f, "{}", p),
            Outcome::Face(face) => write!(f, "{}", face),
            Outcome::Reels(stops) => write!(f, "{}", stops),
        }
    }
}

/// Win/loss classification of a settled round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Win,
    Loss,
    /// Settled with an empty bet book; nothing credited, nothing announced
    NoBet,
}

/// Colour class of a result message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayColor {
    Positive,
    Negative,
    Neutral,
}

impl DisplayColor {
    pub fn hex(self) -> &'static str {
        match self {
            DisplayColor::Positive => "#00ff00",
            DisplayColor::Negative => "#ff0000",
            DisplayColor::Neutral => "#ffffff",
        }
    }
}

/// Win/lose banner published on settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMessage {
    pub text: String,
    pub color: DisplayColor,
}

impl RoundMessage {
    pub fn win(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: DisplayColor::Positive,
        }
    }

    pub fn loss(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: DisplayColor::Negative,
        }
    }
}

/// Ledger entry written once per settled round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub round_id: Uuid,
    pub game: GameType,
    pub outcome: Outcome,
    pub total_staked: u64,
    pub credited: u64,
    pub verdict: Verdict,
    pub settled_at: DateTime<Utc>,
}
