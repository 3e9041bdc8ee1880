//! Coin flip: call TESTA or CROCE, pick a stake tier, flip.

use log::debug;

use crate::animation::{CoinPose, CoinTimeline};
use crate::config::CoinFlipConfig;
use crate::errors::{RoundError, StartRejection};
use crate::games::outcome::{draw_face, OutcomeSource};
use crate::games::payout::{Payout, PayoutRule};
use crate::games::round::{GameRules, Round};
use crate::games::types::{CoinFace, GameType, Outcome, RoundMessage, RoundState, SettlementRecord, Verdict};
use crate::wallet::Wallet;

#[derive(Debug, Clone)]
pub struct CoinFlipRules {
    config: CoinFlipConfig,
}

impl CoinFlipRules {
    pub fn new(config: CoinFlipConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoinFlipConfig {
        &self.config
    }
}

impl PayoutRule for CoinFlipRules {
    type Target = CoinFace;
    type Outcome = CoinFace;

    fn multiplier(&self, target: &CoinFace, outcome: &CoinFace) -> u64 {
        if target == outcome {
            self.config.win_multiplier
        } else {
            0
        }
    }

    fn max_multiplier(&self) -> u64 {
        self.config.win_multiplier
    }
}

impl GameRules for CoinFlipRules {
    type Pose = CoinPose;
    type Timeline = CoinTimeline;

    const GAME: GameType = GameType::CoinFlip;
    const IN_FLIGHT: RoundState = RoundState::Flipping;

    fn draw(&self, source: &mut dyn OutcomeSource) -> CoinFace {
        draw_face(source)
    }

    fn timeline(
        &self,
        outcome: &CoinFace,
        _from: &CoinPose,
        source: &mut dyn OutcomeSource,
    ) -> CoinTimeline {
        CoinTimeline::new(*outcome, &self.config, source.unit())
    }

    fn rest_pose(&self, clock: f64) -> CoinPose {
        CoinPose::rest(&self.config, clock)
    }

    fn record(&self, outcome: &CoinFace) -> Outcome {
        Outcome::Face(*outcome)
    }

    fn message(&self, payout: &Payout<CoinFace>) -> Option<RoundMessage> {
        match payout.verdict() {
            Verdict::Win => Some(RoundMessage::win("VINTO!")),
            Verdict::Loss => Some(RoundMessage::loss("PERSO!")),
            Verdict::NoBet => None,
        }
    }
}

/// Coin flip table. The selected face and stake only matter at flip time,
/// when they are copied into the round's bet book as its single entry.
pub struct CoinFlip {
    round: Round<CoinFlipRules>,
    choice: Option<CoinFace>,
    stake: u64,
}

impl CoinFlip {
    pub fn new(config: CoinFlipConfig) -> Self {
        let stake = config.stake_tiers.first().copied().unwrap_or(0);
        Self {
            round: Round::new(CoinFlipRules::new(config)),
            choice: None,
            stake,
        }
    }

    pub fn choice(&self) -> Option<CoinFace> {
        self.choice
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn stake_tiers(&self) -> &[u64] {
        &self.round.rules().config().stake_tiers
    }

    pub fn choose_face(&mut self, face: CoinFace) {
        debug!("Coin flip: {} selected", face);
        self.choice = Some(face);
    }

    /// Select one of the configured stake tiers
    pub fn choose_stake(&mut self, stake: u64) -> Result<(), RoundError> {
        if !self.stake_tiers().contains(&stake) {
            return Err(RoundError::InvalidStake {
                stake,
                allowed: format!("{:?}", self.stake_tiers()),
            });
        }
        self.stake = stake;
        Ok(())
    }

    /// Debit the selected stake on the selected face and start the toss
    pub fn flip(&mut self, wallet: &mut Wallet, source: &mut dyn OutcomeSource) -> Result<(), RoundError> {
        if self.round.state().is_in_flight() {
            return Err(RoundError::InvalidRoundStart(StartRejection::AlreadyInProgress));
        }
        let face = self
            .choice
            .ok_or(RoundError::InvalidRoundStart(StartRejection::NoChoice))?;

        self.round.place_bet(wallet, face, self.stake)?;
        self.round.start(source)
    }

    pub fn tick(&mut self, wallet: &mut Wallet, dt: f64) -> Option<SettlementRecord> {
        self.round.tick(wallet, dt)
    }

    pub fn round(&self) -> &Round<CoinFlipRules> {
        &self.round
    }

    pub fn round_mut(&mut self) -> &mut Round<CoinFlipRules> {
        &mut self.round
    }
}
