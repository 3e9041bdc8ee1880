//! Single-zero roulette with straight-up bets.

use crate::animation::{RoulettePose, RouletteTimeline};
use crate::config::RouletteConfig;
use crate::errors::RoundError;
use crate::games::outcome::{draw_pocket, OutcomeSource};
use crate::games::payout::PayoutRule;
use crate::games::round::{GameRules, Round};
use crate::games::types::{GameType, Outcome, RoundState, SettlementRecord};
use crate::games::wheel::Pocket;
use crate::wallet::Wallet;

/// Straight-up payout table and wheel physics
#[derive(Debug, Clone)]
pub struct RouletteRules {
    config: RouletteConfig,
}

impl RouletteRules {
    pub fn new(config: RouletteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouletteConfig {
        &self.config
    }
}

impl PayoutRule for RouletteRules {
    type Target = Pocket;
    type Outcome = Pocket;

    // Exact number match only, so zero is never treated as even
    fn multiplier(&self, target: &Pocket, outcome: &Pocket) -> u64 {
        if target == outcome {
            self.config.straight_up_multiplier
        } else {
            0
        }
    }

    fn max_multiplier(&self) -> u64 {
        self.config.straight_up_multiplier
    }
}

impl GameRules for RouletteRules {
    type Pose = RoulettePose;
    type Timeline = RouletteTimeline;

    const GAME: GameType = GameType::Roulette;
    const IN_FLIGHT: RoundState = RoundState::Committed;

    fn draw(&self, source: &mut dyn OutcomeSource) -> Pocket {
        draw_pocket(source)
    }

    fn timeline(
        &self,
        outcome: &Pocket,
        from: &RoulettePose,
        source: &mut dyn OutcomeSource,
    ) -> RouletteTimeline {
        RouletteTimeline::new(*outcome, &self.config, from, source.unit())
    }

    fn rest_pose(&self, clock: f64) -> RoulettePose {
        RoulettePose::rest(&self.config, clock)
    }

    fn record(&self, outcome: &Pocket) -> Outcome {
        Outcome::Pocket(*outcome)
    }
}

/// Roulette table: chips on numbers, then a spin
pub struct Roulette {
    round: Round<RouletteRules>,
}

impl Roulette {
    pub fn new(config: RouletteConfig) -> Self {
        Self {
            round: Round::new(RouletteRules::new(config)),
        }
    }

    /// Stake `stake` coins straight up on `number`
    pub fn place_bet(&mut self, wallet: &mut Wallet, number: u8, stake: u64) -> Result<(), RoundError> {
        let pocket = Pocket::new(number).ok_or(RoundError::InvalidTarget(number))?;
        self.round.place_bet(wallet, pocket, stake)
    }

    /// One chip click: `chip_value` coins on `number`
    pub fn place_chip(&mut self, wallet: &mut Wallet, number: u8) -> Result<(), RoundError> {
        let chip = self.round.rules().config().chip_value;
        self.place_bet(wallet, number, chip)
    }

    pub fn spin(&mut self, source: &mut dyn OutcomeSource) -> Result<(), RoundError> {
        self.round.start(source)
    }

    pub fn tick(&mut self, wallet: &mut Wallet, dt: f64) -> Option<SettlementRecord> {
        self.round.tick(wallet, dt)
    }

    pub fn round(&self) -> &Round<RouletteRules> {
        &self.round
    }

    pub fn round_mut(&mut self) -> &mut Round<RouletteRules> {
        &mut self.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::landed_number;
    use crate::errors::StartRejection;
    use crate::games::outcome::ScriptedSource;
    use crate::games::types::{DisplayColor, Verdict};

    fn forced(number: u8) -> ScriptedSource {
        let mut source = ScriptedSource::new([]);
        source.push_pocket(Pocket::new(number).unwrap());
        source
    }

    fn run_to_settlement(table: &mut Roulette, wallet: &mut Wallet) -> SettlementRecord {
        for _ in 0..100_000 {
            if let Some(record) = table.tick(wallet, 1.0 / 60.0) {
                return record;
            }
        }
        panic!("round never settled");
    }

    #[test]
    fn test_straight_up_win() {
        let mut wallet = Wallet::new(100);
        let mut table = Roulette::new(RouletteConfig::default());

        table.place_bet(&mut wallet, 17, 3).unwrap();
        assert_eq!(wallet.balance(), 97);

        table.spin(&mut forced(17)).unwrap();
        let record = run_to_settlement(&mut table, &mut wallet);

        assert_eq!(record.credited, 108);
        assert_eq!(record.verdict, Verdict::Win);
        assert_eq!(wallet.balance(), 205);
        assert!(table.round().book().is_empty());

        let message = table.round().message().unwrap();
        assert_eq!(message.text, "WIN! +108 coins");
        assert_eq!(message.color, DisplayColor::Positive);
        assert_eq!(landed_number(&table.round().pose()).number(), 17);
    }

    #[test]
    fn test_loss_message() {
        let mut wallet = Wallet::new(100);
        let mut table = Roulette::new(RouletteConfig::default());

        table.place_chip(&mut wallet, 0).unwrap();
        table.spin(&mut forced(32)).unwrap();
        let record = run_to_settlement(&mut table, &mut wallet);

        assert_eq!(record.credited, 0);
        assert_eq!(wallet.balance(), 97);
        let message = table.round().message().unwrap();
        assert_eq!(message.text, "LOSE!");
        assert_eq!(message.color, DisplayColor::Negative);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut wallet = Wallet::new(100);
        let mut table = Roulette::new(RouletteConfig::default());

        assert_eq!(
            table.place_bet(&mut wallet, 37, 3),
            Err(RoundError::InvalidTarget(37))
        );
        assert_eq!(wallet.balance(), 100);
    }

    #[test]
    fn test_spin_without_bets_rejected() {
        let mut table = Roulette::new(RouletteConfig::default());
        let mut source = forced(5);

        assert_eq!(
            table.spin(&mut source),
            Err(RoundError::InvalidRoundStart(StartRejection::NoBets))
        );
        assert_eq!(table.round().state(), RoundState::Idle);
        assert_eq!(source.picks_served(), 0);
    }

    #[test]
    fn test_bet_after_spin_rejected() {
        let mut wallet = Wallet::new(100);
        let mut table = Roulette::new(RouletteConfig::default());
        table.place_chip(&mut wallet, 4).unwrap();
        table.spin(&mut forced(4)).unwrap();

        let err = table.place_chip(&mut wallet, 5).unwrap_err();
        assert_eq!(
            err,
            RoundError::BettingClosed {
                state: RoundState::Committed
            }
        );
        assert_eq!(wallet.balance(), 97);
        assert_eq!(table.round().book().total_staked(), 3);
    }

    #[test]
    fn test_multiple_numbers_one_winner() {
        let mut wallet = Wallet::new(100);
        let mut table = Roulette::new(RouletteConfig::default());
        for number in [1, 2, 3, 17] {
            table.place_chip(&mut wallet, number).unwrap();
        }
        assert_eq!(wallet.balance(), 88);

        table.spin(&mut forced(2)).unwrap();
        run_to_settlement(&mut table, &mut wallet);
        assert_eq!(wallet.balance(), 88 + 108);
    }
}
