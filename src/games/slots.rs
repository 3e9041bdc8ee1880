//! Fruit slot machine: fixed cost per pull, one pay line.

use crate::animation::{ReelsPose, ReelsTimeline};
use crate::config::SlotsConfig;
use crate::errors::{RoundError, StartRejection};
use crate::games::outcome::{draw_reels, OutcomeSource};
use crate::games::payout::{Payout, PayoutRule};
use crate::games::round::{GameRules, Round};
use crate::games::types::{
    GameType, Outcome, PayLine, ReelStops, RoundMessage, RoundState, SettlementRecord, Verdict,
};
use crate::wallet::Wallet;

#[derive(Debug, Clone)]
pub struct SlotRules {
    config: SlotsConfig,
}

impl SlotRules {
    pub fn new(config: SlotsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SlotsConfig {
        &self.config
    }
}

impl PayoutRule for SlotRules {
    type Target = PayLine;
    type Outcome = ReelStops;

    fn multiplier(&self, _target: &PayLine, outcome: &ReelStops) -> u64 {
        let reels = outcome.symbols().len();
        match outcome.longest_match() {
            n if reels > 0 && n == reels => self.config.triple_multiplier,
            2 => self.config.pair_multiplier,
            _ => 0,
        }
    }

    fn max_multiplier(&self) -> u64 {
        self.config.triple_multiplier.max(self.config.pair_multiplier)
    }
}

impl GameRules for SlotRules {
    type Pose = ReelsPose;
    type Timeline = ReelsTimeline;

    const GAME: GameType = GameType::Slots;
    const IN_FLIGHT: RoundState = RoundState::Committed;

    fn draw(&self, source: &mut dyn OutcomeSource) -> ReelStops {
        draw_reels(source, self.config.reel_count)
    }

    fn timeline(
        &self,
        outcome: &ReelStops,
        from: &ReelsPose,
        _source: &mut dyn OutcomeSource,
    ) -> ReelsTimeline {
        ReelsTimeline::new(outcome.clone(), &self.config, from)
    }

    fn rest_pose(&self, _clock: f64) -> ReelsPose {
        ReelsPose::rest(&self.config)
    }

    fn record(&self, outcome: &ReelStops) -> Outcome {
        Outcome::Reels(outcome.clone())
    }

    fn message(&self, payout: &Payout<PayLine>) -> Option<RoundMessage> {
        match payout.verdict() {
            Verdict::Win => Some(RoundMessage::win(format!("JACKPOT! +{} coins", payout.credit))),
            Verdict::Loss => Some(RoundMessage::loss("NO LUCK!")),
            Verdict::NoBet => None,
        }
    }
}

pub struct SlotMachine {
    round: Round<SlotRules>,
}

impl SlotMachine {
    pub fn new(config: SlotsConfig) -> Self {
        Self {
            round: Round::new(SlotRules::new(config)),
        }
    }

    pub fn spin_cost(&self) -> u64 {
        self.round.rules().config().spin_cost
    }

    /// Pay the spin cost and set the reels going
    pub fn spin(&mut self, wallet: &mut Wallet, source: &mut dyn OutcomeSource) -> Result<(), RoundError> {
        if self.round.state().is_in_flight() {
            return Err(RoundError::InvalidRoundStart(StartRejection::AlreadyInProgress));
        }
        let cost = self.spin_cost();
        self.round.place_bet(wallet, PayLine::Center, cost)?;
        self.round.start(source)
    }

    pub fn tick(&mut self, wallet: &mut Wallet, dt: f64) -> Option<SettlementRecord> {
        self.round.tick(wallet, dt)
    }

    pub fn round(&self) -> &Round<SlotRules> {
        &self.round
    }

    pub fn round_mut(&mut self) -> &mut Round<SlotRules> {
        &mut self.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::landed_symbols;
    use crate::games::outcome::ScriptedSource;
    use crate::games::types::SlotSymbol;

    fn forced(symbols: &[SlotSymbol]) -> ScriptedSource {
        let mut source = ScriptedSource::new([]);
        source.push_reels(symbols);
        source
    }

    #[test]
    fn test_triple_pays() {
        let mut wallet = Wallet::new(100);
        let mut machine = SlotMachine::new(SlotsConfig::default());

        machine
            .spin(&mut wallet, &mut forced(&[SlotSymbol::Orange; 3]))
            .unwrap();
        assert_eq!(wallet.balance(), 95);

        let record = machine.round_mut().skip_presentation(&mut wallet).unwrap();
        assert_eq!(record.credited, 50);
        assert_eq!(wallet.balance(), 145);
        assert_eq!(
            landed_symbols(&machine.round().pose()),
            ReelStops(vec![SlotSymbol::Orange; 3])
        );
    }

    #[test]
    fn test_pair_and_miss() {
        let rules = SlotRules::new(SlotsConfig::default());
        let pair = ReelStops(vec![SlotSymbol::Lemon, SlotSymbol::Lemon, SlotSymbol::Grape]);
        let miss = ReelStops(vec![SlotSymbol::Lemon, SlotSymbol::Cherry, SlotSymbol::Grape]);
        assert_eq!(rules.multiplier(&PayLine::Center, &pair), 0);
        assert_eq!(rules.multiplier(&PayLine::Center, &miss), 0);

        let generous = SlotRules::new(SlotsConfig {
            pair_multiplier: 2,
            ..SlotsConfig::default()
        });
        assert_eq!(generous.multiplier(&PayLine::Center, &pair), 2);
    }

    #[test]
    fn test_spin_needs_coins() {
        let mut wallet = Wallet::new(4);
        let mut machine = SlotMachine::new(SlotsConfig::default());
        let err = machine
            .spin(&mut wallet, &mut forced(&[SlotSymbol::Cherry; 3]))
            .unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(wallet.balance(), 4);
    }

    #[test]
    fn test_loss_banner() {
        let mut wallet = Wallet::new(100);
        let mut machine = SlotMachine::new(SlotsConfig::default());
        machine
            .spin(
                &mut wallet,
                &mut forced(&[SlotSymbol::Cherry, SlotSymbol::Lemon, SlotSymbol::Grape]),
            )
            .unwrap();

        let mut settled = None;
        for _ in 0..1000 {
            settled = machine.tick(&mut wallet, 1.0 / 60.0);
            if settled.is_some() {
                break;
            }
        }
        assert_eq!(settled.unwrap().verdict, Verdict::Loss);
        assert_eq!(machine.round().message().unwrap().text, "NO LUCK!");
        assert_eq!(wallet.balance(), 95);
    }
}
