//! Session façade: one wallet, one table per game, one randomness source.
//!
//! The presentation layer talks to the engine through [`Casino::handle`] for
//! player input, [`Casino::tick`] once per frame and [`Casino::snapshot`] to
//! read what to draw.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::CasinoConfig;
use crate::errors::{CasinoError, CasinoResult, RoundError};
use crate::games::coin_flip::CoinFlip;
use crate::games::outcome::{OutcomeSource, RngSource};
use crate::games::round::RoundSnapshot;
use crate::games::roulette::Roulette;
use crate::games::slots::SlotMachine;
use crate::games::types::{CoinFace, GameType, SettlementRecord};
use crate::wallet::Wallet;

/// Player input events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Input {
    PlaceBet { number: u8, stake: u64 },
    /// One chip of the configured value
    PlaceChip { number: u8 },
    Spin,
    ChooseFace { face: CoinFace },
    ChooseStake { stake: u64 },
    Flip,
    SpinReels,
    CloseView { game: GameType },
    OpenView { game: GameType },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinFlipSnapshot {
    #[serde(flatten)]
    pub round: RoundSnapshot,
    pub choice: Option<CoinFace>,
    pub stake: u64,
}

/// Everything the presentation layer needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CasinoSnapshot {
    pub balance: u64,
    pub roulette: RoundSnapshot,
    pub coin_flip: CoinFlipSnapshot,
    pub slots: RoundSnapshot,
    pub rounds_settled: u64,
}

/// Result of [`Casino::audit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub starting_balance: u64,
    pub balance: u64,
    /// Lifetime stakes on settled rounds
    pub settled_stakes: u64,
    /// Stakes sitting on tables whose round has not settled yet
    pub open_stakes: u64,
    pub credited: u64,
    /// `starting - settled - open + credited`
    pub expected_balance: u64,
    pub consistent: bool,
}

pub struct Casino {
    config: CasinoConfig,
    wallet: Wallet,
    source: Box<dyn OutcomeSource>,
    roulette: Roulette,
    coin_flip: CoinFlip,
    slots: SlotMachine,
    history: VecDeque<SettlementRecord>,
    rounds_settled: u64,
    settled_stakes: u64,
    settled_credits: u64,
}

impl Casino {
    /// Session seeded from `config.session.seed`, or from entropy
    pub fn new(config: CasinoConfig) -> CasinoResult<Self> {
        let source: Box<dyn OutcomeSource> = match config.session.seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };
        Self::with_source(config, source)
    }

    pub fn with_source(config: CasinoConfig, source: Box<dyn OutcomeSource>) -> CasinoResult<Self> {
        crate::config::validate(&config)?;

        info!(
            "Opening casino session: {} coins, {} source",
            config.wallet.starting_balance,
            source.name()
        );

        Ok(Self {
            wallet: Wallet::new(config.wallet.starting_balance),
            roulette: Roulette::new(config.roulette.clone()),
            coin_flip: CoinFlip::new(config.coin_flip.clone()),
            slots: SlotMachine::new(config.slots.clone()),
            history: VecDeque::with_capacity(config.session.history_limit),
            rounds_settled: 0,
            settled_stakes: 0,
            settled_credits: 0,
            source,
            config,
        })
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.config
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn roulette(&self) -> &Roulette {
        &self.roulette
    }

    pub fn coin_flip(&self) -> &CoinFlip {
        &self.coin_flip
    }

    pub fn slots(&self) -> &SlotMachine {
        &self.slots
    }

    /// Most recent settlements, oldest first
    pub fn history(&self) -> impl Iterator<Item = &SettlementRecord> {
        self.history.iter()
    }

    pub fn rounds_settled(&self) -> u64 {
        self.rounds_settled
    }

    pub fn place_bet(&mut self, number: u8, stake: u64) -> Result<(), RoundError> {
        self.roulette.place_bet(&mut self.wallet, number, stake)
    }

    pub fn place_chip(&mut self, number: u8) -> Result<(), RoundError> {
        self.roulette.place_chip(&mut self.wallet, number)
    }

    pub fn spin(&mut self) -> Result<(), RoundError> {
        self.roulette.spin(self.source.as_mut())
    }

    pub fn choose_face(&mut self, face: CoinFace) {
        self.coin_flip.choose_face(face)
    }

    pub fn choose_stake(&mut self, stake: u64) -> Result<(), RoundError> {
        self.coin_flip.choose_stake(stake)
    }

    pub fn flip(&mut self) -> Result<(), RoundError> {
        self.coin_flip.flip(&mut self.wallet, self.source.as_mut())
    }

    pub fn spin_reels(&mut self) -> Result<(), RoundError> {
        self.slots.spin(&mut self.wallet, self.source.as_mut())
    }

    pub fn close_view(&mut self, game: GameType) {
        match game {
            GameType::Roulette => self.roulette.round_mut().suspend(),
            GameType::CoinFlip => self.coin_flip.round_mut().suspend(),
            GameType::Slots => self.slots.round_mut().suspend(),
        }
    }

    pub fn open_view(&mut self, game: GameType) {
        match game {
            GameType::Roulette => self.roulette.round_mut().resume(),
            GameType::CoinFlip => self.coin_flip.round_mut().resume(),
            GameType::Slots => self.slots.round_mut().resume(),
        }
    }

    /// Apply one input. Rejected actions change nothing and are logged;
    /// returns whether the input took effect.
    pub fn handle(&mut self, input: Input) -> bool {
        let result = match input {
            Input::PlaceBet { number, stake } => self.place_bet(number, stake),
            Input::PlaceChip { number } => self.place_chip(number),
            Input::Spin => self.spin(),
            Input::ChooseFace { face } => {
                self.choose_face(face);
                Ok(())
            }
            Input::ChooseStake { stake } => self.choose_stake(stake),
            Input::Flip => self.flip(),
            Input::SpinReels => self.spin_reels(),
            Input::CloseView { game } => {
                self.close_view(game);
                Ok(())
            }
            Input::OpenView { game } => {
                self.open_view(game);
                Ok(())
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignored {:?}: {}", input, e);
                false
            }
        }
    }

    /// Advance every table by `dt` seconds. Returns the rounds that settled.
    pub fn tick(&mut self, dt: f64) -> Vec<SettlementRecord> {
        let settled: Vec<SettlementRecord> = [
            self.roulette.tick(&mut self.wallet, dt),
            self.coin_flip.tick(&mut self.wallet, dt),
            self.slots.tick(&mut self.wallet, dt),
        ]
        .into_iter()
        .flatten()
        .collect();

        for record in &settled {
            self.record(record.clone());
        }
        settled
    }

    /// Finish every running presentation whose view is open and settle
    pub fn skip_presentations(&mut self) -> Vec<SettlementRecord> {
        let settled: Vec<SettlementRecord> = [
            self.roulette.round_mut().skip_presentation(&mut self.wallet),
            self.coin_flip.round_mut().skip_presentation(&mut self.wallet),
            self.slots.round_mut().skip_presentation(&mut self.wallet),
        ]
        .into_iter()
        .flatten()
        .collect();

        for record in &settled {
            self.record(record.clone());
        }
        settled
    }

    fn record(&mut self, record: SettlementRecord) {
        self.rounds_settled += 1;
        self.settled_stakes = self.settled_stakes.saturating_add(record.total_staked);
        self.settled_credits = self.settled_credits.saturating_add(record.credited);

        let limit = self.config.session.history_limit;
        if limit == 0 {
            return;
        }
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    pub fn snapshot(&self) -> CasinoSnapshot {
        CasinoSnapshot {
            balance: self.wallet.balance(),
            roulette: self.roulette.round().snapshot(),
            coin_flip: CoinFlipSnapshot {
                round: self.coin_flip.round().snapshot(),
                choice: self.coin_flip.choice(),
                stake: self.coin_flip.stake(),
            },
            slots: self.slots.round().snapshot(),
            rounds_settled: self.rounds_settled,
        }
    }

    pub fn snapshot_json(&self) -> CasinoResult<String> {
        serde_json::to_string(&self.snapshot())
            .map_err(|e| CasinoError::Serialization(e.to_string()))
    }

    /// True while any table has an outcome waiting to be revealed
    pub fn has_round_in_flight(&self) -> bool {
        self.roulette.round().state().is_in_flight()
            || self.coin_flip.round().state().is_in_flight()
            || self.slots.round().state().is_in_flight()
    }

    /// Check coin conservation across the whole session
    pub fn audit(&self) -> AuditReport {
        let open_stakes = [
            self.roulette.round().book().total_staked(),
            self.coin_flip.round().book().total_staked(),
            self.slots.round().book().total_staked(),
        ]
        .into_iter()
        .try_fold(0u64, u64::checked_add);
        let debited = open_stakes.and_then(|open| open.checked_add(self.settled_stakes));

        // Any overflow along the way reports the session as inconsistent
        let starting = self.wallet.starting_balance();
        let expected = starting
            .checked_add(self.settled_credits)
            .zip(debited)
            .and_then(|(gross, debited)| gross.checked_sub(debited));

        let consistent = expected == Some(self.wallet.balance())
            && self.wallet.is_conserved()
            && debited == Some(self.wallet.total_debited())
            && self.wallet.total_credited() == self.settled_credits;

        AuditReport {
            starting_balance: starting,
            balance: self.wallet.balance(),
            settled_stakes: self.settled_stakes,
            open_stakes: open_stakes.unwrap_or(u64::MAX),
            credited: self.settled_credits,
            expected_balance: expected.unwrap_or(0),
            consistent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::outcome::ScriptedSource;
    use crate::games::types::RoundState;
    use crate::games::wheel::Pocket;

    fn casino(source: ScriptedSource) -> Casino {
        Casino::with_source(CasinoConfig::default(), Box::new(source)).unwrap()
    }

    #[test]
    fn test_handle_reports_rejections() {
        let mut casino = casino(ScriptedSource::new([]));
        assert!(!casino.handle(Input::Spin));
        assert!(!casino.handle(Input::Flip));
        assert!(!casino.handle(Input::PlaceBet { number: 40, stake: 3 }));
        assert!(casino.handle(Input::PlaceChip { number: 7 }));
        assert_eq!(casino.balance(), 97);
    }

    #[test]
    fn test_games_share_the_wallet() {
        let mut source = ScriptedSource::new([]);
        source.push_pocket(Pocket::new(7).unwrap());
        source.push_face(CoinFace::Testa);
        let mut casino = casino(source);

        casino.handle(Input::PlaceChip { number: 7 });
        casino.handle(Input::Spin);
        casino.handle(Input::ChooseFace { face: CoinFace::Testa });
        casino.handle(Input::Flip);
        assert_eq!(casino.balance(), 87);

        let settled = casino.skip_presentations();
        assert_eq!(settled.len(), 2);
        assert_eq!(casino.balance(), 87 + 108 + 20);
        assert!(casino.audit().consistent);
    }

    #[test]
    fn test_snapshot_hides_outcome_until_settled() {
        let mut source = ScriptedSource::new([]);
        source.push_pocket(Pocket::new(7).unwrap());
        let mut casino = casino(source);
        casino.handle(Input::PlaceChip { number: 7 });
        casino.handle(Input::Spin);
        casino.tick(0.1);

        let snapshot = casino.snapshot();
        assert_eq!(snapshot.roulette.state, RoundState::Resolving);
        assert!(snapshot.roulette.outcome.is_none());

        casino.skip_presentations();
        let json = casino.snapshot_json().unwrap();
        assert!(json.contains("WIN! +108 coins"));
        assert!(json.contains("\"balance\":205"));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut config = CasinoConfig::default();
        config.session.history_limit = 2;
        config.wallet.starting_balance = 1000;
        let mut casino = Casino::with_source(config, Box::new(ScriptedSource::new([]))).unwrap();

        for _ in 0..5 {
            assert!(casino.handle(Input::SpinReels));
            casino.skip_presentations();
        }
        assert_eq!(casino.history().count(), 2);
        assert_eq!(casino.rounds_settled(), 5);
        assert!(casino.audit().consistent);
    }

    #[test]
    fn test_input_json_shape() {
        let input: Input = serde_json::from_str(r#"{"action":"place_bet","number":17,"stake":3}"#).unwrap();
        assert_eq!(input, Input::PlaceBet { number: 17, stake: 3 });
        let input: Input = serde_json::from_str(r#"{"action":"choose_face","face":"CROCE"}"#).unwrap();
        assert_eq!(input, Input::ChooseFace { face: CoinFace::Croce });
    }
}
