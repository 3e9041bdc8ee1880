//! Round state machine shared by every mini-game.
//!
//! A round draws its outcome once, at the start action, and builds the
//! timeline that will reveal it. Ticks only move the timeline; settlement
//! runs when the timeline reports completion and is the only place coins are
//! credited.

use log::{debug, info, trace, warn};
use serde::Serialize;
use std::fmt::Debug;
use uuid::Uuid;

use crate::animation::{Pose, Timeline};
use crate::errors::{RoundError, StartRejection};
use crate::games::bet_book::BetBook;
use crate::games::outcome::OutcomeSource;
use crate::games::payout::{resolve, Payout, PayoutRule};
use crate::games::types::{GameType, Outcome, RoundMessage, RoundState, SettlementRecord, Verdict};
use crate::wallet::Wallet;

/// What a game plugs into [`Round`]
pub trait GameRules: PayoutRule {
    type Pose: Clone + Debug + Into<Pose>;
    type Timeline: Timeline<Pose = Self::Pose>;

    const GAME: GameType;

    /// State entered by the start action
    const IN_FLIGHT: RoundState;

    /// The authoritative draw. Called exactly once per round.
    fn draw(&self, source: &mut dyn OutcomeSource) -> Self::Outcome;

    /// Presentation that ends on `outcome`, starting from `from`
    fn timeline(
        &self,
        outcome: &Self::Outcome,
        from: &Self::Pose,
        source: &mut dyn OutcomeSource,
    ) -> Self::Timeline;

    /// Pose shown while no round is running
    fn rest_pose(&self, clock: f64) -> Self::Pose;

    fn record(&self, outcome: &Self::Outcome) -> Outcome;

    /// Banner published on settlement; none for an empty book
    fn message(&self, payout: &Payout<Self::Target>) -> Option<RoundMessage> {
        match payout.verdict() {
            Verdict::Win => Some(RoundMessage::win(format!("WIN! +{} coins", payout.credit))),
            Verdict::Loss => Some(RoundMessage::loss("LOSE!")),
            Verdict::NoBet => None,
        }
    }
}

/// A stake as shown on the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetView {
    pub target: String,
    pub stake: u64,
}

/// Read-only view of one round for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSnapshot {
    pub game: GameType,
    pub state: RoundState,
    pub round_id: Option<Uuid>,
    /// Present once the round is settled
    pub outcome: Option<Outcome>,
    pub pose: Pose,
    pub message: Option<RoundMessage>,
    pub bets: Vec<BetView>,
    pub total_staked: u64,
    pub view_open: bool,
}

pub struct Round<G: GameRules> {
    rules: G,
    state: RoundState,
    book: BetBook<G::Target>,
    drawn: Option<G::Outcome>,
    timeline: Option<G::Timeline>,
    round_id: Option<Uuid>,
    message: Option<RoundMessage>,
    last_payout: Option<Payout<G::Target>>,
    draws: u64,
    clock: f64,
    view_open: bool,
}

impl<G: GameRules> Round<G> {
    pub fn new(rules: G) -> Self {
        Self {
            rules,
            state: RoundState::Idle,
            book: BetBook::new(),
            drawn: None,
            timeline: None,
            round_id: None,
            message: None,
            last_payout: None,
            draws: 0,
            clock: 0.0,
            view_open: true,
        }
    }

    pub fn rules(&self) -> &G {
        &self.rules
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn book(&self) -> &BetBook<G::Target> {
        &self.book
    }

    /// The outcome fixed at the start action, while in flight or settled
    pub fn drawn_outcome(&self) -> Option<&G::Outcome> {
        self.drawn.as_ref()
    }

    /// The outcome as the player may see it: only after settlement
    pub fn published_outcome(&self) -> Option<&G::Outcome> {
        match self.state {
            RoundState::Settled => self.drawn.as_ref(),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&RoundMessage> {
        self.message.as_ref()
    }

    pub fn last_payout(&self) -> Option<&Payout<G::Target>> {
        self.last_payout.as_ref()
    }

    pub fn round_id(&self) -> Option<Uuid> {
        self.round_id
    }

    pub fn timeline(&self) -> Option<&G::Timeline> {
        self.timeline.as_ref()
    }

    /// Authoritative draws taken over this machine's lifetime
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn is_view_open(&self) -> bool {
        self.view_open
    }

    pub fn pose(&self) -> G::Pose {
        match &self.timeline {
            Some(timeline) => timeline.pose(),
            None => self.rules.rest_pose(self.clock),
        }
    }

    /// Stake on `target`. Only accepted while no outcome is in flight; a
    /// settled round is cleared for the next one once the stake is taken.
    pub fn place_bet(
        &mut self,
        wallet: &mut Wallet,
        target: G::Target,
        stake: u64,
    ) -> Result<(), RoundError> {
        if self.state.is_in_flight() {
            return Err(RoundError::BettingClosed { state: self.state });
        }
        if stake == 0 {
            return Err(RoundError::InvalidStake {
                stake,
                allowed: "any positive amount".to_string(),
            });
        }

        self.book
            .stake(wallet, target, stake, self.rules.max_multiplier())?;
        if self.state == RoundState::Settled {
            self.reset_to_idle();
        }

        debug!(
            "{}: {} coins on {} (book total {})",
            G::GAME,
            stake,
            target,
            self.book.total_staked()
        );
        Ok(())
    }

    /// Draw the outcome and start the presentation
    pub fn start(&mut self, source: &mut dyn OutcomeSource) -> Result<(), RoundError> {
        if self.state.is_in_flight() {
            return Err(RoundError::InvalidRoundStart(StartRejection::AlreadyInProgress));
        }
        if self.book.is_empty() {
            return Err(RoundError::InvalidRoundStart(StartRejection::NoBets));
        }
        if self.state == RoundState::Settled {
            self.reset_to_idle();
        }

        let from = self.pose();
        let outcome = self.rules.draw(source);
        self.draws += 1;
        let timeline = self.rules.timeline(&outcome, &from, source);
        let round_id = Uuid::new_v4();

        info!(
            "{} round {} committed: {} coins staked, presentation {:.2}s",
            G::GAME,
            round_id,
            self.book.total_staked(),
            timeline.duration()
        );

        self.drawn = Some(outcome);
        self.timeline = Some(timeline);
        self.round_id = Some(round_id);
        self.state = G::IN_FLIGHT;
        Ok(())
    }

    /// Advance time. Returns the settlement record if the round settled on
    /// this tick.
    pub fn tick(&mut self, wallet: &mut Wallet, dt: f64) -> Option<SettlementRecord> {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
        if !self.state.is_in_flight() || !self.view_open {
            return None;
        }

        let timeline = self.timeline.as_mut()?;
        let complete = timeline.advance(dt);
        if self.state == RoundState::Committed && timeline.elapsed() > 0.0 {
            self.state = RoundState::Resolving;
        }
        trace!(
            "{} tick: {:.3}/{:.3}s",
            G::GAME,
            timeline.elapsed(),
            timeline.duration()
        );

        if complete {
            self.settle(wallet)
        } else {
            None
        }
    }

    /// Pay out a round whose presentation has finished. Does nothing for a
    /// round that is idle, still animating, or already settled.
    pub fn settle(&mut self, wallet: &mut Wallet) -> Option<SettlementRecord> {
        if !self.state.is_in_flight() {
            debug!("{}: settle ignored while {}", G::GAME, self.state);
            return None;
        }
        if !self.timeline.as_ref().map_or(false, |t| t.is_complete()) {
            return None;
        }
        let outcome = self.drawn.clone()?;

        let payout = resolve(&self.rules, &outcome, &self.book);
        if let Err(e) = wallet.settle(payout.credit, self.book.exposure()) {
            warn!("{}: payout of {} refused: {}", G::GAME, payout.credit, e);
            return None;
        }
        self.book.clear();
        self.message = self.rules.message(&payout);
        self.state = RoundState::Settled;

        let record = SettlementRecord {
            round_id: self.round_id.unwrap_or_else(Uuid::new_v4),
            game: G::GAME,
            outcome: self.rules.record(&outcome),
            total_staked: payout.total_staked,
            credited: payout.credit,
            verdict: payout.verdict(),
            settled_at: chrono::Utc::now(),
        };
        info!(
            "{} round {} settled on {}: staked {}, credited {}",
            G::GAME,
            record.round_id,
            record.outcome,
            record.total_staked,
            record.credited
        );

        self.last_payout = Some(payout);
        Some(record)
    }

    /// Jump the presentation to its last frame and settle. A round whose
    /// view is closed stays frozen.
    pub fn skip_presentation(&mut self, wallet: &mut Wallet) -> Option<SettlementRecord> {
        if !self.state.is_in_flight() || !self.view_open {
            return None;
        }
        if let Some(timeline) = self.timeline.as_mut() {
            timeline.finish();
        }
        self.settle(wallet)
    }

    /// View closed: the round freezes as it is, with no settlement or refund
    pub fn suspend(&mut self) {
        if self.view_open {
            debug!("{} view closed while {}", G::GAME, self.state);
        }
        self.view_open = false;
    }

    /// View reopened: an in-flight presentation replays from the start
    /// towards the same outcome
    pub fn resume(&mut self) {
        if self.view_open {
            return;
        }
        self.view_open = true;
        if self.state.is_in_flight() {
            if let Some(timeline) = self.timeline.as_mut() {
                timeline.restart();
            }
            if self.state == RoundState::Resolving {
                self.state = RoundState::Committed;
            }
            debug!("{} view reopened, presentation restarted", G::GAME);
        }
    }

    fn reset_to_idle(&mut self) {
        if self.state != RoundState::Settled {
            warn!("{}: reset requested while {}", G::GAME, self.state);
            return;
        }
        self.drawn = None;
        self.timeline = None;
        self.round_id = None;
        self.message = None;
        self.last_payout = None;
        self.state = RoundState::Idle;
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            game: G::GAME,
            state: self.state,
            round_id: self.round_id,
            outcome: self.published_outcome().map(|o| self.rules.record(o)),
            pose: self.pose().into(),
            message: self.message.clone(),
            bets: self
                .book
                .iter()
                .map(|(target, stake)| BetView {
                    target: target.to_string(),
                    stake: *stake,
                })
                .collect(),
            total_staked: self.book.total_staked(),
            view_open: self.view_open,
        }
    }
}
