//! Outcome sources.
//!
//! A round asks its source exactly once for the authoritative result via
//! [`OutcomeSource::pick`]. Everything drawn with [`OutcomeSource::unit`]
//! only shapes the animation and never decides who wins.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

use crate::games::types::{CoinFace, ReelStops, SlotSymbol};
use crate::games::wheel::{Pocket, POCKET_COUNT};

/// Randomness capability injected into every game
pub trait OutcomeSource {
    /// Unbiased draw in `0..bound`. `bound` is never zero.
    fn pick(&mut self, bound: usize) -> usize;

    /// Cosmetic value in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Short label for logs
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<S: OutcomeSource + ?Sized> OutcomeSource for Box<S> {
    fn pick(&mut self, bound: usize) -> usize {
        (**self).pick(bound)
    }

    fn unit(&mut self) -> f64 {
        (**self).unit()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Uniform draw over the 37 pockets
pub fn draw_pocket(source: &mut dyn OutcomeSource) -> Pocket {
    Pocket::from_wheel_index(source.pick(POCKET_COUNT))
}

/// Fair coin
pub fn draw_face(source: &mut dyn OutcomeSource) -> CoinFace {
    CoinFace::from_index(source.pick(2))
}

/// One independent uniform symbol per reel
pub fn draw_reels(source: &mut dyn OutcomeSource, reel_count: usize) -> ReelStops {
    ReelStops(
        (0..reel_count)
            .map(|_| SlotSymbol::from_index(source.pick(SlotSymbol::COUNT)))
            .collect(),
    )
}

/// Pearson chi-square statistic of `counts` against a uniform distribution
pub fn chi_square(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if counts.is_empty() || total == 0 {
        return 0.0;
    }
    let expected = total as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|c| {
            let d = *c as f64 - expected;
            d * d / expected
        })
        .sum()
}

/// `rand`-backed source. Seeded construction makes whole sessions replayable.
pub struct RngSource<R: RngCore = StdRng> {
    rng: R,
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore> RngSource<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> OutcomeSource for RngSource<R> {
    fn pick(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound.max(1))
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn name(&self) -> &'static str {
        "rng"
    }
}

/// Commit-reveal source.
///
/// Draws come from `SHA-256("{server_seed}:{client_seed}:{counter}")` blocks,
/// read as four big-endian u64 words. The hex digest of the server seed is
/// published up front so a player can replay every draw after the reveal.
pub struct ProvablyFairSource {
    server_seed: String,
    client_seed: String,
    counter: u64,
    buffer: VecDeque<u64>,
}

impl ProvablyFairSource {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            counter: 0,
            buffer: VecDeque::with_capacity(4),
        }
    }

    /// Fresh server seed from the OS entropy pool
    pub fn random(client_seed: impl Into<String>) -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(hex::encode(bytes), client_seed)
    }

    /// Hex SHA-256 of the server seed
    pub fn commitment(&self) -> String {
        hex::encode(Sha256::digest(self.server_seed.as_bytes()))
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    /// Number of hash blocks consumed so far
    pub fn blocks_used(&self) -> u64 {
        self.counter
    }

    pub fn reveal(&self) -> &str {
        &self.server_seed
    }

    /// Check a revealed server seed against a published commitment
    pub fn verify(server_seed: &str, commitment: &str) -> bool {
        hex::encode(Sha256::digest(server_seed.as_bytes())) == commitment.to_ascii_lowercase()
    }

    fn next_word(&mut self) -> u64 {
        if self.buffer.is_empty() {
            let input = format!("{}:{}:{}", self.server_seed, self.client_seed, self.counter);
            self.counter += 1;
            let digest = Sha256::digest(input.as_bytes());
            for chunk in digest.chunks_exact(8) {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                self.buffer.push_back(u64::from_be_bytes(word));
            }
        }
        self.buffer.pop_front().unwrap_or_default()
    }
}

impl OutcomeSource for ProvablyFairSource {
    fn pick(&mut self, bound: usize) -> usize {
        let bound = bound.max(1) as u64;
        // Largest accepted word; [0, zone] holds a whole number of `bound` blocks
        let zone = u64::MAX - (u64::MAX % bound + 1) % bound;
        loop {
            let word = self.next_word();
            if word <= zone {
                return (word % bound) as usize;
            }
        }
    }

    fn unit(&mut self) -> f64 {
        (self.next_word() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn name(&self) -> &'static str {
        "provably-fair"
    }
}

/// Replays queued picks in order, used to force outcomes in tests and demos.
/// An exhausted queue yields 0; every cosmetic draw returns the fixed `unit`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    picks: VecDeque<usize>,
    unit: f64,
    picks_served: usize,
}

impl ScriptedSource {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
            unit: 0.5,
            picks_served: 0,
        }
    }

    pub fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit.clamp(0.0, 1.0 - f64::EPSILON);
        self
    }

    /// Queue the draw that makes `draw_pocket` land on `pocket`
    pub fn push_pocket(&mut self, pocket: Pocket) {
        self.picks.push_back(pocket.wheel_index());
    }

    pub fn push_face(&mut self, face: CoinFace) {
        self.picks.push_back(face.index());
    }

    pub fn push_reels(&mut self, symbols: &[SlotSymbol]) {
        self.picks.extend(symbols.iter().map(|s| s.index()));
    }

    /// How many authoritative draws have been taken
    pub fn picks_served(&self) -> usize {
        self.picks_served
    }

    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl OutcomeSource for ScriptedSource {
    fn pick(&mut self, bound: usize) -> usize {
        self.picks_served += 1;
        self.picks.pop_front().unwrap_or(0) % bound.max(1)
    }

    fn unit(&mut self) -> f64 {
        self.unit
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
