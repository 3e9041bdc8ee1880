//! vcasino - randomized-outcome mini-game engine
//!
//! Roulette, coin flip and slot reels sharing one virtual-coin wallet. Every
//! round draws its outcome first and then plays a time-driven presentation
//! that is built to come to rest on that outcome.

pub mod animation;
pub mod casino;
pub mod config;
pub mod errors;
pub mod games;
pub mod wallet;

pub use casino::{AuditReport, Casino, CasinoSnapshot, Input};
pub use config::{CasinoConfig, ConfigBuilder, ConfigLoader};
pub use errors::{CasinoError, CasinoResult, RoundError, WalletError};
pub use games::{
    CoinFace, CoinFlip, GameType, OutcomeSource, Pocket, ProvablyFairSource, RngSource, Roulette,
    RoundState, ScriptedSource, SettlementRecord, SlotMachine,
};
pub use wallet::Wallet;
