pub mod bet_book;
pub mod coin_flip;
pub mod outcome;
pub mod payout;
pub mod round;
pub mod roulette;
pub mod slots;
pub mod types;
pub mod wheel;

pub use bet_book::BetBook;
pub use coin_flip::{CoinFlip, CoinFlipRules};
pub use outcome::{OutcomeSource, ProvablyFairSource, RngSource, ScriptedSource};
pub use payout::{resolve, Payout, PayoutRule};
pub use round::{BetView, GameRules, Round, RoundSnapshot};
pub use roulette::{Roulette, RouletteRules};
pub use slots::{SlotMachine, SlotRules};
pub use types::*;
pub use wheel::{Pocket, PocketColor, WHEEL_ORDER};
