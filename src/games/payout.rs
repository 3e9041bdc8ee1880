//! Payout resolution. Pure: the caller credits the wallet and clears the book.

use serde::Serialize;
use std::fmt::{Debug, Display};

use crate::games::bet_book::BetBook;
use crate::games::types::Verdict;

/// Per-game payout table
pub trait PayoutRule {
    type Target: Ord + Copy + Display + Debug;
    type Outcome: Clone + Debug + PartialEq;

    /// Credit multiplier for one stake on `target`; zero means the bet lost
    fn multiplier(&self, target: &Self::Target, outcome: &Self::Outcome) -> u64;

    /// Highest multiplier any outcome can pay
    fn max_multiplier(&self) -> u64;
}

/// One book entry after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettledEntry<T> {
    pub target: T,
    pub stake: u64,
    pub credit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payout<T> {
    pub credit: u64,
    pub total_staked: u64,
    pub entries: Vec<SettledEntry<T>>,
}

impl<T> Payout<T> {
    pub fn verdict(&self) -> Verdict {
        if self.entries.is_empty() {
            Verdict::NoBet
        } else if self.credit > 0 {
            Verdict::Win
        } else {
            Verdict::Loss
        }
    }

    pub fn winning_entries(&self) -> impl Iterator<Item = &SettledEntry<T>> {
        self.entries.iter().filter(|e| e.credit > 0)
    }
}

/// Sum `stake × multiplier` over every entry in the book
pub fn resolve<R: PayoutRule>(
    rule: &R,
    outcome: &R::Outcome,
    book: &BetBook<R::Target>,
) -> Payout<R::Target> {
    let entries: Vec<SettledEntry<R::Target>> = book
        .iter()
        .map(|(target, stake)| SettledEntry {
            target: *target,
            stake: *stake,
            credit: stake.saturating_mul(rule.multiplier(target, outcome)),
        })
        .collect();

    Payout {
        credit: entries.iter().fold(0u64, |acc, e| acc.saturating_add(e.credit)),
        total_staked: book.total_staked(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    struct StraightUp;

    impl PayoutRule for StraightUp {
        type Target = u8;
        type Outcome = u8;

        fn multiplier(&self, target: &u8, outcome: &u8) -> u64 {
            if target == outcome {
                36
            } else {
                0
            }
        }

        fn max_multiplier(&self) -> u64 {
            36
        }
    }

    #[test]
    fn test_resolve_sums_only_matching_targets() {
        let mut wallet = Wallet::new(100);
        let mut book = BetBook::new();
        book.stake(&mut wallet, 17u8, 3, 36).unwrap();
        book.stake(&mut wallet, 17u8, 3, 36).unwrap();
        book.stake(&mut wallet, 5u8, 9, 36).unwrap();

        let payout = resolve(&StraightUp, &17, &book);
        assert_eq!(payout.credit, 216);
        assert_eq!(payout.total_staked, 15);
        assert_eq!(payout.verdict(), Verdict::Win);
        assert_eq!(payout.winning_entries().count(), 1);

        // resolve never touches the book
        assert_eq!(book.total_staked(), 15);
    }

    #[test]
    fn test_zero_only_wins_on_zero() {
        let mut wallet = Wallet::new(100);
        let mut book = BetBook::new();
        book.stake(&mut wallet, 0u8, 3, 36).unwrap();

        assert_eq!(resolve(&StraightUp, &2, &book).credit, 0);
        assert_eq!(resolve(&StraightUp, &0, &book).credit, 108);
    }

    #[test]
    fn test_empty_book_is_no_bet() {
        let book: BetBook<u8> = BetBook::new();
        let payout = resolve(&StraightUp, &3, &book);
        assert_eq!(payout.credit, 0);
        assert_eq!(payout.verdict(), Verdict::NoBet);
    }
}
