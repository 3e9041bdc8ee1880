use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::WalletError;
use crate::wallet::Wallet;

/// Stakes placed for the current round, keyed by target.
///
/// Coins enter the book only through [`BetBook::stake`], which debits the
/// wallet first, so the book total always equals what left the wallet this
/// round.
#[derive(Debug, Clone, Serialize)]
pub struct BetBook<T: Ord> {
    entries: BTreeMap<T, u64>,
    total: u64,
    /// Best-case credit reserved in the wallet for these stakes
    exposure: u64,
}

impl<T: Ord + Copy> BetBook<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            total: 0,
            exposure: 0,
        }
    }

    /// Debit `amount` and add it to the stake on `target`. The wallet
    /// reserves `amount × max_multiplier` so the round can always be paid.
    pub fn stake(
        &mut self,
        wallet: &mut Wallet,
        target: T,
        amount: u64,
        max_multiplier: u64,
    ) -> Result<(), WalletError> {
        let max_credit = amount
            .checked_mul(max_multiplier)
            .ok_or(WalletError::CapacityExceeded { requested: u64::MAX })?;
        wallet.stake(amount, max_credit)?;
        *self.entries.entry(target).or_insert(0) += amount;
        self.total += amount;
        self.exposure += max_credit;
        Ok(())
    }

    pub fn stake_on(&self, target: &T) -> u64 {
        self.entries.get(target).copied().unwrap_or(0)
    }

    pub fn total_staked(&self) -> u64 {
        self.total
    }

    /// Largest credit these stakes can win
    pub fn exposure(&self) -> u64 {
        self.exposure
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct targets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &u64)> {
        self.entries.iter()
    }

    /// Empty the book, returning what was on it
    pub fn clear(&mut self) -> Vec<(T, u64)> {
        self.total = 0;
        self.exposure = 0;
        std::mem::take(&mut self.entries).into_iter().collect()
    }
}

impl<T: Ord + Copy> Default for BetBook<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stakes_accumulate_per_target() {
        let mut wallet = Wallet::new(100);
        let mut book = BetBook::new();

        book.stake(&mut wallet, 17u8, 3, 36).unwrap();
        book.stake(&mut wallet, 17u8, 3, 36).unwrap();
        book.stake(&mut wallet, 4u8, 10, 36).unwrap();

        assert_eq!(book.stake_on(&17), 6);
        assert_eq!(book.stake_on(&4), 10);
        assert_eq!(book.stake_on(&0), 0);
        assert_eq!(book.len(), 2);
        assert_eq!(book.total_staked(), 16);
        assert_eq!(wallet.balance(), 84);
    }

    #[test]
    fn test_refused_stake_leaves_book_untouched() {
        let mut wallet = Wallet::new(2);
        let mut book = BetBook::new();

        assert!(book.stake(&mut wallet, 1u8, 3, 36).is_err());
        assert!(book.is_empty());
        assert_eq!(book.total_staked(), 0);
        assert_eq!(wallet.balance(), 2);
    }

    #[test]
    fn test_clear_drains_entries() {
        let mut wallet = Wallet::new(50);
        let mut book = BetBook::new();
        book.stake(&mut wallet, 'a', 5, 36).unwrap();
        book.stake(&mut wallet, 'b', 7, 36).unwrap();

        let drained = book.clear();
        assert_eq!(drained, vec![('a', 5), ('b', 7)]);
        assert!(book.is_empty());
        assert_eq!(book.total_staked(), 0);
    }

    #[test]
    fn test_exposure_tracks_reservation() {
        let mut wallet = Wallet::new(100);
        let mut book = BetBook::new();

        book.stake(&mut wallet, 17u8, 3, 36).unwrap();
        book.stake(&mut wallet, 4u8, 2, 36).unwrap();
        assert_eq!(book.exposure(), 180);
        assert_eq!(wallet.reserved(), 180);

        book.clear();
        assert_eq!(book.exposure(), 0);
    }

    #[test]
    fn test_unpayable_stake_leaves_book_untouched() {
        let mut wallet = Wallet::new(u64::MAX - 10);
        let mut book = BetBook::new();

        let err = book.stake(&mut wallet, 17u8, 3, 36).unwrap_err();
        assert!(matches!(err, WalletError::CapacityExceeded { .. }));
        assert!(book.is_empty());
        assert_eq!(book.exposure(), 0);
        assert_eq!(wallet.balance(), u64::MAX - 10);
    }
}
