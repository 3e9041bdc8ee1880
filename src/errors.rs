//! Error types for the vcasino engine
//!
//! Every rejected player action maps to one of these. Nothing here is fatal:
//! a returned error always means the engine state was left exactly as it was.

use crate::games::types::RoundState;
use thiserror::Error;

/// Root error type for all vcasino operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CasinoError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Wallet ledger errors
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Round state machine errors
    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    /// Snapshot or report encoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration and validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Wallet ledger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("Debit amount must be positive")]
    ZeroAmount,

    #[error("Wallet capacity exceeded: a credit of {requested} would not fit")]
    CapacityExceeded { requested: u64 },
}

/// Why a start action (spin, flip) was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartRejection {
    #[error("a round is already in progress")]
    AlreadyInProgress,

    #[error("no bets on the table")]
    NoBets,

    #[error("no face chosen")]
    NoChoice,
}

/// Round state machine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("Stake rejected: {0}")]
    InsufficientFunds(#[from] WalletError),

    #[error("Cannot start round: {0}")]
    InvalidRoundStart(StartRejection),

    #[error("Betting is closed while the round is {state}")]
    BettingClosed { state: RoundState },

    #[error("Invalid bet target: {0}")]
    InvalidTarget(u8),

    #[error("Invalid stake {stake} (allowed: {allowed})")]
    InvalidStake { stake: u64, allowed: String },
}

impl RoundError {
    /// True when the stake was refused for lack of coins
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            RoundError::InsufficientFunds(WalletError::InsufficientFunds { .. })
        )
    }
}

// Convenience type alias for Results
pub type CasinoResult<T> = Result<T, CasinoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("test".to_string());
        let casino_error = CasinoError::Configuration(config_error);

        assert!(casino_error.to_string().contains("Configuration error"));
        assert!(casino_error.to_string().contains("test"));
    }

    #[test]
    fn test_insufficient_funds_details() {
        let err = WalletError::InsufficientFunds {
            requested: 10,
            available: 3,
        };

        assert!(err.to_string().contains("requested 10"));
        assert!(err.to_string().contains("available 3"));
    }

    #[test]
    fn test_error_conversion() {
        let round_error: RoundError = WalletError::ZeroAmount.into();
        let casino_error: CasinoError = round_error.into();

        match casino_error {
            CasinoError::Round(RoundError::InsufficientFunds(WalletError::ZeroAmount)) => {}
            other => panic!("Expected wrapped wallet error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_source() {
        let casino_error = CasinoError::Round(RoundError::InsufficientFunds(
            WalletError::InsufficientFunds {
                requested: 5,
                available: 0,
            },
        ));

        assert!(casino_error.source().is_some());
    }

    #[test]
    fn test_start_rejection_message() {
        let err = RoundError::InvalidRoundStart(StartRejection::NoBets);
        assert_eq!(err.to_string(), "Cannot start round: no bets on the table");
    }
}
