//! Configuration management with validation and defaults
//!
//! Every tunable of the engine lives here: starting balance, stakes, payout
//! multipliers and the animation constants that shape each reveal. Values can
//! come from defaults, a TOML file, or `VCASINO_*` environment variables.

use crate::errors::{CasinoResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Highest starting balance a configuration may ask for
pub const MAX_STARTING_BALANCE: u64 = 1_000_000_000_000_000;

/// Complete engine configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CasinoConfig {
    pub wallet: WalletConfig,
    pub roulette: RouletteConfig,
    pub coin_flip: CoinFlipConfig,
    pub slots: SlotsConfig,
    pub session: SessionConfig,
}

/// Wallet ledger configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    pub starting_balance: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
        }
    }
}

/// Roulette table and wheel physics
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouletteConfig {
    /// Coins staked by a single chip click
    pub chip_value: u64,
    /// Credit per staked coin on a straight-up win (stake already debited)
    pub straight_up_multiplier: u64,
    /// Wheel speed multiplier applied every simulation step
    pub speed_damping: f64,
    /// Ball radius multiplier applied every simulation step
    pub radius_damping: f64,
    /// The spin ends once the wheel speed drops below this (rad/step)
    pub stop_speed: f64,
    pub min_initial_speed: f64,
    pub max_initial_speed: f64,
    pub ball_start_radius: f64,
    /// Ball angular speed relative to the wheel speed
    pub ball_speed_ratio: f64,
    /// Wheel rotation rate while no spin is running (rad/s)
    pub idle_spin_rate: f64,
    /// Simulation steps per second of elapsed time
    pub tick_rate_hz: f64,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            chip_value: 3,
            straight_up_multiplier: 36,
            speed_damping: 0.99,
            radius_damping: 0.9999,
            stop_speed: 0.001,
            min_initial_speed: 0.2,
            max_initial_speed: 0.5,
            ball_start_radius: 0.9,
            ball_speed_ratio: 1.5,
            idle_spin_rate: 0.05,
            tick_rate_hz: 60.0,
        }
    }
}

/// Coin flip stakes and flip timeline
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoinFlipConfig {
    pub stake_tiers: Vec<u64>,
    pub win_multiplier: u64,
    pub min_half_turns: u32,
    pub max_half_turns: u32,
    /// Seconds per half-turn
    pub half_turn_duration: f64,
    /// Seconds of the final bounce onto the landed face
    pub settle_duration: f64,
    pub rest_height: f64,
    pub peak_height: f64,
    /// Idle spin about the x axis (rad/s)
    pub idle_spin_rate: f64,
}

impl Default for CoinFlipConfig {
    fn default() -> Self {
        Self {
            stake_tiers: vec![10, 20],
            win_multiplier: 2,
            min_half_turns: 5,
            max_half_turns: 7,
            half_turn_duration: 0.15,
            settle_duration: 0.5,
            rest_height: 0.3,
            peak_height: 1.3,
            idle_spin_rate: 2.0,
        }
    }
}

/// Slot machine reels
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlotsConfig {
    pub spin_cost: u64,
    pub reel_count: usize,
    pub triple_multiplier: u64,
    pub pair_multiplier: u64,
    /// Seconds until the first reel stops
    pub reel_spin_duration: f64,
    /// Extra seconds between consecutive reel stops
    pub reel_stagger: f64,
    pub min_reel_laps: u32,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            spin_cost: 5,
            reel_count: 3,
            triple_multiplier: 10,
            pair_multiplier: 0,
            reel_spin_duration: 1.2,
            reel_stagger: 0.3,
            min_reel_laps: 3,
        }
    }
}

/// Session-wide settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed seed for reproducible sessions; entropy when absent
    pub seed: Option<u64>,
    /// Settled rounds kept in the session history
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            history_limit: 50,
        }
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CasinoResult<CasinoConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            CasinoConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> CasinoResult<CasinoConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into()
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut CasinoConfig) -> CasinoResult<()> {
        if let Ok(balance) = env::var("VCASINO_STARTING_BALANCE") {
            config.wallet.starting_balance = parse_env("VCASINO_STARTING_BALANCE", balance)?;
        }
        if let Ok(seed) = env::var("VCASINO_SEED") {
            config.session.seed = Some(parse_env("VCASINO_SEED", seed)?);
        }
        if let Ok(chip) = env::var("VCASINO_CHIP_VALUE") {
            config.roulette.chip_value = parse_env("VCASINO_CHIP_VALUE", chip)?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &CasinoConfig, path: &str) -> CasinoResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env(field: &str, value: String) -> Result<u64, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: field.to_string(),
        value,
        reason: "Expected a non-negative integer".to_string(),
    })
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_damping(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "Damping must lie strictly between 0 and 1"))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "Must be a finite, non-negative number"))
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "Must be a positive number"))
    }
}

/// Validate configuration values
pub fn validate(config: &CasinoConfig) -> CasinoResult<()> {
    if config.wallet.starting_balance > MAX_STARTING_BALANCE {
        return Err(invalid(
            "wallet.starting_balance",
            config.wallet.starting_balance,
            "Above the supported maximum of 10^15 coins",
        )
        .into());
    }

    let roulette = &config.roulette;
    if roulette.chip_value == 0 {
        return Err(invalid("roulette.chip_value", 0, "Chip value cannot be zero").into());
    }
    if roulette.straight_up_multiplier == 0 {
        return Err(invalid("roulette.straight_up_multiplier", 0, "Multiplier cannot be zero").into());
    }
    check_damping("roulette.speed_damping", roulette.speed_damping)?;
    check_damping("roulette.radius_damping", roulette.radius_damping)?;
    check_positive("roulette.stop_speed", roulette.stop_speed)?;
    check_positive("roulette.min_initial_speed", roulette.min_initial_speed)?;
    check_positive("roulette.max_initial_speed", roulette.max_initial_speed)?;
    check_non_negative("roulette.idle_spin_rate", roulette.idle_spin_rate)?;
    check_positive("roulette.ball_start_radius", roulette.ball_start_radius)?;
    check_positive("roulette.ball_speed_ratio", roulette.ball_speed_ratio)?;
    check_positive("roulette.tick_rate_hz", roulette.tick_rate_hz)?;
    if roulette.max_initial_speed < roulette.min_initial_speed {
        return Err(invalid(
            "roulette.max_initial_speed",
            roulette.max_initial_speed,
            "Must not be below min_initial_speed",
        )
        .into());
    }
    if roulette.min_initial_speed <= roulette.stop_speed {
        return Err(invalid(
            "roulette.min_initial_speed",
            roulette.min_initial_speed,
            "Must exceed stop_speed or the wheel never moves",
        )
        .into());
    }

    let coin = &config.coin_flip;
    if coin.stake_tiers.is_empty() {
        return Err(ConfigurationError::MissingRequired("coin_flip.stake_tiers".to_string()).into());
    }
    if coin.stake_tiers.contains(&0) {
        return Err(invalid("coin_flip.stake_tiers", 0, "Stake tiers must be positive").into());
    }
    if coin.min_half_turns == 0 || coin.max_half_turns < coin.min_half_turns {
        return Err(invalid(
            "coin_flip.max_half_turns",
            coin.max_half_turns,
            "Half-turn range must be non-empty and start above zero",
        )
        .into());
    }
    check_positive("coin_flip.half_turn_duration", coin.half_turn_duration)?;
    check_positive("coin_flip.settle_duration", coin.settle_duration)?;
    check_non_negative("coin_flip.rest_height", coin.rest_height)?;
    check_non_negative("coin_flip.peak_height", coin.peak_height)?;
    check_non_negative("coin_flip.idle_spin_rate", coin.idle_spin_rate)?;
    if coin.peak_height < coin.rest_height {
        return Err(invalid("coin_flip.peak_height", coin.peak_height, "Peak below rest height").into());
    }

    let slots = &config.slots;
    if slots.spin_cost == 0 {
        return Err(invalid("slots.spin_cost", 0, "Spin cost cannot be zero").into());
    }
    if slots.reel_count < 2 {
        return Err(invalid("slots.reel_count", slots.reel_count, "At least two reels required").into());
    }
    check_positive("slots.reel_spin_duration", slots.reel_spin_duration)?;
    check_non_negative("slots.reel_stagger", slots.reel_stagger)?;

    if config.session.history_limit == 0 {
        return Err(invalid("session.history_limit", 0, "History limit cannot be zero").into());
    }

    Ok(())
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: CasinoConfig,
}

impl ConfigBuilder {
    /// Create a new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: CasinoConfig::default(),
        }
    }

    pub fn starting_balance(mut self, balance: u64) -> Self {
        self.config.wallet.starting_balance = balance;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.session.seed = Some(seed);
        self
    }

    pub fn roulette(mut self, roulette: RouletteConfig) -> Self {
        self.config.roulette = roulette;
        self
    }

    pub fn coin_flip(mut self, coin_flip: CoinFlipConfig) -> Self {
        self.config.coin_flip = coin_flip;
        self
    }

    pub fn slots(mut self, slots: SlotsConfig) -> Self {
        self.config.slots = slots;
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> CasinoResult<CasinoConfig> {
        validate(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> CasinoResult<()> {
    ConfigLoader::new().save(&CasinoConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = CasinoConfig::default();
        assert_eq!(config.wallet.starting_balance, 100);
        assert_eq!(config.roulette.straight_up_multiplier, 36);
        assert_eq!(config.coin_flip.stake_tiers, vec![10, 20]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CasinoConfig::default();

        config.roulette.speed_damping = 1.0;
        assert!(validate(&config).is_err());

        config = CasinoConfig::default();
        config.coin_flip.stake_tiers.clear();
        assert!(matches!(
            validate(&config),
            Err(crate::errors::CasinoError::Configuration(
                ConfigurationError::MissingRequired(_)
            ))
        ));

        config = CasinoConfig::default();
        config.coin_flip.max_half_turns = 2;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .starting_balance(500)
            .seed(7)
            .build()
            .expect("valid config");

        assert_eq!(config.wallet.starting_balance, 500);
        assert_eq!(config.session.seed, Some(7));
    }

    #[test]
    fn test_builder_rejects_invalid() {
        let slots = SlotsConfig {
            spin_cost: 0,
            ..SlotsConfig::default()
        };
        assert!(ConfigBuilder::new().slots(slots).build().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CasinoConfig = toml::from_str(
            r#"
            [wallet]
            starting_balance = 250

            [roulette]
            chip_value = 5
            "#,
        )
        .expect("parse");

        assert_eq!(config.wallet.starting_balance, 250);
        assert_eq!(config.roulette.chip_value, 5);
        assert_eq!(config.roulette.speed_damping, 0.99);
        assert_eq!(config.slots, SlotsConfig::default());
    }

    #[test]
    fn test_save_and_load_config() -> CasinoResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original_config = CasinoConfig::default();
        original_config.wallet.starting_balance = 321;
        original_config.coin_flip.stake_tiers = vec![5, 15, 25];

        let loader = ConfigLoader::new();
        loader.save(&original_config, path)?;

        let loaded_config = ConfigLoader::new().with_path(path).load_from_file(path)?;

        assert_eq!(loaded_config.wallet.starting_balance, 321);
        assert_eq!(loaded_config.coin_flip.stake_tiers, vec![5, 15, 25]);
        assert_eq!(loaded_config.roulette, original_config.roulette);

        Ok(())
    }

    #[test]
    fn test_missing_file_fails() {
        let result = ConfigLoader::new()
            .with_path("/definitely/not/here/vcasino.toml")
            .load();
        assert!(matches!(
            result,
            Err(crate::errors::CasinoError::Configuration(
                ConfigurationError::LoadFailed(_)
            ))
        ));
    }

    #[test]
    fn test_nan_values_rejected() {
        for (section, key) in [
            ("roulette", "max_initial_speed"),
            ("roulette", "idle_spin_rate"),
            ("coin_flip", "rest_height"),
            ("coin_flip", "peak_height"),
            ("coin_flip", "idle_spin_rate"),
            ("slots", "reel_stagger"),
        ] {
            let config: CasinoConfig =
                toml::from_str(&format!("[{}]\n{} = nan", section, key)).expect("parse");
            assert!(
                validate(&config).is_err(),
                "{}.{} = nan was accepted",
                section,
                key
            );
        }
    }

    #[test]
    fn test_infinite_speed_rejected() {
        let mut config = CasinoConfig::default();
        config.roulette.max_initial_speed = f64::INFINITY;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_stagger_allowed() {
        let mut config = CasinoConfig::default();
        config.slots.reel_stagger = 0.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_starting_balance_ceiling() {
        let mut config = CasinoConfig::default();
        config.wallet.starting_balance = MAX_STARTING_BALANCE;
        assert!(validate(&config).is_ok());

        config.wallet.starting_balance = u64::MAX;
        assert!(matches!(
            validate(&config),
            Err(crate::errors::CasinoError::Configuration(
                ConfigurationError::InvalidValue { .. }
            ))
        ));
    }
}
