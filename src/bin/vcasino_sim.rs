//! Headless vcasino simulator
//!
//! Drives the engine with synthetic 60 Hz frames, the way the 3D client
//! would, and reports what happened to the wallet.

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use vcasino::{
    config::{generate_sample_config, ConfigLoader},
    errors::{CasinoError, CasinoResult},
    games::{
        outcome::{chi_square, draw_face, draw_pocket},
        types::Verdict,
        wheel::POCKET_COUNT,
    },
    Casino, CoinFace, GameType, Input, OutcomeSource, ProvablyFairSource, RngSource,
    SettlementRecord,
};

/// vcasino simulator CLI
#[derive(Parser)]
#[command(name = "vcasino-sim")]
#[command(about = "Headless driver for the vcasino mini-game engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible session
    #[arg(short, long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Simulated frames per second
    #[arg(long, default_value = "60")]
    fps: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Play roulette rounds
    Roulette {
        #[arg(short, long, default_value = "100")]
        rounds: usize,

        /// Number to back every round; a random one when omitted
        #[arg(short, long)]
        number: Option<u8>,

        /// Chips placed per round
        #[arg(long, default_value = "1")]
        chips: u64,
    },

    /// Play coin flips
    CoinFlip {
        #[arg(short, long, default_value = "100")]
        rounds: usize,

        /// Face to call every round; a random one when omitted
        #[arg(short, long, value_enum)]
        face: Option<FaceArg>,

        /// Stake tier
        #[arg(long)]
        stake: Option<u64>,
    },

    /// Pull the slot machine
    Slots {
        #[arg(short, long, default_value = "100")]
        rounds: usize,
    },

    /// Check draw uniformity of the commit-reveal source
    Fairness {
        #[arg(short, long, default_value = "37000")]
        draws: usize,

        /// Server seed; random when omitted
        #[arg(long)]
        server_seed: Option<String>,

        #[arg(long, default_value = "player")]
        client_seed: String,
    },

    /// Apply a JSON array of inputs, letting every round settle in between
    Script {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Write the default configuration as TOML
    SampleConfig {
        #[arg(short, long, default_value = "vcasino.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FaceArg {
    Testa,
    Croce,
}

impl From<FaceArg> for CoinFace {
    fn from(face: FaceArg) -> Self {
        match face {
            FaceArg::Testa => CoinFace::Testa,
            FaceArg::Croce => CoinFace::Croce,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct SessionReport {
    game: String,
    rounds_played: usize,
    wins: usize,
    losses: usize,
    staked: u64,
    credited: u64,
    starting_balance: u64,
    final_balance: u64,
    conserved: bool,
}

impl SessionReport {
    fn absorb(&mut self, records: &[SettlementRecord]) {
        for record in records {
            self.rounds_played += 1;
            self.staked += record.total_staked;
            self.credited += record.credited;
            match record.verdict {
                Verdict::Win => self.wins += 1,
                Verdict::Loss => self.losses += 1,
                Verdict::NoBet => {}
            }
        }
    }

    fn print(&self) {
        println!("🎰 {} session", self.game);
        println!("==================");
        println!("Rounds played:  {}", self.rounds_played);
        println!("Wins / losses:  {} / {}", self.wins, self.losses);
        println!("Staked:         {}", self.staked);
        println!("Credited:       {}", self.credited);
        println!(
            "Balance:        {} -> {}",
            self.starting_balance, self.final_balance
        );
        if self.staked > 0 {
            println!(
                "Return:         {:.1}%",
                self.credited as f64 / self.staked as f64 * 100.0
            );
        }
        println!("Conserved:      {}", if self.conserved { "✅" } else { "❌" });
    }
}

fn main() -> CasinoResult<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let dt = 1.0 / cli.fps.max(1.0);
    let json = cli.json;

    let report = match cli.command {
        Commands::SampleConfig { output } => {
            generate_sample_config(&output.to_string_lossy())?;
            println!("📝 Sample configuration written to {}", output.display());
            return Ok(());
        }
        Commands::Fairness {
            draws,
            server_seed,
            client_seed,
        } => return run_fairness(draws, server_seed, &client_seed, json),
        Commands::Roulette {
            rounds,
            number,
            chips,
        } => {
            let mut session = Session::open(cli.config, cli.seed)?;
            session.play_roulette(rounds, number, chips, dt);
            session.report
        }
        Commands::CoinFlip {
            rounds,
            face,
            stake,
        } => {
            let mut session = Session::open(cli.config, cli.seed)?;
            session.play_coin_flip(rounds, face.map(CoinFace::from), stake, dt)?;
            session.report
        }
        Commands::Slots { rounds } => {
            let mut session = Session::open(cli.config, cli.seed)?;
            session.play_slots(rounds, dt);
            session.report
        }
        Commands::Script { file } => {
            let mut session = Session::open(cli.config, cli.seed)?;
            session.play_script(&file, dt)?;
            session.report
        }
    };

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CasinoError::Serialization(e.to_string()))?;
        println!("{}", out);
    } else {
        report.print();
    }

    Ok(())
}

/// One simulated player session
struct Session {
    casino: Casino,
    /// Picks the player's own choices, kept apart from the table's source
    picker: Box<dyn OutcomeSource>,
    report: SessionReport,
}

impl Session {
    fn open(config_path: Option<PathBuf>, seed: Option<u64>) -> CasinoResult<Self> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = config_path {
            loader = loader.with_path(path);
        }
        let mut config = loader.load()?;
        if seed.is_some() {
            config.session.seed = seed;
        }

        let picker: Box<dyn OutcomeSource> = match config.session.seed {
            Some(seed) => Box::new(RngSource::seeded(seed.wrapping_add(1))),
            None => Box::new(RngSource::from_entropy()),
        };
        let casino = Casino::new(config)?;

        Ok(Self {
            report: SessionReport {
                starting_balance: casino.balance(),
                ..Default::default()
            },
            casino,
            picker,
        })
    }

    fn play_roulette(&mut self, rounds: usize, number: Option<u8>, chips: u64, dt: f64) {
        self.report.game = GameType::Roulette.to_string();
        for _ in 0..rounds {
            let target = number.unwrap_or_else(|| draw_pocket(self.picker.as_mut()).number());
            let casino = &mut self.casino;
            let placed = (0..chips)
                .filter(|_| casino.handle(Input::PlaceChip { number: target }))
                .count();
            if placed == 0 || !self.casino.handle(Input::Spin) {
                warn!("Stopping: cannot cover another spin");
                break;
            }
            self.settle_all(dt);
        }
        self.finish();
    }

    fn play_coin_flip(
        &mut self,
        rounds: usize,
        face: Option<CoinFace>,
        stake: Option<u64>,
        dt: f64,
    ) -> CasinoResult<()> {
        self.report.game = GameType::CoinFlip.to_string();
        if let Some(stake) = stake {
            self.casino.choose_stake(stake)?;
        }
        for _ in 0..rounds {
            let call = face.unwrap_or_else(|| draw_face(self.picker.as_mut()));
            self.casino.handle(Input::ChooseFace { face: call });
            if !self.casino.handle(Input::Flip) {
                warn!("Stopping: cannot cover another flip");
                break;
            }
            self.settle_all(dt);
        }
        self.finish();
        Ok(())
    }

    fn play_slots(&mut self, rounds: usize, dt: f64) {
        self.report.game = GameType::Slots.to_string();
        for _ in 0..rounds {
            if !self.casino.handle(Input::SpinReels) {
                warn!("Stopping: cannot cover another pull");
                break;
            }
            self.settle_all(dt);
        }
        self.finish();
    }

    fn play_script(&mut self, file: &Path, dt: f64) -> CasinoResult<()> {
        self.report.game = "script".to_string();
        let content = std::fs::read_to_string(file).map_err(|e| {
            CasinoError::Serialization(format!("Failed to read {}: {}", file.display(), e))
        })?;
        let inputs: Vec<Input> = serde_json::from_str(&content)
            .map_err(|e| CasinoError::Serialization(format!("Bad input script: {}", e)))?;

        for input in inputs {
            self.casino.handle(input);
            self.settle_all(dt);
        }
        println!("{}", self.casino.snapshot_json()?);
        self.finish();
        Ok(())
    }

    fn settle_all(&mut self, dt: f64) {
        let records = run_until_settled(&mut self.casino, dt);
        self.report.absorb(&records);
    }

    fn finish(&mut self) {
        self.report.final_balance = self.casino.balance();
        self.report.conserved = self.casino.audit().consistent;
    }
}

/// Tick until no table has a round in flight. Rounds whose view is closed
/// never settle, so the loop gives up after ten simulated minutes.
fn run_until_settled(casino: &mut Casino, dt: f64) -> Vec<SettlementRecord> {
    let max_frames = (600.0 / dt) as usize;
    let mut settled = Vec::new();
    for _ in 0..max_frames {
        if !casino.has_round_in_flight() {
            break;
        }
        settled.extend(casino.tick(dt));
    }
    settled
}

#[derive(Serialize)]
struct FairnessReport {
    commitment: String,
    server_seed: String,
    client_seed: String,
    draws: usize,
    pocket_chi_square: f64,
    heads: u64,
    tails: u64,
    coin_chi_square: f64,
}

fn run_fairness(
    draws: usize,
    server_seed: Option<String>,
    client_seed: &str,
    json: bool,
) -> CasinoResult<()> {
    let mut source = match server_seed {
        Some(seed) => ProvablyFairSource::new(seed, client_seed),
        None => ProvablyFairSource::random(client_seed),
    };
    let commitment = source.commitment();
    info!("Fairness run committed to {}", commitment);

    let mut pockets = [0u64; POCKET_COUNT];
    for _ in 0..draws {
        pockets[draw_pocket(&mut source).wheel_index()] += 1;
    }
    let mut faces = [0u64; 2];
    for _ in 0..draws {
        faces[draw_face(&mut source).index()] += 1;
    }

    let report = FairnessReport {
        commitment,
        server_seed: source.reveal().to_string(),
        client_seed: client_seed.to_string(),
        draws,
        pocket_chi_square: chi_square(&pockets),
        heads: faces[0],
        tails: faces[1],
        coin_chi_square: chi_square(&faces),
    };

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CasinoError::Serialization(e.to_string()))?;
        println!("{}", out);
    } else {
        println!("🔐 Provably fair draw check");
        println!("===========================");
        println!("Commitment:   {}", report.commitment);
        println!("Server seed:  {}", report.server_seed);
        println!("Client seed:  {}", report.client_seed);
        // 36 degrees of freedom: 99th percentile is about 58.6
        println!(
            "Pockets:      chi² = {:.2} over {} draws ({})",
            report.pocket_chi_square,
            draws,
            if report.pocket_chi_square < 58.6 { "✅" } else { "⚠️" }
        );
        println!(
            "Coin:         {} TESTA / {} CROCE, chi² = {:.2}",
            report.heads, report.tails, report.coin_chi_square
        );
    }

    Ok(())
}
