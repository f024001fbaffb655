use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;
use generators::{ChatCompletionsGenerator, HumanSeatGenerator, InputGenerator, RandomGenerator};
use rand::{rngs::StdRng, SeedableRng};
use recorder::{GameMetadata, JsonlTranscriptWriter, MessageObserver, ObserverSet, RecorderError};
use simulation::{run_game, CliOverrides, FileConfig, Game, SimulationConfig, SimulationError};
use types::{ChatMessage, Roster, TextGenerator};

#[derive(Parser, Debug)]
struct Params {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many rounds even if nobody has won
    #[arg(long)]
    rounds: Option<u32>,
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Show wolf whispers in the public chat
    #[arg(long)]
    reveal_whispers: bool,
    /// Write a JSON-lines transcript here
    #[arg(long)]
    transcript: Option<PathBuf>,
    /// Use canned lines instead of calling the chat endpoint
    #[arg(long)]
    scripted: bool,
    /// Type this character's lines yourself
    #[arg(long)]
    human: Option<String>,
}

/// Prints the public chat as it happens.
struct ConsoleObserver;

#[async_trait]
impl MessageObserver for ConsoleObserver {
    async fn on_message(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        println!("{message}");
        Ok(())
    }

    async fn on_whisper(&mut self, message: &ChatMessage) -> Result<(), RecorderError> {
        log::debug!("whisper {message}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let file = args.config.as_deref().map(FileConfig::load).transpose()?;
    let config = SimulationConfig::from_cli_or_env_or_yaml(
        CliOverrides {
            endpoint: args.endpoint,
            model: args.model,
            seed: args.seed,
            rounds: args.rounds,
            delay_ms: args.delay_ms,
            reveal_whispers: args.reveal_whispers,
            transcript: args.transcript,
        },
        file,
    );
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let roster = Roster::generate(&mut rng);
    log::debug!("{roster}");

    let mut generator: Box<dyn TextGenerator> = if args.scripted {
        Box::new(RandomGenerator::seeded(seed))
    } else {
        log::info!("Using chat endpoint {}", config.endpoint);
        Box::new(
            ChatCompletionsGenerator::new(
                &config.endpoint,
                config.model.clone(),
                config.attempt_timeout(),
            )?
            .with_api_key(config.api_key.clone())
            .with_retry(config.retry),
        )
    };
    if let Some(name) = &args.human {
        let seat = roster
            .find_by_name(name)
            .ok_or_else(|| SimulationError::Config(format!("No player named {name}")))?;
        println!("You play {}, the {}.", seat.name, seat.role);
        generator = Box::new(HumanSeatGenerator::new(&seat.name, InputGenerator::new(6), generator));
    }

    let mut observers = ObserverSet::new();
    observers.push(Box::new(ConsoleObserver));
    if let Some(path) = &config.transcript {
        let mut metadata = GameMetadata::new(Some(seed), roster.iter().map(|p| p.id).collect());
        metadata.configuration = serde_json::to_value(&config).ok();
        observers.push(Box::new(JsonlTranscriptWriter::create(path, metadata).await?));
    }

    let mut game = Game::new(roster, generator, Box::new(observers), rng, config.round.clone());
    let winner = run_game(&mut game, config.delay_ms, config.max_rounds).await?;
    match winner {
        Some(faction) => log::info!("{faction} won"),
        None => log::info!("No winner after {} rounds", game.round - 1),
    }
    log::info!("{}", game.roster);
    Ok(())
}
