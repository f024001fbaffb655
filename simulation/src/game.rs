use std::time::Duration;

use rand::rngs::StdRng;
use recorder::MessageObserver;
use types::{ChatMessage, Faction, Phase, Roster, TextGenerator};

use crate::config::RoundSettings;
use crate::day::run_day;
use crate::night::run_night;
use crate::table::{RoundOutcome, Table};
use crate::SimulationError;

pub const WELCOME: &str = "Welcome to Havenwood. The game begins!";

/// One game in progress: the live roster and public chat, plus everything needed to
/// play the next phase.
pub struct Game {
    pub roster: Roster,
    pub chat: Vec<ChatMessage>,
    /// Whispers from the most recent night.
    pub wolf_chat: Vec<ChatMessage>,
    pub round: u32,
    pub phase: Phase,
    generator: Box<dyn TextGenerator>,
    observer: Box<dyn MessageObserver>,
    rng: StdRng,
    settings: RoundSettings,
}

impl Game {
    pub fn new(
        roster: Roster,
        generator: Box<dyn TextGenerator>,
        observer: Box<dyn MessageObserver>,
        rng: StdRng,
        settings: RoundSettings,
    ) -> Self {
        Self {
            roster,
            chat: Vec::new(),
            wolf_chat: Vec::new(),
            round: 1,
            phase: Phase::Night,
            generator,
            observer,
            rng,
            settings,
        }
    }

    /// Opens the chat with the welcome line. Does nothing once the chat has started.
    pub async fn welcome(&mut self) -> Result<(), SimulationError> {
        if !self.chat.is_empty() {
            return Ok(());
        }
        let message = ChatMessage::narrator(WELCOME);
        log::info!("{message}");
        self.observer.on_message(&message).await?;
        self.chat.push(message);
        Ok(())
    }

    pub fn winner(&self) -> Option<Faction> {
        self.roster.victor()
    }

    pub async fn play_night(&mut self) -> Result<Option<u32>, SimulationError> {
        let mut table = Table::new(
            self.generator.as_mut(),
            self.observer.as_mut(),
            &mut self.rng,
            &self.settings,
        );
        let outcome = run_night(&self.roster, &self.chat, self.round, &mut table).await?;
        self.phase = Phase::Day;
        Ok(self.apply(outcome))
    }

    /// Plays the day and moves on to the next round.
    pub async fn play_day(&mut self) -> Result<Option<u32>, SimulationError> {
        let mut table = Table::new(
            self.generator.as_mut(),
            self.observer.as_mut(),
            &mut self.rng,
            &self.settings,
        );
        let outcome = run_day(&self.roster, &self.chat, self.round, &mut table).await?;
        self.phase = Phase::Night;
        self.round += 1;
        Ok(self.apply(outcome))
    }

    /// Plays whichever phase is next, then the day if the night leaves the game open.
    pub async fn play_round(&mut self) -> Result<(), SimulationError> {
        if self.phase == Phase::Night {
            self.play_night().await?;
            if self.winner().is_some() {
                return Ok(());
            }
        }
        self.play_day().await?;
        Ok(())
    }

    fn apply(&mut self, outcome: RoundOutcome) -> Option<u32> {
        self.roster = outcome.roster;
        self.chat = outcome.transcript;
        if self.phase == Phase::Day {
            self.wolf_chat = outcome.wolf_chat;
        }
        outcome.eliminated
    }
}

/// Plays rounds until a faction wins or `max_rounds` rounds have been played.
pub async fn run_game(
    game: &mut Game,
    delay_ms: Option<u64>,
    max_rounds: Option<u32>,
) -> Result<Option<Faction>, SimulationError> {
    game.welcome().await?;
    while game.winner().is_none() {
        if max_rounds.is_some_and(|max| game.round > max) {
            log::info!("Stopping after {} rounds", game.round - 1);
            break;
        }
        log::debug!("Round {}{}", game.round, game.roster);
        if let Some(ms) = delay_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        game.play_round().await?;
    }

    let winner = game.winner();
    if let Some(faction) = winner {
        let message = ChatMessage::narrator(match faction {
            Faction::Village => "Game over. The village wins!",
            Faction::Werewolves => "Game over. The werewolves win!",
        });
        log::info!("{message}");
        game.observer.on_message(&message).await?;
        game.chat.push(message);
    }
    Ok(winner)
}
