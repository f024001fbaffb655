use std::{collections::HashSet, fmt::Display};

use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{chat::NARRATOR_ID, Faction, Player, Role};

pub const NAME_POOL: [&str; 10] = [
    "Henri",
    "Lucie",
    "Elise",
    "Antoine",
    "Jacques",
    "Colette",
    "Etienne",
    "Madeleine",
    "Pierre",
    "Sophie",
];

const ROLE_POOL: [Role; 10] = [
    Role::Werewolf,
    Role::Werewolf,
    Role::Seer,
    Role::Doctor,
    Role::Villager,
    Role::Villager,
    Role::Villager,
    Role::Villager,
    Role::Villager,
    Role::Villager,
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RosterError {
    #[error("Roster has no players")]
    Empty,

    #[error("Duplicate player name: {0}")]
    DuplicateName(String),

    #[error("Duplicate player id: {0}")]
    DuplicateId(u32),

    #[error("Player id {0} is reserved for the narrator")]
    ReservedId(u32),

    #[error("Unknown player id: {0}")]
    UnknownPlayer(u32),
}

/// The ordered set of players in one game.
///
/// Names are unique (case-insensitively) and ids are unique and non-zero; both are
/// checked whenever a roster is built, so name-based matching stays unambiguous.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Deals the standard ten-player village: two werewolves, a seer, a doctor and six
    /// villagers, with names and roles shuffled independently and zipped by position.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        assert!(
            NAME_POOL.len() >= ROLE_POOL.len(),
            "Name pool ({}) must be at least as large as the role pool ({})",
            NAME_POOL.len(),
            ROLE_POOL.len()
        );
        let mut names = NAME_POOL.to_vec();
        names.shuffle(rng);
        let mut roles = ROLE_POOL.to_vec();
        roles.shuffle(rng);

        let players: Vec<_> = names
            .into_iter()
            .zip(roles)
            .enumerate()
            .map(|(idx, (name, role))| Player::new(idx as u32 + 1, name, role))
            .collect();
        log::info!(
            "Dealt roster: {}",
            players.iter().map(|p| &p.name).join(", ")
        );
        Self { players }
    }

    pub fn new(players: Vec<Player>) -> Result<Self, RosterError> {
        if players.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for player in &players {
            if player.id == NARRATOR_ID {
                return Err(RosterError::ReservedId(player.id));
            }
            if !ids.insert(player.id) {
                return Err(RosterError::DuplicateId(player.id));
            }
            if !names.insert(player.name.to_lowercase()) {
                return Err(RosterError::DuplicateName(player.name.clone()));
            }
        }
        Ok(Self { players })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    /// Living werewolves, in roster order.
    pub fn werewolves(&self) -> impl Iterator<Item = &Player> {
        self.alive().filter(|p| p.is_werewolf())
    }

    /// Living players the werewolves may kill, in roster order.
    pub fn targets(&self) -> impl Iterator<Item = &Player> {
        self.alive().filter(|p| !p.is_werewolf())
    }

    pub fn get(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn alive_names(&self) -> Vec<&str> {
        self.alive().map(|p| p.name.as_str()).collect()
    }

    pub fn dead_names(&self) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| !p.alive)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Marks a player dead. Returns whether the player was alive before the call;
    /// death is permanent, so there is no inverse operation.
    pub fn mark_dead(&mut self, id: u32) -> Result<bool, RosterError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RosterError::UnknownPlayer(id))?;
        let was_alive = player.alive;
        player.alive = false;
        Ok(was_alive)
    }

    /// The winning faction, if the game is decided: the village wins once every
    /// werewolf is dead, the werewolves once they match the living villagers.
    pub fn victor(&self) -> Option<Faction> {
        let wolves = self.werewolves().count();
        let others = self.targets().count();
        if wolves == 0 {
            Some(Faction::Village)
        } else if wolves >= others {
            Some(Faction::Werewolves)
        } else {
            None
        }
    }
}

impl Display for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let players_str = self
            .players
            .iter()
            .map(|player| format!("{}. {player}", player.id))
            .join("\n");
        write!(f, "\nRoster:\n{}", players_str)
    }
}
