use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Doctor,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Villager => write!(f, "Villager"),
            Role::Werewolf => write!(f, "Werewolf"),
            Role::Seer => write!(f, "Seer"),
            Role::Doctor => write!(f, "Doctor"),
        }
    }
}

impl Role {
    pub fn faction(&self) -> Faction {
        match self {
            Role::Werewolf => Faction::Werewolves,
            Role::Villager | Role::Seer | Role::Doctor => Faction::Village,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Village,
    Werewolves,
}

impl Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Village => write!(f, "Village"),
            Faction::Werewolves => write!(f, "Werewolves"),
        }
    }
}

/// A participant in the game. Only `alive` ever changes after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub role: Role,
    pub alive: bool,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) {}",
            self.name,
            self.role,
            if self.alive { "alive" } else { "dead" }
        )
    }
}

impl Player {
    pub fn new(id: u32, name: &str, role: Role) -> Self {
        Self {
            id,
            name: name.to_string(),
            role,
            alive: true,
        }
    }

    pub fn is_werewolf(&self) -> bool {
        self.role == Role::Werewolf
    }
}
