pub mod accusation;
pub mod chat;
pub mod generator;
pub mod player;
pub mod roster;

pub use accusation::{is_accusation, mentions_name, SUSPICION_WORDS};
pub use chat::{ChatMessage, Phase};
pub use generator::{GenerationError, TextGenerator, Turn, TurnRole};
pub use player::{Faction, Player, Role};
pub use roster::{Roster, RosterError, NAME_POOL};
