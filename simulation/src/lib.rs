pub mod config;
pub mod day;
pub mod error;
pub mod game;
pub mod night;
pub mod prompts;
pub mod table;

pub use config::{CliOverrides, FailurePolicy, FileConfig, RoundSettings, SimulationConfig};
pub use day::run_day;
pub use error::SimulationError;
pub use game::{run_game, Game};
pub use night::run_night;
pub use table::{RoundOutcome, Table};
