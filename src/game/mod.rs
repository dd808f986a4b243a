//! Games in progress: state, history and configuration

pub mod config;
pub mod history;
pub mod state;

pub use config::{
    BoardConfig, ConfigError, Game, GameConfig, GameMode, Player, PlayerKind, RulesConfig,
    ShapeConfig, RANDOM_STARTING_PLAYER,
};
pub use history::GameHistory;
pub use state::{GameState, PlayerData};
