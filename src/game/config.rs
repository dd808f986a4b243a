//! Game configuration and the `Game` facade built from it
//!
//! Configurations are JSON documents:
//!
//! ```json
//! {
//!   "player1": { "name": "Alice", "symbol": "cross", "type": "human" },
//!   "player2": { "name": "Bot", "symbol": "circle", "type": "hard" },
//!   "board": { "width": 5, "height": 5, "shape": "random-block", "blockedCases": 3 },
//!   "game": { "nbSymbols": 4, "alignToWin": true, "startingPlayer": "Random", "gamemode": "bomb" }
//! }
//! ```
//!
//! Every key is optional and falls back to a classic 3x3 tic-tac-toe between
//! two humans.

use std::fmt;
use std::path::Path;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{BoardBuilder, Shape, Symbol, MAX_CELLS, MAX_SIDE, MIN_SIDE};
use crate::engine::AiLevel;
use crate::error::{EngineError, Result};
use crate::rules::{Move, MoveKind, Outcome, WinCondition, MIN_ALIGN_LENGTH};

use super::state::{GameState, PlayerData};

/// Starting player value that draws the first player at random
pub const RANDOM_STARTING_PLAYER: &str = "Random";

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Who drives a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    #[default]
    Human,
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl PlayerKind {
    /// Engine level for computer players, `None` for humans
    pub fn ai_level(self) -> Option<AiLevel> {
        match self {
            PlayerKind::Human => None,
            PlayerKind::Easy => Some(AiLevel::Easy),
            PlayerKind::Medium => Some(AiLevel::Medium),
            PlayerKind::Hard => Some(AiLevel::Hard),
            PlayerKind::Impossible => Some(AiLevel::Impossible),
        }
    }
}

/// A participant: identity, token and driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub symbol: Symbol,
    #[serde(rename = "type", default)]
    pub kind: PlayerKind,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol.to_char())
    }
}

/// Board shape as written in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeConfig {
    #[default]
    None,
    Pyramidal,
    Circular,
    Diamond,
    /// One of the three shapes, drawn uniformly
    RandomShape,
    /// Rectangle with `blockedCases` random blocked cells
    RandomBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    None,
    /// Each player starts with one bomb
    Bomb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    pub shape: ShapeConfig,
    /// Only used with the `random-block` shape
    pub blocked_cases: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            shape: ShapeConfig::None,
            blocked_cases: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulesConfig {
    /// Alignment length
    pub nb_symbols: usize,
    /// `false` plays misère: aligning loses
    pub align_to_win: bool,
    /// A player name, or `"Random"`
    pub starting_player: String,
    pub gamemode: GameMode,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            nb_symbols: 3,
            align_to_win: true,
            starting_player: default_player1().name,
            gamemode: GameMode::None,
        }
    }
}

fn default_player1() -> Player {
    Player {
        name: "Player 1".to_string(),
        symbol: Symbol::Cross,
        kind: PlayerKind::Human,
    }
}

fn default_player2() -> Player {
    Player {
        name: "Player 2".to_string(),
        symbol: Symbol::Circle,
        kind: PlayerKind::Human,
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_player1")]
    pub player1: Player,
    #[serde(default = "default_player2")]
    pub player2: Player,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub game: RulesConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player1: default_player1(),
            player2: default_player2(),
            board: BoardConfig::default(),
            game: RulesConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Check value ranges without building anything
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfiguration(msg));

        let (w, h) = (self.board.width, self.board.height);
        if !(MIN_SIDE..=MAX_SIDE).contains(&w) || !(MIN_SIDE..=MAX_SIDE).contains(&h) {
            return invalid(format!(
                "board sides must be between {} and {}, got {}x{}",
                MIN_SIDE, MAX_SIDE, w, h
            ));
        }
        if w * h > MAX_CELLS {
            return invalid(format!("board {}x{} exceeds {} cells", w, h, MAX_CELLS));
        }
        if self.game.nb_symbols < MIN_ALIGN_LENGTH {
            return invalid(format!(
                "alignment length must be at least {}, got {}",
                MIN_ALIGN_LENGTH, self.game.nb_symbols
            ));
        }
        if self.board.shape == ShapeConfig::RandomBlock && self.board.blocked_cases > w * h {
            return invalid(format!(
                "cannot block {} cells on a {}x{} board",
                self.board.blocked_cases, w, h
            ));
        }
        if self.player1.symbol == self.player2.symbol {
            return invalid(format!("both players use the {} symbol", self.player1.symbol));
        }
        Ok(())
    }

    pub fn players(&self) -> [&Player; 2] {
        [&self.player1, &self.player2]
    }

    pub fn win_condition(&self) -> Result<WinCondition> {
        if self.game.align_to_win {
            WinCondition::align(self.game.nb_symbols)
        } else {
            WinCondition::misere(self.game.nb_symbols)
        }
    }

    /// Index of the first player, drawing from `rng` for `"Random"`
    pub fn starting_player<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let name = self.game.starting_player.as_str();
        if name == RANDOM_STARTING_PLAYER {
            return Ok(rng.gen_range(0..2));
        }
        self.players()
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| EngineError::UnknownPlayer(name.to_string()))
    }
}

/// A game created from a [`GameConfig`]: the state plus who is playing.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    state: GameState,
    players: Vec<Player>,
}

impl Game {
    /// Build the board, rules and players described by `config`.
    ///
    /// `rng` draws the random shape, the random blocked cells and a random
    /// starting player.
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let players: Vec<Player> = config.players().into_iter().cloned().collect();
        let symbols: Vec<Symbol> = players.iter().map(|p| p.symbol).collect();

        let mut builder = BoardBuilder::new(symbols, config.board.width, config.board.height);
        builder = match config.board.shape {
            ShapeConfig::None => builder,
            ShapeConfig::Pyramidal => builder.shape(Shape::Pyramidal),
            ShapeConfig::Circular => builder.shape(Shape::Circular),
            ShapeConfig::Diamond => builder.shape(Shape::Diamond),
            ShapeConfig::RandomShape => match Shape::ALL.choose(rng) {
                Some(&shape) => builder.shape(shape),
                None => builder,
            },
            ShapeConfig::RandomBlock => builder.random_blocks(config.board.blocked_cases),
        };
        let board = builder.build(rng)?;

        let power_ups: &[MoveKind] = match config.game.gamemode {
            GameMode::None => &[],
            GameMode::Bomb => &[MoveKind::Bomb],
        };
        let player_data = vec![PlayerData::new(power_ups); players.len()];

        let win = config.win_condition()?;
        let start = config.starting_player(rng)?;
        let state = GameState::new(board, win, player_data, start)?;

        info!(
            "new {}x{} game, {}, {} vs {}, {} starts",
            config.board.width, config.board.height, win, players[0], players[1], players[start]
        );
        Ok(Self { state, players })
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Player whose turn it is
    pub fn current_player(&self) -> &Player {
        &self.players[self.state.current_player()]
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.state.possible_moves()
    }

    pub fn outcome(&self) -> Outcome {
        self.state.check_win()
    }

    /// Play `mv` for the current player
    pub fn play(&mut self, mv: Move) -> Result<Outcome> {
        let mover = self.state.current_player();
        let outcome = self.state.play(mv)?;
        info!("{} plays {}", self.players[mover], mv);
        match outcome {
            Outcome::Victory(p) => info!("{} wins", self.players[p]),
            Outcome::Draw => info!("draw"),
            Outcome::Unfinished => {}
        }
        Ok(outcome)
    }

    pub fn undo(&mut self) -> Result<Move> {
        let mv = self.state.undo()?;
        info!("undo {}", mv);
        Ok(mv)
    }

    pub fn go_back(&mut self) -> Result<Move> {
        self.state.go_back()
    }

    pub fn go_next(&mut self) -> Result<Move> {
        self.state.go_next()
    }
}
