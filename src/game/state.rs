//! Game state: board, rules, players and history

use crate::board::Board;
use crate::error::{EngineError, Result};
use crate::rules::{apply, revert, Move, MoveKind, Outcome, WinCondition};

use super::history::GameHistory;

/// Per-player data: the power-ups still available
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerData {
    /// Sorted multiset of power-up kinds
    power_ups: Vec<MoveKind>,
}

impl PlayerData {
    /// Player holding `power_ups`; simple moves are always allowed and ignored here
    pub fn new(power_ups: &[MoveKind]) -> Self {
        let mut power_ups: Vec<MoveKind> =
            power_ups.iter().copied().filter(|k| k.is_power_up()).collect();
        power_ups.sort_unstable();
        Self { power_ups }
    }

    pub fn power_ups(&self) -> &[MoveKind] {
        &self.power_ups
    }

    #[inline]
    pub fn has_power_up(&self, kind: MoveKind) -> bool {
        self.power_ups.contains(&kind)
    }

    fn consume(&mut self, kind: MoveKind) {
        if let Some(i) = self.power_ups.iter().position(|&k| k == kind) {
            self.power_ups.remove(i);
        }
    }

    fn restore(&mut self, kind: MoveKind) {
        let i = self.power_ups.partition_point(|&k| k < kind);
        self.power_ups.insert(i, kind);
    }

    /// Move kinds this player may choose from, simple first
    fn kinds(&self) -> Vec<MoveKind> {
        let mut kinds = vec![MoveKind::Simple];
        for &kind in &self.power_ups {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

/// Complete state of a game in progress.
///
/// Every mutation goes through [`play`](Self::play), [`undo`](Self::undo),
/// [`go_back`](Self::go_back) or [`go_next`](Self::go_next); each validates
/// before touching anything, so a failed call leaves the state as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    win: WinCondition,
    players: Vec<PlayerData>,
    current: usize,
    history: GameHistory,
}

impl GameState {
    pub fn new(
        board: Board,
        win: WinCondition,
        players: Vec<PlayerData>,
        starting_player: usize,
    ) -> Result<Self> {
        if players.len() != board.player_count() {
            return Err(EngineError::InvalidConfiguration(format!(
                "{} player records for {} players",
                players.len(),
                board.player_count()
            )));
        }
        board.check_player(starting_player)?;

        Ok(Self {
            board,
            win,
            players,
            current: starting_player,
            history: GameHistory::new(),
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn win_condition(&self) -> &WinCondition {
        &self.win
    }

    pub fn players(&self) -> &[PlayerData] {
        &self.players
    }

    pub fn player(&self, player: usize) -> Result<&PlayerData> {
        self.players
            .get(player)
            .ok_or_else(|| EngineError::UnknownPlayer(format!("index {}", player)))
    }

    /// Index of the player to move
    #[inline]
    pub fn current_player(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    /// Check that the player to move may play `mv` here
    fn validate(&self, mv: Move) -> Result<()> {
        let kind = mv.kind();
        if kind.is_power_up() && !self.players[self.current].has_power_up(kind) {
            return Err(EngineError::InvalidMove(format!(
                "player {} has no {} left",
                self.current, kind
            )));
        }
        if !mv.can_play(&self.board) {
            return Err(EngineError::InvalidMove(format!("{} cannot be played", mv)));
        }
        Ok(())
    }

    /// Play `mv` for the current player and pass the turn.
    ///
    /// Returns the outcome as seen from the mover's alignments. Any moves
    /// previously undone with `go_back` are discarded.
    pub fn play(&mut self, mv: Move) -> Result<Outcome> {
        self.validate(mv)?;

        let player = self.current;
        let record = apply(&mut self.board, mv, player)?;
        self.history.add_move(record);
        if mv.kind().is_power_up() {
            self.players[player].consume(mv.kind());
        }

        let outcome = self.win.check_win_for_player(player, &self.board)?;
        self.current = (player + 1) % self.players.len();
        Ok(outcome)
    }

    /// Remove the last applied move for good.
    ///
    /// The redo tail, if any, is discarded first.
    pub fn undo(&mut self) -> Result<Move> {
        let record = *self.history.current().ok_or(EngineError::EmptyHistory)?;
        revert(&mut self.board, &record)?;

        self.history.truncate_redo();
        self.history.undo()?;
        self.restore_turn(record.mv, record.player);
        Ok(record.mv)
    }

    /// Take back the last applied move, keeping it for [`go_next`](Self::go_next)
    pub fn go_back(&mut self) -> Result<Move> {
        let record = *self.history.current().ok_or(EngineError::EmptyHistory)?;
        revert(&mut self.board, &record)?;

        self.history.go_back()?;
        self.restore_turn(record.mv, record.player);
        Ok(record.mv)
    }

    /// Replay the move after the cursor
    pub fn go_next(&mut self) -> Result<Move> {
        let record = *self.history.upcoming().ok_or(EngineError::EmptyHistory)?;
        let replayed = apply(&mut self.board, record.mv, record.player)?;
        debug_assert_eq!(replayed, record);

        self.history.go_next()?;
        if record.mv.kind().is_power_up() {
            self.players[record.player].consume(record.mv.kind());
        }
        self.current = (record.player + 1) % self.players.len();
        Ok(record.mv)
    }

    fn restore_turn(&mut self, mv: Move, player: usize) {
        if mv.kind().is_power_up() {
            self.players[player].restore(mv.kind());
        }
        self.current = player;
    }

    /// Legal moves for the current player, cell by cell in row-major order
    pub fn possible_moves(&self) -> Vec<Move> {
        let kinds = self.players[self.current].kinds();
        self.board
            .positions()
            .flat_map(|pos| {
                kinds
                    .iter()
                    .filter(move |kind| kind.can_play(&self.board, pos))
                    .map(move |&kind| Move::new(kind, pos))
            })
            .collect()
    }

    /// Outcome of the position over all players
    pub fn check_win(&self) -> Outcome {
        self.win.check_win(&self.board)
    }

    pub fn check_win_for_player(&self, player: usize) -> Result<Outcome> {
        self.win.check_win_for_player(player, &self.board)
    }

    /// Heuristic score for `player`, strictly inside (-1, 1)
    pub fn evaluate_for_player(&self, player: usize) -> Result<f64> {
        self.win.evaluate_for_player(player, &self.board)
    }

    /// Score of a decided game. Falls as pieces accumulate, so quicker
    /// wins score higher, and is always at least 1.
    pub fn win_reward(&self) -> f64 {
        let cells = self.board.cell_count() as u32 + 3;
        f64::from(cells.saturating_sub(self.board.piece_count()) / 2)
    }
}
