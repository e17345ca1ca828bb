//! Game session - ties the grid, sequencer and controller together
//!
//! One `update` call per rendered frame: sample the input snapshot, advance
//! the falling piece, and when it settles merge it into the grid, clear
//! completed rows, score, and spawn the next piece. Game over is sticky:
//! once set, every input and tick is a no-op.

use serde::Serialize;

use crate::catalog::PieceCatalog;
use crate::config::SessionConfig;
use crate::controller::{ActivePiece, ActivePieceController, Advance, HeldPiece};
use crate::grid::PlayfieldGrid;
use crate::rng::{RandomSource, SimpleRng, SpawnSequencer};
use crate::scoring::{calculate_level, calculate_line_score};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{InputFrame, MoveDirection, PieceKind};

/// Outcome of one lock (or of the merge that ended the game)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockEvent {
    pub piece: PieceKind,
    pub rows_cleared: u32,
    pub points: u32,
    pub score: u32,
    pub game_over: bool,
}

#[derive(Debug, Clone)]
pub struct GameSession<R: RandomSource = SimpleRng> {
    config: SessionConfig,
    catalog: PieceCatalog,
    sequencer: SpawnSequencer<R>,
    grid: PlayfieldGrid,
    controller: ActivePieceController,
    held: Option<HeldPiece>,
    score: u32,
    lines: u32,
    pieces_locked: u32,
    started: bool,
    game_over: bool,
    last_event: Option<LockEvent>,
}

impl GameSession<SimpleRng> {
    /// Standard catalog and default tuning with the given seed
    pub fn new(seed: u32) -> Self {
        Self::with_config(SessionConfig::default().with_seed(seed))
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_parts(config, PieceCatalog::standard(), SimpleRng::new(config.seed))
    }

    /// Start over on an empty grid, continuing the generator's sequence
    pub fn restart(&mut self) {
        let seed = self.sequencer.rng().state();
        let config = self.config.with_seed(seed);
        *self = Self::with_parts(config, self.catalog.clone(), SimpleRng::new(seed));
        self.start();
    }
}

impl<R: RandomSource + Clone> GameSession<R> {
    pub fn with_parts(config: SessionConfig, catalog: PieceCatalog, rng: R) -> Self {
        let sequencer = SpawnSequencer::new(catalog.count(), rng);
        Self {
            config,
            catalog,
            sequencer,
            grid: PlayfieldGrid::new(),
            controller: ActivePieceController::new(config.speeds),
            held: None,
            score: 0,
            lines: 0,
            pieces_locked: 0,
            started: false,
            game_over: false,
            last_event: None,
        }
    }

    /// Replace the starting grid (puzzle setups, tests)
    pub fn with_grid(mut self, grid: PlayfieldGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Spawn the first piece
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.spawn_next();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        calculate_level(self.lines)
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> &PlayfieldGrid {
        &self.grid
    }

    pub fn controller(&self) -> &ActivePieceController {
        &self.controller
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.controller.active()
    }

    pub fn held(&self) -> Option<&HeldPiece> {
        self.held.as_ref()
    }

    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held.map(|h| h.kind)
    }

    pub fn can_swap(&self) -> bool {
        self.controller.can_swap()
    }

    /// Kind of the piece the next spawn will produce
    pub fn next_piece(&self) -> Option<PieceKind> {
        if self.game_over {
            return None;
        }
        Some(self.catalog.shape_at(self.sequencer.peek()).kind)
    }

    fn spawn_next(&mut self) {
        let index = self.sequencer.next();
        let piece = ActivePiece::spawn(index, self.catalog.shape_at(index));
        self.controller.activate(piece);
    }

    fn playing(&self) -> bool {
        self.started && !self.game_over
    }

    pub fn move_left(&mut self) -> bool {
        self.playing() && self.controller.try_move(MoveDirection::Left, &self.grid)
    }

    pub fn move_right(&mut self) -> bool {
        self.playing() && self.controller.try_move(MoveDirection::Right, &self.grid)
    }

    pub fn rotate(&mut self) -> bool {
        self.playing() && self.controller.try_rotate(&self.grid)
    }

    pub fn soft_drop_on(&mut self) {
        if self.playing() {
            self.controller.set_soft_drop(true);
        }
    }

    pub fn soft_drop_off(&mut self) {
        if self.playing() {
            self.controller.set_soft_drop(false);
        }
    }

    /// Swap the active piece with the hold slot (once per lock)
    pub fn hold(&mut self) -> bool {
        if !self.playing() {
            return false;
        }
        let sequencer = &mut self.sequencer;
        let catalog = &self.catalog;
        self.controller.hold(&mut self.held, || {
            let index = sequencer.next();
            ActivePiece::spawn(index, catalog.shape_at(index))
        })
    }

    /// Apply one tick's input snapshot without advancing time
    pub fn apply_input(&mut self, input: &InputFrame) {
        if !self.playing() {
            return;
        }
        if input.hold {
            self.hold();
        }
        if input.rotate {
            self.rotate();
        }
        match (input.left, input.right) {
            (true, false) => {
                self.move_left();
            }
            (false, true) => {
                self.move_right();
            }
            _ => {}
        }
        self.controller.set_soft_drop(input.soft_drop);
    }

    /// Advance time by `dt` seconds. Returns true if a piece locked.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing() {
            return false;
        }
        match self.controller.advance(dt, &self.grid) {
            Advance::Settled => {
                self.merge();
                true
            }
            Advance::Moving | Advance::Idle => false,
        }
    }

    /// Per-frame entry point: input, then movement, then merge if settled
    pub fn update(&mut self, dt: f32, input: &InputFrame) -> bool {
        self.apply_input(input);
        self.advance(dt)
    }

    /// Lock the settled piece into the grid.
    ///
    /// A cell at or above the top row, or on an occupied cell, ends the game
    /// without writing anything.
    fn merge(&mut self) {
        let Some(piece) = self.controller.take() else {
            return;
        };
        let cells = piece.board_cells();

        if !self.grid.lock_cells(&cells, piece.kind) {
            self.game_over = true;
            self.controller.set_soft_drop(false);
            self.last_event = Some(LockEvent {
                piece: piece.kind,
                rows_cleared: 0,
                points: 0,
                score: self.score,
                game_over: true,
            });
            return;
        }

        let min_row = cells.iter().map(|&(_, row)| row).min().unwrap_or(0);
        let max_row = cells.iter().map(|&(_, row)| row).max().unwrap_or(0);
        let rows = self.grid.clear_completed_rows(min_row, max_row);

        self.lines = self.lines.saturating_add(rows as u32);
        let points = calculate_line_score(rows, self.level());
        self.score = self.score.saturating_add(points);

        self.pieces_locked = self.pieces_locked.saturating_add(1);
        self.controller
            .set_speed_multiplier(1.0 + self.config.speed_increase * self.pieces_locked as f32);
        self.controller.enable_swap();

        self.last_event = Some(LockEvent {
            piece: piece.kind,
            rows_cleared: rows as u32,
            points,
            score: self.score,
            game_over: false,
        });

        self.spawn_next();
    }

    /// Take and clear the last lock event
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.grid.write_u8_grid(&mut out.board);
        out.active = self.controller.active().map(ActiveSnapshot::from);
        out.held = self.held_piece();
        out.next = self.next_piece();
        out.can_swap = self.can_swap();
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level();
        out.game_over = self.game_over;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for GameSession<SimpleRng> {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SPAWN_COL, SPAWN_ROW};

    const DT: f32 = 1.0 / 60.0;

    fn run_until_lock(session: &mut GameSession) {
        for _ in 0..100_000 {
            if session.advance(DT) {
                return;
            }
        }
        panic!("no lock");
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new(12345);
        assert!(!session.started());
        assert!(!session.is_game_over());
        assert_eq!(session.score(), 0);
        assert!(session.active().is_none());
        assert!(session.held_piece().is_none());
        assert!(session.can_swap());
    }

    #[test]
    fn test_start_spawns_at_anchor() {
        let mut session = GameSession::new(12345);
        session.start();
        let piece = session.active().unwrap();
        assert_eq!((piece.target_col, piece.target_row), (SPAWN_COL, SPAWN_ROW));

        // start is idempotent
        let kind = piece.kind;
        session.start();
        assert_eq!(session.active().unwrap().kind, kind);
    }

    #[test]
    fn test_inputs_before_start_are_ignored() {
        let mut session = GameSession::new(1);
        assert!(!session.move_left());
        assert!(!session.rotate());
        assert!(!session.hold());
        assert!(!session.advance(DT));
    }

    #[test]
    fn test_next_piece_matches_spawn() {
        let mut session = GameSession::new(777);
        session.start();
        for _ in 0..5 {
            let next = session.next_piece();
            run_until_lock(&mut session);
            assert_eq!(session.active().map(|p| p.kind), next);
        }
    }

    #[test]
    fn test_lock_reenables_swap_and_ramps_speed() {
        let mut session = GameSession::new(5);
        session.start();
        assert!(session.hold());
        assert!(!session.can_swap());
        run_until_lock(&mut session);
        assert!(session.can_swap());
        assert_eq!(session.pieces_locked(), 1);
        assert!(session.controller().speed_multiplier() > 1.0);

        let event = session.take_last_event().unwrap();
        assert!(!event.game_over);
        assert_eq!(event.rows_cleared, 0);
        assert!(session.take_last_event().is_none());
    }

    #[test]
    fn test_update_applies_soft_drop_level() {
        let mut session = GameSession::new(5);
        session.start();
        let held_down = InputFrame {
            soft_drop: true,
            ..InputFrame::default()
        };
        session.update(DT, &held_down);
        assert!(session.controller().soft_drop());
        session.update(DT, &InputFrame::default());
        assert!(!session.controller().soft_drop());

        session.soft_drop_on();
        assert!(session.controller().soft_drop());
        session.soft_drop_off();
        assert!(!session.controller().soft_drop());
    }

    #[test]
    fn test_soft_drop_ignored_before_start() {
        let mut session = GameSession::new(5);
        session.soft_drop_on();
        assert!(!session.controller().soft_drop());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = GameSession::new(3);
        session.start();
        run_until_lock(&mut session);
        let snap = session.snapshot();
        assert_eq!(snap.locked_cells().count(), 4);
        assert!(snap.active.is_some());
        assert!(snap.next.is_some());
        assert!(snap.playable());
        assert_eq!(snap.score, session.score());
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut session = GameSession::new(3);
        session.start();
        run_until_lock(&mut session);
        session.restart();
        assert!(session.started());
        assert!(session.grid().is_empty());
        assert_eq!(session.pieces_locked(), 0);
        assert_eq!(session.score(), 0);
        assert!(session.active().is_some());
    }
}
