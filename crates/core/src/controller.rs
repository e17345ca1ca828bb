//! Active piece controller - the falling piece state machine
//!
//! The controller owns at most one falling piece. Each piece has an integer
//! target cell (where it is committed to be) and a continuous position that
//! tweens toward that target for smooth rendering. Gravity commits the target
//! one row lower whenever the piece is close enough to its current target and
//! the row below is free. When the piece sits exactly on its target with no
//! rotation animation left and nowhere to fall, `advance` reports it settled
//! and the owner merges it into the grid in the same tick.

use arrayvec::ArrayVec;

use crate::catalog::{PieceTemplate, ShapeGrid};
use crate::grid::PlayfieldGrid;
use crate::types::{
    MoveDirection, PieceKind, FAST_FALL_SPEED, GRID_HEIGHT, GRID_WIDTH, MAX_SHAPE_SIZE,
    QUARTER_TURN_DEGREES, ROTATION_SPEED, SIDE_SPEED, SLOW_FALL_SPEED, SPAWN_COL, SPAWN_ROW,
};

/// Board cells covered by a piece (at most a full 4x4 grid)
pub type PieceCells = ArrayVec<(i8, i8), { MAX_SHAPE_SIZE * MAX_SHAPE_SIZE }>;

/// Kick candidates tried in order: in place, one right, one left
const KICK_OFFSETS: [i8; 3] = [0, 1, -1];

/// Per-second speeds for the tweens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSpeeds {
    /// Horizontal tween, cells/s
    pub side: f32,
    /// Gravity, cells/s
    pub slow_fall: f32,
    /// Gravity while soft drop is held, cells/s
    pub fast_fall: f32,
    /// Rotation animation, degrees/s
    pub rotation: f32,
}

impl Default for MotionSpeeds {
    fn default() -> Self {
        Self {
            side: SIDE_SPEED,
            slow_fall: SLOW_FALL_SPEED,
            fast_fall: FAST_FALL_SPEED,
            rotation: ROTATION_SPEED,
        }
    }
}

/// Whether `shape` anchored at (col, row) can sit on the grid.
///
/// Occupied local cells fail on walls, the floor or locked cells; cells at or
/// above the top row are ignored so pieces can protrude while entering.
pub fn fits(shape: &ShapeGrid, col: i8, row: i8, grid: &PlayfieldGrid) -> bool {
    shape.cells().all(|(i, j)| {
        let c = col + i;
        let r = row + j;
        if c < 0 || c >= GRID_WIDTH as i8 || r < 0 {
            return false;
        }
        r >= GRID_HEIGHT as i8 || !grid.is_occupied(c, r)
    })
}

/// Move `current` toward `target` by at most `step`, snapping when within reach
fn approach(current: f32, target: f32, step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step.copysign(delta)
    }
}

/// The currently falling piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Catalog index the piece was spawned from
    pub template_index: usize,
    shape: ShapeGrid,
    quarter_turns: u8,
    pub target_col: i8,
    pub target_row: i8,
    /// Continuous position of the local grid origin, in cells
    pub x: f32,
    pub y: f32,
    /// Rotation animation still to play, degrees
    pending_angle: f32,
}

impl ActivePiece {
    /// New piece at the spawn anchor in its template orientation
    pub fn spawn(template_index: usize, template: &PieceTemplate) -> Self {
        Self {
            kind: template.kind,
            template_index,
            shape: template.shape,
            quarter_turns: 0,
            target_col: SPAWN_COL,
            target_row: SPAWN_ROW,
            x: SPAWN_COL as f32,
            y: SPAWN_ROW as f32,
            pending_angle: 0.0,
        }
    }

    /// Same piece resting exactly on (col, row) with no tween in progress
    pub fn placed_at(mut self, col: i8, row: i8) -> Self {
        self.target_col = col;
        self.target_row = row;
        self.x = col as f32;
        self.y = row as f32;
        self
    }

    /// Current orientation's occupancy
    pub fn shape(&self) -> &ShapeGrid {
        &self.shape
    }

    /// Clockwise quarter turns applied since spawn (0..=3)
    pub fn quarter_turns(&self) -> u8 {
        self.quarter_turns
    }

    pub fn is_rotating(&self) -> bool {
        self.pending_angle > 0.0
    }

    /// Visual clockwise rotation in degrees, lagging the logical
    /// orientation while the animation plays
    pub fn angle(&self) -> f32 {
        (self.quarter_turns as f32 * QUARTER_TURN_DEGREES - self.pending_angle).rem_euclid(360.0)
    }

    /// Board cells the piece covers at its target anchor
    pub fn board_cells(&self) -> PieceCells {
        self.shape
            .cells()
            .map(|(i, j)| (self.target_col + i, self.target_row + j))
            .collect()
    }
}

/// A piece set aside by the player, orientation preserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldPiece {
    pub kind: PieceKind,
    pub template_index: usize,
    shape: ShapeGrid,
    quarter_turns: u8,
}

impl HeldPiece {
    pub fn shape(&self) -> &ShapeGrid {
        &self.shape
    }

    /// Bring the piece back into play at the spawn anchor
    fn respawn(self) -> ActivePiece {
        ActivePiece {
            kind: self.kind,
            template_index: self.template_index,
            shape: self.shape,
            quarter_turns: self.quarter_turns,
            target_col: SPAWN_COL,
            target_row: SPAWN_ROW,
            x: SPAWN_COL as f32,
            y: SPAWN_ROW as f32,
            pending_angle: 0.0,
        }
    }
}

impl From<ActivePiece> for HeldPiece {
    fn from(piece: ActivePiece) -> Self {
        Self {
            kind: piece.kind,
            template_index: piece.template_index,
            shape: piece.shape,
            quarter_turns: piece.quarter_turns,
        }
    }
}

/// Result of one `advance` step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No piece is falling
    Idle,
    /// The piece moved, fell or animated this tick
    Moving,
    /// The piece is settled and must be merged now
    Settled,
}

#[derive(Debug, Clone)]
pub struct ActivePieceController {
    piece: Option<ActivePiece>,
    can_swap: bool,
    soft_drop: bool,
    speeds: MotionSpeeds,
    speed_multiplier: f32,
}

impl ActivePieceController {
    pub fn new(speeds: MotionSpeeds) -> Self {
        Self {
            piece: None,
            can_swap: true,
            soft_drop: false,
            speeds,
            speed_multiplier: 1.0,
        }
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.piece.is_some()
    }

    /// Start controlling a new piece
    pub fn activate(&mut self, piece: ActivePiece) {
        self.piece = Some(piece);
    }

    /// Hand the piece over to the caller (for merging), leaving the
    /// controller inactive
    pub fn take(&mut self) -> Option<ActivePiece> {
        self.piece.take()
    }

    pub fn can_swap(&self) -> bool {
        self.can_swap
    }

    /// Re-enable holding; called after every successful lock
    pub fn enable_swap(&mut self) {
        self.can_swap = true;
    }

    pub fn soft_drop(&self) -> bool {
        self.soft_drop
    }

    pub fn set_soft_drop(&mut self, on: bool) {
        self.soft_drop = on;
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier.max(0.0);
    }

    /// Base fall speed in cells/s, before the multiplier
    pub fn fall_speed(&self) -> f32 {
        if self.soft_drop {
            self.speeds.fast_fall
        } else {
            self.speeds.slow_fall
        }
    }

    /// Whether the active piece, as currently oriented, fits at (col, row)
    pub fn can_occupy(&self, col: i8, row: i8, grid: &PlayfieldGrid) -> bool {
        match self.piece {
            Some(ref piece) => fits(&piece.shape, col, row, grid),
            None => false,
        }
    }

    /// Shift the target column by one.
    ///
    /// Ignored while the piece is still tweening toward its current column or
    /// when the shifted shape would collide.
    pub fn try_move(&mut self, direction: MoveDirection, grid: &PlayfieldGrid) -> bool {
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        if piece.x != piece.target_col as f32 {
            return false;
        }
        let col = piece.target_col + direction.dx();
        if !fits(&piece.shape, col, piece.target_row, grid) {
            return false;
        }
        piece.target_col = col;
        true
    }

    /// Rotate a quarter turn clockwise with a one-column wall kick.
    ///
    /// Candidates are tried in place, then one column right, then one column
    /// left. A rejected rotation leaves the piece unchanged.
    pub fn try_rotate(&mut self, grid: &PlayfieldGrid) -> bool {
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        if piece.is_rotating() {
            return false;
        }

        let rotated = piece.shape.rotated_cw();
        let Some(offset) = KICK_OFFSETS
            .iter()
            .copied()
            .find(|&dx| fits(&rotated, piece.target_col + dx, piece.target_row, grid))
        else {
            return false;
        };

        piece.shape = rotated;
        piece.quarter_turns = (piece.quarter_turns + 1) % 4;
        piece.target_col += offset;
        piece.pending_angle = QUARTER_TURN_DEGREES;
        true
    }

    /// Swap the active piece into the hold slot.
    ///
    /// With an empty slot the replacement comes from `spawn`; otherwise the
    /// held piece comes back at the spawn anchor. No-op when a swap already
    /// happened since the last lock or nothing is falling.
    pub fn hold(
        &mut self,
        held: &mut Option<HeldPiece>,
        spawn: impl FnOnce() -> ActivePiece,
    ) -> bool {
        if !self.can_swap {
            return false;
        }
        let Some(active) = self.piece.take() else {
            return false;
        };

        let next = match held.take() {
            Some(previous) => previous.respawn(),
            None => spawn(),
        };
        *held = Some(HeldPiece::from(active));
        self.piece = Some(next);
        self.can_swap = false;
        true
    }

    /// Advance the falling piece by `dt` seconds.
    pub fn advance(&mut self, dt: f32, grid: &PlayfieldGrid) -> Advance {
        let dt = dt.max(0.0);
        let fall_step = self.fall_speed() * self.speed_multiplier * dt;
        let side_step = self.speeds.side * self.speed_multiplier * dt;
        let rotation_step = self.speeds.rotation * dt;

        let Some(piece) = self.piece.as_mut() else {
            return Advance::Idle;
        };

        piece.x = approach(piece.x, piece.target_col as f32, side_step);

        // Gravity: commit one row lower once within a tick's fall of the target
        let mut dy = piece.target_row as f32 - piece.y;
        if dy >= -fall_step && fits(&piece.shape, piece.target_col, piece.target_row - 1, grid) {
            piece.target_row -= 1;
            dy = piece.target_row as f32 - piece.y;
        }

        if dy == 0.0 && piece.x == piece.target_col as f32 && !piece.is_rotating() {
            return Advance::Settled;
        }

        piece.y = approach(piece.y, piece.target_row as f32, fall_step);

        if piece.is_rotating() {
            let angle = rotation_step.min(piece.pending_angle);
            piece.pending_angle -= angle;
        }

        Advance::Moving
    }
}

impl Default for ActivePieceController {
    fn default() -> Self {
        Self::new(MotionSpeeds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceCatalog;

    const DT: f32 = 1.0 / 60.0;

    fn piece(kind: PieceKind) -> ActivePiece {
        let catalog = PieceCatalog::standard();
        let index = catalog
            .iter()
            .position(|t| t.kind == kind)
            .unwrap();
        ActivePiece::spawn(index, catalog.shape_at(index))
    }

    fn controller_with(piece: ActivePiece) -> ActivePieceController {
        let mut controller = ActivePieceController::default();
        controller.activate(piece);
        controller
    }

    #[test]
    fn test_spawn_anchor() {
        let p = piece(PieceKind::T);
        assert_eq!((p.target_col, p.target_row), (SPAWN_COL, SPAWN_ROW));
        assert_eq!((p.x, p.y), (3.0, 20.0));
        assert_eq!(p.quarter_turns(), 0);
        assert_eq!(p.angle(), 0.0);
    }

    #[test]
    fn test_fits_walls_floor_and_sky() {
        let grid = PlayfieldGrid::new();
        let i = piece(PieceKind::I);
        // Horizontal bar lives on local row 2, columns 0..=3
        assert!(fits(i.shape(), 0, 0, &grid));
        assert!(fits(i.shape(), 6, 0, &grid));
        assert!(!fits(i.shape(), -1, 0, &grid));
        assert!(!fits(i.shape(), 7, 0, &grid));
        assert!(fits(i.shape(), 0, -2, &grid));
        assert!(!fits(i.shape(), 0, -3, &grid));
        // Entirely above the board
        assert!(fits(i.shape(), 3, 40, &grid));
    }

    #[test]
    fn test_fits_locked_cells() {
        let mut grid = PlayfieldGrid::new();
        grid.occupy(4, 0, PieceKind::O);
        let i = piece(PieceKind::I);
        assert!(!fits(i.shape(), 3, -2, &grid));
        assert!(fits(i.shape(), 5, -2, &grid));
        assert!(fits(i.shape(), 3, -1, &grid));
    }

    #[test]
    fn test_move_shifts_target() {
        let grid = PlayfieldGrid::new();
        let mut c = controller_with(piece(PieceKind::T).placed_at(4, 10));
        assert!(c.try_move(MoveDirection::Left, &grid));
        assert_eq!(c.active().unwrap().target_col, 3);
        // Continuous x still at 4: mid-tween moves are ignored
        assert!(!c.try_move(MoveDirection::Left, &grid));
        assert_eq!(c.active().unwrap().target_col, 3);
    }

    #[test]
    fn test_move_blocked_by_wall() {
        let grid = PlayfieldGrid::new();
        let mut c = controller_with(piece(PieceKind::T).placed_at(0, 10));
        assert!(!c.try_move(MoveDirection::Left, &grid));
        let mut c = controller_with(piece(PieceKind::T).placed_at(7, 10));
        assert!(!c.try_move(MoveDirection::Right, &grid));
        assert!(c.try_move(MoveDirection::Left, &grid));
    }

    #[test]
    fn test_rotation_full_cycle_restores_shape() {
        let grid = PlayfieldGrid::new();
        for kind in PieceKind::ALL {
            let start = piece(kind).placed_at(3, 8);
            let mut c = controller_with(start);
            for _ in 0..4 {
                assert!(c.try_rotate(&grid), "{:?}", kind);
                // Finish the animation so the next rotation is accepted
                while c.active().unwrap().is_rotating() {
                    c.advance(DT, &grid);
                }
            }
            let end = c.active().unwrap();
            assert_eq!(end.shape(), start.shape(), "{:?}", kind);
            assert_eq!(end.target_col, start.target_col, "{:?}", kind);
            assert_eq!(end.quarter_turns(), 0);
        }
    }

    #[test]
    fn test_rotation_ignored_while_animating() {
        let grid = PlayfieldGrid::new();
        let mut c = controller_with(piece(PieceKind::T).placed_at(3, 8));
        assert!(c.try_rotate(&grid));
        let after_first = *c.active().unwrap();
        assert!(!c.try_rotate(&grid));
        assert_eq!(*c.active().unwrap(), after_first);
        assert_eq!(after_first.angle(), 0.0);
    }

    #[test]
    fn test_rotation_kicks_right_off_left_wall() {
        let grid = PlayfieldGrid::new();
        let mut p = piece(PieceKind::I);
        // Three turns: vertical bar in local column 1
        for _ in 0..3 {
            p.shape = p.shape.rotated_cw();
        }
        p.quarter_turns = 3;
        let mut c = controller_with(p.placed_at(-1, 5));
        assert!(c.can_occupy(-1, 5, &grid));

        assert!(c.try_rotate(&grid));
        let rotated = c.active().unwrap();
        assert_eq!(rotated.target_col, 0);
        let cells: Vec<_> = rotated.board_cells().into_iter().collect();
        assert_eq!(cells, vec![(0, 7), (1, 7), (2, 7), (3, 7)]);
    }

    #[test]
    fn test_rotation_kicks_left_off_right_wall() {
        let grid = PlayfieldGrid::new();
        let mut p = piece(PieceKind::I);
        // One turn: vertical bar in local column 2, flush against the right wall
        p.shape = p.shape.rotated_cw();
        p.quarter_turns = 1;
        let mut c = controller_with(p.placed_at(7, 5));
        assert!(c.can_occupy(7, 5, &grid));

        // In place and one right both overhang the wall
        assert!(c.try_rotate(&grid));
        let rotated = c.active().unwrap();
        assert_eq!(rotated.target_col, 6);
        assert_eq!(rotated.quarter_turns(), 2);
        let cells: Vec<_> = rotated.board_cells().into_iter().collect();
        assert_eq!(cells, vec![(6, 6), (7, 6), (8, 6), (9, 6)]);
    }

    #[test]
    fn test_rotation_prefers_right_kick_when_both_fit() {
        let mut grid = PlayfieldGrid::new();
        // Blocks the stem of the east-facing T when rotated in place
        grid.occupy(4, 5, PieceKind::O);
        let t = piece(PieceKind::T).placed_at(3, 5);
        let east = t.shape().rotated_cw();
        assert!(!fits(&east, 3, 5, &grid));
        assert!(fits(&east, 4, 5, &grid) && fits(&east, 2, 5, &grid));
        let mut c = controller_with(t);

        assert!(c.try_rotate(&grid));
        assert_eq!(c.active().unwrap().target_col, 4);
    }

    #[test]
    fn test_rotation_rejected_leaves_piece_unchanged() {
        let grid = PlayfieldGrid::new();
        let mut p = piece(PieceKind::I);
        // One turn: vertical bar in local column 2, flush against the left wall
        p.shape = p.shape.rotated_cw();
        p.quarter_turns = 1;
        let before = p.placed_at(-2, 5);
        let mut c = controller_with(before);

        assert!(!c.try_rotate(&grid));
        assert_eq!(*c.active().unwrap(), before);
    }

    #[test]
    fn test_advance_falls_then_settles_on_floor() {
        let grid = PlayfieldGrid::new();
        let mut c = controller_with(piece(PieceKind::O));
        let mut ticks = 0;
        loop {
            match c.advance(DT, &grid) {
                Advance::Moving => ticks += 1,
                Advance::Settled => break,
                Advance::Idle => unreachable!(),
            }
            assert!(ticks < 100_000, "piece never settled");
        }
        let p = c.active().unwrap();
        // O occupies local rows 1..=2, so resting on the floor means anchor row -1
        assert_eq!(p.target_row, -1);
        assert_eq!(p.y, -1.0);
    }

    #[test]
    fn test_soft_drop_falls_faster() {
        let grid = PlayfieldGrid::new();
        let mut slow = controller_with(piece(PieceKind::T));
        let mut fast = controller_with(piece(PieceKind::T));
        fast.set_soft_drop(true);
        for _ in 0..30 {
            slow.advance(DT, &grid);
            fast.advance(DT, &grid);
        }
        assert!(fast.active().unwrap().y < slow.active().unwrap().y);
        assert_eq!(fast.fall_speed(), FAST_FALL_SPEED);
        assert_eq!(slow.fall_speed(), SLOW_FALL_SPEED);
    }

    #[test]
    fn test_settled_waits_for_horizontal_tween() {
        let grid = PlayfieldGrid::new();
        let mut c = controller_with(piece(PieceKind::T).placed_at(4, -1));
        assert!(c.try_move(MoveDirection::Right, &grid));
        assert_eq!(c.advance(DT, &grid), Advance::Moving);
        let mut settled = false;
        for _ in 0..60 {
            if c.advance(DT, &grid) == Advance::Settled {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert_eq!(c.active().unwrap().x, 5.0);
    }

    #[test]
    fn test_lock_waits_for_rotation_animation() {
        let grid = PlayfieldGrid::new();
        // O resting on the floor: rotation is accepted in place and only animates
        let mut c = controller_with(piece(PieceKind::O).placed_at(3, -1));
        assert!(c.try_rotate(&grid));

        let mut ticks = 0;
        while c.active().unwrap().is_rotating() {
            assert_eq!(c.advance(DT, &grid), Advance::Moving);
            ticks += 1;
            assert!(ticks < 60, "rotation never finished");
        }
        // 90 degrees at 720 deg/s takes 7.5 ticks of 1/60 s
        assert_eq!(ticks, 8);
        assert_eq!(c.active().unwrap().angle(), 90.0);

        assert_eq!(c.advance(DT, &grid), Advance::Settled);
        let p = c.active().unwrap();
        assert_eq!((p.target_col, p.target_row), (3, -1));
    }

    #[test]
    fn test_advance_without_piece_is_idle() {
        let grid = PlayfieldGrid::new();
        let mut c = ActivePieceController::default();
        assert_eq!(c.advance(DT, &grid), Advance::Idle);
        assert!(!c.can_occupy(0, 0, &grid));
    }

    #[test]
    fn test_hold_empty_slot_spawns() {
        let mut c = controller_with(piece(PieceKind::T).placed_at(3, 10));
        let mut held = None;
        assert!(c.hold(&mut held, || piece(PieceKind::S)));
        assert_eq!(held.map(|h| h.kind), Some(PieceKind::T));
        assert_eq!(c.active().unwrap().kind, PieceKind::S);
        assert!(!c.can_swap());

        // Second hold before a lock is a no-op
        assert!(!c.hold(&mut held, || piece(PieceKind::Z)));
        assert_eq!(held.map(|h| h.kind), Some(PieceKind::T));
        assert_eq!(c.active().unwrap().kind, PieceKind::S);
    }

    #[test]
    fn test_hold_swap_respawns_held_piece() {
        let grid = PlayfieldGrid::new();
        let mut c = controller_with(piece(PieceKind::J).placed_at(3, 10));
        assert!(c.try_rotate(&grid));
        let mut held = None;
        assert!(c.hold(&mut held, || piece(PieceKind::L).placed_at(5, 2)));

        c.enable_swap();
        assert!(c.hold(&mut held, || unreachable!()));
        let back = c.active().unwrap();
        assert_eq!(back.kind, PieceKind::J);
        assert_eq!(back.quarter_turns(), 1);
        assert!(!back.is_rotating());
        assert_eq!((back.target_col, back.target_row), (SPAWN_COL, SPAWN_ROW));
        assert_eq!(held.map(|h| h.kind), Some(PieceKind::L));
    }
}
