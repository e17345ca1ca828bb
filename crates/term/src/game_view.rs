//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). Board row 0 is the bottom of the well, so
//! rows are flipped on the way to screen coordinates.

use crate::core::{ActiveSnapshot, GameSnapshot};
use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::types::{PieceKind, GRID_HEIGHT, GRID_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const WELL_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_MIN_WIDTH: u16 = 12;

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self::new(2, 1)
    }
}

/// Where the well sits in the framebuffer
#[derive(Debug, Clone, Copy)]
struct Layout {
    x: u16,
    y: u16,
    frame_w: u16,
    frame_h: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Frame width and height needed for the well including its border
    pub fn frame_size(&self) -> (u16, u16) {
        (
            GRID_WIDTH as u16 * self.cell_w + 2,
            GRID_HEIGHT as u16 * self.cell_h + 2,
        )
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let (frame_w, frame_h) = self.frame_size();
        let layout = Layout {
            x: viewport.width.saturating_sub(frame_w) / 2,
            y: viewport.height.saturating_sub(frame_h) / 2,
            frame_w,
            frame_h,
        };

        self.draw_border(fb, layout);

        for row in 0..GRID_HEIGHT as i8 {
            for col in 0..GRID_WIDTH as i8 {
                let code = snap.board[row as usize][col as usize];
                match PieceKind::from_code(code) {
                    Some(kind) => self.draw_block(fb, layout, col, row, kind),
                    None => self.draw_empty(fb, layout, col, row),
                }
            }
        }

        if let Some(active) = snap.active.as_ref() {
            self.draw_active(fb, layout, active);
        }

        self.draw_side_panel(fb, snap, viewport, layout);

        if snap.game_over {
            self.draw_overlay_text(fb, layout, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Draw the falling piece at its tweened position, rounded to the
    /// nearest cell. Cells above the well are clipped.
    fn draw_active(&self, fb: &mut FrameBuffer, layout: Layout, active: &ActiveSnapshot) {
        let col0 = active.x.round() as i8;
        let row0 = active.y.round() as i8;
        for (i, j) in active.shape.cells() {
            self.draw_block(fb, layout, col0 + i, row0 + j, active.kind);
        }
    }

    fn draw_border(&self, fb: &mut FrameBuffer, layout: Layout) {
        let Layout {
            x,
            y,
            frame_w: w,
            frame_h: h,
        } = layout;
        let style = CellStyle::plain(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);
        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_empty(&self, fb: &mut FrameBuffer, layout: Layout, col: i8, row: i8) {
        let style = CellStyle::plain(Rgb::new(90, 90, 100), WELL_BG).dim();
        self.fill_cell(fb, layout, col, row, '·', style);
    }

    fn draw_block(&self, fb: &mut FrameBuffer, layout: Layout, col: i8, row: i8, kind: PieceKind) {
        let style = CellStyle::plain(piece_color(kind), WELL_BG).bold();
        self.fill_cell(fb, layout, col, row, '█', style);
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, layout: Layout, col: i8, row: i8, ch: char, style: CellStyle) {
        if col < 0 || col >= GRID_WIDTH as i8 || row < 0 || row >= GRID_HEIGHT as i8 {
            return;
        }
        let screen_row = (GRID_HEIGHT as i8 - 1 - row) as u16;
        let px = layout.x + 1 + col as u16 * self.cell_w;
        let py = layout.y + 1 + screen_row * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, viewport: Viewport, layout: Layout) {
        let panel_x = layout.x.saturating_add(layout.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < PANEL_MIN_WIDTH {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::plain(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = layout.y;
        for (name, number) in [("SCORE", snap.score), ("LEVEL", snap.level), ("LINES", snap.lines)] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y.saturating_add(1), number, value);
            y = y.saturating_add(3);
        }

        fb.put_str(panel_x, y, "HOLD", label);
        let hold_style = if snap.can_swap { value } else { value.dim() };
        fb.put_str(panel_x, y.saturating_add(1), piece_letter(snap.held), hold_style);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "NEXT", label);
        fb.put_str(panel_x, y.saturating_add(1), piece_letter(snap.next), value);
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, layout: Layout, text: &str) {
        let mid_y = layout.y.saturating_add(layout.frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = layout.x.saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::plain(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        fb.put_str(x, mid_y, text, style);
    }
}

fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
    }
}

fn piece_letter(kind: Option<PieceKind>) -> &'static str {
    match kind {
        Some(PieceKind::I) => "I",
        Some(PieceKind::O) => "O",
        Some(PieceKind::T) => "T",
        Some(PieceKind::S) => "S",
        Some(PieceKind::Z) => "Z",
        Some(PieceKind::J) => "J",
        Some(PieceKind::L) => "L",
        None => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(60, 24)
    }

    #[test]
    fn test_bottom_row_is_drawn_last() {
        let mut snap = GameSnapshot::default();
        snap.board[0][0] = PieceKind::Z.code();
        let view = GameView::default();
        let fb = view.render(&snap, viewport());

        let (frame_w, frame_h) = view.frame_size();
        let x0 = (60 - frame_w) / 2;
        let y0 = (24 - frame_h) / 2;
        // Bottom-left cell sits just above the lower border
        let cell = fb.get(x0 + 1, y0 + frame_h - 2).unwrap();
        assert_eq!(cell.ch, '█');
        let top_left = fb.get(x0 + 1, y0 + 1).unwrap();
        assert_eq!(top_left.ch, '·');
    }

    #[test]
    fn test_game_over_overlay() {
        let snap = GameSnapshot {
            game_over: true,
            ..GameSnapshot::default()
        };
        let fb = GameView::default().render(&snap, viewport());
        let found = (0..fb.height()).any(|y| fb.row_text(y).contains("GAME OVER"));
        assert!(found);
    }

    #[test]
    fn test_side_panel_shows_score() {
        let snap = GameSnapshot {
            score: 1200,
            held: Some(PieceKind::T),
            ..GameSnapshot::default()
        };
        let fb = GameView::default().render(&snap, viewport());
        let text: Vec<String> = (0..fb.height()).map(|y| fb.row_text(y)).collect();
        assert!(text.iter().any(|r| r.contains("SCORE")));
        assert!(text.iter().any(|r| r.contains("1200")));
        assert!(text.iter().any(|r| r.contains("HOLD")));
    }

    #[test]
    fn test_small_viewport_does_not_panic() {
        let fb = GameView::default().render(&GameSnapshot::default(), Viewport::new(5, 3));
        assert_eq!((fb.width(), fb.height()), (5, 3));
    }
}
