//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! The first frame (and any frame after `invalidate` or a resize) clears the
//! screen and repaints every row; later frames only rewrite runs of cells
//! that changed.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{self, ClearType},
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    /// Raw mode on the alternate screen, cursor hidden
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        queue!(
            self.buf,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap
        )?;
        self.flush_buf()
    }

    /// Undo `enter`; safe to call after a failed frame
    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        queue!(
            self.buf,
            ResetColor,
            SetAttribute(Attribute::Reset),
            terminal::EnableLineWrap,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw (terminal resize).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw `fb`, then swap it with the previous frame.
    ///
    /// Callers keep one framebuffer and pass it in every frame; after the
    /// call it holds stale contents that the next render overwrites.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let prev = self
            .last
            .take()
            .filter(|prev| prev.width() == fb.width() && prev.height() == fb.height());
        encode_frame(prev.as_ref(), fb, &mut self.buf)?;
        self.flush_buf()?;

        self.last = Some(match prev {
            Some(mut prev) => {
                std::mem::swap(&mut prev, fb);
                prev
            }
            None => fb.clone(),
        });
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode `next` into `out` as terminal commands.
///
/// Without a previous frame of the same size the screen is cleared and every
/// row repainted; otherwise only the changed runs are written.
fn encode_frame(prev: Option<&FrameBuffer>, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut pen = Pen::default();
    match prev {
        Some(prev) => {
            for (x, y, len) in changed_runs(prev, next) {
                pen.paint_run(out, next, x, y, len)?;
            }
        }
        None => {
            queue!(out, terminal::Clear(ClearType::All))?;
            for y in 0..next.height() {
                pen.paint_run(out, next, 0, y, next.width())?;
            }
        }
    }
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Remembers the last style written so runs only emit style changes
#[derive(Default)]
struct Pen {
    style: Option<CellStyle>,
}

impl Pen {
    fn paint_run(
        &mut self,
        out: &mut Vec<u8>,
        fb: &FrameBuffer,
        x: u16,
        y: u16,
        len: u16,
    ) -> io::Result<()> {
        queue!(out, cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = fb.get(x + dx, y).unwrap_or_default();
            if self.style != Some(cell.style) {
                set_style(out, cell.style)?;
                self.style = Some(cell.style);
            }
            queue!(out, Print(cell.ch))?;
        }
        Ok(())
    }
}

fn set_style(out: &mut Vec<u8>, style: CellStyle) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(style.fg.into()),
        SetBackgroundColor(style.bg.into()),
        SetAttribute(Attribute::Reset)
    )?;
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    }
}

/// Horizontal runs `(x, y, len)` where the two frames differ
fn changed_runs<'a>(
    prev: &'a FrameBuffer,
    next: &'a FrameBuffer,
) -> impl Iterator<Item = (u16, u16, u16)> + 'a {
    let w = next.width();
    (0..next.height()).flat_map(move |y| {
        let differs = move |x: u16| prev.get(x, y) != next.get(x, y);
        let mut x = 0;
        std::iter::from_fn(move || {
            while x < w && !differs(x) {
                x += 1;
            }
            if x >= w {
                return None;
            }
            let start = x;
            while x < w && differs(x) {
                x += 1;
            }
            Some((start, y, x - start))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb::Cell;

    #[test]
    fn changed_runs_coalesce_adjacent_cells() {
        let style = CellStyle::default();
        let a = FrameBuffer::new(6, 2);
        let mut b = FrameBuffer::new(6, 2);
        for x in 1..=3 {
            b.set(x, 0, Cell { ch: 'X', style });
        }
        b.set(5, 1, Cell { ch: 'Y', style });

        let runs: Vec<_> = changed_runs(&a, &b).collect();
        assert_eq!(runs, vec![(1, 0, 3), (5, 1, 1)]);
    }

    #[test]
    fn identical_frames_have_no_runs() {
        let a = FrameBuffer::new(4, 4);
        assert_eq!(changed_runs(&a, &a.clone()).count(), 0);
    }

    #[test]
    fn diff_encoding_is_smaller_than_full() {
        let style = CellStyle::default();
        let a = FrameBuffer::new(40, 20);
        let mut b = a.clone();
        b.set(3, 3, Cell { ch: '#', style });

        let mut full = Vec::new();
        encode_frame(None, &b, &mut full).unwrap();
        let mut diff = Vec::new();
        encode_frame(Some(&a), &b, &mut diff).unwrap();
        assert!(!diff.is_empty());
        assert!(diff.len() < full.len());

        let text = String::from_utf8_lossy(&diff);
        assert!(text.contains('#'));
    }

    #[test]
    fn rgb_converts_to_truecolor() {
        let color: Color = Rgb { r: 1, g: 2, b: 3 }.into();
        assert_eq!(color, Color::Rgb { r: 1, g: 2, b: 3 });
    }
}
