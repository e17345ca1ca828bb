//! Terminal block-fall runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `blockfall-term`.
//! Tuning comes from `BLOCKFALL_*` environment variables; set
//! `BLOCKFALL_LOG_PATH` to write every lock as a JSON line.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use blockfall::core::{GameSession, GameSnapshot, SessionConfig};
use blockfall::input::{should_quit, Binding, InputState};
use blockfall::lock_log::LockLog;
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use blockfall::types::TICK_MS;

fn main() -> Result<()> {
    let config = SessionConfig::from_env();
    let mut log = LockLog::from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config, log.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Some(log) = log.as_mut() {
        log.flush()?;
    }

    let (score, lines) = result?;
    println!("[Blockfall] score {} lines {}", score, lines);
    Ok(())
}

fn run<W: std::io::Write>(
    term: &mut TerminalRenderer,
    config: SessionConfig,
    mut log: Option<&mut LockLog<W>>,
) -> Result<(u32, u32)> {
    let mut session = GameSession::with_config(config);
    session.start();

    let view = GameView::default();
    let mut input = InputState::new();
    let mut snapshot = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        session.snapshot_into(&mut snapshot);
        view.render_into(&snapshot, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if should_quit(key) {
                            return Ok((session.score(), session.lines()));
                        }
                        if input.handle_key_press(key) == Some(Binding::Restart) {
                            session.restart();
                            input.reset();
                        }
                    }
                    KeyEventKind::Release => input.handle_key_release(key.code),
                },
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick with the measured frame time.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            let frame = input.frame();
            if session.update(elapsed.as_secs_f32(), &frame) {
                if let (Some(event), Some(log)) = (session.take_last_event(), log.as_deref_mut()) {
                    log.record(&event)?;
                }
            }
        }
    }
}
