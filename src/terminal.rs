// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// What is currently on screen, for diffing against the next frame.
struct Screen {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Screen {
    fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank_with_bg(None); len],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    screen: Option<Screen>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(event::EnableMouseCapture)?;
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            screen: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let needs_full = frame.is_dirty_all()
            || self
                .screen
                .as_ref()
                .map(|s| s.width != frame.width || s.height != frame.height)
                .unwrap_or(true);

        if needs_full {
            self.screen = Some(Screen::new(frame.width, frame.height));
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            let total = frame.width as usize * frame.height as usize;
            self.emit_indices(frame, &(0..total).collect::<Vec<_>>())?;
        } else {
            let mut dirty: Vec<usize> = frame.dirty_indices().to_vec();
            dirty.sort_unstable();
            self.emit_indices(frame, &dirty)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    /// Emits the given (sorted) cell indices, merged into horizontal runs
    /// that share attributes, skipping cells already on screen.
    fn emit_indices(&mut self, frame: &Frame, indices: &[usize]) -> Result<()> {
        let screen = self.screen.as_mut().expect("screen set before emit");
        let width = frame.width as usize;

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_bold = false;
        let mut cur_pos: Option<(u16, u16)> = None;
        let mut attrs_known = false;

        let mut i = 0usize;
        while i < indices.len() {
            let idx0 = indices[i];
            let cell0 = frame.cell_at_index(idx0);
            if screen.cells[idx0] == cell0 {
                i += 1;
                continue;
            }

            let x0 = (idx0 % width) as u16;
            let y0 = (idx0 / width) as u16;

            self.run_buf.clear();
            self.run_buf.push(cell0.ch);
            screen.cells[idx0] = cell0;
            let mut run_len: u16 = 1;
            let mut last_idx = idx0;
            let mut j = i + 1;
            while j < indices.len() {
                let idx1 = indices[j];
                if idx1 != last_idx + 1 || idx1 / width != idx0 / width {
                    break;
                }
                let cell1 = frame.cell_at_index(idx1);
                if cell1.fg != cell0.fg || cell1.bg != cell0.bg || cell1.bold != cell0.bold {
                    break;
                }
                self.run_buf.push(cell1.ch);
                screen.cells[idx1] = cell1;
                run_len += 1;
                last_idx = idx1;
                j += 1;
            }

            if cur_pos != Some((x0, y0)) {
                self.stdout.queue(cursor::MoveTo(x0, y0))?;
            }
            if !attrs_known || cell0.fg != cur_fg {
                self.stdout
                    .queue(SetForegroundColor(cell0.fg.unwrap_or(Color::Reset)))?;
                cur_fg = cell0.fg;
            }
            if !attrs_known || cell0.bg != cur_bg {
                self.stdout
                    .queue(SetBackgroundColor(cell0.bg.unwrap_or(Color::Reset)))?;
                cur_bg = cell0.bg;
            }
            if !attrs_known || cell0.bold != cur_bold {
                self.stdout.queue(SetAttribute(if cell0.bold {
                    Attribute::Bold
                } else {
                    Attribute::NormalIntensity
                }))?;
                cur_bold = cell0.bold;
            }
            attrs_known = true;

            self.stdout.queue(Print(self.run_buf.as_str()))?;
            let next_x = x0.saturating_add(run_len);
            cur_pos = if next_x < frame.width {
                Some((next_x, y0))
            } else {
                None
            };

            i = j;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
