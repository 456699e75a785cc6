// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::Palette;

/// Horizontal cells per rain column.
pub const CELL_WIDTH: u16 = 2;

/// Chance per frame that a column past the bottom respawns at the top.
pub const RESPAWN_CHANCE: f32 = 0.025;

/// Intensity lost per frame; stamped heads start at 255.
const TRAIL_DECAY: u8 = 14;

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*()_+-=[]{}|;:,.<>?";

/// Falling-character surface. One fall position per column; glyph and
/// intensity buffers are column-major and hold the fading trail. The
/// whole column state is reallocated on resize, never patched.
pub struct Rain {
    width: u16,
    height: u16,
    columns: u16,
    drops: Vec<u16>,
    glyphs: Vec<char>,
    intensity: Vec<u8>,
    active: bool,
    rng: StdRng,
    rand_chance: Uniform<f32>,
    rand_glyph: Uniform<usize>,
}

impl Rain {
    pub fn new(seed: u64) -> Self {
        Self {
            width: 0,
            height: 0,
            columns: 0,
            drops: Vec::new(),
            glyphs: Vec::new(),
            intensity: Vec::new(),
            active: false,
            rng: StdRng::seed_from_u64(seed),
            rand_chance: Uniform::new(0.0, 1.0).expect("valid range"),
            rand_glyph: Uniform::new(0, GLYPHS.len()).expect("valid range"),
        }
    }

    pub fn init(&mut self, width: u16, height: u16) {
        self.resize(width, height);
    }

    /// Reallocates all column state for the new size. Fall positions are
    /// not carried over; every column restarts at 1.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.columns = width / CELL_WIDTH;
        let cells = self.columns as usize * height as usize;
        self.drops = vec![1; self.columns as usize];
        self.glyphs = vec![' '; cells];
        self.intensity = vec![0; cells];
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> u16 {
        self.columns
    }

    #[allow(dead_code)]
    pub fn drops(&self) -> &[u16] {
        &self.drops
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Advances the surface by one frame: fade every trail cell, stamp a
    /// fresh glyph at each column's fall position, move the position down,
    /// and give columns past the bottom a respawn roll.
    pub fn tick(&mut self) {
        if !self.active || self.columns == 0 {
            return;
        }

        for v in &mut self.intensity {
            *v = v.saturating_sub(TRAIL_DECAY);
        }

        let height = self.height;
        for col in 0..self.columns as usize {
            let pos = self.drops[col];
            if pos < height {
                let idx = col * height as usize + pos as usize;
                self.glyphs[idx] = GLYPHS[self.rand_glyph.sample(&mut self.rng)] as char;
                self.intensity[idx] = 255;
            }
            let mut next = pos.saturating_add(1);
            if next > height && self.rand_chance.sample(&mut self.rng) < RESPAWN_CHANCE {
                next = 0;
            }
            self.drops[col] = next;
        }
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette) {
        if !self.active {
            return;
        }
        let height = self.height.min(frame.height);
        for col in 0..self.columns {
            let x = col * CELL_WIDTH;
            for y in 0..height {
                let idx = col as usize * self.height as usize + y as usize;
                let level = self.intensity[idx];
                let cell = if level == 0 {
                    Cell::blank_with_bg(palette.bg)
                } else if level == 255 {
                    let mut c = Cell::glyph(self.glyphs[idx], palette.head).bold();
                    c.bg = palette.bg;
                    c
                } else {
                    let mut c = Cell::glyph(self.glyphs[idx], palette.shade(level));
                    c.bg = palette.bg;
                    c
                };
                frame.set(x, y, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::build_palette;
    use crate::runtime::{ColorMode, Theme};

    #[test]
    fn column_count_tracks_width_across_resizes() {
        let mut rain = Rain::new(7);
        for (w, h) in [(80u16, 24u16), (81, 24), (7, 3), (1, 1), (120, 50)] {
            rain.resize(w, h);
            assert_eq!(rain.columns(), w / CELL_WIDTH);
            assert_eq!(rain.drops().len(), rain.columns() as usize);
            assert!(rain.drops().iter().all(|&d| d == 1));
        }
    }

    #[test]
    fn start_is_idempotent_and_stop_when_inactive_is_a_noop() {
        let mut rain = Rain::new(7);
        rain.init(10, 5);
        rain.stop();
        assert!(!rain.is_active());

        rain.start();
        rain.start();
        assert!(rain.is_active());

        // A doubled start must not double the per-frame advance.
        let before = rain.drops()[0];
        rain.tick();
        assert_eq!(rain.drops()[0], before + 1);

        rain.stop();
        rain.stop();
        assert!(!rain.is_active());
    }

    #[test]
    fn toggle_flips_between_the_two_states() {
        let mut rain = Rain::new(7);
        rain.init(10, 5);
        rain.toggle();
        assert!(rain.is_active());
        rain.toggle();
        assert!(!rain.is_active());
    }

    #[test]
    fn tick_does_nothing_while_stopped() {
        let mut rain = Rain::new(7);
        rain.init(10, 5);
        let before = rain.drops().to_vec();
        rain.tick();
        assert_eq!(rain.drops(), before.as_slice());
    }

    #[test]
    fn columns_past_the_bottom_eventually_respawn_at_zero() {
        let mut rain = Rain::new(7);
        rain.init(8, 4);
        rain.start();
        let mut saw_respawn = false;
        for _ in 0..2000 {
            rain.tick();
            if rain.drops().iter().any(|&d| d <= 1) {
                saw_respawn = true;
                break;
            }
        }
        assert!(saw_respawn, "no column respawned in 2000 frames");
    }

    #[test]
    fn draw_stamps_heads_into_the_frame() {
        let mut rain = Rain::new(7);
        rain.init(8, 4);
        rain.start();
        rain.tick();
        let palette = build_palette(Theme::Green, ColorMode::TrueColor, true);
        let mut frame = Frame::new(8, 4, palette.bg);
        frame.clear_dirty();
        rain.draw(&mut frame, &palette);
        assert!(frame.has_changes());
        // Row 1 holds the first stamped head for every column.
        assert_ne!(frame.get(0, 1).unwrap().ch, ' ');
    }
}
